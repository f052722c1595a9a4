//! PDF組み立て
//!
//! 1スライド = 1ページ。ラスタ画像をページ全面に置き、その上に文字をテキストとして重ねる。

use super::raster::RasterPage;
use crate::error::{ReportError, Result};
use inspection_report_common::export::{build_slide_text, PagePlacement, TextRun};
use inspection_report_common::layout::{px_to_pt, SlideGeometry, PAGE_HEIGHT_PT};
use inspection_report_common::Slide;
use printpdf::color::Color;
use printpdf::image::RawImage;
use printpdf::matrix::TextMatrix;
use printpdf::ops::Op;
use printpdf::text::TextItem;
use printpdf::xobject::{XObject, XObjectTransform};
use printpdf::{BuiltinFont, Mm, PdfDocument, PdfPage, PdfSaveOptions, Pt, Rgb, XObjectId};

const PT_TO_MM: f32 = 25.4 / 72.0;

// 文字色 slate-800
const TEXT_COLOR: (f32, f32, f32) = (30.0 / 255.0, 41.0 / 255.0, 59.0 / 255.0);

/// ページ（スライドとそのラスタ）を順に並べたPDFのバイト列を作る
pub fn assemble_pdf(title: &str, pages: &[(&Slide, RasterPage)]) -> Result<Vec<u8>> {
    let mut doc = PdfDocument::new(title);
    let geometry = SlideGeometry::default();
    let placement = PagePlacement::full_page_pt();
    let mut warnings = Vec::new();

    for (slide, raster) in pages {
        let raw = RawImage::decode_from_bytes(&raster.jpeg, &mut warnings).map_err(|e| {
            ReportError::PdfGeneration(format!("ページ{}の画像読み込みエラー: {}", slide.page_number, e))
        })?;

        let xobj_id = XObjectId::new();
        doc.resources
            .xobjects
            .map
            .insert(xobj_id.clone(), XObject::Image(raw));

        let mut ops = vec![Op::UseXobject {
            id: xobj_id,
            transform: placement_transform(&placement, raster),
        }];
        ops.extend(text_ops(&build_slide_text(slide, &geometry)));

        doc.pages.push(PdfPage::new(
            Mm(placement.width * PT_TO_MM),
            Mm(placement.height * PT_TO_MM),
            ops,
        ));
    }

    if !warnings.is_empty() {
        tracing::debug!(count = warnings.len(), "printpdf warnings");
    }

    Ok(doc.save(&PdfSaveOptions::default(), &mut warnings))
}

/// 画像を配置枠いっぱいに伸縮（dpi 72 で 1px = 1pt）
fn placement_transform(placement: &PagePlacement, raster: &RasterPage) -> XObjectTransform {
    XObjectTransform {
        translate_x: Some(Pt(placement.x)),
        translate_y: Some(Pt(placement.y)),
        scale_x: Some(placement.width / raster.width as f32),
        scale_y: Some(placement.height / raster.height as f32),
        rotate: None,
        dpi: Some(72.0),
    }
}

fn text_ops(runs: &[TextRun]) -> Vec<Op> {
    if runs.is_empty() {
        return Vec::new();
    }

    let font = BuiltinFont::Helvetica;
    let (r, g, b) = TEXT_COLOR;
    let mut ops = vec![
        Op::StartTextSection,
        Op::SetFillColor {
            col: Color::Rgb(Rgb::new(r, g, b, None)),
        },
    ];

    for run in runs {
        // レイアウト座標は上端基準なのでPDF座標（下端基準）へ変換
        let (x, y) = to_page_point(run.x, run.y);
        ops.push(Op::SetFontSizeBuiltinFont {
            size: Pt(px_to_pt(run.size)),
            font,
        });
        ops.push(Op::SetTextMatrix {
            matrix: TextMatrix::Translate(Pt(x), Pt(y)),
        });
        ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(run.text.clone())],
            font,
        });
    }

    ops.push(Op::EndTextSection);
    ops
}

fn to_page_point(x: f32, y: f32) -> (f32, f32) {
    (px_to_pt(x), PAGE_HEIGHT_PT - px_to_pt(y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::raster::{encode_jpeg, CanvasRasterizer, SlideRasterizer};
    use inspection_report_common::{render_document, Observation, ReportState};

    #[test]
    fn test_to_page_point_flips_y() {
        let (x, y) = to_page_point(0.0, 0.0);
        assert_eq!(x, 0.0);
        assert!((y - PAGE_HEIGHT_PT).abs() < 0.001);

        let (_, bottom) = to_page_point(0.0, 630.0);
        assert!(bottom.abs() < 0.001);
    }

    #[test]
    fn test_transform_covers_page() {
        let raster = RasterPage {
            width: 2240,
            height: 1260,
            jpeg: Vec::new(),
        };
        let t = placement_transform(&PagePlacement::full_page_pt(), &raster);
        let width = raster.width as f32 * t.scale_x.unwrap();
        let height = raster.height as f32 * t.scale_y.unwrap();
        assert!((width - 840.0).abs() < 0.01);
        assert!((height - 472.5).abs() < 0.01);
    }

    #[test]
    fn test_text_ops_wraps_in_section() {
        let ops = text_ops(&[TextRun {
            text: "Page 1 / 1".into(),
            x: 10.0,
            y: 20.0,
            size: 12.0,
        }]);
        assert!(matches!(ops.first(), Some(Op::StartTextSection)));
        assert!(matches!(ops.last(), Some(Op::EndTextSection)));
        assert!(text_ops(&[]).is_empty());
    }

    #[test]
    fn test_assemble_produces_pdf() {
        let mut state = ReportState::new_session("2026-01-18");
        state.observations.push(Observation::new());
        state.observations.push(Observation::new());
        let document = render_document(&state);

        let rasterizer = CanvasRasterizer::new();
        let pages: Vec<_> = document
            .slides
            .iter()
            .map(|slide| {
                let canvas = rasterizer.rasterize(slide, 0.25).unwrap();
                (slide, encode_jpeg(&canvas, 80).unwrap())
            })
            .collect();

        let bytes = assemble_pdf("test", &pages).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > pages.iter().map(|(_, p)| p.jpeg.len()).sum::<usize>() / 2);
    }
}
