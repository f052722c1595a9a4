//! スライドのラスタライズ
//!
//! スライド記述子を白背景のRGB画像に描く。文字はPDF側のテキストレイヤーで重ねる。

use crate::error::{ReportError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{Rgb, RgbImage};
use inspection_report_common::layout::{Rect, SlideGeometry, SLIDE_HEIGHT, SLIDE_WIDTH};
use inspection_report_common::{PhotoSlot, Severity, Slide, SlideKind};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BRAND_GREEN: Rgb<u8> = Rgb([36, 126, 56]); // #247e38
const ACCENT_GREEN: Rgb<u8> = Rgb([80, 200, 120]); // #50C878
const PANEL_BG: Rgb<u8> = Rgb([248, 250, 252]); // slate-50
const FOOTER_BG: Rgb<u8> = Rgb([245, 245, 245]); // #F5F5F5
const RULE: Rgb<u8> = Rgb([241, 245, 249]); // slate-100
const PLACEHOLDER: Rgb<u8> = Rgb([226, 232, 240]); // slate-200
const PILL: Rgb<u8> = Rgb([226, 232, 240]);

/// ラスタライズ済みスライド
#[derive(Debug, Clone)]
pub struct RasterPage {
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

/// スライド → 画像
pub trait SlideRasterizer: Sync {
    fn rasterize(&self, slide: &Slide, scale: f32) -> Result<RgbImage>;
}

/// `image` クレートで描く既定の実装
#[derive(Debug, Clone, Default)]
pub struct CanvasRasterizer {
    geometry: SlideGeometry,
}

impl CanvasRasterizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlideRasterizer for CanvasRasterizer {
    fn rasterize(&self, slide: &Slide, scale: f32) -> Result<RgbImage> {
        let width = (SLIDE_WIDTH * scale).round() as u32;
        let height = (SLIDE_HEIGHT * scale).round() as u32;
        if width == 0 || height == 0 {
            return Err(ReportError::Rasterize(format!("倍率が不正です: {}", scale)));
        }

        // 透過部分が黒くならないよう白で塗りつぶしてから描く
        let mut canvas = RgbImage::from_pixel(width, height, WHITE);

        match &slide.kind {
            SlideKind::Cover { .. } => self.draw_cover(&mut canvas, scale),
            SlideKind::Observation { photo, severity, .. } => {
                self.draw_observation(&mut canvas, scale, photo, *severity)?
            }
        }

        Ok(canvas)
    }
}

impl CanvasRasterizer {
    fn draw_cover(&self, canvas: &mut RgbImage, scale: f32) {
        let g = &self.geometry;
        fill_rect(canvas, g.cover_accent().scaled(scale), BRAND_GREEN);

        let text = g.cover_text();
        // 見出し横のアクセント線
        let eyebrow = Rect::new(text.x, text.bottom() - 236.0, 64.0, 4.0);
        fill_rect(canvas, eyebrow.scaled(scale), BRAND_GREEN);
        // 検査員・日付の区切り線
        let divider = Rect::new(text.x, text.bottom() - 70.0, text.width, 1.0);
        fill_rect(canvas, divider.scaled(scale), RULE);
    }

    fn draw_observation(&self, canvas: &mut RgbImage, scale: f32, photo: &PhotoSlot, severity: Severity) -> Result<()> {
        let g = &self.geometry;

        let header = g.header();
        fill_rect(canvas, Rect::new(header.x, header.bottom() - 1.0, header.width, 1.0).scaled(scale), RULE);
        fill_rect(canvas, Rect::new(48.0, 20.0, 4.0, 24.0).scaled(scale), ACCENT_GREEN);

        let footer = g.footer();
        fill_rect(canvas, footer.scaled(scale), FOOTER_BG);
        fill_rect(canvas, Rect::new(footer.x, footer.y, footer.width, 1.0).scaled(scale), RULE);

        let panel = g.photo_panel();
        fill_rect(canvas, panel.scaled(scale), PANEL_BG);
        stroke_rect(canvas, panel.scaled(scale), RULE, scale.max(1.0) as u32);

        let inner = panel.inset(12.0);
        match photo {
            PhotoSlot::Photo(image) => {
                let bytes = image.decode()?;
                let decoded = image::load_from_memory(&bytes)
                    .map_err(|e| ReportError::Rasterize(format!("写真のデコードに失敗: {}", e)))?;
                let target = inner.fit(decoded.width() as f32, decoded.height() as f32).scaled(scale);
                let w = target.width.round().max(1.0) as u32;
                let h = target.height.round().max(1.0) as u32;
                let resized = decoded.resize_exact(w, h, FilterType::Triangle).to_rgba8();
                blend_onto(canvas, &resized, target.x.round() as i64, target.y.round() as i64);
            }
            PhotoSlot::Placeholder(_) => {
                let icon = Rect::new(
                    inner.x + inner.width / 2.0 - 32.0,
                    inner.y + inner.height / 2.0 - 48.0,
                    64.0,
                    64.0,
                );
                stroke_rect(canvas, icon.scaled(scale), PLACEHOLDER, (2.0 * scale) as u32);
            }
        }

        // 指摘番号の下地
        fill_rect(canvas, Rect::new(panel.x + 24.0, panel.y + 22.0, 110.0, 26.0).scaled(scale), PILL);

        let text = g.text_panel();
        fill_rect(canvas, Rect::new(text.x, text.y + 16.0, text.width, 1.0).scaled(scale), RULE);
        fill_rect(
            canvas,
            Rect::new(text.x - 16.0, text.y + 44.0, 4.0, 120.0).scaled(scale),
            severity_color(severity),
        );
        fill_rect(canvas, Rect::new(text.x, text.bottom() - 80.0, text.width, 80.0).scaled(scale), PANEL_BG);

        Ok(())
    }
}

fn severity_color(severity: Severity) -> Rgb<u8> {
    match severity {
        Severity::Low => Rgb([134, 239, 172]),
        Severity::Medium => Rgb([253, 224, 71]),
        Severity::High => Rgb([251, 146, 60]),
        Severity::Critical => Rgb([239, 68, 68]),
    }
}

fn clamp_span(start: f32, len: f32, limit: u32) -> (u32, u32) {
    let from = start.round().max(0.0) as u32;
    let to = (start + len).round().max(0.0) as u32;
    (from.min(limit), to.min(limit))
}

fn fill_rect(canvas: &mut RgbImage, rect: Rect, color: Rgb<u8>) {
    let (x0, x1) = clamp_span(rect.x, rect.width, canvas.width());
    let (y0, y1) = clamp_span(rect.y, rect.height, canvas.height());
    for y in y0..y1 {
        for x in x0..x1 {
            canvas.put_pixel(x, y, color);
        }
    }
}

fn stroke_rect(canvas: &mut RgbImage, rect: Rect, color: Rgb<u8>, thickness: u32) {
    let t = thickness.max(1) as f32;
    fill_rect(canvas, Rect::new(rect.x, rect.y, rect.width, t), color);
    fill_rect(canvas, Rect::new(rect.x, rect.bottom() - t, rect.width, t), color);
    fill_rect(canvas, Rect::new(rect.x, rect.y, t, rect.height), color);
    fill_rect(canvas, Rect::new(rect.right() - t, rect.y, t, rect.height), color);
}

/// アルファ付き画像を合成（透過部分は下地の色のまま）
fn blend_onto(canvas: &mut RgbImage, src: &image::RgbaImage, left: i64, top: i64) {
    for (sx, sy, pixel) in src.enumerate_pixels() {
        let x = left + sx as i64;
        let y = top + sy as i64;
        if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
            continue;
        }
        let [r, g, b, a] = pixel.0;
        let dst = canvas.get_pixel_mut(x as u32, y as u32);
        let alpha = a as u32;
        for (channel, value) in dst.0.iter_mut().zip([r, g, b]) {
            *channel = ((value as u32 * alpha + *channel as u32 * (255 - alpha)) / 255) as u8;
        }
    }
}

/// JPEGエンコード
pub fn encode_jpeg(canvas: &RgbImage, quality: u8) -> Result<RasterPage> {
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality)
        .encode_image(canvas)
        .map_err(|e| ReportError::Rasterize(format!("JPEGエンコード失敗: {}", e)))?;
    Ok(RasterPage {
        width: canvas.width(),
        height: canvas.height(),
        jpeg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::test_support::png_bytes;
    use inspection_report_common::{render_document, InlineImage, Observation, ReportState};

    fn doc_with_photo(photo: Option<InlineImage>) -> Vec<Slide> {
        let mut state = ReportState::new_session("2026-01-18");
        let mut obs = Observation::new();
        obs.photo = photo;
        state.observations.push(obs);
        render_document(&state).slides
    }

    #[test]
    fn test_raster_size_at_double_density() {
        let slides = doc_with_photo(None);
        let canvas = CanvasRasterizer::new().rasterize(&slides[0], 2.0).unwrap();
        assert_eq!((canvas.width(), canvas.height()), (2240, 1260));
    }

    #[test]
    fn test_background_is_white() {
        let slides = doc_with_photo(None);
        let canvas = CanvasRasterizer::new().rasterize(&slides[1], 1.0).unwrap();
        assert_eq!(canvas.get_pixel(2, 80), &WHITE);
    }

    #[test]
    fn test_transparent_photo_does_not_turn_black() {
        let transparent = image::RgbaImage::from_pixel(8, 8, image::Rgba([0, 0, 0, 0]));
        let mut buf = std::io::Cursor::new(Vec::new());
        transparent.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        let photo = InlineImage::from_bytes("image/png", &buf.into_inner());

        let slides = doc_with_photo(Some(photo));
        let canvas = CanvasRasterizer::new().rasterize(&slides[1], 1.0).unwrap();
        let panel = SlideGeometry::default().photo_panel();
        let center = canvas.get_pixel(
            (panel.x + panel.width / 2.0) as u32,
            (panel.y + panel.height / 2.0) as u32,
        );
        assert_eq!(center, &PANEL_BG);
    }

    #[test]
    fn test_photo_is_drawn() {
        let photo = InlineImage::from_bytes("image/png", &png_bytes(16, 9, [200, 0, 0]));
        let slides = doc_with_photo(Some(photo));
        let canvas = CanvasRasterizer::new().rasterize(&slides[1], 1.0).unwrap();
        let panel = SlideGeometry::default().photo_panel();
        let center = canvas.get_pixel(
            (panel.x + panel.width / 2.0) as u32,
            (panel.y + panel.height / 2.0) as u32,
        );
        assert_eq!(center, &Rgb([200, 0, 0]));
    }

    #[test]
    fn test_corrupt_photo_is_error() {
        let photo = InlineImage::from_bytes("image/png", b"garbage");
        let slides = doc_with_photo(Some(photo));
        let err = CanvasRasterizer::new().rasterize(&slides[1], 1.0).unwrap_err();
        assert!(matches!(err, ReportError::Rasterize(_)));
    }

    #[test]
    fn test_zero_scale_is_error() {
        let slides = doc_with_photo(None);
        assert!(CanvasRasterizer::new().rasterize(&slides[0], 0.0).is_err());
    }

    #[test]
    fn test_encode_jpeg() {
        let canvas = RgbImage::from_pixel(10, 10, WHITE);
        let page = encode_jpeg(&canvas, 95).unwrap();
        assert_eq!((page.width, page.height), (10, 10));
        assert_eq!(&page.jpeg[..2], &[0xFF, 0xD8]);
    }
}
