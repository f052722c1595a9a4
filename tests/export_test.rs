//! PDF出力の統合テスト

use image::{ImageBuffer, Rgba};
use inspection_report::cancel::CancelToken;
use inspection_report::editor::ReportEditor;
use inspection_report::error::ReportError;
use inspection_report::export::{export_report, CanvasRasterizer, ExportOptions, SlideRasterizer};
use inspection_report::photo::PhotoFile;
use inspection_report::surface::{PreviewSurface, ViewMode, REPORT_CONTAINER_ID};
use inspection_report_common::layout::{PAGE_HEIGHT_PT, PAGE_WIDTH_PT};
use inspection_report_common::{MetadataField, ReportState, Slide};
use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;

/// 各ページの MediaBox を順に取り出す（親の Pages から継承される場合も辿る）
fn media_boxes(doc: &lopdf::Document) -> Vec<Vec<f32>> {
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let mut dict = doc.get_dictionary(page_id).expect("ページ辞書がない");
            loop {
                if let Ok(media_box) = dict.get(b"MediaBox") {
                    return media_box
                        .as_array()
                        .expect("MediaBoxが配列でない")
                        .iter()
                        .map(|v| v.as_float().expect("MediaBoxの値が数値でない"))
                        .collect();
                }
                let parent = dict
                    .get(b"Parent")
                    .and_then(|p| p.as_reference())
                    .expect("MediaBoxが見つからない");
                dict = doc.get_dictionary(parent).expect("親辞書がない");
            }
        })
        .collect()
}

fn fast_options(dir: &Path) -> ExportOptions {
    ExportOptions {
        raster_scale: 0.25,
        jpeg_quality: 80,
        settle_delay: Duration::from_millis(10),
        ..ExportOptions::default()
    }
    .with_prefix("Audit")
    .with_output_dir(dir)
}

fn rgba_png(alpha: u8) -> Vec<u8> {
    let img = ImageBuffer::from_pixel(6, 4, Rgba([10, 120, 200, alpha]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// 呼び出されたスライドの (ページ番号, 総ページ数) を記録
#[derive(Default)]
struct RecordingRasterizer {
    seen: Mutex<Vec<(usize, usize)>>,
}

impl SlideRasterizer for RecordingRasterizer {
    fn rasterize(&self, slide: &Slide, scale: f32) -> inspection_report::error::Result<image::RgbImage> {
        self.seen
            .lock()
            .unwrap()
            .push((slide.page_number, slide.total_pages));
        CanvasRasterizer::new().rasterize(slide, scale)
    }
}

async fn editor_with_photos(count: usize) -> ReportEditor {
    let mut editor = ReportEditor::new(ReportState::new_session("2026-01-18"));
    editor.update_metadata_field(MetadataField::ProjectName, "North Wing");
    let files: Vec<_> = (0..count)
        .map(|i| PhotoFile::new(format!("{}.png", i), rgba_png(if i % 2 == 0 { 255 } else { 0 })))
        .collect();
    editor.attach_photos_batch(&files).await.unwrap();
    editor
}

#[tokio::test]
async fn test_export_one_page_per_slide() {
    let dir = tempdir().expect("Failed to create temp dir");
    let editor = editor_with_photos(3).await;
    let mut surface = PreviewSurface::new(1216.0);
    let rasterizer = Arc::new(RecordingRasterizer::default());

    let summary = export_report(
        &editor,
        &mut surface,
        REPORT_CONTAINER_ID,
        &fast_options(dir.path()),
        Arc::clone(&rasterizer),
        &CancelToken::new(),
    )
    .await
    .expect("PDF出力に失敗");

    assert_eq!(summary.pages, 4);
    assert_eq!(summary.path, dir.path().join("Audit_North_Wing.pdf"));

    let bytes = std::fs::read(&summary.path).expect("PDFが作成されていない");
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(bytes.len(), summary.bytes);

    let mut seen = rasterizer.seen.lock().unwrap().clone();
    seen.sort();
    assert_eq!(seen, vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
}

/// 書き出したファイル自体がスライド数と同じページ数で、全ページがスライド寸法
#[tokio::test]
async fn test_exported_pdf_pages_match_slides() {
    let dir = tempdir().expect("Failed to create temp dir");
    let editor = editor_with_photos(3).await;
    let mut surface = PreviewSurface::new(1216.0);

    let summary = export_report(
        &editor,
        &mut surface,
        REPORT_CONTAINER_ID,
        &fast_options(dir.path()),
        Arc::new(CanvasRasterizer::new()),
        &CancelToken::new(),
    )
    .await
    .expect("PDF出力に失敗");

    let doc = lopdf::Document::load(&summary.path).expect("PDFを読み込めない");
    let boxes = media_boxes(&doc);
    assert_eq!(boxes.len(), 4);
    for media_box in boxes {
        assert_eq!(media_box.len(), 4);
        assert!(media_box[0].abs() < 0.01 && media_box[1].abs() < 0.01);
        assert!((media_box[2] - PAGE_WIDTH_PT).abs() < 1.0, "width {:?}", media_box);
        assert!((media_box[3] - PAGE_HEIGHT_PT).abs() < 1.0, "height {:?}", media_box);
    }
}

/// 出力はプレビュー表示に切り替えてから行う
#[tokio::test]
async fn test_export_switches_to_preview() {
    let dir = tempdir().expect("Failed to create temp dir");
    let editor = editor_with_photos(1).await;
    let mut surface = PreviewSurface::new(1216.0);
    assert_eq!(surface.mode(), ViewMode::Edit);

    export_report(
        &editor,
        &mut surface,
        REPORT_CONTAINER_ID,
        &fast_options(dir.path()),
        Arc::new(CanvasRasterizer::new()),
        &CancelToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(surface.mode(), ViewMode::Preview);
}

/// プロジェクト名が空なら "Report"
#[tokio::test]
async fn test_export_empty_project_name() {
    let dir = tempdir().expect("Failed to create temp dir");
    let editor = ReportEditor::new(ReportState::new_session("2026-01-18"));
    let mut surface = PreviewSurface::new(800.0);

    let summary = export_report(
        &editor,
        &mut surface,
        REPORT_CONTAINER_ID,
        &fast_options(dir.path()),
        Arc::new(CanvasRasterizer::new()),
        &CancelToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(summary.pages, 1);
    assert!(dir.path().join("Audit_Report.pdf").exists());
}

#[tokio::test]
async fn test_export_unknown_container() {
    let dir = tempdir().expect("Failed to create temp dir");
    let editor = editor_with_photos(1).await;
    let mut surface = PreviewSurface::new(1216.0).with_container_id("report-content");

    let err = export_report(
        &editor,
        &mut surface,
        "missing",
        &fast_options(dir.path()),
        Arc::new(CanvasRasterizer::new()),
        &CancelToken::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ReportError::ContainerNotFound(_)));
    assert!(!dir.path().join("Audit_North_Wing.pdf").exists());
}

#[tokio::test]
async fn test_export_cancelled_before_start() {
    let dir = tempdir().expect("Failed to create temp dir");
    let editor = editor_with_photos(2).await;
    let before = editor.state().clone();
    let mut surface = PreviewSurface::new(1216.0);
    let cancel = CancelToken::new();
    cancel.cancel();

    let err = export_report(
        &editor,
        &mut surface,
        REPORT_CONTAINER_ID,
        &fast_options(dir.path()),
        Arc::new(CanvasRasterizer::new()),
        &cancel,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ReportError::Cancelled));
    assert!(!dir.path().join("Audit_North_Wing.pdf").exists());
    assert_eq!(editor.state(), &before);
}

/// 出力先ディレクトリがなければ作成する
#[tokio::test]
async fn test_export_creates_output_dir() {
    let dir = tempdir().expect("Failed to create temp dir");
    let nested = dir.path().join("out").join("reports");
    let editor = editor_with_photos(1).await;
    let mut surface = PreviewSurface::new(1216.0);

    let summary = export_report(
        &editor,
        &mut surface,
        REPORT_CONTAINER_ID,
        &fast_options(&nested),
        Arc::new(CanvasRasterizer::new()),
        &CancelToken::new(),
    )
    .await
    .unwrap();

    assert!(summary.path.starts_with(&nested));
    assert!(summary.path.exists());
}
