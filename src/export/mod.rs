pub mod pdf;
pub mod raster;

use crate::cancel::CancelToken;
use crate::config::Config;
use crate::editor::ReportEditor;
use crate::error::{ReportError, Result};
use crate::surface::{wait_for_layout, PreviewSurface, ViewMode};
use indicatif::{ProgressBar, ProgressStyle};
use inspection_report_common::export::DEFAULT_FILE_PREFIX;
use inspection_report_common::{pdf_file_name, Slide};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub use pdf::assemble_pdf;
pub use raster::{encode_jpeg, CanvasRasterizer, RasterPage, SlideRasterizer};

/// 出力設定
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// ファイル名の接頭辞（`<prefix>_<project>.pdf`）
    pub prefix: String,
    pub output_dir: PathBuf,
    /// レイアウト完了通知を待つ上限
    pub settle_delay: Duration,
    pub raster_scale: f32,
    pub jpeg_quality: u8,
    pub show_progress: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::from_config(&Config::default(), Path::new("."))
    }
}

impl ExportOptions {
    pub fn from_config(config: &Config, output_dir: &Path) -> Self {
        Self {
            prefix: config.file_prefix.clone(),
            output_dir: output_dir.to_path_buf(),
            settle_delay: config.settle_delay(),
            raster_scale: config.raster_scale,
            jpeg_quality: config.jpeg_quality,
            show_progress: false,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.prefix = if prefix.trim().is_empty() {
            DEFAULT_FILE_PREFIX.to_string()
        } else {
            prefix
        };
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }
}

/// 出力結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub pages: usize,
    pub bytes: usize,
}

/// 報告書をPDFに出力する
///
/// プレビュー表示に切り替えてレイアウト完了を待ち、コンテナ内のスライドを
/// 1枚ずつラスタライズしてページにする。キャンセル時・失敗時はファイルを書かない。
/// ラスタライズはブロッキングスレッド上で行う。
pub async fn export_report<R: SlideRasterizer + Send + 'static>(
    editor: &ReportEditor,
    surface: &mut PreviewSurface,
    container_id: &str,
    options: &ExportOptions,
    rasterizer: Arc<R>,
    cancel: &CancelToken,
) -> Result<ExportSummary> {
    // 表示切替より先に購読しておく
    let mut layout = surface.subscribe_layout();
    surface.show(ViewMode::Preview, editor);
    let wait = wait_for_layout(&mut layout, options.settle_delay).await;
    tracing::debug!(?wait, "layout settled");

    if cancel.is_cancelled() {
        return Err(ReportError::Cancelled);
    }

    let document = surface
        .container(container_id)
        .ok_or_else(|| ReportError::ContainerNotFound(container_id.to_string()))?;

    let project_name = &editor.state().metadata.project_name;
    let file_name = pdf_file_name(&options.prefix, project_name);
    let path = options.output_dir.join(&file_name);

    let progress = options.show_progress.then(|| progress_bar(document.len()));
    let pages = {
        let slides = document.slides.clone();
        let options = options.clone();
        let cancel = cancel.clone();
        let progress = progress.clone();
        tokio::task::spawn_blocking(move || {
            rasterize_slides(&slides, rasterizer.as_ref(), &options, &cancel, progress.as_ref())
        })
        .await
        .map_err(|e| ReportError::Rasterize(format!("ラスタライズ処理が中断されました: {}", e)))
        .and_then(|pages| pages)
    };
    if let Some(pb) = &progress {
        match &pages {
            Ok(_) => pb.finish_with_message("done"),
            Err(_) => pb.abandon(),
        }
    }
    let pages = pages?;

    let title = &editor.state().metadata.report_title;
    let paired: Vec<(&Slide, RasterPage)> = document.slides.iter().zip(pages).collect();
    let bytes = assemble_pdf(title, &paired)?;

    if cancel.is_cancelled() {
        return Err(ReportError::Cancelled);
    }

    if !options.output_dir.exists() {
        tokio::fs::create_dir_all(&options.output_dir).await?;
    }
    tokio::fs::write(&path, &bytes).await?;

    tracing::info!(path = %path.display(), pages = paired.len(), bytes = bytes.len(), "report exported");
    Ok(ExportSummary {
        path,
        pages: paired.len(),
        bytes: bytes.len(),
    })
}

/// スライドを並列にラスタライズ（結果はスライド順）
fn rasterize_slides<R: SlideRasterizer>(
    slides: &[Slide],
    rasterizer: &R,
    options: &ExportOptions,
    cancel: &CancelToken,
    progress: Option<&ProgressBar>,
) -> Result<Vec<RasterPage>> {
    slides
        .par_iter()
        .map(|slide| {
            if cancel.is_cancelled() {
                return Err(ReportError::Cancelled);
            }
            let canvas = rasterizer.rasterize(slide, options.raster_scale)?;
            let page = encode_jpeg(&canvas, options.jpeg_quality)?;
            if let Some(pb) = progress {
                pb.inc(1);
            }
            Ok(page)
        })
        .collect()
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}/{len:3} {msg}")
        .map(|style| style.progress_chars("##-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}
