//! プレビュー表示面
//!
//! 編集/プレビューの表示モードと、描画済みドキュメント（コンテナID単位）を保持する。
//! プレビューへの切替時に描画・倍率計算を行い、レイアウト完了を通知する。

use crate::editor::ReportEditor;
use inspection_report_common::layout::PREVIEW_PADDING;
use inspection_report_common::{preview_scale, render_document, RenderedDocument};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::watch;

/// 報告書を描画するコンテナID
pub const REPORT_CONTAINER_ID: &str = "report-content";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Edit,
    Preview,
}

/// レイアウト完了の待ち方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutWait {
    /// 通知を受けた
    Signaled,
    /// 通知がなく固定待ちで進めた
    TimedOut,
}

#[derive(Debug)]
pub struct PreviewSurface {
    mode: ViewMode,
    container_id: String,
    container_width: f32,
    padding: f32,
    scale: f32,
    containers: HashMap<String, RenderedDocument>,
    rendered_revision: Option<u64>,
    /// レイアウト完了ごとに世代を進める
    layout_tx: watch::Sender<u64>,
}

impl PreviewSurface {
    pub fn new(container_width: f32) -> Self {
        let (layout_tx, _) = watch::channel(0);
        Self {
            mode: ViewMode::Edit,
            container_id: REPORT_CONTAINER_ID.to_string(),
            container_width,
            padding: PREVIEW_PADDING,
            scale: preview_scale(container_width, PREVIEW_PADDING),
            containers: HashMap::new(),
            rendered_revision: None,
            layout_tx,
        }
    }

    pub fn with_padding(mut self, padding: f32) -> Self {
        self.padding = padding;
        self.scale = preview_scale(self.container_width, padding);
        self
    }

    pub fn with_container_id(mut self, id: impl Into<String>) -> Self {
        self.container_id = id.into();
        self
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// 表示モード切替（プレビューへ入るたびに描画・倍率を更新）
    pub fn show(&mut self, mode: ViewMode, editor: &ReportEditor) {
        self.mode = mode;
        match mode {
            ViewMode::Preview => {
                self.scale = preview_scale(self.container_width, self.padding);
                self.render(editor);
            }
            ViewMode::Edit => {
                // 編集中は描画面を外す
                self.containers.remove(&self.container_id);
                self.rendered_revision = None;
            }
        }
    }

    /// 表示幅の変更
    pub fn resize(&mut self, container_width: f32) {
        self.container_width = container_width;
        self.scale = preview_scale(container_width, self.padding);
        tracing::debug!(width = container_width, scale = self.scale, "preview resized");
    }

    /// 状態が変わっていれば再描画（プレビュー中のみ）
    pub fn refresh(&mut self, editor: &ReportEditor) -> bool {
        if self.mode != ViewMode::Preview || self.rendered_revision == Some(editor.revision()) {
            return false;
        }
        self.render(editor);
        true
    }

    fn render(&mut self, editor: &ReportEditor) {
        let document = render_document(editor.state());
        tracing::debug!(slides = document.len(), revision = editor.revision(), "preview rendered");
        self.containers.insert(self.container_id.clone(), document);
        self.rendered_revision = Some(editor.revision());
        self.layout_tx.send_modify(|generation| *generation += 1);
    }

    pub fn container(&self, id: &str) -> Option<&RenderedDocument> {
        self.containers.get(id)
    }

    /// レイアウト完了通知の購読（表示切替の前に取得する）
    pub fn subscribe_layout(&self) -> watch::Receiver<u64> {
        self.layout_tx.subscribe()
    }
}

/// レイアウト完了を待つ。通知がなければ `fallback` 経過後に進める
pub async fn wait_for_layout(receiver: &mut watch::Receiver<u64>, fallback: Duration) -> LayoutWait {
    if receiver.has_changed().unwrap_or(false) {
        receiver.borrow_and_update();
        return LayoutWait::Signaled;
    }
    match tokio::time::timeout(fallback, receiver.changed()).await {
        Ok(Ok(())) => LayoutWait::Signaled,
        _ => {
            tracing::debug!(?fallback, "no layout signal, proceeding after settle delay");
            LayoutWait::TimedOut
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspection_report_common::ReportState;

    #[test]
    fn test_preview_renders_container() {
        let mut editor = ReportEditor::new(ReportState::new_session("2026-01-18"));
        editor.add_observation();
        let mut surface = PreviewSurface::new(1216.0);

        assert!(surface.container(REPORT_CONTAINER_ID).is_none());
        surface.show(ViewMode::Preview, &editor);
        assert_eq!(surface.mode(), ViewMode::Preview);
        assert_eq!(surface.container(REPORT_CONTAINER_ID).unwrap().len(), 2);
        assert_eq!(surface.scale(), 1.0);
    }

    #[test]
    fn test_resize_recomputes_scale() {
        let mut surface = PreviewSurface::new(1216.0);
        surface.resize(656.0);
        assert!((surface.scale() - 0.5).abs() < 0.0001);
        surface.resize(10.0);
        assert_eq!(surface.scale(), 0.0);
    }

    #[test]
    fn test_refresh_only_when_changed() {
        let mut editor = ReportEditor::default();
        let mut surface = PreviewSurface::new(800.0);

        assert!(!surface.refresh(&editor));
        surface.show(ViewMode::Preview, &editor);
        assert!(!surface.refresh(&editor));

        editor.add_observation();
        assert!(surface.refresh(&editor));
        assert_eq!(surface.container(REPORT_CONTAINER_ID).unwrap().len(), 2);
    }

    #[test]
    fn test_edit_mode_unmounts() {
        let editor = ReportEditor::default();
        let mut surface = PreviewSurface::new(800.0);
        surface.show(ViewMode::Preview, &editor);
        surface.show(ViewMode::Edit, &editor);
        assert!(surface.container(REPORT_CONTAINER_ID).is_none());
    }

    #[tokio::test]
    async fn test_wait_signaled_after_show() {
        let editor = ReportEditor::default();
        let mut surface = PreviewSurface::new(800.0);
        let mut rx = surface.subscribe_layout();
        surface.show(ViewMode::Preview, &editor);

        let wait = wait_for_layout(&mut rx, Duration::from_secs(5)).await;
        assert_eq!(wait, LayoutWait::Signaled);
    }

    #[tokio::test]
    async fn test_wait_falls_back_without_signal() {
        let surface = PreviewSurface::new(800.0);
        let mut rx = surface.subscribe_layout();

        let wait = wait_for_layout(&mut rx, Duration::from_millis(20)).await;
        assert_eq!(wait, LayoutWait::TimedOut);
    }
}
