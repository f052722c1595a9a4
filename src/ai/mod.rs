//! AI補完
//!
//! 写真・所見メモから指摘内容を起こし、報告書全体のサマリを作る。
//! どちらも失敗しても編集中のデータには影響しない。

pub mod gemini;

pub use gemini::GeminiClient;

use crate::cancel::CancelToken;
use crate::editor::{EditOutcome, EditPolicy, ObservationId, ReportEditor};
use crate::error::{ReportError, Result};
use inspection_report_common::{AnalyzedObservation, InlineImage, Observation, ReportState};
use std::future::Future;

/// サマリが空だったときの表示
pub const NO_SUMMARY: &str = "No summary available.";

/// 外部のAIサービス
pub trait EnrichmentService {
    /// 写真・所見メモ（少なくとも一方）から指摘内容を推定
    fn analyze(
        &self,
        photo: Option<&InlineImage>,
        raw_text: Option<&str>,
    ) -> impl Future<Output = Result<AnalyzedObservation>>;

    /// 指摘一覧のサマリ（プレーンテキスト）
    fn summarize(&self, project_name: &str, observations: &[Observation]) -> impl Future<Output = Result<String>>;
}

/// キャンセルされたら `ReportError::Cancelled` で打ち切る
pub async fn with_cancel<T>(cancel: &CancelToken, fut: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ReportError::Cancelled),
        result = fut => result,
    }
}

/// 指摘1件をAIで補完して反映する
///
/// 解析結果が読めなかった場合は `Ok(None)`（指摘はそのまま）。
/// 写真も所見メモもなければ呼び出さずに `EditOutcome::EmptyInput` を返す。
pub async fn enrich_observation<S: EnrichmentService>(
    service: &S,
    editor: &mut ReportEditor,
    id: ObservationId,
    cancel: &CancelToken,
) -> Result<Option<EditOutcome>> {
    let Some(observation) = editor.state().observation(id) else {
        return match editor.policy() {
            EditPolicy::Lenient => Ok(Some(EditOutcome::NotFound)),
            EditPolicy::Strict => Err(ReportError::ObservationNotFound(id)),
        };
    };

    let photo = observation.photo.clone();
    let raw_text = Some(observation.description.trim().to_string()).filter(|t| !t.is_empty());
    if photo.is_none() && raw_text.is_none() {
        return Ok(Some(EditOutcome::EmptyInput));
    }

    let analysis = with_cancel(cancel, service.analyze(photo.as_ref(), raw_text.as_deref())).await;
    match analysis {
        Ok(analysis) => editor.apply_analysis(id, analysis).map(Some),
        Err(ReportError::ApiParse(reason)) => {
            tracing::warn!(%id, %reason, "analysis response unusable, observation left unchanged");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// 報告書サマリ（データモデルには書き込まない）
pub async fn summarize_report<S: EnrichmentService>(
    service: &S,
    state: &ReportState,
    cancel: &CancelToken,
) -> Result<String> {
    let summary = with_cancel(
        cancel,
        service.summarize(&state.metadata.project_name, &state.observations),
    )
    .await?;

    let summary = summary.trim();
    if summary.is_empty() {
        Ok(NO_SUMMARY.to_string())
    } else {
        Ok(summary.to_string())
    }
}
