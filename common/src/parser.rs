//! APIレスポンスパーサー
//!
//! AI応答からJSONオブジェクトを抽出し、指摘の構造化データとして検証する

use crate::error::{Error, Result};
use crate::types::{Discipline, ObservationPatch, Severity};
use serde::{Deserialize, Serialize};

/// AI解析結果（必須4項目）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedObservation {
    pub discipline: Discipline,
    pub description: String,
    pub corrective_action: String,
    pub severity: Severity,
}

impl AnalyzedObservation {
    /// 指摘への部分更新に変換（場所・写真は変更しない）
    pub fn into_patch(self) -> ObservationPatch {
        ObservationPatch {
            discipline: Some(self.discipline),
            description: Some(self.description),
            corrective_action: Some(self.corrective_action),
            severity: Some(self.severity),
            ..Default::default()
        }
    }
}

/// APIレスポンスからJSONオブジェクト部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 生の {...}
/// 3. エラー
///
/// # Examples
/// ```
/// use inspection_report_common::extract_json_object;
///
/// let response = "result: {\"severity\": \"Low\"}";
/// let json = extract_json_object(response).unwrap();
/// assert!(json.starts_with('{'));
/// ```
pub fn extract_json_object(response: &str) -> Result<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end >= start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(Error::Parse("JSONが見つかりません".into()))
}

/// 指摘解析レスポンスをパース
///
/// enum外の値・必須項目欠落はエラー（呼び出し側は「結果なし」として扱う）
pub fn parse_analysis_response(response: &str) -> Result<AnalyzedObservation> {
    let json_str = extract_json_object(response)?;
    let analyzed: AnalyzedObservation = serde_json::from_str(json_str.trim())
        .map_err(|e| Error::Parse(format!("解析結果 JSONパースエラー: {}", e)))?;
    Ok(analyzed)
}
