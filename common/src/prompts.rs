//! プロンプト生成モジュール
//!
//! AI補完（指摘の自動記入・報告書サマリ）で使うプロンプトと応答スキーマ

use crate::types::{Discipline, Observation, Severity};
use serde_json::{json, Value};

/// 指摘解析プロンプト
///
/// # Arguments
/// * `raw_text` - 入力済みの所見メモ（なければ写真のみで解析）
pub fn build_analyze_prompt(raw_text: Option<&str>) -> String {
    let focus = match raw_text.map(str::trim).filter(|t| !t.is_empty()) {
        Some(text) => format!("Original observation: \"{}\"", text),
        None => "Analyze the photo for common construction defects or compliance issues.".to_string(),
    };

    format!(
        r#"Act as a senior MEP (Mechanical, Electrical, Plumbing) QA/QC Engineer.
Analyze the provided image and/or text observation.
Provide a professional, technical description and a recommended corrective action.
{focus}"#
    )
}

/// 指摘解析の応答スキーマ（enumは閉じた集合のみ許可）
pub fn analysis_response_schema() -> Value {
    let disciplines: Vec<&str> = Discipline::ALL.iter().map(|d| d.as_str()).collect();
    let severities: Vec<&str> = Severity::ALL.iter().map(|s| s.as_str()).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "discipline": {
                "type": "STRING",
                "enum": disciplines,
                "description": "The MEP discipline this observation belongs to."
            },
            "description": {
                "type": "STRING",
                "description": "Professional technical description of the observation."
            },
            "correctiveAction": {
                "type": "STRING",
                "description": "Clear instructions for correction."
            },
            "severity": {
                "type": "STRING",
                "enum": severities,
                "description": "Severity level based on safety and compliance."
            }
        },
        "required": ["discipline", "description", "correctiveAction", "severity"]
    })
}

/// サマリプロンプト
///
/// 指摘一覧を `1. [Discipline] description` 形式で列挙する
pub fn build_summary_prompt(project_name: &str, observations: &[Observation]) -> String {
    let listing = observations
        .iter()
        .enumerate()
        .map(|(i, o)| format!("{}. [{}] {}", i + 1, o.discipline, o.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Summarize the following MEP inspection for project \"{}\". Focus on major trends and critical risks.\n\nObservations:\n{}",
        project_name, listing
    )
}
