//! Gemini API クライアント
//!
//! 指摘解析は応答スキーマ付きのJSONモード、サマリはプレーンテキストで受け取る。

use super::EnrichmentService;
use crate::config::Config;
use crate::error::{ReportError, Result};
use inspection_report_common::prompts::analysis_response_schema;
use inspection_report_common::{
    build_analyze_prompt, build_summary_prompt, parse_analysis_response, AnalyzedObservation,
    InlineImage, Observation,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini APIリクエスト
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: Value,
}

/// Gemini APIレスポンス
#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiResponse {
    /// 全パートのテキストを連結
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| c.content.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReportError::ApiCall(format!("HTTPクライアント初期化失敗: {}", e)))?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            endpoint: GEMINI_API_BASE.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.get_api_key()?;
        Self::new(api_key, config.model.clone(), config.timeout())
    }

    /// 接続先の差し替え（テスト・プロキシ用）
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.endpoint.trim_end_matches('/'),
            self.model,
            self.api_key
        )
    }

    async fn generate(&self, request: &GeminiRequest) -> Result<String> {
        tracing::debug!(model = %self.model, "calling Gemini API");

        let response = self
            .http
            .post(self.url())
            .json(request)
            .send()
            .await
            .map_err(|e| ReportError::ApiCall(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReportError::ApiCall(format!("ステータス {}: {}", status, body)));
        }

        let payload: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ReportError::ApiParse(e.without_url().to_string()))?;
        Ok(payload.text())
    }
}

fn analyze_request(photo: Option<&InlineImage>, raw_text: Option<&str>) -> GeminiRequest {
    let mut parts = Vec::with_capacity(2);
    if let Some(photo) = photo {
        parts.push(Part::InlineData {
            inline_data: InlineData {
                mime_type: photo.mime_type().to_string(),
                data: photo.payload().to_string(),
            },
        });
    }
    parts.push(Part::Text {
        text: build_analyze_prompt(raw_text),
    });

    GeminiRequest {
        contents: vec![Content { parts }],
        generation_config: Some(GenerationConfig {
            temperature: 0.2,
            response_mime_type: "application/json".to_string(),
            response_schema: analysis_response_schema(),
        }),
    }
}

fn summary_request(project_name: &str, observations: &[Observation]) -> GeminiRequest {
    GeminiRequest {
        contents: vec![Content {
            parts: vec![Part::Text {
                text: build_summary_prompt(project_name, observations),
            }],
        }],
        generation_config: None,
    }
}

impl EnrichmentService for GeminiClient {
    async fn analyze(&self, photo: Option<&InlineImage>, raw_text: Option<&str>) -> Result<AnalyzedObservation> {
        let raw_text = raw_text.map(str::trim).filter(|t| !t.is_empty());
        if photo.is_none() && raw_text.is_none() {
            return Err(ReportError::EmptyInput("写真または所見メモが必要です".into()));
        }
        let text = self.generate(&analyze_request(photo, raw_text)).await?;
        parse_analysis_response(&text).map_err(|e| ReportError::ApiParse(e.to_string()))
    }

    async fn summarize(&self, project_name: &str, observations: &[Observation]) -> Result<String> {
        self.generate(&summary_request(project_name, observations)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_request_photo_first() {
        let photo = InlineImage::from_bytes("image/png", b"\x89PNG");
        let request = analyze_request(Some(&photo), Some("leak"));
        let json = serde_json::to_value(&request).unwrap();

        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[0]["inline_data"]["data"], photo.payload());
        assert!(parts[1]["text"].as_str().unwrap().contains("\"leak\""));
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(json["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_analyze_request_text_only() {
        let request = analyze_request(None, Some("missing label"));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_summary_request_has_no_schema() {
        let request = summary_request("Site", &[Observation::new()]);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("generationConfig").is_none());
        assert!(json["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("\"Site\""));
    }

    #[test]
    fn test_response_text_joins_parts() {
        let payload: GeminiResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"a"},{"text":"b"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(payload.text(), "ab");

        let empty: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.text(), "");
    }

    #[tokio::test]
    async fn test_analyze_requires_input() {
        let client = GeminiClient::new("k", "m", Duration::from_secs(1)).unwrap();
        let err = client.analyze(None, Some("   ")).await.unwrap_err();
        assert!(matches!(err, ReportError::EmptyInput(_)));
    }

    #[test]
    fn test_url_uses_model() {
        let client = GeminiClient::new("k", "gemini-2.0-flash", Duration::from_secs(1))
            .unwrap()
            .with_endpoint("http://localhost:9/");
        assert_eq!(
            client.url(),
            "http://localhost:9/gemini-2.0-flash:generateContent?key=k"
        );
    }
}
