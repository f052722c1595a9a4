//! 報告書データモデル
//!
//! - ReportMetadata: 報告書全体の情報（施設・検査員・日付など）
//! - Observation: 1件の指摘事項（写真1枚 + テキスト + 分類）
//! - ReportState: 編集セッション中の唯一の状態（メタデータ + 指摘リスト）

use crate::error::{Error, Result};
use crate::inline_image::InlineImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 新規セッションの既定タイトル
pub const DEFAULT_REPORT_TITLE: &str = "Quality Inspection Report";

/// 工種区分（順序なし）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Discipline {
    Mechanical,
    Electrical,
    Plumbing,
    #[serde(rename = "Fire Protection")]
    FireProtection,
    #[serde(rename = "HVAC")]
    Hvac,
    #[default]
    General,
}

impl Discipline {
    pub const ALL: [Discipline; 6] = [
        Discipline::Mechanical,
        Discipline::Electrical,
        Discipline::Plumbing,
        Discipline::FireProtection,
        Discipline::Hvac,
        Discipline::General,
    ];

    /// 表示名（AIスキーマのenum値と同一）
    pub fn as_str(&self) -> &'static str {
        match self {
            Discipline::Mechanical => "Mechanical",
            Discipline::Electrical => "Electrical",
            Discipline::Plumbing => "Plumbing",
            Discipline::FireProtection => "Fire Protection",
            Discipline::Hvac => "HVAC",
            Discipline::General => "General",
        }
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Discipline {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        Discipline::ALL
            .into_iter()
            .find(|d| d.as_str().to_lowercase() == normalized)
            .ok_or_else(|| Error::InvalidValue(format!("Unknown discipline: {}", s)))
    }
}

/// 重要度（Low < Medium < High < Critical）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Severity::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidValue(format!("Unknown severity: {}", s)))
    }
}

/// 指摘ID（生成ごとに一意、再利用しない）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservationId(Uuid);

impl ObservationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ObservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ObservationId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| Error::InvalidValue(format!("Invalid observation id {}: {}", s, e)))
    }
}

/// 指摘事項
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub id: ObservationId,

    #[serde(default)]
    pub discipline: Discipline,

    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub corrective_action: String,

    #[serde(default)]
    pub severity: Severity,

    /// 写真（空文字 = 写真なし）
    #[serde(default, rename = "photoUrl", with = "photo_url")]
    pub photo: Option<InlineImage>,
}

impl Observation {
    /// 既定値（General / Low / 空文字 / 写真なし）で新規作成
    pub fn new() -> Self {
        Self {
            id: ObservationId::generate(),
            discipline: Discipline::default(),
            location: String::new(),
            description: String::new(),
            corrective_action: String::new(),
            severity: Severity::default(),
            photo: None,
        }
    }

    /// 写真付きで新規作成（一括アップロード用）
    pub fn with_photo(photo: InlineImage) -> Self {
        Self {
            photo: Some(photo),
            ..Self::new()
        }
    }

    /// 部分更新を適用（指定されたフィールドのみ変更、IDは不変）
    pub fn apply(&mut self, patch: ObservationPatch) {
        if let Some(discipline) = patch.discipline {
            self.discipline = discipline;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(corrective_action) = patch.corrective_action {
            self.corrective_action = corrective_action;
        }
        if let Some(severity) = patch.severity {
            self.severity = severity;
        }
        if let Some(photo) = patch.photo {
            self.photo = photo;
        }
    }

    pub fn has_photo(&self) -> bool {
        self.photo.is_some()
    }
}

impl Default for Observation {
    fn default() -> Self {
        Self::new()
    }
}

/// 指摘事項の部分更新
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationPatch {
    pub discipline: Option<Discipline>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub corrective_action: Option<String>,
    pub severity: Option<Severity>,
    /// Some(None) で写真を外す
    pub photo: Option<Option<InlineImage>>,
}

impl ObservationPatch {
    pub fn description(value: impl Into<String>) -> Self {
        Self {
            description: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn photo(photo: InlineImage) -> Self {
        Self {
            photo: Some(Some(photo)),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// 報告書メタデータ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    #[serde(default)]
    pub project_name: String,

    #[serde(default)]
    pub report_title: String,

    /// 検査日（YYYY-MM-DD、検証なし）
    #[serde(default)]
    pub date: String,

    #[serde(default)]
    pub inspector_name: String,

    /// 描画では未使用
    #[serde(default)]
    pub client_name: String,

    #[serde(default)]
    pub location: String,
}

impl ReportMetadata {
    /// 1フィールドだけ差し替えた新しいレコードを返す
    pub fn with_field(&self, field: MetadataField, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        let value = value.into();
        match field {
            MetadataField::ProjectName => next.project_name = value,
            MetadataField::ReportTitle => next.report_title = value,
            MetadataField::Date => next.date = value,
            MetadataField::InspectorName => next.inspector_name = value,
            MetadataField::ClientName => next.client_name = value,
            MetadataField::Location => next.location = value,
        }
        next
    }

    pub fn get(&self, field: MetadataField) -> &str {
        match field {
            MetadataField::ProjectName => &self.project_name,
            MetadataField::ReportTitle => &self.report_title,
            MetadataField::Date => &self.date,
            MetadataField::InspectorName => &self.inspector_name,
            MetadataField::ClientName => &self.client_name,
            MetadataField::Location => &self.location,
        }
    }
}

/// メタデータのフィールド名
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    ProjectName,
    ReportTitle,
    Date,
    InspectorName,
    ClientName,
    Location,
}

impl MetadataField {
    pub const ALL: [MetadataField; 6] = [
        MetadataField::ProjectName,
        MetadataField::ReportTitle,
        MetadataField::Date,
        MetadataField::InspectorName,
        MetadataField::ClientName,
        MetadataField::Location,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            MetadataField::ProjectName => "projectName",
            MetadataField::ReportTitle => "reportTitle",
            MetadataField::Date => "date",
            MetadataField::InspectorName => "inspectorName",
            MetadataField::ClientName => "clientName",
            MetadataField::Location => "location",
        }
    }
}

impl FromStr for MetadataField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        MetadataField::ALL
            .into_iter()
            .find(|f| f.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidValue(format!("Unknown metadata field: {}", s)))
    }
}

/// 編集セッションの状態
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportState {
    pub metadata: ReportMetadata,
    pub observations: Vec<Observation>,
}

impl ReportState {
    /// セッション開始時の初期状態
    pub fn new_session(today: impl Into<String>) -> Self {
        Self {
            metadata: ReportMetadata {
                report_title: DEFAULT_REPORT_TITLE.to_string(),
                date: today.into(),
                ..Default::default()
            },
            observations: Vec::new(),
        }
    }

    pub fn observation(&self, id: ObservationId) -> Option<&Observation> {
        self.observations.iter().find(|o| o.id == id)
    }

    pub fn position(&self, id: ObservationId) -> Option<usize> {
        self.observations.iter().position(|o| o.id == id)
    }
}

/// `photoUrl` は空文字で「写真なし」を表す
mod photo_url {
    use crate::inline_image::InlineImage;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(photo: &Option<InlineImage>, s: S) -> Result<S::Ok, S::Error> {
        match photo {
            Some(image) => s.serialize_str(image.as_str()),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<InlineImage>, D::Error> {
        let raw = String::deserialize(d)?;
        if raw.is_empty() {
            return Ok(None);
        }
        InlineImage::parse(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}
