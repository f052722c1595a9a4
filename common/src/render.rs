//! スライド描画（ReportState → スライド列）
//!
//! 状態のスナップショットから表示用のスライド記述子を生成する純粋関数。
//! 1枚目は表紙、2枚目以降は指摘1件につき1枚。
//! 空欄にはプレースホルダーを入れ、書きかけの報告書でも常に描画可能にする。

use crate::inline_image::InlineImage;
use crate::types::{Discipline, ObservationId, ReportState, Severity};

/// 表紙タイトル（施設名未入力時）
pub const COVER_TITLE_PLACEHOLDER: &str = "Field Compliance Analysis";
/// 表紙の検査員・日付（未入力時）
pub const COVER_FIELD_PLACEHOLDER: &str = "TBD";
pub const COVER_EYEBROW: &str = "Audit Statement";
pub const COVER_INSPECTOR_LABEL: &str = "Lead Inspector";
pub const COVER_DATE_LABEL: &str = "Issuance Date";

/// 走行ヘッダー
pub const HEADER_BRAND: &str = "Quality Report";
pub const HEADER_PROJECT_PLACEHOLDER: &str = "Pharmacy Audit Details";
pub const HEADER_DATE_LABEL: &str = "Inspection Date";
pub const HEADER_DATE_PLACEHOLDER: &str = "N/A";

/// 指摘スライド
pub const PHOTO_PLACEHOLDER: &str = "Image documentation pending";
pub const DESCRIPTION_PLACEHOLDER: &str =
    "Analytical data pending verification by lead auditor.";
pub const ASSESSMENT_LABEL: &str = "Technical Assessment";
pub const CORRECTIVE_ACTION_LABEL: &str = "Corrective Action";
pub const COMPLIANCE_LABEL: &str = "MEP Standard Compliance";
pub const COMPLIANCE_NOTE: &str = "Log generated via MEP Audit Master. Discovered deviations require immediate corrective action as per project specifications.";

/// 写真枠の中身
#[derive(Debug, Clone, PartialEq)]
pub enum PhotoSlot {
    Photo(InlineImage),
    Placeholder(&'static str),
}

/// スライドの種類
#[derive(Debug, Clone, PartialEq)]
pub enum SlideKind {
    Cover {
        title: String,
        inspector: String,
        date: String,
    },
    Observation {
        observation_id: ObservationId,
        /// "OBS #001"
        index_label: String,
        photo: PhotoSlot,
        description: String,
        corrective_action: Option<String>,
        discipline: Discipline,
        severity: Severity,
        /// 走行ヘッダー用
        project_name: String,
        date: String,
    },
}

/// 1ページ分のスライド
#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    pub kind: SlideKind,
    pub page_number: usize,
    pub total_pages: usize,
}

impl Slide {
    /// "Page 3 / 5"
    pub fn page_label(&self) -> String {
        format!("Page {} / {}", self.page_number, self.total_pages)
    }

    pub fn is_cover(&self) -> bool {
        matches!(self.kind, SlideKind::Cover { .. })
    }
}

/// 描画結果（スライド列）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedDocument {
    pub slides: Vec<Slide>,
}

impl RenderedDocument {
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

/// 指摘番号ラベル（3桁ゼロ埋め）
pub fn index_label(index: usize) -> String {
    format!("OBS #{:03}", index)
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.trim().is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

/// 状態からスライド列を生成（総ページ数は毎回数え直す）
pub fn render_document(state: &ReportState) -> RenderedDocument {
    let metadata = &state.metadata;
    let total_pages = 1 + state.observations.len();

    let mut slides = Vec::with_capacity(total_pages);

    slides.push(Slide {
        kind: SlideKind::Cover {
            title: or_placeholder(&metadata.project_name, COVER_TITLE_PLACEHOLDER),
            inspector: or_placeholder(&metadata.inspector_name, COVER_FIELD_PLACEHOLDER),
            date: or_placeholder(&metadata.date, COVER_FIELD_PLACEHOLDER),
        },
        page_number: 1,
        total_pages,
    });

    let project_name = or_placeholder(&metadata.project_name, HEADER_PROJECT_PLACEHOLDER);
    let date = or_placeholder(&metadata.date, HEADER_DATE_PLACEHOLDER);

    for (index, obs) in state.observations.iter().enumerate() {
        let photo = match &obs.photo {
            Some(image) => PhotoSlot::Photo(image.clone()),
            None => PhotoSlot::Placeholder(PHOTO_PLACEHOLDER),
        };
        let corrective_action = if obs.corrective_action.trim().is_empty() {
            None
        } else {
            Some(obs.corrective_action.clone())
        };

        slides.push(Slide {
            kind: SlideKind::Observation {
                observation_id: obs.id,
                index_label: index_label(index + 1),
                photo,
                description: or_placeholder(&obs.description, DESCRIPTION_PLACEHOLDER),
                corrective_action,
                discipline: obs.discipline,
                severity: obs.severity,
                project_name: project_name.clone(),
                date: date.clone(),
            },
            page_number: index + 2,
            total_pages,
        });
    }

    RenderedDocument { slides }
}
