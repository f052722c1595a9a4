//! PDF export core utilities shared by CLI and other hosts.

use crate::layout::{Rect, SlideGeometry, PAGE_HEIGHT_PT, PAGE_WIDTH_PT, SLIDE_HEIGHT, SLIDE_WIDTH};
use crate::render::{
    Slide, SlideKind, ASSESSMENT_LABEL, COMPLIANCE_LABEL, COMPLIANCE_NOTE, CORRECTIVE_ACTION_LABEL,
    COVER_DATE_LABEL, COVER_EYEBROW, COVER_INSPECTOR_LABEL, HEADER_BRAND, HEADER_DATE_LABEL,
};
use regex::Regex;

/// 出力ファイル名の接頭辞
pub const DEFAULT_FILE_PREFIX: &str = "Audit";
/// 施設名が空の場合のファイル名
pub const FALLBACK_FILE_SEGMENT: &str = "Report";

/// 1スライドの配置先（全ページ共通: 原点(0,0)・ページ全面）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagePlacement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PagePlacement {
    /// レイアウト単位（1120×630）
    pub fn full_page() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: SLIDE_WIDTH,
            height: SLIDE_HEIGHT,
        }
    }

    /// pt単位（840×472.5）
    pub fn full_page_pt() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: PAGE_WIDTH_PT,
            height: PAGE_HEIGHT_PT,
        }
    }
}

/// 施設名をファイル名用に整形
///
/// 前後の空白を除き、連続する空白を `_` 1つにまとめる。空なら "Report"。
pub fn sanitize_project_name(project_name: &str) -> String {
    lazy_static::lazy_static! {
        static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
    }

    let trimmed = project_name.trim();
    if trimmed.is_empty() {
        return FALLBACK_FILE_SEGMENT.to_string();
    }
    WHITESPACE_RE.replace_all(trimmed, "_").into_owned()
}

/// `<prefix>_<施設名>.pdf`
pub fn pdf_file_name(prefix: &str, project_name: &str) -> String {
    format!("{}_{}.pdf", prefix, sanitize_project_name(project_name))
}

/// PDFのテキストレイヤーに置く1行（レイアウト単位、yはベースライン・上から）
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

impl TextRun {
    fn new(text: impl Into<String>, x: f32, y: f32, size: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            size,
        }
    }
}

/// 幅に収まるよう単語単位で折り返す（平均文字幅で概算）
fn wrap_text(text: &str, width: f32, size: f32) -> Vec<String> {
    let max_chars = ((width / (size * 0.5)).floor() as usize).max(8);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > max_chars {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }

    lines
}

fn push_wrapped(runs: &mut Vec<TextRun>, text: &str, area: Rect, start_y: f32, size: f32, max_lines: usize) -> f32 {
    let line_height = size * 1.5;
    let mut y = start_y;
    for line in wrap_text(text, area.width, size).into_iter().take(max_lines) {
        if y > area.bottom() {
            break;
        }
        if !line.is_empty() {
            runs.push(TextRun::new(line, area.x, y, size));
        }
        y += line_height;
    }
    y
}

/// スライドのテキスト配置を構築
pub fn build_slide_text(slide: &Slide, geometry: &SlideGeometry) -> Vec<TextRun> {
    let mut runs = Vec::new();

    match &slide.kind {
        SlideKind::Cover { title, inspector, date } => {
            let area = geometry.cover_text();
            let bottom = area.bottom();
            runs.push(TextRun::new(COVER_EYEBROW.to_uppercase(), area.x, bottom - 230.0, 11.0));
            push_wrapped(&mut runs, title, area, bottom - 180.0, 44.0, 2);
            runs.push(TextRun::new(COVER_INSPECTOR_LABEL.to_uppercase(), area.x, bottom - 40.0, 9.0));
            runs.push(TextRun::new(inspector.clone(), area.x, bottom - 8.0, 22.0));
            let right_x = area.x + area.width / 2.0;
            runs.push(TextRun::new(COVER_DATE_LABEL.to_uppercase(), right_x, bottom - 40.0, 9.0));
            runs.push(TextRun::new(date.clone(), right_x, bottom - 8.0, 22.0));
        }
        SlideKind::Observation {
            index_label,
            description,
            corrective_action,
            discipline,
            severity,
            project_name,
            date,
            ..
        } => {
            let header = geometry.header();
            runs.push(TextRun::new(HEADER_BRAND.to_uppercase(), 60.0, header.y + 26.0, 9.0));
            runs.push(TextRun::new(project_name.clone(), 60.0, header.y + 44.0, 13.0));
            runs.push(TextRun::new(HEADER_DATE_LABEL.to_uppercase(), header.right() - 190.0, header.y + 26.0, 9.0));
            runs.push(TextRun::new(date.clone(), header.right() - 190.0, header.y + 44.0, 11.0));

            let photo = geometry.photo_panel();
            runs.push(TextRun::new(index_label.clone(), photo.x + 32.0, photo.y + 40.0, 11.0));

            let panel = geometry.text_panel();
            runs.push(TextRun::new(ASSESSMENT_LABEL.to_uppercase(), panel.x, panel.y + 10.0, 9.0));
            runs.push(TextRun::new(
                format!("{} / {}", discipline, severity),
                panel.x,
                panel.y + 32.0,
                11.0,
            ));
            let mut y = push_wrapped(&mut runs, description, panel, panel.y + 62.0, 16.0, 7);

            if let Some(action) = corrective_action {
                y += 8.0;
                runs.push(TextRun::new(CORRECTIVE_ACTION_LABEL.to_uppercase(), panel.x, y, 9.0));
                push_wrapped(&mut runs, action, panel, y + 20.0, 11.0, 4);
            }

            let note_y = panel.bottom() - 60.0;
            runs.push(TextRun::new(COMPLIANCE_LABEL.to_uppercase(), panel.x, note_y, 8.0));
            push_wrapped(&mut runs, COMPLIANCE_NOTE, panel, note_y + 18.0, 9.0, 3);

            let footer = geometry.footer();
            runs.push(TextRun::new(
                slide.page_label().to_uppercase(),
                footer.right() - 150.0,
                footer.y + 24.0,
                10.0,
            ));
        }
    }

    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render_document;
    use crate::types::{Observation, ReportState};

    #[test]
    fn test_sanitize_collapses_whitespace() {
        assert_eq!(sanitize_project_name("  North   Wing  "), "North_Wing");
        assert_eq!(sanitize_project_name("KAFD 212 Pharmacy"), "KAFD_212_Pharmacy");
        assert_eq!(sanitize_project_name("Tab\tand\nnewline"), "Tab_and_newline");
    }

    #[test]
    fn test_sanitize_empty_falls_back() {
        assert_eq!(sanitize_project_name(""), "Report");
        assert_eq!(sanitize_project_name("   "), "Report");
    }

    #[test]
    fn test_pdf_file_name() {
        assert_eq!(pdf_file_name("Audit", "North Wing"), "Audit_North_Wing.pdf");
        assert_eq!(pdf_file_name("Audit", ""), "Audit_Report.pdf");
    }

    #[test]
    fn test_full_page_placement() {
        let page = PagePlacement::full_page();
        assert_eq!((page.x, page.y, page.width, page.height), (0.0, 0.0, 1120.0, 630.0));
        let pt = PagePlacement::full_page_pt();
        assert!((pt.width - 840.0).abs() < 0.01);
    }

    #[test]
    fn test_cover_text_contains_fields() {
        let mut state = ReportState::new_session("2026-01-18");
        state.metadata.project_name = "Olaya Main Pharmacy".into();
        let doc = render_document(&state);
        let runs = build_slide_text(&doc.slides[0], &SlideGeometry::default());
        assert!(runs.iter().any(|r| r.text == "Olaya Main Pharmacy"));
        assert!(runs.iter().any(|r| r.text == "2026-01-18"));
        assert!(runs.iter().any(|r| r.text == "TBD"));
    }

    #[test]
    fn test_observation_text_has_page_label() {
        let mut state = ReportState::new_session("2026-01-18");
        state.observations.push(Observation::new());
        let doc = render_document(&state);
        let runs = build_slide_text(&doc.slides[1], &SlideGeometry::default());
        assert!(runs.iter().any(|r| r.text == "PAGE 2 / 2"));
        assert!(runs.iter().any(|r| r.text == "OBS #001"));
        for run in &runs {
            assert!(run.x >= 0.0 && run.x <= SLIDE_WIDTH);
            assert!(run.y >= 0.0 && run.y <= SLIDE_HEIGHT);
        }
    }

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("one two three four five six seven eight", 40.0, 10.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= 8 || !l.contains(' ')));
    }
}
