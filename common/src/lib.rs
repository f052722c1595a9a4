//! Inspection Report Common Library
//!
//! CLIと将来のフロントエンドで共有される型とユーティリティ
//! （I/Oを持たない純粋なロジックのみ）

pub mod types;
pub mod constants;
pub mod inline_image;
pub mod layout;
pub mod render;
pub mod prompts;
pub mod parser;
pub mod export;
pub mod error;

pub use types::{
    Discipline, MetadataField, Observation, ObservationId, ObservationPatch, ReportMetadata,
    ReportState, Severity,
};
pub use constants::{INSPECTORS, PHARMACY_LOCATIONS};
pub use inline_image::InlineImage;
pub use layout::{preview_scale, SlideGeometry, SLIDE_HEIGHT, SLIDE_WIDTH};
pub use render::{render_document, PhotoSlot, RenderedDocument, Slide, SlideKind};
pub use prompts::{build_analyze_prompt, build_summary_prompt};
pub use parser::{extract_json_object, parse_analysis_response, AnalyzedObservation};
pub use export::pdf_core::{pdf_file_name, sanitize_project_name, PagePlacement};
pub use error::{Error, Result};
