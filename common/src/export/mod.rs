//! Export core module shared by CLI and other hosts.

pub mod pdf_core;

pub use pdf_core::{
    build_slide_text, pdf_file_name, sanitize_project_name, PagePlacement, TextRun,
    DEFAULT_FILE_PREFIX, FALLBACK_FILE_SEGMENT,
};
