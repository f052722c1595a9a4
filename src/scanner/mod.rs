use crate::error::{ReportError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext))
}

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| is_image_extension(&ext.to_string_lossy()))
        .unwrap_or(false)
}

/// フォルダ直下の画像をファイル名順に列挙
pub fn scan_folder(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(ReportError::FolderNotFound(folder.display().to_string()));
    }

    let mut images: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1) // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| path.is_file() && is_image_path(path))
        .collect();

    // ファイル名でソート
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(images)
}

/// 入力（ファイル・フォルダの混在可）を写真パスの一覧に展開
///
/// 指定順を保ち、フォルダはその位置で中身に置き換える
pub fn collect_photo_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            paths.extend(scan_folder(input)?);
        } else if input.is_file() {
            paths.push(input.clone());
        } else {
            return Err(ReportError::FileNotFound(input.display().to_string()));
        }
    }
    Ok(paths)
}
