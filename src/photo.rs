//! 写真の読み込みとインライン化
//!
//! 画像ファイルをData URL（`data:<mime>;base64,...`）に変換する。
//! MIMEタイプは内容から判定し、判定できなければ拡張子から推定する。

use crate::error::{ReportError, Result};
use image::ImageFormat;
use inspection_report_common::InlineImage;
use std::future::Future;
use std::path::{Path, PathBuf};

/// 添付できる写真の供給元
///
/// 一括添付では複数の `load` を同時に待つため、完了順は不定になる
pub trait PhotoSource {
    /// 表示・エラー用の名前
    fn name(&self) -> String;

    fn load(&self) -> impl Future<Output = Result<InlineImage>>;
}

/// メモリ上の画像ファイル
#[derive(Debug, Clone)]
pub struct PhotoFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl PhotoFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub async fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ReportError::FileNotFound(path.display().to_string()));
        }
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self { name, bytes })
    }
}

impl PhotoSource for PhotoFile {
    fn name(&self) -> String {
        self.name.clone()
    }

    async fn load(&self) -> Result<InlineImage> {
        encode_inline(&self.name, &self.bytes)
    }
}

impl PhotoSource for PathBuf {
    fn name(&self) -> String {
        self.display().to_string()
    }

    async fn load(&self) -> Result<InlineImage> {
        let file = PhotoFile::read(self).await?;
        file.load().await
    }
}

/// 画像バイト列をData URLに変換
pub fn encode_inline(name: &str, bytes: &[u8]) -> Result<InlineImage> {
    if bytes.is_empty() {
        return Err(ReportError::PhotoAttach(format!("{}: ファイルが空です", name)));
    }

    let format = image::guess_format(bytes)
        .or_else(|_| ImageFormat::from_path(name))
        .map_err(|_| ReportError::PhotoAttach(format!("{}: 画像形式を判定できません", name)))?;

    // 拡張子だけで判定した場合は中身も確認する
    if image::guess_format(bytes).is_err() {
        image::load_from_memory_with_format(bytes, format)
            .map_err(|e| ReportError::PhotoAttach(format!("{}: {}", name, e)))?;
    }

    Ok(InlineImage::from_bytes(format.to_mime_type(), bytes))
}


#[cfg(test)]
mod tests {
    use super::test_support::png_bytes;
    use super::*;

    #[test]
    fn test_encode_png() {
        let bytes = png_bytes(4, 4, [255, 0, 0]);
        let image = encode_inline("red.png", &bytes).unwrap();
        assert_eq!(image.mime_type(), "image/png");
        assert_eq!(image.decode().unwrap(), bytes);
    }

    #[test]
    fn test_mime_from_content_not_extension() {
        let bytes = png_bytes(2, 2, [0, 0, 255]);
        let image = encode_inline("mislabeled.jpg", &bytes).unwrap();
        assert_eq!(image.mime_type(), "image/png");
    }

    #[test]
    fn test_encode_rejects_text() {
        let err = encode_inline("notes.txt", b"hello world").unwrap_err();
        assert!(matches!(err, ReportError::PhotoAttach(_)));
    }

    #[test]
    fn test_encode_rejects_corrupt_with_image_extension() {
        let err = encode_inline("broken.jpg", b"not really a jpeg").unwrap_err();
        assert!(matches!(err, ReportError::PhotoAttach(_)));
    }

    #[test]
    fn test_encode_rejects_empty() {
        assert!(encode_inline("empty.png", &[]).is_err());
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let err = PhotoFile::read(Path::new("/nonexistent/photo.jpg")).await.unwrap_err();
        assert!(matches!(err, ReportError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_path_source_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        std::fs::write(&path, png_bytes(3, 3, [0, 255, 0])).unwrap();

        let image = path.load().await.unwrap();
        assert_eq!(image.mime_type(), "image/png");
    }
}
