//! インライン画像（Data URL）
//!
//! 写真はセッション中 `data:<mime>;base64,<payload>` 形式で保持する。
//! 別途ファイルを参照せず、そのまま表示・送信・PDF埋め込みに使える。

use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const DATA_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// Data URL形式の画像参照
#[derive(Clone, PartialEq, Eq)]
pub struct InlineImage {
    uri: String,
    /// `;base64,` の直後の位置
    payload_start: usize,
}

impl InlineImage {
    /// バイト列からData URLを生成
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        let uri = format!(
            "{}{}{}{}",
            DATA_PREFIX,
            mime_type,
            BASE64_MARKER,
            STANDARD.encode(bytes)
        );
        let payload_start = DATA_PREFIX.len() + mime_type.len() + BASE64_MARKER.len();
        Self { uri, payload_start }
    }

    /// Data URL文字列を検証して取り込む
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix(DATA_PREFIX)
            .ok_or_else(|| Error::InvalidImage("data: で始まっていません".into()))?;
        let marker = rest
            .find(BASE64_MARKER)
            .ok_or_else(|| Error::InvalidImage("base64形式ではありません".into()))?;

        let mime = &rest[..marker];
        if mime.is_empty() || !mime.contains('/') {
            return Err(Error::InvalidImage(format!("MIMEタイプが不正: {:?}", mime)));
        }

        let payload_start = DATA_PREFIX.len() + marker + BASE64_MARKER.len();
        if uri.len() == payload_start {
            return Err(Error::InvalidImage("データが空です".into()));
        }

        Ok(Self {
            uri: uri.to_string(),
            payload_start,
        })
    }

    /// MIMEタイプ（例: "image/jpeg"）
    pub fn mime_type(&self) -> &str {
        &self.uri[DATA_PREFIX.len()..self.payload_start - BASE64_MARKER.len()]
    }

    /// Base64部分
    pub fn payload(&self) -> &str {
        &self.uri[self.payload_start..]
    }

    /// 元のバイト列に復元
    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.payload())
            .map_err(|e| Error::InvalidImage(format!("base64デコード失敗: {}", e)))
    }

    pub fn as_str(&self) -> &str {
        &self.uri
    }
}

impl fmt::Debug for InlineImage {
    // ペイロード全体は巨大になるため長さのみ表示
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InlineImage")
            .field("mime_type", &self.mime_type())
            .field("payload_len", &self.payload().len())
            .finish()
    }
}

impl Serialize for InlineImage {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&self.uri)
    }
}

impl<'de> Deserialize<'de> for InlineImage {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        InlineImage::parse(&raw).map_err(serde::de::Error::custom)
    }
}
