use inspection_report_common::ObservationId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`inspection-report config --set-api-key YOUR_KEY` で設定してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("指摘が見つかりません: {0}")]
    ObservationNotFound(ObservationId),

    #[error("入力が空です: {0}")]
    EmptyInput(String),

    #[error("写真の添付に失敗しました: {0}")]
    PhotoAttach(String),

    #[error("描画コンテナが見つかりません: {0}")]
    ContainerNotFound(String),

    #[error("ラスタライズエラー: {0}")]
    Rasterize(String),

    #[error("PDF生成エラー: {0}")]
    PdfGeneration(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("操作がキャンセルされました")]
    Cancelled,

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] inspection_report_common::Error),
}

impl ReportError {
    /// 再試行で回復しうるエラーか（編集中のデータは失われない）
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ReportError::ApiCall(_)
                | ReportError::ApiParse(_)
                | ReportError::Rasterize(_)
                | ReportError::PdfGeneration(_)
                | ReportError::PhotoAttach(_)
                | ReportError::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
