use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "inspection-report")]
#[command(about = "設備検査（MEP）指摘報告書の作成・PDF出力ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真から報告書を作成してPDFを出力
    Build {
        /// 写真ファイルまたはフォルダ（複数指定可、先頭30枚まで）
        #[arg(required = true)]
        photos: Vec<PathBuf>,

        /// プロジェクト名（ファイル名にも使用）
        #[arg(short, long)]
        project: Option<String>,

        /// 検査員名
        #[arg(short, long)]
        inspector: Option<String>,

        /// 検査日（YYYY-MM-DD、省略時は今日）
        #[arg(short, long)]
        date: Option<String>,

        /// 報告書タイトル
        #[arg(short, long)]
        title: Option<String>,

        /// 顧客名
        #[arg(long)]
        client: Option<String>,

        /// 検査場所
        #[arg(short, long)]
        location: Option<String>,

        /// 出力ディレクトリ
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// 出力ファイル名の接頭辞（省略時は設定値）
        #[arg(long)]
        prefix: Option<String>,

        /// AIで指摘内容を補完
        #[arg(long)]
        ai: bool,

        /// AIでサマリを作成して表示
        #[arg(long)]
        summary: bool,

        /// 出力前に対話的に編集
        #[arg(long)]
        interactive: bool,

        /// 存在しない指摘への操作をエラーにする
        #[arg(long)]
        strict: bool,
    },

    /// スライド構成と表示倍率を確認
    Preview {
        /// 写真ファイルまたはフォルダ
        #[arg(required = true)]
        photos: Vec<PathBuf>,

        /// プロジェクト名
        #[arg(short, long)]
        project: Option<String>,

        /// プレビュー領域の幅（px、省略時は設定値）
        #[arg(short, long)]
        width: Option<f32>,
    },

    /// 選択肢（場所・検査員・工種・重大度）を表示
    Options,

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
