use anyhow::Result;
use clap::Parser;
use inspection_report::ai::{enrich_observation, summarize_report, GeminiClient};
use inspection_report::cancel::CancelToken;
use inspection_report::editor::{EditOutcome, EditPolicy, ReportEditor, MAX_BATCH_PHOTOS};
use inspection_report::export::{self, CanvasRasterizer, ExportOptions};
use inspection_report::surface::{PreviewSurface, ViewMode, REPORT_CONTAINER_ID};
use inspection_report::interactive::run_interactive_edit;
use inspection_report::{cli, config, scanner};
use cli::{Cli, Commands};
use config::Config;
use inspection_report_common::{
    Discipline, MetadataField, ReportState, Severity, SlideKind, INSPECTORS, PHARMACY_LOCATIONS,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            "inspection_report=debug,inspection_report_common=debug,warn".into()
        } else {
            "warn".into()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();
}

/// Ctrl+C でキャンセルされるトークン
fn cancel_on_ctrl_c() -> CancelToken {
    let token = CancelToken::new();
    let handle = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n中断しています...");
            handle.cancel();
        }
    });
    token
}

/// 写真を読み込んで編集セッションを開始
async fn open_session(photos: &[PathBuf], policy: EditPolicy) -> Result<ReportEditor> {
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    let mut editor = ReportEditor::new(ReportState::new_session(today)).with_policy(policy);

    let paths = scanner::collect_photo_paths(photos)?;
    println!("✔ {}枚の写真を検出", paths.len());
    if paths.len() > MAX_BATCH_PHOTOS {
        println!("  先頭{}枚のみ使用します", MAX_BATCH_PHOTOS);
    }

    let ids = editor.attach_photos_batch(&paths).await?;
    println!("✔ {}件の指摘を作成\n", ids.len());
    Ok(editor)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Build {
            photos,
            project,
            inspector,
            date,
            title,
            client,
            location,
            output,
            prefix,
            ai,
            summary,
            interactive,
            strict,
        } => {
            println!("📋 inspection-report - 報告書作成\n");
            let cancel = cancel_on_ctrl_c();
            let policy = if strict { EditPolicy::Strict } else { EditPolicy::Lenient };

            // 1. 写真読み込み
            println!("[1/4] 写真を読み込み中...");
            let mut editor = open_session(&photos, policy).await?;

            let fields = [
                (MetadataField::ProjectName, project),
                (MetadataField::InspectorName, inspector),
                (MetadataField::Date, date),
                (MetadataField::ReportTitle, title),
                (MetadataField::ClientName, client),
                (MetadataField::Location, location),
            ];
            for (field, value) in fields {
                if let Some(value) = value {
                    editor.update_metadata_field(field, value);
                }
            }

            // 2. AI補完
            if ai || summary {
                let client = GeminiClient::from_config(&config)?;

                if ai {
                    println!("[2/4] AI補完中... (モデル: {})", client.model());
                    let ids: Vec<_> = editor.state().observations.iter().map(|o| o.id).collect();
                    let mut applied = 0;
                    for (i, id) in ids.iter().enumerate() {
                        match enrich_observation(&client, &mut editor, *id, &cancel).await {
                            Ok(Some(EditOutcome::Applied)) => applied += 1,
                            Ok(_) => println!("  [{}/{}] スキップ", i + 1, ids.len()),
                            Err(e) if e.is_retryable() => {
                                println!("  [{}/{}] 失敗（指摘はそのまま）: {}", i + 1, ids.len(), e);
                            }
                            Err(e) => return Err(e.into()),
                        }
                    }
                    println!("✔ {}/{}件を補完\n", applied, ids.len());
                } else {
                    println!("[2/4] AI補完: スキップ\n");
                }

                if summary {
                    println!("- サマリを作成中...");
                    match summarize_report(&client, editor.state(), &cancel).await {
                        Ok(text) => println!("\n{}\n", text),
                        Err(e) if e.is_retryable() => println!("サマリ作成に失敗しました: {}\n", e),
                        Err(e) => return Err(e.into()),
                    }
                }
            } else {
                println!("[2/4] AI補完: スキップ\n");
            }

            // 3. 対話編集
            if interactive {
                println!("[3/4] 対話編集");
                run_interactive_edit(&mut editor)?;
                println!();
            } else {
                println!("[3/4] 対話編集: スキップ\n");
            }

            // 4. PDF出力
            println!("[4/4] PDFを出力中...");
            let mut surface = PreviewSurface::new(config.preview_width).with_padding(config.preview_padding);
            let mut options = ExportOptions::from_config(&config, &output).with_progress(true);
            if let Some(prefix) = prefix {
                options = options.with_prefix(prefix);
            }

            let result = export::export_report(
                &editor,
                &mut surface,
                REPORT_CONTAINER_ID,
                &options,
                Arc::new(CanvasRasterizer::new()),
                &cancel,
            )
            .await?;
            println!(
                "✔ PDF出力: {} ({}ページ, {} bytes)",
                result.path.display(),
                result.pages,
                result.bytes
            );

            println!("\n✅ 完了");
        }

        Commands::Preview { photos, project, width } => {
            println!("🔍 inspection-report - プレビュー\n");
            let mut editor = open_session(&photos, EditPolicy::Lenient).await?;
            if let Some(project) = project {
                editor.update_metadata_field(MetadataField::ProjectName, project);
            }

            let mut surface = PreviewSurface::new(width.unwrap_or(config.preview_width))
                .with_padding(config.preview_padding);
            surface.show(ViewMode::Preview, &editor);
            println!("表示倍率: {:.3}", surface.scale());

            if let Some(document) = surface.container(REPORT_CONTAINER_ID) {
                for slide in &document.slides {
                    match &slide.kind {
                        SlideKind::Cover { title, inspector, date } => {
                            println!("  {} 表紙: {} / {} / {}", slide.page_label(), title, inspector, date);
                        }
                        SlideKind::Observation {
                            index_label,
                            discipline,
                            severity,
                            description,
                            ..
                        } => {
                            println!(
                                "  {} {} [{}/{}] {}",
                                slide.page_label(),
                                index_label,
                                discipline,
                                severity,
                                description
                            );
                        }
                    }
                }
            }
        }

        Commands::Options => {
            println!("現場（薬局）:");
            for location in PHARMACY_LOCATIONS {
                println!("  {}", location);
            }
            println!("\n検査員:");
            for inspector in INSPECTORS {
                println!("  {}", inspector);
            }
            println!("\n工種:");
            for discipline in Discipline::ALL {
                println!("  {}", discipline);
            }
            println!("\n重大度:");
            for severity in Severity::ALL {
                println!("  {}", severity);
            }
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  レイアウト待ち上限: {}ms", config.settle_delay_ms);
                println!("  プレビュー幅: {}px", config.preview_width);
                println!("  出力倍率: {}x / JPEG品質: {}", config.raster_scale, config.jpeg_quality);
                println!("  ファイル名接頭辞: {}", config.file_prefix);
                println!(
                    "  APIキー: {}",
                    if config.get_api_key().is_ok() { "設定済み" } else { "未設定" }
                );
            }
        }
    }

    Ok(())
}
