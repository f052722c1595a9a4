//! 対話的な報告書編集
//!
//! 現場（薬局）・検査員をリストから選び、指摘を1件ずつ確認・修正する。
//! リストは入力補助で、リスト外の値もそのまま残せる。

use crate::editor::ReportEditor;
use crate::error::{ReportError, Result};
use dialoguer::{Input, Select};
use inspection_report_common::render::index_label;
use inspection_report_common::{
    Discipline, MetadataField, ObservationPatch, Severity, INSPECTORS, PHARMACY_LOCATIONS,
};

/// ヘッダ項目と候補リストの対応
const HEADER_PICKERS: [(MetadataField, &str, &[&str]); 2] = [
    (MetadataField::ProjectName, "現場（薬局）", PHARMACY_LOCATIONS),
    (MetadataField::InspectorName, "検査員", INSPECTORS),
];

const OTHER_ENTRY: &str = "その他（自由入力）";

#[derive(Debug, Clone, PartialEq, Eq)]
enum EditAction {
    /// そのまま次へ
    Keep,
    /// 所見の書き換え
    Describe(String),
    Discipline,
    Severity,
    Location,
    Remove,
    Quit,
}

/// 候補メニューで選ばれた結果
#[derive(Debug, Clone, PartialEq, Eq)]
enum ListChoice {
    /// 現在値を維持
    Keep,
    Item(String),
    FreeText,
}

fn prompt_error(e: dialoguer::Error) -> ReportError {
    ReportError::Prompt(e.to_string())
}

/// 一覧から選択（現在値があれば初期選択にする）
fn select_from(prompt: &str, items: &[&str], current: &str) -> Result<String> {
    let default = default_index(items, current);
    let index = Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(default)
        .interact()
        .map_err(prompt_error)?;
    Ok(items[index].to_string())
}

fn default_index(items: &[&str], current: &str) -> usize {
    items.iter().position(|item| *item == current).unwrap_or(0)
}

/// 現在値がリスト外なら先頭に「維持」を置く
fn has_keep_entry(items: &[&str], current: &str) -> bool {
    !items.contains(&current)
}

fn menu_entries(items: &[&str], current: &str) -> Vec<String> {
    let mut entries = Vec::with_capacity(items.len() + 2);
    if has_keep_entry(items, current) {
        if current.trim().is_empty() {
            entries.push("（未入力のまま）".to_string());
        } else {
            entries.push(format!("現在の値を維持: {}", current));
        }
    }
    entries.extend(items.iter().map(|item| item.to_string()));
    entries.push(OTHER_ENTRY.to_string());
    entries
}

/// メニュー上の位置を選択結果に変換
fn resolve_choice(items: &[&str], current: &str, selected: usize) -> ListChoice {
    let offset = usize::from(has_keep_entry(items, current));
    if offset == 1 && selected == 0 {
        return ListChoice::Keep;
    }
    match items.get(selected - offset) {
        Some(item) if *item == current => ListChoice::Keep,
        Some(item) => ListChoice::Item(item.to_string()),
        None => ListChoice::FreeText,
    }
}

/// 候補から選ぶか自由入力。値が変わらなければ None
fn choose_value(prompt: &str, items: &[&str], current: &str) -> Result<Option<String>> {
    let entries = menu_entries(items, current);
    let selected = Select::new()
        .with_prompt(prompt)
        .items(&entries[..])
        .default(default_index(items, current))
        .interact()
        .map_err(prompt_error)?;

    match resolve_choice(items, current, selected) {
        ListChoice::Keep => Ok(None),
        ListChoice::Item(value) => Ok(Some(value)),
        ListChoice::FreeText => {
            let value = free_text(prompt, current)?;
            Ok((value != current).then_some(value))
        }
    }
}

fn free_text(prompt: &str, current: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt(prompt)
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_error)
}

/// 報告書のヘッダ情報と指摘を対話的に編集
pub fn run_interactive_edit(editor: &mut ReportEditor) -> Result<()> {
    for (field, prompt, items) in HEADER_PICKERS {
        let current = editor.state().metadata.get(field).to_string();
        if let Some(value) = choose_value(prompt, items, &current)? {
            editor.update_metadata_field(field, value);
        }
    }

    let ids: Vec<_> = editor.state().observations.iter().map(|o| o.id).collect();
    if ids.is_empty() {
        println!("✓ 指摘はありません");
        return Ok(());
    }

    println!("---");
    println!("操作: [Enter]次へ [d]工種 [v]重大度 [l]場所 [x]削除 [q]終了 / それ以外は所見として上書き");
    println!("---\n");

    for (count, id) in ids.iter().enumerate() {
        let Some(observation) = editor.state().observation(*id) else {
            continue;
        };
        println!(
            "[{}/{}] {} [{}/{}] {}",
            count + 1,
            ids.len(),
            index_label(editor.state().position(*id).unwrap_or(count) + 1),
            observation.discipline,
            observation.severity,
            if observation.description.is_empty() {
                "(所見なし)"
            } else {
                observation.description.as_str()
            }
        );

        let current_discipline = observation.discipline.as_str();
        let current_severity = observation.severity.as_str();
        let current_location = observation.location.clone();

        let input: String = Input::new()
            .with_prompt("操作")
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_error)?;

        let patch = match parse_edit_action(&input) {
            EditAction::Keep => continue,
            EditAction::Quit => {
                println!("編集を終了します...");
                break;
            }
            EditAction::Remove => {
                editor.remove_observation(*id)?;
                println!("  → 削除しました\n");
                continue;
            }
            EditAction::Describe(text) => ObservationPatch::description(text),
            EditAction::Discipline => {
                let names: Vec<&str> = Discipline::ALL.iter().map(|d| d.as_str()).collect();
                let chosen = select_from("工種", &names, current_discipline)?;
                ObservationPatch {
                    discipline: Some(chosen.parse()?),
                    ..Default::default()
                }
            }
            EditAction::Severity => {
                let names: Vec<&str> = Severity::ALL.iter().map(|s| s.as_str()).collect();
                let chosen = select_from("重大度", &names, current_severity)?;
                ObservationPatch {
                    severity: Some(chosen.parse()?),
                    ..Default::default()
                }
            }
            EditAction::Location => ObservationPatch {
                location: Some(free_text("場所", &current_location)?),
                ..Default::default()
            },
        };

        editor.update_observation(*id, patch)?;
        println!("  → 更新しました\n");
    }

    Ok(())
}

fn parse_edit_action(input: &str) -> EditAction {
    match input.trim() {
        "" => EditAction::Keep,
        "d" => EditAction::Discipline,
        "v" => EditAction::Severity,
        "l" => EditAction::Location,
        "x" => EditAction::Remove,
        "q" | "Q" => EditAction::Quit,
        text => EditAction::Describe(text.to_string()),
    }
}
