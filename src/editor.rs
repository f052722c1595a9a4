//! 指摘エディタ
//!
//! 編集セッションの `ReportState` を専有し、ユーザー操作ごとに更新する。
//! 描画・出力側は `state()` のスナップショット参照のみを受け取る。

use crate::error::{ReportError, Result};
use crate::photo::PhotoSource;
use futures::future::join_all;
use inspection_report_common::{
    AnalyzedObservation, MetadataField, Observation, ObservationPatch, ReportState,
};

pub use inspection_report_common::ObservationId;

/// 一括添付の上限枚数
pub const MAX_BATCH_PHOTOS: usize = 30;

/// 存在しないIDへの操作の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditPolicy {
    /// 何もせず `EditOutcome::NotFound` を返す
    #[default]
    Lenient,
    /// `ReportError::ObservationNotFound` にする
    Strict,
}

/// 操作結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    NotFound,
    EmptyInput,
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EditOutcome::Applied)
    }
}

#[derive(Debug, Clone)]
pub struct ReportEditor {
    state: ReportState,
    policy: EditPolicy,
    /// 変更ごとに増える（プレビュー再描画の判定用）
    revision: u64,
}

impl ReportEditor {
    pub fn new(state: ReportState) -> Self {
        Self {
            state,
            policy: EditPolicy::default(),
            revision: 0,
        }
    }

    pub fn with_policy(mut self, policy: EditPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> EditPolicy {
        self.policy
    }

    pub fn state(&self) -> &ReportState {
        &self.state
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn into_state(self) -> ReportState {
        self.state
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn not_found(&self, id: ObservationId) -> Result<EditOutcome> {
        match self.policy {
            EditPolicy::Lenient => {
                tracing::debug!(%id, "observation not found, ignoring");
                Ok(EditOutcome::NotFound)
            }
            EditPolicy::Strict => Err(ReportError::ObservationNotFound(id)),
        }
    }

    /// メタデータの1フィールドを差し替え（検証なし）
    pub fn update_metadata_field(&mut self, field: MetadataField, value: impl Into<String>) {
        // レコードごと差し替える
        self.state.metadata = self.state.metadata.with_field(field, value);
        self.touch();
    }

    /// 既定値の指摘を末尾に追加
    pub fn add_observation(&mut self) -> ObservationId {
        let observation = Observation::new();
        let id = observation.id;
        self.state.observations.push(observation);
        self.touch();
        id
    }

    /// 指定フィールドのみ更新（位置・IDは不変）
    pub fn update_observation(&mut self, id: ObservationId, patch: ObservationPatch) -> Result<EditOutcome> {
        match self.state.observations.iter_mut().find(|o| o.id == id) {
            Some(observation) => {
                observation.apply(patch);
                self.touch();
                Ok(EditOutcome::Applied)
            }
            None => self.not_found(id),
        }
    }

    pub fn remove_observation(&mut self, id: ObservationId) -> Result<EditOutcome> {
        match self.state.position(id) {
            Some(index) => {
                self.state.observations.remove(index);
                self.touch();
                Ok(EditOutcome::Applied)
            }
            None => self.not_found(id),
        }
    }

    /// 写真を一括添付（先頭30枚、1枚につき指摘1件）
    ///
    /// デコードは同時に進めるが、全件の完了を待ってから入力順に追加する。
    /// 1枚でも失敗した場合は何も追加しない。
    pub async fn attach_photos_batch<S: PhotoSource>(&mut self, files: &[S]) -> Result<Vec<ObservationId>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let selected = &files[..files.len().min(MAX_BATCH_PHOTOS)];
        if files.len() > MAX_BATCH_PHOTOS {
            tracing::warn!(
                requested = files.len(),
                accepted = MAX_BATCH_PHOTOS,
                "photo batch truncated"
            );
        }

        // join_all は入力順で結果を返す
        let decoded = join_all(selected.iter().map(|file| file.load())).await;

        let mut images = Vec::with_capacity(decoded.len());
        for (file, result) in selected.iter().zip(decoded) {
            match result {
                Ok(image) => images.push(image),
                Err(e) => {
                    tracing::warn!(file = %file.name(), error = %e, "photo decode failed");
                    return Err(ReportError::PhotoAttach(format!("{}: {}", file.name(), e)));
                }
            }
        }

        let ids = images
            .into_iter()
            .map(|image| {
                let observation = Observation::with_photo(image);
                let id = observation.id;
                self.state.observations.push(observation);
                id
            })
            .collect::<Vec<_>>();

        self.touch();
        tracing::debug!(count = ids.len(), "photos attached");
        Ok(ids)
    }

    /// 1件の写真を差し替え（他のフィールドは保持）
    pub async fn replace_observation_photo<S: PhotoSource>(&mut self, id: ObservationId, file: &S) -> Result<EditOutcome> {
        let image = file
            .load()
            .await
            .map_err(|e| ReportError::PhotoAttach(format!("{}: {}", file.name(), e)))?;
        self.update_observation(id, ObservationPatch::photo(image))
    }

    /// AI解析結果を反映
    pub fn apply_analysis(&mut self, id: ObservationId, analysis: AnalyzedObservation) -> Result<EditOutcome> {
        self.update_observation(id, analysis.into_patch())
    }
}

impl Default for ReportEditor {
    fn default() -> Self {
        Self::new(ReportState::default())
    }
}
