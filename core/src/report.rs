use std::{fmt::Display, path::PathBuf};

use chrono::{DateTime, Local};

use crate::types::{Action, ActionKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Success => f.write_str("ok"),
            Outcome::Failure(message) => write!(f, "failed: {}", message),
        }
    }
}

/// What happened when an action was applied on the replica
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    pub timestamp: DateTime<Local>,
    pub kind: ActionKind,
    pub path: PathBuf,
    pub outcome: Outcome,
}

impl ActionRecord {
    pub fn new(timestamp: DateTime<Local>, action: &Action, outcome: Outcome) -> Self {
        Self {
            timestamp,
            kind: action.kind(),
            path: action.path().to_path_buf(),
            outcome,
        }
    }
}

impl Display for ActionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.path.display(), self.outcome)
    }
}

/// Summary of one reconciliation pass. File actions are counted in
/// `created`, `updated` and `deleted`, directory actions in `dirs_created` and
/// `dirs_deleted`. `failed` counts failed actions and unreadable entries, each
/// one having its entry in `errors`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub dirs_created: usize,
    pub dirs_deleted: usize,
    pub failed: usize,
    pub errors: Vec<(PathBuf, String)>,
}

impl PassReport {
    pub fn record(&mut self, record: &ActionRecord) {
        match &record.outcome {
            Outcome::Success => match record.kind {
                ActionKind::CreateDir => self.dirs_created += 1,
                ActionKind::CopyFile => self.created += 1,
                ActionKind::UpdateFile => self.updated += 1,
                ActionKind::DeleteFile => self.deleted += 1,
                ActionKind::DeleteDir => self.dirs_deleted += 1,
            },
            Outcome::Failure(message) => self.fail(record.path.clone(), message.clone()),
        }
    }

    pub fn fail(&mut self, path: PathBuf, message: String) {
        self.failed += 1;
        self.errors.push((path, message));
    }

    pub fn actions(&self) -> usize {
        self.created + self.updated + self.deleted + self.dirs_created + self.dirs_deleted
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

impl Display for PassReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "created={} updated={} deleted={} dirs_created={} dirs_deleted={} failed={}",
            self.created,
            self.updated,
            self.deleted,
            self.dirs_created,
            self.dirs_deleted,
            self.failed
        )
    }
}
