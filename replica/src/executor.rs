use std::path::Path;

use replica_core::{
    report::{ActionRecord, Outcome, PassReport},
    types::Action,
};

use crate::{clock::Clock, error::StorageError, journal::Journal, storage::Storage};

/// Apply planned actions one by one. A failing action is recorded and the
/// following ones are still applied.
pub struct Executor<'a> {
    source_root: &'a Path,
    replica_root: &'a Path,
    storage: &'a dyn Storage,
    journal: &'a dyn Journal,
    clock: &'a dyn Clock,
}

impl<'a> Executor<'a> {
    pub fn new(
        source_root: &'a Path,
        replica_root: &'a Path,
        storage: &'a dyn Storage,
        journal: &'a dyn Journal,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            source_root,
            replica_root,
            storage,
            journal,
            clock,
        }
    }

    pub fn execute(&self, actions: &[Action], report: &mut PassReport) {
        for action in actions {
            let outcome = match self.apply(action) {
                Ok(_) => Outcome::Success,
                Err(error) => Outcome::Failure(error.to_string()),
            };
            let record = ActionRecord::new(self.clock.now(), action, outcome);
            self.journal.action(&record);
            report.record(&record);
        }
    }

    fn apply(&self, action: &Action) -> Result<(), StorageError> {
        let replica_path = self.replica_root.join(action.path());

        match action {
            Action::CreateDir(_) => self.storage.create_dir(&replica_path),
            Action::CopyFile(path) | Action::UpdateFile(path) => self
                .storage
                .copy_file(&self.source_root.join(path), &replica_path),
            Action::DeleteFile(_) => self.storage.remove_file(&replica_path),
            Action::DeleteDir(_) => self.storage.remove_dir(&replica_path),
        }
    }
}
