use std::{
    fs,
    path::{Path, PathBuf},
};

use replica_core::{config::SyncConfig, report::PassReport, types::ComparisonStrategy};

use crate::{
    clock::Clock,
    compare::Comparator,
    error::ReconcileError,
    executor::Executor,
    journal::Journal,
    plan::Planner,
    storage::{DiskStorage, Storage},
    walker::{Snapshot, Walker},
};

/// Make the replica tree identical to the source tree, one pass at a time.
///
/// A pass walks both trees, plans the actions needed for the replica to
/// mirror the source and applies them. Failures on single entries are
/// recorded in the returned `PassReport` and never stop the pass; only an
/// unavailable tree root makes the pass fail. No state is kept between
/// passes.
pub struct Reconciler {
    source: PathBuf,
    replica: PathBuf,
    comparator: Comparator,
    storage: Box<dyn Storage>,
    journal: Box<dyn Journal>,
    clock: Box<dyn Clock>,
}

impl Reconciler {
    pub fn new(
        source: PathBuf,
        replica: PathBuf,
        journal: Box<dyn Journal>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            source,
            replica,
            comparator: Comparator::default(),
            storage: Box::new(DiskStorage),
            journal,
            clock,
        }
    }

    pub fn from_config(
        config: &SyncConfig,
        journal: Box<dyn Journal>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self::new(config.source.clone(), config.replica.clone(), journal, clock)
            .comparison(config.comparison)
    }

    pub fn comparison(mut self, strategy: ComparisonStrategy) -> Self {
        self.comparator = Comparator::new(strategy);
        self
    }

    pub fn storage(mut self, storage: Box<dyn Storage>) -> Self {
        self.storage = storage;
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn replica(&self) -> &Path {
        &self.replica
    }

    pub fn pass(&self) -> Result<PassReport, ReconcileError> {
        // Source first: the replica must not be touched when source is gone
        let source = Walker::new(self.source.clone())
            .follow_links(true)
            .walk()
            .map_err(ReconcileError::Source)?;
        self.ensure_replica_root()?;
        let replica = Walker::new(self.replica.clone())
            .keep_special(true)
            .walk()
            .map_err(ReconcileError::Replica)?;

        let mut report = PassReport::default();
        self.unreadable(&source, "source", &mut report);
        self.unreadable(&replica, "replica", &mut report);

        let plan = Planner::new(&self.comparator).plan(&source, &replica);
        if plan.is_empty() {
            log::debug!("Replica is up to date");
        }
        for (path, error) in &plan.comparison_errors {
            self.journal
                .warning(path, &format!("{}, consider it as modified", error));
        }

        Executor::new(
            &self.source,
            &self.replica,
            self.storage.as_ref(),
            self.journal.as_ref(),
            self.clock.as_ref(),
        )
        .execute(&plan.actions, &mut report);

        self.journal.summary(&report);
        Ok(report)
    }

    fn ensure_replica_root(&self) -> Result<(), ReconcileError> {
        if !self.replica.exists() {
            log::info!("Create replica folder {}", self.replica.display());
            fs::create_dir_all(&self.replica)
                .map_err(|error| ReconcileError::ReplicaRoot(self.replica.clone(), error))?;
        }

        Ok(())
    }

    fn unreadable(&self, snapshot: &Snapshot, side: &str, report: &mut PassReport) {
        for error in snapshot.unreadable() {
            let message = format!("Unable to read {} entry: {}", side, error.message);
            self.journal.warning(&error.path, &message);
            report.fail(error.path.clone(), message);
        }
    }
}
