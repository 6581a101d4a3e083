use std::path::Path;

use mockall::automock;
use replica_core::report::{ActionRecord, PassReport};

use crate::logging::TIMESTAMP_FORMAT;

/// Where the reconciler reports what it does
#[automock]
pub trait Journal {
    /// One call per applied action, successful or not
    fn action(&self, record: &ActionRecord);
    /// A recovered problem which is not an action failure (unreadable entry,
    /// impossible comparison)
    fn warning(&self, path: &Path, message: &str);
    fn summary(&self, report: &PassReport);
}

/// Journal writing into the `log` facade, one line per call
pub struct LogJournal;

impl LogJournal {
    /// The moment the action was applied may differ from the moment the
    /// line is written, so it is part of the message.
    pub fn action_line(record: &ActionRecord) -> String {
        format!(
            "{} (applied at {})",
            record,
            record.timestamp.format(TIMESTAMP_FORMAT)
        )
    }
}

impl Journal for LogJournal {
    fn action(&self, record: &ActionRecord) {
        if record.outcome.is_success() {
            log::info!("{}", Self::action_line(record));
        } else {
            log::error!("{}", Self::action_line(record));
        }
    }

    fn warning(&self, path: &Path, message: &str) {
        log::warn!("{}: {}", path.display(), message);
    }

    fn summary(&self, report: &PassReport) {
        if report.is_clean() {
            log::info!("Pass finished: {}", report);
        } else {
            log::warn!("Pass finished: {}", report);
        }
    }
}
