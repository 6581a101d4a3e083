use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use crate::{clock::Clock, reconciler::Reconciler};

/// Run reconciliation passes, one per interval, until the stop signal is
/// raised. Passes never overlap: a pass longer than the interval delays the
/// next one.
pub struct Runner {
    reconciler: Reconciler,
    interval: Duration,
    clock: Box<dyn Clock>,
    stop_signal: Arc<AtomicBool>,
    exit_after_pass: bool,
}

impl Runner {
    pub fn new(
        reconciler: Reconciler,
        interval: Duration,
        clock: Box<dyn Clock>,
        stop_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            reconciler,
            interval,
            clock,
            stop_signal,
            exit_after_pass: false,
        }
    }

    pub fn exit_after_pass(mut self, exit_after_pass: bool) -> Self {
        self.exit_after_pass = exit_after_pass;
        self
    }

    /// Return the number of passes made
    pub fn run(&self) -> usize {
        let mut passes = 0;

        loop {
            log::info!(
                "Synchronizing {} and {}",
                self.reconciler.source().display(),
                self.reconciler.replica().display()
            );
            // Errors are retried on next tick, source or replica may be back
            if let Err(error) = self.reconciler.pass() {
                log::error!("Failed to sync: {}", error);
            }
            passes += 1;

            if self.exit_after_pass || self.stopped() {
                break;
            }
            self.clock.sleep(self.interval);
            if self.stopped() {
                break;
            }
        }

        log::info!("Synchronization finished after {} pass(es)", passes);
        passes
    }

    fn stopped(&self) -> bool {
        self.stop_signal.load(Ordering::Relaxed)
    }
}
