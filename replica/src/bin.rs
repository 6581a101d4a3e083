use std::{
    path::PathBuf,
    process,
    sync::{atomic::AtomicBool, Arc},
};

use anyhow::{Context, Result};
use replica::{
    clock::SystemClock, journal::LogJournal, logging, reconciler::Reconciler, run::Runner,
};
use replica_core::{
    config::{ConfigLayer, SyncConfig},
    error::ConfigError,
    types::ComparisonStrategy,
};
use structopt::StructOpt;
use strum::VariantNames;

#[derive(StructOpt, Debug)]
#[structopt(
    name = "replica",
    about = "Keep a replica folder identical to a source folder"
)]
struct Opt {
    /// Folder to replicate
    #[structopt(short, long, parse(from_os_str))]
    source: Option<PathBuf>,

    /// Folder kept identical to source (created if missing)
    #[structopt(short, long, parse(from_os_str))]
    replica: Option<PathBuf>,

    /// Seconds between two synchronization passes
    #[structopt(short = "t", long = "time")]
    interval: Option<String>,

    /// File where log lines are appended, in addition to stderr
    #[structopt(short, long, parse(from_os_str))]
    log: Option<PathBuf>,

    /// Config file to use instead of ~/.replica.conf
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    #[structopt(long, possible_values = ComparisonStrategy::VARIANTS)]
    comparison: Option<String>,

    /// Make one pass then exit
    #[structopt(long)]
    once: bool,
}

impl Opt {
    fn layer(&self) -> ConfigLayer {
        ConfigLayer {
            source: self.source.as_ref().map(|p| p.display().to_string()),
            replica: self.replica.as_ref().map(|p| p.display().to_string()),
            interval: self.interval.clone(),
            log_file: self.log.as_ref().map(|p| p.display().to_string()),
            comparison: self.comparison.clone(),
        }
    }

    fn config(&self) -> Result<SyncConfig, ConfigError> {
        let file_layer = match &self.config {
            Some(config_file_path) => ConfigLayer::from_file(config_file_path)?,
            None => ConfigLayer::from_env()?,
        };
        SyncConfig::try_from(file_layer.merge(self.layer()))
    }
}

fn main_(opt: Opt, config: SyncConfig) -> Result<()> {
    log::info!(
        "Replicate {} into {} every {}s (comparison: {})",
        config.source.display(),
        config.replica.display(),
        config.interval.as_secs(),
        config.comparison
    );
    let reconciler =
        Reconciler::from_config(&config, Box::new(LogJournal), Box::new(SystemClock));
    let stop_signal = Arc::new(AtomicBool::new(false));
    Runner::new(reconciler, config.interval, Box::new(SystemClock), stop_signal)
        .exit_after_pass(opt.once)
        .run();

    log::info!("Exit application");
    Ok(())
}

fn main() {
    let opt = Opt::from_args();

    let config = match opt.config().context("Invalid configuration") {
        Ok(config) => config,
        Err(error) => {
            if logging::init(None).is_ok() {
                log::error!("{:#}", error);
            } else {
                eprintln!("{:#}", error);
            }
            process::exit(1);
        }
    };

    if let Err(error) = logging::init(config.log_file.as_deref()) {
        eprintln!("{:#}", error);
        process::exit(1);
    }

    if let Err(error) = main_(opt, config) {
        log::error!("{:#}", error);
        process::exit(1);
    }
}
