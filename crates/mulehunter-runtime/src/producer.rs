//! Offline producers of the persisted artifacts.
//!
//! Dataset generation and model training live outside this service. The
//! lifecycle manager only needs to ask for them to be (re)produced.

use std::process::Command;

use tracing::{info, warn};

use mulehunter_core::{AssetPaths, Error, MuleHunterConfig, Result};

/// Produces the snapshot, account table and weight files under `AssetPaths`.
pub trait AssetProducer: Send + Sync {
    /// Write a fresh graph snapshot and account table.
    fn generate(&self, paths: &AssetPaths) -> Result<()>;

    /// Train on the current snapshot and write the weight file.
    fn train(&self, paths: &AssetPaths) -> Result<()>;
}

/// Runs external generator and trainer commands.
///
/// Each command runs with `MULEHUNTER_DATA_DIR` pointing at the asset root.
pub struct CommandProducer {
    generator: Vec<String>,
    trainer: Vec<String>,
}

impl CommandProducer {
    pub fn new(generator: Vec<String>, trainer: Vec<String>) -> Self {
        Self { generator, trainer }
    }

    fn run(&self, stage: &str, argv: &[String], paths: &AssetPaths) -> Result<()> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| Error::Producer(format!("{} command is empty", stage)))?;

        info!("Running {}: {}", stage, argv.join(" "));
        let output = Command::new(program)
            .args(args)
            .env("MULEHUNTER_DATA_DIR", &paths.root)
            .output()
            .map_err(|e| Error::Producer(format!("{} failed to start: {}", stage, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("{} exited with {}: {}", stage, output.status, stderr.trim());
            return Err(Error::Producer(format!(
                "{} exited with {}",
                stage, output.status
            )));
        }
        Ok(())
    }
}

impl AssetProducer for CommandProducer {
    fn generate(&self, paths: &AssetPaths) -> Result<()> {
        self.run("generator", &self.generator, paths)
    }

    fn train(&self, paths: &AssetPaths) -> Result<()> {
        self.run("trainer", &self.trainer, paths)
    }
}

/// Used when no producer commands are configured; regeneration always fails.
pub struct UnconfiguredProducer;

impl AssetProducer for UnconfiguredProducer {
    fn generate(&self, _paths: &AssetPaths) -> Result<()> {
        Err(Error::Producer(
            "no generator configured (set MULEHUNTER_GENERATOR_CMD)".into(),
        ))
    }

    fn train(&self, _paths: &AssetPaths) -> Result<()> {
        Err(Error::Producer(
            "no trainer configured (set MULEHUNTER_TRAINER_CMD)".into(),
        ))
    }
}

/// Pick the producer described by the configuration.
pub fn from_config(config: &MuleHunterConfig) -> Box<dyn AssetProducer> {
    match (&config.generator_cmd, &config.trainer_cmd) {
        (Some(generator), Some(trainer)) => {
            Box::new(CommandProducer::new(generator.clone(), trainer.clone()))
        }
        _ => {
            info!("Producer commands not configured; existing artifacts must be provided");
            Box::new(UnconfiguredProducer)
        }
    }
}
