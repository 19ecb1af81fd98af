use std::path::PathBuf;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Environment variables look like `RTF_JOBS_SOURCE_DIR`.
pub const ENV_PREFIX: &str = "RTF_JOBS";

const DEFAULT_SOURCE_DIR: &str = "temp/SDR";
const DEFAULT_OUTPUT_FILE: &str = "output.jsonl";

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// Relative paths resolve against the working directory.
    pub source_dir: PathBuf,
    pub output_file: PathBuf,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_env(Environment::with_prefix(ENV_PREFIX))
    }

    fn from_env(env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("source_dir", DEFAULT_SOURCE_DIR)?
            .set_default("output_file", DEFAULT_OUTPUT_FILE)?
            .add_source(env)
            .build()?
            .try_deserialize()
    }

    /// Command-line flags win over environment and defaults.
    pub fn with_overrides(mut self, source_dir: Option<PathBuf>, output_file: Option<PathBuf>) -> Self {
        if let Some(dir) = source_dir {
            self.source_dir = dir;
        }
        if let Some(file) = output_file {
            self.output_file = file;
        }
        self
    }
}
