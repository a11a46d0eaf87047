use super::AppConfig;
use anyhow::{bail, Result};
use clap::Parser;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values before anything touches the filesystem.
    pub fn validate(&mut self) -> Result<()> {
        if let Some(path) = &self.log_file {
            if path.is_dir() {
                bail!("--log-file must name a file, got directory {}", path.display());
            }
        }

        if let Some(dir) = &self.documents_dir {
            if dir.exists() && !dir.is_dir() {
                bail!("--documents-dir must be a directory, got {}", dir.display());
            }
        }

        if self.no_logs {
            self.logs = false;
            self.log_content = false;
        }
        Ok(())
    }
}
