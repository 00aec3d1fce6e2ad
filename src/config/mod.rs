pub(crate) mod raw;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, instrument};
use tracing_error::{ExtractSpanTrace, SpanTrace};

use self::raw::RawConfig;
use crate::component::CallSite;
use crate::component::finalizer::GCP_RESOURCES_OUTPUT;
use crate::error::{SpannedErr, SpannedExt};

#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("Failed to read config file '{0}': {1}")]
    Read(PathBuf, SpannedErr<std::io::Error>),

    #[error("Failed to parse config file '{0}': {1}")]
    Parse(PathBuf, SpannedErr<serde_yaml::Error>),
}

impl ExtractSpanTrace for ConfigLoadError {
    fn span_trace(&self) -> Option<&SpanTrace> {
        match self {
            ConfigLoadError::Read(_, e) => e.span_trace(),
            ConfigLoadError::Parse(_, e) => e.span_trace(),
        }
    }
}

/// Finalizer inputs after merging the config file with command-line flags.
#[derive(Debug, Clone, Default)]
#[cfg_attr(test, derive(PartialEq))]
pub(crate) struct Config {
    raw: RawConfig,
}

impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Config { raw }
    }
}

impl Config {
    #[instrument("config/load", skip(overrides))]
    pub(crate) async fn load(
        path: Option<&Path>,
        overrides: RawConfig,
    ) -> Result<Config, ConfigLoadError> {
        let file = match path {
            Some(path) => Self::read_file(path).await?,
            None => {
                debug!("No config file given, using command-line inputs only.");
                RawConfig::default()
            }
        };

        Ok(Config::from(file.merge(overrides)))
    }

    async fn read_file(path: &Path) -> Result<RawConfig, ConfigLoadError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_span_trace()
            .map_err(|e| ConfigLoadError::Read(path.to_path_buf(), e))?;

        serde_yaml::from_str(&content)
            .with_span_trace()
            .map_err(|e| ConfigLoadError::Parse(path.to_path_buf(), e))
    }

    /// Only the values actually provided; defaults are filled in by the component.
    pub(crate) fn call_site(&self) -> CallSite {
        let mut site = CallSite::default();
        let inputs = [
            ("project", &self.raw.project),
            ("location", &self.raw.location),
            ("root_dir", &self.raw.root_dir),
            ("encryption_spec_key_name", &self.raw.encryption_spec_key_name),
        ];
        for (name, value) in inputs {
            if let Some(value) = value {
                site = site.input(name, value.clone());
            }
        }
        if let Some(path) = &self.raw.gcp_resources {
            site = site.output(GCP_RESOURCES_OUTPUT, path.clone());
        }
        site
    }
}
