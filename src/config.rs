use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::report::AggregationMethod;
use crate::{DerbyError, DerbyResult};

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "derby.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DerbyConfig {
    /// Workbook used when a command gets no `--workbook`.
    #[serde(default)]
    pub workbook: Option<PathBuf>,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    #[serde(default)]
    pub method: AggregationMethod,
}

impl DerbyConfig {
    /// Pick the workbook path: the command line wins over the config file.
    pub fn resolve_workbook(&self, cli: Option<PathBuf>) -> DerbyResult<PathBuf> {
        cli.or_else(|| self.workbook.clone()).ok_or_else(|| {
            DerbyError::Validation(
                "no workbook selected; pass --workbook or set `workbook` in derby.toml".to_string(),
            )
        })
    }
}

/// Load a config file. A relative `workbook` is taken relative to the file.
pub fn load_config(path: &Path) -> DerbyResult<DerbyConfig> {
    let s = std::fs::read_to_string(path)?;
    let mut cfg: DerbyConfig = toml::from_str(&s)?;
    if let (Some(workbook), Some(dir)) = (cfg.workbook.as_ref(), path.parent()) {
        if workbook.is_relative() && !dir.as_os_str().is_empty() {
            cfg.workbook = Some(dir.join(workbook));
        }
    }
    debug!(config = %path.display(), ?cfg, "loaded config");
    Ok(cfg)
}

/// Load the explicit config file, or `derby.toml` when it exists, or defaults.
pub fn load_config_or_default(explicit: Option<&Path>) -> DerbyResult<DerbyConfig> {
    match explicit {
        Some(path) if !path.exists() => Err(DerbyError::NotFound(format!(
            "config file not found: {}",
            path.display()
        ))),
        Some(path) => load_config(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.exists() {
                load_config(default)
            } else {
                Ok(DerbyConfig::default())
            }
        }
    }
}
