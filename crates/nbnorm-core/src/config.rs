//! On-disk defaults and verbosity control
//!
//! An optional `nbnorm.yml` in the working directory supplies default
//! processing options; CLI flags still win over it. The file is loaded
//! once and a malformed file degrades to built-in defaults with a warning
//! instead of aborting the run.

use crate::models::ProcessOptions;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Once, OnceLock};

// Global verbose flag for controlling debug output
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set the global verbose flag. When true, debug messages will be printed.
pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::SeqCst);
}

/// Check if verbose mode is enabled.
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Print a message to stderr only if verbose mode is enabled.
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if $crate::config::is_verbose() {
            eprintln!($($arg)*);
        }
    };
}

/// Canonical list of candidate config file names we search for on disk.
const CONFIG_FILENAMES: &[&str] = &["nbnorm.yml", "nbnorm.yaml"];

/// Complete configuration file structure.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    /// Default processing options applied when a flag is not given.
    pub defaults: ProcessOptions,
}

/// Public handle that stores the loaded configuration, its source path,
/// and any warnings produced while loading.
pub struct PipelineConfigHandle {
    pub config: PipelineConfig,
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

static CONFIG_HANDLE: OnceLock<PipelineConfigHandle> = OnceLock::new();
static CONFIG_ANNOUNCED: Once = Once::new();

/// Access the process-wide configuration, loading it on first use.
pub fn pipeline_config_handle() -> &'static PipelineConfigHandle {
    CONFIG_HANDLE.get_or_init(load_config)
}

/// Announce (once) where the configuration came from, plus any warnings.
pub fn log_config_usage() {
    CONFIG_ANNOUNCED.call_once(|| {
        let handle = pipeline_config_handle();
        if let Some(source) = &handle.source {
            println!("Using defaults from {}", source.display());
        }
        for warning in &handle.warnings {
            eprintln!("Warning: {}", warning);
        }
    });
}

fn load_config() -> PipelineConfigHandle {
    let mut warnings = Vec::new();

    for filename in CONFIG_FILENAMES {
        let path = PathBuf::from(filename);
        if !path.exists() {
            continue;
        }

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                warnings.push(format!("failed to read {}: {}", path.display(), e));
                continue;
            }
        };

        match serde_yaml::from_str::<PipelineConfig>(&contents) {
            Ok(config) => {
                let (config, mut sanitize_warnings) = sanitize(config);
                warnings.append(&mut sanitize_warnings);
                return PipelineConfigHandle {
                    config,
                    source: Some(path),
                    warnings,
                };
            }
            Err(e) => {
                warnings.push(format!(
                    "ignoring malformed config {}: {}",
                    path.display(),
                    e
                ));
            }
        }
    }

    PipelineConfigHandle {
        config: PipelineConfig::default(),
        source: None,
        warnings,
    }
}

/// Reject out-of-range defaults rather than letting them reach the
/// pipeline as silently invalid values.
fn sanitize(config: PipelineConfig) -> (PipelineConfig, Vec<String>) {
    match config.defaults.validate() {
        Ok(()) => (config, Vec::new()),
        Err(reason) => (
            PipelineConfig::default(),
            vec![format!(
                "config defaults ignored ({}), using built-in defaults",
                reason
            )],
        ),
    }
}
