//! Diagnostic logging for the model. This is not reporting: the infection log and
//! the state/location counts are model outputs, while messages here describe what
//! the simulation is doing.
//!
//! The five `log` macros are re-exported: `error!`, `warn!`, `info!`, `debug!` and
//! `trace!`. Update rules log transitions at `trace`, the tick driver logs tick
//! summaries at `debug`, and setup steps log at `info`.
//!
//! Logging is _disabled_ by default. Enable it with the `--log-level` command
//! line option, which takes a level optionally followed by module filters
//! (`info,ixa_hospital_model::rules=trace`), or from code:
//!
//! ```rust
//! use ixa_hospital_model::log::{set_log_level, set_module_filter, LevelFilter};
//!
//! pub fn setup_logging() {
//!     set_log_level(LevelFilter::Debug);
//!     // Per-agent transitions are noisy; keep them for the rules module only.
//!     set_module_filter("ixa_hospital_model::rules", LevelFilter::Trace);
//! }
//! ```
#[cfg(feature = "logging")]
mod standard_logger;

#[cfg(not(feature = "logging"))]
mod null_logger;

use std::collections::hash_map::Entry;
use std::sync::{LazyLock, Mutex, MutexGuard};

pub use log::{debug, error, info, trace, warn, LevelFilter};
#[cfg(feature = "logging")]
use log4rs::Handle;

use crate::hashing::HashMap;

// Logging disabled
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Off;

/// A global instance of the logging configuration.
static LOG_CONFIGURATION: LazyLock<Mutex<LogConfiguration>> = LazyLock::new(Mutex::default);

/// A level filter for one module path (e.g. `"ixa_hospital_model::rules"`).
#[derive(Debug, PartialEq)]
struct ModuleLogConfiguration {
    module: String,
    level: LevelFilter,
}

impl From<(&str, LevelFilter)> for ModuleLogConfiguration {
    fn from((module, level): (&str, LevelFilter)) -> Self {
        Self {
            module: module.to_string(),
            level,
        }
    }
}

/// Tracks the global filter level, the per-module filters, and the handle of the
/// installed logger. Loggers are installed process-wide, so only the static
/// instance above exists; the public API is free functions that lock it.
#[derive(Debug)]
pub(in crate::log) struct LogConfiguration {
    /// Level for modules without their own filter. `Off` disables logging.
    pub(in crate::log) global_log_level: LevelFilter,
    module_configurations: HashMap<String, ModuleLogConfiguration>,

    #[cfg(feature = "logging")]
    root_handle: Option<Handle>,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        Self {
            global_log_level: DEFAULT_LOG_LEVEL,
            module_configurations: HashMap::default(),

            #[cfg(feature = "logging")]
            root_handle: None,
        }
    }
}

impl LogConfiguration {
    fn set_log_level(&mut self, level: LevelFilter) {
        self.global_log_level = level;
        self.set_config();
    }

    /// Returns true if the configuration was mutated, false otherwise.
    fn insert_module_filter(&mut self, module: &str, level: LevelFilter) -> bool {
        match self.module_configurations.entry(module.to_string()) {
            Entry::Occupied(mut entry) => {
                if entry.get().level == level {
                    return false;
                }
                entry.get_mut().level = level;
            }
            Entry::Vacant(entry) => {
                entry.insert((module, level).into());
            }
        }
        true
    }

    fn set_module_filter(&mut self, module: &str, level: LevelFilter) {
        if self.insert_module_filter(module, level) {
            self.set_config();
        }
    }

    /// Module filters sorted by path so the installed config is deterministic.
    fn sorted_module_configurations(&self) -> Vec<&ModuleLogConfiguration> {
        let mut configurations: Vec<_> = self.module_configurations.values().collect();
        configurations.sort_by(|a, b| a.module.cmp(&b.module));
        configurations
    }
}

/// Sets the global log level.
pub fn set_log_level(level: LevelFilter) {
    get_log_configuration().set_log_level(level);
}

/// Sets a level filter for the given module path.
pub fn set_module_filter(module_path: &str, level_filter: LevelFilter) {
    get_log_configuration().set_module_filter(module_path, level_filter);
}

fn get_log_configuration() -> MutexGuard<'static, LogConfiguration> {
    LOG_CONFIGURATION.lock().expect("Mutex poisoned")
}
