//! Used when the `logging` feature is off: no logger is installed, but the public
//! API still works and the `log` crate's max level is kept in sync.

use crate::log::LogConfiguration;

impl LogConfiguration {
    pub(in crate::log) fn set_config(&mut self) {
        log::set_max_level(self.global_log_level);
    }
}
