//! Injected logging for the engine.
//!
//! The engine writes diagnostics through a [`log::Log`] handed to it at
//! construction instead of the global macros, so embedders and tests can
//! route them independently of the process logger.

use log::{Level, Log, Metadata, Record};
use std::fmt;
use std::sync::Arc;

/// Target used for every engine record.
pub const TARGET: &str = "k8s_harden::engine";

/// Shared logger handle.
pub type SharedLogger = Arc<dyn Log>;

/// Logger that forwards to whatever the `log` facade has installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct FacadeLogger;

impl Log for FacadeLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level() && log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            log::logger().log(record);
        }
    }

    fn flush(&self) {
        log::logger().flush();
    }
}

/// The default logger handle.
pub fn facade() -> SharedLogger {
    Arc::new(FacadeLogger)
}

/// Emit one record through an injected logger.
pub fn emit(logger: &dyn Log, level: Level, args: fmt::Arguments<'_>) {
    let metadata = Metadata::builder().level(level).target(TARGET).build();
    if !logger.enabled(&metadata) {
        return;
    }
    logger.log(
        &Record::builder()
            .metadata(metadata)
            .args(args)
            .module_path_static(Some(module_path!()))
            .build(),
    );
}

#[cfg(test)]
pub(crate) mod capture {
    use super::*;
    use std::sync::Mutex;

    /// Logger that records every message, for assertions in tests.
    #[derive(Debug, Default)]
    pub struct CaptureLogger {
        pub lines: Mutex<Vec<(Level, String)>>,
    }

    impl CaptureLogger {
        pub fn messages(&self, level: Level) -> Vec<String> {
            self.lines
                .lock()
                .map(|lines| {
                    lines
                        .iter()
                        .filter(|(l, _)| *l == level)
                        .map(|(_, m)| m.clone())
                        .collect()
                })
                .unwrap_or_default()
        }
    }

    impl Log for CaptureLogger {
        fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &Record<'_>) {
            if let Ok(mut lines) = self.lines.lock() {
                lines.push((record.level(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }
}
