// In: src/logging.rs

//! Opt-in logger installation for binaries and scripts embedding the library.
//!
//! The library itself only talks to the `log` facade; nothing is printed until
//! the host installs a logger, either its own or the one below.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Once;

use log::LevelFilter;

use crate::error::StatsError;

static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` at `Info` level (overridable through `RUST_LOG`),
/// printing `[LEVEL] message`. With `log_file`, records are appended to that
/// file instead of stderr.
///
/// Only the first call installs anything; later calls are no-ops, as is a call
/// made after the host installed another logger.
pub fn enable_verbose_logging(log_file: Option<&Path>) -> Result<(), StatsError> {
    // Open the file outside the `Once` so a bad path is reported to the caller.
    let file = match log_file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };

    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(LevelFilter::Info);
        builder.parse_default_env();

        // Custom formatter: just print the level and message
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        if let Some(file) = file {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        let _ = builder.try_init();
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_verbose_logging_is_idempotent() {
        enable_verbose_logging(None).unwrap();
        enable_verbose_logging(None).unwrap();
        log::info!("logger installed");
    }

    #[test]
    fn test_unwritable_log_file_is_reported() {
        let path = Path::new("/nonexistent-dir/statdump/verbose.log");
        assert!(matches!(
            enable_verbose_logging(Some(path)),
            Err(StatsError::Io(_))
        ));
    }
}
