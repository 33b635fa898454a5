//! This module provides observability hooks for the decode and reduction pipeline.
//!
//! Per-dump accounting (lines read, skipped and dropped, variables defaulted,
//! columns emitted) is what explains a surprising row, so it is emitted as one
//! structured key-value record per step. The `log_metric!` macro is the primary tool.
//!
//! Records go through the `log` facade at `debug` level and are compiled out of
//! release builds by `#[cfg(debug_assertions)]`.

/// Logs a structured key-value metric record at `debug` level, only in debug builds.
///
/// # Example
/// ```
/// use statdump_core::log_metric;
/// let columns = 4;
/// log_metric!("event"="reduce_dump", "columns"=&columns);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            // Collect each pair as a JSON string fragment
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+

            $crate::__log::debug!("STATDUMP_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}
