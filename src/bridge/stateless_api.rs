// In: src/bridge/stateless_api.rs

use crate::config::ParseConfig;
use crate::decoder;
use crate::error::StatsError;
use crate::reduction::{self, DumpRow};
use crate::stat_types::StatTypeRegistry;

/// Decodes and reduces one dump with the built-in accumulator types.
pub fn process_dump(text: &str, config: &ParseConfig) -> Result<DumpRow, StatsError> {
    process_dump_with(text, config, &StatTypeRegistry::default())
}

/// Decodes and reduces one dump, building accumulators from `registry`.
pub fn process_dump_with(
    text: &str,
    config: &ParseConfig,
    registry: &StatTypeRegistry,
) -> Result<DumpRow, StatsError> {
    // 1. Fresh accumulators for this dump only.
    let mut stats = registry.build_all(config)?;

    // 2. Decode the text into them.
    let report = decoder::decode_dump(text, &mut stats)?;
    log::debug!(
        "decoded dump: {} lines, {} skipped, {} defaulted",
        report.lines,
        report.skipped,
        report.defaulted
    );

    // 3. Collapse to one row.
    reduction::reduce_dump(&mut stats)
}

/// The columns known before any dump is decoded.
///
/// Discovered entries (unbounded distributions, histograms without explicit
/// entries or rebinning) only contribute their statically known part.
pub fn header_for(config: &ParseConfig) -> Result<Vec<String>, StatsError> {
    header_for_with(config, &StatTypeRegistry::default())
}

pub fn header_for_with(
    config: &ParseConfig,
    registry: &StatTypeRegistry,
) -> Result<Vec<String>, StatsError> {
    let stats = registry.build_all(config)?;
    Ok(stats.iter().flat_map(|stat| stat.columns()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VariableConfig;
    use crate::types::StatValue;

    #[test]
    fn test_process_dump_end_to_end() {
        // 1. Arrange: the configuration a scheduler would load once.
        let config = ParseConfig::new(vec![
            VariableConfig::scalar("simTicks"),
            VariableConfig::vector("cacheMiss", ["0"]),
        ]);
        let text = "Scalar/simTicks/99\nVector/cacheMiss::0/10\nVector/cacheMiss::0/5\n";

        // 2. Act
        let row = process_dump(text, &config).unwrap();

        // 3. Assert
        assert_eq!(row.columns, vec!["simTicks", "cacheMiss..0"]);
        assert_eq!(row.get("simTicks").unwrap().to_string(), "99");
        assert_eq!(row.get("cacheMiss..0"), Some(&StatValue::Number(15.0)));
    }

    #[test]
    fn test_header_matches_row_columns_for_static_layouts() {
        let config = ParseConfig::new(vec![
            VariableConfig::scalar("simTicks"),
            VariableConfig::distribution("d")
                .with_bounds(0, 1)
                .with_statistics(["mean"]),
            VariableConfig::histogram("h").with_rebinning(3, 100.0),
        ]);
        let header = header_for(&config).unwrap();
        assert_eq!(
            header,
            vec![
                "simTicks",
                "d..underflows",
                "d..0",
                "d..1",
                "d..overflows",
                "d..mean",
                "h..0-50",
                "h..50-100",
                "h..100+",
            ]
        );

        let row = process_dump("Distribution/d::0/3\nHistogram/h::0-100/10\n", &config).unwrap();
        assert_eq!(row.columns, header);
    }
}
