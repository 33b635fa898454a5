// In: src/decoder/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Line-Protocol Decoder
// ====================================================================================
//
// Decoding one dump is a strict, three-step sequence. Each step consumes the
// previous state, so running them out of order does not compile:
//
//   1. [LineDecoder::process_lines]  text -> BufferedDump
//         Every line is tokenized and routed, but only into local buffers.
//         A protocol mismatch aborts here, before any accumulator is written.
//
//   2. [BufferedDump::flush]         -> FlushedDump
//         One `set_entries` per buffered entry-indexed variable, then the last
//         value of every buffered scalar.
//
//   3. [FlushedDump::validate]       -> DecodeReport
//         Variables the dump never mentioned receive their defaults.
//
// Unknown identifiers are dropped silently; unknown tags and malformed lines are
// skipped with a warning.
// ====================================================================================

pub mod wire;

use hashbrown::HashMap;

use crate::error::StatsError;
use crate::stat_types::{EntryBatch, StatSet};
use crate::types::{LineTag, StatKind};
use wire::{parse_line, split_identifier, SkipReason, WireLine};

/// Suffix of the scalar a `Summary` line feeds when its base is not entry-indexed.
pub const SUMMARY_SUFFIX: &str = "__get_summary";

/// Line accounting for one decoded dump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeReport {
    pub lines: usize,
    /// Blank, malformed or unknown-tag lines.
    pub skipped: usize,
    /// Well-formed lines for identifiers nobody asked for.
    pub dropped: usize,
    pub scalar_writes: usize,
    pub entry_writes: usize,
    /// Variables that received their default in `validate`.
    pub defaulted: usize,
}

//==================================================================================
// 1. Empty -> LinesProcessed
//==================================================================================

/// The entry point: a decoder bound to one dump's freshly built accumulators.
#[derive(Debug)]
pub struct LineDecoder<'s> {
    stats: &'s mut StatSet,
}

impl<'s> LineDecoder<'s> {
    pub fn new(stats: &'s mut StatSet) -> Result<Self, StatsError> {
        if stats.is_empty() {
            return Err(StatsError::config("<decoder>", "vars to parse is empty"));
        }
        Ok(Self { stats })
    }

    /// Tokenizes and routes every line of `text` into local buffers.
    pub fn process_lines(self, text: &str) -> Result<BufferedDump<'s>, StatsError> {
        let mut buffered = BufferedDump {
            stats: self.stats,
            entries: HashMap::new(),
            entry_order: Vec::new(),
            scalars: HashMap::new(),
            scalar_order: Vec::new(),
            report: DecodeReport::default(),
        };
        for line in text.lines() {
            buffered.report.lines += 1;
            match parse_line(line) {
                Ok(wire) => buffered.route(wire)?,
                Err(SkipReason::Blank) => buffered.report.skipped += 1,
                Err(SkipReason::Malformed(raw)) => {
                    log::warn!("skipping malformed line '{}'", raw);
                    buffered.report.skipped += 1;
                }
                Err(SkipReason::UnknownTag(tag)) => {
                    log::warn!("skipping line with unknown type tag '{}'", tag);
                    buffered.report.skipped += 1;
                }
            }
        }
        Ok(buffered)
    }
}

//==================================================================================
// 2. LinesProcessed -> Flushed
//==================================================================================

/// All lines routed; accumulators are still untouched.
#[derive(Debug)]
pub struct BufferedDump<'s> {
    stats: &'s mut StatSet,
    entries: HashMap<String, EntryBatch>,
    entry_order: Vec<String>,
    /// Last write wins.
    scalars: HashMap<String, String>,
    scalar_order: Vec<String>,
    report: DecodeReport,
}

impl<'s> BufferedDump<'s> {
    fn kind_of(&self, id: &str) -> Option<StatKind> {
        self.stats.get(id).map(|stat| stat.kind())
    }

    fn route(&mut self, line: WireLine<'_>) -> Result<(), StatsError> {
        match line.tag {
            LineTag::Summary => self.route_summary(line),
            tag if tag.is_compound() => self.route_compound(line),
            _ => self.route_scalar(line),
        }
    }

    fn route_scalar(&mut self, line: WireLine<'_>) -> Result<(), StatsError> {
        match self.kind_of(line.identifier) {
            None => self.report.dropped += 1,
            Some(kind) if line.tag.accepts(kind) => {
                self.buffer_scalar(line.identifier, line.value)
            }
            Some(kind) => return Err(mismatch(line.identifier, kind, line.tag)),
        }
        Ok(())
    }

    fn route_compound(&mut self, line: WireLine<'_>) -> Result<(), StatsError> {
        let (base, entry) = match split_identifier(line.identifier) {
            Some(parts) => parts,
            None => {
                match self.kind_of(line.identifier) {
                    None => self.report.dropped += 1,
                    Some(kind) if kind.is_scalar_assignable() => {
                        return Err(mismatch(line.identifier, kind, line.tag))
                    }
                    Some(_) => {
                        log::warn!(
                            "skipping {} line without entry key for '{}'",
                            line.tag,
                            line.identifier
                        );
                        self.report.skipped += 1;
                    }
                }
                return Ok(());
            }
        };
        match self.kind_of(base) {
            None => self.report.dropped += 1,
            Some(kind) if line.tag.accepts(kind) => self.buffer_entry(base, entry, line.value),
            Some(kind) => return Err(mismatch(base, kind, line.tag)),
        }
        Ok(())
    }

    /// `Summary` lines feed an entry-indexed base directly, otherwise the
    /// `<base>__get_summary` scalar when one is configured.
    fn route_summary(&mut self, line: WireLine<'_>) -> Result<(), StatsError> {
        let (base, entry) = match split_identifier(line.identifier) {
            Some((base, entry)) => (base, Some(entry)),
            None => (line.identifier, None),
        };
        if let (Some(kind), Some(entry)) = (self.kind_of(base), entry) {
            if kind.is_entry_indexed() {
                self.buffer_entry(base, entry, line.value);
                return Ok(());
            }
        }

        let target = format!("{}{}", base, SUMMARY_SUFFIX);
        match self.kind_of(&target) {
            None => self.report.dropped += 1,
            Some(kind) if kind.is_scalar_assignable() => self.buffer_scalar(&target, line.value),
            Some(kind) => return Err(mismatch(&target, kind, line.tag)),
        }
        Ok(())
    }

    fn buffer_scalar(&mut self, id: &str, value: &str) {
        if self
            .scalars
            .insert(id.to_string(), value.to_string())
            .is_none()
        {
            self.scalar_order.push(id.to_string());
        }
    }

    fn buffer_entry(&mut self, base: &str, entry: &str, value: &str) {
        if !self.entries.contains_key(base) {
            self.entry_order.push(base.to_string());
        }
        self.entries
            .entry(base.to_string())
            .or_default()
            .push(entry, value);
    }

    /// Writes the buffers into the accumulators.
    pub fn flush(mut self) -> Result<FlushedDump<'s>, StatsError> {
        for id in &self.entry_order {
            if let (Some(stat), Some(batch)) = (self.stats.get_mut(id), self.entries.get(id)) {
                stat.set_entries(batch)?;
                self.report.entry_writes += 1;
            }
        }
        for id in &self.scalar_order {
            if let (Some(stat), Some(value)) = (self.stats.get_mut(id), self.scalars.get(id)) {
                stat.set_scalar(value)?;
                self.report.scalar_writes += 1;
            }
        }
        Ok(FlushedDump {
            stats: self.stats,
            report: self.report,
        })
    }
}

//==================================================================================
// 3. Flushed -> Validated
//==================================================================================

#[derive(Debug)]
pub struct FlushedDump<'s> {
    stats: &'s mut StatSet,
    report: DecodeReport,
}

impl FlushedDump<'_> {
    /// Applies the defaults of every variable and ends the decode.
    pub fn validate(self) -> Result<DecodeReport, StatsError> {
        let mut report = self.report;
        for stat in self.stats.iter_mut() {
            if stat.is_uninitialized() {
                report.defaulted += 1;
            }
            stat.apply_default()?;
        }
        log_metric!(
            "event" = "decode_dump",
            "lines" = report.lines,
            "skipped" = report.skipped,
            "dropped" = report.dropped,
            "scalar_writes" = report.scalar_writes,
            "entry_writes" = report.entry_writes,
            "defaulted" = report.defaulted
        );
        Ok(report)
    }
}

/// Runs the full decode of one dump into `stats`.
pub fn decode_dump(text: &str, stats: &mut StatSet) -> Result<DecodeReport, StatsError> {
    LineDecoder::new(stats)?
        .process_lines(text)?
        .flush()?
        .validate()
}

fn mismatch(id: &str, expected: StatKind, found: LineTag) -> StatsError {
    StatsError::ProtocolMismatchError {
        id: id.to_string(),
        expected,
        found: found.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ParseConfig, VariableConfig};
    use crate::stat_types::{StatTypeRegistry, StatType};
    use crate::types::StatValue;

    fn build(vars: Vec<VariableConfig>) -> StatSet {
        StatTypeRegistry::default()
            .build_all(&ParseConfig::new(vars))
            .unwrap()
    }

    fn reduced(stats: &mut StatSet, id: &str, key: Option<&str>) -> StatValue {
        let stat: &mut StatType = stats.get_mut(id).unwrap();
        stat.balance().unwrap();
        stat.reduce().unwrap();
        stat.reduced_value(key).unwrap()
    }

    #[test]
    fn test_scalar_and_multi_source_vector() {
        let mut stats = build(vec![
            VariableConfig::scalar("simTicks"),
            VariableConfig::vector("cacheMiss", ["0"]),
        ]);
        let text = "Scalar/simTicks/99\nVector/cacheMiss::0/10\nVector/cacheMiss::0/5\n";
        let report = decode_dump(text, &mut stats).unwrap();

        assert_eq!(report.lines, 3);
        assert_eq!(report.scalar_writes, 1);
        assert_eq!(report.entry_writes, 1);
        assert_eq!(reduced(&mut stats, "simTicks", None).to_string(), "99");
        assert_eq!(
            reduced(&mut stats, "cacheMiss", Some("0")),
            StatValue::Number(15.0)
        );
    }

    #[test]
    fn test_mismatch_leaves_every_variable_untouched() {
        let mut stats = build(vec![
            VariableConfig::scalar("simTicks"),
            VariableConfig::vector("cacheMiss", ["0"]),
        ]);
        let text = "Scalar/simTicks/99\nScalar/cacheMiss/10\n";
        let err = decode_dump(text, &mut stats).unwrap_err();

        assert!(matches!(
            err,
            StatsError::ProtocolMismatchError {
                expected: StatKind::Vector,
                ..
            }
        ));
        assert!(stats.iter().all(StatType::is_uninitialized));
    }

    #[test]
    fn test_unknown_identifiers_and_tags_are_tolerated() {
        let mut stats = build(vec![VariableConfig::scalar("simTicks")]);
        let text = "Scalar/hostSeconds/1.5\nMatrix/simTicks/3\nScalar/simTicks\n\nVector/other::0/1\n";
        let report = decode_dump(text, &mut stats).unwrap();

        assert_eq!(report.dropped, 2);
        assert_eq!(report.skipped, 3);
        assert_eq!(report.defaulted, 1);
        assert_eq!(
            reduced(&mut stats, "simTicks", None),
            StatValue::Number(0.0)
        );
    }

    #[test]
    fn test_last_scalar_write_wins() {
        let mut stats = build(vec![VariableConfig::scalar("simTicks")]);
        decode_dump("Scalar/simTicks/1\nScalar/simTicks/2\n", &mut stats).unwrap();
        assert_eq!(
            reduced(&mut stats, "simTicks", None),
            StatValue::Number(2.0)
        );
    }

    #[test]
    fn test_histogram_tag_feeds_configured_vector() {
        let mut stats = build(vec![VariableConfig::vector("lat", ["0-9", "10-19"])]);
        decode_dump("Histogram/lat::0-9/4\nHistogram/lat::10-19/6\n", &mut stats).unwrap();
        assert_eq!(
            reduced(&mut stats, "lat", Some("10-19")),
            StatValue::Number(6.0)
        );
    }

    #[test]
    fn test_compound_tag_for_scalar_is_a_mismatch() {
        for text in ["Vector/simTicks/5\n", "Vector/simTicks::0/5\n", "Histogram/simTicks/5\n"] {
            let mut stats = build(vec![VariableConfig::scalar("simTicks")]);
            let err = decode_dump(text, &mut stats).unwrap_err();
            assert!(
                matches!(
                    err,
                    StatsError::ProtocolMismatchError {
                        expected: StatKind::Scalar,
                        ref id,
                        ..
                    } if id == "simTicks"
                ),
                "{text:?} gave {err:?}"
            );
            assert!(stats.iter().all(StatType::is_uninitialized));
        }
    }

    #[test]
    fn test_keyless_line_for_entry_indexed_is_skipped() {
        let mut stats = build(vec![VariableConfig::vector("cacheMiss", ["0"])]);
        let report = decode_dump("Vector/cacheMiss/5\n", &mut stats).unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.defaulted, 1);
    }

    #[test]
    fn test_distribution_tag_for_vector_is_a_mismatch() {
        let mut stats = build(vec![VariableConfig::vector("v", ["0"])]);
        assert!(matches!(
            decode_dump("Distribution/v::0/1\n", &mut stats),
            Err(StatsError::ProtocolMismatchError { .. })
        ));
    }

    #[test]
    fn test_summary_routing() {
        let mut stats = build(vec![
            VariableConfig::histogram("lat").with_statistics(["mean"]),
            VariableConfig::scalar("ipc__get_summary"),
        ]);
        let text = "Summary/lat::mean/12.5\nSummary/ipc/1.25\nSummary/other/3\n";
        let report = decode_dump(text, &mut stats).unwrap();

        assert_eq!(report.dropped, 1);
        assert_eq!(
            reduced(&mut stats, "lat", Some("mean")),
            StatValue::Number(12.5)
        );
        assert_eq!(
            reduced(&mut stats, "ipc__get_summary", None),
            StatValue::Number(1.25)
        );
    }

    #[test]
    fn test_missing_configuration_uses_on_empty() {
        let mut stats = build(vec![VariableConfig::configuration("isa", "unknown")]);
        decode_dump("Scalar/simTicks/1\n", &mut stats).unwrap();
        assert_eq!(
            reduced(&mut stats, "isa", None),
            StatValue::from("unknown")
        );
    }

    #[test]
    fn test_empty_variable_set_is_rejected() {
        let mut stats = StatSet::new();
        assert!(matches!(
            decode_dump("Scalar/simTicks/1\n", &mut stats),
            Err(StatsError::ConfigurationError { .. })
        ));
    }
}
