// In: src/decoder/wire.rs

//! Tokenizer for the line protocol: `Type/Identifier/Value`, one record per line.
//!
//! Only the first two `/` separate fields, so values may themselves contain `/`.
//! Compound identifiers carry their entry key after `::` (`cacheMiss::0`).

use crate::types::LineTag;

/// Separator between a compound identifier's base and its entry key.
pub const ENTRY_SEPARATOR: &str = "::";

/// One well-formed line, borrowing from the dump text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireLine<'a> {
    pub tag: LineTag,
    pub identifier: &'a str,
    pub value: &'a str,
}

/// Why a line produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason<'a> {
    Blank,
    /// Fewer than three fields.
    Malformed(&'a str),
    UnknownTag(&'a str),
}

/// Tokenizes one line. Surrounding whitespace is trimmed from every field.
pub fn parse_line(line: &str) -> Result<WireLine<'_>, SkipReason<'_>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(SkipReason::Blank);
    }
    let mut parts = trimmed.splitn(3, '/');
    let (raw_tag, identifier, value) = match (parts.next(), parts.next(), parts.next()) {
        (Some(tag), Some(identifier), Some(value)) => (tag.trim(), identifier.trim(), value.trim()),
        _ => return Err(SkipReason::Malformed(trimmed)),
    };
    let tag = LineTag::parse(raw_tag).ok_or(SkipReason::UnknownTag(raw_tag))?;
    Ok(WireLine {
        tag,
        identifier,
        value,
    })
}

/// Splits `base::entry` into `(base, entry)`. `None` when there is no entry key.
pub fn split_identifier(identifier: &str) -> Option<(&str, &str)> {
    identifier
        .split_once(ENTRY_SEPARATOR)
        .map(|(base, entry)| (base.trim(), entry.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_trims_and_keeps_slashes_in_value() {
        let line = parse_line("  Configuration / system.workload / /bin/ls -l ").unwrap();
        assert_eq!(line.tag, LineTag::Configuration);
        assert_eq!(line.identifier, "system.workload");
        assert_eq!(line.value, "/bin/ls -l");
    }

    #[test]
    fn test_parse_line_tag_is_case_insensitive() {
        assert_eq!(parse_line("vector/a::0/1").unwrap().tag, LineTag::Vector);
        assert_eq!(parse_line("SUMMARY/a/1").unwrap().tag, LineTag::Summary);
    }

    #[test]
    fn test_parse_line_skip_reasons() {
        assert_eq!(parse_line("   "), Err(SkipReason::Blank));
        assert_eq!(
            parse_line("Scalar/simTicks"),
            Err(SkipReason::Malformed("Scalar/simTicks"))
        );
        assert_eq!(parse_line("Matrix/a/1"), Err(SkipReason::UnknownTag("Matrix")));
    }

    #[test]
    fn test_split_identifier() {
        assert_eq!(split_identifier("cacheMiss::0"), Some(("cacheMiss", "0")));
        assert_eq!(
            split_identifier("mem::lat::0-1023"),
            Some(("mem", "lat::0-1023"))
        );
        assert_eq!(split_identifier("simTicks"), None);
    }
}
