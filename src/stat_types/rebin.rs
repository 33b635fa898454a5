//! Proportional rebinning of raw histogram buckets into uniform target bins.
//!
//! gem5 emits histogram buckets whose width depends on the observed range of
//! each run, so two dumps rarely share bucket boundaries. Rebinning maps every
//! raw bucket `[start, end)` onto a fixed layout, assuming the bucket's mass is
//! spread uniformly over its span.
//!
//! Layout for `bins = B`, `max_range = M`:
//! - `B > 1`: `B - 1` uniform bins covering `[0, M)` plus an overflow bucket `"{M}+"`.
//! - `B == 1`: a single bin `[0, M)`; mass above `M` folds into it.

use crate::stat_types::samples::KeyedTotals;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RebinLayout {
    width: f64,
    max_range: f64,
    /// Labels of the uniform bins, index-aligned with the bins.
    bin_labels: Vec<String>,
    overflow_label: Option<String>,
}

impl RebinLayout {
    /// Returns `None` when rebinning is disabled (`bins == 0` or `max_range <= 0`).
    pub fn new(bins: u32, max_range: f64) -> Option<Self> {
        if bins == 0 || !(max_range > 0.0) || !max_range.is_finite() {
            return None;
        }
        let (uniform_bins, overflow_label) = if bins > 1 {
            (bins - 1, Some(format!("{}+", max_range.trunc() as i64)))
        } else {
            (1, None)
        };
        let width = max_range / f64::from(uniform_bins);
        let bin_labels = (0..uniform_bins)
            .map(|b| {
                let start = f64::from(b) * width;
                let end = f64::from(b + 1) * width;
                format!("{}-{}", start.trunc() as i64, end.trunc() as i64)
            })
            .collect();
        Some(Self {
            width,
            max_range,
            bin_labels,
            overflow_label,
        })
    }

    /// Output labels in bin order. Labels that truncate to the same text share a column.
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::with_capacity(self.bin_labels.len() + 1);
        for label in self.bin_labels.iter().chain(self.overflow_label.iter()) {
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }
        labels
    }

    /// Redistributes one sample's raw buckets onto the layout.
    ///
    /// Keys that are not `<start>-<end>` ranges are summary values and pass
    /// through unchanged. Zero-mass and zero-span buckets contribute nothing.
    pub fn rebin<'a, I>(&self, sample: I) -> KeyedTotals
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut rebinned = KeyedTotals::with_keys(self.labels());
        for (raw_key, value) in sample {
            if value == 0.0 {
                continue;
            }
            let (raw_start, raw_end) = match parse_range_key(raw_key) {
                Some(bounds) => bounds,
                None => {
                    rebinned.add(raw_key, value);
                    continue;
                }
            };
            let raw_span = raw_end - raw_start;
            if raw_span <= 0.0 {
                continue;
            }

            // Portion inside [0, max_range).
            let effective_end = raw_end.min(self.max_range);
            if effective_end > raw_start {
                for (b, label) in self.bin_labels.iter().enumerate() {
                    let bin_start = b as f64 * self.width;
                    let bin_end = (b + 1) as f64 * self.width;
                    let overlap_start = raw_start.max(bin_start);
                    let overlap_end = effective_end.min(bin_end);
                    if overlap_end > overlap_start {
                        let proportion = (overlap_end - overlap_start) / raw_span;
                        rebinned.add(label, value * proportion);
                    }
                }
            }

            // Portion above max_range.
            let overflow_length = (raw_end - raw_start.max(self.max_range)).max(0.0);
            if overflow_length > 0.0 {
                let proportion = overflow_length / raw_span;
                let target = self
                    .overflow_label
                    .as_ref()
                    .or_else(|| self.bin_labels.last());
                if let Some(target) = target {
                    rebinned.add(target, value * proportion);
                }
            }
        }
        rebinned
    }
}

/// Extracts `(start, end)` from a range key such as `"0-1023"`.
pub(crate) fn parse_range_key(key: &str) -> Option<(f64, f64)> {
    let (start, end) = key.trim().split_once('-')?;
    let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(start) || !is_digits(end) {
        return None;
    }
    Some((start.parse().ok()?, end.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_parse_range_key() {
        assert_eq!(parse_range_key("0-1023"), Some((0.0, 1023.0)));
        assert_eq!(parse_range_key("2048-4095"), Some((2048.0, 4095.0)));
        assert_eq!(parse_range_key("mean"), None);
        assert_eq!(parse_range_key("100+"), None);
        assert_eq!(parse_range_key("-5"), None);
    }

    #[test]
    fn test_layout_disabled_without_bins_or_range() {
        assert!(RebinLayout::new(0, 100.0).is_none());
        assert!(RebinLayout::new(4, 0.0).is_none());
        assert!(RebinLayout::new(4, f64::NAN).is_none());
    }

    #[test]
    fn test_layout_labels_reserve_overflow_bucket() {
        let layout = RebinLayout::new(3, 30.0).unwrap();
        assert_eq!(layout.labels(), vec!["0-15", "15-30", "30+"]);

        let single = RebinLayout::new(1, 10.0).unwrap();
        assert_eq!(single.labels(), vec!["0-10"]);
    }

    #[test]
    fn test_rebinning_conserves_mass() {
        // 10 uniform bins of width 204.8 plus the 2048+ overflow bucket.
        let layout = RebinLayout::new(11, 2048.0).unwrap();
        assert!(approx(layout.width, 204.8));

        let rebinned = layout.rebin(vec![("0-512", 512.0)]);
        assert!(approx(rebinned.get("0-204").unwrap(), 204.8));
        assert!(approx(rebinned.get("204-409").unwrap(), 204.8));
        assert!(approx(rebinned.get("409-614").unwrap(), 102.4));
        assert!(approx(rebinned.get("614-819").unwrap(), 0.0));
        assert!(approx(rebinned.sum(), 512.0));
    }

    #[test]
    fn test_mass_above_range_goes_to_overflow() {
        let layout = RebinLayout::new(2, 100.0).unwrap();
        let rebinned = layout.rebin(vec![("150-200", 10.0), ("90-110", 20.0)]);
        assert!(approx(rebinned.get("0-100").unwrap(), 10.0));
        assert!(approx(rebinned.get("100+").unwrap(), 20.0));
    }

    #[test]
    fn test_single_bin_folds_overflow_into_the_bin() {
        let layout = RebinLayout::new(1, 100.0).unwrap();
        let rebinned = layout.rebin(vec![("50-150", 10.0)]);
        assert!(approx(rebinned.get("0-100").unwrap(), 10.0));
        assert_eq!(rebinned.iter().count(), 1);
    }

    #[test]
    fn test_summary_keys_pass_through() {
        let layout = RebinLayout::new(3, 100.0).unwrap();
        let rebinned = layout.rebin(vec![("0-100", 100.0), ("mean", 50.0), ("empty", 0.0)]);
        assert!(approx(rebinned.get("0-50").unwrap(), 50.0));
        assert!(approx(rebinned.get("50-100").unwrap(), 50.0));
        assert!(approx(rebinned.get("mean").unwrap(), 50.0));
        assert_eq!(rebinned.get("empty"), None);
    }
}
