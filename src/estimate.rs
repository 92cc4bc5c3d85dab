//! Resolver cache footprint estimate for the merged list.

use crate::config::SizeEstimateConfig;

/// Estimated footprint of a list, compared against the configured ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizeEstimate {
    pub entries: usize,
    pub kib: u64,
    pub ceiling_kib: u64,
}

impl SizeEstimate {
    pub fn exceeds_ceiling(&self) -> bool {
        self.kib > self.ceiling_kib
    }
}

/// `ceil(entries * kib_per_entry * buffer_factor)`
///
/// # Examples
/// ```
/// use hostmerge::config::SizeEstimateConfig;
/// use hostmerge::estimate::estimate_size;
///
/// let est = estimate_size(1000, &SizeEstimateConfig::default(), 100);
/// assert_eq!(est.kib, 118);
/// assert!(est.exceeds_ceiling());
/// ```
pub fn estimate_size(entries: usize, constants: &SizeEstimateConfig, ceiling_kib: u64) -> SizeEstimate {
    let raw = entries as f64 * constants.kib_per_entry * constants.buffer_factor;
    SizeEstimate {
        entries,
        kib: raw.ceil() as u64,
        ceiling_kib,
    }
}
