// SPDX-License-Identifier: LGPL-3.0-or-later

//! Fixed-point window functions.
//!
//! The envelope is applied in place to the sample window before the
//! transform. The Hann window reads a precomputed Q15 raised-cosine
//! table instead of evaluating the cosine per sample; the triangular
//! window is a pair of shifts; rectangular is the identity.

/// Length of the raised-cosine lookup table (one full window period).
pub const COS_TABLE_LEN: usize = 128;

/// Q15 raised-cosine (Hann) envelope, `32766 * 0.5 * (1 - cos(2πi/128))`.
///
/// Read-only, process-lifetime constant. Indexed by
/// `(i * COS_TABLE_LEN) >> log2(window_len)`, which never exceeds
/// `COS_TABLE_LEN - 1`.
pub static COS_WINDOW: [i16; COS_TABLE_LEN] = [
    0, 20, 79, 177, 315, 491, 705, 958, 1247, 1573, 1934, 2331, 2761,
    3224, 3719, 4244, 4798, 5381, 5990, 6624, 7281, 7960, 8660, 9378, 10113, 10864,
    11627, 12402, 13187, 13979, 14777, 15579, 16383, 17187, 17989, 18787, 19579, 20364, 21139,
    21902, 22653, 23388, 24106, 24806, 25485, 26142, 26776, 27385, 27968, 28522, 29047, 29542,
    30005, 30435, 30832, 31193, 31519, 31808, 32061, 32275, 32451, 32589, 32687, 32746, 32766,
    32746, 32687, 32589, 32451, 32275, 32061, 31808, 31519, 31193, 30832, 30435, 30005, 29542,
    29047, 28522, 27968, 27385, 26776, 26142, 25485, 24806, 24106, 23388, 22653, 21902, 21139,
    20364, 19579, 18787, 17989, 17187, 16383, 15579, 14777, 13979, 13187, 12402, 11627, 10864,
    10113, 9378, 8660, 7960, 7281, 6624, 5990, 5381, 4798, 4244, 3719, 3224, 2761,
    2331, 1934, 1573, 1247, 958, 705, 491, 315, 177, 79, 20,
];

/// Window envelope selection.
///
/// Chosen once at configuration time; [`apply`](WindowKind::apply)
/// branches on the variant once, not per element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    /// Symmetric linear ramp up/down. Peak gain 0.5.
    Triangular,
    /// Raised cosine via [`COS_WINDOW`]. Peak gain ~0.5.
    Hann,
    /// Identity (no attenuation, most spectral leakage).
    Rectangular,
}

impl WindowKind {
    /// Apply the envelope in place.
    ///
    /// `samples.len()` must be a power of two (it is the transform
    /// length).
    pub fn apply(self, samples: &mut [i16]) {
        let len = samples.len();
        debug_assert!(len.is_power_of_two());
        let rank = len.trailing_zeros();

        match self {
            WindowKind::Triangular => {
                let half = len / 2;
                for (i, s) in samples.iter_mut().enumerate() {
                    let ramp = if i < half { i } else { len - i } as i32;
                    *s = ((i32::from(*s) * ramp) >> rank) as i16;
                }
            }
            WindowKind::Hann => {
                for (i, s) in samples.iter_mut().enumerate() {
                    let idx = (i * COS_TABLE_LEN) >> rank;
                    *s = ((i32::from(*s) * i32::from(COS_WINDOW[idx])) >> 16) as i16;
                }
            }
            WindowKind::Rectangular => {}
        }
    }
}
