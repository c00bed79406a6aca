// SPDX-License-Identifier: LGPL-3.0-or-later

//! Pipeline configuration.
//!
//! All knobs are fixed for the lifetime of a pipeline; misuse is
//! rejected at construction, never discovered mid-frame.

use crate::window::WindowKind;

/// Static configuration for one acquisition/analysis pipeline.
///
/// The defaults match the target hardware: 40 kHz
/// effective sample rate with 2× oversampling, a 512-point window and
/// an 84-column display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Effective (post-decimation) sample rate in Hz.
    pub sample_rate: u32,
    /// Oversampling factor; the timer interrupt fires at
    /// `sample_rate * oversample`. 1 disables the oversampling filter.
    pub oversample: u8,
    /// Window/transform length. Power of two.
    pub window_len: usize,
    /// Display column count. Must be below `window_len / 2` (the
    /// usable bin count).
    pub columns: usize,
    /// Envelope applied before the transform.
    pub window: WindowKind,
    /// Column smoothing shift: larger is slower, 0 is pass-through.
    pub filter_shift: u8,
    /// Compress column magnitudes to decibels before smoothing.
    pub decibels: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 40_000,
            oversample: 2,
            window_len: 512,
            columns: 84,
            window: WindowKind::Hann,
            filter_shift: 1,
            decibels: false,
        }
    }
}

impl PipelineConfig {
    /// `log2(window_len)`.
    pub fn rank(&self) -> usize {
        self.window_len.trailing_zeros() as usize
    }

    /// Validate the configuration, panicking on misuse.
    ///
    /// # Panics
    /// Panics if the window length is not a power of two >= 8, if the
    /// column count is not in `2..window_len / 2`, if `oversample` is
    /// zero, or if `filter_shift` does not leave any smoothing headroom.
    pub fn validate(&self) {
        assert!(
            self.window_len >= 8 && self.window_len.is_power_of_two(),
            "window length must be a power of two >= 8, got {}",
            self.window_len
        );
        assert!(
            self.columns >= 2 && self.columns < self.window_len / 2,
            "column count must be in 2..{} (bin count), got {}",
            self.window_len / 2,
            self.columns
        );
        assert!(self.oversample >= 1, "oversampling factor must be >= 1");
        assert!(
            self.filter_shift < 16,
            "filter shift must be below 16, got {}",
            self.filter_shift
        );
        assert!(self.sample_rate > 0, "sample rate must be nonzero");
    }
}
