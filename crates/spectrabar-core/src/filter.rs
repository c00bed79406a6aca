// SPDX-License-Identifier: LGPL-3.0-or-later

//! Interrupt-side sample conditioning.
//!
//! Runs once per timer tick inside the interrupt context: a one-pole
//! low pass accumulates `oversample` raw readings into one delivered
//! sample (anti-alias for the 2× tick rate), and a much slower low
//! pass tracks the DC operating point so the delivered stream is
//! centered on zero. Fixed point throughout, no allocation, no
//! blocking.

/// Analog input collaborator.
///
/// The hardware is expected to be configured already; the filter only
/// consumes completed conversions and keeps the converter busy.
pub trait AnalogSource {
    /// Kick off the next conversion. Must never be left idle between
    /// ticks.
    fn start_conversion(&mut self);

    /// Value of the last completed conversion (12-bit, right aligned).
    fn read(&mut self) -> u16;
}

/// Left shift that widens raw ADC readings to the 16-bit working scale.
pub const ADC_WIDEN_SHIFT: u32 = 4;

/// Q16 coefficient of the oversampling low pass (~20 kHz corner at an
/// 80 kHz tick rate).
const OVERSAMPLE_ALPHA_Q16: i64 = 48_030;

/// Shift of the DC-tracking low pass (~26 Hz corner at 40 kHz).
const DC_SHIFT: u32 = 8;

/// Shift applied to the band-passed difference before delivery.
const OUTPUT_SHIFT: u32 = 4;

/// Widened mid-scale seed for the DC tracker.
const DC_SEED: i32 = 2048 << ADC_WIDEN_SHIFT;

/// Oversampling + DC-removal filter state.
///
/// Owned exclusively by the interrupt context; both accumulators
/// survive across ticks and are never observed from the main loop.
#[derive(Debug, Clone)]
pub struct SampleFilter {
    oversample: u8,
    tick: u8,
    /// Fast low-pass estimate of the widened input.
    fast: i32,
    /// Slow low-pass estimate (the DC operating point).
    slow: i32,
}

impl SampleFilter {
    /// Create a filter for the given oversampling factor.
    ///
    /// # Panics
    /// Panics if `oversample` is zero.
    pub fn new(oversample: u8) -> Self {
        assert!(oversample >= 1, "oversampling factor must be >= 1");
        Self {
            oversample,
            tick: 0,
            fast: 0,
            slow: DC_SEED,
        }
    }

    /// Feed one raw reading; returns a delivered sample once per
    /// oversampling period.
    ///
    /// The multiply is widened to 64 bits so no input sequence can
    /// overflow the accumulator update.
    pub fn update(&mut self, raw: u16) -> Option<i16> {
        let x = i32::from(raw) << ADC_WIDEN_SHIFT;
        if self.oversample > 1 {
            self.fast += ((i64::from(x - self.fast) * OVERSAMPLE_ALPHA_Q16) >> 16) as i32;
        } else {
            self.fast = x;
        }

        self.tick += 1;
        if self.tick < self.oversample {
            return None;
        }
        self.tick = 0;

        self.slow += (self.fast - self.slow) >> DC_SHIFT;
        Some(((self.fast - self.slow) >> OUTPUT_SHIFT) as i16)
    }
}
