// SPDX-License-Identifier: LGPL-3.0-or-later

//! Fixed-point spectrum transform seam.
//!
//! The pipeline treats the discrete Fourier transform as an external
//! collaborator with a fixed contract: in-place operation on parallel
//! real/imaginary `i16` arrays of power-of-two length, with a
//! direction flag. [`SpectrumTransform`] is that seam;
//! [`RustFftTransform`] is the default implementation, delegating to
//! `rustfft` (which already provides SIMD-optimized kernels) behind a
//! fixed-point conversion layer.
//!
//! ## Scaling contract
//!
//! The forward transform scales its output by `1/N`, matching the
//! per-stage `>> 1` convention of classic fixed-point radix-2 FFTs:
//! a bin-aligned sinusoid of amplitude `A` lands at bin magnitude
//! `~A/2`. Downstream magnitude reduction relies on this. The inverse
//! transform applies no scaling, so forward-then-inverse reproduces
//! the input.

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;
use thiserror::Error;

/// Transform direction flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Time domain to frequency domain (output scaled by `1/N`).
    Forward,
    /// Frequency domain to time domain (unscaled).
    Inverse,
}

/// Errors reported by a transform backend.
///
/// The pipeline treats any of these as fatal: there is no meaningful
/// partial-spectrum fallback.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// Buffer length does not match the size the transform was built for.
    #[error("buffer length {got} does not match transform size {expected}")]
    LengthMismatch {
        /// Size the transform was planned for.
        expected: usize,
        /// Length of the offending buffer.
        got: usize,
    },
    /// The backend failed internally.
    #[error("transform backend failed: {0}")]
    Backend(&'static str),
}

/// In-place fixed-point spectrum transform of a fixed power-of-two size.
///
/// Implementations operate on parallel real/imaginary arrays, both of
/// length [`size`](SpectrumTransform::size). For real input (imaginary
/// array zeroed by the caller) the forward output is conjugate
/// symmetric; only the first `size / 2` bins carry magnitude
/// information.
pub trait SpectrumTransform {
    /// Transform length (always a power of two).
    fn size(&self) -> usize;

    /// Run the transform in place over `re`/`im`.
    fn process(
        &mut self,
        re: &mut [i16],
        im: &mut [i16],
        direction: Direction,
    ) -> Result<(), TransformError>;
}

/// Default [`SpectrumTransform`] backed by `rustfft`.
///
/// Holds pre-planned forward/inverse FFT instances and a reusable
/// complex scratch buffer so repeated transforms perform no per-call
/// heap allocation.
///
/// # Examples
/// ```
/// use spectrabar_dsp::fft::{Direction, RustFftTransform, SpectrumTransform};
///
/// let mut fft = RustFftTransform::new(9); // 512-point
/// let mut re = [0i16; 512];
/// let mut im = [0i16; 512];
/// re[0] = 512; // impulse
/// fft.process(&mut re, &mut im, Direction::Forward).unwrap();
/// assert!(re.iter().all(|&b| b == 1)); // flat spectrum, 1/N scaled
/// ```
#[derive(Clone)]
pub struct RustFftTransform {
    n: usize,
    fwd: Arc<dyn Fft<f32>>,
    inv: Arc<dyn Fft<f32>>,
    buf: Vec<Complex<f32>>,
}

impl std::fmt::Debug for RustFftTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RustFftTransform")
            .field("n", &self.n)
            .finish_non_exhaustive()
    }
}

impl RustFftTransform {
    /// Create a transform of size `2^rank`.
    ///
    /// # Panics
    /// Panics if `rank` is outside `2..=15` (the fixed-point scaling
    /// contract needs the size to fit comfortably in 16-bit math).
    pub fn new(rank: usize) -> Self {
        assert!(
            (2..=15).contains(&rank),
            "transform rank must be in 2..=15, got {rank}"
        );
        let n = 1 << rank;
        let mut planner = FftPlanner::new();
        let fwd = planner.plan_fft_forward(n);
        let inv = planner.plan_fft_inverse(n);
        Self {
            n,
            fwd,
            inv,
            buf: vec![Complex::new(0.0, 0.0); n],
        }
    }
}

impl SpectrumTransform for RustFftTransform {
    fn size(&self) -> usize {
        self.n
    }

    fn process(
        &mut self,
        re: &mut [i16],
        im: &mut [i16],
        direction: Direction,
    ) -> Result<(), TransformError> {
        for buf in [&*re, &*im] {
            if buf.len() != self.n {
                return Err(TransformError::LengthMismatch {
                    expected: self.n,
                    got: buf.len(),
                });
            }
        }

        for (slot, (&r, &i)) in self.buf.iter_mut().zip(re.iter().zip(im.iter())) {
            *slot = Complex::new(f32::from(r), f32::from(i));
        }

        let scale = match direction {
            Direction::Forward => {
                self.fwd.process(&mut self.buf);
                1.0 / self.n as f32
            }
            Direction::Inverse => {
                self.inv.process(&mut self.buf);
                1.0
            }
        };

        for (slot, (r, i)) in self.buf.iter().zip(re.iter_mut().zip(im.iter_mut())) {
            *r = quantize(slot.re * scale);
            *i = quantize(slot.im * scale);
        }
        Ok(())
    }
}

/// Round back to the pipeline's 16-bit scale, saturating at the rails.
fn quantize(v: f32) -> i16 {
    v.round().clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16
}
