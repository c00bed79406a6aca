// SPDX-License-Identifier: LGPL-3.0-or-later

//! # spectrabar-dsp
//!
//! Low-level fixed-point primitives for the spectrabar spectrum
//! pipeline.
//!
//! This crate provides the numeric foundation used by
//! `spectrabar-core` to build the acquisition-to-columns pipeline:
//!
//! - **Fixed-point helpers**: integer square root, squared complex
//!   magnitude, fixed-point decibel conversion
//! - **Transform seam**: the [`fft::SpectrumTransform`] trait plus a
//!   default adapter over `rustfft`
//!
//! All hot-path arithmetic is integer-only; floating point appears
//! only inside the transform backend, behind the fixed-point
//! scaling contract documented in [`fft`].

pub mod fft;
pub mod fixed;
