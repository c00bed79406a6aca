// SPDX-License-Identifier: LGPL-3.0-or-later

//! # spectrabar-core
//!
//! Real-time audio spectrum bar-graph pipeline in fixed-point
//! arithmetic, built for the split between an interrupt context and a
//! cooperative main loop:
//!
//! - **Acquisition** ([`filter`], [`pipeline::Sampler`]): per-tick
//!   oversampling low-pass and DC removal, driven from a timer
//!   interrupt through the [`filter::AnalogSource`] collaborator
//! - **Handoff** ([`exchange`]): a flag-based single-producer /
//!   single-consumer window exchange with no blocking on either side
//! - **Analysis** ([`window`], [`reducer`]): windowing, magnitude
//!   computation, and bin-to-column reduction with integrated
//!   shift-based smoothing
//! - **Output** ([`render`]): clear / draw-columns / flush handoff to
//!   a monochrome column display
//!
//! [`pipeline::SpectrumPipeline`] ties the stages together; the
//! transform itself comes from `spectrabar-dsp`.
//!
//! The acquisition and reduction stages are fixed point with no heap
//! allocation after construction; all buffers are sized once from
//! [`config::PipelineConfig`]. The transform backend converts at its
//! own seam.

pub mod config;
pub mod exchange;
pub mod filter;
pub mod pipeline;
pub mod reducer;
pub mod render;
pub mod window;

pub use config::PipelineConfig;
pub use pipeline::{PipelineError, Sampler, SpectrumPipeline};
pub use window::WindowKind;
