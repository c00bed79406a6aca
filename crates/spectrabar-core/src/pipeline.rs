// SPDX-License-Identifier: LGPL-3.0-or-later

//! End-to-end pipeline assembly.
//!
//! Two halves, matching the runtime split:
//!
//! - [`Sampler`] lives in the interrupt context. Each timer tick it
//!   drains the converter, restarts it, runs the sample through the
//!   conditioning filter and pushes any delivered sample into the
//!   exchange. Nothing here blocks or allocates.
//! - [`SpectrumPipeline`] lives in the main loop. Each poll it tries
//!   to acquire a completed window; on success it runs the full
//!   window → transform → reduce → render pass and only then releases
//!   the window back to the producer, so acquisition of the next
//!   window overlaps nothing.
//!
//! A transform or render failure is fatal for the frame and is
//! propagated; there is no partial-spectrum fallback.

use spectrabar_dsp::fft::{Direction, SpectrumTransform, TransformError};
use thiserror::Error;

use crate::config::PipelineConfig;
use crate::exchange::{Consumer, Exchange, Producer};
use crate::filter::{AnalogSource, SampleFilter};
use crate::reducer::ColumnReducer;
use crate::render::{ColumnRenderer, RenderError};
use crate::window::WindowKind;

/// Fatal pipeline errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The spectrum transform backend failed.
    #[error(transparent)]
    Transform(#[from] TransformError),
    /// The display handoff failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Interrupt-side half: conditioning filter plus exchange producer.
///
/// Drive [`on_tick`](Sampler::on_tick) from the timer interrupt at
/// `sample_rate * oversample` Hz.
#[derive(Debug)]
pub struct Sampler {
    filter: SampleFilter,
    producer: Producer,
}

impl Sampler {
    /// Wrap an exchange producer with the conditioning filter.
    ///
    /// # Panics
    /// Panics if the producer's window capacity does not match the
    /// configured window length.
    pub fn new(config: &PipelineConfig, producer: Producer) -> Self {
        assert_eq!(
            producer.capacity(),
            config.window_len,
            "producer capacity must equal the window length"
        );
        Self {
            filter: SampleFilter::new(config.oversample),
            producer,
        }
    }

    /// Service one timer tick.
    ///
    /// Reads the completed conversion, immediately restarts the
    /// converter so it runs during the filter work, then feeds the
    /// filter. Delivered samples the exchange cannot take (reader
    /// overrun) are dropped silently; the filter state keeps advancing
    /// so the DC estimate stays current.
    pub fn on_tick<A: AnalogSource>(&mut self, adc: &mut A) {
        let raw = adc.read();
        adc.start_conversion();
        if let Some(sample) = self.filter.update(raw) {
            let _ = self.producer.push(sample);
        }
    }
}

/// Main-loop half: window, transform, reduce, render.
pub struct SpectrumPipeline<T, R> {
    window: WindowKind,
    imag: Box<[i16]>,
    reducer: ColumnReducer,
    transform: T,
    renderer: R,
    consumer: Consumer,
}

impl<T: SpectrumTransform, R: ColumnRenderer> SpectrumPipeline<T, R> {
    /// Build the full pipeline, returning the interrupt-side sampler
    /// and the main-loop half as a pair.
    ///
    /// # Panics
    /// Panics if the configuration is invalid or the transform size
    /// does not match the window length.
    pub fn new(config: &PipelineConfig, transform: T, renderer: R) -> (Sampler, Self) {
        config.validate();
        let (producer, consumer) = Exchange::split(config.window_len);
        (
            Sampler::new(config, producer),
            Self::from_parts(config, consumer, transform, renderer),
        )
    }

    /// Build the main-loop half over an existing exchange consumer.
    ///
    /// # Panics
    /// Panics if the configuration is invalid or the transform size
    /// does not match the consumer's window capacity.
    pub fn from_parts(
        config: &PipelineConfig,
        consumer: Consumer,
        transform: T,
        renderer: R,
    ) -> Self {
        config.validate();
        assert_eq!(
            transform.size(),
            config.window_len,
            "transform size must equal the window length"
        );
        assert_eq!(
            consumer.capacity(),
            config.window_len,
            "consumer capacity must equal the window length"
        );
        Self {
            window: config.window,
            imag: vec![0i16; config.window_len].into_boxed_slice(),
            reducer: ColumnReducer::new(
                config.columns,
                config.window_len,
                config.filter_shift,
                config.decibels,
            ),
            transform,
            renderer,
            consumer,
        }
    }

    /// Run one frame if a window is ready.
    ///
    /// Returns `Ok(false)` without touching any state when acquisition
    /// is still in progress. On `Ok(true)` a full frame was rendered
    /// and the window was handed back to the producer. The window is
    /// held for the whole pass, including the render, so a slow
    /// display simply extends the overrun period instead of corrupting
    /// the next window.
    pub fn poll_frame(&mut self) -> Result<bool, PipelineError> {
        let Some(mut samples) = self.consumer.try_acquire() else {
            return Ok(false);
        };

        self.window.apply(&mut samples);
        // Stale imaginary scratch from the previous frame would leak
        // into the spectrum.
        self.imag.fill(0);
        self.transform
            .process(&mut samples, &mut self.imag, Direction::Forward)?;
        self.reducer.reduce(&samples, &self.imag);

        self.renderer.clear();
        for (x, &height) in self.reducer.columns().iter().enumerate().skip(1) {
            self.renderer.draw_column(x, height);
        }
        self.renderer.flush()?;

        samples.mark_consumed();
        Ok(true)
    }

    /// Poll forever, spinning between frames.
    ///
    /// Returns only on a fatal error.
    pub fn run(&mut self) -> Result<(), PipelineError> {
        loop {
            if !self.poll_frame()? {
                std::hint::spin_loop();
            }
        }
    }

    /// Current smoothed column values. Index 0 is never rendered.
    pub fn columns(&self) -> &[u16] {
        self.reducer.columns()
    }

    /// The display collaborator.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mutable access to the display collaborator.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::MonoFramebuffer;
    use spectrabar_dsp::fft::RustFftTransform;

    /// Scripted converter: replays a fixed sample sequence and counts
    /// restarts.
    struct ScriptedAdc {
        samples: Vec<u16>,
        pos: usize,
        restarts: usize,
    }

    impl ScriptedAdc {
        fn new(samples: Vec<u16>) -> Self {
            Self {
                samples,
                pos: 0,
                restarts: 0,
            }
        }
    }

    impl AnalogSource for ScriptedAdc {
        fn start_conversion(&mut self) {
            self.restarts += 1;
        }

        fn read(&mut self) -> u16 {
            let s = self.samples[self.pos % self.samples.len()];
            self.pos += 1;
            s
        }
    }

    /// Transform that always fails, for error-path coverage.
    struct FailingTransform(usize);

    impl SpectrumTransform for FailingTransform {
        fn size(&self) -> usize {
            self.0
        }

        fn process(
            &mut self,
            _re: &mut [i16],
            _im: &mut [i16],
            _direction: Direction,
        ) -> Result<(), TransformError> {
            Err(TransformError::Backend("scripted failure"))
        }
    }

    fn small_config() -> PipelineConfig {
        PipelineConfig {
            window_len: 64,
            columns: 16,
            oversample: 1,
            filter_shift: 0,
            window: WindowKind::Rectangular,
            ..Default::default()
        }
    }

    #[test]
    fn test_poll_without_data_is_a_no_op() {
        let config = small_config();
        let (_sampler, mut pipeline) = SpectrumPipeline::new(
            &config,
            RustFftTransform::new(6),
            MonoFramebuffer::new(16, 48),
        );
        assert_eq!(pipeline.poll_frame(), Ok(false));
        assert_eq!(pipeline.renderer().frames_flushed(), 0);
    }

    #[test]
    fn test_tick_restarts_converter_every_time() {
        let config = small_config();
        let (mut sampler, _pipeline) = SpectrumPipeline::new(
            &config,
            RustFftTransform::new(6),
            MonoFramebuffer::new(16, 48),
        );
        let mut adc = ScriptedAdc::new(vec![2048]);
        for _ in 0..100 {
            sampler.on_tick(&mut adc);
        }
        assert_eq!(adc.restarts, 100);
    }

    #[test]
    fn test_full_window_produces_a_frame() {
        let config = small_config();
        let (mut sampler, mut pipeline) = SpectrumPipeline::new(
            &config,
            RustFftTransform::new(6),
            MonoFramebuffer::new(16, 48),
        );
        let mut adc = ScriptedAdc::new(vec![1000, 3000]);
        // Oversample 1: every tick delivers a sample.
        for _ in 0..64 {
            sampler.on_tick(&mut adc);
        }
        assert_eq!(pipeline.poll_frame(), Ok(true));
        assert_eq!(pipeline.renderer().frames_flushed(), 1);
        // Window consumed; the next poll has nothing.
        assert_eq!(pipeline.poll_frame(), Ok(false));
    }

    #[test]
    fn test_transform_failure_is_fatal() {
        let config = small_config();
        let (mut sampler, mut pipeline) = SpectrumPipeline::new(
            &config,
            FailingTransform(64),
            MonoFramebuffer::new(16, 48),
        );
        let mut adc = ScriptedAdc::new(vec![2048]);
        for _ in 0..64 {
            sampler.on_tick(&mut adc);
        }
        assert_eq!(
            pipeline.poll_frame(),
            Err(PipelineError::Transform(TransformError::Backend(
                "scripted failure"
            )))
        );
    }

    #[test]
    #[should_panic(expected = "transform size")]
    fn test_mismatched_transform_size_panics() {
        let config = small_config();
        let (_, consumer) = Exchange::split(config.window_len);
        SpectrumPipeline::from_parts(
            &config,
            consumer,
            RustFftTransform::new(7),
            MonoFramebuffer::new(16, 48),
        );
    }
}
