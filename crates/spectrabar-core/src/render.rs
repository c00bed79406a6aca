// SPDX-License-Identifier: LGPL-3.0-or-later

//! Column rendering handoff.
//!
//! Terminal consumer of the pipeline: once the columns for a frame
//! are final, the renderer is asked to clear, draw one bar per column
//! and flush, in that order, exactly once per acquisition cycle.
//! Drawing primitives and the display transport live behind the
//! [`ColumnRenderer`] trait; [`MonoFramebuffer`] is a concrete
//! in-memory implementation with the classic page-organized
//! monochrome layout.

use thiserror::Error;

/// Errors surfaced by the display side of the handoff.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The transport refused or failed to accept the framebuffer.
    #[error("display transport rejected the frame")]
    Transport,
}

/// Bar-graph column display collaborator.
///
/// Implementations clamp bar heights to their own vertical extent;
/// the pipeline hands over raw column magnitudes.
pub trait ColumnRenderer {
    /// Clear the target framebuffer.
    fn clear(&mut self);

    /// Draw a vertical bar of `height` pixels at column `x`.
    fn draw_column(&mut self, x: usize, height: u16);

    /// Push the framebuffer to the physical display.
    fn flush(&mut self) -> Result<(), RenderError>;
}

/// In-memory monochrome framebuffer, one bit per pixel.
///
/// Uses the page layout of PCD8544-class displays: bytes run
/// left-to-right within a row of 8-pixel-tall pages, bit `y % 8`
/// within the byte at `(y / 8) * width + x`. Total size is
/// `width * height / 8` bytes, the unit the display transport
/// consumes whole.
#[derive(Debug, Clone)]
pub struct MonoFramebuffer {
    width: usize,
    height: usize,
    buf: Box<[u8]>,
    frames: u64,
}

impl MonoFramebuffer {
    /// Create an all-clear framebuffer.
    ///
    /// # Panics
    /// Panics if `height` is not a positive multiple of 8 or `width`
    /// is zero.
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0, "framebuffer width must be nonzero");
        assert!(
            height > 0 && height % 8 == 0,
            "framebuffer height must be a positive multiple of 8, got {height}"
        );
        Self {
            width,
            height,
            buf: vec![0u8; width * height / 8].into_boxed_slice(),
            frames: 0,
        }
    }

    /// Framebuffer width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Framebuffer height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw framebuffer bytes, `width * height / 8` of them.
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Number of completed flushes.
    pub fn frames_flushed(&self) -> u64 {
        self.frames
    }

    /// Whether the pixel at `(x, y)` is set. `y == 0` is the top row.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        debug_assert!(x < self.width && y < self.height);
        self.buf[(y / 8) * self.width + x] & (1 << (y % 8)) != 0
    }

    fn set_pixel(&mut self, x: usize, y: usize) {
        self.buf[(y / 8) * self.width + x] |= 1 << (y % 8);
    }
}

impl ColumnRenderer for MonoFramebuffer {
    fn clear(&mut self) {
        self.buf.fill(0);
    }

    fn draw_column(&mut self, x: usize, height: u16) {
        if x >= self.width {
            return;
        }
        let h = usize::from(height).min(self.height);
        for y in self.height - h..self.height {
            self.set_pixel(x, y);
        }
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        self.frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_size_matches_geometry() {
        let fb = MonoFramebuffer::new(84, 48);
        assert_eq!(fb.bytes().len(), 84 * 48 / 8);
    }

    #[test]
    fn test_column_grows_from_bottom() {
        let mut fb = MonoFramebuffer::new(84, 48);
        fb.draw_column(10, 5);
        for y in 43..48 {
            assert!(fb.pixel(10, y), "row {y} must be set");
        }
        for y in 0..43 {
            assert!(!fb.pixel(10, y), "row {y} must stay clear");
        }
        assert!(!fb.pixel(9, 47));
    }

    #[test]
    fn test_height_is_clamped_by_renderer() {
        let mut fb = MonoFramebuffer::new(84, 48);
        fb.draw_column(0, u16::MAX);
        for y in 0..48 {
            assert!(fb.pixel(0, y));
        }
    }

    #[test]
    fn test_out_of_range_column_is_ignored() {
        let mut fb = MonoFramebuffer::new(84, 48);
        fb.draw_column(84, 10);
        assert!(fb.bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_clear_and_flush() {
        let mut fb = MonoFramebuffer::new(84, 48);
        fb.draw_column(3, 48);
        fb.clear();
        assert!(fb.bytes().iter().all(|&b| b == 0));
        fb.flush().unwrap();
        fb.flush().unwrap();
        assert_eq!(fb.frames_flushed(), 2);
    }
}
