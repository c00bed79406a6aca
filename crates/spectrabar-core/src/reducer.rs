// SPDX-License-Identifier: LGPL-3.0-or-later

//! Magnitude computation and bin-to-column reduction.
//!
//! Reduces the `N/2` usable spectrum bins to the display's column
//! count along a linear frequency axis: each column accumulates the
//! integer magnitudes of a contiguous run of bins, and the
//! accumulated sum is folded into the persistent column value through
//! a shift-based exponential smoother (optionally after decibel
//! compression). Smoothing happens at flush time; there is no
//! separate pass.
//!
//! Flush timing is part of the contract: the sum is flushed when the
//! mapped column index *changes*, i.e. at the first bin of each new
//! column run, into the newly entered column. Column 0 is therefore
//! never written (and never rendered); it absorbs the DC-adjacent
//! bins.

use spectrabar_dsp::fixed::{amplitude_squared, db_from_magnitude, isqrt};

/// Bin-magnitude accumulator and per-column smoothing filter.
///
/// The column array is the smoother's state: it persists across
/// frames and is only reset explicitly. Columns start at zero, giving
/// the first frame a defined smoothing baseline.
#[derive(Debug, Clone)]
pub struct ColumnReducer {
    columns: Box<[u16]>,
    /// `log2(window_len) - 1`: maps bin index to column index.
    map_shift: u32,
    filter_shift: u32,
    decibels: bool,
}

impl ColumnReducer {
    /// Create a reducer for `columns` display columns over a
    /// `window_len`-point transform.
    ///
    /// # Panics
    /// Panics if `window_len` is not a power of two >= 8 or if
    /// `columns` is not in `2..window_len / 2`.
    pub fn new(columns: usize, window_len: usize, filter_shift: u8, decibels: bool) -> Self {
        assert!(
            window_len >= 8 && window_len.is_power_of_two(),
            "window length must be a power of two >= 8, got {window_len}"
        );
        assert!(
            columns >= 2 && columns < window_len / 2,
            "column count must be in 2..{}, got {columns}",
            window_len / 2
        );
        Self {
            columns: vec![0u16; columns].into_boxed_slice(),
            map_shift: window_len.trailing_zeros() - 1,
            filter_shift: u32::from(filter_shift),
            decibels,
        }
    }

    /// Fold one transformed frame into the column array.
    ///
    /// `re`/`im` hold the full-length spectrum; only the first half
    /// carries information and is consumed here.
    pub fn reduce(&mut self, re: &[i16], im: &[i16]) {
        debug_assert_eq!(re.len(), im.len());
        let bins = re.len() / 2;
        let count = self.columns.len();

        let mut sum: u32 = 0;
        let mut previous = 0usize;
        for bin in 0..bins {
            sum += u32::from(isqrt(amplitude_squared(re[bin], im[bin])));
            let column = (bin * count) >> self.map_shift;
            if column != previous {
                self.flush(column, sum);
                previous = column;
                sum = 0;
            }
        }
        // The tail of the last column's run is discarded: that
        // column's value was already flushed at the run's first bin.
    }

    /// Exponential-smoothing update of one column.
    ///
    /// `value += (target - value) >> filter_shift`, clamped to the
    /// unsigned 16-bit column range. A shift of 0 is pass-through.
    fn flush(&mut self, column: usize, sum: u32) {
        let target = if self.decibels {
            i32::from(db_from_magnitude(sum))
        } else {
            sum.min(i32::MAX as u32) as i32
        };
        let current = i32::from(self.columns[column]);
        let next = current + ((target - current) >> self.filter_shift);
        self.columns[column] = next.clamp(0, i32::from(u16::MAX)) as u16;
    }

    /// Current column values. Index 0 is the unrendered DC column.
    pub fn columns(&self) -> &[u16] {
        &self.columns
    }

    /// Reset all columns to the zero baseline.
    pub fn reset(&mut self) {
        self.columns.fill(0);
    }
}
