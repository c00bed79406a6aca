// SPDX-License-Identifier: LGPL-3.0-or-later

//! Flag-based sample window exchange.
//!
//! Single-producer/single-consumer handoff of one fixed-length sample
//! window between the interrupt context (writer) and the main loop
//! (reader). The readiness flag is the sole coordination primitive:
//! it is an ownership token, not a lock. While the flag is clear the
//! producer owns the window and appends samples; when the window
//! fills, the flag is set (Release) and the producer stops touching
//! the window — further samples are dropped, the accepted degradation
//! policy of a reader slower than acquisition. The consumer observes
//! the flag (Acquire), owns the window for one full pipeline pass,
//! and clears it (Release) when done, returning ownership.
//!
//! Neither side ever blocks; in particular nothing here may be
//! awaited or locked from interrupt context.

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct Shared {
    /// The single-bit ownership token ("window is full and unread").
    ready: AtomicBool,
    /// The sample window. Accessed mutably by exactly one side at a
    /// time, as arbitrated by `ready`.
    window: UnsafeCell<Box<[i16]>>,
}

// Safety: `window` is only ever accessed by the side that currently
// holds ownership per the `ready` protocol above. The producer writes
// only while `ready` is false; the consumer reads/writes only between
// observing `ready == true` (Acquire) and clearing it (Release), and
// `Consumer::try_acquire` borrows the consumer mutably so at most one
// `WindowGuard` exists at a time.
unsafe impl Sync for Shared {}

/// Constructor for a producer/consumer pair over one shared window.
pub struct Exchange;

impl Exchange {
    /// Create an exchange for windows of `capacity` samples.
    ///
    /// # Panics
    /// Panics if `capacity` is not a power of two >= 8.
    pub fn split(capacity: usize) -> (Producer, Consumer) {
        assert!(
            capacity >= 8 && capacity.is_power_of_two(),
            "window capacity must be a power of two >= 8, got {capacity}"
        );
        let shared = Arc::new(Shared {
            ready: AtomicBool::new(false),
            window: UnsafeCell::new(vec![0i16; capacity].into_boxed_slice()),
        });
        (
            Producer {
                shared: Arc::clone(&shared),
                pos: 0,
                capacity,
            },
            Consumer { shared, capacity },
        )
    }
}

/// Interrupt-side handle: appends samples until the window is full.
#[derive(Debug)]
pub struct Producer {
    shared: Arc<Shared>,
    pos: usize,
    capacity: usize,
}

impl Producer {
    /// Whether the window is currently full and unread (pushes are
    /// being dropped).
    pub fn is_full(&self) -> bool {
        self.shared.ready.load(Ordering::Acquire)
    }

    /// Window capacity in samples.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append one sample. Returns `false` (sample dropped) while the
    /// consumer has not yet released the previous window.
    ///
    /// On reaching capacity the write index resets and the readiness
    /// flag is published; the producer does not touch the window again
    /// until the flag clears.
    pub fn push(&mut self, sample: i16) -> bool {
        if self.is_full() {
            return false;
        }
        // Safety: `ready` is false, so the producer owns the window.
        let window = unsafe { &mut *self.shared.window.get() };
        window[self.pos] = sample;
        self.pos += 1;
        if self.pos == window.len() {
            self.pos = 0;
            self.shared.ready.store(true, Ordering::Release);
        }
        true
    }
}

/// Main-loop-side handle: takes ownership of each completed window.
pub struct Consumer {
    shared: Arc<Shared>,
    capacity: usize,
}

impl Consumer {
    /// Take ownership of the window if it is full and unread.
    ///
    /// Never blocks; returns `None` while acquisition is still in
    /// progress. The returned guard holds exclusive access until it
    /// is dropped (or [`WindowGuard::mark_consumed`] is called),
    /// whereupon ownership reverts to the producer.
    pub fn try_acquire(&mut self) -> Option<WindowGuard<'_>> {
        if !self.shared.ready.load(Ordering::Acquire) {
            return None;
        }
        Some(WindowGuard {
            shared: &self.shared,
        })
    }

    /// Window capacity in samples.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Exclusive access to one completed sample window.
///
/// Dereferences to the sample slice; the pipeline overwrites it in
/// place (windowing, transform). Dropping the guard clears the
/// readiness flag and hands the window back to the producer.
pub struct WindowGuard<'a> {
    shared: &'a Shared,
}

impl WindowGuard<'_> {
    /// Explicitly release the window back to the producer.
    pub fn mark_consumed(self) {}
}

impl Deref for WindowGuard<'_> {
    type Target = [i16];

    fn deref(&self) -> &[i16] {
        // Safety: the guard holds consumer-side ownership.
        unsafe { &*self.shared.window.get() }
    }
}

impl DerefMut for WindowGuard<'_> {
    fn deref_mut(&mut self) -> &mut [i16] {
        // Safety: the guard holds consumer-side ownership.
        unsafe { &mut *self.shared.window.get() }
    }
}

impl Drop for WindowGuard<'_> {
    fn drop(&mut self) {
        self.shared.ready.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_take_refill_cycle() {
        let (mut producer, mut consumer) = Exchange::split(8);
        assert!(consumer.try_acquire().is_none());

        for i in 0..8 {
            assert!(producer.push(i));
        }
        {
            let window = consumer.try_acquire().expect("window must be ready");
            assert_eq!(&window[..], &[0, 1, 2, 3, 4, 5, 6, 7]);
        }
        // Ownership is back with the producer; a second fill works.
        for i in 0..8 {
            assert!(producer.push(10 + i));
        }
        let window = consumer.try_acquire().unwrap();
        assert_eq!(window[0], 10);
    }

    #[test]
    fn test_overrun_drops_without_overwriting() {
        let (mut producer, mut consumer) = Exchange::split(8);
        for _ in 0..8 {
            assert!(producer.push(1));
        }
        // Reader is slow: a second window's worth arrives and must be
        // dropped wholesale, not written over the unread data.
        for _ in 0..8 {
            assert!(!producer.push(9));
            assert!(producer.is_full());
        }
        let window = consumer.try_acquire().unwrap();
        assert!(window.iter().all(|&s| s == 1));
    }

    #[test]
    fn test_write_index_resets_after_consume() {
        let (mut producer, mut consumer) = Exchange::split(8);
        for _ in 0..8 {
            producer.push(1);
        }
        producer.push(9); // dropped
        consumer.try_acquire().unwrap().mark_consumed();

        // The next accepted sample starts a fresh window at index 0.
        producer.push(42);
        for _ in 0..7 {
            producer.push(0);
        }
        let window = consumer.try_acquire().unwrap();
        assert_eq!(window[0], 42);
    }

    #[test]
    fn test_guard_mutation_is_visible_before_release_only() {
        let (mut producer, mut consumer) = Exchange::split(8);
        for i in 0..8 {
            producer.push(i);
        }
        let mut window = consumer.try_acquire().unwrap();
        window[0] = -5;
        assert_eq!(window[0], -5);
        drop(window);
        // Producer owns a zeroed write index again, not stale data.
        assert!(!producer.is_full());
    }

    #[test]
    #[should_panic(expected = "window capacity")]
    fn test_non_power_of_two_capacity_panics() {
        Exchange::split(100);
    }
}
