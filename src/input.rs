// src/input.rs

//! Monostable input normalization.
//!
//! Backends report input as it happens, but callers want to ask once per frame
//! "was a key pressed?" and get an answer that fires on the frame the input
//! first appears and stays quiet while it repeats. This module turns per-frame
//! raw samples into exactly that signal, with no event queue.
//!
//! Each input kind (key, click, motion) is a `Channel`. At the start of every
//! frame the channel is advanced with that frame's raw sample (`None` when
//! nothing happened). The report for the frame is:
//!
//! - `None` if the raw sample equals the previous frame's raw sample
//!   (including when both are `None`);
//! - the raw sample otherwise.
//!
//! Comparison is always against the previous *raw* sample, never against what
//! was last reported, so `[A, A, A, B, B, None, A]` reports as
//! `[A, None, None, B, None, None, A]`.

use crate::keys::KeySymbol;
use crate::scale::StandardPoint;
use log::debug;

/// One monostable input channel.
#[derive(Debug, Clone)]
pub struct Channel<T> {
    /// What callers see for the current frame.
    current: Option<T>,
    /// The previous frame's raw sample, before any forcing to `None`.
    previous: Option<T>,
    /// The last non-idle value shown to a caller.
    last_reported: Option<T>,
    /// The last non-idle raw value seen before the channel went idle.
    last_real: Option<T>,
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self {
            current: None,
            previous: None,
            last_reported: None,
            last_real: None,
        }
    }
}

impl<T: Clone + PartialEq> Channel<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the raw sample for a new frame and computes the frame's report.
    ///
    /// Must be called exactly once per frame, with `None` for frames without
    /// input, so that the comparison always sees the immediately preceding frame.
    pub fn advance(&mut self, raw: Option<T>) {
        if raw.is_none() && self.previous.is_some() {
            self.last_real = self.previous.clone();
        }

        self.current = if raw == self.previous {
            None
        } else {
            raw.clone()
        };
        if self.current.is_some() {
            self.last_reported = self.current.clone();
        }
        self.previous = raw;
    }

    /// The value for the current frame, or `None` when idle. Repeated calls
    /// within a frame return the same value.
    pub fn report(&self) -> Option<&T> {
        self.current.as_ref()
    }

    /// The raw sample this frame was computed from.
    pub fn raw(&self) -> Option<&T> {
        self.previous.as_ref()
    }

    pub fn last_reported(&self) -> Option<&T> {
        self.last_reported.as_ref()
    }

    /// The most recent non-idle raw value, updated when the channel goes idle.
    /// Kept for diagnostics; nothing in the shell reads it.
    pub fn last_real(&self) -> Option<&T> {
        self.last_real.as_ref()
    }
}

/// Raw samples gathered from one frame's backend events.
///
/// Each channel keeps only the last event of its kind in the frame. A pointer
/// sample is the `(x, y)` pair of that one event, in standard units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameSamples {
    pub key: Option<KeySymbol>,
    pub click: Option<StandardPoint>,
    pub motion: Option<StandardPoint>,
}

impl FrameSamples {
    /// Records a key press. A later press in the same frame replaces an earlier one.
    pub fn record_key(&mut self, symbol: KeySymbol) {
        self.key = Some(symbol);
    }

    pub fn record_click(&mut self, point: StandardPoint) {
        self.click = Some(point);
    }

    pub fn record_motion(&mut self, point: StandardPoint) {
        self.motion = Some(point);
    }
}

/// The three independent channels of the shell.
#[derive(Debug, Clone, Default)]
pub struct InputNormalizer {
    key: Channel<KeySymbol>,
    click: Channel<StandardPoint>,
    motion: Channel<StandardPoint>,
}

impl InputNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances all three channels with the raw samples of a new frame.
    pub fn begin_frame(&mut self, samples: FrameSamples) {
        self.key.advance(samples.key);
        self.click.advance(samples.click);
        self.motion.advance(samples.motion);

        if let Some(symbol) = self.key.report() {
            debug!("Input: key {:?} ('{}') reported", symbol, symbol.name());
        }
        if let Some(click) = self.click.report() {
            debug!("Input: click at ({}, {}) reported", click.x, click.y);
        }
        if let Some(motion) = self.motion.report() {
            debug!("Input: motion to ({}, {}) reported", motion.x, motion.y);
        }
    }

    pub fn report_key(&self) -> Option<KeySymbol> {
        self.key.report().copied()
    }

    pub fn report_click(&self) -> Option<StandardPoint> {
        self.click.report().copied()
    }

    pub fn report_motion(&self) -> Option<StandardPoint> {
        self.motion.report().copied()
    }

    pub fn last_real_key(&self) -> Option<KeySymbol> {
        self.key.last_real().copied()
    }

    pub fn last_real_click(&self) -> Option<StandardPoint> {
        self.click.last_real().copied()
    }

    pub fn last_real_motion(&self) -> Option<StandardPoint> {
        self.motion.last_real().copied()
    }
}

#[cfg(test)]
mod tests;
