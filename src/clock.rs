// src/clock.rs

//! Fixed-rate frame pacing.

use log::trace;
use std::thread;
use std::time::{Duration, Instant};

/// Blocks the calling thread so that consecutive ticks are at least one frame
/// budget apart.
#[derive(Debug, Default)]
pub struct FrameClock {
    last_tick: Option<Instant>,
    frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// The time one frame may take at `target_fps`. A rate of 0 means unpaced.
    pub fn frame_budget(target_fps: u32) -> Duration {
        if target_fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(1) / target_fps
        }
    }

    /// Sleeps until the frame budget has elapsed since the previous tick, then
    /// returns the time between the two ticks. The first tick never sleeps.
    pub fn tick(&mut self, target_fps: u32) -> Duration {
        let budget = Self::frame_budget(target_fps);
        if let Some(last) = self.last_tick {
            let elapsed = last.elapsed();
            if elapsed < budget {
                thread::sleep(budget - elapsed);
            }
        }

        let now = Instant::now();
        let delta = self
            .last_tick
            .map_or(Duration::ZERO, |last| now.duration_since(last));
        self.last_tick = Some(now);
        self.frames += 1;
        trace!("FrameClock: frame {} took {:?}", self.frames, delta);
        delta
    }

    /// Number of ticks so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn budget_divides_one_second() {
        assert_eq!(FrameClock::frame_budget(50), Duration::from_millis(20));
        assert_eq!(FrameClock::frame_budget(0), Duration::ZERO);
    }

    #[test]
    fn first_tick_does_not_wait() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(1), Duration::ZERO);
        assert_eq!(clock.frames(), 1);
    }

    #[test]
    fn second_tick_waits_for_the_budget() {
        let mut clock = FrameClock::new();
        clock.tick(100);
        let started = Instant::now();
        let delta = clock.tick(100);
        assert!(delta >= Duration::from_millis(10), "delta was {:?}", delta);
        assert!(started.elapsed() <= Duration::from_millis(500));
        assert_eq!(clock.frames(), 2);
    }
}
