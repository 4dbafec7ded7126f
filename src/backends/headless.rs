// src/backends/headless.rs

//! A driver with no display. It replays queued events, records every drawing
//! command it is given, and measures text with fixed metrics. Used by the
//! test suite and anywhere a window is not wanted.

use crate::assets::ImageHandle;
use crate::backends::{BackendEvent, DrawCommand, Driver};
use anyhow::{anyhow, Result};
use log::{debug, trace};
use std::collections::VecDeque;

/// Width of one character as a fraction of the text size.
const CHAR_WIDTH_FACTOR: f64 = 0.6;

#[derive(Debug, Default)]
pub struct HeadlessDriver {
    width_px: u32,
    height_px: u32,
    title: String,
    icon: Option<ImageHandle>,
    /// One entry per future `process_events` call.
    pending: VecDeque<Vec<BackendEvent>>,
    /// Commands drawn since the last present.
    frame: Vec<DrawCommand>,
    /// Every presented frame, oldest first.
    presented: Vec<Vec<DrawCommand>>,
    ticks: Vec<u32>,
    cleaned_up: bool,
}

impl HeadlessDriver {
    pub fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            width_px,
            height_px,
            ..Self::default()
        }
    }

    /// Queues the events returned by one future `process_events` call.
    pub fn queue_frame(&mut self, events: Vec<BackendEvent>) {
        self.pending.push_back(events);
    }

    /// Appends an event to the most recently queued batch, starting one if the
    /// queue is empty.
    pub fn push_event(&mut self, event: BackendEvent) {
        match self.pending.back_mut() {
            Some(batch) => batch.push(event),
            None => self.pending.push_back(vec![event]),
        }
    }

    /// Commands drawn in the current, not yet presented, frame.
    pub fn frame_commands(&self) -> &[DrawCommand] {
        &self.frame
    }

    pub fn presented_frames(&self) -> &[Vec<DrawCommand>] {
        &self.presented
    }

    /// Every fps value `tick` was called with.
    pub fn ticks(&self) -> &[u32] {
        &self.ticks
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon(&self) -> Option<&ImageHandle> {
        self.icon.as_ref()
    }

    pub fn is_cleaned_up(&self) -> bool {
        self.cleaned_up
    }

    fn ensure_open(&self) -> Result<()> {
        if self.cleaned_up {
            Err(anyhow!("HeadlessDriver used after cleanup"))
        } else {
            Ok(())
        }
    }
}

impl Driver for HeadlessDriver {
    fn open(width_px: u32, height_px: u32, title: &str) -> Result<Self> {
        let mut driver = Self::new(width_px, height_px);
        driver.set_title(title);
        Ok(driver)
    }

    fn process_events(&mut self) -> Result<Vec<BackendEvent>> {
        self.ensure_open()?;
        Ok(self.pending.pop_front().unwrap_or_default())
    }

    fn draw(&mut self, command: DrawCommand) -> Result<()> {
        self.ensure_open()?;
        trace!("HeadlessDriver: {:?}", command);
        self.frame.push(command);
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.presented.push(std::mem::take(&mut self.frame));
        Ok(())
    }

    fn tick(&mut self, target_fps: u32) {
        self.ticks.push(target_fps);
    }

    fn measure_text(&mut self, text: &str, size_px: u32, _font: &str) -> Result<(u32, u32)> {
        let char_width = (f64::from(size_px) * CHAR_WIDTH_FACTOR).round() as u32;
        Ok((char_width * text.chars().count() as u32, size_px))
    }

    fn display_size(&self) -> (u32, u32) {
        (self.width_px, self.height_px)
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn set_icon(&mut self, icon: &ImageHandle) -> Result<()> {
        self.icon = Some(icon.clone());
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        if !self.cleaned_up {
            debug!("HeadlessDriver: cleanup");
            self.cleaned_up = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::PixelRect;
    use crate::color::Color;
    use test_log::test;

    #[test]
    fn replays_one_batch_per_call() {
        let mut driver = HeadlessDriver::new(10, 10);
        driver.queue_frame(vec![BackendEvent::MouseMove { x: 1, y: 2 }]);
        driver.queue_frame(vec![]);
        driver.push_event(BackendEvent::CloseRequested);

        assert_eq!(
            driver.process_events().unwrap(),
            vec![BackendEvent::MouseMove { x: 1, y: 2 }]
        );
        assert_eq!(driver.process_events().unwrap(), vec![BackendEvent::CloseRequested]);
        assert!(driver.process_events().unwrap().is_empty());
    }

    #[test]
    fn present_moves_the_frame_into_history() {
        let mut driver = HeadlessDriver::new(10, 10);
        let fill = DrawCommand::FillRect {
            rect: PixelRect::new(0, 0, 5, 5),
            color: Color::WHITE,
        };
        driver.draw(fill.clone()).unwrap();
        assert_eq!(driver.frame_commands(), &[fill.clone()]);
        driver.present().unwrap();
        assert!(driver.frame_commands().is_empty());
        assert_eq!(driver.presented_frames(), &[vec![fill]]);
    }

    #[test]
    fn text_metrics_are_fixed() {
        let mut driver = HeadlessDriver::new(10, 10);
        assert_eq!(driver.measure_text("abc", 20, "monospace").unwrap(), (36, 20));
        assert_eq!(driver.measure_text("", 20, "monospace").unwrap(), (0, 20));
    }

    #[test]
    fn drawing_after_cleanup_fails() {
        let mut driver = HeadlessDriver::open(10, 10, "t").unwrap();
        assert_eq!(driver.title(), "t");
        driver.cleanup().unwrap();
        driver.cleanup().unwrap();
        assert!(driver.is_cleaned_up());
        assert!(driver.present().is_err());
    }
}
