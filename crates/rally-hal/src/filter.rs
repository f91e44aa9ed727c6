//! `MeanFilter` — windowed mean over a shared sample source.
//!
//! Line-code stages compare the instantaneous color reading against a
//! recent mean to detect light/dark edges without chasing sensor noise.
//! The filter wraps a *shared* sensor handle so the same physical sensor
//! can also be read raw by whoever owns the other clone.

use std::collections::VecDeque;

use crate::device::lock;
use crate::sensor::{SampleSource, SharedSensor};
use crate::HalResult;

/// Running mean of the last `window` scalar readings.
pub struct MeanFilter {
    source:  SharedSensor,
    window:  usize,
    history: VecDeque<f32>,
}

impl MeanFilter {
    /// `window` is clamped to at least 1.
    pub fn new(source: SharedSensor, window: usize) -> Self {
        let window = window.max(1);
        Self {
            source,
            window,
            history: VecDeque::with_capacity(window),
        }
    }

    /// Fetch one reading from the source and return the updated mean.
    pub fn fetch(&mut self) -> HalResult<f32> {
        let value = lock(&self.source).read_scalar()?;
        if self.history.len() == self.window {
            self.history.pop_front();
        }
        self.history.push_back(value);
        let sum: f32 = self.history.iter().sum();
        Ok(sum / self.history.len() as f32)
    }

    /// The most recent raw reading, if any sample has been fetched.
    pub fn last_raw(&self) -> Option<f32> {
        self.history.back().copied()
    }
}
