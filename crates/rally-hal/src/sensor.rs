//! The `SampleSource` trait — blocking sensor reads.

use crate::device::{Device, Shared};
use crate::HalResult;

/// A binary touch reading at or above this value counts as "pressed".
pub const TOUCH_THRESHOLD: f32 = 1.0;

/// A sensor that fills a float buffer synchronously.
///
/// `fetch_sample` blocks until a fresh reading is available; it is the main
/// suspension point of a stage thread, so implementations must return in
/// bounded time.
pub trait SampleSource: Device {
    /// Number of floats one sample occupies.
    fn sample_size(&self) -> usize;

    /// Fill `buf[offset..offset + sample_size()]` with one sample.
    fn fetch_sample(&mut self, buf: &mut [f32], offset: usize) -> HalResult<()>;

    /// Fetch one sample and return its first channel.
    fn read_scalar(&mut self) -> HalResult<f32> {
        let mut buf = vec![0.0; self.sample_size()];
        self.fetch_sample(&mut buf, 0)?;
        Ok(buf[0])
    }
}

pub type SharedSensor = Shared<dyn SampleSource>;
