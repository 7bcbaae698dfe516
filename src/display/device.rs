use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::Frame;
use crate::models::{self, DeviceConfig};

mod common;

// Device implementation modules

mod dummy;
mod ws2812spi;

#[cfg(test)]
pub(crate) mod testing;

pub use ws2812spi::{buffer_len, encode as encode_ws2812, latch_len};

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("format error: {0}")]
    FormatError(#[from] std::fmt::Error),
    #[error("write did not complete within {0:?}")]
    Timeout(Duration),
    #[error("transfer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[async_trait]
pub(crate) trait DeviceImpl: Send {
    /// Send a complete frame to the strip
    ///
    /// # Panics
    ///
    /// Implementations are allowed to panic if frame.len() != hardware_led_count. The [Device]
    /// wrapper is responsible for ensuring the frame is the right size.
    async fn write(&mut self, frame: Frame) -> Result<(), DeviceError>;
}

/// The LED strip driver
///
/// Not safe for concurrent use: the caller must serialize calls to [Device::write].
pub struct Device {
    name: String,
    inner: Box<dyn DeviceImpl>,
    led_count: usize,
    write_timeout: Duration,
    notified_inconsistent_led_data: bool,
}

impl Device {
    fn build_inner(config: models::Device) -> Result<Box<dyn DeviceImpl>, DeviceError> {
        let inner: Box<dyn DeviceImpl>;
        match config {
            models::Device::Dummy(dummy) => {
                inner = Box::new(dummy::DummyDevice::new(dummy)?);
            }
            models::Device::Ws2812Spi(ws2812spi) => {
                inner = Box::new(ws2812spi::Ws2812SpiDevice::new(ws2812spi)?);
            }
        }

        Ok(inner)
    }

    #[instrument(skip(config))]
    pub fn new(name: &str, config: models::Device) -> Result<Self, DeviceError> {
        let kind: &'static str = (&config).into();
        let led_count = config.hardware_led_count();
        let write_timeout = config.write_timeout();
        let inner = Self::build_inner(config)?;

        info!(kind, led_count, "created device");

        Ok(Self::from_impl(name, led_count, write_timeout, inner))
    }

    pub(crate) fn from_impl(
        name: &str,
        led_count: usize,
        write_timeout: Duration,
        inner: Box<dyn DeviceImpl>,
    ) -> Self {
        Self {
            name: name.to_owned(),
            inner,
            led_count,
            write_timeout,
            notified_inconsistent_led_data: false,
        }
    }

    pub fn led_count(&self) -> usize {
        self.led_count
    }

    /// Resize `frame` to the hardware LED count, truncating or padding with dark LEDs
    fn fit(&mut self, frame: Frame) -> Frame {
        let led_count = frame.len();
        let hw_led_count = self.led_count;

        if led_count == hw_led_count {
            self.notified_inconsistent_led_data = false;
            return frame;
        }

        if !self.notified_inconsistent_led_data {
            self.notified_inconsistent_led_data = true;

            if led_count > hw_led_count {
                warn!(
                    "too much LED data for device: {} extra",
                    led_count - hw_led_count
                );
            } else {
                warn!(
                    "not enough LED data for device: {} missing",
                    hw_led_count - led_count
                );
            }
        }

        let mut led_data = frame.leds().to_vec();
        led_data.resize(hw_led_count, Default::default());
        led_data.into()
    }

    /// Write a frame, failing with [DeviceError::Timeout] if the device does not complete it in
    /// time
    #[instrument(skip(frame))]
    pub async fn write(&mut self, frame: Frame) -> Result<(), DeviceError> {
        let frame = self.fit(frame);

        match tokio::time::timeout(self.write_timeout, self.inner.write(frame)).await {
            Ok(result) => result,
            Err(_) => Err(DeviceError::Timeout(self.write_timeout)),
        }
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::Recorder;
    use super::*;
    use crate::models::Color;

    fn lit(len: usize) -> Frame {
        Frame::filled(len, Color::new(1, 2, 3))
    }

    #[tokio::test]
    async fn pads_short_frames() {
        let recorder = Recorder::new();
        let mut device = recorder.device(4);

        device.write(lit(2)).await.expect("write failed");

        let frames = recorder.frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(
            frames[0].leds(),
            &[
                Color::new(1, 2, 3),
                Color::new(1, 2, 3),
                Color::default(),
                Color::default()
            ]
        );
    }

    #[tokio::test]
    async fn truncates_long_frames() {
        let recorder = Recorder::new();
        let mut device = recorder.device(4);

        device.write(lit(6)).await.expect("write failed");
        assert_eq!(recorder.frames()[0], lit(4));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_write_times_out() {
        let recorder = Recorder::new();
        recorder.set_delay(Some(Duration::from_secs(5)));
        let mut device = recorder.device(4);

        match device.write(lit(4)).await {
            Err(DeviceError::Timeout(timeout)) => assert_eq!(timeout, Recorder::WRITE_TIMEOUT),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(recorder.frames().is_empty());
    }

    #[tokio::test]
    async fn builds_from_config() {
        let mut device = Device::new("dummy", models::Dummy::default().into())
            .expect("failed to create dummy device");

        assert_eq!(device.led_count(), 30);
        device.write(Frame::dark(30)).await.expect("write failed");
    }
}
