use async_trait::async_trait;

use super::{DeviceError, DeviceImpl, Frame};
use crate::models::{self, DeviceConfig};

/// A device that first encodes LED data, then pushes it out
#[async_trait]
pub trait WritingDevice: Send + Sized {
    type Config: DeviceConfig;

    fn new(config: &Self::Config) -> Result<Self, DeviceError>;

    async fn set_led_data(
        &mut self,
        config: &Self::Config,
        led_data: &[models::Color],
    ) -> Result<(), DeviceError>;

    async fn write(&mut self) -> Result<(), DeviceError>;
}

pub struct Writer<D: WritingDevice> {
    inner: D,
    config: D::Config,
}

impl<D: WritingDevice> Writer<D> {
    pub fn new(config: D::Config) -> Result<Self, DeviceError> {
        Ok(Self {
            inner: D::new(&config)?,
            config,
        })
    }
}

#[async_trait]
impl<D: WritingDevice> DeviceImpl for Writer<D> {
    async fn write(&mut self, frame: Frame) -> Result<(), DeviceError> {
        self.inner.set_led_data(&self.config, frame.leds()).await?;

        // Frame is consumed, only the encoded data remains
        drop(frame);

        self.inner.write().await
    }
}
