use ambassador::{delegatable_trait, Delegate};
use derive_more::From;
use serde_derive::{Deserialize, Serialize};
use strum_macros::IntoStaticStr;
use validator::Validate;

use super::{default_false, ColorOrder};

#[delegatable_trait]
pub trait DeviceConfig: Sync + Send {
    fn hardware_led_count(&self) -> usize;

    /// Maximum time a single frame write may take before it is reported as failed
    fn write_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(DEFAULT_WRITE_TIMEOUT as _)
    }
}

const DEFAULT_WRITE_TIMEOUT: u32 = 1000;
const DEFAULT_LED_COUNT: u32 = 30;

fn default_write_timeout() -> u32 {
    DEFAULT_WRITE_TIMEOUT
}

fn default_led_count() -> u32 {
    DEFAULT_LED_COUNT
}

macro_rules! impl_device_config {
    ($t:ty) => {
        impl DeviceConfig for $t {
            fn hardware_led_count(&self) -> usize {
                self.hardware_led_count as _
            }

            fn write_timeout(&self) -> std::time::Duration {
                std::time::Duration::from_millis(self.write_timeout as _)
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DummyDeviceMode {
    Text,
    Ansi,
}

impl Default for DummyDeviceMode {
    fn default() -> Self {
        Self::Text
    }
}

/// Logs every frame as lit and dark LED ranges instead of driving hardware
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Dummy {
    #[validate(range(min = 1))]
    pub hardware_led_count: u32,
    #[validate(range(min = 1))]
    pub write_timeout: u32,
    pub mode: DummyDeviceMode,
}

impl_device_config!(Dummy);

impl Default for Dummy {
    fn default() -> Self {
        Self {
            hardware_led_count: DEFAULT_LED_COUNT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            mode: Default::default(),
        }
    }
}

fn default_ws_spi_rate() -> u32 {
    3_000_000
}

/// WS2812 strip driven through a Linux spidev bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Ws2812Spi {
    #[serde(default = "Default::default")]
    pub color_order: ColorOrder,
    #[serde(default = "default_led_count")]
    #[validate(range(min = 1))]
    pub hardware_led_count: u32,
    /// Invert the output signal, for NPN transistor level shifters
    #[serde(default = "default_false")]
    pub invert: bool,
    pub output: String,
    /// SPI clock in Hz, 4 SPI bits encode one WS2812 bit
    #[serde(default = "default_ws_spi_rate")]
    #[validate(range(min = 2_400_000, max = 4_000_000))]
    pub rate: u32,
    #[serde(default = "default_write_timeout")]
    #[validate(range(min = 1))]
    pub write_timeout: u32,
}

impl_device_config!(Ws2812Spi);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, IntoStaticStr, Delegate, From)]
#[serde(rename_all = "lowercase", tag = "type", deny_unknown_fields)]
#[delegate(DeviceConfig)]
pub enum Device {
    Dummy(Dummy),
    Ws2812Spi(Ws2812Spi),
}

impl Default for Device {
    fn default() -> Self {
        Self::Dummy(Dummy::default())
    }
}

impl Validate for Device {
    fn validate(&self) -> Result<(), validator::ValidationErrors> {
        match self {
            Device::Dummy(device) => device.validate(),
            Device::Ws2812Spi(device) => device.validate(),
        }
    }
}
