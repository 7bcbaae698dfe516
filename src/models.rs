use std::path::Path;

use serde_derive::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

mod albums;
pub use albums::*;

mod devices;
pub use devices::*;

pub type Color = palette::rgb::LinSrgb<u8>;

fn default_false() -> bool {
    false
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorOrder {
    Rgb,
    Bgr,
    Rbg,
    Brg,
    Gbr,
    Grb,
}

impl ColorOrder {
    pub fn reorder_from_rgb(&self, color: Color) -> Color {
        let (r, g, b) = color.into_components();

        Color::from_components(match self {
            ColorOrder::Rgb => (r, g, b),
            ColorOrder::Bgr => (b, g, r),
            ColorOrder::Rbg => (r, b, g),
            ColorOrder::Brg => (b, r, g),
            ColorOrder::Gbr => (g, b, r),
            ColorOrder::Grb => (g, r, b),
        })
    }
}

impl Default for ColorOrder {
    fn default() -> Self {
        Self::Rgb
    }
}

/// Rendering parameters for the wall
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct DisplaySettings {
    /// Global brightness applied to both colors
    #[validate(range(min = 1))]
    pub brightness: u8,
    /// Color of the whole strip when turned on without an identity
    pub on_color: Color,
    /// Color used when an identity is present
    pub identity_color: Color,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            brightness: 255,
            on_color: Color::new(255, 255, 255),
            identity_color: Color::new(255, 197, 143),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct WebConfig {
    pub bind: std::net::IpAddr,
    #[validate(range(min = 1))]
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: std::net::Ipv4Addr::LOCALHOST.into(),
            port: 5000,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
    #[error("{0} renders as black at the configured brightness")]
    DarkColor(&'static str),
    #[error("album {index} ({album}) ends at LED {end} but the strip only has {led_count} LEDs")]
    AlbumOutOfRange {
        index: usize,
        album: String,
        end: u32,
        led_count: usize,
    },
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    #[validate(nested)]
    pub display: DisplaySettings,
    pub device: Device,
    #[validate(nested)]
    pub web: WebConfig,
    #[validate(nested)]
    pub albums: Vec<Album>,
}

impl Config {
    pub async fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let full = tokio::fs::read_to_string(path).await?;
        Self::from_toml(&full)
    }

    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.check()?;
        Ok(config)
    }

    /// Run field validation and check the album layout fits on the strip
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()?;
        self.device.validate()?;

        for (name, color) in [
            ("onColor", self.display.on_color),
            ("identityColor", self.display.identity_color),
        ] {
            if crate::display::scale(color, self.display.brightness) == Color::default() {
                return Err(ConfigError::DarkColor(name));
            }
        }

        let led_count = self.device.hardware_led_count();
        for (index, album) in self.albums.iter().enumerate() {
            if album.led_end_index as usize >= led_count {
                return Err(ConfigError::AlbumOutOfRange {
                    index,
                    album: album.identity().to_string(),
                    end: album.led_end_index,
                    led_count,
                });
            }
        }

        Ok(())
    }

    pub fn to_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        config.check().expect("default config should be valid");
        assert_eq!(config.device.hardware_led_count(), 30);
        assert_eq!(config.web.port, 5000);
    }

    #[test]
    fn deserialize_full_config() {
        let config = Config::from_toml(
            r#"
            [display]
            brightness = 128
            onColor = { red = 255, green = 255, blue = 255 }
            identityColor = { red = 0, green = 0, blue = 255 }

            [device]
            type = "ws2812spi"
            output = "/dev/spidev0.0"
            hardwareLedCount = 64
            colorOrder = "grb"
            invert = true

            [web]
            bind = "0.0.0.0"
            port = 8080

            [[albums]]
            artistName = "Pink Floyd"
            albumName = "The Wall"
            ledStartIndex = 0
            ledEndIndex = 7
            "#,
        )
        .expect("failed to parse config");

        assert_eq!(config.display.brightness, 128);
        assert_eq!(config.display.identity_color, Color::new(0, 0, 255));
        assert_eq!(config.device.hardware_led_count(), 64);
        assert_eq!(config.web.port, 8080);
        assert_eq!(config.albums.len(), 1);

        match config.device {
            Device::Ws2812Spi(spi) => {
                assert_eq!(spi.output, "/dev/spidev0.0");
                assert_eq!(spi.color_order, ColorOrder::Grb);
                assert!(spi.invert);
                assert_eq!(spi.rate, 3_000_000);
            }
            other => panic!("unexpected device: {:?}", other),
        }
    }

    #[test]
    fn rejects_zero_brightness() {
        let error = Config::from_toml("[display]\nbrightness = 0\n").unwrap_err();
        assert!(matches!(error, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_black_on_color() {
        let error =
            Config::from_toml("[display]\nonColor = { red = 0, green = 0, blue = 0 }\n").unwrap_err();
        assert!(matches!(error, ConfigError::DarkColor("onColor")));
    }

    #[test]
    fn rejects_unknown_device_type() {
        let error = Config::from_toml("[device]\ntype = \"hue\"\n").unwrap_err();
        assert!(matches!(error, ConfigError::Toml(_)));
    }

    #[test]
    fn rejects_album_past_strip_end() {
        let error = Config::from_toml(
            r#"
            [device]
            type = "dummy"
            hardwareLedCount = 10

            [[albums]]
            artistName = "Queen"
            albumName = "Jazz"
            ledStartIndex = 8
            ledEndIndex = 10
            "#,
        )
        .unwrap_err();

        match error {
            ConfigError::AlbumOutOfRange {
                index,
                end,
                led_count,
                ..
            } => {
                assert_eq!(index, 0);
                assert_eq!(end, 10);
                assert_eq!(led_count, 10);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn dump_round_trips() {
        let config = Config::default();
        let dumped = config.to_string().expect("failed to serialize config");
        assert_eq!(Config::from_toml(&dumped).expect("failed to reload"), config);
    }
}
