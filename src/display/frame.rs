use crate::{
    api::wall::Power,
    models::{Album, Color, Config, DeviceConfig, DisplaySettings},
};

use super::DisplayState;

/// One color per LED, ready to be written to the strip
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    leds: Box<[Color]>,
}

impl Frame {
    pub fn dark(led_count: usize) -> Self {
        Self::filled(led_count, Color::default())
    }

    pub fn filled(led_count: usize, color: Color) -> Self {
        Self {
            leds: vec![color; led_count].into_boxed_slice(),
        }
    }

    pub fn leds(&self) -> &[Color] {
        &self.leds
    }

    pub fn len(&self) -> usize {
        self.leds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leds.is_empty()
    }

    pub fn is_dark(&self) -> bool {
        self.leds.iter().all(|led| *led == Color::default())
    }
}

impl From<Vec<Color>> for Frame {
    fn from(leds: Vec<Color>) -> Self {
        Self {
            leds: leds.into_boxed_slice(),
        }
    }
}

/// Scale a color by `brightness`, rounding up so lit channels never go dark
pub fn scale(color: Color, brightness: u8) -> Color {
    let channel = |c: u8| ((c as u32 * brightness as u32 + 254) / 255) as u8;
    let (r, g, b) = color.into_components();
    Color::new(channel(r), channel(g), channel(b))
}

/// Turns a [DisplayState] into a [Frame]
#[derive(Debug, Clone)]
pub struct Renderer {
    led_count: usize,
    on_color: Color,
    identity_color: Color,
    albums: Vec<Album>,
}

impl Renderer {
    pub fn new(settings: &DisplaySettings, led_count: usize, albums: &[Album]) -> Self {
        Self {
            led_count,
            on_color: scale(settings.on_color, settings.brightness),
            identity_color: scale(settings.identity_color, settings.brightness),
            albums: albums.to_vec(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.display,
            config.device.hardware_led_count(),
            &config.albums,
        )
    }

    pub fn led_count(&self) -> usize {
        self.led_count
    }

    pub fn render(&self, state: &DisplayState) -> Frame {
        match (state.power(), state.identity()) {
            (Power::Off, _) => Frame::dark(self.led_count),
            (Power::On, None) => Frame::filled(self.led_count, self.on_color),
            (Power::On, Some(identity)) => {
                match self.albums.iter().find(|album| album.matches(identity)) {
                    Some(album) => (0..self.led_count)
                        .map(|i| {
                            if album.contains(i) {
                                self.identity_color
                            } else {
                                Color::default()
                            }
                        })
                        .collect::<Vec<_>>()
                        .into(),
                    None => Frame::filled(self.led_count, self.identity_color),
                }
            }
        }
    }
}
