//! Logs frames as runs of identical LEDs instead of driving hardware

use std::fmt::{self, Write};

use async_trait::async_trait;

use super::{common::*, DeviceError};
use crate::models::{self, Color};

pub type DummyDevice = Writer<DummyDeviceImpl>;

/// Consecutive LEDs showing the same color, `end` inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    start: usize,
    end: usize,
    color: Color,
}

impl Segment {
    fn len(&self) -> usize {
        self.end - self.start + 1
    }

    fn is_dark(&self) -> bool {
        self.color == Color::default()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={} ", self.start, self.end)?;

        if self.is_dark() {
            write!(f, "dark")
        } else {
            write!(
                f,
                "#{:02x}{:02x}{:02x}",
                self.color.red, self.color.green, self.color.blue
            )
        }
    }
}

fn segments(leds: &[Color]) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();

    for (i, led) in leds.iter().enumerate() {
        match segments.last_mut() {
            Some(last) if last.color == *led => last.end = i,
            _ => segments.push(Segment {
                start: i,
                end: i,
                color: *led,
            }),
        }
    }

    segments
}

pub struct DummyDeviceImpl {
    leds: Vec<Color>,
    mode: models::DummyDeviceMode,
    line: String,
}

impl DummyDeviceImpl {
    fn format_line(&mut self) -> Result<usize, fmt::Error> {
        let segments = segments(&self.leds);
        self.line.clear();

        match self.mode {
            models::DummyDeviceMode::Text => {
                for (i, segment) in segments.iter().enumerate() {
                    if i > 0 {
                        self.line.push_str(", ");
                    }

                    write!(self.line, "{}", segment)?;
                }
            }

            models::DummyDeviceMode::Ansi => {
                // One escape per lit run, dark LEDs as uncolored dots
                for segment in &segments {
                    if segment.is_dark() {
                        self.line
                            .extend(std::iter::repeat('·').take(segment.len()));
                    } else {
                        write!(
                            self.line,
                            "\x1B[38;2;{};{};{}m",
                            segment.color.red, segment.color.green, segment.color.blue
                        )?;
                        self.line
                            .extend(std::iter::repeat('█').take(segment.len()));
                        self.line.push_str("\x1B[0m");
                    }
                }
            }
        }

        Ok(segments
            .iter()
            .filter(|segment| !segment.is_dark())
            .map(Segment::len)
            .sum())
    }
}

#[async_trait]
impl WritingDevice for DummyDeviceImpl {
    type Config = models::Dummy;

    fn new(config: &Self::Config) -> Result<Self, DeviceError> {
        Ok(Self {
            leds: vec![Default::default(); config.hardware_led_count as _],
            mode: config.mode,
            line: String::new(),
        })
    }

    async fn set_led_data(
        &mut self,
        _config: &Self::Config,
        led_data: &[Color],
    ) -> Result<(), DeviceError> {
        self.leds.copy_from_slice(led_data);
        Ok(())
    }

    async fn write(&mut self) -> Result<(), DeviceError> {
        let lit = self.format_line()?;

        if lit == 0 {
            info!(total = self.leds.len(), "strip dark");
        } else {
            info!(lit, total = self.leds.len(), "{}", self.line);
        }

        Ok(())
    }
}
