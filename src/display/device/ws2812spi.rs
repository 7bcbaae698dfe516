use std::io;

use async_trait::async_trait;
use spidev::{SpiModeFlags, Spidev, SpidevOptions, SpidevTransfer};
use tokio::task::JoinHandle;

use super::{common::*, DeviceError};
use crate::models::{self, ColorOrder};

pub type Ws2812SpiDevice = Writer<Ws2812SpiImpl>;

pub struct Ws2812SpiImpl {
    config: models::Ws2812Spi,
    dev: ImplState,
    buf: Vec<u8>,
}

// Each WS2812 bit is sent as 4 SPI bits, a short (0) or long (1) high pulse. At the default 3MHz
// rate a bit lasts 1.33us.
const SPI_BYTES_PER_COLOUR: usize = 4;
const SPI_BYTES_PER_LED: usize = 3 * SPI_BYTES_PER_COLOUR;
// Low time after the last LED so the strip latches the frame. WS2812B needs at least 280us.
const LATCH_MICROS: u64 = 300;
const BITPAIR_TO_BYTE: [u8; 4] = [0b10001000, 0b10001100, 0b11001000, 0b11001100];

/// Number of zero bytes that hold the line low for the latch period at `rate` Hz
pub fn latch_len(rate: u32) -> usize {
    // bytes = rate * us / 8e6, rounded up
    let scaled = rate as u64 * LATCH_MICROS;
    ((scaled + 8_000_000 - 1) / 8_000_000) as usize
}

/// Size of the SPI buffer needed for `led_count` LEDs clocked at `rate` Hz
pub fn buffer_len(led_count: usize, rate: u32) -> usize {
    led_count * SPI_BYTES_PER_LED + latch_len(rate)
}

/// Encode LED data into the SPI bit stream for a WS2812 strip
///
/// `buf` must be at least [buffer_len] bytes long. Bytes after the LED data are cleared to form
/// the latch period.
pub fn encode(led_data: &[models::Color], color_order: ColorOrder, invert: bool, buf: &mut [u8]) {
    let mut ptr = 0;
    for led in led_data {
        let (r, g, b) = color_order.reorder_from_rgb(*led).into_components();
        let mut color_bits = ((r as u32) << 16) | ((g as u32) << 8) | (b as u32);

        for j in (0..SPI_BYTES_PER_LED).rev() {
            buf[ptr + j] = BITPAIR_TO_BYTE[(color_bits & 0x3) as usize];
            color_bits >>= 2;
        }

        ptr += SPI_BYTES_PER_LED;
    }

    for dst in buf.iter_mut().skip(ptr) {
        *dst = 0;
    }

    if invert {
        for byte in buf.iter_mut() {
            *byte = !*byte;
        }
    }
}

enum ImplState {
    Closed,
    Ready(Spidev),
    /// A transfer running on the blocking pool. Kept here so a write that timed out still owns
    /// the bus until the transfer is over.
    ///
    /// A transfer whose write timed out is not aborted and may still reach the strip, showing a
    /// frame the controller did not commit. The next write joins it and sends the current frame.
    InFlight(JoinHandle<(Spidev, io::Result<()>)>),
}

impl ImplState {
    /// Wait for the current transfer, if any
    ///
    /// Safe to cancel: the transfer stays tracked until it is joined.
    async fn join(&mut self) -> Result<(), DeviceError> {
        if let ImplState::InFlight(handle) = self {
            let joined = handle.await;

            match joined {
                Ok((dev, Ok(()))) => {
                    *self = ImplState::Ready(dev);
                }
                Ok((_, Err(error))) => {
                    // Reopen on next write, the device may have gone away
                    *self = ImplState::Closed;
                    return Err(error.into());
                }
                Err(error) => {
                    *self = ImplState::Closed;
                    return Err(error.into());
                }
            }
        }

        Ok(())
    }
}

impl Ws2812SpiImpl {
    fn open(config: &models::Ws2812Spi) -> Result<Spidev, DeviceError> {
        let mut dev = Spidev::open(&config.output)?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(config.rate)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        dev.configure(&options)?;

        info!(path = %config.output, rate = config.rate, "initialized SPI device");

        Ok(dev)
    }
}

#[async_trait]
impl WritingDevice for Ws2812SpiImpl {
    type Config = models::Ws2812Spi;

    fn new(config: &models::Ws2812Spi) -> Result<Self, DeviceError> {
        // Try to open the device early
        let dev = match Self::open(config) {
            Ok(dev) => ImplState::Ready(dev),
            Err(error) => {
                warn!(%error, path = %config.output, "failed to initialize SPI device, will try again later");
                ImplState::Closed
            }
        };

        Ok(Self {
            config: config.clone(),
            dev,
            buf: vec![0; buffer_len(config.hardware_led_count as usize, config.rate)],
        })
    }

    async fn set_led_data(
        &mut self,
        config: &Self::Config,
        led_data: &[models::Color],
    ) -> Result<(), DeviceError> {
        encode(led_data, config.color_order, config.invert, &mut self.buf);
        Ok(())
    }

    async fn write(&mut self) -> Result<(), DeviceError> {
        // A previous write may have timed out while its transfer was still running
        if let Err(error) = self.dev.join().await {
            warn!(%error, "previous SPI transfer failed");
        }

        let dev = match std::mem::replace(&mut self.dev, ImplState::Closed) {
            ImplState::Ready(dev) => dev,
            _ => Self::open(&self.config)?,
        };

        // The whole frame goes out in one transfer so the bit timing is never interrupted
        let buf = self.buf.clone();
        self.dev = ImplState::InFlight(tokio::task::spawn_blocking(move || {
            let result = {
                let mut transfer = SpidevTransfer::write(&buf);
                dev.transfer(&mut transfer)
            };

            (dev, result)
        }));

        self.dev.join().await
    }
}
