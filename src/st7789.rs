//! ST7789V2 240×280 RGB565 panel over SPI, as an `embedded-graphics` target.
//!
//! The controller's RAM is 240×320; this panel shows rows 20..300 of it.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_hal::digital::{Error as _, OutputPin};
use embedded_hal::spi::{Error as _, SpiDevice};
use embassy_time::Duration;

use crate::worker::sleep;
use crate::{Error, Result};

pub const WIDTH: u16 = 240;
pub const HEIGHT: u16 = 280;
const ROW_OFFSET: u16 = 20;

const SWRESET: u8 = 0x01;
const SLPOUT: u8 = 0x11;
const NORON: u8 = 0x13;
const INVON: u8 = 0x21;
const DISPON: u8 = 0x29;
const CASET: u8 = 0x2A;
const RASET: u8 = 0x2B;
const RAMWR: u8 = 0x2C;
const MADCTL: u8 = 0x36;
const COLMOD: u8 = 0x3A;

const COLMOD_RGB565: u8 = 0x55;
const MADCTL_DEFAULT: u8 = 0x00;

// Pixels are streamed in chunks of this many bytes.
const CHUNK_BYTES: usize = 512;

pub struct St7789<SPI, DC, RST> {
    spi: SPI,
    dc: DC,
    reset: RST,
}

impl<SPI, DC, RST> St7789<SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    #[must_use]
    pub const fn new(spi: SPI, dc: DC, reset: RST) -> Self {
        Self { spi, dc, reset }
    }

    /// Give back the bus and both control lines.
    pub fn release(self) -> (SPI, DC, RST) {
        (self.spi, self.dc, self.reset)
    }

    /// Hardware reset followed by the power-up command sequence.
    ///
    /// # Errors
    ///
    /// SPI or GPIO errors.
    pub fn init(&mut self) -> Result<()> {
        self.set_reset(true)?;
        sleep(Duration::from_millis(10));
        self.set_reset(false)?;
        sleep(Duration::from_millis(10));
        self.set_reset(true)?;
        sleep(Duration::from_millis(120));

        self.command(SWRESET, &[])?;
        sleep(Duration::from_millis(150));
        self.command(SLPOUT, &[])?;
        sleep(Duration::from_millis(120));
        self.command(COLMOD, &[COLMOD_RGB565])?;
        self.command(MADCTL, &[MADCTL_DEFAULT])?;
        self.command(INVON, &[])?;
        self.command(NORON, &[])?;
        self.command(DISPON, &[])?;
        sleep(Duration::from_millis(20));
        Ok(())
    }

    /// Select the inclusive window `x0..=x1`, `y0..=y1` and start a RAM write.
    fn set_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<()> {
        let [x0_high, x0_low] = x0.to_be_bytes();
        let [x1_high, x1_low] = x1.to_be_bytes();
        let [y0_high, y0_low] = (y0 + ROW_OFFSET).to_be_bytes();
        let [y1_high, y1_low] = (y1 + ROW_OFFSET).to_be_bytes();
        self.command(CASET, &[x0_high, x0_low, x1_high, x1_low])?;
        self.command(RASET, &[y0_high, y0_low, y1_high, y1_low])?;
        self.command(RAMWR, &[])
    }

    fn write_pixels(&mut self, colors: impl IntoIterator<Item = Rgb565>) -> Result<()> {
        self.set_data_mode(true)?;
        let mut chunk = heapless::Vec::<u8, CHUNK_BYTES>::new();
        for color in colors {
            let [high, low] = color.into_storage().to_be_bytes();
            if chunk.extend_from_slice(&[high, low]).is_err() {
                self.write_spi(&chunk)?;
                chunk.clear();
                chunk
                    .extend_from_slice(&[high, low])
                    .map_err(|()| Error::DisplayWrite)?;
            }
        }
        if !chunk.is_empty() {
            self.write_spi(&chunk)?;
        }
        Ok(())
    }

    fn command(&mut self, command: u8, data: &[u8]) -> Result<()> {
        self.set_data_mode(false)?;
        self.write_spi(&[command])?;
        if !data.is_empty() {
            self.set_data_mode(true)?;
            self.write_spi(data)?;
        }
        Ok(())
    }

    fn write_spi(&mut self, bytes: &[u8]) -> Result<()> {
        self.spi.write(bytes).map_err(|err| Error::Spi(err.kind()))
    }

    fn set_data_mode(&mut self, data: bool) -> Result<()> {
        self.dc
            .set_state(data.into())
            .map_err(|err| Error::Gpio(err.kind()))
    }

    fn set_reset(&mut self, released: bool) -> Result<()> {
        self.reset
            .set_state(released.into())
            .map_err(|err| Error::Gpio(err.kind()))
    }
}

impl<SPI, DC, RST> OriginDimensions for St7789<SPI, DC, RST> {
    fn size(&self) -> Size {
        Size::new(u32::from(WIDTH), u32::from(HEIGHT))
    }
}

impl<SPI, DC, RST> DrawTarget for St7789<SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    type Color = Rgb565;
    type Error = Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<()>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u16::try_from(point.x), u16::try_from(point.y)) else {
                continue;
            };
            if x < WIDTH && y < HEIGHT {
                self.set_window(x, y, x, y)?;
                self.write_pixels([color])?;
            }
        }
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<()>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        let visible = area.intersection(&self.bounding_box());
        if visible.is_zero_sized() {
            return Ok(());
        }
        if visible != *area {
            // Partly off screen: fall back to per-pixel clipping.
            return self.draw_iter(
                area.points()
                    .zip(colors)
                    .map(|(point, color)| Pixel(point, color)),
            );
        }
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "the area lies within the 240×280 screen"
        )]
        let (x0, y0, x1, y1) = (
            area.top_left.x as u16,
            area.top_left.y as u16,
            bottom_right.x as u16,
            bottom_right.y as u16,
        );
        self.set_window(x0, y0, x1, y1)?;
        let count = area.size.width as usize * area.size.height as usize;
        self.write_pixels(colors.into_iter().take(count))
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<()> {
        let count = area.size.width as usize * area.size.height as usize;
        self.fill_contiguous(area, core::iter::repeat_n(color, count))
    }
}
