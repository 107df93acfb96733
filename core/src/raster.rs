//! In-memory RGBA surface.
//!
//! Behaves like a 2-D canvas context closely enough for headless rendering:
//! logical coordinates are multiplied by the device scale, `resize` clears the
//! bitmap and resets the scale, and `capture`/`restore` move raw physical
//! pixels without applying the scale.

use std::convert::Infallible;

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{OriginDimensions, Point as PixelPoint, Size as PixelSize};
use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::primitives::{Circle, Line, Primitive, PrimitiveStyle, Rectangle};
use embedded_graphics::text::Text;
use embedded_graphics::{Drawable, Pixel};

use crate::geometry::{Point, Size};
use crate::snapshot::{decode_snapshot, encode_snapshot, Bitmap};
use crate::surface::{Surface, SurfaceError};

pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

pub struct Raster {
    bitmap: Bitmap,
    scale: f64,
}

impl Raster {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            bitmap: Bitmap::blank(width, height),
            scale: 1.0,
        }
    }

    /// A raster sized for `logical` at `scale`, with the scale already applied.
    pub fn with_device_scale(logical: Size, scale: f64) -> Self {
        let (width, height) = logical.scaled(scale);
        let mut raster = Self::new(width, height);
        raster.set_device_scale(scale);
        raster
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn device_scale(&self) -> f64 {
        self.scale
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.bitmap.width || y >= self.bitmap.height {
            return None;
        }
        let offset = self.offset(x, y);
        let mut rgba = [0; 4];
        rgba.copy_from_slice(&self.bitmap.pixels[offset..offset + 4]);
        Some(rgba)
    }

    pub fn is_blank(&self) -> bool {
        self.bitmap.pixels.iter().all(|byte| *byte == 0)
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.bitmap.width as usize + x as usize) * 4
    }

    fn to_device(&self, point: Point) -> PixelPoint {
        PixelPoint::new(
            (point.x * self.scale).round() as i32,
            (point.y * self.scale).round() as i32,
        )
    }

    fn device_length(&self, length: u32) -> u32 {
        ((length as f64 * self.scale).round() as u32).max(1)
    }

    /// Copies `source` onto the bitmap at the physical origin, clipped.
    /// With `skip_transparent`, fully transparent source pixels are left alone.
    fn blit(&mut self, source: &Bitmap, skip_transparent: bool) {
        let width = source.width.min(self.bitmap.width);
        let height = source.height.min(self.bitmap.height);
        for y in 0..height {
            for x in 0..width {
                let from = (y as usize * source.width as usize + x as usize) * 4;
                let pixel = &source.pixels[from..from + 4];
                if skip_transparent && pixel[3] == 0 {
                    continue;
                }
                let to = self.offset(x, y);
                self.bitmap.pixels[to..to + 4].copy_from_slice(pixel);
            }
        }
    }
}

fn parse_color(color: &str) -> Result<Rgb888, SurfaceError> {
    let parsed = csscolorparser::parse(color)
        .map_err(|err| SurfaceError::Backend(format!("color {color:?}: {err}")))?;
    let [r, g, b, _] = parsed.to_rgba8();
    Ok(Rgb888::new(r, g, b))
}

impl OriginDimensions for Raster {
    fn size(&self) -> PixelSize {
        PixelSize::new(self.bitmap.width, self.bitmap.height)
    }
}

impl DrawTarget for Raster {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(PixelPoint { x, y }, color) in pixels {
            if x < 0 || y < 0 || x >= self.bitmap.width as i32 || y >= self.bitmap.height as i32 {
                continue;
            }
            let offset = self.offset(x as u32, y as u32);
            self.bitmap.pixels[offset..offset + 4]
                .copy_from_slice(&[color.r(), color.g(), color.b(), 255]);
        }
        Ok(())
    }
}

impl Surface for Raster {
    type Capture = Bitmap;

    fn draw_line(
        &mut self,
        from: Point,
        to: Point,
        color: &str,
        width: u32,
    ) -> Result<(), SurfaceError> {
        let color = parse_color(color)?;
        let weight = self.device_length(width);
        let start = self.to_device(from);
        let end = self.to_device(to);
        Line::new(start, end)
            .into_styled(PrimitiveStyle::with_stroke(color, weight))
            .draw(self)
            .ok();
        // round joins
        for center in [start, end] {
            Circle::with_center(center, weight)
                .into_styled(PrimitiveStyle::with_fill(color))
                .draw(self)
                .ok();
        }
        Ok(())
    }

    fn fill_dot(&mut self, position: Point, size: u32, color: &str) -> Result<(), SurfaceError> {
        let color = parse_color(color)?;
        let side = self.device_length(size);
        Rectangle::new(self.to_device(position), PixelSize::new(side, side))
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(self)
            .ok();
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        position: Point,
        color: &str,
        _font: &str,
    ) -> Result<(), SurfaceError> {
        let color = parse_color(color)?;
        let style = MonoTextStyle::new(&FONT_10X20, color);
        Text::new(text, self.to_device(position), style)
            .draw(self)
            .ok();
        Ok(())
    }

    fn clear_region(&mut self, position: Point, width: f64, height: f64) {
        let clamp_x = |value: f64| value.clamp(0.0, self.bitmap.width as f64) as u32;
        let clamp_y = |value: f64| value.clamp(0.0, self.bitmap.height as f64) as u32;
        let left = clamp_x((position.x * self.scale).floor());
        let right = clamp_x(((position.x + width) * self.scale).ceil());
        let top = clamp_y((position.y * self.scale).floor());
        let bottom = clamp_y(((position.y + height) * self.scale).ceil());
        for y in top..bottom {
            for x in left..right {
                let offset = self.offset(x, y);
                self.bitmap.pixels[offset..offset + 4].copy_from_slice(&TRANSPARENT);
            }
        }
    }

    fn export_snapshot(&self) -> Result<String, SurfaceError> {
        Ok(encode_snapshot(&self.bitmap)?)
    }

    fn import_snapshot(&mut self, snapshot: &str) -> Result<(), SurfaceError> {
        let bitmap = decode_snapshot(snapshot)?;
        self.blit(&bitmap, true);
        Ok(())
    }

    fn capture(&self) -> Result<Bitmap, SurfaceError> {
        Ok(self.bitmap.clone())
    }

    fn restore(&mut self, capture: &Bitmap) -> Result<(), SurfaceError> {
        self.blit(capture, false);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.bitmap = Bitmap::blank(width, height);
        self.scale = 1.0;
    }

    fn set_device_scale(&mut self, factor: f64) {
        self.scale = factor;
    }

    fn logical_size(&self) -> Size {
        Size::new(
            self.bitmap.width as f64 / self.scale,
            self.bitmap.height as f64 / self.scale,
        )
    }
}
