//! `RgbImage` backed draw target for embedded-graphics.

use core::convert::Infallible;

use embedded_graphics::{pixelcolor::Rgb888, prelude::*};
use image::RgbImage;

use crate::layout::style::Rgb;

/// White canvas that embedded-graphics primitives and text draw into.
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, image::Rgb([255, 255, 255])),
        }
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.image.width(), self.image.height())
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = self.image.dimensions();
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let (x, y) = (point.x as u32, point.y as u32);
            if x >= width || y >= height {
                continue;
            }
            self.image
                .put_pixel(x, y, image::Rgb([color.r(), color.g(), color.b()]));
        }
        Ok(())
    }
}

pub fn to_rgb888(color: Rgb) -> Rgb888 {
    Rgb888::new(color.0, color.1, color.2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn test_out_of_bounds_pixels_are_ignored() {
        let mut canvas = Canvas::new(4, 4);
        Rectangle::new(Point::new(-2, -2), Size::new(10, 3))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::BLACK))
            .draw(&mut canvas)
            .unwrap();
        let image = canvas.into_image();
        assert_eq!(*image.get_pixel(0, 0), image::Rgb([0, 0, 0]));
        assert_eq!(*image.get_pixel(3, 0), image::Rgb([0, 0, 0]));
        assert_eq!(*image.get_pixel(0, 1), image::Rgb([255, 255, 255]));
    }

    #[test]
    fn test_color_conversion() {
        let c = to_rgb888(Rgb::NAVY);
        assert_eq!((c.r(), c.g(), c.b()), (44, 62, 80));
    }
}
