//! 8-bit CIE L*a*b* encoding.
//!
//! Channels are stored the way common vision toolkits store them in 8 bits:
//! `L8 = L*·255/100`, `a8 = a* + 128`, `b8 = b* + 128`, so colour thresholds
//! written against those toolkits carry over unchanged.

use image::{GrayImage, Rgb, RgbImage};
use palette::{FromColor, Lab, Srgb};

/// Three 8-bit planes of a LAB image.
#[derive(Debug, Clone)]
pub struct LabPlanes {
    pub l: GrayImage,
    pub a: GrayImage,
    pub b: GrayImage,
}

impl LabPlanes {
    pub fn dimensions(&self) -> (u32, u32) {
        self.l.dimensions()
    }

    /// Mean of the lightness plane on the 0..255 scale.
    pub fn mean_lightness(&self) -> f64 {
        let (width, height) = self.dimensions();
        let pixels = width as u64 * height as u64;
        if pixels == 0 {
            return 0.0;
        }
        let sum: u64 = self.l.pixels().map(|p| p.0[0] as u64).sum();
        sum as f64 / pixels as f64
    }
}

fn saturate(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

pub fn rgb_to_lab8(rgb: [u8; 3]) -> [u8; 3] {
    let srgb = Srgb::new(
        rgb[0] as f32 / 255.0,
        rgb[1] as f32 / 255.0,
        rgb[2] as f32 / 255.0,
    );
    let lab: Lab = Lab::from_color(srgb);
    [
        saturate(lab.l * 255.0 / 100.0),
        saturate(lab.a + 128.0),
        saturate(lab.b + 128.0),
    ]
}

pub fn lab8_to_rgb(lab: [u8; 3]) -> [u8; 3] {
    let lab = Lab::new(
        lab[0] as f32 * 100.0 / 255.0,
        lab[1] as f32 - 128.0,
        lab[2] as f32 - 128.0,
    );
    let srgb = Srgb::from_color(lab);
    [
        saturate(srgb.red * 255.0),
        saturate(srgb.green * 255.0),
        saturate(srgb.blue * 255.0),
    ]
}

/// Split an RGB image into 8-bit L, a and b planes.
pub fn to_lab_planes(image: &RgbImage) -> LabPlanes {
    let (width, height) = image.dimensions();
    let mut planes = LabPlanes {
        l: GrayImage::new(width, height),
        a: GrayImage::new(width, height),
        b: GrayImage::new(width, height),
    };

    for (x, y, pixel) in image.enumerate_pixels() {
        let [l, a, b] = rgb_to_lab8(pixel.0);
        planes.l.put_pixel(x, y, image::Luma([l]));
        planes.a.put_pixel(x, y, image::Luma([a]));
        planes.b.put_pixel(x, y, image::Luma([b]));
    }

    planes
}

/// Merge 8-bit L, a and b planes back into an RGB image.
pub fn from_lab_planes(planes: &LabPlanes) -> RgbImage {
    let (width, height) = planes.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        Rgb(lab8_to_rgb([
            planes.l.get_pixel(x, y).0[0],
            planes.a.get_pixel(x, y).0[0],
            planes.b.get_pixel(x, y).0[0],
        ]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_and_white_are_neutral() {
        assert_eq!(rgb_to_lab8([0, 0, 0]), [0, 128, 128]);
        let white = rgb_to_lab8([255, 255, 255]);
        assert_eq!(white[0], 255);
        assert!((white[1] as i32 - 128).abs() <= 1);
        assert!((white[2] as i32 - 128).abs() <= 1);
    }

    #[test]
    fn test_pure_red_encoding() {
        // a* ~ 80, b* ~ 67 for sRGB red
        let [_, a, b] = rgb_to_lab8([255, 0, 0]);
        assert!((206..=210).contains(&a), "a = {a}");
        assert!((193..=197).contains(&b), "b = {b}");
    }

    #[test]
    fn test_round_trip_is_close() {
        for rgb in [[200u8, 30, 40], [90, 160, 70], [250, 220, 10]] {
            let back = lab8_to_rgb(rgb_to_lab8(rgb));
            for c in 0..3 {
                assert!(
                    (back[c] as i32 - rgb[c] as i32).abs() <= 6,
                    "{rgb:?} -> {back:?}"
                );
            }
        }
    }

    #[test]
    fn test_mean_lightness() {
        let image = RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]));
        let planes = to_lab_planes(&image);
        assert!((planes.mean_lightness() - 255.0).abs() < 1e-9);
    }
}
