// THEORY:
// The `brightest_spot` module turns a photograph into a single landmark and a
// side label. The brightest region of an eye photograph (the corneal reflection
// or a lit pupil) is a cheap proxy for where the eye sits in the frame.
//
// Key architectural principles:
// 1.  **Noise suppression first**: A single hot sensor pixel would otherwise win
//     the maximum search. A Gaussian blur with an odd kernel size averages the
//     neighbourhood so only spatially coherent brightness survives.
// 2.  **Deterministic extrema**: The maximum is searched in row-major order and
//     the first pixel reaching the peak wins. Identical input always yields the
//     same landmark.
// 3.  **Fixed decision table**: The side is a pure function of the landmark's x
//     position and the image width. The middle band is tested first; only
//     positions outside it reach the left/right split. The order of the tests
//     is part of the contract.

use crate::core_modules::eye_record::EyeSide;
use image::{DynamicImage, GrayImage};
use imageproc::filter::gaussian_blur_f32;

/// The location and value of the brightest pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrightSpot {
    pub x: u32,
    pub y: u32,
    pub intensity: u8,
}

/// Converts a decoded image to a single luminance channel.
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    image.to_luma8()
}

/// Gaussian sigma for a square kernel of `kernel_size` pixels.
pub fn sigma_for_kernel(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Blurs `image` with a Gaussian whose kernel size is `radius`.
pub fn blur(image: &GrayImage, radius: u32) -> GrayImage {
    gaussian_blur_f32(image, sigma_for_kernel(radius))
}

/// Finds the first pixel, in row-major order, holding the maximum intensity.
pub fn brightest_location(image: &GrayImage) -> Option<BrightSpot> {
    let mut best: Option<BrightSpot> = None;
    for (x, y, pixel) in image.enumerate_pixels() {
        let intensity = pixel.0[0];
        match best {
            Some(spot) if spot.intensity >= intensity => {}
            _ => best = Some(BrightSpot { x, y, intensity }),
        }
    }
    best
}

/// Maps the landmark's x position to a side, given the image width.
pub fn classify_side(x: u32, width: u32) -> EyeSide {
    let third = width / 3;
    if x > third && x < third * 2 {
        EyeSide::Upper
    } else if x >= width / 2 {
        EyeSide::Left
    } else {
        EyeSide::Right
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn single_bright_pixel(width: u32, height: u32, x: u32, y: u32) -> GrayImage {
        let mut image = GrayImage::from_pixel(width, height, Luma([10]));
        image.put_pixel(x, y, Luma([250]));
        image
    }

    #[test]
    fn classification_table() {
        // width 300: third = 100, upper bound 200, half 150
        assert_eq!(classify_side(0, 300), EyeSide::Right);
        assert_eq!(classify_side(100, 300), EyeSide::Right);
        assert_eq!(classify_side(101, 300), EyeSide::Upper);
        assert_eq!(classify_side(150, 300), EyeSide::Upper);
        assert_eq!(classify_side(199, 300), EyeSide::Upper);
        assert_eq!(classify_side(200, 300), EyeSide::Left);
        assert_eq!(classify_side(299, 300), EyeSide::Left);
    }

    #[test]
    fn band_bounds_use_integer_thirds() {
        // width 100: third = 33, upper bound 66 (not 2*100/3 = 66.67)
        assert_eq!(classify_side(33, 100), EyeSide::Right);
        assert_eq!(classify_side(34, 100), EyeSide::Upper);
        assert_eq!(classify_side(65, 100), EyeSide::Upper);
        assert_eq!(classify_side(66, 100), EyeSide::Left);
    }

    #[test]
    fn tiny_widths_never_reach_upper() {
        for x in 0..2 {
            assert_ne!(classify_side(x, 2), EyeSide::Upper);
        }
        assert_eq!(classify_side(1, 2), EyeSide::Left);
        assert_eq!(classify_side(0, 2), EyeSide::Right);
    }

    #[test]
    fn maximum_ties_break_row_major() {
        let mut image = GrayImage::from_pixel(5, 5, Luma([0]));
        image.put_pixel(3, 1, Luma([200]));
        image.put_pixel(1, 2, Luma([200]));
        image.put_pixel(0, 4, Luma([200]));
        let spot = brightest_location(&image).unwrap();
        assert_eq!((spot.x, spot.y, spot.intensity), (3, 1, 200));
    }

    #[test]
    fn uniform_image_picks_origin() {
        let image = GrayImage::from_pixel(4, 4, Luma([77]));
        let spot = brightest_location(&image).unwrap();
        assert_eq!((spot.x, spot.y), (0, 0));
    }

    #[test]
    fn empty_image_has_no_spot() {
        assert!(brightest_location(&GrayImage::new(0, 0)).is_none());
    }

    #[test]
    fn midpoint_spot_survives_small_blur() {
        let image = single_bright_pixel(90, 30, 45, 15);
        let blurred = blur(&image, 1);
        let spot = brightest_location(&blurred).unwrap();
        assert_eq!((spot.x, spot.y), (45, 15));
        assert_eq!(classify_side(spot.x, blurred.width()), EyeSide::Upper);
    }

    #[test]
    fn band_edges_after_blur() {
        // width 90: third = 30, upper bound 60
        let at_third = blur(&single_bright_pixel(90, 30, 30, 10), 1);
        let spot = brightest_location(&at_third).unwrap();
        assert_eq!(spot.x, 30);
        assert_eq!(classify_side(spot.x, 90), EyeSide::Right);

        let at_two_thirds = blur(&single_bright_pixel(90, 30, 60, 10), 1);
        let spot = brightest_location(&at_two_thirds).unwrap();
        assert_eq!(spot.x, 60);
        assert_eq!(classify_side(spot.x, 90), EyeSide::Left);
    }

    #[test]
    fn sigma_grows_with_kernel() {
        assert!((sigma_for_kernel(1) - 0.5).abs() < 1e-6);
        assert!((sigma_for_kernel(3) - 0.8).abs() < 1e-6);
        assert!(sigma_for_kernel(61) > sigma_for_kernel(3));
    }

    #[test]
    fn blur_keeps_dimensions() {
        let image = single_bright_pixel(40, 20, 5, 5);
        let blurred = blur(&image, 7);
        assert_eq!(blurred.dimensions(), (40, 20));
    }
}
