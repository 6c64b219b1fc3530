use anyhow::Result;
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};

/// Rotations that can be done by moving pixels, without resampling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuarterTurn {
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl QuarterTurn {
    /// Classify an angle. Returns `None` for angles that are not a multiple of 90°.
    pub fn from_degrees(degrees: f32) -> Option<Self> {
        let normalized = normalize_degrees(degrees);
        match normalized {
            d if d == 0.0 => Some(QuarterTurn::None),
            d if d == 90.0 => Some(QuarterTurn::Cw90),
            d if d == 180.0 => Some(QuarterTurn::Cw180),
            d if d == 270.0 => Some(QuarterTurn::Cw270),
            _ => None,
        }
    }

    pub fn apply(&self, img: &DynamicImage) -> DynamicImage {
        match self {
            QuarterTurn::None => img.clone(),
            QuarterTurn::Cw90 => img.rotate90(),
            QuarterTurn::Cw180 => img.rotate180(),
            QuarterTurn::Cw270 => img.rotate270(),
        }
    }
}

/// Map any angle into [0, 360)
pub fn normalize_degrees(degrees: f32) -> f32 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Rotate clockwise by an arbitrary angle in degrees.
///
/// The canvas grows to the bounding box of the rotated image and uncovered
/// corners are transparent. Multiples of 90° are handled losslessly.
pub fn rotate(img: &DynamicImage, degrees: f32) -> Result<DynamicImage> {
    if !degrees.is_finite() {
        return Err(anyhow::anyhow!("Rotation angle must be a finite number, got {}", degrees));
    }

    if let Some(turn) = QuarterTurn::from_degrees(degrees) {
        return Ok(turn.apply(img));
    }

    let rgba = img.to_rgba8();
    Ok(DynamicImage::ImageRgba8(rotate_free(&rgba, degrees)))
}

/// Size of the axis-aligned box holding a `width` x `height` image rotated by `degrees`
pub fn rotated_bounds(width: u32, height: u32, degrees: f32) -> (u32, u32) {
    let theta = (degrees as f64).to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
    let w = width as f64;
    let h = height as f64;

    // Trim float noise before ceil so 90.0000001° doesn't gain a pixel
    let new_w = ((w * cos + h * sin) - 1e-6).ceil().max(1.0);
    let new_h = ((w * sin + h * cos) - 1e-6).ceil().max(1.0);
    (new_w as u32, new_h as u32)
}

fn rotate_free(img: &RgbaImage, degrees: f32) -> RgbaImage {
    let (width, height) = img.dimensions();
    let (out_width, out_height) = rotated_bounds(width, height, degrees);

    // Move the source centre to the origin, rotate, then move it to the
    // centre of the enlarged canvas.
    let projection = Projection::translate(out_width as f32 / 2.0, out_height as f32 / 2.0)
        * Projection::rotate(degrees.to_radians())
        * Projection::translate(-(width as f32) / 2.0, -(height as f32) / 2.0);

    let mut output = RgbaImage::new(out_width, out_height);
    warp_into(
        img,
        &projection,
        Interpolation::Bilinear,
        Rgba([0, 0, 0, 0]),
        &mut output,
    );

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, ImageBuffer, Rgb};

    fn create_test_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        }))
    }

    #[test]
    fn test_quarter_turn_classification() {
        assert_eq!(QuarterTurn::from_degrees(0.0), Some(QuarterTurn::None));
        assert_eq!(QuarterTurn::from_degrees(360.0), Some(QuarterTurn::None));
        assert_eq!(QuarterTurn::from_degrees(90.0), Some(QuarterTurn::Cw90));
        assert_eq!(QuarterTurn::from_degrees(-90.0), Some(QuarterTurn::Cw270));
        assert_eq!(QuarterTurn::from_degrees(540.0), Some(QuarterTurn::Cw180));
        assert_eq!(QuarterTurn::from_degrees(45.0), None);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(-30.0), 330.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
        assert_eq!(normalize_degrees(0.0), 0.0);
    }

    #[test]
    fn test_rotate_90_is_lossless_and_clockwise() {
        let img = create_test_image(4, 2);
        let rotated = rotate(&img, 90.0).unwrap();
        assert_eq!(rotated.dimensions(), (2, 4));
        // top-left of the source ends up in the top-right corner
        assert_eq!(rotated.get_pixel(1, 0), img.get_pixel(0, 0));
    }

    #[test]
    fn test_rotate_zero_returns_same_pixels() {
        let img = create_test_image(5, 3);
        assert_eq!(rotate(&img, 0.0).unwrap(), img);
        assert_eq!(rotate(&img, -360.0).unwrap(), img);
    }

    #[test]
    fn test_arbitrary_rotation_expands_canvas() {
        let img = create_test_image(100, 50);
        let rotated = rotate(&img, 45.0).unwrap();
        assert_eq!(rotated.dimensions(), rotated_bounds(100, 50, 45.0));
        assert_eq!(rotated.dimensions(), (107, 107));

        // corners fall outside the source and stay transparent
        assert_eq!(rotated.get_pixel(0, 0)[3], 0);
        // centre is covered
        assert_eq!(rotated.get_pixel(53, 53)[3], 255);
    }

    #[test]
    fn test_rotated_bounds() {
        assert_eq!(rotated_bounds(100, 50, 0.0), (100, 50));
        assert_eq!(rotated_bounds(100, 50, 90.0), (50, 100));
        assert_eq!(rotated_bounds(100, 50, 180.0), (100, 50));
    }

    #[test]
    fn test_rotate_rejects_nan() {
        let img = create_test_image(2, 2);
        assert!(rotate(&img, f32::NAN).is_err());
    }
}
