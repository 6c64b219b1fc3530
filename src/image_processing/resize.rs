use anyhow::{Context, Result};
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, RgbaImage};

/// Which dimension the user typed into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Width,
    Height,
}

/// Compute the dimension complementary to `value` along `edited` using a fixed
/// aspect ratio (height / width). Rounds to nearest, never returns zero.
pub fn complementary_dimension(value: u32, edited: Axis, aspect_ratio: f64) -> u32 {
    let other = match edited {
        Axis::Width => value as f64 * aspect_ratio,
        Axis::Height => value as f64 / aspect_ratio,
    };
    (other.round() as u32).max(1)
}

/// Largest size with the source's aspect ratio that fits inside the bounds.
/// Smaller sources are scaled up.
pub fn fit_dimensions(src_width: u32, src_height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if src_width == 0 || src_height == 0 {
        return (max_width.max(1), max_height.max(1));
    }

    let scale_w = max_width as f64 / src_width as f64;
    let scale_h = max_height as f64 / src_height as f64;
    let scale = scale_w.min(scale_h);

    let width = ((src_width as f64 * scale).round() as u32).clamp(1, max_width.max(1));
    let height = ((src_height as f64 * scale).round() as u32).clamp(1, max_height.max(1));
    (width, height)
}

/// Scale an image to fit the preview area while keeping its aspect ratio
pub fn fit_to_area(img: &DynamicImage, max_width: u32, max_height: u32) -> Result<DynamicImage> {
    let (width, height) = fit_dimensions(img.width(), img.height(), max_width, max_height);
    resize_exact(img, width, height)
}

/// Resize an image to exact dimensions using a smooth (bilinear) filter.
///
/// Returns a clone when the size is already right, so unedited images keep
/// their exact pixels.
pub fn resize_exact(img: &DynamicImage, width: u32, height: u32) -> Result<DynamicImage> {
    if img.width() == width && img.height() == height {
        return Ok(img.clone());
    }
    Ok(DynamicImage::ImageRgba8(resize_rgba(&img.to_rgba8(), width, height)?))
}

fn resize_rgba(img: &RgbaImage, width: u32, height: u32) -> Result<RgbaImage> {
    let (src_width, src_height) = img.dimensions();

    if src_width == 0 || src_height == 0 {
        return Err(anyhow::anyhow!("Source image has no pixels ({}x{})", src_width, src_height));
    }
    if width == 0 || height == 0 {
        return Err(anyhow::anyhow!("Target size must be non-zero, got {}x{}", width, height));
    }

    let src_image = Image::from_vec_u8(src_width, src_height, img.as_raw().clone(), PixelType::U8x4)
        .context("Failed to wrap source pixels for resizing")?;

    let mut dst_image = Image::new(width, height, PixelType::U8x4);

    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
    let mut resizer = Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, &options)
        .with_context(|| format!("Failed to resize {}x{} to {}x{}", src_width, src_height, width, height))?;

    RgbaImage::from_raw(width, height, dst_image.into_vec())
        .ok_or_else(|| anyhow::anyhow!("Resized buffer does not match {}x{}", width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, Rgba};

    fn create_test_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        }))
    }

    #[test]
    fn test_complementary_dimension_rounds_to_nearest() {
        // 4000x3000 -> ratio 0.75
        assert_eq!(complementary_dimension(1000, Axis::Width, 0.75), 750);
        assert_eq!(complementary_dimension(750, Axis::Height, 0.75), 1000);
        // 333 * 0.75 = 249.75
        assert_eq!(complementary_dimension(333, Axis::Width, 0.75), 250);
        // 250 / 0.75 = 333.33
        assert_eq!(complementary_dimension(250, Axis::Height, 0.75), 333);
        assert_eq!(complementary_dimension(0, Axis::Width, 0.75), 1);
    }

    #[test]
    fn test_complementary_dimension_round_trip_does_not_drift() {
        let ratio = 1080.0 / 1920.0;
        let mut width = 1280;
        for _ in 0..10 {
            let height = complementary_dimension(width, Axis::Width, ratio);
            let back = complementary_dimension(height, Axis::Height, ratio);
            let again = complementary_dimension(back, Axis::Width, ratio);
            assert_eq!(again, height);
            width = back;
        }
        assert_eq!(width, 1280);
    }

    #[test]
    fn test_fit_dimensions() {
        assert_eq!(fit_dimensions(1000, 500, 500, 400), (500, 250));
        assert_eq!(fit_dimensions(500, 1000, 500, 400), (200, 400));
        // small images are scaled up
        assert_eq!(fit_dimensions(50, 40, 500, 400), (500, 400));
    }

    #[test]
    fn test_fit_to_area() {
        let img = create_test_image(200, 100);
        let fitted = fit_to_area(&img, 50, 50).unwrap();
        assert_eq!((fitted.width(), fitted.height()), (50, 25));
    }

    #[test]
    fn test_resize_exact() {
        let img = create_test_image(100, 100);
        let resized = resize_exact(&img, 30, 60).unwrap();
        assert_eq!((resized.width(), resized.height()), (30, 60));
    }

    #[test]
    fn test_resize_same_size_keeps_pixels() {
        let img = create_test_image(8, 8);
        assert_eq!(resize_exact(&img, 8, 8).unwrap(), img);
    }

    #[test]
    fn test_resize_uniform_colour_stays_uniform() {
        let img = DynamicImage::ImageRgba8(ImageBuffer::from_pixel(10, 10, Rgba([200, 100, 50, 255])));
        let resized = resize_exact(&img, 4, 7).unwrap().to_rgba8();
        for p in resized.pixels() {
            for (got, want) in p.0.iter().zip([200u8, 100, 50, 255]) {
                assert!(got.abs_diff(want) <= 1, "{:?}", p);
            }
        }
    }

    #[test]
    fn test_resize_rejects_zero_target() {
        let img = create_test_image(4, 4);
        assert!(resize_exact(&img, 0, 4).is_err());
    }
}
