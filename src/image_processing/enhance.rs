use image::{DynamicImage, ImageBuffer, Rgba, RgbaImage};
use imageproc::filter::filter3x3;

/// Multipliers for the enhancement pipeline.
///
/// Every factor follows the same convention: 0.0 produces the degenerate
/// image (flat grey, smoothed, black), 1.0 leaves the image unchanged and
/// values above 1.0 amplify the effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnhanceFactors {
    pub contrast: f32,
    pub sharpness: f32,
    pub brightness: f32,
}

impl Default for EnhanceFactors {
    fn default() -> Self {
        Self {
            contrast: 1.0,
            sharpness: 1.0,
            brightness: 1.0,
        }
    }
}

impl EnhanceFactors {
    pub fn is_identity(&self) -> bool {
        self.contrast == 1.0 && self.sharpness == 1.0 && self.brightness == 1.0
    }
}

/// Apply contrast, then sharpness, then brightness.
///
/// The order is fixed. Alpha is carried through untouched.
pub fn enhance(img: &DynamicImage, factors: EnhanceFactors) -> DynamicImage {
    if factors.is_identity() {
        return img.clone();
    }

    let mut rgba = img.to_rgba8();
    if factors.contrast != 1.0 {
        rgba = apply_contrast(&rgba, factors.contrast);
    }
    if factors.sharpness != 1.0 {
        rgba = apply_sharpness(&rgba, factors.sharpness);
    }
    if factors.brightness != 1.0 {
        rgba = apply_brightness(&rgba, factors.brightness);
    }

    DynamicImage::ImageRgba8(rgba)
}

/// Blend towards a flat grey image at the mean luminance
pub fn apply_contrast(img: &RgbaImage, factor: f32) -> RgbaImage {
    let mean = mean_luminance(img);
    map_colour_channels(img, |c| blend(mean, c as f32, factor))
}

/// Blend towards a 3x3 smoothed copy. Border pixels have no full
/// neighbourhood and are left as they are.
pub fn apply_sharpness(img: &RgbaImage, factor: f32) -> RgbaImage {
    let (width, height) = img.dimensions();
    if width < 3 || height < 3 {
        return img.clone();
    }

    let smoothed = smooth(img);
    let mut output = img.clone();

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let src = img.get_pixel(x, y);
            let soft = smoothed.get_pixel(x, y);
            let mut px = [0u8; 4];
            for c in 0..3 {
                px[c] = blend(soft[c] as f32, src[c] as f32, factor);
            }
            px[3] = src[3];
            output.put_pixel(x, y, Rgba(px));
        }
    }

    output
}

/// Blend towards black
pub fn apply_brightness(img: &RgbaImage, factor: f32) -> RgbaImage {
    map_colour_channels(img, |c| blend(0.0, c as f32, factor))
}

/// `degenerate + factor * (value - degenerate)`, rounded and clamped to u8
fn blend(degenerate: f32, value: f32, factor: f32) -> u8 {
    (degenerate + factor * (value - degenerate))
        .round()
        .clamp(0.0, 255.0) as u8
}

fn map_colour_channels<F>(img: &RgbaImage, f: F) -> RgbaImage
where
    F: Fn(u8) -> u8,
{
    let (width, height) = img.dimensions();
    let mut output = RgbaImage::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels() {
        output.put_pixel(x, y, Rgba([f(pixel[0]), f(pixel[1]), f(pixel[2]), pixel[3]]));
    }

    output
}

/// Rounded mean of ITU-R 601 luma over all pixels
fn mean_luminance(img: &RgbaImage) -> f32 {
    let pixel_count = img.width() as u64 * img.height() as u64;
    if pixel_count == 0 {
        return 0.0;
    }

    let sum: f64 = img
        .pixels()
        .map(|p| 0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64)
        .sum();

    (sum / pixel_count as f64).round() as f32
}

/// 3x3 smoothing kernel, centre weight 5, total weight 13.
/// Border pixels are copied from the source.
fn smooth(img: &RgbaImage) -> RgbaImage {
    const KERNEL: [u32; 9] = [1, 1, 1, 1, 5, 1, 1, 1, 1];
    const WEIGHT: f32 = 13.0;

    // Integer sums so the division below can round instead of truncate
    let sums: ImageBuffer<Rgba<u32>, Vec<u32>> = filter3x3::<_, u32, u32>(img, &KERNEL);

    let (width, height) = img.dimensions();
    let mut output = img.clone();

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            let acc = sums.get_pixel(x, y);
            let alpha = img.get_pixel(x, y)[3];
            output.put_pixel(
                x,
                y,
                Rgba([
                    (acc[0] as f32 / WEIGHT).round() as u8,
                    (acc[1] as f32 / WEIGHT).round() as u8,
                    (acc[2] as f32 / WEIGHT).round() as u8,
                    alpha,
                ]),
            );
        }
    }

    output
}
