//! Clockwise image rotation with canvas expansion.
//!
//! Quarter turns (any multiple of 90°) are exact pixel permutations. Every
//! other angle uses inverse mapping: for each pixel of the expanded output
//! we find the source position it came from and interpolate there.
//!
//! For a clockwise rotation by θ in y-down image coordinates the inverse
//! transform, relative to the two image centres, is:
//! ```text
//! src_x =  dx * cos(θ) + dy * sin(θ)
//! src_y = -dx * sin(θ) + dy * cos(θ)
//! ```
//! Output pixels that map outside the source are filled with the caller's
//! background colour.

use serde::{Deserialize, Serialize};

use crate::decode::DecodedImage;

use super::{check_buffer, check_output_size, TransformError};

/// Interpolation filter for rotation operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationFilter {
    /// Fast bilinear interpolation.
    #[default]
    Bilinear,
    /// High-quality Lanczos3 interpolation.
    Lanczos3,
}

/// Size of the canvas that holds an image rotated by `clockwise_degrees`.
///
/// Quarter turns keep or swap the dimensions exactly. Other angles take the
/// axis-aligned box around the rotated corners, rounded to whole pixels and
/// at least 1x1. The result depends only on the angle modulo 180°.
pub fn compute_rotated_bounds(width: u32, height: u32, clockwise_degrees: i32) -> (u32, u32) {
    let degrees = clockwise_degrees.rem_euclid(360);
    if degrees % 180 == 0 {
        return (width, height);
    }
    if degrees % 90 == 0 {
        return (height, width);
    }

    let (sin, cos) = f64::from(degrees).to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    let (w, h) = (f64::from(width), f64::from(height));
    let bound = |extent: f64| (extent.round() as u32).max(1);

    (bound(w * cos + h * sin), bound(w * sin + h * cos))
}

/// Rotate an image clockwise by a whole number of degrees.
///
/// The output canvas is expanded to fit the entire rotated image (no
/// clipping). Newly exposed area is filled with `background`.
///
/// # Errors
///
/// Returns `TransformError::TooLarge` when the expanded canvas exceeds
/// [`MAX_OUTPUT_PIXELS`](super::MAX_OUTPUT_PIXELS) and
/// `TransformError::PixelBufferMismatch` for a malformed source buffer.
pub fn apply_rotation(
    image: &DecodedImage,
    clockwise_degrees: i32,
    filter: InterpolationFilter,
    background: [u8; 3],
) -> Result<DecodedImage, TransformError> {
    let degrees = clockwise_degrees.rem_euclid(360);
    let (dst_w, dst_h) = compute_rotated_bounds(image.width, image.height, degrees);
    check_output_size(dst_w, dst_h)?;
    check_buffer(image)?;

    if degrees % 90 == 0 {
        return Ok(rotate_quarter_turns(image, (degrees / 90) as u32));
    }

    Ok(rotate_arbitrary(image, degrees, filter, background))
}

/// Rotate by `turns` clockwise quarter turns without resampling.
fn rotate_quarter_turns(image: &DecodedImage, turns: u32) -> DecodedImage {
    let (w, h) = (image.width, image.height);
    let turns = turns % 4;
    if turns == 0 {
        return image.clone();
    }

    let (dst_w, dst_h) = if turns % 2 == 1 { (h, w) } else { (w, h) };
    let mut output = vec![0u8; (dst_w as usize) * (dst_h as usize) * 3];

    for dst_y in 0..dst_h {
        for dst_x in 0..dst_w {
            let (src_x, src_y) = match turns {
                1 => (dst_y, h - 1 - dst_x),
                2 => (w - 1 - dst_x, h - 1 - dst_y),
                _ => (w - 1 - dst_y, dst_x),
            };
            let src_idx = ((src_y as usize) * (w as usize) + src_x as usize) * 3;
            let dst_idx = ((dst_y as usize) * (dst_w as usize) + dst_x as usize) * 3;
            output[dst_idx..dst_idx + 3].copy_from_slice(&image.pixels[src_idx..src_idx + 3]);
        }
    }

    DecodedImage::new(dst_w, dst_h, output)
}

/// Rotate by an arbitrary clockwise angle using inverse mapping.
fn rotate_arbitrary(
    image: &DecodedImage,
    clockwise_degrees: i32,
    filter: InterpolationFilter,
    background: [u8; 3],
) -> DecodedImage {
    let (dst_w, dst_h) = compute_rotated_bounds(image.width, image.height, clockwise_degrees);
    let (sin, cos) = f64::from(clockwise_degrees).to_radians().sin_cos();

    // Centres in continuous coordinates (pixel i spans [i, i + 1))
    let src_cx = image.width as f64 / 2.0;
    let src_cy = image.height as f64 / 2.0;
    let dst_cx = dst_w as f64 / 2.0;
    let dst_cy = dst_h as f64 / 2.0;

    let mut output = vec![0u8; (dst_w as usize) * (dst_h as usize) * 3];

    for dst_y in 0..dst_h {
        for dst_x in 0..dst_w {
            let dx = dst_x as f64 + 0.5 - dst_cx;
            let dy = dst_y as f64 + 0.5 - dst_cy;

            // Back to pixel-centre indices in the source
            let src_x = dx * cos + dy * sin + src_cx - 0.5;
            let src_y = -dx * sin + dy * cos + src_cy - 0.5;

            let pixel = match filter {
                InterpolationFilter::Bilinear => sample_bilinear(image, src_x, src_y),
                InterpolationFilter::Lanczos3 => sample_lanczos3(image, src_x, src_y),
            }
            .unwrap_or(background);

            let dst_idx = ((dst_y as usize) * (dst_w as usize) + dst_x as usize) * 3;
            output[dst_idx..dst_idx + 3].copy_from_slice(&pixel);
        }
    }

    DecodedImage::new(dst_w, dst_h, output)
}

/// Get a pixel as [f64; 3] from an image at the given coordinates.
#[inline]
fn get_pixel_f64(image: &DecodedImage, px: usize, py: usize) -> [f64; 3] {
    let idx = (py * image.width as usize + px) * 3;
    [
        image.pixels[idx] as f64,
        image.pixels[idx + 1] as f64,
        image.pixels[idx + 2] as f64,
    ]
}

/// Whether a pixel-centre coordinate falls on the source image.
#[inline]
fn covers(image: &DecodedImage, x: f64, y: f64) -> bool {
    x >= -0.5 && y >= -0.5 && x < image.width as f64 - 0.5 && y < image.height as f64 - 0.5
}

/// Sample a pixel using bilinear interpolation.
///
/// Returns `None` when the position is off the image. Positions within half
/// a pixel of the border reuse the edge pixels.
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> Option<[u8; 3]> {
    if !covers(image, x, y) {
        return None;
    }

    let max_x = image.width as usize - 1;
    let max_y = image.height as usize - 1;

    let x = x.max(0.0);
    let y = y.max(0.0);
    let x0 = (x.floor() as usize).min(max_x);
    let y0 = (y.floor() as usize).min(max_y);
    let x1 = (x0 + 1).min(max_x);
    let y1 = (y0 + 1).min(max_y);

    let fx = (x - x0 as f64).clamp(0.0, 1.0);
    let fy = (y - y0 as f64).clamp(0.0, 1.0);

    let p00 = get_pixel_f64(image, x0, y0);
    let p10 = get_pixel_f64(image, x1, y0);
    let p01 = get_pixel_f64(image, x0, y1);
    let p11 = get_pixel_f64(image, x1, y1);

    let mut result = [0u8; 3];
    for i in 0..3 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }

    Some(result)
}

/// Sample a pixel using Lanczos3 interpolation.
///
/// Lanczos3 considers a 6x6 neighborhood of pixels, providing
/// higher quality results especially for sharp edges.
fn sample_lanczos3(image: &DecodedImage, x: f64, y: f64) -> Option<[u8; 3]> {
    let (w, h) = (image.width as i64, image.height as i64);

    // Fall back to bilinear where the kernel would leave the image
    if x < 2.0 || x >= (w - 3) as f64 || y < 2.0 || y >= (h - 3) as f64 {
        return sample_bilinear(image, x, y);
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let mut sum = [0.0f64; 3];
    let mut weight_sum = 0.0;

    for ky in -2..=3 {
        for kx in -2..=3 {
            let px = x0 + kx;
            let py = y0 + ky;

            if px >= 0 && px < w && py >= 0 && py < h {
                let weight = lanczos_weight(x - px as f64, 3.0) * lanczos_weight(y - py as f64, 3.0);

                let pixel = get_pixel_f64(image, px as usize, py as usize);
                sum[0] += pixel[0] * weight;
                sum[1] += pixel[1] * weight;
                sum[2] += pixel[2] * weight;
                weight_sum += weight;
            }
        }
    }

    let mut result = [0u8; 3];
    if weight_sum > 0.0 {
        for i in 0..3 {
            result[i] = (sum[i] / weight_sum).clamp(0.0, 255.0).round() as u8;
        }
    }

    Some(result)
}

/// Lanczos kernel weight function.
///
/// ```text
/// L(x) = sinc(x) * sinc(x/a)  for |x| < a
/// L(x) = 0                     for |x| >= a
/// ```
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }

    let pi_x = std::f64::consts::PI * x;
    let pi_x_a = pi_x / a;

    (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: [u8; 3] = [0, 0, 0];

    /// Create a simple test image with a gradient pattern.
    fn test_image(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((x + y) * 8) as u8;
                pixels.push(v);
                pixels.push(v);
                pixels.push(v);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    /// A 2x1 image: red on the left, blue on the right.
    fn red_blue() -> DecodedImage {
        DecodedImage::new(2, 1, vec![255, 0, 0, 0, 0, 255])
    }

    #[test]
    fn test_zero_rotation_is_identity() {
        let img = test_image(100, 50);
        let result = apply_rotation(&img, 0, InterpolationFilter::Bilinear, BLACK).unwrap();
        assert_eq!(result, img);
    }

    #[test]
    fn test_positive_angle_is_clockwise() {
        let result = apply_rotation(&red_blue(), 90, InterpolationFilter::Bilinear, BLACK).unwrap();

        // Clockwise: the left edge ends up on top
        assert_eq!(result.dimensions(), (1, 2));
        assert_eq!(result.pixel(0, 0), Some([255, 0, 0]));
        assert_eq!(result.pixel(0, 1), Some([0, 0, 255]));
    }

    #[test]
    fn test_negative_angle_is_counter_clockwise() {
        let result = apply_rotation(&red_blue(), -90, InterpolationFilter::Bilinear, BLACK)
            .unwrap();

        assert_eq!(result.dimensions(), (1, 2));
        assert_eq!(result.pixel(0, 0), Some([0, 0, 255]));
        assert_eq!(result.pixel(0, 1), Some([255, 0, 0]));
    }

    #[test]
    fn test_90_degree_rotation_expands_to_swapped_box() {
        let img = test_image(100, 50);
        let result = apply_rotation(&img, 90, InterpolationFilter::Bilinear, BLACK).unwrap();
        assert_eq!(result.dimensions(), (50, 100));
    }

    #[test]
    fn test_180_rotation_reverses_pixels() {
        let result = apply_rotation(&red_blue(), 180, InterpolationFilter::Bilinear, BLACK)
            .unwrap();
        assert_eq!(result.pixel(0, 0), Some([0, 0, 255]));
        assert_eq!(result.pixel(1, 0), Some([255, 0, 0]));
    }

    #[test]
    fn test_quarter_turns_compose() {
        let img = test_image(7, 3);
        let once = apply_rotation(&img, 90, InterpolationFilter::Bilinear, BLACK).unwrap();
        let twice = apply_rotation(&once, 90, InterpolationFilter::Bilinear, BLACK).unwrap();
        let half = apply_rotation(&img, 180, InterpolationFilter::Bilinear, BLACK).unwrap();
        assert_eq!(twice, half);

        let three = apply_rotation(&img, 270, InterpolationFilter::Bilinear, BLACK).unwrap();
        let minus_one = apply_rotation(&img, -90, InterpolationFilter::Bilinear, BLACK).unwrap();
        assert_eq!(three, minus_one);
    }

    #[test]
    fn test_full_turns_are_identity() {
        let img = test_image(9, 4);
        for degrees in [360, 720, -360] {
            let result = apply_rotation(&img, degrees, InterpolationFilter::Bilinear, BLACK)
                .unwrap();
            assert_eq!(result, img, "degrees = {degrees}");
        }
    }

    #[test]
    fn test_arbitrary_path_matches_quarter_turn() {
        let img = test_image(6, 4);
        let exact = rotate_quarter_turns(&img, 1);
        let sampled = rotate_arbitrary(&img, 90, InterpolationFilter::Bilinear, BLACK);
        assert_eq!(sampled, exact);
    }

    #[test]
    fn test_45_degree_rotation_expands_canvas() {
        let img = test_image(100, 100);
        let result = apply_rotation(&img, 45, InterpolationFilter::Bilinear, BLACK).unwrap();

        // Diagonal of 100x100 square is ~141.4
        assert!(result.width > 140 && result.width < 143, "width was {}", result.width);
        assert!(result.height > 140 && result.height < 143, "height was {}", result.height);
    }

    #[test]
    fn test_background_fills_exposed_corners() {
        let img = DecodedImage::new(20, 20, vec![100u8; 20 * 20 * 3]);
        let fill = [12, 34, 56];
        let result = apply_rotation(&img, 45, InterpolationFilter::Bilinear, fill).unwrap();

        assert_eq!(result.pixel(0, 0), Some(fill));
        let (w, h) = result.dimensions();
        assert_eq!(result.pixel(w - 1, h - 1), Some(fill));
        // The centre is still image content
        assert_eq!(result.pixel(w / 2, h / 2), Some([100, 100, 100]));
    }

    #[test]
    fn test_bilinear_vs_lanczos_same_dimensions() {
        let img = test_image(50, 50);

        let bilinear = apply_rotation(&img, 15, InterpolationFilter::Bilinear, BLACK).unwrap();
        let lanczos = apply_rotation(&img, 15, InterpolationFilter::Lanczos3, BLACK).unwrap();

        assert_eq!(bilinear.dimensions(), lanczos.dimensions());
    }

    #[test]
    fn test_1x1_image_rotation() {
        let img = DecodedImage::new(1, 1, vec![128, 128, 128]);
        let result = apply_rotation(&img, 45, InterpolationFilter::Bilinear, BLACK).unwrap();
        assert!(result.width >= 1);
        assert!(result.height >= 1);
    }

    #[test]
    fn test_very_thin_image_rotation() {
        let img = test_image(100, 1);
        let result = apply_rotation(&img, 45, InterpolationFilter::Lanczos3, BLACK).unwrap();
        assert!(result.width > 0);
        assert!(result.height > 0);
    }

    #[test]
    fn test_lanczos_weight_at_zero() {
        let w = lanczos_weight(0.0, 3.0);
        assert!((w - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lanczos_weight_at_boundary() {
        let w = lanczos_weight(3.0, 3.0);
        assert!(w.abs() < f64::EPSILON);
    }

    #[test]
    fn test_lanczos_weight_symmetry() {
        let w1 = lanczos_weight(1.5, 3.0);
        let w2 = lanczos_weight(-1.5, 3.0);
        assert!((w1 - w2).abs() < 1e-10);
    }

    #[test]
    fn test_bounds_rotations() {
        assert_eq!(compute_rotated_bounds(100, 50, 0), (100, 50));
        assert_eq!(compute_rotated_bounds(100, 50, 90), (50, 100));
        assert_eq!(compute_rotated_bounds(100, 50, 180), (100, 50));
        assert_eq!(compute_rotated_bounds(100, 50, 270), (50, 100));
        assert_eq!(compute_rotated_bounds(100, 50, 450), (50, 100));
        assert_eq!(compute_rotated_bounds(100, 50, -90), (50, 100));
        assert_eq!(
            compute_rotated_bounds(100, 80, 30),
            compute_rotated_bounds(100, 80, -30)
        );
        assert_eq!(
            compute_rotated_bounds(100, 80, 30),
            compute_rotated_bounds(100, 80, 210)
        );
    }

    #[test]
    fn test_bounds_45_degrees() {
        // 10 * (cos 45 + sin 45) = 14.14
        assert_eq!(compute_rotated_bounds(10, 10, 45), (14, 14));
        assert_eq!(compute_rotated_bounds(1, 1, 45), (1, 1));
    }

    #[test]
    fn test_bounds_never_zero() {
        for angle in [1, 15, 45, 89, 90, 135, 179, 180, 270, 359] {
            let (w, h) = compute_rotated_bounds(10, 1, angle);
            assert!(w > 0 && h > 0, "angle {angle} gave {w}x{h}");
        }
    }

    #[test]
    fn test_oversized_canvas_is_refused_before_allocating() {
        // The buffer is never read: the canvas check comes first
        let img = DecodedImage {
            width: 12_000,
            height: 12_000,
            pixels: Vec::new(),
        };
        let result = apply_rotation(&img, 45, InterpolationFilter::Bilinear, BLACK);
        assert!(matches!(result, Err(TransformError::TooLarge { .. })));
    }

    #[test]
    fn test_malformed_buffer_is_refused() {
        let img = DecodedImage {
            width: 4,
            height: 2,
            pixels: vec![0; 5],
        };
        for degrees in [90, 180, 30] {
            assert_eq!(
                apply_rotation(&img, degrees, InterpolationFilter::Bilinear, BLACK),
                Err(TransformError::PixelBufferMismatch {
                    width: 4,
                    height: 2,
                    actual: 5
                })
            );
        }
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn create_test_image(width: u32, height: u32) -> DecodedImage {
        let pixels = (0..width * height)
            .flat_map(|i| {
                let v = (i % 256) as u8;
                [v, v, v]
            })
            .collect();
        DecodedImage::new(width, height, pixels)
    }

    proptest! {
        /// Property: output dimensions always match the rotated bounding box.
        #[test]
        fn prop_output_matches_bounds(
            width in 1u32..=40,
            height in 1u32..=40,
            degrees in -720i32..=720,
        ) {
            let img = create_test_image(width, height);
            let result = apply_rotation(&img, degrees, InterpolationFilter::Bilinear, [0, 0, 0])
                .unwrap();

            let expected = compute_rotated_bounds(width, height, degrees);
            prop_assert_eq!(result.dimensions(), expected);
            prop_assert_eq!(
                result.pixels.len(),
                (result.width * result.height * 3) as usize
            );
        }

        /// Property: quarter turns preserve the multiset of pixels.
        #[test]
        fn prop_quarter_turns_lossless(
            width in 1u32..=20,
            height in 1u32..=20,
            turns in 0i32..4,
        ) {
            let img = create_test_image(width, height);
            let result = apply_rotation(&img, turns * 90, InterpolationFilter::Lanczos3, [0, 0, 0])
                .unwrap();

            let mut before = img.pixels.clone();
            let mut after = result.pixels.clone();
            before.sort_unstable();
            after.sort_unstable();
            prop_assert_eq!(before, after);
        }

        /// Property: rotation by d and by d + 360 are the same image.
        #[test]
        fn prop_rotation_is_periodic(degrees in -360i32..=360) {
            let img = create_test_image(12, 7);
            let a = apply_rotation(&img, degrees, InterpolationFilter::Bilinear, [0, 0, 0])
                .unwrap();
            let b = apply_rotation(&img, degrees + 360, InterpolationFilter::Bilinear, [0, 0, 0])
                .unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
