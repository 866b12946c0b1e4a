use ndarray::{Array2, ArrayView2};

/// Replace NaN and infinite pixels with zero.
pub fn zero_non_finite(image: ArrayView2<'_, f32>) -> Array2<f32> {
    image.mapv(|v| if v.is_finite() { v } else { 0.0 })
}

/// Rotate an image by `angle_deg` about its centre, keeping its shape.
///
/// Positive angles turn the image counter-clockwise when row 0 is drawn at
/// the top (clockwise with row 0 at the bottom, as sky images are shown).
/// Rotating a sky image by `PA - 90` lays a disk major axis with position
/// angle `PA` along the rows. Pixels that map outside the input are zero.
pub fn rotate_image(image: ArrayView2<'_, f32>, angle_deg: f64) -> Array2<f32> {
    let (h, w) = image.dim();
    let (sin_a, cos_a) = angle_deg.to_radians().sin_cos();
    let cy = (h as f64 - 1.0) / 2.0;
    let cx = (w as f64 - 1.0) / 2.0;

    let mut out = Array2::<f32>::zeros((h, w));
    for row in 0..h {
        let dy = row as f64 - cy;
        for col in 0..w {
            let dx = col as f64 - cx;
            // Inverse mapping: output pixel back into the input frame.
            let src_x = dx * cos_a - dy * sin_a + cx;
            let src_y = dx * sin_a + dy * cos_a + cy;
            out[[row, col]] = bilinear_sample(image, src_y, src_x);
        }
    }
    out
}

/// Bilinear sample at fractional (y, x); samples outside the image read as zero.
pub fn bilinear_sample(data: ArrayView2<'_, f32>, y: f64, x: f64) -> f32 {
    let (h, w) = data.dim();

    // Snap coordinates that are integral up to rounding noise, so right-angle
    // rotations reproduce pixels exactly.
    let snap = |v: f64| {
        let r = v.round();
        if (v - r).abs() < 1e-9 {
            r
        } else {
            v
        }
    };
    let x = snap(x);
    let y = snap(y);

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let x1 = x0 + 1;
    let y1 = y0 + 1;

    let fx = (x - x0 as f64) as f32;
    let fy = (y - y0 as f64) as f32;

    let sample = |r: i64, c: i64| -> f32 {
        if r >= 0 && r < h as i64 && c >= 0 && c < w as i64 {
            data[[r as usize, c as usize]]
        } else {
            0.0
        }
    };

    let v00 = sample(y0, x0);
    let v10 = sample(y0, x1);
    let v01 = sample(y1, x0);
    let v11 = sample(y1, x1);

    v00 * (1.0 - fx) * (1.0 - fy) + v10 * fx * (1.0 - fy) + v01 * (1.0 - fx) * fy + v11 * fx * fy
}
