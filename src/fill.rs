use rayon::prelude::*;

use crate::{
    core::Extent,
    error::{FluxelError, FluxelResult},
    fx::{FillConfig, FillDirection},
    sdf::DistanceField,
};

pub type PremulRgba8 = [u8; 4];

/// Where the compositor takes its per-pixel normalized distance from.
#[derive(Clone, Copy, Debug)]
pub enum FillDistance<'a> {
    /// Inline geometric distance from the pixel's UV coordinate.
    Geometric,
    /// Sample a precomputed jump-flood field, normalized by its maximum.
    Field(&'a DistanceField),
}

/// Source-over with premultiplied RGBA8, scaled by `opacity`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Blend `fill` over `dst` but keep the destination's alpha channel.
/// The fill effect changes visible color only, never transparency.
pub fn blend_keep_alpha(dst: PremulRgba8, fill: PremulRgba8) -> PremulRgba8 {
    let mut out = over(dst, fill, 1.0);
    out[3] = dst[3];
    out
}

/// Apply a masked fill over a premultiplied RGBA8 source, returning a new
/// buffer of the same shape.
///
/// A pixel is painted when its normalized distance is within `progress` and
/// its source alpha reaches the config threshold; everything else passes
/// through untouched. Output alpha always equals source alpha. `progress`
/// is clamped to `[0,1]`; at exactly 0 the source is returned unchanged.
pub fn apply_fill(
    src: &[u8],
    extent: Extent,
    progress: f64,
    config: &FillConfig,
    distance: FillDistance<'_>,
) -> FluxelResult<Vec<u8>> {
    config.validate()?;
    if !progress.is_finite() {
        return Err(FluxelError::evaluation("fill progress must be finite"));
    }
    if src.len() != extent.rgba8_len()? {
        return Err(FluxelError::evaluation(
            "fill source must match width*height*4",
        ));
    }
    if let FillDistance::Field(field) = distance
        && field.extent() != extent
    {
        return Err(FluxelError::evaluation(
            "distance field extent must match the fill source",
        ));
    }

    let progress = progress.clamp(0.0, 1.0) as f32;
    if progress <= 0.0 {
        return Ok(src.to_vec());
    }

    let w = extent.width;
    let h = extent.height;
    let row_len = (w as usize) * 4;
    let fill_px = config.color.to_array();

    let mut out = vec![0u8; src.len()];
    out.par_chunks_mut(row_len)
        .zip(src.par_chunks(row_len))
        .enumerate()
        .for_each(|(y, (out_row, src_row))| {
            for x in 0..w {
                let i = (x as usize) * 4;
                let sp = [src_row[i], src_row[i + 1], src_row[i + 2], src_row[i + 3]];

                let nd = match distance {
                    FillDistance::Geometric => {
                        geometric_distance(config, x, y as u32, w, h)
                    }
                    FillDistance::Field(field) => field.normalized_distance(x, y as u32),
                };
                let alpha = f32::from(sp[3]) / 255.0;
                let painted = nd <= progress && alpha >= config.alpha_threshold;

                let op = if painted {
                    blend_keep_alpha(sp, fill_px)
                } else {
                    sp
                };
                out_row[i..i + 4].copy_from_slice(&op);
            }
        });

    Ok(out)
}

/// Normalized distance of pixel `(x, y)` for the configured direction.
///
/// UV space is 0..1 with Y increasing upward; buffers are row-major top-down,
/// so `uv.y = 1 - y/(h-1)` and "top-bottom" fills row 0 first.
fn geometric_distance(config: &FillConfig, x: u32, y: u32, w: u32, h: u32) -> f32 {
    let u = if w > 1 {
        x as f32 / (w - 1) as f32
    } else {
        0.0
    };
    let v = if h > 1 {
        1.0 - y as f32 / (h - 1) as f32
    } else {
        1.0
    };

    match config.direction {
        FillDirection::CenterOut | FillDirection::Custom => radial(config, u, v),
        FillDirection::EdgeIn => 1.0 - radial(config, u, v),
        FillDirection::LeftRight => u,
        FillDirection::TopBottom => 1.0 - v,
    }
}

fn radial(config: &FillConfig, u: f32, v: f32) -> f32 {
    let dx = u - config.anchor.x as f32;
    let dy = v - config.anchor.y as f32;
    dx.hypot(dy) / std::f32::consts::SQRT_2
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}
