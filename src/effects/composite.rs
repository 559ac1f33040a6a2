use rayon::prelude::*;

use crate::foundation::core::{Region, Rgba8Premul};
use crate::foundation::math::mul_div255_u8;
use crate::render::frame::Frame;

/// Source-over blend of one premultiplied pixel at a uniform opacity.
pub fn over(dst: Rgba8Premul, src: Rgba8Premul, opacity: f32) -> Rgba8Premul {
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

/// Overwrite every pixel of `frame` with `rgba`.
pub fn fill(frame: &mut Frame, rgba: Rgba8Premul) {
    frame
        .data_mut()
        .par_chunks_exact_mut(4)
        .for_each(|px| px.copy_from_slice(&rgba));
}

/// Overwrite the pixels inside `region` (clipped to the frame) with `rgba`.
pub fn fill_region(frame: &mut Frame, region: Region, rgba: Rgba8Premul) {
    let Some(region) = region.clip_to(frame.size()) else {
        return;
    };
    let row_bytes = frame.width() as usize * 4;
    let x0 = region.x as usize * 4;
    let x1 = x0 + region.width as usize * 4;
    frame
        .data_mut()
        .par_chunks_exact_mut(row_bytes)
        .skip(region.y as usize)
        .take(region.height as usize)
        .for_each(|row| {
            for px in row[x0..x1].chunks_exact_mut(4) {
                px.copy_from_slice(&rgba);
            }
        });
}

/// Composite `src` over `dst` into `region` at a uniform `opacity`.
///
/// `src` is stretched to the region with nearest-neighbour sampling when the sizes differ. The
/// part of the region that falls outside `dst` is skipped.
pub fn draw(dst: &mut Frame, src: &Frame, region: Region, opacity: f32) {
    if opacity <= 0.0 || region.width == 0 || region.height == 0 {
        return;
    }
    let Some(visible) = region.clip_to(dst.size()) else {
        return;
    };

    let same_size = src.size() == region.size();
    let src_w = src.width() as usize;
    let src_h = src.height() as usize;
    let src_data = src.data();
    let row_bytes = dst.width() as usize * 4;
    let opaque = opacity >= 1.0;

    dst.data_mut()
        .par_chunks_exact_mut(row_bytes)
        .enumerate()
        .skip(visible.y as usize)
        .take(visible.height as usize)
        .for_each(|(y, row)| {
            let ry = y - region.y as usize;
            let sy = if same_size {
                ry
            } else {
                (ry * src_h / region.height as usize).min(src_h - 1)
            };
            let src_row = &src_data[sy * src_w * 4..(sy + 1) * src_w * 4];
            for rx in 0..visible.width as usize {
                let sx = if same_size {
                    rx
                } else {
                    (rx * src_w / region.width as usize).min(src_w - 1)
                };
                let s = &src_row[sx * 4..sx * 4 + 4];
                let di = (visible.x as usize + rx) * 4;
                let d = &mut row[di..di + 4];
                if opaque && s[3] == 255 {
                    d.copy_from_slice(s);
                    continue;
                }
                let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
                d.copy_from_slice(&out);
            }
        });
}

fn mul_div255(x: u16, y: u16) -> u8 {
    mul_div255_u8(x, y)
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
