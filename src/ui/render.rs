//! Software presentation into a softbuffer frame (one u32 per pixel, 0x00RRGGBB).

use crate::loader::RasterImage;
use crate::ui::viewport::Transform;

pub const BG_COLOR: [u8; 3] = [31, 31, 31]; // ~0.12 * 255

/// Pack RGB into softbuffer u32 format: 0x00RRGGBB.
pub fn rgb(r: u8, g: u8, b: u8) -> u32 {
    (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Unpack softbuffer u32 into (r, g, b).
fn unpack_rgb(v: u32) -> (u8, u8, u8) {
    ((v >> 16) as u8, (v >> 8) as u8, v as u8)
}

fn blend(src: u8, dst: u8, alpha: u32) -> u8 {
    ((src as u32 * alpha + dst as u32 * (255 - alpha)) / 255) as u8
}

/// Clear the frame and draw `image` under `transform`.
pub fn draw_frame(frame: &mut [u32], fb_w: u32, fb_h: u32, image: &RasterImage, transform: &Transform) {
    frame.fill(rgb(BG_COLOR[0], BG_COLOR[1], BG_COLOR[2]));
    blit_transformed(frame, fb_w, fb_h, image, transform);
}

/// Nearest-neighbour blit with alpha blending, clipped to the frame.
pub fn blit_transformed(dst: &mut [u32], dst_w: u32, dst_h: u32, image: &RasterImage, transform: &Transform) {
    let (src_w, src_h) = (image.width, image.height);
    if src_w == 0 || src_h == 0 || transform.scale <= 0.0 {
        return;
    }
    let src = &image.rgba_bytes;
    let (x0, y0) = transform.origin(
        (src_w as f64, src_h as f64),
        (dst_w as f64, dst_h as f64),
    );
    let draw_w = src_w as f64 * transform.scale;
    let draw_h = src_h as f64 * transform.scale;

    let dx_start = x0.max(0.0).floor() as u32;
    let dy_start = y0.max(0.0).floor() as u32;
    let dx_end = (x0 + draw_w).ceil().clamp(0.0, dst_w as f64) as u32;
    let dy_end = (y0 + draw_h).ceil().clamp(0.0, dst_h as f64) as u32;

    let inv_scale = 1.0 / transform.scale;

    for dy in dy_start..dy_end {
        let vy = (dy as f64 - y0) * inv_scale;
        if vy < 0.0 || vy >= src_h as f64 {
            continue;
        }
        let sy = vy as usize;
        for dx in dx_start..dx_end {
            let vx = (dx as f64 - x0) * inv_scale;
            if vx < 0.0 || vx >= src_w as f64 {
                continue;
            }
            let sx = vx as usize;

            let si = (sy * src_w as usize + sx) * 4;
            let di = dy as usize * dst_w as usize + dx as usize;
            let (Some(px), Some(out)) = (src.get(si..si + 4), dst.get_mut(di)) else {
                continue;
            };

            let sa = px[3] as u32;
            if sa == 255 {
                *out = rgb(px[0], px[1], px[2]);
            } else if sa > 0 {
                let (dr, dg, db) = unpack_rgb(*out);
                *out = rgb(blend(px[0], dr, sa), blend(px[1], dg, sa), blend(px[2], db, sa));
            }
        }
    }
}
