//! RGBA 图像缩放.
//!
//! 支持的算法:
//! - **最近邻插值** (`Nearest`): 速度最快, 适合像素风格素材
//! - **双线性插值** (`Bilinear`): 默认算法
//!
//! 输入输出均为无行间填充的 RGBA, 按目标行并行处理.

use cine_core::{CineError, CineResult};
use rayon::prelude::*;

use crate::ScaleAlgorithm;

const BPP: usize = 4;

/// 缩放 RGBA 图像
pub fn scale_rgba(
    src: &[u8],
    src_w: u32,
    src_h: u32,
    dst: &mut [u8],
    dst_w: u32,
    dst_h: u32,
    algorithm: ScaleAlgorithm,
) -> CineResult<()> {
    let (sw, sh, dw, dh) = (src_w as usize, src_h as usize, dst_w as usize, dst_h as usize);
    if sw == 0 || sh == 0 || dw == 0 || dh == 0 {
        return Err(CineError::InvalidArgument(format!(
            "缩放尺寸非法: {src_w}x{src_h} → {dst_w}x{dst_h}"
        )));
    }
    if src.len() < sw * sh * BPP || dst.len() < dw * dh * BPP {
        return Err(CineError::InvalidArgument("RGBA 缩放缓冲区过小".into()));
    }
    let dst = &mut dst[..dw * dh * BPP];
    match algorithm {
        ScaleAlgorithm::Nearest => scale_nearest(src, sw, sh, dst, dw, dh),
        ScaleAlgorithm::Bilinear => scale_bilinear(src, sw, sh, dst, dw, dh),
    }
    Ok(())
}

// ============================================================
// 最近邻插值
// ============================================================

fn scale_nearest(src: &[u8], sw: usize, sh: usize, dst: &mut [u8], dw: usize, dh: usize) {
    let x_map: Vec<usize> = (0..dw).map(|dx| (dx * sw / dw).min(sw - 1)).collect();
    dst.par_chunks_mut(dw * BPP).enumerate().for_each(|(dy, out)| {
        let sy = (dy * sh / dh).min(sh - 1);
        let row = &src[sy * sw * BPP..(sy + 1) * sw * BPP];
        for (px, &sx) in out.chunks_exact_mut(BPP).zip(x_map.iter()) {
            px.copy_from_slice(&row[sx * BPP..sx * BPP + BPP]);
        }
    });
}

// ============================================================
// 双线性插值
// ============================================================

/// 双线性插值, 权重使用 1/256 定点数
fn scale_bilinear(src: &[u8], sw: usize, sh: usize, dst: &mut [u8], dw: usize, dh: usize) {
    let x_map: Vec<(usize, usize, u32)> = (0..dw).map(|dx| map_coord(dx, dw, sw)).collect();
    let stride = sw * BPP;
    dst.par_chunks_mut(dw * BPP).enumerate().for_each(|(dy, out)| {
        let (sy0, sy1, fy) = map_coord(dy, dh, sh);
        let iy = 256 - fy;
        let row0 = &src[sy0 * stride..sy0 * stride + stride];
        let row1 = &src[sy1 * stride..sy1 * stride + stride];
        for (px, &(sx0, sx1, fx)) in out.chunks_exact_mut(BPP).zip(x_map.iter()) {
            let ix = 256 - fx;
            let w00 = ix * iy;
            let w10 = fx * iy;
            let w01 = ix * fy;
            let w11 = fx * fy;
            for c in 0..BPP {
                let v = (u32::from(row0[sx0 * BPP + c]) * w00
                    + u32::from(row0[sx1 * BPP + c]) * w10
                    + u32::from(row1[sx0 * BPP + c]) * w01
                    + u32::from(row1[sx1 * BPP + c]) * w11
                    + 32768)
                    >> 16;
                px[c] = v as u8;
            }
        }
    });
}

/// 目标坐标映射到源坐标 (中心对齐)
///
/// 返回 `(idx0, idx1, frac)`, `frac` 为 0..256 定点小数.
#[inline]
fn map_coord(dst_idx: usize, dst_size: usize, src_size: usize) -> (usize, usize, u32) {
    let pos = ((dst_idx as u64 * 2 + 1) * src_size as u64 * 128 / dst_size as u64)
        .saturating_sub(128);
    let max_idx = src_size - 1;
    let idx0 = ((pos >> 8) as usize).min(max_idx);
    let idx1 = (idx0 + 1).min(max_idx);
    (idx0, idx1, (pos & 0xFF) as u32)
}
