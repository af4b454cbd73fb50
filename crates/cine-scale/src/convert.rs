//! 像素格式转换为 RGBA.
//!
//! 播放输出统一为 RGBA 打包格式, 本模块只负责 "任意支持格式 → RGBA" 这一方向.
//! 逐行并行处理 (rayon).
//!
//! YUV → RGB 使用 BT.601 定点公式:
//! ```text
//! R = Y + 1.402 * (V - 128)
//! G = Y - 0.344 * (U - 128) - 0.714 * (V - 128)
//! B = Y + 1.772 * (U - 128)
//! ```

use cine_core::{CineError, CineResult, PixelFormat};
use rayon::prelude::*;

/// 转换输入图像描述
pub struct SourceImage<'a> {
    /// 各平面数据
    pub planes: &'a [&'a [u8]],
    /// 各平面每行字节数
    pub linesize: &'a [usize],
    /// 宽度
    pub width: u32,
    /// 高度
    pub height: u32,
    /// 像素格式
    pub format: PixelFormat,
}

/// 检查格式是否可以转换为 RGBA
pub fn is_supported(format: PixelFormat) -> bool {
    matches!(
        format,
        PixelFormat::Yuv420p
            | PixelFormat::Yuv422p
            | PixelFormat::Yuv444p
            | PixelFormat::Rgb24
            | PixelFormat::Bgr24
            | PixelFormat::Rgba
            | PixelFormat::Gray8
    )
}

/// 转换为 RGBA, `dst` 每行 `width * 4` 字节, 无行间填充
///
/// 输出的 alpha 固定为 255 (源为 RGBA 时强制不透明).
pub fn to_rgba(src: &SourceImage<'_>, dst: &mut [u8]) -> CineResult<()> {
    let w = src.width as usize;
    let h = src.height as usize;
    if w == 0 || h == 0 {
        return Ok(());
    }
    if dst.len() < w * h * 4 {
        return Err(CineError::InvalidArgument(format!(
            "RGBA 输出缓冲区过小: {} < {}",
            dst.len(),
            w * h * 4
        )));
    }
    check_planes(src)?;

    let dst = &mut dst[..w * h * 4];
    match src.format {
        PixelFormat::Yuv420p | PixelFormat::Yuv422p | PixelFormat::Yuv444p => {
            let (sub_h, sub_v) = src.format.chroma_subsampling();
            dst.par_chunks_mut(w * 4).enumerate().for_each(|(row, out)| {
                let y_row = &src.planes[0][row * src.linesize[0]..];
                let crow = row >> sub_v;
                let u_row = &src.planes[1][crow * src.linesize[1]..];
                let v_row = &src.planes[2][crow * src.linesize[2]..];
                for (col, px) in out.chunks_exact_mut(4).enumerate() {
                    let c = col >> sub_h;
                    let (r, g, b) = yuv_to_rgb(y_row[col], u_row[c], v_row[c]);
                    px.copy_from_slice(&[r, g, b, 255]);
                }
            });
        }
        PixelFormat::Rgb24 | PixelFormat::Bgr24 => {
            let swap = src.format == PixelFormat::Bgr24;
            dst.par_chunks_mut(w * 4).enumerate().for_each(|(row, out)| {
                let line = &src.planes[0][row * src.linesize[0]..];
                for (px, s) in out.chunks_exact_mut(4).zip(line.chunks_exact(3)) {
                    let (r, b) = if swap { (s[2], s[0]) } else { (s[0], s[2]) };
                    px.copy_from_slice(&[r, s[1], b, 255]);
                }
            });
        }
        PixelFormat::Rgba => {
            dst.par_chunks_mut(w * 4).enumerate().for_each(|(row, out)| {
                let start = row * src.linesize[0];
                out.copy_from_slice(&src.planes[0][start..start + w * 4]);
                for px in out.chunks_exact_mut(4) {
                    px[3] = 255;
                }
            });
        }
        PixelFormat::Gray8 => {
            dst.par_chunks_mut(w * 4).enumerate().for_each(|(row, out)| {
                let line = &src.planes[0][row * src.linesize[0]..];
                for (px, &y) in out.chunks_exact_mut(4).zip(line.iter()) {
                    px.copy_from_slice(&[y, y, y, 255]);
                }
            });
        }
        other => {
            return Err(CineError::Unsupported(format!(
                "不支持 {other} → rgba 的转换"
            )));
        }
    }
    Ok(())
}

/// BT.601 单像素 YUV → RGB
#[inline]
fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let y = i32::from(y);
    let u = i32::from(u) - 128;
    let v = i32::from(v) - 128;
    let r = (y + ((v * 359 + 128) >> 8)).clamp(0, 255);
    let g = (y - ((u * 88 + v * 183 + 128) >> 8)).clamp(0, 255);
    let b = (y + ((u * 454 + 128) >> 8)).clamp(0, 255);
    (r as u8, g as u8, b as u8)
}

/// 校验各平面的长度足够容纳声明的尺寸
fn check_planes(src: &SourceImage<'_>) -> CineResult<()> {
    if !is_supported(src.format) {
        return Err(CineError::Unsupported(format!(
            "不支持 {} → rgba 的转换",
            src.format
        )));
    }
    let planes = src.format.plane_count() as usize;
    if src.planes.len() < planes || src.linesize.len() < planes {
        return Err(CineError::InvalidData(format!(
            "{} 需要 {planes} 个平面, 实际 {}",
            src.format,
            src.planes.len()
        )));
    }
    for p in 0..planes {
        let row_bytes = src.format.plane_linesize(p, src.width).unwrap_or(0);
        let rows = src.format.plane_height(p, src.height).unwrap_or(0);
        let stride = src.linesize[p];
        if stride < row_bytes || rows == 0 {
            return Err(CineError::InvalidData(format!(
                "平面 {p} 行字节数 {stride} 小于 {row_bytes}"
            )));
        }
        let needed = stride * (rows - 1) + row_bytes;
        if src.planes[p].len() < needed {
            return Err(CineError::InvalidData(format!(
                "平面 {p} 数据不足: {} < {needed}",
                src.planes[p].len()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(planes: &[&[u8]], linesize: &[usize], w: u32, h: u32, pf: PixelFormat) -> Vec<u8> {
        let src = SourceImage {
            planes,
            linesize,
            width: w,
            height: h,
            format: pf,
        };
        let mut dst = vec![0u8; (w * h * 4) as usize];
        to_rgba(&src, &mut dst).unwrap();
        dst
    }

    #[test]
    fn test_yuv420p_灰色转换() {
        let y = [128u8; 4];
        let u = [128u8; 1];
        let v = [128u8; 1];
        let out = convert(&[&y[..], &u[..], &v[..]], &[2, 1, 1], 2, 2, PixelFormat::Yuv420p);
        for px in out.chunks(4) {
            assert_eq!(px, &[128, 128, 128, 255]);
        }
    }

    #[test]
    fn test_yuv_纯红近似() {
        // 全范围 BT.601 纯红: Y=76, U=85, V=255
        let (r, g, b) = yuv_to_rgb(76, 85, 255);
        assert!(r > 240);
        assert!(g < 16);
        assert!(b < 16);
    }

    #[test]
    fn test_bgr24_交换红蓝() {
        let bgr = [1u8, 2, 3, 4, 5, 6];
        let out = convert(&[&bgr[..]], &[6], 2, 1, PixelFormat::Bgr24);
        assert_eq!(out, vec![3, 2, 1, 255, 6, 5, 4, 255]);
    }

    #[test]
    fn test_rgba_强制不透明() {
        let rgba = [10u8, 20, 30, 0];
        let out = convert(&[&rgba[..]], &[4], 1, 1, PixelFormat::Rgba);
        assert_eq!(out, vec![10, 20, 30, 255]);
    }

    #[test]
    fn test_带行间填充的_gray8() {
        // 每行 2 像素, stride 4
        let gray = [1u8, 2, 0, 0, 3, 4];
        let out = convert(&[&gray[..]], &[4], 2, 2, PixelFormat::Gray8);
        assert_eq!(&out[12..16], &[4, 4, 4, 255]);
    }

    #[test]
    fn test_平面数据不足报错() {
        let y = [0u8; 3];
        let src = SourceImage {
            planes: &[&y[..]],
            linesize: &[2],
            width: 2,
            height: 2,
            format: PixelFormat::Gray8,
        };
        let mut dst = vec![0u8; 16];
        assert!(matches!(
            to_rgba(&src, &mut dst),
            Err(CineError::InvalidData(_))
        ));
    }

    #[test]
    fn test_调色板格式不支持() {
        assert!(!is_supported(PixelFormat::Pal8));
    }
}
