//! 像素格式定义.
//!
//! 覆盖各解码后端会产出的像素格式, 以及播放输出使用的 RGBA / 调色板格式.

use std::fmt;

/// 像素格式
///
/// 命名规则: 颜色空间 + 位深 + 排列方式 (P=Planar).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    /// 未指定
    None,

    // ========================
    // YUV 平面格式 (Planar)
    // ========================
    /// YUV 4:2:0 平面格式, 8 位 (MPEG-1 默认)
    Yuv420p,
    /// YUV 4:2:2 平面格式, 8 位
    Yuv422p,
    /// YUV 4:4:4 平面格式, 8 位
    Yuv444p,

    // ========================
    // RGB 打包格式 (Packed)
    // ========================
    /// RGB 各 8 位, 打包
    Rgb24,
    /// BGR 各 8 位, 打包
    Bgr24,
    /// RGBA 各 8 位, 打包 (播放输出格式)
    Rgba,

    // ========================
    // 单通道格式
    // ========================
    /// 灰度 8 位
    Gray8,
    /// 8 位调色板索引 (旧式过场动画输出)
    Pal8,
}

impl PixelFormat {
    /// 获取色度子采样 (水平, 垂直)
    ///
    /// 返回 (log2 水平子采样, log2 垂直子采样).
    pub const fn chroma_subsampling(&self) -> (u32, u32) {
        match self {
            Self::Yuv420p => (1, 1),
            Self::Yuv422p => (1, 0),
            _ => (0, 0),
        }
    }

    /// 是否为平面格式
    pub const fn is_planar(&self) -> bool {
        matches!(self, Self::Yuv420p | Self::Yuv422p | Self::Yuv444p)
    }

    /// 平面数量
    pub const fn plane_count(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::Yuv420p | Self::Yuv422p | Self::Yuv444p => 3,
            Self::Rgb24 | Self::Bgr24 | Self::Rgba | Self::Gray8 | Self::Pal8 => 1,
        }
    }

    /// 打包格式每像素字节数, 平面格式返回 0
    pub const fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Rgb24 | Self::Bgr24 => 3,
            Self::Rgba => 4,
            Self::Gray8 | Self::Pal8 => 1,
            _ => 0,
        }
    }

    /// 计算指定平面每行的字节数 (linesize / stride)
    ///
    /// 格式为 None 或平面索引超出范围时返回 `None`.
    pub fn plane_linesize(&self, plane: usize, width: u32) -> Option<usize> {
        if *self == Self::None || plane >= self.plane_count() as usize {
            return None;
        }
        let w = width as usize;
        let (sub_h, _) = self.chroma_subsampling();
        Some(match self {
            Self::Yuv420p | Self::Yuv422p | Self::Yuv444p => {
                if plane == 0 {
                    w
                } else {
                    w.div_ceil(1 << sub_h)
                }
            }
            _ => w * self.bytes_per_pixel(),
        })
    }

    /// 计算指定平面的行数
    pub fn plane_height(&self, plane: usize, height: u32) -> Option<usize> {
        if *self == Self::None || plane >= self.plane_count() as usize {
            return None;
        }
        let h = height as usize;
        let (_, sub_v) = self.chroma_subsampling();
        Some(if plane == 0 {
            h
        } else {
            h.div_ceil(1 << sub_v)
        })
    }

    /// 计算整帧的字节数
    pub fn frame_size(&self, width: u32, height: u32) -> Option<usize> {
        if *self == Self::None {
            return None;
        }
        let mut total = 0usize;
        for plane in 0..self.plane_count() as usize {
            let linesize = self.plane_linesize(plane, width)?;
            let plane_h = self.plane_height(plane, height)?;
            total += linesize * plane_h;
        }
        Some(total)
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Yuv420p => "yuv420p",
            Self::Yuv422p => "yuv422p",
            Self::Yuv444p => "yuv444p",
            Self::Rgb24 => "rgb24",
            Self::Bgr24 => "bgr24",
            Self::Rgba => "rgba",
            Self::Gray8 => "gray8",
            Self::Pal8 => "pal8",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yuv420p_frame_size() {
        let pf = PixelFormat::Yuv420p;
        assert_eq!(pf.frame_size(320, 240), Some(320 * 240 * 3 / 2));
        assert_eq!(pf.plane_linesize(1, 320), Some(160));
        assert_eq!(pf.plane_height(2, 240), Some(120));
    }

    #[test]
    fn test_yuv420p_奇数尺寸向上取整() {
        let pf = PixelFormat::Yuv420p;
        assert_eq!(pf.plane_linesize(1, 5), Some(3));
        assert_eq!(pf.plane_height(1, 3), Some(2));
    }

    #[test]
    fn test_rgba_frame_size() {
        assert_eq!(PixelFormat::Rgba.plane_linesize(0, 64), Some(256));
        assert_eq!(PixelFormat::Rgba.frame_size(64, 64), Some(64 * 64 * 4));
    }

    #[test]
    fn test_pal8_每像素一字节() {
        assert_eq!(PixelFormat::Pal8.frame_size(64, 48), Some(64 * 48));
    }

    #[test]
    fn test_none_return_none() {
        assert_eq!(PixelFormat::None.frame_size(16, 16), None);
        assert_eq!(PixelFormat::Rgb24.plane_linesize(1, 16), None);
    }
}
