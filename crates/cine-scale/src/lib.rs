//! # cine-scale
//!
//! Cine 过场动画引擎图像缩放与像素格式转换库.
//!
//! 解码器输出的各种像素格式在这里统一转换为 RGBA, 并按需缩放到播放尺寸.

pub mod convert;
pub mod scale;

use cine_core::{CineError, CineResult, PixelFormat};
use log::debug;

pub use convert::SourceImage;

/// 缩放算法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScaleAlgorithm {
    /// 最近邻
    Nearest,
    /// 双线性插值
    #[default]
    Bilinear,
}

/// 缩放/转换上下文
///
/// 配置一次后逐帧复用. 先转换为源尺寸的 RGBA, 尺寸不同时再缩放.
pub struct ScaleContext {
    /// 源宽度
    pub src_width: u32,
    /// 源高度
    pub src_height: u32,
    /// 源像素格式
    pub src_format: PixelFormat,
    /// 目标宽度
    pub dst_width: u32,
    /// 目标高度
    pub dst_height: u32,
    /// 缩放算法
    pub algorithm: ScaleAlgorithm,
    /// 源尺寸 RGBA 中间缓冲
    scratch: Vec<u8>,
}

impl ScaleContext {
    /// 创建缩放上下文
    pub fn new(
        src_width: u32,
        src_height: u32,
        src_format: PixelFormat,
        dst_width: u32,
        dst_height: u32,
        algorithm: ScaleAlgorithm,
    ) -> CineResult<Self> {
        if src_width == 0 || src_height == 0 || dst_width == 0 || dst_height == 0 {
            return Err(CineError::InvalidArgument(format!(
                "缩放尺寸非法: {src_width}x{src_height} → {dst_width}x{dst_height}"
            )));
        }
        if !convert::is_supported(src_format) {
            return Err(CineError::Unsupported(format!(
                "不支持 {src_format} → rgba 的转换"
            )));
        }
        debug!(
            "创建缩放上下文: {src_width}x{src_height} {src_format} → {dst_width}x{dst_height} rgba ({algorithm:?})"
        );
        Ok(Self {
            src_width,
            src_height,
            src_format,
            dst_width,
            dst_height,
            algorithm,
            scratch: Vec::new(),
        })
    }

    /// 目标 RGBA 帧的字节数
    pub fn dst_frame_size(&self) -> usize {
        self.dst_width as usize * self.dst_height as usize * 4
    }

    /// 是否需要缩放
    pub fn needs_resize(&self) -> bool {
        self.src_width != self.dst_width || self.src_height != self.dst_height
    }

    /// 转换一帧到 `dst` (至少 `dst_frame_size()` 字节)
    pub fn scale(&mut self, planes: &[&[u8]], linesize: &[usize], dst: &mut [u8]) -> CineResult<()> {
        let src = SourceImage {
            planes,
            linesize,
            width: self.src_width,
            height: self.src_height,
            format: self.src_format,
        };
        if !self.needs_resize() {
            return convert::to_rgba(&src, dst);
        }

        let needed = self.src_width as usize * self.src_height as usize * 4;
        self.scratch.resize(needed, 0);
        convert::to_rgba(&src, &mut self.scratch)?;
        scale::scale_rgba(
            &self.scratch,
            self.src_width,
            self.src_height,
            dst,
            self.dst_width,
            self.dst_height,
            self.algorithm,
        )
    }
}
