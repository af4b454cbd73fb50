//! # cine-resample
//!
//! Cine 过场动画引擎音频采样格式转换库.
//!
//! 把解码器输出的任意采样格式 (交错或平面) 转换为本机字节序的交错 S16.
//! 只做格式转换, 采样率与声道数保持不变.

pub mod convert;

use cine_core::{CineError, CineResult, SampleFormat};
use log::debug;

pub use convert::float_to_s16;

/// 输出采样的字节数
pub const OUTPUT_BYTES_PER_SAMPLE: usize = 2;

/// 采样格式转换上下文
#[derive(Debug, Clone)]
pub struct ResampleContext {
    /// 源采样格式
    pub src_format: SampleFormat,
    /// 声道数
    pub channels: u32,
    /// 采样率 (输入输出相同)
    pub sample_rate: u32,
}

impl ResampleContext {
    /// 创建转换上下文
    pub fn new(src_format: SampleFormat, channels: u32, sample_rate: u32) -> CineResult<Self> {
        if src_format.bytes_per_sample() == 0 {
            return Err(CineError::Unsupported(format!(
                "不支持的源采样格式: {src_format}"
            )));
        }
        if channels == 0 {
            return Err(CineError::InvalidArgument("声道数不能为 0".into()));
        }
        debug!("创建采样转换: {src_format} × {channels} 声道 @ {sample_rate} Hz → s16");
        Ok(Self {
            src_format,
            channels,
            sample_rate,
        })
    }

    /// `nb_samples` 个 (每声道) 采样转换后的字节数
    pub fn output_size(&self, nb_samples: usize) -> usize {
        nb_samples * self.channels as usize * OUTPUT_BYTES_PER_SAMPLE
    }

    /// 转换一帧音频, 写入 `dst` 开头并返回写入的字节数
    ///
    /// 交错格式只使用 `planes[0]`; 平面格式每个声道一个平面.
    pub fn convert(&self, planes: &[&[u8]], nb_samples: usize, dst: &mut [u8]) -> CineResult<usize> {
        let channels = self.channels as usize;
        let bps = self.src_format.bytes_per_sample() as usize;
        let out_len = self.output_size(nb_samples);
        if dst.len() < out_len {
            return Err(CineError::InvalidArgument(format!(
                "S16 输出缓冲区过小: {} < {out_len}",
                dst.len()
            )));
        }

        if self.src_format.is_planar() {
            if planes.len() < channels || planes.iter().any(|p| p.len() < nb_samples * bps) {
                return Err(CineError::InvalidData("平面音频数据不足".into()));
            }
            for (i, out) in dst[..out_len]
                .chunks_exact_mut(OUTPUT_BYTES_PER_SAMPLE)
                .enumerate()
            {
                let (n, ch) = (i / channels, i % channels);
                let s = convert::sample_to_s16(&planes[ch][n * bps..], self.src_format);
                out.copy_from_slice(&s.to_ne_bytes());
            }
        } else {
            let data = planes.first().copied().unwrap_or(&[]);
            if data.len() < nb_samples * channels * bps {
                return Err(CineError::InvalidData(format!(
                    "交错音频数据不足: {} < {}",
                    data.len(),
                    nb_samples * channels * bps
                )));
            }
            for (out, src) in dst[..out_len]
                .chunks_exact_mut(OUTPUT_BYTES_PER_SAMPLE)
                .zip(data.chunks_exact(bps))
            {
                let s = convert::sample_to_s16(src, self.src_format);
                out.copy_from_slice(&s.to_ne_bytes());
            }
        }
        Ok(out_len)
    }
}
