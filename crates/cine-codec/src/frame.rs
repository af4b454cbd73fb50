//! 解码后的帧数据 (Frame).

use cine_core::{ChannelLayout, PixelFormat, SampleFormat};

/// 视频帧
///
/// 平面格式每个平面一个 `Vec`, 打包格式只有一个平面.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// 各平面的像素数据
    pub data: Vec<Vec<u8>>,
    /// 各平面每行的字节数
    pub linesize: Vec<usize>,
    /// 宽度 (像素)
    pub width: u32,
    /// 高度 (像素)
    pub height: u32,
    /// 像素格式
    pub pixel_format: PixelFormat,
    /// 显示时间戳
    pub pts: i64,
}

impl VideoFrame {
    /// 创建空的视频帧
    pub fn new(width: u32, height: u32, pixel_format: PixelFormat) -> Self {
        let planes = pixel_format.plane_count() as usize;
        Self {
            data: vec![Vec::new(); planes],
            linesize: vec![0; planes],
            width,
            height,
            pixel_format,
            pts: -1,
        }
    }
}

/// 音频帧
///
/// 平面格式每个声道一个 `Vec`, 交错格式只有一个 `Vec`.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// 采样数据
    pub data: Vec<Vec<u8>>,
    /// 每声道采样数
    pub nb_samples: u32,
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 采样格式
    pub sample_format: SampleFormat,
    /// 声道布局
    pub channel_layout: ChannelLayout,
    /// 显示时间戳
    pub pts: i64,
}

impl AudioFrame {
    /// 创建空的音频帧
    pub fn new(
        nb_samples: u32,
        sample_rate: u32,
        sample_format: SampleFormat,
        channel_layout: ChannelLayout,
    ) -> Self {
        let planes = if sample_format.is_planar() {
            channel_layout.channels as usize
        } else {
            1
        };
        Self {
            data: vec![Vec::new(); planes],
            nb_samples,
            sample_rate,
            sample_format,
            channel_layout,
            pts: -1,
        }
    }
}

/// 帧 (视频帧或音频帧)
#[derive(Debug, Clone)]
pub enum Frame {
    /// 视频帧
    Video(VideoFrame),
    /// 音频帧
    Audio(AudioFrame),
}
