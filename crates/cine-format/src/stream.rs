//! 流信息定义.

use cine_codec::{AudioCodecParams, CodecId, CodecParameters, VideoCodecParams};
use cine_core::{ChannelLayout, MediaType, PixelFormat, Rational, SampleFormat};

/// 容器中的一条流
#[derive(Debug, Clone)]
pub struct Stream {
    /// 流索引
    pub index: usize,
    /// 媒体类型
    pub media_type: MediaType,
    /// 编解码器标识
    pub codec_id: CodecId,
    /// 时间基
    pub time_base: Rational,
    /// 流特定参数
    pub params: StreamParams,
}

/// 流特定参数
#[derive(Debug, Clone)]
pub enum StreamParams {
    /// 视频流参数
    Video(VideoStreamParams),
    /// 音频流参数
    Audio(AudioStreamParams),
    /// 其他
    Other,
}

/// 视频流参数
#[derive(Debug, Clone)]
pub struct VideoStreamParams {
    /// 宽度 (像素)
    pub width: u32,
    /// 高度 (像素)
    pub height: u32,
    /// 像素格式
    pub pixel_format: PixelFormat,
    /// 声明的帧率
    pub frame_rate: Rational,
}

/// 音频流参数
#[derive(Debug, Clone)]
pub struct AudioStreamParams {
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 声道布局
    pub channel_layout: ChannelLayout,
    /// 采样格式
    pub sample_format: SampleFormat,
}

impl Stream {
    /// 转换为打开解码器所需的参数
    pub fn codec_parameters(&self) -> CodecParameters {
        match &self.params {
            StreamParams::Video(v) => CodecParameters::video(
                self.codec_id,
                VideoCodecParams {
                    width: v.width,
                    height: v.height,
                    pixel_format: v.pixel_format,
                    frame_rate: v.frame_rate,
                },
            ),
            StreamParams::Audio(a) => CodecParameters::audio(
                self.codec_id,
                AudioCodecParams {
                    sample_rate: a.sample_rate,
                    channel_layout: a.channel_layout,
                    sample_format: a.sample_format,
                },
            ),
            StreamParams::Other => CodecParameters {
                codec_id: self.codec_id,
                extra_data: Vec::new(),
                params: cine_codec::CodecParamsType::None,
            },
        }
    }
}
