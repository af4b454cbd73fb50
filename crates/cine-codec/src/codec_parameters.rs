//! 编解码器参数.
//!
//! 由解复用器从容器中提取, 用于打开解码器.

use cine_core::{ChannelLayout, PixelFormat, Rational, SampleFormat};

use crate::codec_id::CodecId;

/// 编解码器参数
#[derive(Debug, Clone)]
pub struct CodecParameters {
    /// 编解码器标识
    pub codec_id: CodecId,
    /// 额外数据
    pub extra_data: Vec<u8>,
    /// 媒体类型特定参数
    pub params: CodecParamsType,
}

/// 媒体类型特定参数
#[derive(Debug, Clone)]
pub enum CodecParamsType {
    /// 视频参数
    Video(VideoCodecParams),
    /// 音频参数
    Audio(AudioCodecParams),
    /// 无特定参数
    None,
}

/// 视频参数
#[derive(Debug, Clone)]
pub struct VideoCodecParams {
    /// 宽度 (像素)
    pub width: u32,
    /// 高度 (像素)
    pub height: u32,
    /// 像素格式
    pub pixel_format: PixelFormat,
    /// 帧率
    pub frame_rate: Rational,
}

/// 音频参数
#[derive(Debug, Clone)]
pub struct AudioCodecParams {
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 声道布局
    pub channel_layout: ChannelLayout,
    /// 采样格式
    pub sample_format: SampleFormat,
}

impl CodecParameters {
    /// 构造视频参数
    pub fn video(codec_id: CodecId, params: VideoCodecParams) -> Self {
        Self {
            codec_id,
            extra_data: Vec::new(),
            params: CodecParamsType::Video(params),
        }
    }

    /// 构造音频参数
    pub fn audio(codec_id: CodecId, params: AudioCodecParams) -> Self {
        Self {
            codec_id,
            extra_data: Vec::new(),
            params: CodecParamsType::Audio(params),
        }
    }

    /// 获取视频参数 (如果是视频流)
    pub fn as_video(&self) -> Option<&VideoCodecParams> {
        match &self.params {
            CodecParamsType::Video(v) => Some(v),
            _ => None,
        }
    }

    /// 获取音频参数 (如果是音频流)
    pub fn as_audio(&self) -> Option<&AudioCodecParams> {
        match &self.params {
            CodecParamsType::Audio(a) => Some(a),
            _ => None,
        }
    }
}
