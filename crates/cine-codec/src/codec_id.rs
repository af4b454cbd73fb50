//! 编解码器标识符.

use cine_core::MediaType;
use std::fmt;

/// 编解码器标识符
///
/// 只收录过场动画可能出现的编码.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CodecId {
    /// 未知编解码器
    None,

    // ========================
    // 视频
    // ========================
    /// 未压缩原始像素
    RawVideo,
    /// MPEG-1 Video
    Mpeg1Video,
    /// Theora
    Theora,
    /// id CIN 自适应 Huffman 压缩的调色板图像
    IdCinVideo,

    // ========================
    // 音频
    // ========================
    /// PCM 无符号 8 位
    PcmU8,
    /// PCM 有符号 16 位小端
    PcmS16le,
    /// PCM 32 位浮点小端
    PcmF32le,
    /// MP2 (MPEG Audio Layer II)
    Mp2,
    /// Vorbis
    Vorbis,
}

impl CodecId {
    /// 获取编解码器对应的媒体类型
    pub const fn media_type(&self) -> MediaType {
        match self {
            Self::None => MediaType::Data,
            Self::RawVideo | Self::Mpeg1Video | Self::Theora | Self::IdCinVideo => MediaType::Video,
            Self::PcmU8 | Self::PcmS16le | Self::PcmF32le | Self::Mp2 | Self::Vorbis => {
                MediaType::Audio
            }
        }
    }

    /// 获取编解码器名称
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::RawVideo => "rawvideo",
            Self::Mpeg1Video => "mpeg1video",
            Self::Theora => "theora",
            Self::IdCinVideo => "idcin",
            Self::PcmU8 => "pcm_u8",
            Self::PcmS16le => "pcm_s16le",
            Self::PcmF32le => "pcm_f32le",
            Self::Mp2 => "mp2",
            Self::Vorbis => "vorbis",
        }
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
