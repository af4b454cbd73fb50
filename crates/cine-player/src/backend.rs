//! 播放后端接口.
//!
//! 三种后端 (旧式 id CIN、MPEG-1、通用容器) 统一实现 [`Backend`],
//! 控制器每次拉取一帧定长的视频和音频数据.

use std::fmt;

use cine_core::CineResult;
use cine_format::idcin::PALETTE_SIZE;
use serde::Serialize;

/// 后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// 旧式 id CIN 容器 (14 fps, 8 位调色板)
    Legacy,
    /// MPEG-1 解码库
    Mpeg,
    /// 通用解复用/解码库
    General,
}

impl BackendKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Mpeg => "mpeg",
            Self::General => "general",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 打开后的会话参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    /// 后端类型
    pub kind: BackendKind,
    /// 输出宽度
    pub width: u32,
    /// 输出高度
    pub height: u32,
    /// 帧率 (整数)
    pub fps: u32,
    /// 声道数, 无音频为 0
    pub channels: u32,
    /// 采样率, 无音频为 0
    pub rate: u32,
    /// 每个采样的字节数
    pub sample_width: u32,
    /// 每像素位数: 调色板输出为 8, RGBA 为 32
    pub color_bits: u32,
    /// 一帧视频的字节数
    pub video_frame_size: usize,
    /// 一帧音频的字节数 (旧式容器为最大值, 实际随帧序号变化)
    pub audio_frame_size: usize,
}

impl SessionInfo {
    pub fn has_audio(&self) -> bool {
        self.channels > 0 && self.rate > 0
    }
}

/// 一帧原始输出
#[derive(Debug, Clone, Default)]
pub struct RawFrame {
    /// 视频数据 (RGBA 或调色板索引)
    pub video: Vec<u8>,
    /// 交错 PCM, 本机字节序
    pub audio: Vec<u8>,
    /// 本帧开始使用的新调色板
    pub palette: Option<Box<[u8; PALETTE_SIZE]>>,
}

/// 拉取结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// 已写入一帧, 之后可能还有
    MoreData,
    /// 播放结束, 没有写入任何数据
    Done,
}

/// 播放后端
///
/// 打开由各后端的构造函数完成, 会话在 drop 时关闭.
pub trait Backend {
    /// 后端类型
    fn kind(&self) -> BackendKind;

    /// 会话参数
    fn info(&self) -> &SessionInfo;

    /// 拉取下一帧
    ///
    /// 返回 `MoreData` 时 `out.video` 恰好为 `video_frame_size` 字节.
    /// 返回 `Done` 后再次调用仍返回 `Done`. 只有致命错误才返回 `Err`.
    fn next_frame(&mut self, out: &mut RawFrame) -> CineResult<FrameStatus>;
}
