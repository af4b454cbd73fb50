//! 播放配置.
//!
//! 所有字段都有默认值, JSON 中缺省的字段取默认值.

use std::path::Path;

use cine_core::{CineError, CineResult};
use serde::{Deserialize, Serialize};

/// 播放配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// 输出宽度上限, 0 表示不限制
    pub max_width: u32,
    /// 输出高度上限, 0 表示不限制
    pub max_height: u32,
    /// 音量 (0.0 ~ 1.0), 原样传给音频输出
    pub volume: f32,
    /// 缓冲音频超过 `fps × 该值` 帧时暂停解码
    pub audio_async_threshold: f64,
    /// 缓冲视频超过 `fps × 该值` 帧时暂停解码
    pub video_async_threshold: f64,
    /// 单个缓冲区的扩容上限 (字节)
    pub max_buffer_bytes: usize,
    /// 通用后端尝试的备选扩展名, 按优先级排列
    pub general_extensions: Vec<String>,
    /// 静态图片扩展名, 不由播放器处理
    pub image_extensions: Vec<String>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            max_width: 0,
            max_height: 0,
            volume: 1.0,
            audio_async_threshold: 3.0,
            video_async_threshold: 1.5,
            max_buffer_bytes: 256 * 1024 * 1024,
            general_extensions: ["ogv", "mpg", "mp4", "avi", "mkv"]
                .into_iter()
                .map(String::from)
                .collect(),
            image_extensions: ["pcx", "tga", "png", "jpg"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl PlaybackConfig {
    /// 从 JSON 字符串解析
    pub fn from_json_str(s: &str) -> CineResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| CineError::InvalidArgument(format!("播放配置解析失败: {e}")))
    }

    /// 从 JSON 文件加载
    pub fn load(path: impl AsRef<Path>) -> CineResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// 序列化为格式化的 JSON
    pub fn to_json_pretty(&self) -> CineResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CineError::Internal(format!("播放配置序列化失败: {e}")))
    }

    /// 是否为静态图片扩展名 (不区分大小写)
    pub fn is_image_extension(&self, ext: &str) -> bool {
        self.image_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}
