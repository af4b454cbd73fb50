//! # Cine
//!
//! 纯 Rust 实现的过场动画播放引擎.
//!
//! 播放三类过场动画:
//! - **旧式 id CIN**: 自适应哈夫曼压缩的 8 位调色板画面 + 原始 PCM
//! - **MPEG-1**: 通过外部 MPEG-1 解码库
//! - **通用容器**: 任意解封装/解码库, 带缓冲与音视频同步
//!
//! 所有后端对外都是"固定大小的一帧画面 + 一帧音频", 由
//! [`player::PlaybackController`] 按帧率节奏交给宿主输出.
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use cine::player::{PlaybackConfig, PlaybackController, Presenter};
//!
//! struct Null;
//!
//! impl Presenter for Null {
//!     fn upload_palette(&mut self, _palette: &[u8; 768]) {}
//!     fn draw_raw_image(&mut self, _w: u32, _h: u32, _bits: u32, _data: &[u8]) {}
//!     fn queue_audio(&mut self, _s: &[u8], _r: u32, _w: u32, _c: u32, _v: f32) {}
//!     fn finished(&mut self) {}
//! }
//!
//! let registry = cine::default_backend_registry(PlaybackConfig::default());
//! let mut controller = PlaybackController::with_system_clock(registry, Null);
//! controller.open("video/idlog.cin").unwrap();
//! while controller.is_active() {
//!     controller.run(false).unwrap();
//! }
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `cine-core` | 核心类型与工具 |
//! | `cine-codec` | 解码器框架与哈夫曼编解码 |
//! | `cine-format` | I/O 与容器 (含 id CIN) |
//! | `cine-scale` | 画面缩放与 RGBA 转换 |
//! | `cine-resample` | 音频采样格式转换 |
//! | `cine-player` | 播放后端与控制器 |

use std::rc::Rc;

/// 核心类型与工具
pub use cine_core as core;

/// 解码器框架
pub use cine_codec as codec;

/// I/O 与容器格式
pub use cine_format as format;

/// 画面缩放与像素格式转换
pub use cine_scale as scale;

/// 音频采样格式转换
pub use cine_resample as resample;

/// 播放后端与控制器
pub use cine_player as player;

/// 获取 Cine 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// 创建已注册所有内置解码器的注册表
pub fn default_codec_registry() -> cine_codec::CodecRegistry {
    let mut registry = cine_codec::CodecRegistry::new();
    cine_codec::register_all(&mut registry);
    registry
}

/// 创建默认的后端注册表
///
/// 注册通用后端 (内置解码器) 和旧式 id CIN 后端.
/// MPEG-1 后端依赖外部解码库, 需要宿主用 [`player::register_mpeg`] 自行注册.
pub fn default_backend_registry(config: player::PlaybackConfig) -> player::BackendRegistry {
    let mut registry = player::BackendRegistry::new(config);
    player::register_general(&mut registry, Rc::new(player::CodecLibrary::new()));
    player::register_legacy(&mut registry);
    registry
}
