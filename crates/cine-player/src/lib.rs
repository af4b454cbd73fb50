//! # cine-player
//!
//! Cine 过场动画播放控制.
//!
//! - [`LinearBuffer`]: 带压缩与扩容策略的线性缓冲区
//! - [`Backend`]: 三种播放后端的统一拉帧接口
//!   ([`LegacyBackend`]、[`MpegBackend`]、[`GeneralBackend`])
//! - [`BackendRegistry`]: 按优先级尝试候选后端
//! - [`PlaybackController`]: 帧节奏、丢帧同步与生命周期
//!
//! 单线程同步运行, 所有调用都在宿主的渲染循环中完成.

pub mod backend;
pub mod buffer;
pub mod clock;
pub mod config;
pub mod controller;
pub mod general;
pub mod legacy;
pub mod mpeg;
pub mod presenter;
pub mod registry;

use std::rc::Rc;

// 重导出常用类型
pub use backend::{Backend, BackendKind, FrameStatus, RawFrame, SessionInfo};
pub use buffer::LinearBuffer;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::PlaybackConfig;
pub use controller::{Opened, PlaybackController, PlaybackState, PlaybackStats};
pub use general::{CodecLibrary, GeneralBackend, MediaLibrary};
pub use legacy::LegacyBackend;
pub use mpeg::{Mpeg1Decoder, Mpeg1Library, MpegBackend};
pub use presenter::Presenter;
pub use registry::{BackendRegistry, OpenOutcome};

/// 注册通用后端
pub fn register_general(registry: &mut BackendRegistry, library: Rc<dyn MediaLibrary>) {
    registry.register(
        BackendKind::General,
        Box::new(move |path: &str, config: &PlaybackConfig| {
            let backend = GeneralBackend::open(library.as_ref(), path, config)?;
            Ok(Box::new(backend) as Box<dyn Backend>)
        }),
    );
}

/// 注册 MPEG-1 后端
pub fn register_mpeg(registry: &mut BackendRegistry, library: Rc<dyn Mpeg1Library>) {
    registry.register(
        BackendKind::Mpeg,
        Box::new(move |path: &str, config: &PlaybackConfig| {
            let backend = MpegBackend::open(library.as_ref(), path, config)?;
            Ok(Box::new(backend) as Box<dyn Backend>)
        }),
    );
}

/// 注册旧式 id CIN 后端
pub fn register_legacy(registry: &mut BackendRegistry) {
    registry.register(
        BackendKind::Legacy,
        Box::new(|path: &str, _: &PlaybackConfig| {
            let backend = LegacyBackend::open(path)?;
            Ok(Box::new(backend) as Box<dyn Backend>)
        }),
    );
}
