//! # cine-format
//!
//! Cine 过场动画引擎容器读取库.
//!
//! 提供只读 I/O 抽象 ([`IoContext`])、通用解复用器接口 ([`Demuxer`]) 和
//! 旧式 id CIN 过场动画容器读取器 ([`idcin::IdCinReader`]).

pub mod demuxer;
pub mod idcin;
pub mod io;
pub mod stream;

// 重导出常用类型
pub use demuxer::Demuxer;
pub use idcin::{IdCinHeader, IdCinReader, LegacyFrame};
pub use io::{IoBackend, IoContext, MemoryBackend};
pub use stream::{AudioStreamParams, Stream, StreamParams, VideoStreamParams};
