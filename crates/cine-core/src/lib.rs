//! # cine-core
//!
//! Cine 过场动画引擎核心库, 提供基础类型定义、错误处理和位流工具.
//!
//! 所有其他 cine crate 都依赖本 crate 提供的像素/采样格式、有理数与统一错误类型.

pub mod bitreader;
pub mod channel_layout;
pub mod error;
pub mod media_type;
pub mod pixel_format;
pub mod rational;
pub mod sample_format;

// 重导出常用类型
pub use channel_layout::ChannelLayout;
pub use error::{CineError, CineResult};
pub use media_type::MediaType;
pub use pixel_format::PixelFormat;
pub use rational::Rational;
pub use sample_format::SampleFormat;
