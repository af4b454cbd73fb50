//! 统一错误类型定义.
//!
//! 所有 cine crate 共用的错误类型, 支持跨模块传播.

use thiserror::Error;

/// Cine 引擎统一错误类型
#[derive(Debug, Error)]
pub enum CineError {
    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// 不支持的操作或不可播放的流
    #[error("不支持的操作: {0}")]
    Unsupported(String),

    /// 编解码器错误
    #[error("编解码器错误: {0}")]
    Codec(String),

    /// 容器格式错误
    #[error("格式错误: {0}")]
    Format(String),

    /// I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 数据不足, 需要更多输入
    #[error("数据不足, 需要更多输入")]
    NeedMoreData,

    /// 已到达流末尾
    #[error("已到达流末尾")]
    Eof,

    /// 内存分配失败
    #[error("内存分配失败: {0}")]
    OutOfMemory(String),

    /// 未找到指定的编解码器
    #[error("未找到编解码器: {0}")]
    CodecNotFound(String),

    /// 未找到指定的容器格式
    #[error("未找到容器格式: {0}")]
    FormatNotFound(String),

    /// 未找到指定的流
    #[error("未找到流: 索引 {0}")]
    StreamNotFound(usize),

    /// 无效数据 (损坏的码流等)
    #[error("无效数据: {0}")]
    InvalidData(String),

    /// 压缩帧大小超出固定上限, 整个播放无法继续
    #[error("压缩帧大小非法: {size} (上限 {max})")]
    FrameTooLarge { size: i64, max: usize },

    /// 所有候选后端都无法打开该文件
    #[error("找不到可用的播放后端: {0}")]
    BackendNotFound(String),

    /// 内部错误 (不应发生)
    #[error("内部错误: {0}")]
    Internal(String),
}

impl CineError {
    /// 是否为整个播放的致命错误
    ///
    /// 致命错误需要上抛给引擎, 其余错误都可以降级为流结束.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::FrameTooLarge { .. })
    }
}

/// Cine 引擎统一 Result 类型
pub type CineResult<T> = Result<T, CineError>;
