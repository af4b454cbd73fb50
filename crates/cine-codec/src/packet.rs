//! 压缩数据包 (Packet).
//!
//! 由解复用器产出, 送入对应流的解码器.

use bytes::Bytes;

/// 压缩数据包
#[derive(Debug, Clone)]
pub struct Packet {
    /// 压缩数据
    pub data: Bytes,
    /// 显示时间戳 (以流时间基为单位, 未知为 -1)
    pub pts: i64,
    /// 所属流的索引
    pub stream_index: usize,
}

impl Packet {
    /// 创建空数据包 (送入解码器表示刷新)
    pub fn empty() -> Self {
        Self {
            data: Bytes::new(),
            pts: -1,
            stream_index: 0,
        }
    }

    /// 从数据创建数据包
    pub fn from_data(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            ..Self::empty()
        }
    }

    /// 设置所属流
    pub fn with_stream(mut self, stream_index: usize) -> Self {
        self.stream_index = stream_index;
        self
    }

    /// 数据大小 (字节)
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 是否为空包
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
