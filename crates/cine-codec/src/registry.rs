//! 解码器注册表.

use std::collections::HashMap;

use cine_core::{CineError, CineResult};

use crate::codec_id::CodecId;
use crate::decoder::Decoder;

/// 解码器工厂函数类型
pub type DecoderFactory = fn() -> CineResult<Box<dyn Decoder>>;

/// 解码器注册条目
struct DecoderEntry {
    name: String,
    factory: DecoderFactory,
}

/// 解码器注册表
///
/// 同一 CodecId 可注册多个实现, 先注册者优先.
#[derive(Default)]
pub struct CodecRegistry {
    decoders: HashMap<CodecId, Vec<DecoderEntry>>,
}

impl CodecRegistry {
    /// 创建空的注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个解码器
    pub fn register_decoder(
        &mut self,
        codec_id: CodecId,
        name: impl Into<String>,
        factory: DecoderFactory,
    ) {
        self.decoders
            .entry(codec_id)
            .or_default()
            .push(DecoderEntry {
                name: name.into(),
                factory,
            });
    }

    /// 创建指定编解码器的解码器实例
    pub fn create_decoder(&self, codec_id: CodecId) -> CineResult<Box<dyn Decoder>> {
        let entry = self
            .decoders
            .get(&codec_id)
            .and_then(|entries| entries.first())
            .ok_or_else(|| CineError::CodecNotFound(format!("未找到 {codec_id} 的解码器")))?;
        (entry.factory)()
    }

    /// 是否注册了指定编解码器
    pub fn has_decoder(&self, codec_id: CodecId) -> bool {
        self.decoders.contains_key(&codec_id)
    }

    /// 获取所有已注册的解码器名称
    pub fn list_decoders(&self) -> Vec<(CodecId, &str)> {
        self.decoders
            .iter()
            .flat_map(|(id, entries)| entries.iter().map(move |e| (*id, e.name.as_str())))
            .collect()
    }
}
