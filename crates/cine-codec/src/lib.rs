//! # cine-codec
//!
//! Cine 过场动画引擎编解码库, 提供 Packet/Frame 抽象、解码器框架和旧式
//! 过场动画使用的自适应一阶 Huffman 解码器.
//!
//! ## 内置解码器
//!
//! - **视频**: RawVideo
//! - **音频**: PCM (U8 / S16LE / F32LE)
//! - **图像块**: 旧式过场动画的 Huffman 压缩块 (见 [`huffman`])
//!
//! ## 使用示例
//!
//! ```rust
//! use cine_codec::{CodecId, CodecRegistry};
//!
//! let mut reg = CodecRegistry::new();
//! cine_codec::register_all(&mut reg);
//! let decoder = reg.create_decoder(CodecId::PcmS16le).unwrap();
//! assert_eq!(decoder.name(), "pcm_s16le");
//! ```

pub mod codec_id;
pub mod codec_parameters;
pub mod decoder;
pub mod decoders;
pub mod frame;
pub mod huffman;
pub mod packet;
pub mod registry;

// 重导出常用类型
pub use codec_id::CodecId;
pub use codec_parameters::{AudioCodecParams, CodecParameters, CodecParamsType, VideoCodecParams};
pub use decoder::Decoder;
pub use frame::{AudioFrame, Frame, VideoFrame};
pub use huffman::{CompressedBlock, HuffmanTable};
pub use packet::Packet;
pub use registry::CodecRegistry;

/// 注册所有内置解码器
pub fn register_all(registry: &mut CodecRegistry) {
    decoders::register_all_decoders(registry);
}
