//! 解码器 trait 定义.

use cine_core::CineResult;

use crate::codec_id::CodecId;
use crate::codec_parameters::CodecParameters;
use crate::frame::Frame;
use crate::packet::Packet;

/// 解码器 trait
///
/// 解码流程:
/// 1. `send_packet()` 送入压缩数据
/// 2. 反复 `receive_frame()` 直到返回 `NeedMoreData`
/// 3. 送入空包刷新, 再取出剩余帧直到 `Eof`
pub trait Decoder: Send {
    /// 获取解码器标识
    fn codec_id(&self) -> CodecId;

    /// 获取解码器名称
    fn name(&self) -> &str;

    /// 使用参数配置解码器
    fn open(&mut self, _params: &CodecParameters) -> CineResult<()> {
        Ok(())
    }

    /// 送入一个压缩数据包, 空包表示刷新
    fn send_packet(&mut self, packet: &Packet) -> CineResult<()>;

    /// 取出一帧解码数据
    ///
    /// - `Err(CineError::NeedMoreData)`: 需要送入更多数据包
    /// - `Err(CineError::Eof)`: 刷新后所有帧已取出
    fn receive_frame(&mut self) -> CineResult<Frame>;

    /// 清空内部状态
    fn flush(&mut self);
}
