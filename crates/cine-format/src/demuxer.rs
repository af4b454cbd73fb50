//! 解复用器 (Demuxer) trait 定义.

use cine_codec::Packet;
use cine_core::CineResult;

use crate::stream::Stream;

/// 解复用器 trait
///
/// 播放只需要顺序读取, 不支持定位.
///
/// 使用流程:
/// 1. 由外部媒体库打开容器并解析头部
/// 2. 调用 `streams()` 获取流信息
/// 3. 循环调用 `read_packet()` 直到返回 `Eof`
pub trait Demuxer: Send {
    /// 格式名称
    fn name(&self) -> &str;

    /// 所有流信息
    fn streams(&self) -> &[Stream];

    /// 读取下一个数据包
    ///
    /// - `Err(CineError::Eof)`: 已到达末尾
    fn read_packet(&mut self) -> CineResult<Packet>;
}
