//! 单个采样到 S16 的转换.
//!
//! 解码器输出的采样均为小端存储.

use cine_core::SampleFormat;

/// 浮点采样转 S16: 乘以 32768 后截断到 i16 范围
#[inline]
pub fn float_to_s16(v: f64) -> i16 {
    (v * 32768.0).clamp(-32768.0, 32767.0) as i16
}

/// 读取 `data` 开头的一个采样并转换为 S16
///
/// `data` 长度至少为该格式的采样字节数.
#[inline]
pub(crate) fn sample_to_s16(data: &[u8], format: SampleFormat) -> i16 {
    match format.to_interleaved() {
        SampleFormat::U8 => (i16::from(data[0]) - 128) << 8,
        SampleFormat::S16 => i16::from_le_bytes([data[0], data[1]]),
        SampleFormat::S32 => (i32::from_le_bytes([data[0], data[1], data[2], data[3]]) >> 16) as i16,
        SampleFormat::F32 => {
            float_to_s16(f64::from(f32::from_le_bytes([data[0], data[1], data[2], data[3]])))
        }
        SampleFormat::F64 => {
            let mut b = [0u8; 8];
            b.copy_from_slice(&data[..8]);
            float_to_s16(f64::from_le_bytes(b))
        }
        _ => 0,
    }
}
