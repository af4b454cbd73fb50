//! 比特流读取器.
//!
//! 按小端位序读取 (LSB first): 每个字节从最低位开始消费.
//! 旧式过场动画的 Huffman 码流即采用该位序.

use crate::{CineError, CineResult};

/// 小端位序比特流读取器
///
/// # 示例
/// ```
/// use cine_core::bitreader::BitReader;
///
/// let data = [0b1011_0010];
/// let mut br = BitReader::new(&data);
/// assert_eq!(br.read_bits(1).unwrap(), 0);
/// assert_eq!(br.read_bits(3).unwrap(), 0b001);
/// assert_eq!(br.read_bits(4).unwrap(), 0b1011);
/// ```
pub struct BitReader<'a> {
    /// 源数据
    data: &'a [u8],
    /// 已读取的总位数
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    /// 创建新的比特流读取器
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    /// 获取已读取的总位数
    pub fn bits_read(&self) -> usize {
        self.bit_pos
    }

    /// 获取剩余可读位数
    pub fn bits_left(&self) -> usize {
        self.data
            .len()
            .saturating_mul(8)
            .saturating_sub(self.bit_pos)
    }

    /// 是否已到达末尾
    pub fn is_eof(&self) -> bool {
        self.bits_left() == 0
    }

    /// 读取 1 个位, 到达末尾时返回 `None`
    ///
    /// 热路径上使用, 避免构造错误值.
    #[inline]
    pub fn next_bit(&mut self) -> Option<u8> {
        let byte = *self.data.get(self.bit_pos / 8)?;
        let bit = (byte >> (self.bit_pos % 8)) & 1;
        self.bit_pos += 1;
        Some(bit)
    }

    /// 读取 1 个位
    pub fn read_bit(&mut self) -> CineResult<u32> {
        self.next_bit().map(u32::from).ok_or(CineError::Eof)
    }

    /// 读取 N 个位 (最多 32 位)
    ///
    /// 先读出的位放在返回值的低位.
    pub fn read_bits(&mut self, n: u32) -> CineResult<u32> {
        if n == 0 {
            return Ok(0);
        }
        if n > 32 {
            return Err(CineError::InvalidArgument(format!(
                "read_bits: n={n} 超过 32 位",
            )));
        }
        if self.bits_left() < n as usize {
            return Err(CineError::Eof);
        }

        let mut out = 0u32;
        for i in 0..n {
            let bit_idx = self.bit_pos + i as usize;
            let bit = (self.data[bit_idx / 8] >> (bit_idx % 8)) & 1;
            out |= u32::from(bit) << i;
        }
        self.bit_pos += n as usize;
        Ok(out)
    }

    /// 跳过 N 个位
    pub fn skip_bits(&mut self, n: usize) -> CineResult<()> {
        if self.bits_left() < n {
            return Err(CineError::Eof);
        }
        self.bit_pos += n;
        Ok(())
    }
}
