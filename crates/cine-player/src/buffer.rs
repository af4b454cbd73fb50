//! 线性字节缓冲区.
//!
//! 解码线路 (生产者) 在尾部 `pos` 追加, 取帧 (消费者) 从 `curr` 读取,
//! `curr..pos` 为尚未消费的数据. 始终满足 `0 <= curr <= pos <= capacity`.
//!
//! 空间不足时先压缩 (把未读数据挪到开头), 仍不足再扩容到
//! `(capacity + needed) * 2`. 初始容量和扩容都受 `max_capacity` 限制.

use cine_core::{CineError, CineResult};
use log::debug;

/// 带压缩与扩容策略的线性缓冲区
#[derive(Debug)]
pub struct LinearBuffer {
    data: Vec<u8>,
    curr: usize,
    pos: usize,
    max_capacity: usize,
}

impl LinearBuffer {
    /// 创建缓冲区, `capacity` 为初始容量, `max_capacity` 为容量上限
    ///
    /// 初始容量超过上限或分配失败返回 [`CineError::OutOfMemory`].
    pub fn try_new(capacity: usize, max_capacity: usize) -> CineResult<Self> {
        if capacity > max_capacity {
            return Err(CineError::OutOfMemory(format!(
                "缓冲区初始容量 {capacity} 字节超过上限 {max_capacity}"
            )));
        }
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|e| CineError::OutOfMemory(format!("分配 {capacity} 字节缓冲区失败: {e}")))?;
        data.resize(capacity, 0);
        Ok(Self {
            data,
            curr: 0,
            pos: 0,
            max_capacity,
        })
    }

    /// 当前容量
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// 读游标
    pub fn curr(&self) -> usize {
        self.curr
    }

    /// 写游标
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// 未消费的字节数
    pub fn len(&self) -> usize {
        self.pos - self.curr
    }

    pub fn is_empty(&self) -> bool {
        self.pos == self.curr
    }

    /// 未消费的数据
    pub fn unread(&self) -> &[u8] {
        &self.data[self.curr..self.pos]
    }

    /// 把 `curr..pos` 挪到缓冲区开头
    pub fn compact(&mut self) {
        if self.curr == 0 {
            return;
        }
        self.data.copy_within(self.curr..self.pos, 0);
        self.pos -= self.curr;
        self.curr = 0;
    }

    /// 保证尾部至少有 `needed` 字节可写, 返回该可写区域
    ///
    /// 写入完成后调用 [`commit`](Self::commit) 推进写游标.
    /// 超过扩容上限或分配失败返回 [`CineError::OutOfMemory`], 缓冲区内容不变.
    pub fn reserve_tail(&mut self, needed: usize) -> CineResult<&mut [u8]> {
        if self.pos + needed > self.capacity() && self.curr > 0 {
            self.compact();
        }
        if self.pos + needed > self.capacity() {
            self.grow(needed)?;
        }
        Ok(&mut self.data[self.pos..self.pos + needed])
    }

    /// 推进写游标 `n` 字节
    ///
    /// `n` 不能超过上一次 `reserve_tail` 返回的长度.
    pub fn commit(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.capacity());
    }

    /// 追加数据
    pub fn push(&mut self, bytes: &[u8]) -> CineResult<()> {
        self.reserve_tail(bytes.len())?.copy_from_slice(bytes);
        self.commit(bytes.len());
        Ok(())
    }

    /// 从读游标拷贝至多 `dst.len()` 字节, 返回实际拷贝的字节数
    ///
    /// 数据读空时两个游标同时归零.
    pub fn read_into(&mut self, dst: &mut [u8]) -> usize {
        let n = dst.len().min(self.len());
        dst[..n].copy_from_slice(&self.data[self.curr..self.curr + n]);
        self.curr += n;
        if self.curr >= self.pos {
            self.curr = 0;
            self.pos = 0;
        }
        n
    }

    fn grow(&mut self, needed: usize) -> CineResult<()> {
        let new_cap = self
            .capacity()
            .checked_add(needed)
            .and_then(|v| v.checked_mul(2))
            .ok_or_else(|| CineError::OutOfMemory("缓冲区容量溢出".into()))?;
        if new_cap > self.max_capacity {
            return Err(CineError::OutOfMemory(format!(
                "缓冲区扩容到 {new_cap} 字节超过上限 {}",
                self.max_capacity
            )));
        }
        self.data
            .try_reserve_exact(new_cap - self.data.len())
            .map_err(|e| CineError::OutOfMemory(format!("缓冲区扩容到 {new_cap} 字节失败: {e}")))?;
        debug!("缓冲区扩容: {} → {new_cap} 字节", self.capacity());
        self.data.resize(new_cap, 0);
        Ok(())
    }
}
