//! 播放时钟.
//!
//! 控制器只需要单调递增的毫秒数. 实际播放用 [`SystemClock`],
//! 测试用可以手动拨动的 [`ManualClock`].

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// 毫秒时钟
pub trait Clock {
    /// 当前时间 (毫秒), 起点由实现决定
    fn now_ms(&self) -> u64;
}

/// 系统单调时钟, 起点为创建时刻
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// 手动时钟
///
/// 克隆出的句柄共享同一个时间值.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    /// 设置当前时间
    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }

    /// 前进 `ms` 毫秒
    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}
