//! 只读 I/O 抽象层.
//!
//! 过场动画只需要顺序读取, 因此只保留读取相关的接口.
//! 文件与内存两种后端共用带缓冲的 [`IoContext`].

use std::io::{self, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use cine_core::{CineError, CineResult};

/// I/O 后端 trait
///
/// 实现此 trait 以支持不同的数据来源 (文件、内存、虚拟文件系统等).
pub trait IoBackend: Send {
    /// 读取数据到缓冲区, 返回 0 表示末尾
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    /// 获取总大小 (如果可知)
    fn size(&self) -> Option<u64>;
}

/// 默认缓冲区大小 (32 KB)
const DEFAULT_BUFFER_SIZE: usize = 32 * 1024;

/// 带缓冲的只读 I/O 上下文
pub struct IoContext {
    inner: Box<dyn IoBackend>,
    buffer: Vec<u8>,
    buf_len: usize,
    buf_pos: usize,
    /// 已交付给调用方的字节数
    position: u64,
}

impl IoContext {
    /// 从 I/O 后端创建上下文
    pub fn new(backend: Box<dyn IoBackend>) -> Self {
        Self {
            inner: backend,
            buffer: vec![0u8; DEFAULT_BUFFER_SIZE],
            buf_len: 0,
            buf_pos: 0,
            position: 0,
        }
    }

    /// 从文件路径打开
    pub fn open_read(path: &str) -> CineResult<Self> {
        let file = std::fs::File::open(path)?;
        Ok(Self::new(Box::new(FileBackend::new(file))))
    }

    /// 从内存数据创建
    pub fn from_memory(data: Vec<u8>) -> Self {
        Self::new(Box::new(MemoryBackend::from_data(data)))
    }

    /// 读满缓冲区, 数据不足时返回 `Eof`
    pub fn read_exact(&mut self, buf: &mut [u8]) -> CineResult<()> {
        Read::read_exact(self, buf).map_err(map_eof)
    }

    /// 读取 i32 小端
    pub fn read_i32_le(&mut self) -> CineResult<i32> {
        self.read_i32::<LittleEndian>().map_err(map_eof)
    }

    /// 读取 u32 小端
    pub fn read_u32_le(&mut self) -> CineResult<u32> {
        self.read_u32::<LittleEndian>().map_err(map_eof)
    }

    /// 读取指定字节数
    pub fn read_bytes(&mut self, count: usize) -> CineResult<Vec<u8>> {
        let mut buf = vec![0u8; count];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// 跳过指定字节数
    pub fn skip(&mut self, mut count: usize) -> CineResult<()> {
        let mut scratch = [0u8; 4096];
        while count > 0 {
            let n = count.min(scratch.len());
            self.read_exact(&mut scratch[..n])?;
            count -= n;
        }
        Ok(())
    }

    /// 当前读取位置
    pub fn position(&self) -> u64 {
        self.position
    }

    /// 数据总大小 (如果可知)
    pub fn size(&self) -> Option<u64> {
        self.inner.size()
    }
}

impl Read for IoContext {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.buf_pos >= self.buf_len {
            // 大块读取直接绕过缓冲区
            if buf.len() >= self.buffer.len() {
                let n = self.inner.read(buf)?;
                self.position += n as u64;
                return Ok(n);
            }
            self.buf_pos = 0;
            self.buf_len = self.inner.read(&mut self.buffer)?;
            if self.buf_len == 0 {
                return Ok(0);
            }
        }
        let n = (self.buf_len - self.buf_pos).min(buf.len());
        buf[..n].copy_from_slice(&self.buffer[self.buf_pos..self.buf_pos + n]);
        self.buf_pos += n;
        self.position += n as u64;
        Ok(n)
    }
}

fn map_eof(e: io::Error) -> CineError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        CineError::Eof
    } else {
        CineError::Io(e)
    }
}

/// 文件 I/O 后端
struct FileBackend {
    file: std::fs::File,
    size: Option<u64>,
}

impl FileBackend {
    fn new(file: std::fs::File) -> Self {
        let size = file.metadata().ok().map(|m| m.len());
        Self { file, size }
    }
}

impl IoBackend for FileBackend {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn size(&self) -> Option<u64> {
        self.size
    }
}

/// 内存 I/O 后端
pub struct MemoryBackend {
    data: Vec<u8>,
    pos: usize,
}

impl MemoryBackend {
    /// 从已有数据创建
    pub fn from_data(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }
}

impl IoBackend for MemoryBackend {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.data.len().saturating_sub(self.pos);
        let n = buf.len().min(available);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn size(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_内存读取小端整数() {
        let mut data = Vec::new();
        data.extend_from_slice(&(-2i32).to_le_bytes());
        data.extend_from_slice(&0x1234_5678u32.to_le_bytes());
        let mut io = IoContext::from_memory(data);
        assert_eq!(io.read_i32_le().unwrap(), -2);
        assert_eq!(io.read_u32_le().unwrap(), 0x1234_5678);
        assert_eq!(io.position(), 8);
        assert!(matches!(io.read_i32_le(), Err(CineError::Eof)));
    }

    #[test]
    fn test_跨缓冲区边界读取() {
        let data: Vec<u8> = (0..DEFAULT_BUFFER_SIZE * 2 + 7)
            .map(|i| (i % 251) as u8)
            .collect();
        let mut io = IoContext::from_memory(data.clone());
        io.skip(DEFAULT_BUFFER_SIZE - 3).unwrap();
        let chunk = io.read_bytes(10).unwrap();
        assert_eq!(chunk[..], data[DEFAULT_BUFFER_SIZE - 3..DEFAULT_BUFFER_SIZE + 7]);
        let rest = io.read_bytes(DEFAULT_BUFFER_SIZE).unwrap();
        assert_eq!(rest[..], data[DEFAULT_BUFFER_SIZE + 7..]);
        assert!(matches!(io.read_bytes(1), Err(CineError::Eof)));
    }

    #[test]
    fn test_打开不存在的文件返回_io_错误() {
        let err = IoContext::open_read("/nonexistent/cine/file.cin")
            .err()
            .unwrap();
        assert!(matches!(err, CineError::Io(_)));
    }
}
