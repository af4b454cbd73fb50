//! id CIN 旧式过场动画容器读取器.
//!
//! 固定 14 fps, 8 位调色板图像 + 未压缩 PCM 音频. 所有整数均为小端.
//!
//! 文件结构:
//! ```text
//! 头部:    i32 width, i32 height, i32 sample_rate, i32 sample_width, i32 channels
//! Huffman: 256 行 × 256 字节的频率表 (每个上下文一行)
//! 帧*:     i32 command          (1 = 后跟调色板, 2 = 结束, 其他 = 普通帧)
//!          [command == 1: 768 字节调色板]
//!          i32 compressed_size
//!          compressed_size 字节 Huffman 压缩图像 (前 4 字节为解压后长度)
//!          N 个 PCM 采样 (N 为本帧应得的采样数, 每个 sample_width × channels 字节)
//! ```

use byteorder::{ByteOrder, LittleEndian};
use cine_codec::huffman::{CompressedBlock, FrequencyTable, HuffmanTable, NUM_CONTEXTS};
use cine_core::{CineError, CineResult};
use log::{debug, info};

use crate::io::IoContext;

/// 固定帧率
pub const IDCIN_FPS: u32 = 14;

/// 单帧压缩数据的最大长度
pub const MAX_COMPRESSED_FRAME: usize = 0x20000;

/// 调色板长度 (256 × RGB)
pub const PALETTE_SIZE: usize = 768;

/// 允许的最大图像边长
const MAX_DIMENSION: u32 = 4096;

const COMMAND_PALETTE: i32 = 1;
const COMMAND_END: i32 = 2;

/// 文件头
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdCinHeader {
    /// 图像宽度
    pub width: u32,
    /// 图像高度
    pub height: u32,
    /// 采样率 (0 表示无音频)
    pub sample_rate: u32,
    /// 每个采样的字节数 (1 或 2)
    pub sample_width: u32,
    /// 声道数
    pub channels: u32,
}

impl IdCinHeader {
    /// 是否带音频
    pub fn has_audio(&self) -> bool {
        self.sample_rate > 0
    }

    /// 一帧图像的字节数
    pub fn video_frame_size(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// 每个采样组 (全部声道) 的字节数
    pub fn sample_group_size(&self) -> usize {
        self.sample_width as usize * self.channels as usize
    }

    /// 第 `index` 帧应得的采样数
    ///
    /// 按 `[n*rate/14, (n+1)*rate/14)` 计算, 累计采样数不会漂移.
    pub fn samples_for_frame(&self, index: u32) -> usize {
        let rate = u64::from(self.sample_rate);
        let fps = u64::from(IDCIN_FPS);
        let n = u64::from(index);
        ((n + 1) * rate / fps - n * rate / fps) as usize
    }

    /// 单帧音频的最大字节数
    pub fn max_audio_frame_size(&self) -> usize {
        (self.sample_rate as usize).div_ceil(IDCIN_FPS as usize) * self.sample_group_size()
    }

    fn validate(&self) -> CineResult<()> {
        if self.width == 0
            || self.height == 0
            || self.width > MAX_DIMENSION
            || self.height > MAX_DIMENSION
        {
            return Err(CineError::InvalidData(format!(
                "id CIN 图像尺寸非法: {}x{}",
                self.width, self.height
            )));
        }
        if self.has_audio() {
            if !matches!(self.sample_width, 1 | 2) {
                return Err(CineError::InvalidData(format!(
                    "id CIN 采样宽度非法: {}",
                    self.sample_width
                )));
            }
            if !matches!(self.channels, 1 | 2) {
                return Err(CineError::InvalidData(format!(
                    "id CIN 声道数非法: {}",
                    self.channels
                )));
            }
        }
        Ok(())
    }
}

/// 读出的一帧
#[derive(Debug, Clone)]
pub struct LegacyFrame {
    /// 帧序号 (从 0 开始)
    pub index: u32,
    /// 调色板索引图像, 恰好 `width × height` 字节
    pub image: Vec<u8>,
    /// 本帧更换的调色板
    pub palette: Option<Box<[u8; PALETTE_SIZE]>>,
    /// 本帧应得的 PCM 数据, 16 位采样已转为本机字节序
    pub audio: Vec<u8>,
}

/// id CIN 读取器
///
/// 持有 I/O 上下文和 Huffman 表, 按顺序逐帧读取.
pub struct IdCinReader {
    io: IoContext,
    header: IdCinHeader,
    table: HuffmanTable,
    frame_index: u32,
    finished: bool,
}

impl IdCinReader {
    /// 打开文件
    pub fn open(path: &str) -> CineResult<Self> {
        Self::from_io(IoContext::open_read(path)?)
    }

    /// 从 I/O 上下文读取头部和 Huffman 表
    pub fn from_io(mut io: IoContext) -> CineResult<Self> {
        let mut fields = [0u32; 5];
        for f in fields.iter_mut() {
            let v = io.read_i32_le()?;
            *f = u32::try_from(v)
                .map_err(|_| CineError::InvalidData(format!("id CIN 头部字段为负: {v}")))?;
        }
        let header = IdCinHeader {
            width: fields[0],
            height: fields[1],
            sample_rate: fields[2],
            sample_width: fields[3],
            channels: fields[4],
        };
        header.validate()?;

        let mut freq: Box<FrequencyTable> = vec![[0u8; 256]; NUM_CONTEXTS]
            .into_boxed_slice()
            .try_into()
            .map_err(|_| CineError::Internal("频率表长度错误".into()))?;
        for row in freq.iter_mut() {
            io.read_exact(row)?;
        }
        let table = HuffmanTable::build(&freq);

        info!(
            "打开 id CIN: {}x{}, 音频 {} Hz / {} 字节 / {} 声道",
            header.width, header.height, header.sample_rate, header.sample_width, header.channels,
        );
        Ok(Self {
            io,
            header,
            table,
            frame_index: 0,
            finished: false,
        })
    }

    /// 文件头
    pub fn header(&self) -> &IdCinHeader {
        &self.header
    }

    /// 帧率
    pub fn fps(&self) -> u32 {
        IDCIN_FPS
    }

    /// 下一帧的序号
    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    /// 读取下一帧, 遇到结束命令返回 `None`
    ///
    /// 压缩帧大小越界返回 [`CineError::FrameTooLarge`], 属于致命错误.
    pub fn read_frame(&mut self) -> CineResult<Option<LegacyFrame>> {
        if self.finished {
            return Ok(None);
        }

        let command = match self.io.read_i32_le() {
            Ok(c) => c,
            Err(CineError::Eof) => {
                debug!("id CIN 在第 {} 帧处没有结束命令", self.frame_index);
                self.finished = true;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        if command == COMMAND_END {
            debug!("id CIN 结束命令, 共 {} 帧", self.frame_index);
            self.finished = true;
            return Ok(None);
        }

        let palette = if command == COMMAND_PALETTE {
            let mut pal = Box::new([0u8; PALETTE_SIZE]);
            self.io.read_exact(&mut pal[..])?;
            Some(pal)
        } else {
            None
        };

        let size = self.io.read_i32_le()?;
        if size < 1 || size as usize > MAX_COMPRESSED_FRAME {
            return Err(CineError::FrameTooLarge {
                size: i64::from(size),
                max: MAX_COMPRESSED_FRAME,
            });
        }
        let compressed = self.io.read_bytes(size as usize)?;

        let frame_size = self.header.video_frame_size();
        let decoded = self
            .table
            .decompress(&CompressedBlock::new(compressed), frame_size)?;
        let mut image = decoded.data;
        image.resize(frame_size, 0);

        let audio = self.read_audio()?;

        let frame = LegacyFrame {
            index: self.frame_index,
            image,
            palette,
            audio,
        };
        self.frame_index += 1;
        Ok(Some(frame))
    }

    fn read_audio(&mut self) -> CineResult<Vec<u8>> {
        if !self.header.has_audio() {
            return Ok(Vec::new());
        }
        let samples = self.header.samples_for_frame(self.frame_index);
        let raw = self.io.read_bytes(samples * self.header.sample_group_size())?;
        if self.header.sample_width != 2 {
            return Ok(raw);
        }

        // 16 位采样在文件中为小端, 转为本机字节序
        let mut pcm = vec![0i16; raw.len() / 2];
        LittleEndian::read_i16_into(&raw, &mut pcm);
        Ok(pcm.iter().flat_map(|s| s.to_ne_bytes()).collect())
    }
}
