//! 旧式 id CIN 后端.
//!
//! 直接按原始尺寸输出 8 位调色板索引, 缩放交给宿主的绘制函数.

use cine_core::CineResult;
use cine_format::{IdCinReader, IoContext};
use log::{info, warn};

use crate::backend::{Backend, BackendKind, FrameStatus, RawFrame, SessionInfo};

/// id CIN 后端
pub struct LegacyBackend {
    info: SessionInfo,
    reader: IdCinReader,
    done: bool,
}

impl LegacyBackend {
    /// 打开文件
    pub fn open(path: &str) -> CineResult<Self> {
        let backend = Self::from_io(IoContext::open_read(path)?)?;
        info!("id CIN 后端打开 {path}");
        Ok(backend)
    }

    /// 从 I/O 上下文打开
    pub fn from_io(io: IoContext) -> CineResult<Self> {
        let reader = IdCinReader::from_io(io)?;
        let header = *reader.header();
        let has_audio = header.has_audio();
        let info = SessionInfo {
            kind: BackendKind::Legacy,
            width: header.width,
            height: header.height,
            fps: reader.fps(),
            channels: if has_audio { header.channels } else { 0 },
            rate: if has_audio { header.sample_rate } else { 0 },
            sample_width: if has_audio { header.sample_width } else { 0 },
            color_bits: 8,
            video_frame_size: header.video_frame_size(),
            audio_frame_size: header.max_audio_frame_size(),
        };
        Ok(Self {
            info,
            reader,
            done: false,
        })
    }

    /// 下一帧的序号
    pub fn frame_index(&self) -> u32 {
        self.reader.frame_index()
    }
}

impl Backend for LegacyBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Legacy
    }

    fn info(&self) -> &SessionInfo {
        &self.info
    }

    /// 压缩帧大小越界原样上抛, 其余读取错误按流结束处理
    fn next_frame(&mut self, out: &mut RawFrame) -> CineResult<FrameStatus> {
        if self.done {
            return Ok(FrameStatus::Done);
        }
        match self.reader.read_frame() {
            Ok(Some(frame)) => {
                out.video = frame.image;
                out.audio = frame.audio;
                out.palette = frame.palette;
                Ok(FrameStatus::MoreData)
            }
            Ok(None) => {
                self.done = true;
                Ok(FrameStatus::Done)
            }
            Err(e) if e.is_fatal() => {
                self.done = true;
                Err(e)
            }
            Err(e) => {
                warn!(
                    "id CIN 第 {} 帧读取失败, 按流结束处理: {e}",
                    self.reader.frame_index()
                );
                self.done = true;
                Ok(FrameStatus::Done)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use cine_format::idcin::{MAX_COMPRESSED_FRAME, PALETTE_SIZE};

    /// 构造一个内存中的 id CIN 流
    ///
    /// 频率表让每个上下文只有符号 0 和 1, 图像每个像素 1 比特.
    pub(crate) fn build_stream(
        width: u32,
        height: u32,
        rate: u32,
        sample_width: u32,
        channels: u32,
        commands: &[i32],
    ) -> Vec<u8> {
        let mut out = Vec::new();
        for v in [width, height, rate, sample_width, channels] {
            out.extend_from_slice(&(v as i32).to_le_bytes());
        }
        for _ in 0..256 {
            let mut row = [0u8; 256];
            row[0] = 1;
            row[1] = 1;
            out.extend_from_slice(&row);
        }

        let pixels = (width * height) as usize;
        let group = (sample_width * channels) as usize;
        for (n, &command) in commands.iter().enumerate() {
            out.extend_from_slice(&command.to_le_bytes());
            if command == 2 {
                break;
            }
            if command == 1 {
                out.extend((0..PALETTE_SIZE).map(|i| (i / 3) as u8));
            }
            let mut block = (pixels as u32).to_le_bytes().to_vec();
            // 像素值为帧序号的最低位
            let bit = (n & 1) as u8;
            block.extend(std::iter::repeat_n(if bit == 1 { 0xFF } else { 0 }, pixels.div_ceil(8)));
            out.extend_from_slice(&(block.len() as i32).to_le_bytes());
            out.extend_from_slice(&block);
            let samples = ((n as u64 + 1) * u64::from(rate) / 14 - n as u64 * u64::from(rate) / 14)
                as usize;
            out.extend(std::iter::repeat_n(0x11u8, samples * group));
        }
        out
    }

    fn open(data: Vec<u8>) -> LegacyBackend {
        LegacyBackend::from_io(IoContext::from_memory(data)).unwrap()
    }

    #[test]
    fn test_两帧后结束() {
        let mut backend = open(build_stream(64, 64, 11025, 2, 1, &[0, 0, 2]));
        let info = backend.info().clone();
        assert_eq!((info.fps, info.color_bits), (14, 8));
        assert_eq!(info.video_frame_size, 64 * 64);

        let mut frame = RawFrame::default();
        assert_eq!(backend.next_frame(&mut frame).unwrap(), FrameStatus::MoreData);
        assert_eq!(frame.video.len(), 4096);
        assert!(frame.video.iter().all(|&p| p == 0));
        assert_eq!(frame.audio.len(), 787 * 2);
        assert_eq!(backend.next_frame(&mut frame).unwrap(), FrameStatus::MoreData);
        assert!(frame.video.iter().all(|&p| p == 1));
        assert_eq!(frame.audio.len(), 788 * 2);
        assert_eq!(backend.next_frame(&mut frame).unwrap(), FrameStatus::Done);
        assert_eq!(backend.next_frame(&mut frame).unwrap(), FrameStatus::Done);
        assert_eq!(backend.frame_index(), 2);
    }

    #[test]
    fn test_调色板随帧交出() {
        let mut backend = open(build_stream(8, 8, 0, 0, 0, &[1, 0, 2]));
        assert!(!backend.info().has_audio());
        let mut frame = RawFrame::default();
        backend.next_frame(&mut frame).unwrap();
        let palette = frame.palette.take().unwrap();
        assert_eq!(palette[3 * 7], 7);
        backend.next_frame(&mut frame).unwrap();
        assert!(frame.palette.is_none());
        assert!(frame.audio.is_empty());
    }

    #[test]
    fn test_帧过大错误上抛() {
        let mut data = build_stream(8, 8, 0, 0, 0, &[]);
        data.extend_from_slice(&0i32.to_le_bytes());
        data.extend_from_slice(&(MAX_COMPRESSED_FRAME as i32 * 2).to_le_bytes());
        let mut backend = open(data);
        let mut frame = RawFrame::default();
        let err = backend.next_frame(&mut frame).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(backend.next_frame(&mut frame).unwrap(), FrameStatus::Done);
    }

    #[test]
    fn test_截断的流按结束处理() {
        let mut data = build_stream(8, 8, 0, 0, 0, &[0]);
        data.extend_from_slice(&0i32.to_le_bytes());
        data.extend_from_slice(&100i32.to_le_bytes());
        data.extend_from_slice(&[0u8; 10]);
        let mut backend = open(data);
        let mut frame = RawFrame::default();
        assert_eq!(backend.next_frame(&mut frame).unwrap(), FrameStatus::MoreData);
        assert_eq!(backend.next_frame(&mut frame).unwrap(), FrameStatus::Done);
    }
}
