//! RAW 视频解码器.
//!
//! 每个数据包恰好是一帧未压缩像素, 只按像素格式拆分平面.

use cine_core::{CineError, CineResult, PixelFormat};
use log::debug;

use crate::codec_id::CodecId;
use crate::codec_parameters::CodecParameters;
use crate::decoder::Decoder;
use crate::frame::{Frame, VideoFrame};
use crate::packet::Packet;

/// 单个平面的布局 (每行字节数, 行数)
#[derive(Debug, Clone, Copy)]
struct PlaneLayout {
    linesize: usize,
    rows: usize,
}

/// RAW 视频解码器
pub struct RawVideoDecoder {
    width: u32,
    height: u32,
    pixel_format: PixelFormat,
    planes: Vec<PlaneLayout>,
    frame_size: usize,
    pending: Option<Frame>,
    opened: bool,
    draining: bool,
}

impl RawVideoDecoder {
    /// 工厂函数
    pub fn create() -> CineResult<Box<dyn Decoder>> {
        Ok(Box::new(Self {
            width: 0,
            height: 0,
            pixel_format: PixelFormat::None,
            planes: Vec::new(),
            frame_size: 0,
            pending: None,
            opened: false,
            draining: false,
        }))
    }

    fn split_planes(&self, packet: &Packet) -> VideoFrame {
        let mut frame = VideoFrame::new(self.width, self.height, self.pixel_format);
        frame.pts = packet.pts;
        let mut offset = 0usize;
        for (i, plane) in self.planes.iter().enumerate() {
            let size = plane.linesize * plane.rows;
            frame.data[i] = packet.data[offset..offset + size].to_vec();
            frame.linesize[i] = plane.linesize;
            offset += size;
        }
        frame
    }
}

impl Decoder for RawVideoDecoder {
    fn codec_id(&self) -> CodecId {
        CodecId::RawVideo
    }

    fn name(&self) -> &str {
        "rawvideo"
    }

    fn open(&mut self, params: &CodecParameters) -> CineResult<()> {
        let video = params
            .as_video()
            .ok_or_else(|| CineError::InvalidArgument("rawvideo 解码器需要视频参数".into()))?;
        if video.width == 0 || video.height == 0 {
            return Err(CineError::InvalidArgument("宽度和高度不能为 0".into()));
        }

        let pf = video.pixel_format;
        let mut planes = Vec::with_capacity(pf.plane_count() as usize);
        for i in 0..pf.plane_count() as usize {
            match (pf.plane_linesize(i, video.width), pf.plane_height(i, video.height)) {
                (Some(linesize), Some(rows)) => planes.push(PlaneLayout { linesize, rows }),
                _ => {
                    return Err(CineError::InvalidArgument(format!(
                        "无法计算 {pf} 平面 {i} 的布局"
                    )));
                }
            }
        }
        if planes.is_empty() {
            return Err(CineError::InvalidArgument("像素格式不能为 None".into()));
        }

        self.frame_size = planes.iter().map(|p| p.linesize * p.rows).sum();
        self.width = video.width;
        self.height = video.height;
        self.pixel_format = pf;
        self.planes = planes;
        self.pending = None;
        self.opened = true;
        self.draining = false;

        debug!(
            "打开 rawvideo 解码器: {}x{}, 格式={}, 帧大小={}",
            self.width, self.height, self.pixel_format, self.frame_size,
        );
        Ok(())
    }

    fn send_packet(&mut self, packet: &Packet) -> CineResult<()> {
        if !self.opened {
            return Err(CineError::Codec("rawvideo 解码器未打开".into()));
        }
        if self.pending.is_some() {
            return Err(CineError::NeedMoreData);
        }
        if packet.is_empty() {
            self.draining = true;
            return Ok(());
        }
        if packet.size() != self.frame_size {
            return Err(CineError::InvalidData(format!(
                "rawvideo 数据包大小 {} 与帧大小 {} 不符",
                packet.size(),
                self.frame_size,
            )));
        }
        self.pending = Some(Frame::Video(self.split_planes(packet)));
        Ok(())
    }

    fn receive_frame(&mut self) -> CineResult<Frame> {
        match self.pending.take() {
            Some(frame) => Ok(frame),
            None if self.draining => Err(CineError::Eof),
            None => Err(CineError::NeedMoreData),
        }
    }

    fn flush(&mut self) {
        self.pending = None;
        self.draining = false;
    }
}
