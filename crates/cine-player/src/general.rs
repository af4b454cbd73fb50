//! 通用后端: 外部解复用/解码库 + 缓冲同步.
//!
//! 解码线路把每个数据包解出的帧转换后追加到两个 [`LinearBuffer`]
//! (视频为 RGBA, 音频为交错 S16), 取帧时各取出定长的一帧.
//!
//! 单次 `parse_next` 读包直到两路都至少有一帧、到达末尾,
//! 或某一路缓冲超过异步阈值. 解码过程中的任何错误都降级为流结束.

use std::path::Path;

use cine_codec::{CodecRegistry, Decoder, Frame};
use cine_core::{CineError, CineResult, MediaType, PixelFormat, SampleFormat};
use cine_format::{Demuxer, IoContext, Stream, StreamParams};
use cine_resample::ResampleContext;
use cine_scale::{ScaleAlgorithm, ScaleContext};
use log::{debug, info, warn};

use crate::backend::{Backend, BackendKind, FrameStatus, RawFrame, SessionInfo};
use crate::buffer::LinearBuffer;
use crate::config::PlaybackConfig;

/// 可接受的最低采样率
pub const MIN_SAMPLE_RATE: u32 = 5500;

/// RGBA 每像素字节数
const RGBA_BYTES: usize = 4;

/// 外部解复用/解码库
pub trait MediaLibrary {
    /// 打开容器
    fn open_input(&self, path: &str) -> CineResult<Box<dyn Demuxer>>;

    /// 为一条流创建并打开解码器
    fn create_decoder(&self, stream: &Stream) -> CineResult<Box<dyn Decoder>>;
}

// ============================================================
// 内置媒体库
// ============================================================

/// 解复用器工厂
pub type DemuxerOpener = Box<dyn Fn(IoContext) -> CineResult<Box<dyn Demuxer>>>;

/// 按扩展名注册解复用器、使用 [`CodecRegistry`] 创建解码器的媒体库
pub struct CodecLibrary {
    codecs: CodecRegistry,
    demuxers: Vec<(String, DemuxerOpener)>,
}

impl CodecLibrary {
    /// 创建媒体库, 注册所有内置解码器
    pub fn new() -> Self {
        let mut codecs = CodecRegistry::new();
        cine_codec::register_all(&mut codecs);
        Self {
            codecs,
            demuxers: Vec::new(),
        }
    }

    /// 为扩展名注册解复用器
    pub fn register_demuxer(&mut self, extension: impl Into<String>, opener: DemuxerOpener) {
        self.demuxers.push((extension.into(), opener));
    }

    /// 内置解码器注册表
    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }
}

impl Default for CodecLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaLibrary for CodecLibrary {
    fn open_input(&self, path: &str) -> CineResult<Box<dyn Demuxer>> {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let (_, opener) = self
            .demuxers
            .iter()
            .find(|(e, _)| e.eq_ignore_ascii_case(ext))
            .ok_or_else(|| CineError::FormatNotFound(format!("没有处理 .{ext} 的解复用器")))?;
        opener(IoContext::open_read(path)?)
    }

    fn create_decoder(&self, stream: &Stream) -> CineResult<Box<dyn Decoder>> {
        let mut decoder = self.codecs.create_decoder(stream.codec_id)?;
        decoder.open(&stream.codec_parameters())?;
        Ok(decoder)
    }
}

// ============================================================
// 尺寸与帧大小
// ============================================================

/// 保持宽高比缩小到 `max_width × max_height` 以内
///
/// 先按宽度缩, 仍超高再按高度缩. 上限为 0 表示不限制.
pub fn fit_size(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let (mut w, mut h) = (u64::from(width), u64::from(height));
    if max_width > 0 && w > u64::from(max_width) {
        h = (h * u64::from(max_width) / w).max(1);
        w = u64::from(max_width);
    }
    if max_height > 0 && h > u64::from(max_height) {
        w = (w * u64::from(max_height) / h).max(1);
        h = u64::from(max_height);
    }
    (w as u32, h as u32)
}

/// 一帧音频的字节数: 每帧采样数向上取整 × 声道数 × 2 字节
pub fn audio_frame_size(rate: u32, fps: u32, channels: u32) -> usize {
    if fps == 0 {
        return 0;
    }
    rate.div_ceil(fps) as usize * channels as usize * 2
}

/// 缓冲 `frames` 帧所需的字节数, 溢出返回 [`CineError::OutOfMemory`]
fn buffer_size(frame_size: usize, frames: usize) -> CineResult<usize> {
    frame_size
        .checked_mul(frames)
        .ok_or_else(|| CineError::OutOfMemory(format!("缓冲 {frames} 帧 × {frame_size} 字节溢出")))
}

// ============================================================
// 解码会话
// ============================================================

struct VideoPath {
    stream_index: usize,
    width: u32,
    height: u32,
    frame_size: usize,
    scaler: ScaleContext,
    buffer: LinearBuffer,
    decoder: Box<dyn Decoder>,
}

struct AudioPath {
    stream_index: usize,
    channels: u32,
    frame_size: usize,
    resampler: ResampleContext,
    buffer: LinearBuffer,
    decoder: Box<dyn Decoder>,
}

/// 解码会话
///
/// 字段按获取顺序的逆序排列, drop 时先释放缓冲和解码器, 最后释放解复用器.
struct DecodeSession {
    video: VideoPath,
    audio: Option<AudioPath>,
    demuxer: Box<dyn Demuxer>,
    fps: u32,
    audio_threshold: f64,
    video_threshold: f64,
    eof: bool,
}

impl DecodeSession {
    /// 两路都至少有一帧, 或已到达末尾
    fn is_frame_ready(&self) -> bool {
        if self.eof {
            return true;
        }
        let audio_ready = self
            .audio
            .as_ref()
            .is_none_or(|a| a.buffer.len() >= a.frame_size);
        self.video.buffer.len() >= self.video.frame_size && audio_ready
    }

    /// 任一路缓冲超过异步阈值
    fn over_async_threshold(&self) -> bool {
        let fps = f64::from(self.fps);
        let video_frames = self.video.buffer.len() as f64 / self.video.frame_size as f64;
        if video_frames > fps * self.video_threshold {
            return true;
        }
        self.audio.as_ref().is_some_and(|a| {
            a.frame_size > 0 && a.buffer.len() as f64 / a.frame_size as f64 > fps * self.audio_threshold
        })
    }

    fn parse_next(&mut self) {
        while !self.eof && !self.is_frame_ready() {
            let packet = match self.demuxer.read_packet() {
                Ok(p) => p,
                Err(CineError::Eof) => {
                    debug!("解复用器到达末尾");
                    self.eof = true;
                    break;
                }
                Err(e) => {
                    warn!("读取数据包失败, 按流结束处理: {e}");
                    self.eof = true;
                    break;
                }
            };

            let result = if packet.stream_index == self.video.stream_index {
                self.video.feed(&packet)
            } else if let Some(audio) = self
                .audio
                .as_mut()
                .filter(|a| a.stream_index == packet.stream_index)
            {
                audio.feed(&packet)
            } else {
                continue;
            };
            if let Err(e) = result {
                warn!("解码失败, 按流结束处理: {e}");
                self.eof = true;
                break;
            }
            if self.over_async_threshold() {
                break;
            }
        }
    }
}

impl VideoPath {
    fn feed(&mut self, packet: &cine_codec::Packet) -> CineResult<()> {
        self.decoder.send_packet(packet)?;
        loop {
            match self.decoder.receive_frame() {
                Ok(Frame::Video(frame)) => {
                    let planes: Vec<&[u8]> = frame.data.iter().map(Vec::as_slice).collect();
                    self.ensure_scaler(frame.width, frame.height, frame.pixel_format)?;
                    let dst = self.buffer.reserve_tail(self.frame_size)?;
                    self.scaler.scale(&planes, &frame.linesize, dst)?;
                    self.buffer.commit(self.frame_size);
                }
                Ok(Frame::Audio(_)) => {
                    return Err(CineError::Codec("视频解码器输出了音频帧".into()));
                }
                Err(CineError::NeedMoreData) | Err(CineError::Eof) => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }

    /// 解码帧的尺寸或格式变化时重建缩放器, 输出尺寸不变
    fn ensure_scaler(&mut self, width: u32, height: u32, format: PixelFormat) -> CineResult<()> {
        let s = &self.scaler;
        if s.src_width == width && s.src_height == height && s.src_format == format {
            return Ok(());
        }
        debug!("视频帧参数变化, 重建缩放器: {width}x{height} {format}");
        self.scaler = ScaleContext::new(
            width,
            height,
            format,
            self.width,
            self.height,
            ScaleAlgorithm::default(),
        )?;
        Ok(())
    }
}

impl AudioPath {
    fn feed(&mut self, packet: &cine_codec::Packet) -> CineResult<()> {
        self.decoder.send_packet(packet)?;
        loop {
            match self.decoder.receive_frame() {
                Ok(Frame::Audio(frame)) => {
                    if frame.channel_layout.channels != self.channels {
                        return Err(CineError::Codec(format!(
                            "音频声道数变化: {} → {}",
                            self.channels, frame.channel_layout.channels
                        )));
                    }
                    if frame.sample_format != self.resampler.src_format {
                        self.resampler = ResampleContext::new(
                            frame.sample_format,
                            self.channels,
                            self.resampler.sample_rate,
                        )?;
                    }
                    let planes: Vec<&[u8]> = frame.data.iter().map(Vec::as_slice).collect();
                    let nb_samples = frame.nb_samples as usize;
                    let needed = self.resampler.output_size(nb_samples);
                    let dst = self.buffer.reserve_tail(needed)?;
                    let written = self.resampler.convert(&planes, nb_samples, dst)?;
                    self.buffer.commit(written);
                }
                Ok(Frame::Video(_)) => {
                    return Err(CineError::Codec("音频解码器输出了视频帧".into()));
                }
                Err(CineError::NeedMoreData) | Err(CineError::Eof) => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }
}

// ============================================================
// 通用后端
// ============================================================

/// 通用后端
pub struct GeneralBackend {
    info: SessionInfo,
    session: DecodeSession,
    /// 上一次输出的画面, 视频不足时重复
    last_video: Vec<u8>,
}

impl GeneralBackend {
    /// 打开文件并建立解码会话
    ///
    /// 必须有视频流. 帧率小于 1 或采样率低于 [`MIN_SAMPLE_RATE`] 时拒绝.
    pub fn open(
        library: &dyn MediaLibrary,
        path: &str,
        config: &PlaybackConfig,
    ) -> CineResult<Self> {
        let demuxer = library.open_input(path)?;
        let streams = demuxer.streams().to_vec();

        let video_stream = streams
            .iter()
            .find(|s| s.media_type == MediaType::Video)
            .ok_or_else(|| CineError::Unsupported(format!("{path}: 没有视频流")))?;
        let StreamParams::Video(vp) = &video_stream.params else {
            return Err(CineError::Format(format!("{path}: 视频流缺少参数")));
        };
        let fps = vp.frame_rate.to_rounded_u32();
        if fps < 1 {
            return Err(CineError::Unsupported(format!(
                "{path}: 帧率 {} 过低",
                vp.frame_rate
            )));
        }

        let audio_stream = streams.iter().find(|s| s.media_type == MediaType::Audio);
        let audio_params = match audio_stream.map(|s| &s.params) {
            Some(StreamParams::Audio(ap)) => {
                if ap.sample_rate < MIN_SAMPLE_RATE {
                    return Err(CineError::Unsupported(format!(
                        "{path}: 采样率 {} Hz 过低",
                        ap.sample_rate
                    )));
                }
                Some(ap.clone())
            }
            Some(_) => return Err(CineError::Format(format!("{path}: 音频流缺少参数"))),
            None => None,
        };

        let (width, height) = fit_size(vp.width, vp.height, config.max_width, config.max_height);
        let video_frame_size = buffer_size(RGBA_BYTES * width as usize, height as usize)?;
        let scaler = ScaleContext::new(
            vp.width,
            vp.height,
            vp.pixel_format,
            width,
            height,
            ScaleAlgorithm::default(),
        )?;
        let video_decoder = library.create_decoder(video_stream)?;
        let video = VideoPath {
            stream_index: video_stream.index,
            width,
            height,
            frame_size: video_frame_size,
            scaler,
            buffer: LinearBuffer::try_new(
                buffer_size(video_frame_size, fps as usize / 2 + 1)?,
                config.max_buffer_bytes,
            )?,
            decoder: video_decoder,
        };

        let (audio, channels, rate) = match (audio_stream, audio_params) {
            (Some(stream), Some(ap)) => {
                let channels = ap.channel_layout.channels;
                let frame_size = audio_frame_size(ap.sample_rate, fps, channels);
                let resampler = ResampleContext::new(ap.sample_format, channels, ap.sample_rate)?;
                let decoder = library.create_decoder(stream)?;
                let path = AudioPath {
                    stream_index: stream.index,
                    channels,
                    frame_size,
                    resampler,
                    buffer: LinearBuffer::try_new(
                        buffer_size(frame_size, fps as usize + 1)?,
                        config.max_buffer_bytes,
                    )?,
                    decoder,
                };
                (Some(path), channels, ap.sample_rate)
            }
            _ => (None, 0, 0),
        };

        let info = SessionInfo {
            kind: BackendKind::General,
            width,
            height,
            fps,
            channels,
            rate,
            sample_width: if audio.is_some() {
                SampleFormat::S16.bytes_per_sample()
            } else {
                0
            },
            color_bits: 32,
            video_frame_size,
            audio_frame_size: audio.as_ref().map_or(0, |a| a.frame_size),
        };
        info!(
            "通用后端打开 {path} ({}): {}x{} → {width}x{height} @ {fps} fps",
            demuxer.name(),
            vp.width,
            vp.height,
        );
        debug!(
            "会话参数: 视频帧 {} 字节, 音频帧 {} 字节, {channels} 声道 {rate} Hz",
            info.video_frame_size, info.audio_frame_size,
        );

        Ok(Self {
            last_video: vec![0u8; video_frame_size],
            session: DecodeSession {
                video,
                audio,
                demuxer,
                fps,
                audio_threshold: config.audio_async_threshold,
                video_threshold: config.video_async_threshold,
                eof: false,
            },
            info,
        })
    }

    /// 是否已到达末尾 (缓冲中可能仍有帧)
    pub fn is_eof(&self) -> bool {
        self.session.eof
    }

    /// 是否可以立即取出一帧
    pub fn is_frame_ready(&self) -> bool {
        self.session.is_frame_ready()
    }

    /// 读包并解码, 直到可以取帧、到达末尾或超过异步阈值
    pub fn parse_next(&mut self) {
        self.session.parse_next();
    }

    /// 缓冲中未消费的视频字节数
    pub fn buffered_video(&self) -> usize {
        self.session.video.buffer.len()
    }

    /// 缓冲中未消费的音频字节数
    pub fn buffered_audio(&self) -> usize {
        self.session.audio.as_ref().map_or(0, |a| a.buffer.len())
    }
}

impl Backend for GeneralBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::General
    }

    fn info(&self) -> &SessionInfo {
        &self.info
    }

    fn next_frame(&mut self, out: &mut RawFrame) -> CineResult<FrameStatus> {
        if !self.session.eof {
            self.session.parse_next();
        }
        let session = &mut self.session;
        let audio_empty = session.audio.as_ref().is_none_or(|a| a.buffer.is_empty());
        if session.eof && session.video.buffer.is_empty() && audio_empty {
            return Ok(FrameStatus::Done);
        }

        out.palette = None;
        out.video.resize(self.info.video_frame_size, 0);
        if session.video.buffer.len() >= self.info.video_frame_size {
            session.video.buffer.read_into(&mut out.video);
            self.last_video.copy_from_slice(&out.video);
        } else {
            debug!("视频不足一帧, 重复上一帧画面");
            out.video.copy_from_slice(&self.last_video);
        }

        out.audio.resize(self.info.audio_frame_size, 0);
        if let Some(audio) = session.audio.as_mut() {
            let n = audio.buffer.read_into(&mut out.audio);
            out.audio[n..].fill(0);
        }
        Ok(FrameStatus::MoreData)
    }
}
