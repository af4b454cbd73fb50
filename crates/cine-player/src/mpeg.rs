//! MPEG-1 后端.
//!
//! 外部 MPEG-1 解码库每次给出一帧 YCbCr 4:2:0 画面和若干段 f32 交错音频.
//! 每次拉取解码一帧画面, 并把音频补足到一帧的采样数后交出, 多余部分留到下一帧.

use cine_codec::VideoFrame;
use cine_core::{CineError, CineResult, PixelFormat};
use cine_resample::float_to_s16;
use cine_scale::{ScaleAlgorithm, ScaleContext};
use log::{debug, info, warn};

use crate::backend::{Backend, BackendKind, FrameStatus, RawFrame, SessionInfo};
use crate::config::PlaybackConfig;
use crate::general::{MIN_SAMPLE_RATE, audio_frame_size, fit_size};

/// 打开的 MPEG-1 解码器
pub trait Mpeg1Decoder {
    /// 探测码流, 确认存在可解码的视频
    fn probe(&mut self) -> bool;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// 声明的帧率
    fn frame_rate(&self) -> f64;

    /// 音频采样率, 无音频为 0
    fn sample_rate(&self) -> u32;

    /// 音频声道数, 无音频为 0
    fn channels(&self) -> u32;

    /// 解码下一帧画面 (Yuv420p), 没有更多画面返回 `None`
    fn decode_video(&mut self) -> Option<VideoFrame>;

    /// 解码下一段音频 (f32 交错), 没有更多音频返回 `None`
    fn decode_audio(&mut self) -> Option<Vec<f32>>;
}

/// 外部 MPEG-1 解码库
pub trait Mpeg1Library {
    fn open(&self, path: &str) -> CineResult<Box<dyn Mpeg1Decoder>>;
}

/// MPEG-1 后端
pub struct MpegBackend {
    info: SessionInfo,
    scaler: ScaleContext,
    /// 每帧交出的采样数 (含所有声道)
    samples_per_frame: usize,
    /// 尚未交出的 S16 采样
    scratch: Vec<i16>,
    decoder: Box<dyn Mpeg1Decoder>,
    done: bool,
}

impl MpegBackend {
    pub fn open(
        library: &dyn Mpeg1Library,
        path: &str,
        config: &PlaybackConfig,
    ) -> CineResult<Self> {
        let mut decoder = library.open(path)?;
        if !decoder.probe() {
            return Err(CineError::Format(format!("{path}: 不是可解码的 MPEG-1 码流")));
        }

        let frame_rate = decoder.frame_rate();
        let fps = if frame_rate.is_finite() && frame_rate > 0.0 {
            frame_rate.round() as u32
        } else {
            0
        };
        if fps < 1 {
            return Err(CineError::Unsupported(format!("{path}: 帧率 {frame_rate} 过低")));
        }
        let (rate, channels) = (decoder.sample_rate(), decoder.channels());
        let has_audio = rate > 0 && channels > 0;
        if has_audio && rate < MIN_SAMPLE_RATE {
            return Err(CineError::Unsupported(format!("{path}: 采样率 {rate} Hz 过低")));
        }

        let (src_w, src_h) = (decoder.width(), decoder.height());
        let (width, height) = fit_size(src_w, src_h, config.max_width, config.max_height);
        let scaler = ScaleContext::new(
            src_w,
            src_h,
            PixelFormat::Yuv420p,
            width,
            height,
            ScaleAlgorithm::default(),
        )?;

        let audio_size = if has_audio {
            audio_frame_size(rate, fps, channels)
        } else {
            0
        };
        let info = SessionInfo {
            kind: BackendKind::Mpeg,
            width,
            height,
            fps,
            channels: if has_audio { channels } else { 0 },
            rate: if has_audio { rate } else { 0 },
            sample_width: if has_audio { 2 } else { 0 },
            color_bits: 32,
            video_frame_size: scaler.dst_frame_size(),
            audio_frame_size: audio_size,
        };
        info!("MPEG-1 后端打开 {path}: {src_w}x{src_h} → {width}x{height} @ {fps} fps");
        debug!("MPEG-1 音频: {channels} 声道 {rate} Hz, 每帧 {audio_size} 字节");

        Ok(Self {
            info,
            scaler,
            samples_per_frame: audio_size / 2,
            scratch: Vec::new(),
            decoder,
            done: false,
        })
    }

    /// 补足一帧音频并写入 `out`, 不足部分补静音
    fn fill_audio(&mut self, out: &mut Vec<u8>) {
        while self.scratch.len() < self.samples_per_frame {
            match self.decoder.decode_audio() {
                Some(samples) => self
                    .scratch
                    .extend(samples.iter().map(|&s| float_to_s16(f64::from(s)))),
                None => break,
            }
        }
        let take = self.samples_per_frame.min(self.scratch.len());
        out.clear();
        out.extend(self.scratch.drain(..take).flat_map(i16::to_ne_bytes));
        out.resize(self.samples_per_frame * 2, 0);
    }
}

impl Backend for MpegBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Mpeg
    }

    fn info(&self) -> &SessionInfo {
        &self.info
    }

    fn next_frame(&mut self, out: &mut RawFrame) -> CineResult<FrameStatus> {
        if self.done {
            return Ok(FrameStatus::Done);
        }
        let Some(frame) = self.decoder.decode_video() else {
            debug!("MPEG-1 没有更多画面");
            self.done = true;
            return Ok(FrameStatus::Done);
        };

        out.palette = None;
        out.video.resize(self.info.video_frame_size, 0);
        let planes: Vec<&[u8]> = frame.data.iter().map(Vec::as_slice).collect();
        if let Err(e) = self.scaler.scale(&planes, &frame.linesize, &mut out.video) {
            warn!("MPEG-1 画面转换失败, 按流结束处理: {e}");
            self.done = true;
            return Ok(FrameStatus::Done);
        }
        self.fill_audio(&mut out.audio);
        Ok(FrameStatus::MoreData)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// 按脚本输出画面和音频的 MPEG-1 解码器
    pub(crate) struct ScriptedMpeg {
        pub width: u32,
        pub height: u32,
        pub frame_rate: f64,
        pub sample_rate: u32,
        pub channels: u32,
        pub frames: usize,
        pub audio: VecDeque<Vec<f32>>,
    }

    impl Mpeg1Decoder for ScriptedMpeg {
        fn probe(&mut self) -> bool {
            self.width > 0
        }

        fn width(&self) -> u32 {
            self.width
        }

        fn height(&self) -> u32 {
            self.height
        }

        fn frame_rate(&self) -> f64 {
            self.frame_rate
        }

        fn sample_rate(&self) -> u32 {
            self.sample_rate
        }

        fn channels(&self) -> u32 {
            self.channels
        }

        fn decode_video(&mut self) -> Option<VideoFrame> {
            if self.frames == 0 {
                return None;
            }
            self.frames -= 1;
            let (w, h) = (self.width as usize, self.height as usize);
            let mut frame = VideoFrame::new(self.width, self.height, PixelFormat::Yuv420p);
            frame.data = vec![vec![128; w * h], vec![128; w * h / 4], vec![128; w * h / 4]];
            frame.linesize = vec![w, w / 2, w / 2];
            Some(frame)
        }

        fn decode_audio(&mut self) -> Option<Vec<f32>> {
            self.audio.pop_front()
        }
    }

    pub(crate) struct ScriptedMpegLibrary {
        pub make: fn() -> ScriptedMpeg,
    }

    impl Mpeg1Library for ScriptedMpegLibrary {
        fn open(&self, _path: &str) -> CineResult<Box<dyn Mpeg1Decoder>> {
            Ok(Box::new((self.make)()))
        }
    }

    fn two_frames_with_audio() -> ScriptedMpeg {
        ScriptedMpeg {
            width: 4,
            height: 4,
            frame_rate: 25.0,
            sample_rate: 8000,
            channels: 1,
            frames: 2,
            // 每帧 320 个采样
            audio: VecDeque::from(vec![vec![0.5; 200], vec![-0.5; 200]]),
        }
    }

    #[test]
    fn test_每帧交出定长音频并保留余量() {
        let lib = ScriptedMpegLibrary {
            make: two_frames_with_audio,
        };
        let mut backend = MpegBackend::open(&lib, "intro.mpg", &PlaybackConfig::default()).unwrap();
        assert_eq!(backend.info().audio_frame_size, 640);

        let mut frame = RawFrame::default();
        assert_eq!(backend.next_frame(&mut frame).unwrap(), FrameStatus::MoreData);
        assert_eq!(frame.video.len(), 4 * 4 * 4);
        assert!(frame.video.chunks(4).all(|px| px[3] == 255));
        assert_eq!(frame.audio.len(), 640);
        let first = i16::from_ne_bytes([frame.audio[0], frame.audio[1]]);
        let last = i16::from_ne_bytes([frame.audio[638], frame.audio[639]]);
        assert_eq!((first, last), (16384, -16384));
        assert_eq!(backend.scratch.len(), 80);

        // 剩余 80 个采样, 之后补静音
        assert_eq!(backend.next_frame(&mut frame).unwrap(), FrameStatus::MoreData);
        assert_eq!(frame.audio.len(), 640);
        assert_eq!(i16::from_ne_bytes([frame.audio[158], frame.audio[159]]), -16384);
        assert_eq!(i16::from_ne_bytes([frame.audio[160], frame.audio[161]]), 0);

        assert_eq!(backend.next_frame(&mut frame).unwrap(), FrameStatus::Done);
        assert_eq!(backend.next_frame(&mut frame).unwrap(), FrameStatus::Done);
    }

    #[test]
    fn test_探测失败或帧率过低被拒绝() {
        let lib = ScriptedMpegLibrary {
            make: || ScriptedMpeg {
                frame_rate: 0.4,
                ..two_frames_with_audio()
            },
        };
        assert!(matches!(
            MpegBackend::open(&lib, "a.mpg", &PlaybackConfig::default()),
            Err(CineError::Unsupported(_))
        ));

        let lib = ScriptedMpegLibrary {
            make: || ScriptedMpeg {
                width: 0,
                ..two_frames_with_audio()
            },
        };
        assert!(matches!(
            MpegBackend::open(&lib, "a.mpg", &PlaybackConfig::default()),
            Err(CineError::Format(_))
        ));
    }
}
