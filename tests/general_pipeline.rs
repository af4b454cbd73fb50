//! 通用后端端到端测试.
//!
//! 用一个极简的原始容器 (`.rawc`) 驱动内置 rawvideo/pcm 解码器,
//! 经后端注册表和播放控制器完整播放.

use std::rc::Rc;

use cine::codec::{CodecId, Packet};
use cine::core::{ChannelLayout, CineError, CineResult, MediaType, PixelFormat, Rational, SampleFormat};
use cine::format::{
    AudioStreamParams, Demuxer, IoContext, Stream, StreamParams, VideoStreamParams,
};
use cine::player::{
    Backend, BackendKind, BackendRegistry, CodecLibrary, FrameStatus, GeneralBackend, ManualClock,
    Opened, PlaybackConfig, PlaybackController, Presenter, RawFrame,
};

// ============================================================
// 原始容器
// ============================================================

const MAGIC: &[u8; 4] = b"RAWC";
const TAG_VIDEO: u8 = 0;
const TAG_AUDIO: u8 = 1;

/// 头部: 魔数 + 宽 + 高 + 帧率 + 采样率 + 声道数 (u32 小端),
/// 之后每条记录为 1 字节标签 + u32 长度 + 数据.
struct RawContainer {
    io: IoContext,
    streams: Vec<Stream>,
}

impl RawContainer {
    fn open(mut io: IoContext) -> CineResult<Box<dyn Demuxer>> {
        let mut magic = [0u8; 4];
        io.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(CineError::InvalidData("不是 RAWC 容器".into()));
        }
        let width = io.read_u32_le()?;
        let height = io.read_u32_le()?;
        let fps = io.read_u32_le()? as i32;
        let rate = io.read_u32_le()?;
        let channels = io.read_u32_le()?;

        let mut streams = vec![Stream {
            index: 0,
            media_type: MediaType::Video,
            codec_id: CodecId::RawVideo,
            time_base: Rational::new(1, fps),
            params: StreamParams::Video(VideoStreamParams {
                width,
                height,
                pixel_format: PixelFormat::Gray8,
                frame_rate: Rational::new(fps, 1),
            }),
        }];
        if rate > 0 {
            streams.push(Stream {
                index: 1,
                media_type: MediaType::Audio,
                codec_id: CodecId::PcmS16le,
                time_base: Rational::new(1, rate as i32),
                params: StreamParams::Audio(AudioStreamParams {
                    sample_rate: rate,
                    channel_layout: ChannelLayout::from_channels(channels),
                    sample_format: SampleFormat::S16,
                }),
            });
        }
        Ok(Box::new(Self { io, streams }))
    }
}

impl Demuxer for RawContainer {
    fn name(&self) -> &str {
        "rawc"
    }

    fn streams(&self) -> &[Stream] {
        &self.streams
    }

    fn read_packet(&mut self) -> CineResult<Packet> {
        let mut tag = [0u8; 1];
        self.io.read_exact(&mut tag)?;
        let len = self.io.read_u32_le()? as usize;
        let data = self.io.read_bytes(len)?;
        let index = if tag[0] == TAG_VIDEO { 0 } else { 1 };
        Ok(Packet::from_data(data).with_stream(index))
    }
}

/// 写出 `frames` 帧: 第 n 帧灰度为 `n * 40`, 音频采样值为 `(n + 1) * 100`
fn build_rawc(width: u32, height: u32, fps: u32, rate: u32, frames: u32) -> Vec<u8> {
    let mut out = MAGIC.to_vec();
    for v in [width, height, fps, rate, 1] {
        out.extend_from_slice(&v.to_le_bytes());
    }
    let samples = if rate > 0 { rate.div_ceil(fps) as usize } else { 0 };
    for n in 0..frames {
        let pixels = vec![(n * 40) as u8; (width * height) as usize];
        out.push(TAG_VIDEO);
        out.extend_from_slice(&(pixels.len() as u32).to_le_bytes());
        out.extend_from_slice(&pixels);
        if samples > 0 {
            let value = ((n + 1) * 100) as i16;
            out.push(TAG_AUDIO);
            out.extend_from_slice(&((samples * 2) as u32).to_le_bytes());
            for _ in 0..samples {
                out.extend_from_slice(&value.to_le_bytes());
            }
        }
    }
    out
}

fn rawc_library() -> CodecLibrary {
    let mut lib = CodecLibrary::new();
    lib.register_demuxer("rawc", Box::new(RawContainer::open));
    lib
}

// ============================================================
// 记录输出
// ============================================================

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Draw { bits: u32, width: u32, first: u8 },
    Audio { len: usize, first: i16 },
    Finished,
}

#[derive(Default)]
struct Recorder {
    events: Vec<Event>,
}

impl Presenter for Recorder {
    fn upload_palette(&mut self, _palette: &[u8; 768]) {
        panic!("RGBA 会话不应上传调色板");
    }

    fn draw_raw_image(&mut self, width: u32, _height: u32, color_bits: u32, data: &[u8]) {
        self.events.push(Event::Draw {
            bits: color_bits,
            width,
            first: data[0],
        });
    }

    fn queue_audio(&mut self, samples: &[u8], _rate: u32, width: u32, _channels: u32, _volume: f32) {
        assert_eq!(width, 2);
        self.events.push(Event::Audio {
            len: samples.len(),
            first: i16::from_ne_bytes([samples[0], samples[1]]),
        });
    }

    fn finished(&mut self) {
        self.events.push(Event::Finished);
    }
}

// ============================================================
// 测试
// ============================================================

#[test]
fn test_备选扩展名找到通用容器() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("intro.rawc"), build_rawc(8, 8, 10, 11025, 3)).unwrap();
    let name = dir.path().join("intro").to_string_lossy().into_owned();

    let config = PlaybackConfig {
        general_extensions: vec!["rawc".into()],
        ..Default::default()
    };
    let mut registry = BackendRegistry::new(config);
    cine::player::register_general(&mut registry, Rc::new(rawc_library()));
    cine::player::register_legacy(&mut registry);

    let clock = ManualClock::new(0);
    let mut controller = PlaybackController::new(registry, Recorder::default(), Box::new(clock.clone()));
    let info = match controller.open(&name).unwrap() {
        Opened::Playing(info) => info,
        other => panic!("意外的打开结果: {other:?}"),
    };
    assert_eq!(info.kind, BackendKind::General);
    assert_eq!((info.fps, info.color_bits, info.channels), (10, 32, 1));
    assert_eq!(info.video_frame_size, 8 * 8 * 4);
    assert_eq!(info.audio_frame_size, 1103 * 2);

    for _ in 0..3 {
        clock.advance(100);
        controller.run(false).unwrap();
    }

    assert_eq!(
        controller.presenter().events,
        vec![
            Event::Draw { bits: 32, width: 8, first: 0 },
            Event::Audio { len: 2206, first: 100 },
            Event::Draw { bits: 32, width: 8, first: 40 },
            Event::Audio { len: 2206, first: 200 },
            Event::Draw { bits: 32, width: 8, first: 80 },
            Event::Audio { len: 2206, first: 300 },
            Event::Finished,
        ]
    );
    assert!(!controller.is_active());
}

#[test]
fn test_限制输出尺寸() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wide.rawc");
    std::fs::write(&path, build_rawc(16, 8, 5, 0, 2)).unwrap();

    let config = PlaybackConfig {
        max_width: 4,
        ..Default::default()
    };
    let mut backend = GeneralBackend::open(&rawc_library(), path.to_str().unwrap(), &config).unwrap();
    let info = backend.info().clone();
    assert_eq!((info.width, info.height), (4, 2));
    assert!(!info.has_audio());

    let mut frame = RawFrame::default();
    assert_eq!(backend.next_frame(&mut frame).unwrap(), FrameStatus::MoreData);
    assert_eq!(frame.video.len(), 4 * 2 * 4);
    assert!(frame.video.chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
    assert_eq!(backend.next_frame(&mut frame).unwrap(), FrameStatus::MoreData);
    assert!(frame.video.chunks_exact(4).all(|px| px == [40, 40, 40, 255]));
    assert_eq!(backend.next_frame(&mut frame).unwrap(), FrameStatus::Done);
    assert!(frame.audio.is_empty());
}

#[test]
fn test_损坏的数据包按结束处理() {
    let mut data = build_rawc(4, 4, 10, 0, 1);
    // 尺寸不对的视频包
    data.push(TAG_VIDEO);
    data.extend_from_slice(&3u32.to_le_bytes());
    data.extend_from_slice(&[1, 2, 3]);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.rawc");
    std::fs::write(&path, data).unwrap();

    let mut backend =
        GeneralBackend::open(&rawc_library(), path.to_str().unwrap(), &PlaybackConfig::default())
            .unwrap();
    let mut frame = RawFrame::default();
    assert_eq!(backend.next_frame(&mut frame).unwrap(), FrameStatus::MoreData);
    assert_eq!(backend.next_frame(&mut frame).unwrap(), FrameStatus::Done);
    assert!(backend.is_eof());
}

#[test]
fn test_没有解复用器时回退失败() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("clip.rawc"), build_rawc(4, 4, 10, 0, 1)).unwrap();
    let name = dir.path().join("clip.rawc").to_string_lossy().into_owned();

    let registry = cine::default_backend_registry(PlaybackConfig::default());
    let mut controller =
        PlaybackController::new(registry, Recorder::default(), Box::new(ManualClock::new(0)));
    assert!(matches!(controller.open(&name), Err(CineError::BackendNotFound(_))));
}
