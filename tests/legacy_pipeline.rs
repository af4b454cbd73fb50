//! id CIN 端到端测试.
//!
//! 构造合成的 id CIN 文件, 经默认后端注册表、播放控制器和手动时钟完整播放.

use cine::core::CineError;
use cine::format::IoContext;
use cine::player::{
    Backend, BackendKind, FrameStatus, LegacyBackend, ManualClock, Opened, PlaybackConfig,
    PlaybackController, PlaybackState, Presenter, RawFrame,
};

// ============================================================
// 合成 id CIN 流
// ============================================================

const PALETTE_SIZE: usize = 768;

/// 构造 id CIN 流
///
/// 每个哈夫曼上下文只有符号 0 和 1, 第 n 帧所有像素为 `n & 1`.
/// 命令 1 带调色板 (第 i 字节为 i / 3), 命令 2 结束.
fn build_idcin(width: u32, height: u32, rate: u32, sample_width: u32, channels: u32, commands: &[i32]) -> Vec<u8> {
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
        let fill = if n & 1 == 1 { 0xFF } else { 0x00 };
        block.extend(std::iter::repeat_n(fill, pixels.div_ceil(8)));
        out.extend_from_slice(&(block.len() as i32).to_le_bytes());
        out.extend_from_slice(&block);

        let n = n as u64;
        let samples = ((n + 1) * u64::from(rate) / 14 - n * u64::from(rate) / 14) as usize;
        out.extend(std::iter::repeat_n(0x11u8, samples * group));
    }
    out
}

// ============================================================
// 记录输出
// ============================================================

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Palette(u8),
    Draw { bits: u32, width: u32, first: u8 },
    Audio { len: usize, rate: u32 },
    Finished,
}

#[derive(Default)]
struct Recorder {
    events: Vec<Event>,
}

impl Presenter for Recorder {
    fn upload_palette(&mut self, palette: &[u8; 768]) {
        self.events.push(Event::Palette(palette[3 * 9]));
    }

    fn draw_raw_image(&mut self, width: u32, _height: u32, color_bits: u32, data: &[u8]) {
        self.events.push(Event::Draw {
            bits: color_bits,
            width,
            first: data[0],
        });
    }

    fn queue_audio(&mut self, samples: &[u8], rate: u32, _width: u32, _channels: u32, _volume: f32) {
        self.events.push(Event::Audio {
            len: samples.len(),
            rate,
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
fn test_省略扩展名打开并按节奏播放() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("idlog.cin");
    std::fs::write(&path, build_idcin(64, 64, 11025, 2, 1, &[1, 0, 2])).unwrap();
    let name = dir.path().join("idlog").to_string_lossy().into_owned();

    let clock = ManualClock::new(1_000);
    let registry = cine::default_backend_registry(PlaybackConfig::default());
    let mut controller = PlaybackController::new(registry, Recorder::default(), Box::new(clock.clone()));

    let info = match controller.open(&name).unwrap() {
        Opened::Playing(info) => info,
        other => panic!("意外的打开结果: {other:?}"),
    };
    assert_eq!(info.kind, BackendKind::Legacy);
    assert_eq!((info.width, info.height, info.fps, info.color_bits), (64, 64, 14, 8));
    assert_eq!(controller.state(), PlaybackState::Playing);

    // 第一帧要等满一个帧间隔
    controller.run(false).unwrap();
    assert!(controller.presenter().events.is_empty());

    clock.advance(72);
    controller.run(false).unwrap();
    assert_eq!(
        controller.presenter().events,
        vec![
            Event::Palette(9),
            Event::Draw { bits: 8, width: 64, first: 0 },
            Event::Audio { len: 787 * 2, rate: 11025 },
        ]
    );
    assert_eq!(controller.frame_counter(), 1);

    clock.advance(72);
    controller.run(false).unwrap();
    let events = &controller.presenter().events;
    assert_eq!(
        events[3..],
        [
            Event::Draw { bits: 8, width: 64, first: 1 },
            Event::Audio { len: 788 * 2, rate: 11025 },
            Event::Finished,
        ]
    );
    assert!(!controller.is_active());
    assert_eq!(controller.state(), PlaybackState::Stopped);

    let stats = controller.stats();
    assert_eq!((stats.frames_pulled, stats.frames_presented, stats.frames_dropped), (2, 2, 0));
}

#[test]
fn test_内存流逐帧拉取() {
    let data = build_idcin(16, 8, 22050, 1, 2, &[0, 0, 0, 2]);
    let mut backend = LegacyBackend::from_io(IoContext::from_memory(data)).unwrap();
    let info = backend.info().clone();
    assert_eq!(info.video_frame_size, 16 * 8);
    assert!(info.has_audio());

    let mut frame = RawFrame::default();
    let mut audio_total = 0;
    let mut frames = 0;
    while backend.next_frame(&mut frame).unwrap() == FrameStatus::MoreData {
        assert_eq!(frame.video.len(), 128);
        assert!(frame.video.iter().all(|&p| usize::from(p) == frames & 1));
        assert!(frame.audio.len() <= info.audio_frame_size);
        audio_total += frame.audio.len();
        frames += 1;
    }
    assert_eq!(frames, 3);
    // 3 帧共 3 * 22050 / 14 个采样组
    assert_eq!(audio_total, (3 * 22050 / 14) * 2);
}

#[test]
fn test_过大的压缩帧终止播放() {
    let mut data = build_idcin(8, 8, 0, 0, 0, &[0]);
    data.extend_from_slice(&0i32.to_le_bytes());
    data.extend_from_slice(&i32::MAX.to_le_bytes());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.cin");
    std::fs::write(&path, data).unwrap();

    let clock = ManualClock::new(0);
    let registry = cine::default_backend_registry(PlaybackConfig::default());
    let mut controller = PlaybackController::new(registry, Recorder::default(), Box::new(clock.clone()));
    assert!(matches!(
        controller.open(path.to_str().unwrap()).unwrap(),
        Opened::Playing(_)
    ));

    clock.advance(72);
    let err = controller.run(false).unwrap_err();
    assert!(matches!(err, CineError::FrameTooLarge { .. }));
    assert!(!controller.is_active());
    assert_eq!(controller.presenter().events.len(), 1);
}

#[test]
fn test_找不到文件() {
    let dir = tempfile::tempdir().unwrap();
    let name = dir.path().join("missing").to_string_lossy().into_owned();
    let registry = cine::default_backend_registry(PlaybackConfig::default());
    let mut controller =
        PlaybackController::new(registry, Recorder::default(), Box::new(ManualClock::new(0)));
    assert!(matches!(controller.open(&name), Err(CineError::BackendNotFound(_))));
    assert_eq!(controller.state(), PlaybackState::Stopped);
}
