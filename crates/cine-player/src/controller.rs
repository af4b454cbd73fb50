//! 播放控制器.
//!
//! 选择后端, 持有当前帧/待播帧双缓冲, 按墙钟时间决定何时推进一帧.
//! 落后超过一帧时丢帧: 不逐帧追赶, 直接把起始时间重设到当前帧.
//!
//! 状态: `Stopped → Loading → Playing ⇄ Paused → Stopped`.

use cine_core::CineResult;
use log::{debug, info, warn};
use serde::Serialize;

use crate::backend::{Backend, FrameStatus, RawFrame, SessionInfo};
use crate::clock::{Clock, SystemClock};
use crate::presenter::Presenter;
use crate::registry::{BackendRegistry, OpenOutcome};

/// 播放状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Stopped,
    Loading,
    Playing,
    /// 界面覆盖层打开, 时间冻结
    Paused,
}

/// 播放统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlaybackStats {
    /// 从后端成功拉取的帧数
    pub frames_pulled: u64,
    /// 已输出的帧数
    pub frames_presented: u64,
    /// 丢弃 (跳过) 的帧数
    pub frames_dropped: u64,
    /// 丢帧重新同步的次数
    pub drop_events: u64,
}

/// `open` 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opened {
    /// 开始播放
    Playing(SessionInfo),
    /// 静态图片, 交给宿主加载
    StaticImage(String),
    /// 打开成功但没有任何帧, 已发出结束通知
    Finished,
}

struct ActiveSession {
    current: RawFrame,
    pending: RawFrame,
    info: SessionInfo,
    frame_counter: u64,
    start_clock: u64,
    backend: Box<dyn Backend>,
}

/// 播放控制器
pub struct PlaybackController<P: Presenter> {
    registry: BackendRegistry,
    clock: Box<dyn Clock>,
    presenter: P,
    session: Option<ActiveSession>,
    state: PlaybackState,
    stats: PlaybackStats,
}

impl<P: Presenter> PlaybackController<P> {
    pub fn new(registry: BackendRegistry, presenter: P, clock: Box<dyn Clock>) -> Self {
        Self {
            registry,
            clock,
            presenter,
            session: None,
            state: PlaybackState::Stopped,
            stats: PlaybackStats::default(),
        }
    }

    /// 使用系统时钟
    pub fn with_system_clock(registry: BackendRegistry, presenter: P) -> Self {
        Self::new(registry, presenter, Box::new(SystemClock::new()))
    }

    /// 打开过场动画并同步拉取第一帧
    ///
    /// 正在播放的会话会先被停止.
    pub fn open(&mut self, name: &str) -> CineResult<Opened> {
        self.stop();
        self.state = PlaybackState::Loading;

        let mut backend = match self.registry.open(name) {
            Ok(OpenOutcome::Backend(b)) => b,
            Ok(OpenOutcome::StaticImage(path)) => {
                self.state = PlaybackState::Stopped;
                return Ok(Opened::StaticImage(path));
            }
            Err(e) => {
                self.state = PlaybackState::Stopped;
                return Err(e);
            }
        };

        let info = backend.info().clone();
        let mut pending = RawFrame::default();
        match backend.next_frame(&mut pending) {
            Ok(FrameStatus::MoreData) => {}
            Ok(FrameStatus::Done) => {
                warn!("{name} 没有任何帧");
                self.state = PlaybackState::Stopped;
                self.presenter.finished();
                return Ok(Opened::Finished);
            }
            Err(e) => {
                self.state = PlaybackState::Stopped;
                return Err(e);
            }
        }

        debug!(
            "开始播放 {name}: {}x{} {} 位 @ {} fps",
            info.width, info.height, info.color_bits, info.fps
        );
        self.stats = PlaybackStats {
            frames_pulled: 1,
            ..Default::default()
        };
        self.session = Some(ActiveSession {
            current: RawFrame::default(),
            pending,
            info: info.clone(),
            frame_counter: 0,
            start_clock: self.clock.now_ms(),
            backend,
        });
        self.state = PlaybackState::Playing;
        Ok(Opened::Playing(info))
    }

    /// 每个渲染周期调用一次
    ///
    /// `overlay_active` 为真时冻结播放时间. 后端的致命错误会停止播放并上抛.
    pub fn run(&mut self, overlay_active: bool) -> CineResult<()> {
        let now = self.clock.now_ms();
        let volume = self.registry.config().volume;
        let Self {
            session,
            presenter,
            stats,
            state,
            ..
        } = self;
        let Some(s) = session.as_mut() else {
            return Ok(());
        };
        let fps = u64::from(s.info.fps.max(1));

        if overlay_active {
            s.start_clock = now.saturating_sub(s.frame_counter * 1000 / fps);
            *state = PlaybackState::Paused;
            return Ok(());
        }
        *state = PlaybackState::Playing;

        let due = now.saturating_sub(s.start_clock) * fps / 1000;
        if due <= s.frame_counter {
            return Ok(());
        }
        if due > s.frame_counter + 1 {
            let behind = due - s.frame_counter - 1;
            warn!("过场动画落后 {behind} 帧, 丢帧并重新同步");
            stats.frames_dropped += behind;
            stats.drop_events += 1;
            s.start_clock = now.saturating_sub(s.frame_counter * 1000 / fps);
        }

        std::mem::swap(&mut s.current, &mut s.pending);
        present(presenter, &s.info, &s.current, volume);
        stats.frames_presented += 1;

        s.pending.palette = None;
        match s.backend.next_frame(&mut s.pending) {
            Ok(FrameStatus::MoreData) => {
                s.frame_counter += 1;
                stats.frames_pulled += 1;
                Ok(())
            }
            Ok(FrameStatus::Done) => {
                info!("过场动画播放结束, 共 {} 帧", stats.frames_presented);
                self.stop();
                self.presenter.finished();
                Ok(())
            }
            Err(e) => {
                self.stop();
                Err(e)
            }
        }
    }

    /// 停止播放并释放会话, 可重复调用
    pub fn stop(&mut self) {
        if self.session.take().is_some() {
            debug!("释放播放会话");
        }
        self.state = PlaybackState::Stopped;
    }

    /// 跳过: 正在播放时停止并发出结束通知
    pub fn skip(&mut self) -> bool {
        if self.session.is_none() {
            return false;
        }
        info!("跳过过场动画");
        self.stop();
        self.presenter.finished();
        true
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// 已推进的帧数, 未播放时为 0
    pub fn frame_counter(&self) -> u64 {
        self.session.as_ref().map_or(0, |s| s.frame_counter)
    }

    /// 当前会话参数
    pub fn info(&self) -> Option<&SessionInfo> {
        self.session.as_ref().map(|s| &s.info)
    }

    /// 当前显示的帧
    pub fn current_frame(&self) -> Option<&RawFrame> {
        self.session.as_ref().map(|s| &s.current)
    }

    pub fn stats(&self) -> PlaybackStats {
        self.stats
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }
}

/// 输出一帧: 调色板先于画面上传
fn present<P: Presenter>(presenter: &mut P, info: &SessionInfo, frame: &RawFrame, volume: f32) {
    if let Some(palette) = &frame.palette {
        presenter.upload_palette(palette);
    }
    presenter.draw_raw_image(info.width, info.height, info.color_bits, &frame.video);
    if info.has_audio() && !frame.audio.is_empty() {
        presenter.queue_audio(
            &frame.audio,
            info.rate,
            info.sample_width,
            info.channels,
            volume,
        );
    }
}
