//! # cine-play
//!
//! Cine 无界面过场动画播放工具.
//!
//! 用系统时钟驱动播放控制器, 按帧率把画面和声音交给无界面输出:
//! - 统计输出/丢弃的帧数
//! - `--dump` 把每帧画面写成 PPM, 音频写成原始 PCM
//! - `--info` 只打印会话参数 (JSON)

mod logging;
mod sink;

use std::path::PathBuf;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;

use cine_player::{
    BackendRegistry, CodecLibrary, Opened, PlaybackConfig, PlaybackController, PlaybackStats,
};

use crate::sink::{HeadlessSink, SinkStats};

/// Cine 过场动画播放工具
#[derive(Parser, Debug)]
#[command(name = "cine-play", version, about = "纯 Rust 过场动画播放工具")]
struct Args {
    /// 过场动画文件 (可省略扩展名)
    input: String,

    /// JSON 配置文件, 命令行参数优先
    #[arg(long)]
    config: Option<PathBuf>,

    /// 输出宽度上限 (0 = 不限制)
    #[arg(long)]
    max_width: Option<u32>,

    /// 输出高度上限 (0 = 不限制)
    #[arg(long)]
    max_height: Option<u32>,

    /// 音量 (0.0-1.0)
    #[arg(long)]
    volume: Option<f32>,

    /// 只打印会话参数
    #[arg(long)]
    info: bool,

    /// 导出画面和音频的目录
    #[arg(long)]
    dump: Option<PathBuf>,

    /// 日志详细程度 (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// 播放结束后的汇总
#[derive(serde::Serialize)]
struct Summary {
    playback: PlaybackStats,
    output: SinkStats,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init("cine-play", args.verbose)?;

    let config = build_config(&args)?;
    let registry = build_registry(config);
    let dump_dir = match &args.dump {
        Some(dir) if !args.info => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("创建导出目录 {} 失败", dir.display()))?;
            Some(dir.clone())
        }
        _ => None,
    };

    let mut controller =
        PlaybackController::with_system_clock(registry, HeadlessSink::new(dump_dir));
    let opened = controller
        .open(&args.input)
        .with_context(|| format!("打开 {} 失败", args.input))?;

    let info = match opened {
        Opened::Playing(info) => info,
        Opened::StaticImage(path) => bail!("{path} 是静态图片, 不是过场动画"),
        Opened::Finished => {
            info!("{} 没有可播放的帧", args.input);
            return Ok(());
        }
    };

    if args.info {
        println!("{}", serde_json::to_string_pretty(&info)?);
        controller.stop();
        return Ok(());
    }

    // 每帧间隔内轮询若干次
    let poll = Duration::from_millis(u64::from(1000 / info.fps.max(1) / 4).max(1));
    while controller.is_active() {
        controller.run(false).context("播放中断")?;
        thread::sleep(poll);
    }

    let summary = Summary {
        playback: controller.stats(),
        output: controller.presenter().stats(),
    };
    info!(
        "播放结束: 输出 {} 帧, 丢弃 {} 帧",
        summary.playback.frames_presented, summary.playback.frames_dropped
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// 合并配置文件与命令行参数
fn build_config(args: &Args) -> Result<PlaybackConfig> {
    let mut config = match &args.config {
        Some(path) => PlaybackConfig::load(path)
            .with_context(|| format!("读取配置 {} 失败", path.display()))?,
        None => PlaybackConfig::default(),
    };
    if let Some(w) = args.max_width {
        config.max_width = w;
    }
    if let Some(h) = args.max_height {
        config.max_height = h;
    }
    if let Some(v) = args.volume {
        config.volume = v.clamp(0.0, 1.0);
    }
    Ok(config)
}

/// 注册内置后端
///
/// 没有外部 MPEG-1 解码库, 只注册通用后端和旧式 id CIN 后端.
fn build_registry(config: PlaybackConfig) -> BackendRegistry {
    let mut registry = BackendRegistry::new(config);
    cine_player::register_general(&mut registry, Rc::new(CodecLibrary::new()));
    cine_player::register_legacy(&mut registry);
    registry
}
