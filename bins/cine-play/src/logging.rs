//! 日志初始化模块.
//!
//! 双输出 (统一级别):
//! - console: 彩色, 输出到 stderr, 不干扰 `--info` 的 JSON
//! - file: 无色, 无 target
//!
//! 级别体系 (优先级: CINE_LOG 环境变量 > 命令行 > 默认):
//! - 默认:   info  (后端选择、播放结束)
//! - `-v`:   debug (会话参数、缓冲区扩容)
//! - `-vv`:  trace (仅 cine 项目 crate, 第三方依赖保持 info)
//! - `-vvv`: trace (全局, 含第三方依赖)
//!
//! 日志文件输出到 $cwd/logs/{prefix}.{date}.log

use anyhow::{Context, Result};
use chrono::{Datelike, Local, Timelike};
use std::sync::OnceLock;
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, FormatEvent, FormatFields, format::Writer},
    layer::{Layer, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
};

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// 覆盖命令行级别的环境变量
const LOG_ENV: &str = "CINE_LOG";

/// 本项目所有 crate 的 target 前缀 (用于 -vv 级别的定向 trace)
const CINE_CRATE_TARGETS: &[&str] = &[
    "cine",
    "cine_core",
    "cine_codec",
    "cine_format",
    "cine_scale",
    "cine_resample",
    "cine_player",
    "cine_play",
];

/// 构建 -vv 级别的 EnvFilter: cine crate trace, 其余 info
fn build_cine_trace_filter() -> EnvFilter {
    let mut directives = CINE_CRATE_TARGETS
        .iter()
        .map(|t| format!("{t}=trace"))
        .collect::<Vec<_>>();
    directives.push("info".to_string());
    EnvFilter::new(directives.join(","))
}

/// 根据 verbosity 构建 EnvFilter
fn build_filter(verbosity: u8) -> EnvFilter {
    match verbosity {
        0 => EnvFilter::new("info"),
        1 => EnvFilter::new("debug"),
        2 => build_cine_trace_filter(),
        _ => EnvFilter::new("trace"),
    }
}

fn resolve_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| build_filter(verbosity))
}

/// 初始化日志系统
///
/// - `file_prefix`: 日志文件前缀 (如 "cine-play")
/// - `verbosity`: 0=info, 1=debug, 2=trace(cine), 3+=trace(all)
pub fn init(file_prefix: &str, verbosity: u8) -> Result<()> {
    std::fs::create_dir_all("logs").context("创建日志目录失败")?;

    let file_appender = tracing_appender::rolling::RollingFileAppender::builder()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix(file_prefix)
        .filename_suffix("log")
        .build("logs")
        .context("创建日志文件失败")?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    LOG_GUARD.set(guard).ok();

    let console_layer = fmt::Layer::default()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .event_format(ConsoleFormatter)
        .with_filter(resolve_filter(verbosity));

    let file_layer = fmt::Layer::default()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(FileFormatter)
        .with_filter(resolve_filter(verbosity));

    Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("日志系统已初始化")?;
    Ok(())
}

/// 时间戳前缀: `[MM-DD hh:mm:ss.mmm]`
fn write_timestamp(writer: &mut Writer<'_>) -> std::fmt::Result {
    let now = Local::now();
    write!(
        writer,
        "[{:02}-{:02} {:02}:{:02}:{:02}.{:03}]",
        now.month(),
        now.day(),
        now.hour(),
        now.minute(),
        now.second(),
        now.timestamp_subsec_millis(),
    )
}

/// Console 格式: 彩色级别 + 时间戳
struct ConsoleFormatter;

impl<S, N> FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let level = *event.metadata().level();
        let color = match level {
            tracing::Level::ERROR => "\x1b[31m",
            tracing::Level::WARN => "\x1b[33m",
            tracing::Level::INFO => "\x1b[32m",
            _ => "\x1b[34m",
        };
        write_timestamp(&mut writer)?;
        write!(writer, " {color}{level:5}\x1b[0m > ")?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// File 格式: 无色, 无 target, 时间戳 + 级别 + 消息
struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        write_timestamp(&mut writer)?;
        write!(writer, " {:5} > ", event.metadata().level())?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_级别过滤器() {
        assert!(build_filter(0).to_string().contains("info"));
        assert!(build_filter(1).to_string().contains("debug"));
        assert!(build_filter(7).to_string().contains("trace"));
        let targeted = build_cine_trace_filter().to_string();
        assert!(targeted.contains("cine_player=trace"));
        assert!(targeted.contains("info"));
    }
}
