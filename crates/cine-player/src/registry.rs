//! 播放后端注册表.
//!
//! 启动时注册一次各后端的工厂, 打开文件时按优先级生成候选
//! (后端类型 + 实际路径), 逐个尝试直到成功.

use std::path::Path;

use cine_core::{CineError, CineResult};
use log::{debug, info};

use crate::backend::{Backend, BackendKind};
use crate::config::PlaybackConfig;

/// 后端工厂: 以路径和配置打开一个会话
pub type BackendFactory = Box<dyn Fn(&str, &PlaybackConfig) -> CineResult<Box<dyn Backend>>>;

/// 打开结果
pub enum OpenOutcome {
    /// 已打开的后端
    Backend(Box<dyn Backend>),
    /// 静态图片, 交给宿主的图片加载器
    StaticImage(String),
}

impl std::fmt::Debug for OpenOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend(b) => write!(f, "Backend({})", b.kind()),
            Self::StaticImage(path) => write!(f, "StaticImage({path})"),
        }
    }
}

/// 后端注册表
pub struct BackendRegistry {
    config: PlaybackConfig,
    factories: Vec<(BackendKind, BackendFactory)>,
}

impl BackendRegistry {
    /// 创建空注册表
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            config,
            factories: Vec::new(),
        }
    }

    /// 注册后端, 按 General → Mpeg → Legacy 的优先级尝试
    ///
    /// 同一类型重复注册时替换旧的工厂.
    pub fn register(&mut self, kind: BackendKind, factory: BackendFactory) {
        self.factories.retain(|(k, _)| *k != kind);
        self.factories.push((kind, factory));
        self.factories.sort_by_key(|(k, _)| priority(*k));
    }

    /// 已注册的后端, 按优先级排列
    pub fn list_backends(&self) -> Vec<BackendKind> {
        self.factories.iter().map(|(k, _)| *k).collect()
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// 按优先级列出候选
    pub fn candidates(&self, name: &str) -> Vec<(BackendKind, String)> {
        let path = Path::new(name);
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        let mut out = Vec::new();
        for (kind, _) in &self.factories {
            let mut push = |p: String| {
                if !out.iter().any(|(k, q)| k == kind && *q == p) {
                    out.push((*kind, p));
                }
            };
            match kind {
                BackendKind::General => {
                    push(name.to_string());
                    for alt in &self.config.general_extensions {
                        if !alt.eq_ignore_ascii_case(ext) {
                            push(with_extension(path, alt));
                        }
                    }
                }
                BackendKind::Mpeg => {
                    push(name.to_string());
                    if !ext.eq_ignore_ascii_case("mpg") {
                        push(with_extension(path, "mpg"));
                    }
                }
                BackendKind::Legacy => {
                    push(name.to_string());
                    if !ext.eq_ignore_ascii_case("cin") {
                        push(with_extension(path, "cin"));
                    }
                }
            }
        }
        out
    }

    /// 打开过场动画
    ///
    /// 静态图片扩展名直接返回 [`OpenOutcome::StaticImage`].
    /// 所有候选都失败时返回 [`CineError::BackendNotFound`].
    pub fn open(&self, name: &str) -> CineResult<OpenOutcome> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        if self.config.is_image_extension(ext) {
            debug!("{name} 是静态图片, 交给图片加载器");
            return Ok(OpenOutcome::StaticImage(name.to_string()));
        }

        for (kind, candidate) in self.candidates(name) {
            let Some((_, factory)) = self.factories.iter().find(|(k, _)| *k == kind) else {
                continue;
            };
            match factory(&candidate, &self.config) {
                Ok(backend) => {
                    info!("选择 {kind} 后端播放 {candidate}");
                    return Ok(OpenOutcome::Backend(backend));
                }
                Err(e) => debug!("{kind} 后端无法打开 {candidate}: {e}"),
            }
        }
        Err(CineError::BackendNotFound(name.to_string()))
    }
}

fn priority(kind: BackendKind) -> u8 {
    match kind {
        BackendKind::General => 0,
        BackendKind::Mpeg => 1,
        BackendKind::Legacy => 2,
    }
}

fn with_extension(path: &Path, ext: &str) -> String {
    path.with_extension(ext).to_string_lossy().into_owned()
}
