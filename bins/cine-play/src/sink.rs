//! 无界面输出.
//!
//! 统计输出的帧和音频, 可选把每帧画面写成 PPM、把音频追加到一个原始 PCM 文件.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use cine_player::Presenter;
use log::{debug, warn};
use serde::Serialize;

/// 256 色调色板字节数
const PALETTE_BYTES: usize = 768;

/// 输出统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SinkStats {
    pub frames: u64,
    pub palettes: u64,
    pub audio_bytes: u64,
    pub finished: bool,
}

/// 无界面输出
pub struct HeadlessSink {
    palette: [u8; PALETTE_BYTES],
    dump_dir: Option<PathBuf>,
    audio_out: Option<BufWriter<File>>,
    stats: SinkStats,
}

impl HeadlessSink {
    pub fn new(dump_dir: Option<PathBuf>) -> Self {
        Self {
            palette: [0; PALETTE_BYTES],
            dump_dir,
            audio_out: None,
            stats: SinkStats::default(),
        }
    }

    pub fn stats(&self) -> SinkStats {
        self.stats
    }

    /// 把一帧画面写成 PPM
    fn dump_frame(&self, dir: &Path, width: u32, height: u32, color_bits: u32, data: &[u8]) {
        let path = dir.join(format!("frame_{:05}.ppm", self.stats.frames));
        let rgb = to_rgb(&self.palette, color_bits, data);
        let result = File::create(&path).and_then(|file| {
            let mut out = BufWriter::new(file);
            write!(out, "P6\n{width} {height}\n255\n")?;
            out.write_all(&rgb)?;
            out.flush()
        });
        if let Err(e) = result {
            warn!("写入 {} 失败: {e}", path.display());
        }
    }

    fn dump_audio(&mut self, dir: &Path, samples: &[u8]) {
        if self.audio_out.is_none() {
            let path = dir.join("audio.pcm");
            match File::create(&path) {
                Ok(file) => self.audio_out = Some(BufWriter::new(file)),
                Err(e) => {
                    warn!("创建 {} 失败: {e}", path.display());
                    return;
                }
            }
        }
        if let Some(out) = self.audio_out.as_mut() {
            if let Err(e) = out.write_all(samples) {
                warn!("写入音频失败: {e}");
            }
        }
    }
}

/// 调色板索引或 RGBA 转为 RGB24
fn to_rgb(palette: &[u8; PALETTE_BYTES], color_bits: u32, data: &[u8]) -> Vec<u8> {
    if color_bits == 8 {
        data.iter()
            .flat_map(|&i| {
                let base = usize::from(i) * 3;
                [palette[base], palette[base + 1], palette[base + 2]]
            })
            .collect()
    } else {
        data.chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect()
    }
}

impl Presenter for HeadlessSink {
    fn upload_palette(&mut self, palette: &[u8; PALETTE_BYTES]) {
        self.palette = *palette;
        self.stats.palettes += 1;
    }

    fn draw_raw_image(&mut self, width: u32, height: u32, color_bits: u32, data: &[u8]) {
        if let Some(dir) = self.dump_dir.as_deref() {
            self.dump_frame(dir, width, height, color_bits, data);
        }
        self.stats.frames += 1;
    }

    fn queue_audio(&mut self, samples: &[u8], _rate: u32, _width: u32, _channels: u32, _volume: f32) {
        if let Some(dir) = self.dump_dir.clone() {
            self.dump_audio(&dir, samples);
        }
        self.stats.audio_bytes += samples.len() as u64;
    }

    fn finished(&mut self) {
        if let Some(mut out) = self.audio_out.take() {
            if let Err(e) = out.flush() {
                warn!("写入音频失败: {e}");
            }
        }
        debug!("输出 {} 帧, {} 字节音频", self.stats.frames, self.stats.audio_bytes);
        self.stats.finished = true;
    }
}
