//! 画面与声音输出接口.

use cine_format::idcin::PALETTE_SIZE;

/// 播放输出
///
/// 由宿主实现: 调色板上传、原始图像绘制、音频排队和播放结束通知.
pub trait Presenter {
    /// 上传 256 色调色板 (RGB 各 1 字节)
    fn upload_palette(&mut self, palette: &[u8; PALETTE_SIZE]);

    /// 绘制一帧原始图像
    ///
    /// `color_bits` 为 8 时 `data` 为调色板索引, 为 32 时为 RGBA.
    fn draw_raw_image(&mut self, width: u32, height: u32, color_bits: u32, data: &[u8]);

    /// 排队一段交错 PCM (本机字节序)
    fn queue_audio(&mut self, samples: &[u8], rate: u32, width: u32, channels: u32, volume: f32);

    /// 播放结束 (自然结束或被跳过)
    fn finished(&mut self);
}
