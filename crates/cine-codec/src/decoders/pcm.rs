//! PCM 音频解码器.
//!
//! 支持 U8 / S16LE / F32LE 三种交错 PCM, 数据包内容原样成为一帧.

use cine_core::{ChannelLayout, CineError, CineResult, SampleFormat};
use log::debug;

use crate::codec_id::CodecId;
use crate::codec_parameters::CodecParameters;
use crate::decoder::Decoder;
use crate::frame::{AudioFrame, Frame};
use crate::packet::Packet;

/// PCM 音频解码器
pub struct PcmDecoder {
    codec_id: CodecId,
    sample_format: SampleFormat,
    sample_rate: u32,
    channel_layout: ChannelLayout,
    /// 每个采样组的字节数 (采样字节数 × 声道数)
    block_align: usize,
    pending: Option<Frame>,
    opened: bool,
    draining: bool,
}

impl PcmDecoder {
    fn create(codec_id: CodecId, sample_format: SampleFormat) -> CineResult<Box<dyn Decoder>> {
        Ok(Box::new(Self {
            codec_id,
            sample_format,
            sample_rate: 0,
            channel_layout: ChannelLayout::MONO,
            block_align: 0,
            pending: None,
            opened: false,
            draining: false,
        }))
    }

    pub fn new_u8() -> CineResult<Box<dyn Decoder>> {
        Self::create(CodecId::PcmU8, SampleFormat::U8)
    }

    pub fn new_s16le() -> CineResult<Box<dyn Decoder>> {
        Self::create(CodecId::PcmS16le, SampleFormat::S16)
    }

    pub fn new_f32le() -> CineResult<Box<dyn Decoder>> {
        Self::create(CodecId::PcmF32le, SampleFormat::F32)
    }
}

impl Decoder for PcmDecoder {
    fn codec_id(&self) -> CodecId {
        self.codec_id
    }

    fn name(&self) -> &str {
        self.codec_id.name()
    }

    fn open(&mut self, params: &CodecParameters) -> CineResult<()> {
        let audio = params
            .as_audio()
            .ok_or_else(|| CineError::InvalidArgument("PCM 解码器需要音频参数".into()))?;
        if audio.sample_rate == 0 || audio.channel_layout.channels == 0 {
            return Err(CineError::InvalidArgument(
                "PCM 采样率和声道数不能为 0".into(),
            ));
        }

        self.sample_rate = audio.sample_rate;
        self.channel_layout = audio.channel_layout;
        self.block_align =
            self.sample_format.bytes_per_sample() as usize * audio.channel_layout.channels as usize;
        self.pending = None;
        self.opened = true;
        self.draining = false;

        debug!(
            "打开 {} 解码器: {} Hz, {}",
            self.name(),
            self.sample_rate,
            self.channel_layout,
        );
        Ok(())
    }

    fn send_packet(&mut self, packet: &Packet) -> CineResult<()> {
        if !self.opened {
            return Err(CineError::Codec(format!("{} 解码器未打开", self.name())));
        }
        if self.pending.is_some() {
            return Err(CineError::NeedMoreData);
        }
        if packet.is_empty() {
            self.draining = true;
            return Ok(());
        }
        if packet.size() % self.block_align != 0 {
            return Err(CineError::InvalidData(format!(
                "PCM 数据包大小 {} 不是 {} 的整数倍",
                packet.size(),
                self.block_align,
            )));
        }

        let nb_samples = (packet.size() / self.block_align) as u32;
        let mut frame = AudioFrame::new(
            nb_samples,
            self.sample_rate,
            self.sample_format,
            self.channel_layout,
        );
        frame.pts = packet.pts;
        frame.data[0] = packet.data.to_vec();
        self.pending = Some(Frame::Audio(frame));
        Ok(())
    }

    fn receive_frame(&mut self) -> CineResult<Frame> {
        match self.pending.take() {
            Some(frame) => Ok(frame),
            None if self.draining => Err(CineError::Eof),
            None => Err(CineError::NeedMoreData),
        }
    }

    fn flush(&mut self) {
        self.pending = None;
        self.draining = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec_parameters::AudioCodecParams;

    fn params(channels: u32) -> CodecParameters {
        CodecParameters::audio(
            CodecId::PcmS16le,
            AudioCodecParams {
                sample_rate: 22050,
                channel_layout: ChannelLayout::from_channels(channels),
                sample_format: SampleFormat::S16,
            },
        )
    }

    #[test]
    fn test_s16le_立体声采样数() {
        let mut dec = PcmDecoder::new_s16le().unwrap();
        dec.open(&params(2)).unwrap();
        let data = vec![1u8, 0, 2, 0, 3, 0, 4, 0];
        dec.send_packet(&Packet::from_data(data.clone())).unwrap();
        let Frame::Audio(af) = dec.receive_frame().unwrap() else {
            panic!("期望音频帧");
        };
        assert_eq!(af.nb_samples, 2);
        assert_eq!(af.sample_format, SampleFormat::S16);
        assert_eq!(af.data[0], data);
    }

    #[test]
    fn test_u8_单声道() {
        let mut dec = PcmDecoder::new_u8().unwrap();
        dec.open(&params(1)).unwrap();
        dec.send_packet(&Packet::from_data(vec![128u8, 0, 255]))
            .unwrap();
        let Frame::Audio(af) = dec.receive_frame().unwrap() else {
            panic!("期望音频帧");
        };
        assert_eq!(af.nb_samples, 3);
        assert_eq!(af.sample_format, SampleFormat::U8);
    }

    #[test]
    fn test_未对齐的数据包报错() {
        let mut dec = PcmDecoder::new_f32le().unwrap();
        dec.open(&params(2)).unwrap();
        let err = dec.send_packet(&Packet::from_data(vec![0u8; 6])).unwrap_err();
        assert!(matches!(err, CineError::InvalidData(_)));
    }

    #[test]
    fn test_未取帧前再次送包要求先取帧() {
        let mut dec = PcmDecoder::new_s16le().unwrap();
        dec.open(&params(1)).unwrap();
        dec.send_packet(&Packet::from_data(vec![0u8; 4])).unwrap();
        assert!(matches!(
            dec.send_packet(&Packet::from_data(vec![0u8; 4])),
            Err(CineError::NeedMoreData)
        ));
    }
}
