//! Cine 性能基准测试.
//!
//! 覆盖 id CIN 哈夫曼解压、画面转换缩放、音频格式转换等每帧必经路径.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use cine::codec::huffman::{FrequencyTable, NUM_CONTEXTS};
use cine::codec::{CompressedBlock, HuffmanTable};
use cine::core::{PixelFormat, SampleFormat};
use cine::resample::ResampleContext;
use cine::scale::{ScaleAlgorithm, ScaleContext};

/// 所有上下文使用同一组不均匀的频率
fn make_frequencies() -> Box<FrequencyTable> {
    let mut freq: Box<FrequencyTable> = vec![[0u8; 256]; NUM_CONTEXTS]
        .into_boxed_slice()
        .try_into()
        .unwrap();
    for row in freq.iter_mut() {
        for (i, f) in row.iter_mut().enumerate() {
            *f = (1 + (i * 7) % 255) as u8;
        }
    }
    freq
}

/// 伪随机比特流, 前 4 字节为解压长度
fn make_block(output_len: usize, payload_len: usize) -> CompressedBlock {
    let mut data = (output_len as u32).to_le_bytes().to_vec();
    let mut state = 0x1234_5678u32;
    data.extend((0..payload_len).map(|_| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state as u8
    }));
    CompressedBlock::new(data)
}

fn bench_huffman_build(c: &mut Criterion) {
    let freq = make_frequencies();
    c.bench_function("huffman_build_256_contexts", |b| {
        b.iter(|| HuffmanTable::build(black_box(&freq)));
    });
}

fn bench_huffman_decompress(c: &mut Criterion) {
    let table = HuffmanTable::build(&make_frequencies());
    let frame = 320 * 240;
    let block = make_block(frame, frame);
    c.bench_function("huffman_decompress_320x240", |b| {
        b.iter(|| table.decompress(black_box(&block), frame).unwrap());
    });
}

fn bench_yuv_to_rgba_scale(c: &mut Criterion) {
    c.bench_function("yuv420p_640x360_to_rgba_320x180", |b| {
        let (w, h) = (640usize, 360usize);
        let y = vec![100u8; w * h];
        let u = vec![128u8; w * h / 4];
        let v = vec![160u8; w * h / 4];
        let mut ctx = ScaleContext::new(
            w as u32,
            h as u32,
            PixelFormat::Yuv420p,
            320,
            180,
            ScaleAlgorithm::Bilinear,
        )
        .unwrap();
        let mut dst = vec![0u8; ctx.dst_frame_size()];
        b.iter(|| {
            ctx.scale(
                black_box(&[&y[..], &u[..], &v[..]]),
                &[w, w / 2, w / 2],
                &mut dst,
            )
            .unwrap();
        });
    });
}

fn bench_f32_to_s16(c: &mut Criterion) {
    c.bench_function("resample_f32_stereo_2048_to_s16", |b| {
        let samples: Vec<u8> = (0..2048 * 2)
            .flat_map(|i| ((i as f32 / 4096.0) - 0.5).to_le_bytes())
            .collect();
        let ctx = ResampleContext::new(SampleFormat::F32, 2, 44100).unwrap();
        let mut dst = vec![0u8; ctx.output_size(2048)];
        b.iter(|| {
            ctx.convert(black_box(&[&samples[..]]), 2048, &mut dst)
                .unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_huffman_build,
    bench_huffman_decompress,
    bench_yuv_to_rgba_scale,
    bench_f32_to_s16,
);
criterion_main!(benches);
