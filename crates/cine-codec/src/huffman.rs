//! 自适应一阶 Huffman 解码器.
//!
//! 旧式过场动画的图像块使用 256 棵独立的 Huffman 树压缩, 每棵树对应
//! "上一个输出字节" 这一上下文. 解码时每输出一个字节, 就切换到以该字节
//! 为上下文的树继续解码.
//!
//! 树的节点编号:
//! - `< 256`: 叶子, 编号即字节值
//! - `>= 256`: 内部节点, 在内部节点数组中的下标为 `编号 - 256`
//!
//! 压缩块格式:
//! - 前 4 字节 (小端) 为期望输出的字节数
//! - 其余字节为比特流, 按 LSB 优先顺序读取

use bytes::Bytes;
use cine_core::bitreader::BitReader;
use cine_core::{CineError, CineResult};
use log::{debug, warn};

/// 上下文数量 (每个可能的上一字节一个)
pub const NUM_CONTEXTS: usize = 256;

/// 每棵树最多的节点数 (256 个叶子 + 255 个内部节点)
pub const MAX_NODES: usize = 511;

/// 压缩块头部长度 (期望输出字节数)
const BLOCK_HEADER_LEN: usize = 4;

/// 每个上下文 256 个符号的频率表
pub type FrequencyTable = [[u8; 256]; NUM_CONTEXTS];

// ============================================================
// 压缩块
// ============================================================

/// 压缩数据块
#[derive(Debug, Clone)]
pub struct CompressedBlock {
    /// 压缩数据 (含 4 字节长度头)
    pub bytes: Bytes,
    /// 声明的压缩数据长度
    pub count: usize,
}

impl CompressedBlock {
    /// 以数据实际长度作为声明长度创建压缩块
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let count = bytes.len();
        Self { bytes, count }
    }

    /// 块头中记录的期望输出字节数
    pub fn expected_output(&self) -> CineResult<usize> {
        let header = self.bytes.get(..BLOCK_HEADER_LEN).ok_or_else(|| {
            CineError::InvalidData(format!("压缩块过短: {} 字节", self.bytes.len()))
        })?;
        let n = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        Ok(n as usize)
    }
}

/// 解压结果
#[derive(Debug, Clone)]
pub struct DecodedBlock {
    /// 输出字节
    pub data: Vec<u8>,
    /// 实际消耗的输入字节数 (含长度头)
    pub consumed: usize,
    /// 是否超出声明长度 1 字节以上
    pub overread: bool,
}

// ============================================================
// Huffman 树
// ============================================================

/// 单个上下文的解码树
#[derive(Debug, Clone)]
struct HuffmanTree {
    /// 内部节点, 每个节点为 `[bit=0 子节点, bit=1 子节点]`
    nodes: Vec<[u16; 2]>,
    /// 根节点编号
    root: u16,
}

impl HuffmanTree {
    /// 由 256 个符号频率构建解码树
    ///
    /// 反复选取两个计数最小且未使用的非零节点 (计数相同时取编号较小者) 合并,
    /// 直到无法再凑出一对或节点数达到上限. 根节点为最后构建的节点编号,
    /// 符号不足两个的上下文会得到一个退化的根.
    fn build(freq: &[u8; 256]) -> Self {
        let mut counts = [0u32; MAX_NODES];
        for (c, &f) in counts.iter_mut().zip(freq.iter()) {
            *c = u32::from(f);
        }
        let mut used = [false; MAX_NODES];
        let mut nodes: Vec<[u16; 2]> = Vec::with_capacity(MAX_NODES - 256);
        let mut num_nodes = 256usize;

        while num_nodes < MAX_NODES {
            let Some(a) = take_smallest(&counts, &mut used, num_nodes) else {
                break;
            };
            let Some(b) = take_smallest(&counts, &mut used, num_nodes) else {
                break;
            };
            counts[num_nodes] = counts[a] + counts[b];
            nodes.push([a as u16, b as u16]);
            num_nodes += 1;
        }

        Self {
            nodes,
            root: (num_nodes - 1) as u16,
        }
    }

    /// 取节点的子节点
    #[inline]
    fn child(&self, node: u16, bit: u8) -> Option<u16> {
        let idx = usize::from(node).checked_sub(256)?;
        self.nodes.get(idx).map(|pair| pair[usize::from(bit)])
    }
}

/// 在 `[0, num_nodes)` 中找出计数最小的未使用非零节点并标记为已使用
fn take_smallest(counts: &[u32; MAX_NODES], used: &mut [bool; MAX_NODES], num_nodes: usize) -> Option<usize> {
    let mut best: Option<usize> = None;
    for i in 0..num_nodes {
        if used[i] || counts[i] == 0 {
            continue;
        }
        match best {
            Some(b) if counts[i] >= counts[b] => {}
            _ => best = Some(i),
        }
    }
    if let Some(b) = best {
        used[b] = true;
    }
    best
}

// ============================================================
// Huffman 表
// ============================================================

/// 256 个上下文的解码树集合
///
/// 构建后不可变, 由旧式过场动画会话独占.
#[derive(Debug, Clone)]
pub struct HuffmanTable {
    trees: Vec<HuffmanTree>,
}

impl HuffmanTable {
    /// 由 256×256 频率表构建
    pub fn build(freq: &FrequencyTable) -> Self {
        let trees: Vec<HuffmanTree> = freq.iter().map(HuffmanTree::build).collect();
        let internal: usize = trees.iter().map(|t| t.nodes.len()).sum();
        debug!("Huffman 表构建完成: 内部节点共 {internal} 个");
        Self { trees }
    }

    /// 指定上下文的根节点编号
    pub fn root(&self, context: u8) -> u16 {
        self.trees[usize::from(context)].root
    }

    /// 指定上下文的内部节点数量
    pub fn internal_nodes(&self, context: u8) -> usize {
        self.trees[usize::from(context)].nodes.len()
    }

    /// 解压一个压缩块
    ///
    /// 从上下文 0 的根开始, 每个比特选择一个子节点, 到达叶子即输出该字节并
    /// 切换到以该字节为上下文的树. 输出达到块头声明的字节数时停止.
    ///
    /// `limit` 限制最多输出的字节数, 超出部分不再解码.
    /// 比特流提前耗尽时记录警告并返回已解出的数据.
    pub fn decompress(&self, block: &CompressedBlock, limit: usize) -> CineResult<DecodedBlock> {
        let declared = block.expected_output()?;
        let target = declared.min(limit);
        let mut out = Vec::with_capacity(target);

        let end = block.count.min(block.bytes.len());
        let payload = block.bytes.get(BLOCK_HEADER_LEN..end).unwrap_or(&[]);
        let mut br = BitReader::new(payload);

        let mut tree = &self.trees[0];
        let mut node = tree.root;
        let mut exhausted = false;

        while out.len() < target {
            if node < 256 {
                let byte = node as u8;
                out.push(byte);
                tree = &self.trees[usize::from(byte)];
                node = tree.root;
                continue;
            }
            let Some(bit) = br.next_bit() else {
                exhausted = true;
                break;
            };
            match tree.child(node, bit) {
                Some(next) => node = next,
                None => {
                    return Err(CineError::InvalidData(format!(
                        "Huffman 节点编号越界: {node}"
                    )));
                }
            }
        }

        // 读取以字节为单位推进, 结束时正在读的字节也算已消耗
        let consumed = BLOCK_HEADER_LEN + br.bits_read() / 8 + 1;
        let overread = exhausted || consumed > block.count + 1;
        if overread {
            warn!(
                "Huffman 解码超读: 声明 {} 字节, 需要 {} 字节, 已输出 {}/{}",
                block.count,
                consumed,
                out.len(),
                target,
            );
        }

        Ok(DecodedBlock {
            data: out,
            consumed,
            overread,
        })
    }
}
