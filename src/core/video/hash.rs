//! 感知哈希 - 均值哈希（average hash）
//!
//! 灰度化 → 区域平均下采样到 grid × grid → 与均值比较得到 grid² 位指纹。
//! 对幻灯片级别的内容变化足够敏感，配合相似度阈值使用，不做精确匹配。

use super::error::VideoError;
use super::frame::Frame;

/// 默认哈希网格边长（16x16 = 256 位）
pub const DEFAULT_GRID_SIZE: usize = 16;

/// 帧指纹 - 定长位向量，按 u64 紧凑存储
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHash {
    words: Vec<u64>,
    len: usize,
}

impl FrameHash {
    /// 用默认网格计算帧指纹
    pub fn compute(frame: &Frame) -> Result<FrameHash, VideoError> {
        Self::compute_with_grid(frame, DEFAULT_GRID_SIZE)
    }

    /// 计算指定网格大小的帧指纹
    ///
    /// 同一像素数据总是产生相同指纹（纯函数）。空帧或尺寸不符的
    /// 像素数据返回 `VideoError::InvalidFrame`。
    pub fn compute_with_grid(frame: &Frame, grid_size: usize) -> Result<FrameHash, VideoError> {
        assert!(grid_size > 0, "grid_size must be positive");
        frame.validate()?;

        let gray = frame.to_gray();
        let cells = downsample_area(&gray, frame.width as usize, frame.height as usize, grid_size);

        let mean: f64 = cells.iter().sum::<f64>() / cells.len() as f64;

        Ok(Self::from_bits(cells.iter().map(|&v| v > mean)))
    }

    /// 从位序列构造指纹（测试与 fake 用）
    pub fn from_bits(bits: impl IntoIterator<Item = bool>) -> FrameHash {
        let mut words = Vec::new();
        let mut len = 0;
        for bit in bits {
            if len % 64 == 0 {
                words.push(0u64);
            }
            if bit {
                let last = words.len() - 1;
                words[last] |= 1u64 << (len % 64);
            }
            len += 1;
        }
        FrameHash { words, len }
    }

    /// 指纹位数
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bit(&self, index: usize) -> bool {
        assert!(index < self.len, "bit index out of range");
        (self.words[index / 64] >> (index % 64)) & 1 == 1
    }

    /// 两个指纹的汉明距离（不一致的位数）
    ///
    /// 两个指纹必须等长，长度不一致属于调用方契约违规。
    pub fn hamming_distance(&self, other: &FrameHash) -> u32 {
        assert_eq!(
            self.len, other.len,
            "fingerprint length mismatch: {} vs {}",
            self.len, other.len
        );
        // 尾部未用位恒为 0，异或后不产生额外计数
        self.words
            .iter()
            .zip(other.words.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }

    /// 相似度 = 一致位占比，1.0 完全相同，0.0 每位都不同
    pub fn similarity(&self, other: &FrameHash) -> f32 {
        let matching = self.len as u32 - self.hamming_distance(other);
        matching as f32 / self.len as f32
    }
}

/// 与上一个已捕获指纹的相似度；没有先前指纹时定义为 0.0，
/// 保证流中的第一帧无论阈值如何都会被判定为全新内容。
pub fn similarity_to_last(current: &FrameHash, last: Option<&FrameHash>) -> f32 {
    match last {
        Some(last) => current.similarity(last),
        None => 0.0,
    }
}

/// 区域平均下采样到 grid × grid，块边界按比例切分避免丢行丢列
fn downsample_area(gray: &[u8], width: usize, height: usize, grid: usize) -> Vec<f64> {
    let mut cells = Vec::with_capacity(grid * grid);

    for by in 0..grid {
        let y_start = by * height / grid;
        let y_end = ((by + 1) * height / grid).max(y_start + 1).min(height);
        for bx in 0..grid {
            let x_start = bx * width / grid;
            let x_end = ((bx + 1) * width / grid).max(x_start + 1).min(width);

            let mut block_sum = 0u64;
            for y in y_start..y_end {
                let row = y * width;
                for x in x_start..x_end {
                    block_sum += gray[row + x] as u64;
                }
            }
            let count = (y_end - y_start) * (x_end - x_start);
            cells.push(block_sum as f64 / count as f64);
        }
    }

    cells
}
