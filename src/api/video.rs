//! 关键帧扫描器 - 面向调用方的批量接口

use std::sync::Mutex;

use log::info;

use crate::core::video::{CapturedFrame, Frame, FrameSelector, SelectorConfig, VideoError};

/// 扫描统计
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    pub processed_frames: u64,
    pub captured_frames: u64,
}

/// 关键帧扫描器 - 跨批次保持选择器状态
///
/// 批内哈希并行计算，捕获决策严格按输入顺序执行。
pub struct SlideFrameScanner {
    inner: Mutex<ScannerState>,
}

struct ScannerState {
    selector: FrameSelector,
    processed: u64,
    captured: u64,
}

impl SlideFrameScanner {
    pub fn new(config: SelectorConfig) -> Self {
        info!("🎬 SlideFrameScanner: created");
        Self {
            inner: Mutex::new(ScannerState {
                selector: FrameSelector::new(config),
                processed: 0,
                captured: 0,
            }),
        }
    }

    /// 批量处理帧，返回本批捕获的关键帧
    pub fn process_batch(&self, frames: Vec<Frame>) -> Result<Vec<CapturedFrame>, VideoError> {
        let batch_len = frames.len() as u64;
        let mut state = self.inner.lock().expect("scanner lock poisoned");

        let captured = state.selector.process_batch(frames)?;

        state.processed += batch_len;
        state.captured += captured.len() as u64;
        Ok(captured)
    }

    pub fn stats(&self) -> ScanStats {
        let state = self.inner.lock().expect("scanner lock poisoned");
        ScanStats {
            processed_frames: state.processed,
            captured_frames: state.captured,
        }
    }

    /// 重置状态，开始扫描新视频
    pub fn reset(&self) {
        let mut state = self.inner.lock().expect("scanner lock poisoned");
        state.selector.reset();
        state.processed = 0;
        state.captured = 0;
    }
}

impl Default for SlideFrameScanner {
    fn default() -> Self {
        Self::new(SelectorConfig::default())
    }
}
