//! 关键帧选择器
//!
//! 流式单遍处理：对每一帧计算感知哈希，与上一张已捕获帧比较，
//! 相似度低于阈值且间隔足够远才捕获。两个条件都不满足时不更新
//! 任何状态，避免过渡动画期间连续误捕。

use rayon::prelude::*;

use super::error::VideoError;
use super::frame::Frame;
use super::hash::{similarity_to_last, FrameHash};

/// 选择器配置
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// 相似度高于等于该值的帧视为重复（0-1）
    pub similarity_threshold: f32,
    /// 两次捕获之间的最小帧数间隔，抑制过渡帧连发
    pub min_frame_interval: u64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.92,
            min_frame_interval: 15,
        }
    }
}

/// 已捕获帧：帧本体 + 捕获时使用的指纹
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub frame: Frame,
    pub hash: FrameHash,
}

impl CapturedFrame {
    pub fn frame_number(&self) -> u64 {
        self.frame.frame_number
    }

    pub fn timestamp_seconds(&self) -> f64 {
        self.frame.timestamp_seconds
    }
}

/// 关键帧选择器 - 只保留上一张已捕获帧的指纹与帧号
///
/// 没有先前捕获时相似度按 0.0 处理、间隔视为已满足，
/// 因此任何非空流的第一帧必然被捕获。
pub struct FrameSelector {
    config: SelectorConfig,
    last_hash: Option<FrameHash>,
    last_captured_number: Option<u64>,
}

impl FrameSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self {
            config,
            last_hash: None,
            last_captured_number: None,
        }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// 处理一帧：捕获则返回 `Some(CapturedFrame)`，否则丢弃返回 `None`
    pub fn process(&mut self, frame: Frame) -> Result<Option<CapturedFrame>, VideoError> {
        let hash = FrameHash::compute(&frame)?;
        Ok(self.apply(frame, hash))
    }

    /// 批量处理：用 rayon 按输入顺序并行计算哈希，再顺序执行捕获决策。
    /// 输出顺序与输入顺序严格一致，选择器状态仍是单写者。
    pub fn process_batch(&mut self, frames: Vec<Frame>) -> Result<Vec<CapturedFrame>, VideoError> {
        let hashes = frames
            .par_iter()
            .map(FrameHash::compute)
            .collect::<Result<Vec<_>, _>>()?;

        let mut captured = Vec::new();
        for (frame, hash) in frames.into_iter().zip(hashes) {
            if let Some(result) = self.apply(frame, hash) {
                captured.push(result);
            }
        }
        Ok(captured)
    }

    pub fn reset(&mut self) {
        self.last_hash = None;
        self.last_captured_number = None;
    }

    /// 捕获决策。拒绝时不做任何状态更新。
    fn apply(&mut self, frame: Frame, hash: FrameHash) -> Option<CapturedFrame> {
        let similarity = similarity_to_last(&hash, self.last_hash.as_ref());
        let distinct =
            self.last_hash.is_none() || similarity < self.config.similarity_threshold;
        let spaced = match self.last_captured_number {
            None => true,
            Some(last) => {
                frame.frame_number.saturating_sub(last) >= self.config.min_frame_interval
            }
        };

        if distinct && spaced {
            self.last_hash = Some(hash.clone());
            self.last_captured_number = Some(frame.frame_number);
            Some(CapturedFrame { frame, hash })
        } else {
            None
        }
    }
}

/// 惰性关键帧流。上游错误原样向下传递，选择器状态不回滚。
pub struct DistinctFrames<I> {
    selector: FrameSelector,
    frames: I,
}

impl<I> Iterator for DistinctFrames<I>
where
    I: Iterator<Item = Result<Frame, VideoError>>,
{
    type Item = Result<CapturedFrame, VideoError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.frames.next()? {
                Err(e) => return Some(Err(e)),
                Ok(frame) => match self.selector.process(frame) {
                    Err(e) => return Some(Err(e)),
                    Ok(Some(captured)) => return Some(Ok(captured)),
                    Ok(None) => continue,
                },
            }
        }
    }
}

/// 对一个帧流做单遍关键帧筛选。每次调用都是全新状态。
pub fn select_distinct_frames<I>(frames: I, config: SelectorConfig) -> DistinctFrames<I::IntoIter>
where
    I: IntoIterator<Item = Result<Frame, VideoError>>,
{
    DistinctFrames {
        selector: FrameSelector::new(config),
        frames: frames.into_iter(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn solid_frame(number: u64, timestamp: f64, fill: u8) -> Frame {
        Frame::new(number, timestamp, 160, 160, vec![fill; 160 * 160 * 3])
    }

    /// 左黑右白
    fn left_right_frame(number: u64, timestamp: f64) -> Frame {
        let mut data = vec![0u8; 160 * 160 * 3];
        for y in 0..160usize {
            for x in 80..160usize {
                let idx = (y * 160 + x) * 3;
                data[idx] = 255;
                data[idx + 1] = 255;
                data[idx + 2] = 255;
            }
        }
        Frame::new(number, timestamp, 160, 160, data)
    }

    /// 上黑下白 - 与左右分割恰好 50% 相似
    fn top_bottom_frame(number: u64, timestamp: f64) -> Frame {
        let mut data = vec![0u8; 160 * 160 * 3];
        for y in 80..160usize {
            for x in 0..160usize {
                let idx = (y * 160 + x) * 3;
                data[idx] = 255;
                data[idx + 1] = 255;
                data[idx + 2] = 255;
            }
        }
        Frame::new(number, timestamp, 160, 160, data)
    }

    fn ok_frames(frames: Vec<Frame>) -> Vec<Result<Frame, VideoError>> {
        frames.into_iter().map(Ok).collect()
    }

    #[test]
    fn test_first_frame_always_captured() {
        // 阈值 0、间隔巨大也必须捕获第一帧
        let config = SelectorConfig {
            similarity_threshold: 0.0,
            min_frame_interval: 1000,
        };
        let captured: Vec<_> = select_distinct_frames(ok_frames(vec![solid_frame(0, 0.0, 128)]), config)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].frame_number(), 0);
    }

    #[test]
    fn test_empty_stream_yields_nothing() {
        let captured: Vec<_> =
            select_distinct_frames(ok_frames(vec![]), SelectorConfig::default())
                .collect::<Result<_, _>>()
                .unwrap();
        assert!(captured.is_empty());
    }

    #[test]
    fn test_threshold_is_strict_less_than() {
        // 左右分割与上下分割相似度恰为 0.5
        let frames = vec![left_right_frame(0, 0.0), top_bottom_frame(30, 1.0)];

        // 阈值正好等于相似度：第二帧是重复
        let at_threshold = SelectorConfig {
            similarity_threshold: 0.5,
            min_frame_interval: 1,
        };
        let captured: Vec<_> = select_distinct_frames(ok_frames(frames.clone()), at_threshold)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(captured.len(), 1);

        // 阈值略高于相似度：第二帧捕获
        let above_threshold = SelectorConfig {
            similarity_threshold: 0.51,
            min_frame_interval: 1,
        };
        let captured: Vec<_> = select_distinct_frames(ok_frames(frames), above_threshold)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(captured.len(), 2);
    }

    #[test]
    fn test_min_frame_interval_boundary() {
        let config = SelectorConfig {
            similarity_threshold: 0.92,
            min_frame_interval: 10,
        };

        // 间隔 k-1：第二帧太近，只捕获一帧
        let close = vec![left_right_frame(0, 0.0), top_bottom_frame(9, 0.3)];
        let captured: Vec<_> = select_distinct_frames(ok_frames(close), config.clone())
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(captured.len(), 1);

        // 间隔正好 k：两帧都捕获
        let spaced = vec![left_right_frame(0, 0.0), top_bottom_frame(10, 0.33)];
        let captured: Vec<_> = select_distinct_frames(ok_frames(spaced), config)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(captured.len(), 2);
    }

    #[test]
    fn test_three_distinct_frames_scenario() {
        // 三帧两两 50% 相似，阈值 0.51、间隔 1 时全部捕获
        let frames = vec![
            left_right_frame(0, 0.0),
            top_bottom_frame(300, 10.0),
            solid_frame(600, 20.0, 128),
        ];
        let config = SelectorConfig {
            similarity_threshold: 0.51,
            min_frame_interval: 1,
        };
        let captured: Vec<_> = select_distinct_frames(ok_frames(frames), config)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(captured.len(), 3);
        assert_eq!(
            captured.iter().map(|c| c.frame_number()).collect::<Vec<_>>(),
            vec![0, 300, 600]
        );
    }

    #[test]
    fn test_rejection_does_not_update_state() {
        let config = SelectorConfig {
            similarity_threshold: 0.92,
            min_frame_interval: 15,
        };
        let mut selector = FrameSelector::new(config);

        // 捕获第一帧
        assert!(selector.process(left_right_frame(0, 0.0)).unwrap().is_some());

        // 间隔足够但内容近似 → 拒绝，且不得刷新间隔时钟
        assert!(selector.process(left_right_frame(20, 0.66)).unwrap().is_none());

        // 内容不同但离第 0 帧（而不是第 20 帧）计算间隔
        assert!(selector.process(top_bottom_frame(25, 0.83)).unwrap().is_some());
    }

    #[test]
    fn test_rejected_similar_frame_does_not_poison_hash() {
        let config = SelectorConfig {
            similarity_threshold: 0.92,
            min_frame_interval: 15,
        };
        let mut selector = FrameSelector::new(config);

        assert!(selector.process(left_right_frame(0, 0.0)).unwrap().is_some());
        // 内容不同但太近 → 拒绝，指纹保持第 0 帧的
        assert!(selector.process(top_bottom_frame(5, 0.16)).unwrap().is_none());
        // 同样内容再来一次且间隔够远 → 相对第 0 帧仍然算新内容
        assert!(selector.process(top_bottom_frame(20, 0.66)).unwrap().is_some());
    }

    #[test]
    fn test_upstream_error_propagates() {
        let frames: Vec<Result<Frame, VideoError>> = vec![
            Ok(left_right_frame(0, 0.0)),
            Err(VideoError::InvalidFrame("decode failed".into())),
            Ok(top_bottom_frame(30, 1.0)),
        ];
        let results: Vec<_> =
            select_distinct_frames(frames, SelectorConfig { similarity_threshold: 0.51, min_frame_interval: 1 })
                .collect();

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_selection_is_lazy() {
        let pulled = Rc::new(Cell::new(0u32));
        let counter = pulled.clone();
        let frames = (0..100u64).map(move |i| {
            counter.set(counter.get() + 1);
            Ok(solid_frame(i, i as f64 / 30.0, (i * 2) as u8))
        });

        let first = select_distinct_frames(frames, SelectorConfig::default())
            .next()
            .unwrap()
            .unwrap();

        assert_eq!(first.frame_number(), 0);
        // 只消费了第一帧，后面的 99 帧没有被拉取
        assert_eq!(pulled.get(), 1);
    }

    #[test]
    fn test_fresh_state_per_invocation() {
        let config = SelectorConfig::default();
        let first: Vec<_> =
            select_distinct_frames(ok_frames(vec![left_right_frame(0, 0.0)]), config.clone())
                .collect::<Result<_, _>>()
                .unwrap();
        // 同一帧在新调用中必须重新被捕获
        let second: Vec<_> =
            select_distinct_frames(ok_frames(vec![left_right_frame(0, 0.0)]), config)
                .collect::<Result<_, _>>()
                .unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_process_batch_matches_streaming() {
        let make_frames = || {
            vec![
                left_right_frame(0, 0.0),
                left_right_frame(10, 0.33),
                top_bottom_frame(30, 1.0),
                top_bottom_frame(35, 1.16),
                solid_frame(60, 2.0, 128),
            ]
        };
        let config = SelectorConfig {
            similarity_threshold: 0.51,
            min_frame_interval: 15,
        };

        let streamed: Vec<_> = select_distinct_frames(ok_frames(make_frames()), config.clone())
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        let mut selector = FrameSelector::new(config);
        let batched = selector.process_batch(make_frames()).unwrap();

        assert_eq!(
            streamed.iter().map(|c| c.frame_number()).collect::<Vec<_>>(),
            batched.iter().map(|c| c.frame_number()).collect::<Vec<_>>(),
        );
        assert_eq!(batched.iter().map(|c| c.frame_number()).collect::<Vec<_>>(), vec![0, 30, 60]);
    }

    #[test]
    fn test_reset_clears_capture_history() {
        let mut selector = FrameSelector::new(SelectorConfig::default());
        assert!(selector.process(left_right_frame(0, 0.0)).unwrap().is_some());
        assert!(selector.process(left_right_frame(30, 1.0)).unwrap().is_none());

        selector.reset();
        assert!(selector.process(left_right_frame(30, 1.0)).unwrap().is_some());
    }
}
