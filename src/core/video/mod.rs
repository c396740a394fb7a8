//! 视频侧核心 - 从讲座/演示视频流中挑出"新画面"关键帧
//!
//! 核心策略：
//! 1. 均值感知哈希 - 灰度 + 区域平均下采样 + 均值二值化
//! 2. 相似度比较 - 指纹一致位占比，首帧按 0.0 处理必然捕获
//! 3. 间隔保底 - 两次捕获之间要求最小帧距，抑制过渡动画连发
//! 4. 惰性流式 - 单遍处理，不回看，消费方可随时提前停止

pub mod error;
pub mod ffmpeg;
pub mod frame;
pub mod hash;
pub mod reader;
pub mod selector;

pub use error::VideoError;
pub use ffmpeg::FfmpegVideoReader;
pub use frame::{Frame, VideoMetadata};
pub use hash::{similarity_to_last, FrameHash, DEFAULT_GRID_SIZE};
pub use reader::{FakeVideoReader, FrameIter, VideoReader};
pub use selector::{select_distinct_frames, CapturedFrame, DistinctFrames, FrameSelector, SelectorConfig};
