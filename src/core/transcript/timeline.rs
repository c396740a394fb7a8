//! 时间线归并 - 把语音段按起始时间挂到各关键帧的时间窗上
//!
//! 第 i 帧拥有半开窗口 [start_i, start_{i+1})。首帧窗口从 0.0 起
//! （开场白归第一张幻灯片），末帧窗口到正无穷。每个语音段按其
//! 起始时间恰好归属一个窗口。

use super::models::{AudioSegment, FrameResult};

/// 把语音段归并到关键帧上。`segments` 需按起始时间升序，
/// `frames` 的时间戳需严格递增。没有关键帧时不做任何事，
/// 语音段由调用方以扁平列表保留。
pub fn assign_segments(frames: &mut [FrameResult], segments: &[AudioSegment]) {
    if frames.is_empty() {
        return;
    }

    for segment in segments {
        if segment.start_seconds < 0.0 {
            continue; // 契约之外的输入，不属于任何窗口
        }
        let owner = owner_index(frames, segment.start_seconds);
        frames[owner].audio_segments.push(segment.clone());
    }
}

/// 起始时间落进哪个窗口。首帧窗口左边界视为 0.0。
fn owner_index(frames: &[FrameResult], start_seconds: f64) -> usize {
    for (i, next) in frames.iter().enumerate().skip(1) {
        if start_seconds < next.timestamp_seconds() {
            return i - 1;
        }
    }
    frames.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::video::{CapturedFrame, Frame, FrameHash};

    fn frame_at(number: u64, timestamp: f64) -> FrameResult {
        let frame = Frame::new(number, timestamp, 4, 4, vec![128; 4 * 4 * 3]);
        let hash = FrameHash::compute(&frame).unwrap();
        FrameResult::new(CapturedFrame { frame, hash })
    }

    fn texts(frame: &FrameResult) -> Vec<&str> {
        frame.audio_segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_segments_partition_across_windows() {
        // 帧时间戳 [0, 10, 20]，四个语音段按起始时间分属三个窗口
        let mut frames = vec![frame_at(0, 0.0), frame_at(300, 10.0), frame_at(600, 20.0)];
        let segments = vec![
            AudioSegment::new(2.0, 5.0, "a"),
            AudioSegment::new(7.0, 9.0, "b"),
            AudioSegment::new(12.0, 15.0, "c"),
            AudioSegment::new(22.0, 25.0, "d"),
        ];

        assign_segments(&mut frames, &segments);

        assert_eq!(texts(&frames[0]), vec!["a", "b"]);
        assert_eq!(texts(&frames[1]), vec!["c"]);
        assert_eq!(texts(&frames[2]), vec!["d"]);

        // 每个段恰好归属一个帧
        let total: usize = frames.iter().map(|f| f.audio_segments.len()).sum();
        assert_eq!(total, segments.len());
    }

    #[test]
    fn test_first_window_claims_segments_before_first_frame() {
        // 第一张关键帧出现在 3.0s，更早开始的语音也归它
        let mut frames = vec![frame_at(90, 3.0), frame_at(300, 10.0)];
        let segments = vec![AudioSegment::new(1.0, 2.0, "intro")];

        assign_segments(&mut frames, &segments);

        assert_eq!(texts(&frames[0]), vec!["intro"]);
        assert!(frames[1].audio_segments.is_empty());
    }

    #[test]
    fn test_last_window_extends_to_infinity() {
        let mut frames = vec![frame_at(0, 0.0)];
        let segments = vec![AudioSegment::new(9999.0, 10000.0, "tail")];

        assign_segments(&mut frames, &segments);

        assert_eq!(texts(&frames[0]), vec!["tail"]);
    }

    #[test]
    fn test_window_boundary_is_half_open() {
        let mut frames = vec![frame_at(0, 0.0), frame_at(300, 10.0)];
        // 恰好在下一帧时间戳上开始的段属于下一帧
        let segments = vec![AudioSegment::new(10.0, 12.0, "boundary")];

        assign_segments(&mut frames, &segments);

        assert!(frames[0].audio_segments.is_empty());
        assert_eq!(texts(&frames[1]), vec!["boundary"]);
    }

    #[test]
    fn test_no_frames_leaves_segments_untouched() {
        let mut frames: Vec<FrameResult> = vec![];
        let segments = vec![AudioSegment::new(0.0, 1.0, "audio only")];
        // 不崩溃即可，扁平段列表由调用方保留
        assign_segments(&mut frames, &segments);
        assert!(frames.is_empty());
    }

    #[test]
    fn test_empty_segments_is_noop() {
        let mut frames = vec![frame_at(0, 0.0)];
        assign_segments(&mut frames, &[]);
        assert!(frames[0].audio_segments.is_empty());
    }
}
