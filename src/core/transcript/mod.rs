pub mod models;
pub mod timeline;
pub mod transcriber;

pub use models::{AudioSegment, FrameResult, TranscriptResult};
pub use timeline::assign_segments;
pub use transcriber::{
    ProcessOptions, TranscribeError, TranscriberConfig, VideoTranscriber, DEFAULT_VISION_PROMPT,
};
