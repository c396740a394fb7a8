pub mod error;
pub mod extractor;
pub mod transcriber;
pub mod utils;

#[cfg(feature = "sherpa")]
pub mod handler;
#[cfg(feature = "sherpa")]
pub mod vad;

pub use error::AudioError;
pub use extractor::{AudioExtractor, FakeAudioExtractor, FfmpegAudioExtractor};
pub use transcriber::{AudioTranscriber, FakeAudioTranscriber};
pub use utils::{load_wav_mono_f32, resample_to_16k_mono};

#[cfg(feature = "sherpa")]
pub use handler::NcnnHandle;
#[cfg(feature = "sherpa")]
pub use transcriber::SherpaAudioTranscriber;
#[cfg(feature = "sherpa")]
pub use vad::{SpeechSegment, VadHandle};
