//! 语音转写端口 - 把音频文件变成带时间戳的文本段

use std::cell::Cell;

use super::error::AudioError;
use crate::core::transcript::AudioSegment;

/// 语音转写端口。返回按起始时间升序的文本段。
pub trait AudioTranscriber {
    fn transcribe_audio(&self, audio_path: &str) -> Result<Vec<AudioSegment>, AudioError>;
}

/// 返回预置文本段的 fake，测试用
pub struct FakeAudioTranscriber {
    segments: Vec<AudioSegment>,
    should_fail: bool,
    calls: Cell<u32>,
}

impl FakeAudioTranscriber {
    pub fn new(segments: Vec<AudioSegment>) -> Self {
        Self {
            segments,
            should_fail: false,
            calls: Cell::new(0),
        }
    }

    /// 由一组文本构造等长顺延的段，方便测试铺数据
    pub fn from_texts(segment_duration: f64, texts: &[&str]) -> Self {
        let mut segments = Vec::with_capacity(texts.len());
        let mut current = 0.0;
        for text in texts {
            segments.push(AudioSegment::new(current, current + segment_duration, *text));
            current += segment_duration;
        }
        Self::new(segments)
    }

    pub fn failing() -> Self {
        Self {
            segments: Vec::new(),
            should_fail: true,
            calls: Cell::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.get()
    }
}

impl AudioTranscriber for FakeAudioTranscriber {
    fn transcribe_audio(&self, _audio_path: &str) -> Result<Vec<AudioSegment>, AudioError> {
        self.calls.set(self.calls.get() + 1);
        if self.should_fail {
            return Err(AudioError::Transcription("fake transcription failure".into()));
        }
        Ok(self.segments.clone())
    }
}

#[cfg(feature = "sherpa")]
pub use sherpa_impl::SherpaAudioTranscriber;

#[cfg(feature = "sherpa")]
mod sherpa_impl {
    use std::path::Path;
    use std::sync::Mutex;

    use log::{error, info};

    use super::{AudioError, AudioSegment, AudioTranscriber};
    use crate::core::audio::handler::NcnnHandle;
    use crate::core::audio::utils::load_wav_mono_f32;
    use crate::core::audio::vad::VadHandle;

    /// sherpa-ncnn ASR + Silero VAD 组合转写器
    ///
    /// models_dir 下需要包含：
    /// - sherpa-ncnn/ (ASR 模型)
    /// - silero-vad/ (VAD 模型)
    pub struct SherpaAudioTranscriber {
        ncnn: NcnnHandle,
        vad: Mutex<VadHandle>,
    }

    impl SherpaAudioTranscriber {
        pub fn new(models_dir: &str) -> Result<Self, AudioError> {
            info!("🎙️ SherpaAudioTranscriber: loading models from {}", models_dir);

            let sherpa_path = Path::new(models_dir).join("sherpa-ncnn");
            if !sherpa_path.exists() {
                return Err(AudioError::ModelLoadFailed(format!(
                    "sherpa-ncnn model not found at {:?}",
                    sherpa_path
                )));
            }
            let ncnn = NcnnHandle::new(&sherpa_path.to_string_lossy())?;

            let vad_path = Path::new(models_dir).join("silero-vad");
            if !vad_path.exists() {
                return Err(AudioError::ModelLoadFailed(format!(
                    "silero-vad model not found at {:?}",
                    vad_path
                )));
            }
            let vad = VadHandle::new(&vad_path.to_string_lossy())?;

            info!("✅ SherpaAudioTranscriber ready");
            Ok(Self {
                ncnn,
                vad: Mutex::new(vad),
            })
        }
    }

    impl AudioTranscriber for SherpaAudioTranscriber {
        fn transcribe_audio(&self, audio_path: &str) -> Result<Vec<AudioSegment>, AudioError> {
            let pcm = load_wav_mono_f32(audio_path)?;

            let speech_segments = {
                let mut vad = self
                    .vad
                    .lock()
                    .map_err(|e| AudioError::SherpaNcnn(format!("VAD lock poisoned: {}", e)))?;
                match vad.detect_speech_segments(&pcm, 16_000) {
                    Ok(segments) => segments,
                    Err(e) => {
                        error!("❌ VAD detection failed: {}, using full audio", e);
                        vec![crate::core::audio::vad::SpeechSegment {
                            start: 0.0,
                            end: pcm.len() as f32 / 16_000.0,
                        }]
                    }
                }
            };

            info!("🎙️ Running ASR on {} speech segments", speech_segments.len());

            let mut results = Vec::new();
            for (index, segment) in speech_segments.iter().enumerate() {
                let samples = VadHandle::extract_segment(&pcm, 16_000, segment);
                match self.ncnn.transcribe(&samples, 16_000) {
                    Ok(text) => {
                        let text = text.trim();
                        if !text.is_empty() {
                            results.push(AudioSegment::new(
                                segment.start as f64,
                                segment.end as f64,
                                text,
                            ));
                        }
                    }
                    Err(e) => {
                        // 单段失败跳过，不放弃整个音频
                        error!("❌ Segment {} failed: {}", index + 1, e);
                        continue;
                    }
                }
            }

            Ok(results)
        }
    }
}
