pub mod orpheus;
pub mod probe;
pub mod snac;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use serde::Serialize;

use crate::config::Config;
use crate::error::AppError;
use crate::generation::GenerationRequest;
use crate::prompt::{self, Voice};

pub use orpheus::OrpheusBackend;
pub use probe::{AvailabilityProber, AvailabilityStatus, ProbeError};

/// One decoded chunk of 16-bit mono PCM.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    pub samples: Vec<i16>,
}

/// Everything the backend needs for one synthesis run.
#[derive(Debug, Clone)]
pub struct SynthesisJob<'a> {
    pub prompt: &'a str,
    pub voice: Voice,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
    pub max_tokens: u32,
    pub output_path: &'a Path,
}

/// Token generation plus audio synthesis, writing a WAV to `job.output_path`.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    async fn synthesize(&self, job: &SynthesisJob<'_>)
        -> Result<Option<Vec<AudioSegment>>, AppError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalGeneration {
    pub output_file: PathBuf,
    /// Seconds spent in the backend call.
    pub duration: f64,
    pub voice: Voice,
    pub segments: usize,
}

/// `{outputs_dir}/{voice}_{YYYYMMDD_HHMMSS}.wav`. Two runs for the same voice
/// within one second share a path and the later one overwrites.
pub fn output_path_for(outputs_dir: &Path, voice: Voice, at: NaiveDateTime) -> PathBuf {
    outputs_dir.join(format!("{}_{}.wav", voice, at.format("%Y%m%d_%H%M%S")))
}

/// An empty segment list and a missing one both count as zero.
pub fn segment_count(segments: Option<&[AudioSegment]>) -> usize {
    segments.map(|s| s.len()).unwrap_or(0)
}

pub struct LocalGenerator {
    prober: AvailabilityProber,
    backend: Arc<dyn SpeechBackend>,
    outputs_dir: PathBuf,
}

impl LocalGenerator {
    pub fn new(config: &Config, backend: Arc<dyn SpeechBackend>) -> Result<Self, AppError> {
        Ok(Self {
            prober: AvailabilityProber::new(config)?,
            backend,
            outputs_dir: config.outputs_dir.clone(),
        })
    }

    pub fn outputs_dir(&self) -> &Path {
        &self.outputs_dir
    }

    pub async fn check(&self) -> AvailabilityStatus {
        self.prober.check().await
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
        output_file: Option<PathBuf>,
    ) -> Result<LocalGeneration, AppError> {
        let status = self.prober.check().await;
        if !status.available {
            tracing::warn!("Local model unavailable, skipping generation");
            return Err(AppError::Unavailable(status.message));
        }

        let text = prompt::apply_emotion_tags(&request.text, &request.emotion_tags);

        let output_file = match output_file {
            Some(path) => path,
            None => {
                tokio::fs::create_dir_all(&self.outputs_dir).await?;
                output_path_for(&self.outputs_dir, request.voice, Local::now().naive_local())
            }
        };

        let job = SynthesisJob {
            prompt: &text,
            voice: request.voice,
            temperature: request.temperature,
            top_p: request.top_p,
            repetition_penalty: request.repetition_penalty,
            max_tokens: request.max_tokens,
            output_path: &output_file,
        };

        tracing::info!(voice = %request.voice, output = %output_file.display(), "Generating speech");

        let start = Instant::now();
        let result = self.backend.synthesize(&job).await;
        let duration = start.elapsed().as_secs_f64();

        // A failed run may leave a partial file behind; it is not removed.
        let segments = result.map_err(|e| {
            tracing::error!("Speech generation failed after {:.2}s: {}", duration, e);
            e
        })?;

        let segments = segment_count(segments.as_deref());
        tracing::info!(segments, duration, "Speech generated");

        Ok(LocalGeneration {
            output_file,
            duration,
            voice: request.voice,
            segments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeBackend {
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
        result: fn() -> Result<Option<Vec<AudioSegment>>, AppError>,
    }

    impl FakeBackend {
        fn returning(result: fn() -> Result<Option<Vec<AudioSegment>>, AppError>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
                result,
            })
        }
    }

    #[async_trait]
    impl SpeechBackend for FakeBackend {
        async fn synthesize(
            &self,
            job: &SynthesisJob<'_>,
        ) -> Result<Option<Vec<AudioSegment>>, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(job.prompt.to_string());
            std::fs::write(job.output_path, b"RIFF")?;
            (self.result)()
        }
    }

    fn two_segments() -> Result<Option<Vec<AudioSegment>>, AppError> {
        Ok(Some(vec![
            AudioSegment { samples: vec![0; 4] },
            AudioSegment { samples: vec![1; 4] },
        ]))
    }

    async fn healthy_server() -> mockito::ServerGuard {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/models")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        server
    }

    fn local_generator(url: &str, outputs: &Path, backend: Arc<FakeBackend>) -> LocalGenerator {
        let config = Config {
            local_api_url: url.to_string(),
            outputs_dir: outputs.to_path_buf(),
            ..Config::default()
        };
        LocalGenerator::new(&config, backend).unwrap()
    }

    #[test]
    fn output_path_uses_voice_and_second_timestamp() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 1)
            .unwrap();
        let path = output_path_for(Path::new("outputs"), Voice::Jess, at);
        assert_eq!(path, PathBuf::from("outputs/jess_20240309_070501.wav"));
    }

    #[test]
    fn same_second_same_voice_collides() {
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_milli_opt(12, 0, 0, 100)
            .unwrap();
        let later = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_milli_opt(12, 0, 0, 900)
            .unwrap();
        assert_eq!(
            output_path_for(Path::new("o"), Voice::Dan, at),
            output_path_for(Path::new("o"), Voice::Dan, later)
        );
    }

    #[test]
    fn empty_and_missing_segments_both_count_zero() {
        let empty: Vec<AudioSegment> = Vec::new();
        let one = vec![AudioSegment { samples: vec![] }];
        assert_eq!(segment_count(None), 0);
        assert_eq!(segment_count(Some(empty.as_slice())), 0);
        assert_eq!(segment_count(Some(one.as_slice())), 1);
    }

    #[tokio::test]
    async fn unavailable_model_never_reaches_backend() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dir = tempfile::tempdir().unwrap();
        let backend = FakeBackend::returning(two_segments);
        let generator = local_generator(&format!("http://{}", addr), dir.path(), backend.clone());

        let err = generator
            .generate(&GenerationRequest::new("Hello", Voice::Tara), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Unavailable(_)));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn success_reports_segments_and_derived_path() {
        let server = healthy_server().await;
        let dir = tempfile::tempdir().unwrap();
        let outputs = dir.path().join("outputs");
        let backend = FakeBackend::returning(two_segments);
        let generator = local_generator(&server.url(), &outputs, backend.clone());

        let request = GenerationRequest::new("Hello", Voice::Zoe).with_emotions(["laugh", "sigh"]);
        let result = generator.generate(&request, None).await.unwrap();

        assert_eq!(result.segments, 2);
        assert_eq!(result.voice, Voice::Zoe);
        assert!(result.duration >= 0.0);
        assert!(result.output_file.starts_with(&outputs));
        let name = result.output_file.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("zoe_"));
        assert!(name.ends_with(".wav"));
        assert_eq!(name.len(), "zoe_YYYYMMDD_HHMMSS.wav".len());
        assert!(result.output_file.exists());

        let prompts = backend.prompts.lock().unwrap();
        assert_eq!(prompts.as_slice(), ["<laugh> <sigh> Hello"]);
    }

    #[tokio::test]
    async fn explicit_output_path_is_used() {
        let server = healthy_server().await;
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("custom.wav");
        let generator = local_generator(
            &server.url(),
            &dir.path().join("unused"),
            FakeBackend::returning(|| Ok(None)),
        );

        let result = generator
            .generate(&GenerationRequest::new("Hi", Voice::Tara), Some(target.clone()))
            .await
            .unwrap();

        assert_eq!(result.output_file, target);
        assert_eq!(result.segments, 0);
        assert!(!dir.path().join("unused").exists());
    }

    #[tokio::test]
    async fn backend_failure_keeps_partial_file() {
        let server = healthy_server().await;
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("partial.wav");
        let generator = local_generator(
            &server.url(),
            dir.path(),
            FakeBackend::returning(|| Err(AppError::Backend("inference failed".into()))),
        );

        let err = generator
            .generate(&GenerationRequest::new("Hi", Voice::Tara), Some(target.clone()))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "inference failed");
        assert!(target.exists());
    }
}
