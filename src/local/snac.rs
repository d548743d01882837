use std::path::Path;
use std::sync::Mutex;

use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;

use crate::error::AppError;

pub const SAMPLE_RATE: u32 = 24_000;

/// Slice of each decoded window that is kept. The decoder output overlaps
/// between consecutive windows, only the middle part is new audio.
const KEEP_START: usize = 2048;
const KEEP_END: usize = 4096;

/// Codes for the three SNAC layers (1, 2 and 4 codes per frame).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SnacCodes {
    pub layer0: Vec<i64>,
    pub layer1: Vec<i64>,
    pub layer2: Vec<i64>,
}

impl SnacCodes {
    pub fn frames(&self) -> usize {
        self.layer0.len()
    }
}

pub struct SnacDecoder {
    session: Mutex<Session>,
}

impl SnacDecoder {
    pub fn load(model_path: &Path) -> Result<Self, AppError> {
        if !model_path.exists() {
            return Err(AppError::Decoder(format!(
                "model not found at {}",
                model_path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| AppError::Decoder(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| AppError::Decoder(format!("Failed to set optimization level: {}", e)))?
            .with_intra_threads(4)
            .map_err(|e| AppError::Decoder(format!("Failed to set threads: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| AppError::Decoder(format!("Failed to load model: {}", e)))?;

        tracing::info!("Loaded SNAC decoder from {}", model_path.display());

        Ok(Self {
            session: Mutex::new(session),
        })
    }

    /// Decode one window of codes into float samples in [-1.0, 1.0].
    pub fn decode(&self, codes: &SnacCodes) -> Result<Vec<f32>, AppError> {
        let frames = codes.frames();
        if frames == 0 {
            return Ok(Vec::new());
        }

        // audio_codes.N: [batch, frames * 2^N]
        let layer0 = Value::from_array((vec![1, frames], codes.layer0.clone()))
            .map_err(|e| AppError::Decoder(format!("Failed to create layer 0 tensor: {}", e)))?;
        let layer1 = Value::from_array((vec![1, frames * 2], codes.layer1.clone()))
            .map_err(|e| AppError::Decoder(format!("Failed to create layer 1 tensor: {}", e)))?;
        let layer2 = Value::from_array((vec![1, frames * 4], codes.layer2.clone()))
            .map_err(|e| AppError::Decoder(format!("Failed to create layer 2 tensor: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| AppError::Decoder("session lock poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs![layer0, layer1, layer2])
            .map_err(|e| AppError::Decoder(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get("audio_values")
            .or_else(|| outputs.get("audio"))
            .ok_or_else(|| AppError::Decoder("Missing output tensor".to_string()))?;

        let output_view = output
            .try_extract_tensor::<f32>()
            .map_err(|e| AppError::Decoder(format!("Failed to extract output tensor: {}", e)))?;

        Ok(output_view.1.iter().copied().collect())
    }
}

/// Keep the fresh part of a decoded window and convert it to 16-bit PCM.
pub fn window_to_pcm(samples: &[f32]) -> Vec<i16> {
    let end = KEEP_END.min(samples.len());
    if end <= KEEP_START {
        return Vec::new();
    }
    samples[KEEP_START..end]
        .iter()
        .map(|s| (s * 32767.0).clamp(-32768.0, 32767.0) as i16)
        .collect()
}
