use crate::error::AppError;
use crate::prompt::Voice;

/// One speech generation as collected from the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub text: String,
    pub voice: Voice,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
    pub max_tokens: u32,
    pub emotion_tags: Vec<String>,
}

impl GenerationRequest {
    pub fn new(text: impl Into<String>, voice: Voice) -> Self {
        let defaults = crate::config::SamplingDefaults::default();
        Self {
            text: text.into(),
            voice,
            temperature: defaults.temperature,
            top_p: defaults.top_p,
            repetition_penalty: defaults.repetition_penalty,
            max_tokens: defaults.max_tokens,
            emotion_tags: Vec::new(),
        }
    }

    pub fn with_emotions<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emotion_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Blank or whitespace-only text never reaches a backend.
    pub fn ensure_text(&self) -> Result<(), AppError> {
        if self.text.trim().is_empty() {
            return Err(AppError::EmptyInput);
        }
        Ok(())
    }
}
