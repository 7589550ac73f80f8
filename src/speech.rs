use async_trait::async_trait;
use std::time::Duration;

/// Longest piece of text sent to the speech endpoint in one request.
pub const MAX_CHUNK_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthesisError {
    #[error("nothing to synthesize: text is empty")]
    EmptyText,

    #[error("speech service unreachable: {0}")]
    Unreachable(String),

    #[error("speech service returned HTTP {0}")]
    Status(u16),

    #[error("speech service returned no audio")]
    EmptyAudio,

    #[error("audio file: {0}")]
    Io(String),
}

impl From<std::io::Error> for SynthesisError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// MP3 audio for the whole text in the given language.
    async fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>, SynthesisError>;
}

// ============================================================================
// Google Translate TTS
// ============================================================================

pub struct GoogleTts {
    http: reqwest::Client,
    url: String,
}

impl GoogleTts {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SynthesisError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (X11; Linux x86_64)")
            .build()
            .map_err(|e| SynthesisError::Unreachable(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTts {
    async fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>, SynthesisError> {
        if text.trim().is_empty() {
            return Err(SynthesisError::EmptyText);
        }

        let chunks = split_for_speech(text, MAX_CHUNK_CHARS);
        let total = chunks.len().to_string();
        let mut audio = Vec::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            let idx = idx.to_string();
            let textlen = chunk.chars().count().to_string();
            let response = self
                .http
                .get(&self.url)
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", lang),
                    ("q", chunk.as_str()),
                    ("total", total.as_str()),
                    ("idx", idx.as_str()),
                    ("textlen", textlen.as_str()),
                ])
                .send()
                .await
                .map_err(|e| SynthesisError::Unreachable(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(SynthesisError::Status(status.as_u16()));
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| SynthesisError::Unreachable(e.to_string()))?;
            audio.extend_from_slice(&bytes);
        }

        if audio.is_empty() {
            return Err(SynthesisError::EmptyAudio);
        }
        Ok(audio)
    }
}

/// Packs whole words into chunks of at most `max_chars` characters.
/// A single word longer than that is cut into pieces.
pub fn split_for_speech(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word_chars: Vec<char> = word.chars().collect();

        while word_chars.len() > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word_chars.split_off(max_chars);
            chunks.push(word_chars.into_iter().collect());
            word_chars = rest;
        }

        let len = word_chars.len();
        let needed = if current.is_empty() { len } else { len + 1 };
        if current_len + needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word_chars);
        current_len += len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(split_for_speech("Hello there.", 100), vec!["Hello there."]);
    }

    #[test]
    fn test_chunks_respect_limit_and_keep_words() {
        let text = "Our goal is to grow brand awareness in the regional coffee market. ".repeat(10);
        let chunks = split_for_speech(&text, MAX_CHUNK_CHARS);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= MAX_CHUNK_CHARS));
        assert_eq!(
            chunks.join(" ").split_whitespace().collect::<Vec<_>>(),
            text.split_whitespace().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_overlong_word_is_cut() {
        let word = "x".repeat(250);
        let chunks = split_for_speech(&word, 100);
        assert_eq!(
            chunks.iter().map(|c| c.len()).collect::<Vec<_>>(),
            vec![100, 100, 50]
        );
    }

    #[test]
    fn test_whitespace_only_yields_nothing() {
        assert!(split_for_speech(" \n\t ", 100).is_empty());
    }

    #[tokio::test]
    async fn test_empty_text_makes_no_request() {
        let tts = GoogleTts::new("http://127.0.0.1:1/translate_tts", Duration::from_secs(1)).unwrap();
        assert_eq!(
            tts.synthesize("   ", "en").await,
            Err(SynthesisError::EmptyText)
        );
    }
}
