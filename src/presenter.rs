use base64::Engine;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;

use crate::export::PdfExporter;
use crate::models::{AudioClip, ExportPayload};
use crate::speech::{SpeechSynthesizer, SynthesisError};

const AUDIO_MIME: &str = "audio/mpeg";

// ============================================================================
// Render Parameters / Result
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub language: String,
    pub export_filename: Option<&'static str>,
}

/// What one action shows: text always, audio and PDF when their stage worked.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub text: String,
    pub audio: Option<AudioClip>,
    pub audio_error: Option<String>,
    pub export: Option<ExportPayload>,
    pub export_error: Option<String>,
}

// ============================================================================
// Temporary Audio
// ============================================================================

/// An MP3 on disk for the duration of playback. Removed on drop.
struct TempAudio {
    file: NamedTempFile,
}

impl TempAudio {
    fn write(audio: &[u8]) -> Result<Self, SynthesisError> {
        let mut file = tempfile::Builder::new()
            .prefix("consultai-")
            .suffix(".mp3")
            .tempfile()?;
        file.write_all(audio)?;
        file.flush()?;
        Ok(Self { file })
    }

    fn path(&self) -> &Path {
        self.file.path()
    }

    fn read(&self) -> Result<Vec<u8>, SynthesisError> {
        Ok(std::fs::read(self.path())?)
    }
}

// ============================================================================
// Presenter
// ============================================================================

pub struct ResponsePresenter {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    exporter: PdfExporter,
}

impl ResponsePresenter {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, exporter: PdfExporter) -> Self {
        Self {
            synthesizer,
            exporter,
        }
    }

    pub fn exporter(&self) -> &PdfExporter {
        &self.exporter
    }

    /// Shared tail of every task. Later stages never take away earlier output.
    pub async fn render(&self, text: &str, options: &RenderOptions) -> Rendered {
        let mut rendered = Rendered {
            text: text.to_string(),
            audio: None,
            audio_error: None,
            export: None,
            export_error: None,
        };

        match self.speak(text, &options.language).await {
            Ok(clip) => rendered.audio = Some(clip),
            Err(e) => {
                log::warn!("🔇 Speech synthesis failed: {}", e);
                rendered.audio_error = Some(e.to_string());
            }
        }

        if let Some(filename) = options.export_filename {
            match self.exporter.export(text, filename) {
                Ok(artifact) => {
                    log::info!(
                        "📄 Exported {} ({} pages, {} bytes)",
                        artifact.filename,
                        artifact.pages,
                        artifact.bytes.len()
                    );
                    rendered.export = Some(artifact.to_payload());
                }
                Err(e) => {
                    log::warn!("⚠️  PDF export failed: {}", e);
                    rendered.export_error = Some(e.to_string());
                }
            }
        }

        rendered
    }

    async fn speak(&self, text: &str, language: &str) -> Result<AudioClip, SynthesisError> {
        let audio = self.synthesizer.synthesize(text, language).await?;
        let temp = TempAudio::write(&audio)?;
        let playable = temp.read()?;

        Ok(AudioClip {
            mime_type: AUDIO_MIME.to_string(),
            bytes: playable.len(),
            data_base64: base64::engine::general_purpose::STANDARD.encode(&playable),
        })
    }
}
