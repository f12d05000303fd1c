//! Speech synthesis through an external TTS command (espeak-ng by default).
//!
//! One engine per process. Starting an utterance cancels the previous one.

use std::process::Stdio;

use tokio::process::{Child, Command};

use crate::config::SpeechSettings;
use crate::models::VoiceGender;

/// espeak-ng voice for each gender (Brazilian Portuguese).
pub fn voice_name(gender: VoiceGender) -> &'static str {
    match gender {
        VoiceGender::Female => "pt-br+f3",
        VoiceGender::Male => "pt-br+m3",
    }
}

pub struct SpeechEngine {
    settings: SpeechSettings,
    current: Option<Child>,
}

impl SpeechEngine {
    pub fn new(settings: SpeechSettings) -> Self {
        Self {
            settings,
            current: None,
        }
    }

    /// An engine that never speaks.
    pub fn disabled() -> Self {
        Self::new(SpeechSettings {
            enabled: false,
            ..SpeechSettings::default()
        })
    }

    pub fn enabled(&self) -> bool {
        self.settings.enabled && !self.settings.command.trim().is_empty()
    }

    /// Command-line arguments for one utterance.
    pub fn args(&self, text: &str, gender: VoiceGender) -> Vec<String> {
        vec![
            "-v".to_string(),
            voice_name(gender).to_string(),
            "-s".to_string(),
            self.settings.rate_wpm.to_string(),
            text.to_string(),
        ]
    }

    /// Speak `text`, cancelling anything still being spoken.
    pub fn speak(&mut self, text: &str, gender: VoiceGender) {
        self.stop();
        if !self.enabled() {
            tracing::debug!("Speech disabled, not reading message aloud");
            return;
        }

        let preview: String = text.chars().take(50).collect();
        tracing::debug!("Speaking with {}: {}...", voice_name(gender), preview);

        let spawned = Command::new(&self.settings.command)
            .args(self.args(text, gender))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        match spawned {
            Ok(child) => self.current = Some(child),
            Err(e) => tracing::warn!("Failed to start {}: {}", self.settings.command, e),
        }
    }

    /// Cancel the running utterance, if any.
    pub fn stop(&mut self) {
        if let Some(mut child) = self.current.take() {
            if let Err(e) = child.start_kill() {
                tracing::debug!("Speech process already gone: {}", e);
            }
        }
    }

    /// Whether an utterance is still running.
    #[cfg(test)]
    pub fn is_speaking(&mut self) -> bool {
        match self.current.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }
}

impl Drop for SpeechEngine {
    fn drop(&mut self) {
        self.stop();
    }
}
