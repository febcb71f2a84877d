//! Transcription settings

use serde::{Deserialize, Serialize};

use crate::error::{KeyscribeError, Result};

/// Largest manual shift accepted, in semitones; the full MIDI pitch span
pub const MAX_MANUAL_TRANSPOSE: i32 = 127;

/// How simultaneous notes are reduced to playable voices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VoicePolicy {
    /// Melody with contour memory, lowest-octave bass, up to two inner voices
    #[default]
    ThreeVoice,
    /// Left hand plays the lowest note, right hand the highest
    HandSeparation,
    /// Every note folded independently into the window
    Direct,
}

impl VoicePolicy {
    /// Onset grouping window used when none is configured.
    pub fn default_window(&self) -> f64 {
        match self {
            Self::ThreeVoice => 0.020,
            Self::HandSeparation => 0.010,
            Self::Direct => 0.020,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ThreeVoice => "three-voice",
            Self::HandSeparation => "hand-separation",
            Self::Direct => "direct",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscribeConfig {
    /// Detect the key and transpose the piece to C major
    pub auto_transpose: bool,
    /// Explicit key shift in semitones; wins over `auto_transpose`
    pub manual_transpose: Option<i32>,
    pub voice_policy: VoicePolicy,
    /// Chord grouping window in seconds, policy default when unset
    pub chord_window: Option<f64>,
}

impl Default for TranscribeConfig {
    fn default() -> Self {
        Self {
            auto_transpose: true,
            manual_transpose: None,
            voice_policy: VoicePolicy::default(),
            chord_window: None,
        }
    }
}

impl TranscribeConfig {
    pub fn with_policy(voice_policy: VoicePolicy) -> Self {
        Self {
            voice_policy,
            ..Default::default()
        }
    }

    pub fn effective_window(&self) -> f64 {
        self.chord_window
            .unwrap_or_else(|| self.voice_policy.default_window())
    }

    pub fn validate(&self) -> Result<()> {
        let window = self.effective_window();
        if !window.is_finite() || window <= 0.0 {
            return Err(KeyscribeError::InvalidConfig(format!(
                "chord window must be a positive number of seconds, got {window}"
            )));
        }
        let shift_range = -MAX_MANUAL_TRANSPOSE..=MAX_MANUAL_TRANSPOSE;
        if let Some(shift) = self.manual_transpose.filter(|s| !shift_range.contains(s)) {
            return Err(KeyscribeError::InvalidConfig(format!(
                "manual transpose must be within ±{MAX_MANUAL_TRANSPOSE} semitones, got {shift}"
            )));
        }
        Ok(())
    }
}
