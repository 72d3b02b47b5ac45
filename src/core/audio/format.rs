//! Audio output formats requested from the synthesis provider.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::AudioError;

/// Encoded audio formats the provider can return.
///
/// Only [`AudioFormat::Mp3`] and [`AudioFormat::Wav`] can be post-processed;
/// the others are accepted by the provider client for one-shot synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MPEG-1/2 Layer III (default)
    #[default]
    Mp3,
    /// 16-bit linear PCM in a RIFF/WAVE container
    Wav,
    /// Opus in an Ogg container
    Opus,
    /// FLAC
    Flac,
    /// AAC (ADTS)
    Aac,
}

impl AudioFormat {
    /// Canonical lowercase name, also used in configuration.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Opus => "opus",
            Self::Flac => "flac",
            Self::Aac => "aac",
        }
    }

    /// Value of the provider's `encoding` query parameter.
    #[inline]
    pub fn encoding(&self) -> &'static str {
        match self {
            Self::Wav => "linear16",
            other => other.as_str(),
        }
    }

    /// Value of the provider's `container` query parameter, when one is needed.
    #[inline]
    pub fn container(&self) -> Option<&'static str> {
        match self {
            Self::Wav => Some("wav"),
            _ => None,
        }
    }

    /// File extension for written fragments.
    #[inline]
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// MIME type for this format.
    #[inline]
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
            Self::Opus => "audio/ogg",
            Self::Flac => "audio/flac",
            Self::Aac => "audio/aac",
        }
    }

    /// All formats.
    pub fn all() -> &'static [AudioFormat] {
        &[Self::Mp3, Self::Wav, Self::Opus, Self::Flac, Self::Aac]
    }
}

impl FromStr for AudioFormat {
    type Err = AudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mp3" | "mpeg" => Ok(Self::Mp3),
            "wav" | "linear16" | "pcm" => Ok(Self::Wav),
            "opus" | "ogg" => Ok(Self::Opus),
            "flac" => Ok(Self::Flac),
            "aac" => Ok(Self::Aac),
            other => Err(AudioError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
