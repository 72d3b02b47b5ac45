//! Test Fixtures Module
//!
//! Shared fixtures for the integration tests:
//! - Audio fixtures (programmatically generated MP3 frames and WAV tones)
//! - Scripted synthesizers standing in for the provider

// Allow dead code in test fixtures - not every test binary uses every helper
#![allow(dead_code)]

pub mod audio_fixtures;
pub mod synthesizers;

pub use audio_fixtures::*;
pub use synthesizers::*;
