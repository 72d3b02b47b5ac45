use std::time::Duration;

use super::env::EnvConfig;
use super::yaml::YamlConfig;
use super::{AppConfig, ConfigError, ConfigResult};
use crate::core::audio::AudioFormat;
use crate::core::pipeline::PipelineConfig;
use crate::core::text::SegmenterConfig;
use crate::core::tts::{DEFAULT_VOICE, DeepgramConfig};

/// Layer YAML values over environment values over defaults.
pub fn merge_config(env: EnvConfig, yaml: Option<YamlConfig>) -> ConfigResult<AppConfig> {
    let yaml = yaml.unwrap_or_default();
    let dg = yaml.deepgram.unwrap_or_default();
    let tts = yaml.tts.unwrap_or_default();

    let mut deepgram = DeepgramConfig::default();
    if let Some(api_key) = dg.api_key.or(env.api_key) {
        deepgram.api_key = api_key;
    }
    if let Some(base_url) = dg.base_url.or(env.base_url) {
        deepgram.base_url = base_url;
    }
    if let Some(models_url) = dg.models_url.or(env.models_url) {
        deepgram.models_url = models_url;
    }
    if let Some(secs) = dg.request_timeout_secs.or(env.request_timeout_secs) {
        deepgram.request_timeout = Duration::from_secs(secs);
    }

    let defaults = PipelineConfig::default();
    let audio_format = match tts.audio_format.or(env.audio_format) {
        Some(value) => value
            .parse::<AudioFormat>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "audio_format".to_string(),
                value,
                reason: e.to_string(),
            })?,
        None => defaults.audio_format,
    };

    let pipeline = PipelineConfig {
        channel_capacity: tts
            .channel_capacity
            .or(env.channel_capacity)
            .unwrap_or(defaults.channel_capacity),
        pacing_delay: tts
            .pacing_delay_ms
            .or(env.pacing_delay_ms)
            .map(Duration::from_millis)
            .unwrap_or(defaults.pacing_delay),
        trim_end: tts
            .trim_end_ms
            .or(env.trim_end_ms)
            .map(Duration::from_millis)
            .unwrap_or(defaults.trim_end),
        audio_format,
        segmenter: SegmenterConfig {
            max_chars: tts
                .max_sentence_chars
                .or(env.max_sentence_chars)
                .unwrap_or(defaults.segmenter.max_chars),
            search_extension: tts
                .sentence_search_extension
                .or(env.sentence_search_extension)
                .unwrap_or(defaults.segmenter.search_extension),
        },
        strip_chars: tts
            .strip_chars
            .or(env.strip_chars)
            .map(|s| s.chars().collect())
            .unwrap_or(defaults.strip_chars),
    };

    let default_voice = tts
        .default_voice
        .or(env.default_voice)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_VOICE.to_string());

    Ok(AppConfig {
        deepgram,
        pipeline,
        default_voice,
    })
}
