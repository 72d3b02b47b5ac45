use super::{AppConfig, ConfigError, ConfigResult};

/// Validate the merged configuration.
///
/// The API key is not required here: commands that need it fail when the
/// Deepgram client is built.
pub fn validate_config(config: &AppConfig) -> ConfigResult<()> {
    validate_default_voice(&config.default_voice)?;
    validate_urls(config)?;
    if config.deepgram.request_timeout.is_zero() {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be greater than zero".to_string(),
        ));
    }
    config
        .pipeline
        .validate()
        .map_err(|e| ConfigError::Validation(e.to_string()))
}

pub fn validate_default_voice(voice: &str) -> ConfigResult<()> {
    if voice.trim().is_empty() {
        return Err(ConfigError::Validation(
            "default_voice must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_urls(config: &AppConfig) -> ConfigResult<()> {
    for (key, url) in [
        ("base_url", &config.deepgram.base_url),
        ("models_url", &config.deepgram.models_url),
    ] {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: url.clone(),
                reason: "expected an http(s) URL".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audio::AudioFormat;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_rejects_unsupported_stream_format() {
        let mut config = AppConfig::default();
        config.pipeline.audio_format = AudioFormat::Flac;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Validation(msg)) if msg.contains("flac")
        ));
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let mut config = AppConfig::default();
        config.pipeline.channel_capacity = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_bad_url() {
        let mut config = AppConfig::default();
        config.deepgram.base_url = "api.deepgram.com".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidValue { key, .. }) if key == "base_url"
        ));
    }

    #[test]
    fn test_rejects_blank_voice() {
        assert!(validate_default_voice(" ").is_err());
        assert!(validate_default_voice("aura-2-thalia-en").is_ok());
    }
}
