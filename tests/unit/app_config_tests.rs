/*!
 * Tests for application configuration functionality
 */

use cobmig::app_config::{Config, LlmProvider, LogLevel, ProviderConfig};
use cobmig::language_utils::TargetLanguage;
use cobmig::packaging::ReportFormat;

use crate::common::create_temp_dir;

fn valid_config() -> Config {
    let mut config = Config::default();
    config.active_provider_config_mut().api_key = "key".to_string();
    config
}

/// Test default configuration values
#[test]
fn test_defaultConfig_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.provider, LlmProvider::Gemini);
    assert_eq!(config.get_model(), "gemini-2.0-flash-lite");
    assert_eq!(config.report_format, ReportFormat::Pdf);
    assert_eq!(config.log_level, LogLevel::Info);
    assert_eq!(config.available_providers.len(), 2);
    assert!(config.generation.analysis_max_tokens > 0);
}

/// Test configuration validation
#[test]
fn test_configValidation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = valid_config();
    assert!(config.validate().is_ok());

    config.languages.push(TargetLanguage::new("java", ".java"));
    assert!(config.validate().is_err(), "duplicate language names are rejected");

    let mut config = valid_config();
    config.languages.clear();
    assert!(config.validate().is_err(), "an empty table is rejected");

    let mut config = valid_config();
    config.generation.analysis_max_tokens = 0;
    assert!(config.validate().is_err(), "zero token limits are rejected");
}

/// Test that switching provider picks that provider's settings
#[test]
fn test_providerSwitch_shouldUseMatchingSettings() {
    let mut config = Config::default();
    config.provider = LlmProvider::Anthropic;
    config.active_provider_config_mut().api_key = "anthropic-key".to_string();

    assert_eq!(config.get_api_key(), "anthropic-key");
    assert_eq!(config.provider_settings().provider_type, "anthropic");
    assert_eq!(config.provider_settings().rate_limit, Some(45));
}

/// Test that a missing provider entry is created with defaults
#[test]
fn test_activeProviderConfigMut_withMissingEntry_shouldInsertDefaults() {
    let mut config = Config::default();
    config.available_providers.clear();

    config.active_provider_config_mut().model = "gemini-custom".to_string();

    assert_eq!(config.available_providers.len(), 1);
    assert_eq!(config.get_model(), "gemini-custom");
    assert_eq!(
        config.available_providers[0].timeout_secs,
        ProviderConfig::new(LlmProvider::Gemini).timeout_secs
    );
}

/// Test save and reload
#[test]
fn test_saveAndLoad_shouldRoundTripSettings() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("custom.json");
    let mut config = Config::default();
    config.report_format = ReportFormat::Text;
    config.generation.temperature = Some(0.1);
    config.output_dir = "results".to_string();

    config.save(&path).unwrap();
    let loaded = Config::load_or_create(&path).unwrap();

    assert_eq!(loaded.report_format, ReportFormat::Text);
    assert_eq!(loaded.generation.temperature, Some(0.1));
    assert_eq!(loaded.output_dir, "results");
    assert_eq!(loaded.languages, config.languages);
}

/// Test that a malformed file is an error rather than silently replaced
#[test]
fn test_loadOrCreate_withMalformedFile_shouldFail() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(Config::load_or_create(&path).is_err());
}
