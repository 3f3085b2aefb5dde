//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `READALONG_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `READALONG_CHUNKER__MAX_CHARS=1000`
/// - `READALONG_ALIGNER__SEARCH_WINDOW=15`
/// - `READALONG_TTS__TIMING_FORMAT=named_marks`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("chunker.max_chars", 2500)?
        .set_default("aligner.search_window", 10)?
        .set_default("aligner.max_distance", 2)?
        .set_default("timing.per_character_separators", "counted")?
        .set_default("timing.per_grapheme_separators", "skipped")?
        .set_default("tts.timing_format", "per_character")?
        .set_default("tts.chars_per_second", 15.0)?
        .set_default("tts.latency_ms", 200)?
        .set_default("prefetch.max_concurrent", 2)?
        .set_default("prefetch.queue_capacity", 256)?
        .set_default("session.idle_timeout_secs", 1800)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        // 搜索默认配置文件
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix("READALONG")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. 构建配置
    let config = builder.build()?;

    // 5. 反序列化为 AppConfig
    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    // 6. 验证配置
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.chunker.max_chars == 0 {
        return Err(ConfigError::ValidationError(
            "Chunker max_chars cannot be 0".to_string(),
        ));
    }

    if config.aligner.search_window == 0 {
        return Err(ConfigError::ValidationError(
            "Aligner search_window cannot be 0".to_string(),
        ));
    }

    if !(config.tts.chars_per_second.is_finite() && config.tts.chars_per_second > 0.0) {
        return Err(ConfigError::ValidationError(
            "TTS chars_per_second must be positive".to_string(),
        ));
    }

    if config.prefetch.max_concurrent == 0 || config.prefetch.queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "Prefetch max_concurrent and queue_capacity cannot be 0".to_string(),
        ));
    }

    if config
        .segmenter
        .extra_abbreviations
        .iter()
        .any(|a| a.trim().is_empty() || a.chars().any(char::is_whitespace))
    {
        return Err(ConfigError::ValidationError(
            "Abbreviations must be single non-empty tokens".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Chunk Max Chars: {}", config.chunker.max_chars);
    tracing::info!(
        "Aligner: window={} max_distance={}",
        config.aligner.search_window,
        config.aligner.max_distance
    );
    if !config.segmenter.extra_abbreviations.is_empty() {
        tracing::info!(
            "Extra Abbreviations: {:?}",
            config.segmenter.extra_abbreviations
        );
    }
    tracing::info!("TTS Timing Format: {}", config.tts.timing_format);
    tracing::info!("TTS Rate: {} chars/s", config.tts.chars_per_second);
    tracing::info!("Prefetch Concurrency: {}", config.prefetch.max_concurrent);
    tracing::info!("Session Idle Timeout: {}s", config.session.idle_timeout_secs);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::timing::TimingFormat;
    use std::io::Write;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_limits() {
        let mut config = AppConfig::default();
        config.chunker.max_chars = 0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.aligner.search_window = 0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.prefetch.max_concurrent = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_bad_rate() {
        let mut config = AppConfig::default();
        config.tts.chars_per_second = 0.0;
        assert!(validate_config(&config).is_err());
        config.tts.chars_per_second = f64::NAN;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_bad_abbreviation() {
        let mut config = AppConfig::default();
        config.segmenter.extra_abbreviations = vec!["a b.".to_string()];
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readalong.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[chunker]
max_chars = 300

[aligner]
max_distance = 1

[segmenter]
extra_abbreviations = ["approx.", "Ave."]

[tts]
timing_format = "named_marks"
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(&path)).unwrap();
        assert_eq!(config.chunker.max_chars, 300);
        assert_eq!(config.aligner.max_distance, 1);
        assert_eq!(config.aligner.search_window, 10);
        assert_eq!(config.segmenter.extra_abbreviations, vec!["approx.", "Ave."]);
        assert_eq!(config.tts.timing_format, TimingFormat::NamedMarks);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readalong.toml");
        std::fs::write(&path, "[chunker]\nmax_chars = 0\n").unwrap();

        assert!(matches!(
            load_config_from_path(Some(&path)),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(
            load_config_from_path(Some(&path)),
            Err(ConfigError::LoadError(_))
        ));
    }
}
