use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Encoder qualities are within 1..=100
/// - Upload directory and size limit are set
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Upload validation
    if config.uploads.dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "uploads.dir cannot be empty".to_string(),
        ));
    }
    if config.uploads.max_size_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "uploads.max_size_bytes must be greater than 0".to_string(),
        ));
    }

    // Converter validation
    for (key, quality) in [
        ("converter.jpeg_quality", config.converter.jpeg_quality),
        ("converter.webp_quality", config.converter.webp_quality),
    ] {
        if !(1..=100).contains(&quality) {
            return Err(ConfigError::ValidationError(format!(
                "{} must be between 1 and 100, got {}",
                key, quality
            )));
        }
    }

    Ok(())
}
