use crate::config::types::{Config, CrawlerConfig, FetchConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_fetch_config(&config.fetch)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
pub fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.poll_interval_ms < 1 || config.poll_interval_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "poll_interval_ms must be between 1 and 60000, got {}",
            config.poll_interval_ms
        )));
    }

    if let Some(max_attempts) = config.max_attempts {
        if max_attempts < 1 {
            return Err(ConfigError::Validation(format!(
                "max_attempts must be >= 1 when set, got {}",
                max_attempts
            )));
        }
    }

    if let Some(max_concurrent) = config.max_concurrent_fetches {
        if !(1..=1024).contains(&max_concurrent) {
            return Err(ConfigError::Validation(format!(
                "max_concurrent_fetches must be between 1 and 1024, got {}",
                max_concurrent
            )));
        }
    }

    if config.max_passes == Some(0) {
        return Err(ConfigError::Validation(
            "max_passes must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates transport timeouts
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be > 0".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be > 0".to_string(),
        ));
    }

    if config.connect_timeout_secs > config.request_timeout_secs {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs ({}) cannot exceed request_timeout_secs ({})",
            config.connect_timeout_secs, config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &crate::config::types::OutputConfig) -> Result<(), ConfigError> {
    if let Some(path) = &config.report_path {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "report_path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}
