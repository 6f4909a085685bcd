use crate::config::types::{
    Config, CrawlerConfig, ExtractConfig, LabelConfig, OutputConfig, UserAgentConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_extract_config(&config.extract)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_requests must be between 1 and 100, got {}",
            config.max_concurrent_requests
        )));
    }

    if config.discovery_set.is_empty() {
        return Err(ConfigError::Validation(
            "discovery_set cannot be empty".to_string(),
        ));
    }

    if config.record_pattern.is_empty() {
        return Err(ConfigError::Validation(
            "record_pattern cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
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

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every selector parses and the label table is usable
fn validate_extract_config(config: &ExtractConfig) -> Result<(), ConfigError> {
    for selector in [
        &config.listing_selector,
        &config.block_selector,
        &config.label_selector,
        &config.value_selector,
        &config.phone_icon_selector,
        &config.phone_title_selector,
    ] {
        validate_selector(selector)?;
    }

    if config.reference_marker.is_empty() {
        return Err(ConfigError::Validation(
            "reference_marker cannot be empty".to_string(),
        ));
    }

    validate_labels(&config.labels)
}

/// Checks that a CSS selector parses
fn validate_selector(selector: &str) -> Result<(), ConfigError> {
    parse_selector(selector).map(|_| ())
}

/// Parses a configured CSS selector
pub(crate) fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Label texts must be non-empty and distinct, otherwise two fields would
/// compete for the same block
fn validate_labels(labels: &LabelConfig) -> Result<(), ConfigError> {
    let all = [
        &labels.name,
        &labels.business,
        &labels.address,
        &labels.contact,
    ];

    for (i, label) in all.iter().enumerate() {
        if label.trim().is_empty() {
            return Err(ConfigError::Validation(
                "field labels cannot be empty".to_string(),
            ));
        }
        if all[i + 1..].iter().any(|other| other.trim() == label.trim()) {
            return Err(ConfigError::Validation(format!(
                "field label '{}' is used for more than one field",
                label
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_extract_config_is_valid() {
        assert!(validate_extract_config(&ExtractConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let config = ExtractConfig {
            block_selector: "dl[[".to_string(),
            ..ExtractConfig::default()
        };
        let result = validate_extract_config(&config);
        assert!(matches!(result, Err(ConfigError::InvalidSelector { .. })));
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let labels = LabelConfig {
            address: "会社事業内容".to_string(),
            ..LabelConfig::default()
        };
        assert!(validate_labels(&labels).is_err());
    }

    #[test]
    fn test_empty_label_rejected() {
        let labels = LabelConfig {
            contact: "  ".to_string(),
            ..LabelConfig::default()
        };
        assert!(validate_labels(&labels).is_err());
    }

    #[test]
    fn test_base_url_must_be_http() {
        let config = CrawlerConfig {
            base_url: "ftp://jobs.example.com/".to_string(),
            max_pages: 1,
            request_delay_ms: 200,
            max_concurrent_requests: 4,
            discovery_set: "JOB_LIST".to_string(),
            record_pattern: "*detail*".to_string(),
        };
        assert!(matches!(
            validate_crawler_config(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }
}
