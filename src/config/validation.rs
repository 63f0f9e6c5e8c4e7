use crate::config::types::{BrowserConfig, Config, CrawlerConfig, DomainEntry, FilterConfig};
use crate::url::Domain;
use crate::ConfigError;
use std::collections::HashSet;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_browser_config(&config.browser)?;
    validate_patterns("sitemaps.product-patterns", &config.sitemaps.product_patterns)?;
    validate_filter_config(&config.filter)?;
    validate_domains(&config.domains)?;

    if config.output.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output.directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.fetch_timeout_secs == 0 || config.fetch_timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "fetch-timeout-secs must be between 1 and 300, got {}",
            config.fetch_timeout_secs
        )));
    }

    if config.max_sitemap_depth == 0 {
        return Err(ConfigError::Validation(
            "max-sitemap-depth must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.page_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "browser.page-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.settle_time_ms >= config.page_timeout_secs * 1000 {
        return Err(ConfigError::Validation(format!(
            "browser.settle-time-ms ({}ms) must be shorter than page-timeout-secs ({}s)",
            config.settle_time_ms, config.page_timeout_secs
        )));
    }

    Ok(())
}

fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    validate_patterns("filter.product-patterns", &config.product_patterns)?;

    for ext in &config.asset_extensions {
        if !ext.starts_with('.') || ext.len() < 2 {
            return Err(ConfigError::InvalidPattern(format!(
                "asset extension '{}' must look like '.png'",
                ext
            )));
        }
    }

    for host in &config.ignored_hosts {
        validate_host_pattern(host)?;
    }

    Ok(())
}

/// Product patterns are positive filters: an empty list would reject every URL
fn validate_patterns(name: &str, patterns: &[String]) -> Result<(), ConfigError> {
    if patterns.is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
    }

    if patterns.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::InvalidPattern(format!(
            "{} contains an empty pattern",
            name
        )));
    }

    Ok(())
}

fn validate_domains(domains: &[DomainEntry]) -> Result<(), ConfigError> {
    if domains.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[domain]] entry is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for entry in domains {
        let domain = Domain::parse(&entry.site)
            .map_err(|e| ConfigError::InvalidUrl(format!("site '{}': {}", entry.site, e)))?;

        if !seen.insert(domain.origin().to_string()) {
            return Err(ConfigError::Validation(format!(
                "site '{}' is listed more than once",
                entry.site
            )));
        }

        if let Some(patterns) = &entry.product_patterns {
            validate_patterns(&format!("product-patterns for '{}'", entry.site), patterns)?;
        }
    }

    Ok(())
}

/// Validates a host pattern (supports a "*." wildcard prefix)
fn validate_host_pattern(pattern: &str) -> Result<(), ConfigError> {
    let host = pattern.strip_prefix("*.").unwrap_or(pattern);

    if host.is_empty() {
        return Err(ConfigError::InvalidPattern(format!(
            "host pattern '{}' is empty",
            pattern
        )));
    }

    if !host
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "host pattern '{}' contains invalid characters",
            pattern
        )));
    }

    if host.starts_with('.') || host.ends_with('.') || host.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "host pattern '{}' is malformed",
            pattern
        )));
    }

    Ok(())
}
