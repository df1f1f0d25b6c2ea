use anyhow::{Context, Result};
use colored::Colorize;
use fcu_infrastructure::ConfigService;
use serde_json::Value;

/// Prints the effective configuration as JSON.
pub fn show(service: &ConfigService) -> Result<()> {
    let config = service.get_config().context("Failed to load configuration")?;
    println!("📄 {}", service.path().display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Stores one setting; `raw` is read as JSON when it parses, else as a string.
pub fn set(service: &ConfigService, key: &str, raw: &str) -> Result<()> {
    service
        .set_value(key, parse_value(raw))
        .with_context(|| format!("Failed to set {}", key))?;
    println!("{} {} = {}", "✓".green(), key.bold(), raw);
    Ok(())
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_writes_the_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let service = ConfigService::with_path(path.clone());

        set(&service, "publish.default_fps", "25").unwrap();
        set(&service, "tracking.server_url", "https://studio.example").unwrap();

        let config = ConfigService::with_path(path).get_config().unwrap();
        assert_eq!(config.publish.default_fps, 25.0);
        assert_eq!(
            config.tracking.server_url.as_deref(),
            Some("https://studio.example")
        );
        assert!(set(&service, "nothing.here", "1").is_err());
    }
}
