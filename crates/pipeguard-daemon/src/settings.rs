//! Configuration loading.

use std::path::Path;

use anyhow::{Context, Result};
use pipeguard_tasks::PipelineConfig;

use crate::cli::Cli;

/// Read a YAML configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_file(path: &Path) -> Result<PipelineConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_yaml(&text).with_context(|| format!("invalid config file {}", path.display()))
}

/// Parse a YAML document into a configuration. An empty document yields the
/// defaults.
///
/// # Errors
///
/// Returns an error if the document is not valid YAML for the config shape.
pub fn parse_yaml(text: &str) -> Result<PipelineConfig> {
    if text.trim().is_empty() {
        return Ok(PipelineConfig::default());
    }
    serde_yaml::from_str(text).context("failed to parse YAML")
}

/// Build the effective configuration: file (or defaults), then command line
/// overrides, then validation.
///
/// # Errors
///
/// Returns an error if loading fails or the result does not validate.
pub fn resolve(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match cli.config.as_deref() {
        Some(path) => load_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(capacity) = cli.capacity {
        config.channel_capacity = capacity;
    }
    if let Some(node_id) = &cli.node_id {
        config.node_id.clone_from(node_id);
    }
    config.validate().context("configuration rejected")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_empty_document_is_default() -> Result<()> {
        assert_eq!(parse_yaml("")?, PipelineConfig::default());
        assert_eq!(parse_yaml("   \n")?, PipelineConfig::default());
        Ok(())
    }

    #[test]
    fn test_unknown_shape_is_rejected() {
        let result = parse_yaml("channel_capacity: lots");
        assert!(matches!(result, Err(_)));
    }

    #[test]
    fn test_cli_overrides_apply() -> Result<()> {
        let cli = Cli::try_parse_from(["pipeguardd", "--capacity", "1", "--node-id", "n1"])?;
        let config = resolve(&cli)?;
        assert_eq!(config.channel_capacity, 1);
        assert_eq!(config.node_id, "n1");
        Ok(())
    }

    #[test]
    fn test_zero_capacity_override_is_rejected() -> Result<()> {
        let cli = Cli::try_parse_from(["pipeguardd", "--capacity", "0"])?;
        let err = resolve(&cli).err().map(|e| format!("{e:#}")).unwrap_or_default();
        assert!(err.contains("channel_capacity"), "{err}");
        Ok(())
    }

    #[test]
    fn test_missing_file_names_path() -> Result<()> {
        let cli = Cli::try_parse_from(["pipeguardd", "--config", "/nonexistent/pipeguard.yaml"])?;
        let err = resolve(&cli).err().map(|e| format!("{e:#}")).unwrap_or_default();
        assert!(err.contains("/nonexistent/pipeguard.yaml"), "{err}");
        Ok(())
    }
}
