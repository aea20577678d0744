//! TOML configuration file support for batch runs.
//!
//! Settings shared by many `create-item` invocations can live in a file:
//!
//! ```toml
//! # glmpeak.toml
//! [conversion]
//! compression_level = 9
//! row_group_size = 50000
//! strict = true
//! fix_netcdf = false
//! append_ctime = false
//! geoparquet = true
//! netcdf = true
//! ```
//!
//! Command-line flags win over file settings.

// Only the netcdf-enabled create-item command reads config files
#![cfg_attr(not(feature = "netcdf"), allow(dead_code))]

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Root configuration structure for glmpeak.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Conversion-specific settings.
    #[serde(default)]
    pub conversion: ConversionConfig,
}

/// Configuration for the create-item command.
#[derive(Debug, Default, Deserialize)]
pub struct ConversionConfig {
    /// ZSTD compression level (1-22).
    pub compression_level: Option<i32>,

    /// Number of records per Parquet row group.
    pub row_group_size: Option<usize>,

    /// Fail on count mismatches instead of warning.
    pub strict: Option<bool>,

    /// Keep the _Unsigned fixes in the source file.
    pub fix_netcdf: Option<bool>,

    /// Keep the creation time in item ids.
    pub append_ctime: Option<bool>,

    /// Write GeoParquet tables.
    pub geoparquet: Option<bool>,

    /// Describe the source netCDF file as an asset.
    pub netcdf: Option<bool>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [conversion]
            compression_level = 9
            row_group_size = 50000
            strict = true
            fix_netcdf = false
            append_ctime = true
            geoparquet = true
            netcdf = false
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.conversion.compression_level, Some(9));
        assert_eq!(config.conversion.row_group_size, Some(50_000));
        assert_eq!(config.conversion.strict, Some(true));
        assert_eq!(config.conversion.fix_netcdf, Some(false));
        assert_eq!(config.conversion.append_ctime, Some(true));
        assert_eq!(config.conversion.geoparquet, Some(true));
        assert_eq!(config.conversion.netcdf, Some(false));
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
            [conversion]
            strict = true
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.conversion.strict, Some(true));
        assert_eq!(config.conversion.compression_level, None);
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.conversion.geoparquet, None);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(Config::from_str("[conversion]\nstrict = \"yes\"").is_err());
    }
}
