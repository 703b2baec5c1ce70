use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Long edges are hidden until the user asks for them
pub const HIDE_LONG_EDGES_DEFAULT: bool = true;

/// Tunables of the graph view, loadable from a TOML file.
///
/// ```toml
/// cache_capacity = 1024
/// hide_long_edges = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphConfig {
    /// Print cells kept by the row cache
    pub cache_capacity: usize,
    /// Distance between stored lane rows
    pub compression_step: usize,
    pub hide_long_edges: bool,
    /// Span in rows from which an edge counts as long
    pub long_edge_length: usize,
    /// Rows drawn next to each end of a hidden long edge
    pub long_edge_visible_part: usize,
    /// Smallest number of commits worth collapsing
    pub min_fragment_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 512,
            compression_step: 32,
            hide_long_edges: HIDE_LONG_EDGES_DEFAULT,
            long_edge_length: 30,
            long_edge_visible_part: 1,
            min_fragment_size: 2,
        }
    }
}

impl GraphConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: GraphConfig = toml::from_str(text).context("Failed to parse graph config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.compression_step == 0 {
            bail!("compression_step must be at least 1");
        }
        if self.long_edge_visible_part == 0 {
            bail!("long_edge_visible_part must be at least 1");
        }
        // both arrow rows must fit strictly inside the edge
        if self.long_edge_length <= 2 * self.long_edge_visible_part {
            bail!(
                "long_edge_length ({}) must exceed twice long_edge_visible_part ({})",
                self.long_edge_length,
                self.long_edge_visible_part
            );
        }
        if self.min_fragment_size == 0 {
            bail!("min_fragment_size must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = GraphConfig::default();
        assert!(config.hide_long_edges);
        assert!(config.validate().is_ok());
        assert_eq!(GraphConfig::from_toml("").unwrap(), config);
    }

    #[test]
    fn test_partial_override() {
        let config =
            GraphConfig::from_toml("cache_capacity = 64\nhide_long_edges = false\n").unwrap();
        assert_eq!(config.cache_capacity, 64);
        assert!(!config.hide_long_edges);
        assert_eq!(config.long_edge_length, 30);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(GraphConfig::from_toml("compression_step = 0").is_err());
        assert!(GraphConfig::from_toml("long_edge_length = 2").is_err());
        assert!(GraphConfig::from_toml("unknown_key = 1").is_err());
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "min_fragment_size = 3")?;
        let config = GraphConfig::load(file.path())?;
        assert_eq!(config.min_fragment_size, 3);
        Ok(())
    }
}
