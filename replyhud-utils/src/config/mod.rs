//! Configuration file loading
//!
//! Files are parsed by extension (`.toml`, `.json`, `.yml`/`.yaml`). Layers are
//! combined by serializing both sides to JSON and merging objects key by key,
//! so a partial file only overrides the keys it names.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Load configuration from file (format picked from the extension)
pub fn load_config<T>(path: &Path) -> crate::Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let value = load_value(path)?;
    serde_json::from_value(value)
        .map_err(|e| crate::UtilError::Config(format!("{}: {}", path.display(), e)))
}

/// Parse a configuration file into an untyped JSON value
pub fn load_value(path: &Path) -> crate::Result<serde_json::Value> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    let content = std::fs::read_to_string(path)?;

    match extension.as_str() {
        "toml" => {
            let toml_value: toml::Value = toml::from_str(&content)
                .map_err(|e| crate::UtilError::Config(format!("TOML parse error: {}", e)))?;
            serde_json::to_value(toml_value)
                .map_err(|e| crate::UtilError::Config(format!("TOML conversion error: {}", e)))
        }
        "json" => serde_json::from_str(&content)
            .map_err(|e| crate::UtilError::Config(format!("JSON parse error: {}", e))),
        "yml" | "yaml" => serde_yaml::from_str(&content)
            .map_err(|e| crate::UtilError::Config(format!("YAML parse error: {}", e))),
        _ => Err(crate::UtilError::Config(format!(
            "Unsupported config format: {}",
            extension
        ))),
    }
}

/// Merge two JSON values (second overrides first)
fn merge_json_values(base: &mut serde_json::Value, override_value: serde_json::Value) {
    match (base, override_value) {
        (serde_json::Value::Object(base_obj), serde_json::Value::Object(override_obj)) => {
            for (key, value) in override_obj {
                match base_obj.get_mut(&key) {
                    Some(existing) => merge_json_values(existing, value),
                    None => {
                        base_obj.insert(key, value);
                    }
                }
            }
        }
        (base_value, override_value) => {
            *base_value = override_value;
        }
    }
}

/// Merge a raw override value into a typed configuration
fn merge_value_into<T>(base: &mut T, override_value: serde_json::Value) -> crate::Result<()>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    let mut base_value = serde_json::to_value(&*base)
        .map_err(|e| crate::UtilError::Serialization(format!("Base serialization error: {}", e)))?;

    merge_json_values(&mut base_value, override_value);

    *base = serde_json::from_value(base_value).map_err(|e| {
        crate::UtilError::Serialization(format!("Result deserialization error: {}", e))
    })?;

    Ok(())
}

/// Configuration builder: defaults, then files, then explicit overrides
#[derive(Debug)]
pub struct ConfigBuilder<T> {
    config: T,
}

impl<T> ConfigBuilder<T>
where
    T: Default + Serialize + for<'de> Deserialize<'de>,
{
    /// Create new config builder with defaults
    pub fn new() -> Self {
        Self {
            config: T::default(),
        }
    }

    /// Load a file and merge it over the current layers.
    ///
    /// The file may be partial; keys it does not mention keep their values.
    pub fn load_file(mut self, path: &Path) -> crate::Result<Self> {
        let file_value = load_value(path)?;
        merge_value_into(&mut self.config, file_value)?;
        Ok(self)
    }

    /// Apply an in-place adjustment (CLI flags, environment)
    #[must_use]
    pub fn apply(mut self, adjust: impl FnOnce(&mut T)) -> Self {
        adjust(&mut self.config);
        self
    }

    pub fn build(self) -> T {
        self.config
    }
}

impl<T> Default for ConfigBuilder<T>
where
    T: Default + Serialize + for<'de> Deserialize<'de>,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::tempdir;

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    struct Inner {
        timeout_secs: u64,
        enabled: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    struct TestConfig {
        model: String,
        words: u16,
        inner: Inner,
    }

    #[test]
    fn test_load_config_toml() -> crate::Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("replyhud.toml");

        std::fs::write(
            &config_path,
            r#"
model = "gemini-1.5-pro"
words = 150

[inner]
timeout_secs = 30
enabled = true
            "#,
        )?;

        let config: TestConfig = load_config(&config_path)?;

        assert_eq!(config.model, "gemini-1.5-pro");
        assert_eq!(config.words, 150);
        assert_eq!(config.inner.timeout_secs, 30);
        assert!(config.inner.enabled);

        Ok(())
    }

    #[test]
    fn test_unsupported_extension_is_rejected() -> crate::Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("replyhud.ini");
        std::fs::write(&config_path, "model = x")?;

        let result: crate::Result<TestConfig> = load_config(&config_path);
        assert!(matches!(result, Err(crate::UtilError::Config(_))));

        Ok(())
    }

    #[test]
    fn test_merge_json_values_is_key_by_key() {
        let mut base = serde_json::json!({
            "model": "base",
            "words": 100,
            "inner": { "timeout_secs": 20, "enabled": true }
        });

        merge_json_values(&mut base, serde_json::json!({
            "words": 60,
            "inner": { "enabled": false }
        }));

        assert_eq!(base["model"], "base");
        assert_eq!(base["words"], 60);
        assert_eq!(base["inner"]["timeout_secs"], 20);
        assert_eq!(base["inner"]["enabled"], false);
    }

    #[test]
    fn test_builder_partial_yaml_keeps_defaults() -> crate::Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("partial.yaml");

        std::fs::write(
            &config_path,
            r#"
inner:
  timeout_secs: 45
            "#,
        )?;

        let config: TestConfig = ConfigBuilder::new()
            .apply(|c: &mut TestConfig| {
                c.model = "default-model".to_string();
                c.inner.enabled = true;
            })
            .load_file(&config_path)?
            .build();

        assert_eq!(config.model, "default-model");
        assert_eq!(config.inner.timeout_secs, 45);
        assert!(config.inner.enabled);

        Ok(())
    }

    #[test]
    fn test_builder_json_then_flag_override() -> crate::Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("replyhud.json");
        std::fs::write(&config_path, r#"{ "model": "from-file", "words": 80 }"#)?;

        let config: TestConfig = ConfigBuilder::new()
            .load_file(&config_path)?
            .apply(|c: &mut TestConfig| c.words = 200)
            .build();

        assert_eq!(config.model, "from-file");
        assert_eq!(config.words, 200);

        Ok(())
    }
}
