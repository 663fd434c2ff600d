//! Application configuration: defaults, then the config file, then flags,
//! then the environment for the API key.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use replyhud_core::CoreConfig;
use replyhud_llm::LlmConfig;
use replyhud_utils::{ConfigBuilder, LogLevel, LoggerConfig};

use crate::cli::Cli;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub core: CoreConfig,
    pub llm: LlmConfig,
    pub logging: LoggerConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        self.core.validate().context("invalid [core] settings")?;
        self.llm.validate().context("invalid [llm] settings")?;
        Ok(())
    }
}

pub fn build_config(cli: &Cli) -> Result<AppConfig> {
    let mut builder = ConfigBuilder::<AppConfig>::new();
    if let Some(path) = &cli.config {
        builder = builder
            .load_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?;
    }

    let mut config = builder.apply(|config| apply_flags(config, cli)).build();
    config.llm.gemini = config.llm.gemini.with_env_api_key();
    Ok(config)
}

fn apply_flags(config: &mut AppConfig, cli: &Cli) {
    if let Some(key) = &cli.api_key {
        config.llm.gemini.api_key = Some(key.clone());
    }
    if let Some(model) = &cli.model {
        config.llm.gemini.model = model.clone();
    }
    if let Some(tone) = cli.tone {
        config.core.default_tone = tone;
    }
    if let Some(words) = cli.words {
        config.core.default_target_words = words;
    }
    if cli.no_fetch {
        config.llm.thread.enabled = false;
    }
    if cli.debug {
        config.logging.level = LogLevel::Debug;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use replyhud_core::Tone;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("replyhud").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = build_config(&cli(&["--tone", "supportive", "--words", "80", "--no-fetch", "--debug"])).unwrap();
        assert_eq!(config.core.default_tone, Tone::Supportive);
        assert_eq!(config.core.default_target_words, 80);
        assert!(!config.llm.thread.enabled);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_then_flags() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[core]\ndefault_tone = \"informative\"\ncopy_feedback_ms = 500\n\n[llm.gemini]\nmodel = \"from-file\"\napi_key = \"file-key\""
        )
        .unwrap();
        let path = file.path().to_str().unwrap();

        let config = build_config(&cli(&["--config", path, "--model", "from-flag"])).unwrap();
        assert_eq!(config.core.default_tone, Tone::Informative);
        assert_eq!(config.core.copy_feedback_ms, 500);
        assert_eq!(config.llm.gemini.model, "from-flag");
        assert_eq!(config.llm.gemini.api_key.as_deref(), Some("file-key"));
        assert_eq!(config.llm.gemini.max_output_tokens, 2048);
    }

    #[test]
    fn test_flag_key_wins_over_file_key() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "llm:\n  gemini:\n    api_key: file-key").unwrap();
        let path = file.path().to_str().unwrap();

        let config = build_config(&cli(&["--config", path, "--api-key", "flag-key"])).unwrap();
        assert_eq!(config.llm.gemini.api_key.as_deref(), Some("flag-key"));
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let err = build_config(&cli(&["--config", "/nonexistent/replyhud.toml"])).unwrap_err();
        assert!(err.to_string().contains("failed to load config"));
    }
}
