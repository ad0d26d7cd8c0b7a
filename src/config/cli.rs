use crate::config::toml_config::{MockServiceConfig, PactConfig, RetryConfig};
use crate::domain::model::{Interaction, WriteMode};
use crate::utils::error::{ControlError, Result};
use crate::utils::validation::{validate_required_field, Validate};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "pact-mock")]
#[command(about = "Drive a Pact mock service: clear, register, verify and write contracts")]
pub struct CliConfig {
    #[arg(long, global = true, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Mock service base URL, e.g. http://localhost:9999")]
    pub base_url: Option<String>,

    #[arg(long, global = true)]
    pub consumer: Option<String>,

    #[arg(long, global = true)]
    pub provider: Option<String>,

    #[arg(long, global = true, help = "overwrite or update")]
    pub write_mode: Option<WriteMode>,

    #[arg(long, global = true)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, global = true)]
    pub retry_attempts: Option<u32>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Remove every interaction registered on the mock service
    Clear,
    /// Register interactions from JSON files, in order
    Add {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Check that every registered interaction was invoked
    Verify,
    /// Ask the mock service to write the pact file
    Write,
}

impl CliConfig {
    /// 合併設定檔與命令列參數，命令列優先
    pub fn resolve(&self) -> Result<MockServiceConfig> {
        let mut config = match &self.config {
            Some(path) => MockServiceConfig::from_file(path)?,
            None => {
                let base_url = validate_required_field("base_url", &self.base_url)?;
                MockServiceConfig::with_base_url(base_url.clone())
            }
        };

        if let Some(base_url) = &self.base_url {
            config.mock_service.base_url = base_url.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            config.mock_service.timeout_seconds = Some(timeout);
        }
        if let Some(attempts) = self.retry_attempts {
            let retry = config.retry.get_or_insert(RetryConfig {
                attempts: None,
                delay_ms: None,
            });
            retry.attempts = Some(attempts);
        }

        let pact = config.pact.get_or_insert_with(PactConfig::default);
        if let Some(consumer) = &self.consumer {
            pact.consumer = Some(consumer.clone());
        }
        if let Some(provider) = &self.provider {
            pact.provider = Some(provider.clone());
        }
        if let Some(mode) = self.write_mode {
            pact.pact_file_write_mode = Some(mode.to_string());
        }

        config.validate()?;
        Ok(config)
    }
}

/// 讀取 interaction JSON 檔案，內容可以是單一物件或陣列
pub fn load_interactions(path: &Path) -> Result<Vec<Interaction>> {
    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;

    match value {
        serde_json::Value::Array(_) => Ok(serde_json::from_value(value)?),
        serde_json::Value::Object(_) => Ok(vec![serde_json::from_value(value)?]),
        _ => Err(ControlError::ConfigError {
            message: format!(
                "{} must contain an interaction object or an array of interactions",
                path.display()
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_flags_build_config_without_file() {
        let cli = CliConfig::parse_from([
            "pact-mock",
            "--base-url",
            "http://localhost:9999",
            "--consumer",
            "MyConsumer",
            "--provider",
            "MyProvider",
            "--write-mode",
            "update",
            "write",
        ]);

        let config = cli.resolve().unwrap();
        let endpoint = config.endpoint().unwrap();

        assert!(matches!(cli.command, Command::Write));
        assert_eq!(endpoint.base_url, "http://localhost:9999");
        assert_eq!(endpoint.consumer, "MyConsumer");
        assert_eq!(endpoint.write_mode, Some(WriteMode::Update));
    }

    #[test]
    fn test_missing_base_url_is_reported() {
        let cli = CliConfig::parse_from(["pact-mock", "verify"]);
        assert!(matches!(
            cli.resolve(),
            Err(ControlError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                br#"
[mock_service]
base_url = "http://localhost:1234"

[pact]
consumer = "FileConsumer"
provider = "FileProvider"
"#,
            )
            .unwrap();
        let path = temp_file.path().to_str().unwrap().to_string();

        let cli = CliConfig::parse_from([
            "pact-mock",
            "clear",
            "--config",
            path.as_str(),
            "--consumer",
            "FlagConsumer",
            "--retry-attempts",
            "7",
        ]);
        let config = cli.resolve().unwrap();
        let endpoint = config.endpoint().unwrap();

        assert_eq!(endpoint.base_url, "http://localhost:1234");
        assert_eq!(endpoint.consumer, "FlagConsumer");
        assert_eq!(endpoint.provider, "FileProvider");
        assert_eq!(config.retry_policy().max_attempts, 7);
    }

    #[test]
    fn test_load_interactions_accepts_object_or_array() {
        let mut single = NamedTempFile::new().unwrap();
        single
            .write_all(
                br#"{"description": "get foo", "request": {"method": "GET", "path": "/foobar"}, "response": {"status": 200}}"#,
            )
            .unwrap();
        let mut many = NamedTempFile::new().unwrap();
        many.write_all(
            br#"[
                {"description": "first", "request": {"method": "GET", "path": "/a"}, "response": {"status": 200}},
                {"description": "second", "request": {"method": "POST", "path": "/b"}, "response": {"status": 201}}
            ]"#,
        )
        .unwrap();

        assert_eq!(load_interactions(single.path()).unwrap().len(), 1);
        let loaded = load_interactions(many.path()).unwrap();
        assert_eq!(loaded[1].description, "second");
        assert_eq!(loaded[1].response.status, 201);
    }

    #[test]
    fn test_load_interactions_rejects_scalars() {
        let mut scalar = NamedTempFile::new().unwrap();
        scalar.write_all(b"42").unwrap();
        assert!(matches!(
            load_interactions(scalar.path()),
            Err(ControlError::ConfigError { .. })
        ));
    }
}
