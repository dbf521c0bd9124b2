// file: src/config.rs
// description: layered application configuration (defaults, file, environment, flags)
// reference: https://docs.rs/config

use crate::error::{PipelineError, Result};
use crate::utils::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use yaml_rust::{Yaml, YamlEmitter};

pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const ENV_PREFIX: &str = "AUTODOC";
pub const CONFIG_CANDIDATES: [&str; 4] =
    ["autodoc.yaml", "autodoc.yml", "autodoc.json", "autodoc.toml"];

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    pub source: SourceConfig,
    pub ai: AiConfig,
    pub retry: RetryConfig,
    pub output: OutputConfig,
    pub tests: TestsConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SourceConfig {
    pub directories: Vec<PathBuf>,
    pub exclude: Vec<String>,
    pub extension: String,
    pub max_file_size_kb: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AiConfig {
    pub model: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub base_url: String,
    pub timeout_secs: u64,
    pub concurrency: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub multiplier: f64,
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub format: OutputFormat,
    pub index_title: String,
    pub group_by: GroupBy,
    pub file_name: String,
    pub pdf: bool,
    pub non_technical: bool,
    pub manifest: bool,
    #[serde(default)]
    pub pdf_converters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TestsConfig {
    pub framework: TestFramework,
    pub output_dir: PathBuf,
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Markdown,
}

/// How documentation entries are sectioned in the consolidated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Module,
    Type,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TestFramework {
    Pytest,
    Unittest,
}

impl TestFramework {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pytest => "pytest",
            Self::Unittest => "unittest",
        }
    }
}

/// Values supplied on the command line. Every `Some` wins over the file and
/// environment layers; `exclude` entries are appended to the configured list.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub source: Option<PathBuf>,
    pub exclude: Vec<String>,
    pub output_dir: Option<PathBuf>,
    pub tests_output_dir: Option<PathBuf>,
    pub title: Option<String>,
    pub group_by: Option<GroupBy>,
    pub pdf: Option<bool>,
    pub non_technical: Option<bool>,
    pub manifest: Option<bool>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_output_tokens: Option<u32>,
    pub concurrency: Option<usize>,
    pub framework: Option<TestFramework>,
}

impl Config {
    /// Builds the configuration from defaults, then the config file (explicit
    /// or discovered in the working directory), then `AUTODOC__*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let defaults = config::Config::try_from(&Self::default_config())?;
        let mut builder = config::Config::builder().add_source(defaults);

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(PipelineError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                if let Some(found) = Self::discover(Path::new(".")) {
                    tracing::info!("Using configuration file {}", found.display());
                    builder = builder.add_source(config::File::from(found.as_path()));
                }
            }
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder.build()?;
        let config: Config = settings.try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn discover(dir: &Path) -> Option<PathBuf> {
        CONFIG_CANDIDATES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    }

    pub fn default_config() -> Self {
        Self {
            source: SourceConfig {
                directories: vec![PathBuf::from(".")],
                exclude: [
                    "venv",
                    "env",
                    ".venv",
                    ".env",
                    "__pycache__",
                    ".git",
                    "build",
                    "dist",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                extension: "py".to_string(),
                max_file_size_kb: 1024,
            },
            ai: AiConfig {
                model: "models/gemini-1.5-flash".to_string(),
                temperature: 0.2,
                max_output_tokens: 8192,
                base_url: "https://generativelanguage.googleapis.com".to_string(),
                timeout_secs: 120,
                concurrency: 1,
                api_key: None,
            },
            retry: RetryConfig {
                max_attempts: 3,
                initial_backoff_ms: 1000,
                multiplier: 2.0,
                max_backoff_ms: 30_000,
            },
            output: OutputConfig {
                directory: PathBuf::from("./docs"),
                format: OutputFormat::Markdown,
                index_title: "API Documentation".to_string(),
                group_by: GroupBy::Module,
                file_name: "consolidated_documentation".to_string(),
                pdf: false,
                non_technical: false,
                manifest: false,
                pdf_converters: vec![],
            },
            tests: TestsConfig {
                framework: TestFramework::Pytest,
                output_dir: PathBuf::from("tests"),
                exclude: vec!["tests".to_string(), "test".to_string(), "testing".to_string()],
            },
        }
    }

    pub fn apply_overrides(&mut self, overrides: CliOverrides) -> Result<()> {
        if let Some(source) = overrides.source {
            self.source.directories = vec![source];
        }
        for pattern in overrides.exclude {
            if !self.source.exclude.contains(&pattern) {
                self.source.exclude.push(pattern);
            }
        }
        if let Some(dir) = overrides.output_dir {
            self.output.directory = dir;
        }
        if let Some(dir) = overrides.tests_output_dir {
            self.tests.output_dir = dir;
        }
        if let Some(title) = overrides.title {
            self.output.index_title = title;
        }
        if let Some(group_by) = overrides.group_by {
            self.output.group_by = group_by;
        }
        if let Some(pdf) = overrides.pdf {
            self.output.pdf = pdf;
        }
        if let Some(non_technical) = overrides.non_technical {
            self.output.non_technical = non_technical;
        }
        if let Some(manifest) = overrides.manifest {
            self.output.manifest = manifest;
        }
        if let Some(api_key) = overrides.api_key {
            self.ai.api_key = Some(api_key);
        }
        if let Some(model) = overrides.model {
            self.ai.model = model;
        }
        if let Some(temperature) = overrides.temperature {
            self.ai.temperature = temperature;
        }
        if let Some(max_output_tokens) = overrides.max_output_tokens {
            self.ai.max_output_tokens = max_output_tokens;
        }
        if let Some(concurrency) = overrides.concurrency {
            self.ai.concurrency = concurrency;
        }
        if let Some(framework) = overrides.framework {
            self.tests.framework = framework;
        }

        self.validate()
    }

    /// The API key from flags or config, falling back to `GOOGLE_API_KEY`.
    pub fn resolve_api_key(&self) -> Result<String> {
        self.ai
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                PipelineError::Config(format!(
                    "Google API key is required. Provide it with --api-key or set the {} environment variable",
                    API_KEY_ENV
                ))
            })
    }

    pub fn markdown_path(&self) -> PathBuf {
        self.output
            .directory
            .join(format!("{}.md", self.output.file_name))
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.ai.timeout_secs)
    }

    /// Renders the configuration as a YAML document for `init-config`.
    pub fn to_yaml(&self) -> Result<String> {
        let value = serde_json::to_value(self)?;
        let yaml = json_to_yaml(&value);

        let mut out = String::new();
        let mut emitter = YamlEmitter::new(&mut out);
        emitter
            .dump(&yaml)
            .map_err(|e| PipelineError::Serialization(format!("{:?}", e)))?;
        out.push('\n');
        Ok(out)
    }

    fn validate(&self) -> Result<()> {
        if self.source.directories.is_empty() {
            return Err(PipelineError::Config(
                "source.directories must list at least one directory".to_string(),
            ));
        }

        if self.source.extension.trim().is_empty() {
            return Err(PipelineError::Config(
                "source.extension must not be empty".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.ai.temperature) {
            return Err(PipelineError::Config(format!(
                "ai.temperature must be within 0.0..=2.0, got {}",
                self.ai.temperature
            )));
        }

        Validator::validate_base_url(&self.ai.base_url)?;

        if self.ai.max_output_tokens == 0 {
            return Err(PipelineError::Config(
                "ai.max_output_tokens must be greater than 0".to_string(),
            ));
        }

        if self.ai.concurrency == 0 {
            return Err(PipelineError::Config(
                "ai.concurrency must be greater than 0".to_string(),
            ));
        }

        if self.ai.timeout_secs == 0 {
            return Err(PipelineError::Config(
                "ai.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(PipelineError::Config(
                "retry.max_attempts must be greater than 0".to_string(),
            ));
        }

        if self.retry.multiplier < 1.0 {
            return Err(PipelineError::Config(
                "retry.multiplier must be at least 1.0".to_string(),
            ));
        }

        if self.output.file_name.trim().is_empty() {
            return Err(PipelineError::Config(
                "output.file_name must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn json_to_yaml(value: &serde_json::Value) -> Yaml {
    match value {
        serde_json::Value::Null => Yaml::Null,
        serde_json::Value::Bool(b) => Yaml::Boolean(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Yaml::Integer(i),
            None => Yaml::Real(n.to_string()),
        },
        serde_json::Value::String(s) => Yaml::String(s.clone()),
        serde_json::Value::Array(items) => Yaml::Array(items.iter().map(json_to_yaml).collect()),
        serde_json::Value::Object(map) => {
            let mut hash = yaml_rust::yaml::Hash::new();
            for (key, value) in map {
                hash.insert(Yaml::String(key.clone()), json_to_yaml(value));
            }
            Yaml::Hash(hash)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.ai.model, "models/gemini-1.5-flash");
        assert_eq!(config.output.group_by, GroupBy::Module);
        assert_eq!(config.tests.framework, TestFramework::Pytest);
    }

    #[test]
    fn test_file_layer_overrides_defaults_per_field() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("autodoc.yaml");
        fs::write(
            &path,
            "ai:\n  temperature: 0.7\noutput:\n  group_by: type\n  index_title: Reference\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.ai.temperature, 0.7);
        assert_eq!(config.ai.model, "models/gemini-1.5-flash");
        assert_eq!(config.ai.max_output_tokens, 8192);
        assert_eq!(config.output.group_by, GroupBy::Type);
        assert_eq!(config.output.index_title, "Reference");
        assert_eq!(config.output.file_name, "consolidated_documentation");
    }

    #[test]
    fn test_json_file_layer() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("autodoc.json");
        fs::write(
            &path,
            r#"{"source": {"exclude": ["legacy"]}, "tests": {"framework": "unittest"}}"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.source.exclude, vec!["legacy".to_string()]);
        assert_eq!(config.tests.framework, TestFramework::Unittest);
        assert_eq!(config.source.extension, "py");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = Config::load(Some(Path::new("/nonexistent/autodoc.yaml")));
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_invalid_file_value_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("autodoc.yaml");
        fs::write(&path, "ai:\n  concurrency: 0\n").unwrap();

        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut config = Config::default_config();
        let overrides = CliOverrides {
            source: Some(PathBuf::from("src")),
            exclude: vec!["migrations".to_string(), "venv".to_string()],
            title: Some("Project Docs".to_string()),
            group_by: Some(GroupBy::Flat),
            temperature: Some(0.0),
            pdf: Some(true),
            ..Default::default()
        };

        config.apply_overrides(overrides).unwrap();

        assert_eq!(config.source.directories, vec![PathBuf::from("src")]);
        assert!(config.source.exclude.contains(&"migrations".to_string()));
        assert_eq!(
            config.source.exclude.iter().filter(|p| *p == "venv").count(),
            1
        );
        assert_eq!(config.output.index_title, "Project Docs");
        assert_eq!(config.output.group_by, GroupBy::Flat);
        assert_eq!(config.ai.temperature, 0.0);
        assert!(config.output.pdf);
        assert_eq!(config.ai.model, "models/gemini-1.5-flash");
    }

    #[test]
    fn test_invalid_override_rejected() {
        let mut config = Config::default_config();
        let overrides = CliOverrides {
            temperature: Some(3.5),
            ..Default::default()
        };
        assert!(config.apply_overrides(overrides).is_err());
    }

    #[test]
    fn test_explicit_api_key_preferred() {
        let mut config = Config::default_config();
        config.ai.api_key = Some("from-flag".to_string());
        assert_eq!(config.resolve_api_key().unwrap(), "from-flag");
    }

    #[test]
    fn test_yaml_round_trip_through_loader() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("autodoc.yaml");
        let defaults = Config::default_config();
        fs::write(&path, defaults.to_yaml().unwrap()).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.source, defaults.source);
        assert_eq!(loaded.retry, defaults.retry);
        assert_eq!(loaded.output, defaults.output);
        assert_eq!(loaded.tests, defaults.tests);
    }

    #[test]
    fn test_discover_prefers_yaml() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("autodoc.json"), "{}").unwrap();
        fs::write(temp.path().join("autodoc.yaml"), "{}").unwrap();

        let found = Config::discover(temp.path()).unwrap();
        assert!(found.ends_with("autodoc.yaml"));
        assert!(Config::discover(&temp.path().join("missing")).is_none());
    }

    #[test]
    fn test_markdown_path() {
        let config = Config::default_config();
        assert_eq!(
            config.markdown_path(),
            PathBuf::from("./docs/consolidated_documentation.md")
        );
    }
}
