use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    /// JSON file with the activity catalog; the built-in seed is used when
    /// empty.
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_feedback_window")]
    pub feedback_window: usize,
    #[serde(default = "default_summary_window")]
    pub summary_window: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key; the key itself never lives
    /// in the config file.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub catalog_path: Option<String>,
    pub model: Option<String>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/break-advisor/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(catalog_path) = overrides.catalog_path {
            self.catalog.path = catalog_path;
        }
        if let Some(model) = overrides.model {
            self.ai.model = model;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn resolved_catalog_path(&self) -> Option<PathBuf> {
        if self.catalog.path.trim().is_empty() {
            None
        } else {
            Some(expand_tilde(&self.catalog.path))
        }
    }

    pub fn default_template() -> String {
        let template = r#"[catalog]
path = ""

[engine]
max_results = 10
feedback_window = 10
summary_window = 100

[ai]
model = "gemini-1.5-flash"
api_key_env = "GEMINI_API_KEY"
"#;
        template.to_string()
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            feedback_window: default_feedback_window(),
            summary_window: default_summary_window(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_max_results() -> usize {
    10
}

fn default_feedback_window() -> usize {
    10
}

fn default_summary_window() -> usize {
    100
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

#[cfg(test)]
mod tests {
    use crate::config::Config;

    #[test]
    fn template_parses_back_into_defaults() {
        let parsed: Config = toml::from_str(&Config::default_template()).unwrap();
        assert_eq!(parsed.engine.max_results, 10);
        assert_eq!(parsed.ai.model, "gemini-1.5-flash");
        assert!(parsed.resolved_catalog_path().is_none());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load(Some(std::path::Path::new(
            "/nonexistent/break-advisor.toml",
        )))
        .unwrap();
        assert_eq!(config.engine.feedback_window, 10);
    }
}
