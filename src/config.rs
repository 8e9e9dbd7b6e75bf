use std::collections::HashMap;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{BlockpadError, Result};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendConfig {
    /// Base url of the command endpoint. Empty runs against the built-in local backend.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub token: String,
    pub document: String,
}

impl BackendConfig {
    pub fn is_local(&self) -> bool {
        self.url.is_empty()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UiConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct KeybindingsConfig {
    #[serde(default = "default_preset")]
    pub preset: String,
    #[serde(default)]
    pub bindings: HashMap<String, String>,
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            bindings: HashMap::new(),
        }
    }
}

fn default_theme() -> String {
    "dark".into()
}

fn default_preset() -> String {
    "default".into()
}

impl AppConfig {
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        let config: AppConfig = Figment::new()
            .merge(Serialized::defaults(AppConfig::defaults()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("BLOCKPAD_").split("__"))
            .extract()
            .map_err(|e| BlockpadError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend.document.is_empty() {
            return Err(BlockpadError::Config("backend.document is required".into()));
        }
        if !self.backend.is_local() && self.backend.token.is_empty() {
            return Err(BlockpadError::Config(
                "backend.token is required when backend.url is set (or set BLOCKPAD_BACKEND__TOKEN)"
                    .into(),
            ));
        }
        Ok(())
    }

    pub fn config_dir() -> Option<PathBuf> {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(|xdg| PathBuf::from(xdg).join("blockpad"))
            .or_else(|| {
                directories::BaseDirs::new()
                    .map(|dirs| dirs.home_dir().join(".config").join("blockpad"))
            })
    }

    /// Where the log file goes: `BLOCKPAD_LOG_DIR`, else the config dir.
    pub fn log_dir() -> PathBuf {
        std::env::var("BLOCKPAD_LOG_DIR")
            .ok()
            .filter(|d| !d.is_empty())
            .map(PathBuf::from)
            .or_else(Self::config_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = r#"[backend]
# Leave url empty to edit a scratch document held in memory.
url = ""
token = ""  # or set BLOCKPAD_BACKEND__TOKEN
document = "scratch"

[ui]
theme = "dark"

[keybindings]
preset = "default"  # default | vscode

# Override specific keys:
# [keybindings.bindings]
# quit = "Ctrl+x"
# help = "F2"
"#;

        std::fs::write(path, content)?;
        Ok(())
    }

    fn defaults() -> Self {
        Self {
            backend: BackendConfig {
                url: String::new(),
                token: String::new(),
                document: String::new(),
            },
            ui: UiConfig::default(),
            keybindings: KeybindingsConfig::default(),
        }
    }
}
