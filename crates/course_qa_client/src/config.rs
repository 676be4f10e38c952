//! Client config load/save for `~/.course-qa/config.yaml`.

use std::path::{Path, PathBuf};

use crate::client::DEFAULT_API_URL;

pub const DEFAULT_WELCOME_MESSAGE: &str = "Welcome to the Course Materials Assistant! I can help you with questions about courses, lessons and specific content. What would you like to know?";

pub const DEFAULT_SUGGESTED_QUESTIONS: [&str; 4] = [
    "What is the outline of the \"MCP: Build Rich-Context AI Apps with Anthropic\" course?",
    "Are there any courses that include a Chatbot implementation?",
    "Are there any courses that explain what RAG is?",
    "What was covered in lesson 5 of the MCP course?",
];

/// API section.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ApiSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Chat section: welcome text and suggested question shortcuts.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ChatSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub welcome_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_questions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub chat: ChatSection,
}

impl Config {
    pub fn api_url(&self) -> &str {
        self.api.base_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn welcome_message(&self) -> &str {
        self.chat
            .welcome_message
            .as_deref()
            .unwrap_or(DEFAULT_WELCOME_MESSAGE)
    }

    pub fn suggested_questions(&self) -> Vec<String> {
        match &self.chat.suggested_questions {
            Some(questions) => questions.clone(),
            None => DEFAULT_SUGGESTED_QUESTIONS
                .iter()
                .map(|q| q.to_string())
                .collect(),
        }
    }
}

const CONFIG_DIR: &str = ".course-qa";
const CONFIG_FILE: &str = "config.yaml";

/// Where `course-qa` looks when neither `--config` nor `COURSE_QA_CONFIG`
/// names a file: `.course-qa/config.yaml` under the user's home directory.
/// `None` when no home directory is set.
pub fn default_config_path() -> Option<PathBuf> {
    home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
}

fn home_dir() -> Option<PathBuf> {
    let key = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    std::env::var_os(key)
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
}

/// Load config from a YAML file.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_yaml::from_str(&contents)?)
}

/// Save config to a YAML file. Creates parent directory if missing.
pub fn save(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    let contents = serde_yaml::to_string(config)?;
    std::fs::write(path, contents).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),
}
