use crate::core::placement::DEFAULT_TARGET_SIZE;
use crate::core::ConfigProvider;
use crate::domain::model::GroupingMode;
use crate::utils::error::{GroupError, Result};
use crate::utils::validation::{validate_path, validate_positive_number, validate_range, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "flat-groups.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub grouping: GroupingConfig,
    #[serde(default)]
    pub billing: BillingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupingConfig {
    #[serde(default = "default_target_size")]
    pub target_size: usize,
    #[serde(default)]
    pub mode: GroupingMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingConfig {
    #[serde(default = "default_amount")]
    pub default_amount: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub json: bool,
}

fn default_store_path() -> String {
    "./data/flats.json".to_string()
}

fn default_target_size() -> usize {
    DEFAULT_TARGET_SIZE
}

fn default_amount() -> u32 {
    1500
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            target_size: default_target_size(),
            mode: GroupingMode::default(),
        }
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            default_amount: default_amount(),
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| GroupError::Config {
            message: format!("Cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| GroupError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// An explicit path must exist; without one the default file is used
    /// when present, otherwise built-in defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// 替換環境變數 (例如 ${STORE_PATH})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| GroupError::Config {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("store.path", &self.store.path)?;
        validate_range("grouping.target_size", self.grouping.target_size, 2, 50)?;
        validate_positive_number(
            "billing.default_amount",
            u64::from(self.billing.default_amount),
            1,
        )?;
        Ok(())
    }
}

impl ConfigProvider for AppConfig {
    fn store_path(&self) -> &str {
        &self.store.path
    }

    fn group_target_size(&self) -> usize {
        self.grouping.target_size
    }

    fn grouping_mode(&self) -> GroupingMode {
        self.grouping.mode
    }

    fn default_amount(&self) -> u32 {
        self.billing.default_amount
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
