use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::currency::{CurrencyCode, LocaleConfig};
use crate::errors::ConfigError;
use crate::validation::PurchaseLimits;

const DEFAULT_DIR_NAME: &str = ".racao_core";
const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";

/// Overrides the data directory (`~/.racao_core`).
pub const HOME_ENV: &str = "RACAO_CORE_HOME";
/// Overrides the endpoint base URL without touching the config file.
pub const API_URL_ENV: &str = "RACAO_API_URL";

pub const DEFAULT_API_BASE_URL: &str = "http://10.50.184.66:3001";

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub locale: String,
    pub currency: String,
    pub limits: PurchaseLimits,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            request_timeout_secs: 10,
            locale: "pt-BR".into(),
            currency: "BRL".into(),
            limits: PurchaseLimits::default(),
        }
    }
}

impl Config {
    pub fn locale_config(&self) -> LocaleConfig {
        LocaleConfig::for_tag(&self.locale)
    }

    pub fn currency_code(&self) -> CurrencyCode {
        CurrencyCode::new(self.currency.clone())
    }

    /// Applies environment overrides on top of the stored values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().to_string();
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api_base_url `{url}` must start with http:// or https://"
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        self.limits.check().map_err(ConfigError::Invalid)
    }

    /// Keys accepted by [`Config::set_value`], in display order.
    pub const KEYS: [&'static str; 7] = [
        "api_base_url",
        "request_timeout_secs",
        "locale",
        "currency",
        "brand_max_chars",
        "quantity_max_kg",
        "price_max",
    ];

    /// Updates one setting from its textual form and re-validates.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let mut updated = self.clone();
        let value = value.trim();
        match key {
            "api_base_url" => updated.api_base_url = value.to_string(),
            "request_timeout_secs" => updated.request_timeout_secs = parse_setting(key, value)?,
            "locale" => updated.locale = value.to_string(),
            "currency" => updated.currency = value.to_uppercase(),
            "brand_max_chars" => updated.limits.brand_max_chars = parse_setting(key, value)?,
            "quantity_max_kg" => updated.limits.quantity_max_kg = parse_setting(key, value)?,
            "price_max" => updated.limits.price_max = parse_setting(key, value)?,
            other => {
                return Err(ConfigError::Invalid(format!(
                    "unknown setting `{other}` (expected one of: {})",
                    Self::KEYS.join(", ")
                )))
            }
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn value_of(&self, key: &str) -> Option<String> {
        Some(match key {
            "api_base_url" => self.api_base_url.clone(),
            "request_timeout_secs" => self.request_timeout_secs.to_string(),
            "locale" => self.locale.clone(),
            "currency" => self.currency.clone(),
            "brand_max_chars" => self.limits.brand_max_chars.to_string(),
            "quantity_max_kg" => self.limits.quantity_max_kg.to_string(),
            "price_max" => self.limits.price_max.to_string(),
            _ => return None,
        })
    }
}

fn parse_setting<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse::<T>()
        .map_err(|_| ConfigError::Invalid(format!("`{value}` is not a valid value for {key}")))
}

/// Returns the application data directory, defaulting to `~/.racao_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base)?;
        Ok(Self {
            path: base.join(CONFIG_FILE),
        })
    }

    /// Stored configuration, or defaults when no file exists yet.
    pub fn load(&self) -> Result<Config> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            let config: Config = serde_json::from_str(&data)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Stored configuration with environment overrides applied.
    pub fn load_effective(&self) -> Result<Config> {
        let config = self.load()?.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
