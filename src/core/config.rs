use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use std::{fs, path::PathBuf};
use tracing::debug;

/// Document formats the central bank endpoint is known to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentFormat {
    /// Array of `{"date": "YYYY-MM-DD", "value": 4000.5}` records
    Json,
    /// Comma separated, decimal point
    Csv,
    /// Semicolon separated, decimal comma
    CsvSemicolon,
    /// Office Open XML workbook, first sheet
    Xlsx,
    /// Legacy BIFF workbook, first sheet
    Xls,
}

impl Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DocumentFormat::Json => "json",
                DocumentFormat::Csv => "csv",
                DocumentFormat::CsvSemicolon => "csv-semicolon",
                DocumentFormat::Xlsx => "xlsx",
                DocumentFormat::Xls => "xls",
            }
        )
    }
}

impl FromStr for DocumentFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(DocumentFormat::Json),
            "csv" => Ok(DocumentFormat::Csv),
            "csv-semicolon" => Ok(DocumentFormat::CsvSemicolon),
            "xlsx" => Ok(DocumentFormat::Xlsx),
            "xls" => Ok(DocumentFormat::Xls),
            _ => Err(anyhow!("Invalid document format: {}", s)),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OpenDataProviderConfig {
    pub base_url: String,
    #[serde(default = "default_dataset")]
    pub dataset: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CentralBankProviderConfig {
    pub base_url: String,
    /// Tried in order; the first one that parses the whole body wins.
    #[serde(default = "default_formats")]
    pub formats: Vec<DocumentFormat>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScrapingProviderConfig {
    pub base_url: String,
    #[serde(default = "default_page")]
    pub page: String,
}

fn default_dataset() -> String {
    "32sa-8pi3".to_string()
}

fn default_limit() -> u32 {
    5000
}

fn default_formats() -> Vec<DocumentFormat> {
    vec![
        DocumentFormat::Json,
        DocumentFormat::Csv,
        DocumentFormat::CsvSemicolon,
        DocumentFormat::Xlsx,
        DocumentFormat::Xls,
    ]
}

fn default_page() -> String {
    "/historico-trm".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub open_data: OpenDataProviderConfig,
    pub central_bank: CentralBankProviderConfig,
    pub scraping: ScrapingProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            open_data: OpenDataProviderConfig {
                base_url: "https://www.datos.gov.co".to_string(),
                dataset: default_dataset(),
                limit: default_limit(),
            },
            central_bank: CentralBankProviderConfig {
                base_url: "https://www.banrep.gov.co".to_string(),
                formats: default_formats(),
            },
            scraping: ScrapingProviderConfig {
                base_url: "https://dolar-colombia.com".to_string(),
                page: default_page(),
            },
        }
    }
}

/// Parameters of the synthetic fallback series.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SampleConfig {
    pub baseline: f64,
    pub volatility: f64,
    pub seed: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        SampleConfig {
            baseline: 4000.0,
            volatility: 25.0,
            seed: 42,
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_export_dir() -> String {
    "data".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub sample: SampleConfig,
    /// Per-request network timeout applied to every live source
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            sample: SampleConfig::default(),
            timeout_secs: default_timeout_secs(),
            export_dir: default_export_dir(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, or built-in defaults when
    /// no config file has been created yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("co", "trm", "trm")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
