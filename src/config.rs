use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/";
pub const DEFAULT_TOOL_NAME: &str = "taxfetch";
pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Identification sent along with every Entrez request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub email: String,
    pub api_key: String,
    pub tool: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            email: String::new(),
            api_key: String::new(),
            tool: DEFAULT_TOOL_NAME.to_string(),
        }
    }
}

/// What to fetch and which lengths to keep. `min_length > max_length` is
/// accepted and simply matches nothing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub taxonomic_id: String,
    pub min_length: usize,
    pub max_length: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub start: usize,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl Query {
    pub fn new(taxonomic_id: &str, min_length: usize, max_length: usize) -> Self {
        Self {
            taxonomic_id: taxonomic_id.trim().to_string(),
            min_length,
            max_length,
            batch_size: DEFAULT_BATCH_SIZE,
            start: 0,
        }
    }

    pub fn is_inverted(&self) -> bool {
        self.min_length > self.max_length
    }
}

/// Wire format requested from `efetch` for nucleotide records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    #[default]
    GenBank,
    GbXml,
}

impl RecordFormat {
    /// `(rettype, retmode)` pair for `efetch`.
    pub fn efetch_params(self) -> (&'static str, &'static str) {
        match self {
            Self::GenBank => ("gb", "text"),
            Self::GbXml => ("gb", "xml"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_EUTILS_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Everything one pipeline run needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub credentials: Credentials,
    pub query: Query,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub format: RecordFormat,
    #[serde(default)]
    pub service: ServiceSettings,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl RunConfig {
    pub fn new(credentials: Credentials, query: Query) -> Self {
        Self {
            credentials,
            query,
            output_dir: default_output_dir(),
            format: RecordFormat::default(),
            service: ServiceSettings::default(),
        }
    }

    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join(csv_file_name(&self.query.taxonomic_id))
    }

    pub fn plot_path(&self) -> PathBuf {
        self.output_dir.join(plot_file_name(&self.query.taxonomic_id))
    }
}

pub fn csv_file_name(taxonomic_id: &str) -> String {
    format!("taxid_{taxonomic_id}_filtered.csv")
}

pub fn plot_file_name(taxonomic_id: &str) -> String {
    format!("taxid_{taxonomic_id}_plot.png")
}

/// Partially filled configuration as read from a JSON file. Every field is
/// optional so flags and prompts can supply the rest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub email: Option<String>,
    pub api_key: Option<String>,
    pub tool: Option<String>,
    pub taxonomic_id: Option<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub batch_size: Option<usize>,
    pub start: Option<usize>,
    pub format: Option<RecordFormat>,
    pub output_dir: Option<PathBuf>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl ConfigFile {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Malformed {
            path: path.display().to_string(),
            source,
        })
    }

    /// Fields set in `other` win.
    pub fn overlay(self, other: ConfigFile) -> ConfigFile {
        ConfigFile {
            email: other.email.or(self.email),
            api_key: other.api_key.or(self.api_key),
            tool: other.tool.or(self.tool),
            taxonomic_id: other.taxonomic_id.or(self.taxonomic_id),
            min_length: other.min_length.or(self.min_length),
            max_length: other.max_length.or(self.max_length),
            batch_size: other.batch_size.or(self.batch_size),
            start: other.start.or(self.start),
            format: other.format.or(self.format),
            output_dir: other.output_dir.or(self.output_dir),
            base_url: other.base_url.or(self.base_url),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
        }
    }

    /// Names of the required values still unset, in console prompt order.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = vec![];
        if self.email.as_deref().is_none_or(|v| v.trim().is_empty()) {
            missing.push("email");
        }
        if self.taxonomic_id.as_deref().is_none_or(|v| v.trim().is_empty()) {
            missing.push("taxonomic_id");
        }
        if self.min_length.is_none() {
            missing.push("min_length");
        }
        if self.max_length.is_none() {
            missing.push("max_length");
        }
        missing
    }

    /// Console prompts only run for missing required values. An unset API key
    /// is asked for alongside them but never triggers a prompt on its own.
    pub fn needs_prompt(&self) -> bool {
        !self.missing_required().is_empty()
    }

    pub fn into_run_config(self) -> Result<RunConfig, ConfigError> {
        let email = self
            .email
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("email"))?;
        let taxonomic_id = self
            .taxonomic_id
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("taxonomic_id"))?;
        let min_length = self.min_length.ok_or(ConfigError::Missing("min_length"))?;
        let max_length = self.max_length.ok_or(ConfigError::Missing("max_length"))?;

        let mut query = Query::new(&taxonomic_id, min_length, max_length);
        if let Some(batch_size) = self.batch_size {
            if batch_size == 0 {
                return Err(ConfigError::Invalid {
                    field: "batch_size",
                    value: batch_size.to_string(),
                });
            }
            query.batch_size = batch_size;
        }
        query.start = self.start.unwrap_or(0);

        let credentials = Credentials {
            email: email.trim().to_string(),
            api_key: self.api_key.unwrap_or_default().trim().to_string(),
            tool: self.tool.unwrap_or_else(|| DEFAULT_TOOL_NAME.to_string()),
        };
        let mut config = RunConfig::new(credentials, query);
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        config.format = self.format.unwrap_or_default();
        if let Some(base_url) = self.base_url {
            config.service.base_url = base_url;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.service.timeout_secs = timeout_secs;
        }
        Ok(config)
    }
}
