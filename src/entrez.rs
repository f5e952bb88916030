//! Blocking client for the three Entrez E-utility calls the pipeline makes:
//! taxonomy lookup, nucleotide search with history, and one batched fetch.

use crate::config::{Credentials, RecordFormat, ServiceSettings};
use crate::error::EntrezError;
use crate::eutils_xml::{SearchSession, TaxonInfo, parse_esearch_xml, parse_taxonomy_xml};
use crate::ncbi_genbank_xml::parse_gbseq_xml_text;
use crate::sequence_record::{SequenceRecord, parse_genbank_text};
use log::{debug, error, info, warn};
use std::time::Duration;

/// Hard per-request limit the pipeline applies to `efetch` batches.
pub const MAX_BATCH_SIZE: usize = 500;

/// One GET against an E-utility endpoint (`efetch.fcgi`, `esearch.fcgi`).
pub trait EntrezTransport {
    fn get(&self, utility: &str, params: &[(&str, String)]) -> Result<String, EntrezError>;
}

pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(settings: &ServiceSettings) -> Result<Self, EntrezError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| EntrezError::Transport(format!("could not build HTTP client: {e}")))?;
        let mut base_url = settings.base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self { client, base_url })
    }
}

impl EntrezTransport for HttpTransport {
    fn get(&self, utility: &str, params: &[(&str, String)]) -> Result<String, EntrezError> {
        let url = format!("{}{utility}", self.base_url);
        debug!("GET {url} {}", redacted_params(params));
        let response = self.client.get(&url).query(params).send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(EntrezError::Http {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }
        Ok(body)
    }
}

fn redacted_params(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| {
            if *key == "api_key" {
                format!("{key}=***")
            } else {
                format!("{key}={value}")
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Clamps a requested batch to `MAX_BATCH_SIZE`.
pub fn clamp_batch_size(requested: usize) -> usize {
    requested.min(MAX_BATCH_SIZE)
}

pub fn organism_search_term(tax_id: &str) -> String {
    format!("txid{}[Organism]", tax_id.trim())
}

pub struct EntrezClient<T: EntrezTransport> {
    transport: T,
    credentials: Credentials,
}

impl EntrezClient<HttpTransport> {
    pub fn connect(credentials: Credentials, settings: &ServiceSettings) -> Result<Self, EntrezError> {
        Ok(Self::new(HttpTransport::new(settings)?, credentials))
    }
}

impl<T: EntrezTransport> EntrezClient<T> {
    pub fn new(transport: T, credentials: Credentials) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn identified(&self, mut params: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        params.push(("tool", self.credentials.tool.clone()));
        if !self.credentials.email.is_empty() {
            params.push(("email", self.credentials.email.clone()));
        }
        if !self.credentials.api_key.is_empty() {
            params.push(("api_key", self.credentials.api_key.clone()));
        }
        params
    }

    /// Looks up the scientific name of `tax_id` in `db=taxonomy`.
    pub fn resolve_taxon(&self, tax_id: &str) -> Result<TaxonInfo, EntrezError> {
        let params = self.identified(vec![
            ("db", "taxonomy".to_string()),
            ("id", tax_id.trim().to_string()),
            ("retmode", "xml".to_string()),
        ]);
        let body = self.transport.get("efetch.fcgi", &params)?;
        let taxon = parse_taxonomy_xml(&body, tax_id.trim())?;
        info!("Organism: {} (TaxID: {})", taxon.scientific_name, taxon.tax_id);
        Ok(taxon)
    }

    /// Searches `db=nucleotide` for the taxon and keeps the hits on the
    /// server. Zero hits come back as `EntrezError::NotFound`.
    pub fn search_nucleotide(&self, tax_id: &str) -> Result<SearchSession, EntrezError> {
        let term = organism_search_term(tax_id);
        let params = self.identified(vec![
            ("db", "nucleotide".to_string()),
            ("term", term.clone()),
            ("usehistory", "y".to_string()),
        ]);
        let body = self.transport.get("esearch.fcgi", &params)?;
        match parse_esearch_xml(&body, &term) {
            Ok(session) => {
                info!("Found {} records", session.total_count);
                Ok(session)
            }
            Err(e) => {
                if e.is_not_found() {
                    info!("No records found for TaxID {}", tax_id.trim());
                }
                Err(e)
            }
        }
    }

    /// Issues exactly one `efetch` against the stored search. Requests above
    /// `MAX_BATCH_SIZE` are truncated, never paged.
    pub fn try_fetch_batch(
        &self,
        session: &SearchSession,
        format: RecordFormat,
        start: usize,
        max_records: usize,
    ) -> Result<Vec<SequenceRecord>, EntrezError> {
        let batch_size = clamp_batch_size(max_records);
        if batch_size < max_records {
            warn!("Requested {max_records} records; fetching only the first {batch_size}");
        }
        let (rettype, retmode) = format.efetch_params();
        let params = self.identified(vec![
            ("db", "nucleotide".to_string()),
            ("rettype", rettype.to_string()),
            ("retmode", retmode.to_string()),
            ("retstart", start.to_string()),
            ("retmax", batch_size.to_string()),
            ("WebEnv", session.web_env.clone()),
            ("query_key", session.query_key.clone()),
        ]);
        let body = self.transport.get("efetch.fcgi", &params)?;
        match format {
            RecordFormat::GenBank => parse_genbank_text(&body),
            RecordFormat::GbXml => parse_gbseq_xml_text(&body),
        }
    }

    /// Degrading wrapper around `try_fetch_batch`: a missing session or any
    /// failure yields an empty batch.
    pub fn fetch_records(
        &self,
        session: Option<&SearchSession>,
        format: RecordFormat,
        start: usize,
        max_records: usize,
    ) -> Vec<SequenceRecord> {
        let Some(session) = session else {
            warn!("No search results to fetch; run a search first");
            return vec![];
        };
        match self.try_fetch_batch(session, format, start, max_records) {
            Ok(records) => {
                info!("Fetched {} records", records.len());
                records
            }
            Err(e) => {
                error!("Error fetching records: {e}");
                vec![]
            }
        }
    }
}
