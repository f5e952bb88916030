//! Response bodies of the Entrez `efetch` (taxonomy) and `esearch` utilities.

use crate::error::EntrezError;
use crate::sequence_record::nonempty_owned;
use serde::{Deserialize, Serialize};

/// Scientific name and placement of one taxon, as resolved from `db=taxonomy`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonInfo {
    pub tax_id: String,
    pub scientific_name: String,
    pub rank: Option<String>,
    pub lineage: Option<String>,
}

/// Server-side history handle of a finished `esearch`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSession {
    pub web_env: String,
    pub query_key: String,
    pub total_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "TaxaSet")]
struct TaxaSetXml {
    #[serde(rename = "Taxon", default)]
    taxa: Vec<TaxonXml>,
    #[serde(rename = "ERROR")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaxonXml {
    #[serde(rename = "TaxId")]
    tax_id: Option<String>,
    #[serde(rename = "ScientificName")]
    scientific_name: Option<String>,
    #[serde(rename = "Rank")]
    rank: Option<String>,
    #[serde(rename = "Lineage")]
    lineage: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "eSearchResult")]
struct ESearchResultXml {
    #[serde(rename = "Count")]
    count: Option<String>,
    #[serde(rename = "QueryKey")]
    query_key: Option<String>,
    #[serde(rename = "WebEnv")]
    web_env: Option<String>,
    #[serde(rename = "ERROR")]
    error: Option<String>,
}

/// Parses the taxonomy `efetch` body and returns the first taxon.
pub fn parse_taxonomy_xml(xml: &str, requested_tax_id: &str) -> Result<TaxonInfo, EntrezError> {
    if let Some(message) = bare_error_message(xml) {
        return Err(EntrezError::NotFound(format!(
            "taxonomy id '{requested_tax_id}': {message}"
        )));
    }
    let parsed: TaxaSetXml = quick_xml::de::from_str(xml)?;
    if let Some(message) = nonempty_owned(parsed.error.as_deref()) {
        return Err(EntrezError::NotFound(format!(
            "taxonomy id '{requested_tax_id}': {message}"
        )));
    }
    let Some(first) = parsed.taxa.into_iter().next() else {
        return Err(EntrezError::NotFound(format!(
            "taxonomy id '{requested_tax_id}' returned no taxon"
        )));
    };
    let scientific_name = nonempty_owned(first.scientific_name.as_deref()).ok_or_else(|| {
        EntrezError::Parse(format!(
            "taxon '{requested_tax_id}' has no ScientificName"
        ))
    })?;
    Ok(TaxonInfo {
        tax_id: nonempty_owned(first.tax_id.as_deref())
            .unwrap_or_else(|| requested_tax_id.to_string()),
        scientific_name,
        rank: nonempty_owned(first.rank.as_deref()),
        lineage: nonempty_owned(first.lineage.as_deref()),
    })
}

/// Parses an `esearch` body issued with `usehistory=y`.
///
/// Zero hits are reported as `NotFound`; a positive count without a history
/// handle is a protocol violation.
pub fn parse_esearch_xml(xml: &str, term: &str) -> Result<SearchSession, EntrezError> {
    let parsed: ESearchResultXml = quick_xml::de::from_str(xml)?;
    if let Some(message) = nonempty_owned(parsed.error.as_deref()) {
        return Err(EntrezError::Parse(format!("esearch '{term}' failed: {message}")));
    }
    let count_text = nonempty_owned(parsed.count.as_deref())
        .ok_or_else(|| EntrezError::Parse(format!("esearch '{term}' returned no Count")))?;
    let total_count: usize = count_text.parse().map_err(|_| {
        EntrezError::Parse(format!("esearch '{term}' returned invalid Count '{count_text}'"))
    })?;
    if total_count == 0 {
        return Err(EntrezError::NotFound(format!("no records found for '{term}'")));
    }
    let web_env = nonempty_owned(parsed.web_env.as_deref())
        .ok_or_else(|| EntrezError::Parse(format!("esearch '{term}' returned no WebEnv")))?;
    let query_key = nonempty_owned(parsed.query_key.as_deref())
        .ok_or_else(|| EntrezError::Parse(format!("esearch '{term}' returned no QueryKey")))?;
    Ok(SearchSession {
        web_env,
        query_key,
        total_count,
    })
}

// Some E-utility failures come back as a lone `<ERROR>` document.
fn bare_error_message(xml: &str) -> Option<String> {
    let body = xml.trim_start();
    let body = match body.strip_prefix("<?xml") {
        Some(rest) => rest.split_once("?>").map(|(_, tail)| tail.trim_start())?,
        None => body,
    };
    let inner = body.strip_prefix("<ERROR>")?;
    let (message, _) = inner.split_once("</ERROR>")?;
    nonempty_owned(Some(message)).or_else(|| Some("unspecified error".to_string()))
}
