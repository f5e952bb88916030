//! Turns the XML body of a nucleotide `efetch` (`rettype=gb&retmode=xml`)
//! into table rows.
//!
//! NCBI can answer that request in two element sets. Rows are read from
//! `GBSet` bodies; an `INSDSet` body is refused with a parse error naming the
//! dialect, since reading it as `GBSet` would quietly produce zero rows.

use crate::error::EntrezError;
use crate::sequence_record::{
    SequenceRecord, definition_to_description, nonempty_owned, residue_count,
};
use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NcbiXmlDialect {
    GbSetGbSeq,
    InsdSetInsdSeq,
    Unknown,
}

impl NcbiXmlDialect {
    pub fn label(self) -> &'static str {
        match self {
            Self::GbSetGbSeq => "GBSet/GBSeq",
            Self::InsdSetInsdSeq => "INSDSet/INSDSeq",
            Self::Unknown => "unknown",
        }
    }
}

pub fn detect_ncbi_xml_dialect(input: &str) -> NcbiXmlDialect {
    let lower = input.to_ascii_lowercase();
    if lower.contains("<gbset") {
        NcbiXmlDialect::GbSetGbSeq
    } else if lower.contains("<insdset") {
        NcbiXmlDialect::InsdSetInsdSeq
    } else {
        NcbiXmlDialect::Unknown
    }
}

pub fn parse_gbseq_xml_text(xml: &str) -> Result<Vec<SequenceRecord>, EntrezError> {
    match detect_ncbi_xml_dialect(xml) {
        NcbiXmlDialect::GbSetGbSeq => {}
        NcbiXmlDialect::InsdSetInsdSeq => {
            return Err(EntrezError::Parse(format!(
                "Unsupported XML dialect '{}'; only GBSet/GBSeq is supported",
                NcbiXmlDialect::InsdSetInsdSeq.label()
            )));
        }
        NcbiXmlDialect::Unknown => {
            return Err(EntrezError::Parse(format!(
                "Unsupported XML dialect: expected '{}' root element",
                NcbiXmlDialect::GbSetGbSeq.label()
            )));
        }
    }

    let parsed: GbSetXml = quick_xml::de::from_str(xml)
        .map_err(|e| EntrezError::Parse(format!("Malformed GBSet XML: {e}")))?;
    Ok(parsed
        .sequences
        .iter()
        .enumerate()
        .map(|(record_idx, record)| gbseq_record_to_row(record, record_idx))
        .collect())
}

#[derive(Debug, Deserialize)]
#[serde(rename = "GBSet")]
struct GbSetXml {
    #[serde(rename = "GBSeq", default)]
    sequences: Vec<GbSeqXml>,
}

#[derive(Debug, Deserialize)]
struct GbSeqXml {
    #[serde(rename = "GBSeq_locus")]
    locus: Option<String>,
    #[serde(rename = "GBSeq_length")]
    length: Option<usize>,
    #[serde(rename = "GBSeq_definition")]
    definition: Option<String>,
    #[serde(rename = "GBSeq_primary-accession")]
    primary_accession: Option<String>,
    #[serde(rename = "GBSeq_accession-version")]
    accession_version: Option<String>,
    #[serde(rename = "GBSeq_sequence")]
    sequence: Option<String>,
}

fn gbseq_record_to_row(record: &GbSeqXml, record_idx: usize) -> SequenceRecord {
    let residues = record
        .sequence
        .as_deref()
        .unwrap_or_default()
        .chars()
        .filter(|ch| ch.is_ascii_alphabetic())
        .count();
    let accession = nonempty_owned(record.accession_version.as_deref())
        .or_else(|| nonempty_owned(record.primary_accession.as_deref()))
        .or_else(|| nonempty_owned(record.locus.as_deref()))
        .unwrap_or_else(|| format!("record_{}", record_idx + 1));
    SequenceRecord {
        accession,
        length: residue_count(residues, record.length),
        description: definition_to_description(record.definition.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_RECORDS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE GBSet PUBLIC "-//NCBI//NCBI GBSeq/EN" "https://www.ncbi.nlm.nih.gov/dtd/NCBI_GBSeq.dtd">
<GBSet>
  <GBSeq>
    <GBSeq_locus>OR123456</GBSeq_locus>
    <GBSeq_length>12</GBSeq_length>
    <GBSeq_moltype>DNA</GBSeq_moltype>
    <GBSeq_definition>Arabidopsis thaliana clone X, partial sequence.</GBSeq_definition>
    <GBSeq_primary-accession>OR123456</GBSeq_primary-accession>
    <GBSeq_accession-version>OR123456.1</GBSeq_accession-version>
    <GBSeq_sequence>acgtacgtacgt</GBSeq_sequence>
  </GBSeq>
  <GBSeq>
    <GBSeq_locus>NC_000932</GBSeq_locus>
    <GBSeq_length>154478</GBSeq_length>
    <GBSeq_definition>Arabidopsis thaliana chloroplast, complete genome.</GBSeq_definition>
    <GBSeq_primary-accession>NC_000932</GBSeq_primary-accession>
  </GBSeq>
</GBSet>"#;

    #[test]
    fn test_detect_ncbi_xml_dialect_gbset() {
        let xml = r#"<?xml version="1.0"?><GBSet><GBSeq/></GBSet>"#;
        assert_eq!(detect_ncbi_xml_dialect(xml), NcbiXmlDialect::GbSetGbSeq);
    }

    #[test]
    fn test_detect_ncbi_xml_dialect_insdset() {
        let xml = r#"<?xml version="1.0"?><INSDSet><INSDSeq/></INSDSet>"#;
        assert_eq!(detect_ncbi_xml_dialect(xml), NcbiXmlDialect::InsdSetInsdSeq);
    }

    #[test]
    fn test_parse_gbseq_rows() {
        let rows = parse_gbseq_xml_text(TWO_RECORDS).expect("parse GBSet/GBSeq");
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            SequenceRecord::new(
                "OR123456.1",
                12,
                "Arabidopsis thaliana clone X, partial sequence"
            )
        );
        // No sequence element: length comes from GBSeq_length.
        assert_eq!(rows[1].accession, "NC_000932");
        assert_eq!(rows[1].length, 154478);
    }

    #[test]
    fn test_parse_empty_gbset() {
        let rows = parse_gbseq_xml_text("<GBSet></GBSet>").expect("empty set");
        assert!(rows.is_empty());
    }

    #[test]
    fn test_parse_gbseq_xml_text_rejects_insdset() {
        let err = parse_gbseq_xml_text("<INSDSet><INSDSeq/></INSDSet>")
            .expect_err("INSDSet should be rejected");
        assert!(
            err.to_string().contains("Unsupported XML dialect 'INSDSet/INSDSeq'"),
            "expected unsupported-dialect error, got: {err}"
        );
    }
}
