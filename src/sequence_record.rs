//! Projection of fetched nucleotide records onto the (accession, length,
//! description) rows that the rest of the pipeline works with.

use crate::error::EntrezError;
use gb_io::reader::SeqReader;
use gb_io::seq::Seq;
use serde::{Deserialize, Serialize};

/// One row of the result table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceRecord {
    #[serde(rename = "Accession")]
    pub accession: String,
    #[serde(rename = "Length")]
    pub length: usize,
    #[serde(rename = "Description")]
    pub description: String,
}

impl SequenceRecord {
    pub fn new(accession: &str, length: usize, description: &str) -> Self {
        Self {
            accession: accession.to_string(),
            length,
            description: description.to_string(),
        }
    }

    /// `record_idx` is only used to name records that carry no identifier.
    pub fn from_genbank_seq(seq: &Seq, record_idx: usize) -> Self {
        let accession = nonempty_owned(seq.version.as_deref())
            .or_else(|| nonempty_owned(seq.accession.as_deref()))
            .or_else(|| nonempty_owned(seq.name.as_deref()))
            .unwrap_or_else(|| format!("record_{}", record_idx + 1));
        let length = residue_count(seq.seq.len(), seq.len);
        Self {
            accession,
            length,
            description: definition_to_description(seq.definition.as_deref()),
        }
    }
}

/// Parses a GenBank flat file (`rettype=gb&retmode=text`) into records, in
/// file order.
pub fn parse_genbank_text(text: &str) -> Result<Vec<SequenceRecord>, EntrezError> {
    if text.trim().is_empty() {
        return Ok(vec![]);
    }
    SeqReader::new(text.as_bytes())
        .enumerate()
        .map(|(record_idx, seq)| {
            seq.map(|seq| SequenceRecord::from_genbank_seq(&seq, record_idx))
                .map_err(|e| {
                    EntrezError::Parse(format!("GenBank record {}: {e}", record_idx + 1))
                })
        })
        .collect()
}

/// Contig (CON) records ship without residues; fall back to the declared
/// length then.
pub(crate) fn residue_count(residues: usize, declared: Option<usize>) -> usize {
    if residues > 0 {
        residues
    } else {
        declared.unwrap_or(0)
    }
}

pub(crate) fn definition_to_description(definition: Option<&str>) -> String {
    let text = definition.unwrap_or_default().trim();
    text.strip_suffix('.').unwrap_or(text).to_string()
}

pub(crate) fn nonempty_owned(raw: Option<&str>) -> Option<String> {
    let text = raw.unwrap_or_default().trim();
    (!text.is_empty()).then_some(text.to_string())
}

/// Renders a minimal but well-formed GenBank flat file record, used by the
/// offline tests to stand in for an `efetch` response.
#[cfg(test)]
pub(crate) fn genbank_fixture(accession: &str, length: usize, definition: &str) -> String {
    let residues: Vec<u8> = b"acgt".iter().copied().cycle().take(length).collect();
    let mut origin = String::new();
    for (line_idx, line) in residues.chunks(60).enumerate() {
        let blocks: Vec<&str> = line
            .chunks(10)
            .map(|block| std::str::from_utf8(block).unwrap_or_default())
            .collect();
        origin.push_str(&format!("{:>9} {}\n", line_idx * 60 + 1, blocks.join(" ")));
    }
    let header = [
        format!("LOCUS       {accession:<16}{length:>12} bp    DNA     linear   PLN 01-JAN-2024"),
        format!("DEFINITION  {definition}"),
        format!("ACCESSION   {accession}"),
        format!("VERSION     {accession}.1"),
        "KEYWORDS    .".to_string(),
        "SOURCE      Arabidopsis thaliana".to_string(),
        "  ORGANISM  Arabidopsis thaliana".to_string(),
        "            Eukaryota; Viridiplantae.".to_string(),
        "FEATURES             Location/Qualifiers".to_string(),
        format!("     source          1..{length}"),
        "                     /organism=\"Arabidopsis thaliana\"".to_string(),
        "                     /db_xref=\"taxon:3702\"".to_string(),
        "ORIGIN      ".to_string(),
    ];
    format!("{}\n{origin}//\n", header.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_genbank_records_in_order() {
        let text = format!(
            "{}{}",
            genbank_fixture("AB000001", 200, "Test clone one."),
            genbank_fixture("AB000002", 75, "Test clone two.")
        );
        let records = parse_genbank_text(&text).expect("parse GenBank");
        assert_eq!(
            records,
            vec![
                SequenceRecord::new("AB000001.1", 200, "Test clone one"),
                SequenceRecord::new("AB000002.1", 75, "Test clone two"),
            ]
        );
    }

    #[test]
    fn fixture_keeps_feature_table_columns() {
        let text = genbank_fixture("AB000009", 61, "Layout check.");
        assert!(text.contains("\n     source          1..61\n"));
        assert!(text.contains("\n                     /organism=\"Arabidopsis thaliana\"\n"));
        assert!(text.contains("\n  ORGANISM  Arabidopsis thaliana\n"));
        assert!(text.contains("\n       61 a\n//\n"));
    }

    #[test]
    fn empty_response_yields_no_records() {
        assert!(parse_genbank_text("\n\n").expect("empty").is_empty());
    }

    #[test]
    fn accession_falls_back_through_identifiers() {
        let mut seq = Seq::empty();
        seq.seq = b"ACGTACGT".to_vec();
        assert_eq!(SequenceRecord::from_genbank_seq(&seq, 2).accession, "record_3");
        seq.name = Some("LOCUS1".to_string());
        assert_eq!(SequenceRecord::from_genbank_seq(&seq, 2).accession, "LOCUS1");
        seq.accession = Some("X12345".to_string());
        assert_eq!(SequenceRecord::from_genbank_seq(&seq, 2).accession, "X12345");
        seq.version = Some("X12345.2".to_string());
        assert_eq!(SequenceRecord::from_genbank_seq(&seq, 2).accession, "X12345.2");
    }

    #[test]
    fn contig_record_uses_declared_length() {
        assert_eq!(residue_count(0, Some(5000)), 5000);
        assert_eq!(residue_count(120, Some(5000)), 120);
        assert_eq!(residue_count(0, None), 0);
    }

    #[test]
    fn description_drops_single_trailing_period() {
        assert_eq!(definition_to_description(Some("  Foo bar.  ")), "Foo bar");
        assert_eq!(definition_to_description(Some("Foo...")), "Foo..");
        assert_eq!(definition_to_description(None), "");
    }
}
