pub mod config;
pub mod entrez;
pub mod error;
pub mod eutils_xml;
pub mod filter;
pub mod length_chart;
pub mod ncbi_genbank_xml;
pub mod pipeline;
pub mod prompt;
pub mod sequence_record;
pub mod table_export;
