//! resolve → search → fetch → filter → CSV → chart, with early exits when
//! the taxon cannot be resolved or has no nucleotide records.

use crate::config::RunConfig;
use crate::entrez::{EntrezClient, EntrezTransport, HttpTransport};
use crate::error::EntrezError;
use crate::eutils_xml::TaxonInfo;
use crate::filter::{LengthWindow, ResultTable, filter_records};
use crate::length_chart::write_plot_png;
use crate::table_export::write_csv;
use anyhow::Result;
use log::{error, info, warn};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub taxon: TaxonInfo,
    pub total_count: usize,
    pub fetched: usize,
    pub kept: usize,
    pub csv_path: PathBuf,
    pub plot_path: PathBuf,
}

#[derive(Debug)]
pub enum Outcome {
    /// Taxonomy lookup failed; nothing was searched or written.
    TaxonNotResolved(EntrezError),
    /// Search failed or matched zero records; nothing was fetched or written.
    NoRecords(EntrezError),
    Completed(RunReport),
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

pub struct Pipeline<T: EntrezTransport> {
    client: EntrezClient<T>,
}

impl Pipeline<HttpTransport> {
    pub fn connect(config: &RunConfig) -> Result<Self> {
        let client = EntrezClient::connect(config.credentials.clone(), &config.service)?;
        Ok(Self::new(client))
    }
}

impl<T: EntrezTransport> Pipeline<T> {
    pub fn new(client: EntrezClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &EntrezClient<T> {
        &self.client
    }

    /// Remote failures end the run early as an `Outcome`; only local write
    /// failures are returned as `Err`.
    pub fn run(&self, config: &RunConfig) -> Result<Outcome> {
        let query = &config.query;
        let tax_id = query.taxonomic_id.as_str();
        if query.is_inverted() {
            warn!(
                "Minimum length {} exceeds maximum length {}; no record can match",
                query.min_length, query.max_length
            );
        }

        info!("Searching for records with taxID: {tax_id}");
        let taxon = match self.client.resolve_taxon(tax_id) {
            Ok(taxon) => taxon,
            Err(e) => {
                error!("Error searching TaxID {tax_id}: {e}");
                return Ok(Outcome::TaxonNotResolved(e));
            }
        };

        let session = match self.client.search_nucleotide(tax_id) {
            Ok(session) => session,
            Err(e) => {
                if !e.is_not_found() {
                    error!("Error searching TaxID {tax_id}: {e}");
                }
                return Ok(Outcome::NoRecords(e));
            }
        };

        info!("Fetching records...");
        let records = self.client.fetch_records(
            Some(&session),
            config.format,
            query.start,
            query.batch_size,
        );
        let table: ResultTable = filter_records(
            &records,
            LengthWindow::new(query.min_length, query.max_length),
        );
        info!(
            "{} of {} fetched records are within {}..={} bp",
            table.len(),
            records.len(),
            query.min_length,
            query.max_length
        );

        let csv_path = config.csv_path();
        write_csv(&table, &csv_path)?;
        info!("Saved filtered records to {}", csv_path.display());

        let plot_path = config.plot_path();
        write_plot_png(&table, &plot_path)?;
        info!("Saved plot to {}", plot_path.display());

        Ok(Outcome::Completed(RunReport {
            taxon,
            total_count: session.total_count,
            fetched: records.len(),
            kept: table.len(),
            csv_path,
            plot_path,
        }))
    }
}
