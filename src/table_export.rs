use crate::filter::ResultTable;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::Path;

pub const CSV_HEADER: [&str; 3] = ["Accession", "Length", "Description"];

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| {
            format!("Could not create output directory for '{}'", path.display())
        })?;
    }
    Ok(())
}

/// Writes the table as `Accession,Length,Description`, replacing any
/// existing file.
pub fn write_csv(table: &ResultTable, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let file = File::create(path)
        .with_context(|| format!("Could not create CSV output '{}'", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    // Written explicitly so an empty table still gets its header row.
    writer.write_record(CSV_HEADER)?;
    for row in table.rows() {
        let length = row.length.to_string();
        writer.write_record([
            row.accession.as_str(),
            length.as_str(),
            row.description.as_str(),
        ])?;
    }
    writer
        .flush()
        .with_context(|| format!("Could not write CSV output '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence_record::SequenceRecord;
    use tempfile::tempdir;

    fn table() -> ResultTable {
        ResultTable::from(vec![
            SequenceRecord::new("OR000001.1", 200, "Arabidopsis thaliana clone A, partial"),
            SequenceRecord::new("OR000003.1", 800, "plain"),
        ])
    }

    #[test]
    fn writes_header_and_rows_without_index() {
        let td = tempdir().unwrap();
        let path = td.path().join("taxid_3702_filtered.csv");
        write_csv(&table(), &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Accession,Length,Description\n\
OR000001.1,200,\"Arabidopsis thaliana clone A, partial\"\n\
OR000003.1,800,plain\n"
        );
    }

    #[test]
    fn rows_round_trip_through_csv_reader() {
        let td = tempdir().unwrap();
        let path = td.path().join("out.csv");
        write_csv(&table(), &path).unwrap();
        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<SequenceRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows, table().rows());
    }

    #[test]
    fn empty_table_still_has_header() {
        let td = tempdir().unwrap();
        let path = td.path().join("nested/dir/empty.csv");
        write_csv(&ResultTable::default(), &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "Accession,Length,Description\n");
    }

    #[test]
    fn existing_file_is_overwritten() {
        let td = tempdir().unwrap();
        let path = td.path().join("out.csv");
        fs::write(&path, "stale content that is much longer than the new table\n".repeat(20))
            .unwrap();
        write_csv(&ResultTable::default(), &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "Accession,Length,Description\n");
    }
}
