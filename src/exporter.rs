use std::fs::{self, File};
use std::path::Path;

use log::info;

use crate::aggregator::ResultSet;
use crate::error::ExportError;
use crate::record::Row;

pub fn write_csv<P: AsRef<Path>>(results: &ResultSet, path: P) -> Result<usize, ExportError> {
    let path = path.as_ref();
    if results.is_empty() {
        info!("No records to export; {:?} left untouched", path);
        return Ok(0);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let count = write_rows(results.records().map(|record| record.to_row()), file)?;
    info!("Wrote {} rows -> {:?}", count, path);
    Ok(count)
}

pub fn write_rows<W: std::io::Write>(
    rows: impl IntoIterator<Item = Row>,
    writer: W,
) -> Result<usize, ExportError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    let mut count = 0;
    for row in rows {
        csv_writer.serialize(&row)?;
        count += 1;
    }
    csv_writer.flush()?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::identity;
    use crate::record::{Record, CSV_HEADERS};

    fn results() -> ResultSet {
        let mut set = ResultSet::new();
        let records = [
            Record::new("example_directory", "https://x.test/1")
                .unwrap()
                .with_name(Some("Ahmed, Sons & Co".into()))
                .with_phone(Some("0100 123 4567".into()))
                .with_city(Some("giza".into())),
            Record::new("example_directory", "https://x.test/2")
                .unwrap()
                .with_name(Some("Nour".into())),
        ];
        for record in records {
            set.insert(identity(&record), record);
        }
        set
    }

    #[test]
    fn row_count_matches_result_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("technicians.csv");

        let count = write_csv(&results(), &path).unwrap();
        assert_eq!(count, 2);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
        assert_eq!(headers, CSV_HEADERS);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][2], "Ahmed, Sons & Co");
        assert_eq!(&rows[0][4], "+201001234567");
        assert_eq!(&rows[0][5], "Giza");
        assert_eq!(&rows[1][3], "Maintenance");
    }

    #[test]
    fn empty_result_set_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        assert_eq!(write_csv(&ResultSet::new(), &path).unwrap(), 0);
        assert!(!path.exists());

        let mut buf = Vec::new();
        assert_eq!(write_rows(Vec::new(), &mut buf).unwrap(), 0);
        assert!(buf.is_empty());
    }
}
