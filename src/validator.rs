use std::collections::HashSet;
use std::path::Path;

use log::info;

use crate::error::ValidateError;
use crate::record::CSV_HEADERS;

const HEAD_ROWS: usize = 5;

#[derive(Debug, Clone)]
pub struct CsvSummary {
    pub headers: Vec<String>,
    pub head: Vec<Vec<String>>,
    pub rows: usize,
    pub unique_phones: usize,
}

pub fn validate_csv<P: AsRef<Path>>(path: P) -> Result<CsvSummary, ValidateError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path.as_ref())?;

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let missing: Vec<String> = CSV_HEADERS
        .iter()
        .filter(|col| !headers.iter().any(|h| h.as_str() == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidateError::MissingColumns(missing));
    }

    let phone_idx = headers.iter().position(|h| h == "phone");
    let mut head = Vec::new();
    let mut rows = 0;
    let mut phones = HashSet::new();
    for result in reader.records() {
        let record = result?;
        if head.len() < HEAD_ROWS {
            head.push(record.iter().map(str::to_string).collect());
        }
        if let Some(phone) = phone_idx.and_then(|i| record.get(i)).filter(|p| !p.is_empty()) {
            phones.insert(phone.to_string());
        }
        rows += 1;
    }

    info!("Validated {:?}: {} rows", path.as_ref(), rows);
    Ok(CsvSummary {
        headers,
        head,
        rows,
        unique_phones: phones.len(),
    })
}
