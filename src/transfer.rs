// 📂 CSV import / export
// Import runs every row through the same validate + write path as the form.

use crate::car::{Car, CarInput};
use crate::db::CarStore;
use crate::error::{CarError, CarResult};
use crate::workflow::submit_add;
use log::{info, warn};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    /// 1-based line in the source file (header is line 1)
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub rejected: Vec<RejectedRow>,
}

/// Write `id,brand,model,year,price` rows with a header.
pub fn export_csv<W: Write>(cars: &[Car], writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for car in cars {
        wtr.serialize(car)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read `brand,model,year,price` rows and add each one.
///
/// Rejected and malformed rows are collected in the report under the line
/// their record starts on. A store failure stops the import; rows before it
/// stay inserted.
pub fn import_csv(store: &CarStore, data: &str) -> CarResult<ImportReport> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());

    let mut report = ImportReport::default();

    let headers = match rdr.headers() {
        Ok(headers) => headers.clone(),
        Err(err) => {
            warn!("event=car_import module=transfer status=malformed line=1 error={}", err);
            report.rejected.push(RejectedRow {
                line: 1,
                reason: err.to_string(),
            });
            return Ok(report);
        }
    };

    for result in rdr.records() {
        let parsed = result.map_err(|err| {
            let line = err.position().map_or(0, |pos| line_at(data, pos.byte()));
            (line, err)
        });
        let parsed = parsed.and_then(|record| {
            let line = record.position().map_or(0, |pos| line_at(data, pos.byte()));
            record
                .deserialize::<CarInput>(Some(&headers))
                .map(|input| (line, input))
                .map_err(|err| (line, err))
        });

        let (line, input) = match parsed {
            Ok(row) => row,
            Err((line, err)) => {
                warn!("event=car_import module=transfer status=malformed line={} error={}", line, err);
                report.rejected.push(RejectedRow {
                    line,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        match submit_add(store, &input) {
            Ok(_) => report.inserted += 1,
            Err(CarError::Rejected(reason)) => report.rejected.push(RejectedRow {
                line,
                reason: reason.to_string(),
            }),
            Err(err) => return Err(err),
        }
    }

    info!(
        "event=car_import module=transfer status=ok inserted={} rejected={}",
        report.inserted,
        report.rejected.len()
    );
    Ok(report)
}

/// 1-based line of the first record byte at or after `byte`. The reader
/// reports a record's position before any blank lines it skipped.
fn line_at(data: &str, byte: u64) -> u64 {
    let bytes = data.as_bytes();
    let start = usize::try_from(byte).map_or(bytes.len(), |b| b.min(bytes.len()));
    let skipped = bytes[start..]
        .iter()
        .take_while(|b| **b == b'\n' || **b == b'\r')
        .count();
    bytes[..start + skipped].iter().filter(|b| **b == b'\n').count() as u64 + 1
}
