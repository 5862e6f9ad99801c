//! CSV export for daily history and per-tick telemetry.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::sim::history::{DailyRecord, HISTORY_SCHEMA_VERSION, HistorySnapshot};
use crate::sim::types::StepResult;

/// Schema v1 column header for the daily history export.
pub const HISTORY_HEADER: &str = "date,condition,peak_temp_c,yield_wh";

/// Column header for the per-tick telemetry export.
pub const TELEMETRY_HEADER: &str = "timestamp,is_daylight,sun_angle_deg,irradiance_wm2,\
                                    ambient_temp_c,wax_temp_c,panel_angle_deg,\
                                    angular_error_deg,power_w,energy_today_wh,\
                                    sensor_angle_deg,health";

/// Exports daily history to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_history_csv(records: &[DailyRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_history_csv(records, io::BufWriter::new(file))
}

/// Writes daily history as CSV to any writer.
///
/// One row per archived day, in chronological order. Produces deterministic
/// output for identical inputs. Values are written unrounded so
/// [`read_history_csv`] returns them exactly.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_history_csv(records: &[DailyRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(HISTORY_HEADER.split(','))?;

    for r in records {
        wtr.write_record(&[
            r.date.format("%Y-%m-%d").to_string(),
            r.condition.label().to_string(),
            r.peak_temp_c.to_string(),
            r.yield_wh.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Reads a history CSV written by [`write_history_csv`].
///
/// The result still has to go through
/// [`HistoryStore::restore`](crate::sim::history::HistoryStore::restore),
/// which checks ordering.
///
/// # Errors
///
/// Returns an `io::Error` of kind `InvalidData` if the header is not the
/// schema v1 header or a row does not parse.
pub fn read_history_csv(reader: impl Read) -> io::Result<HistorySnapshot> {
    let mut rdr = csv::ReaderBuilder::new().from_reader(reader);

    let headers = rdr.headers()?;
    if headers.iter().ne(HISTORY_HEADER.split(',')) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "history header {:?} does not match schema v{HISTORY_SCHEMA_VERSION}",
                headers.iter().collect::<Vec<_>>().join(",")
            ),
        ));
    }

    let records = rdr
        .deserialize::<DailyRecord>()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HistorySnapshot {
        schema_version: HISTORY_SCHEMA_VERSION,
        records,
    })
}

/// Exports per-tick telemetry to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_telemetry_csv(results: &[StepResult], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_telemetry_csv(results, io::BufWriter::new(file))
}

/// Writes per-tick telemetry as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_telemetry_csv(results: &[StepResult], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(TELEMETRY_HEADER.split(',').map(str::trim))?;

    for s in results {
        let r = &s.reading;
        wtr.write_record(&[
            r.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
            r.is_daylight.to_string(),
            format!("{:.2}", r.sun_angle_deg),
            format!("{:.2}", r.irradiance_wm2),
            format!("{:.2}", r.ambient_temp_c),
            format!("{:.2}", r.wax_temp_c),
            format!("{:.2}", r.panel_angle_deg),
            format!("{:.2}", r.angular_error_deg),
            format!("{:.3}", r.power_w),
            format!("{:.3}", s.energy_today_wh),
            format!("{:.2}", s.health.sensor_angle_deg),
            s.health.status.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
