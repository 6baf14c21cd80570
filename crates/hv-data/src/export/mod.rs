//! Query result to CSV export
//!
//! Takes the first series of the first result of a time-series query and
//! renders it for spreadsheet import: the timestamp column is renamed `date`
//! and reformatted as `M/D/YYYY h:mm:ss A`, every other cell is written as-is.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{CsvConfig, CsvQuoting, CsvTimeZone};
use crate::DataError;

/// Rendered instead of a date when a timestamp cannot be read
pub const INVALID_DATE: &str = "Invalid date";

/// Spreadsheet-friendly 12-hour format, no zero padding on month, day, hour
const DATE_FORMAT: &str = "%-m/%-d/%Y %-I:%M:%S %p";

static MISSING_TIMESTAMP: Value = Value::Null;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// One statement result of a time-series query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub series: Option<Vec<Series>>,
}

/// A named table whose first column is the timestamp
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    #[serde(default)]
    pub values: Option<Vec<Vec<Value>>>,
}

/// CSV text ready for download
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvExport {
    pub name: String,
    #[serde(rename = "CSVString")]
    pub csv_string: String,
}

/// Serialize the first series of the first result.
///
/// Fails with [`DataError::MalformedResult`] when there is no such series or
/// it lacks `columns` or `values`. Unreadable timestamps do not fail the
/// export; they render as [`INVALID_DATE`].
pub fn results_to_csv(results: &[QueryResult], config: &CsvConfig) -> Result<CsvExport, DataError> {
    let series = results
        .first()
        .ok_or_else(|| DataError::MalformedResult("query returned no results".to_string()))?
        .series
        .as_ref()
        .and_then(|series| series.first())
        .ok_or_else(|| DataError::MalformedResult("first result has no series".to_string()))?;

    let columns = series
        .columns
        .as_ref()
        .ok_or_else(|| DataError::MalformedResult("series has no columns".to_string()))?;
    let values = series
        .values
        .as_ref()
        .ok_or_else(|| DataError::MalformedResult("series has no values".to_string()))?;

    let header: Vec<String> = std::iter::once("date".to_string())
        .chain(columns.iter().skip(1).cloned())
        .collect();

    let mut invalid_dates = 0usize;
    let rows: Vec<Vec<String>> = values
        .iter()
        .map(|row| {
            let (timestamp, measurements) = row.split_first().unwrap_or((&MISSING_TIMESTAMP, &[][..]));

            let date = format_date(timestamp, config.time_zone).unwrap_or_else(|| {
                invalid_dates += 1;
                INVALID_DATE.to_string()
            });

            std::iter::once(date)
                .chain(measurements.iter().map(format_cell))
                .collect()
        })
        .collect();

    if invalid_dates > 0 {
        tracing::warn!(invalid_dates, "some timestamps could not be parsed");
    }

    let csv_string = match config.quoting {
        CsvQuoting::Never => std::iter::once(&header)
            .chain(rows.iter())
            .map(|record| record.join(","))
            .collect::<Vec<_>>()
            .join("\n"),
        CsvQuoting::Necessary => write_quoted(&header, &rows)?,
    };

    let name = series.name.clone().unwrap_or_default();
    tracing::debug!(name = %name, rows = rows.len(), "serialized query result to CSV");

    Ok(CsvExport { name, csv_string })
}

fn write_quoted(header: &[String], rows: &[Vec<String>]) -> Result<String, DataError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DataError::Csv(e.to_string()))?;
    let mut text = String::from_utf8(bytes).map_err(|e| DataError::Csv(e.to_string()))?;

    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// Format a timestamp cell, or `None` when it is not a readable time.
///
/// Numbers are epoch milliseconds. Strings are tried as RFC 3339, then as a
/// naive date-time in `zone`, then as epoch milliseconds.
pub fn format_date(timestamp: &Value, zone: CsvTimeZone) -> Option<String> {
    let instant = match timestamp {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .and_then(from_millis)?,
        Value::String(s) => parse_timestamp_str(s, zone)?,
        _ => return None,
    };

    Some(render_in_zone(instant, zone))
}

fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}

fn parse_timestamp_str(s: &str, zone: CsvTimeZone) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return naive_to_utc(&naive, zone);
        }
    }

    s.parse::<i64>().ok().and_then(from_millis)
}

fn fixed_offset(minutes: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(minutes * 60)
}

fn naive_to_utc(naive: &NaiveDateTime, zone: CsvTimeZone) -> Option<DateTime<Utc>> {
    match zone {
        CsvTimeZone::Utc => Some(Utc.from_utc_datetime(naive)),
        CsvTimeZone::Local => Local
            .from_local_datetime(naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc)),
        CsvTimeZone::FixedOffsetMinutes(minutes) => fixed_offset(minutes)?
            .from_local_datetime(naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

fn render_in_zone(instant: DateTime<Utc>, zone: CsvTimeZone) -> String {
    match zone {
        CsvTimeZone::Utc => instant.format(DATE_FORMAT).to_string(),
        CsvTimeZone::Local => instant.with_timezone(&Local).format(DATE_FORMAT).to_string(),
        CsvTimeZone::FixedOffsetMinutes(minutes) => match fixed_offset(minutes) {
            Some(offset) => instant.with_timezone(&offset).format(DATE_FORMAT).to_string(),
            None => instant.format(DATE_FORMAT).to_string(),
        },
    }
}

/// Render a measurement the way a plain comma join would: nulls empty,
/// integral numbers without a fraction, nested arrays comma-joined
pub fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => format_number(n),
        Value::Array(items) => items.iter().map(format_cell).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

fn format_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }

    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(series: Value) -> Vec<QueryResult> {
        serde_json::from_value(json!([{ "series": [series] }])).unwrap()
    }

    #[test]
    fn test_epoch_rows() {
        let results = result(json!({
            "name": "cpu",
            "columns": ["time", "value"],
            "values": [[0, "5"], [1000, "7"]]
        }));

        let export = results_to_csv(&results, &CsvConfig::utc()).unwrap();
        assert_eq!(export.name, "cpu");
        assert_eq!(
            export.csv_string,
            "date,value\n1/1/1970 12:00:00 AM,5\n1/1/1970 12:00:01 AM,7"
        );
    }

    #[test]
    fn test_header_drops_first_column_name() {
        let results = result(json!({
            "name": "mem",
            "columns": ["timestamp", "used", "free"],
            "values": []
        }));

        let export = results_to_csv(&results, &CsvConfig::utc()).unwrap();
        assert_eq!(export.csv_string, "date,used,free");
    }

    #[test]
    fn test_iso_timestamps_and_afternoon() {
        let results = result(json!({
            "name": "load",
            "columns": ["time", "load1", "host"],
            "values": [
                ["2017-03-09T15:04:05Z", 1.5, "web-01"],
                ["2017-12-25T09:00:00.250Z", 2, null]
            ]
        }));

        let export = results_to_csv(&results, &CsvConfig::utc()).unwrap();
        assert_eq!(
            export.csv_string,
            "date,load1,host\n3/9/2017 3:04:05 PM,1.5,web-01\n12/25/2017 9:00:00 AM,2,"
        );
    }

    #[test]
    fn test_fixed_offset_zone() {
        let results = result(json!({
            "columns": ["time", "v"],
            "values": [[0, 1]]
        }));
        let config = CsvConfig {
            time_zone: CsvTimeZone::FixedOffsetMinutes(-5 * 60),
            quoting: CsvQuoting::Never,
        };

        let export = results_to_csv(&results, &config).unwrap();
        assert_eq!(export.name, "");
        assert_eq!(export.csv_string, "date,v\n12/31/1969 7:00:00 PM,1");
    }

    #[test]
    fn test_unparseable_timestamp_degrades() {
        let results = result(json!({
            "name": "x",
            "columns": ["time", "v"],
            "values": [["yesterday", 3], [true, 4]]
        }));

        let export = results_to_csv(&results, &CsvConfig::utc()).unwrap();
        assert_eq!(export.csv_string, "date,v\nInvalid date,3\nInvalid date,4");
    }

    #[test]
    fn test_values_are_not_escaped_by_default() {
        let results = result(json!({
            "name": "logs",
            "columns": ["time", "message"],
            "values": [[0, "a,b \"c\""]]
        }));

        let export = results_to_csv(&results, &CsvConfig::utc()).unwrap();
        assert_eq!(export.csv_string, "date,message\n1/1/1970 12:00:00 AM,a,b \"c\"");
    }

    #[test]
    fn test_necessary_quoting() {
        let results = result(json!({
            "name": "logs",
            "columns": ["time", "message", "n"],
            "values": [[0, "a,b \"c\"", 1]]
        }));
        let config = CsvConfig {
            time_zone: CsvTimeZone::Utc,
            quoting: CsvQuoting::Necessary,
        };

        let export = results_to_csv(&results, &config).unwrap();
        assert_eq!(
            export.csv_string,
            "date,message,n\n1/1/1970 12:00:00 AM,\"a,b \"\"c\"\"\",1"
        );
    }

    #[test]
    fn test_missing_parts_are_malformed() {
        let config = CsvConfig::utc();

        assert!(matches!(results_to_csv(&[], &config), Err(DataError::MalformedResult(_))));

        let no_series: Vec<QueryResult> = serde_json::from_value(json!([{}])).unwrap();
        assert!(matches!(results_to_csv(&no_series, &config), Err(DataError::MalformedResult(_))));

        let no_columns = result(json!({"name": "a", "values": [[0, 1]]}));
        assert!(matches!(results_to_csv(&no_columns, &config), Err(DataError::MalformedResult(_))));

        let no_values = result(json!({"name": "a", "columns": ["time"]}));
        assert!(matches!(results_to_csv(&no_values, &config), Err(DataError::MalformedResult(_))));
    }

    #[test]
    fn test_cell_formatting() {
        assert_eq!(format_cell(&json!(null)), "");
        assert_eq!(format_cell(&json!(3.0)), "3");
        assert_eq!(format_cell(&json!(-0.0)), "0");
        assert_eq!(format_cell(&json!(0.25)), "0.25");
        assert_eq!(format_cell(&json!(false)), "false");
        assert_eq!(format_cell(&json!([1, "a"])), "1,a");
    }

    #[test]
    fn test_format_date_forms() {
        let zone = CsvTimeZone::Utc;
        assert_eq!(format_date(&json!(1_500_000_000_000i64), zone).as_deref(), Some("7/14/2017 2:40:00 AM"));
        assert_eq!(format_date(&json!("1500000000000"), zone).as_deref(), Some("7/14/2017 2:40:00 AM"));
        assert_eq!(format_date(&json!("2017-07-14 02:40:00"), zone).as_deref(), Some("7/14/2017 2:40:00 AM"));
        assert_eq!(format_date(&json!(null), zone), None);
    }
}
