use super::DataLoadError;
use crate::series::{Series, SeriesMap, SeriesPoint};
use chrono::NaiveDate;
use csv::StringRecord;
use std::collections::BTreeMap;
use std::io::Read;
use tracing::debug;

const SERIES_COLUMN: &str = "series_id";
const DATE_COLUMN: &str = "date";
const VALUE_COLUMN: &str = "value";

/// Parsed dataset plus the number of rows that were dropped along the way.
#[derive(Debug, Default)]
pub struct ParsedDataset {
    pub series: SeriesMap,
    pub skipped_rows: usize,
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    series: usize,
    date: usize,
    value: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, DataLoadError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|header| header.trim().trim_start_matches('\u{feff}') == name)
        };

        match (find(SERIES_COLUMN), find(DATE_COLUMN), find(VALUE_COLUMN)) {
            (Some(series), Some(date), Some(value)) => Ok(Self {
                series,
                date,
                value,
            }),
            _ => Err(DataLoadError::InvalidFormat(format!(
                "header must include '{SERIES_COLUMN}', '{DATE_COLUMN}' and '{VALUE_COLUMN}' columns"
            ))),
        }
    }
}

/// Reads a delimited indicator export into ordered series.
///
/// Rows with a missing series code, an unparseable date, or a missing or non-numeric
/// value are skipped. Structural CSV errors abort the whole parse.
pub fn parse_dataset<R: Read>(reader: R) -> Result<ParsedDataset, DataLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let columns = Columns::locate(csv_reader.headers()?)?;
    let mut grouped: BTreeMap<String, Vec<SeriesPoint>> = BTreeMap::new();
    let mut skipped_rows = 0;

    for record in csv_reader.records() {
        let record = record?;
        match parse_row(&record, columns) {
            Some((code, point)) => grouped.entry(code).or_default().push(point),
            None => skipped_rows += 1,
        }
    }

    if skipped_rows > 0 {
        debug!(skipped_rows, "skipped indicator rows without usable values");
    }

    let series = grouped
        .into_iter()
        .map(|(code, points)| (code, Series::from_points(points)))
        .collect();

    Ok(ParsedDataset {
        series,
        skipped_rows,
    })
}

fn parse_row(record: &StringRecord, columns: Columns) -> Option<(String, SeriesPoint)> {
    let code = record.get(columns.series)?.trim();
    if code.is_empty() {
        return None;
    }
    let date = parse_date(record.get(columns.date)?)?;
    let value = parse_value(record.get(columns.value)?)?;
    Some((code.to_string(), SeriesPoint::new(date, value)))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed.eq_ignore_ascii_case("null") {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "series_id,name,description,category,units,update_frequency,date,value,yay_message\n";

    #[test]
    fn parses_quoted_fields_with_commas() {
        let csv = format!(
            "{HEADER}UNRATE,Unemployment Rate,\"Share of labor force, seasonally adjusted\",employment,Percent,monthly,2024-01-01,3.7,\"Jobs, jobs, jobs\"\n"
        );
        let parsed = parse_dataset(Cursor::new(csv)).expect("dataset parses");
        let series = parsed.series.get("UNRATE").expect("series present");
        assert_eq!(series.len(), 1);
        assert_eq!(series.points()[0].value, 3.7);
        assert_eq!(parsed.skipped_rows, 0);
    }

    #[test]
    fn unparseable_value_skips_only_that_row() {
        let csv = format!(
            "{HEADER}UNRATE,U,d,employment,Percent,monthly,2024-01-01,abc,m\n\
UNRATE,U,d,employment,Percent,monthly,2024-02-01,.,m\n\
UNRATE,U,d,employment,Percent,monthly,2024-03-01,null,m\n\
UNRATE,U,d,employment,Percent,monthly,2024-04-01,3.9,m\n"
        );
        let parsed = parse_dataset(Cursor::new(csv)).expect("dataset parses");
        let series = parsed.series.get("UNRATE").expect("series present");
        assert_eq!(series.len(), 1);
        assert_eq!(series.points()[0].value, 3.9);
        assert_eq!(parsed.skipped_rows, 3);
    }

    #[test]
    fn sorts_each_series_ascending() {
        let csv = "series_id,date,value\nPSAVERT,2024-03-01,4.1\nPSAVERT,2024-01-01,3.8\nDGS10,2024-02-01,4.2\nPSAVERT,2024-02-01,3.9\n";
        let parsed = parse_dataset(Cursor::new(csv)).expect("dataset parses");
        let values: Vec<f64> = parsed.series["PSAVERT"]
            .points()
            .iter()
            .map(|p| p.value)
            .collect();
        assert_eq!(values, vec![3.8, 3.9, 4.1]);
        assert_eq!(parsed.series.len(), 2);
    }

    #[test]
    fn short_rows_are_skipped() {
        let csv = format!("{HEADER}UNRATE,Unemployment Rate\nUNRATE,U,d,employment,Percent,monthly,2024-04-01,3.9,m\n");
        let parsed = parse_dataset(Cursor::new(csv)).expect("dataset parses");
        assert_eq!(parsed.series["UNRATE"].len(), 1);
        assert_eq!(parsed.skipped_rows, 1);
    }

    #[test]
    fn missing_required_columns_fail_the_load() {
        let csv = "series,when,amount\nUNRATE,2024-01-01,3.7\n";
        let error = parse_dataset(Cursor::new(csv)).expect_err("missing columns rejected");
        assert!(matches!(error, DataLoadError::InvalidFormat(_)));
    }

    #[test]
    fn accepts_timestamp_dates() {
        let csv = "series_id,date,value\nSP500,2024-05-01T00:00:00,5035.69\n";
        let parsed = parse_dataset(Cursor::new(csv)).expect("dataset parses");
        assert_eq!(
            parsed.series["SP500"].points()[0].date,
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
    }
}
