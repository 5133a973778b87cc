//! CSV persistence of frames.

use std::{fs::File, path::Path};

use polars::prelude::*;

use crate::UtilsError;

/// Write `df` as CSV with a header row.
///
/// # Errors
/// Returns an error if the file cannot be created or polars fails to write.
pub fn write_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<(), UtilsError> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

/// Read a CSV file with a header row, parsing ISO dates.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_csv(path: impl AsRef<Path>) -> Result<DataFrame, UtilsError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .map_parse_options(|options| options.with_try_parse_dates(true))
        .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
        .finish()?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use bab_primitives::{Date, Symbol, TimeSeries};

    use super::*;
    use crate::{panel_to_series, series_to_panel};

    #[test]
    fn csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.csv");

        let d1 = Date::from_ymd_opt(2024, 1, 31).unwrap();
        let d2 = Date::from_ymd_opt(2024, 2, 29).unwrap();
        let series = BTreeMap::from([
            (Symbol::from("A"), TimeSeries::from_pairs([(d1, Some(0.5)), (d2, None)]).unwrap()),
            (Symbol::from("B"), TimeSeries::from_pairs([(d2, Some(-0.25))]).unwrap()),
        ]);

        let mut panel = series_to_panel(&series, "ret").unwrap();
        write_csv(&mut panel, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("date,symbol,ret"));
        assert!(text.contains("2024-02-29,B,-0.25"));

        let restored = read_csv(&path).unwrap();
        assert_eq!(panel_to_series(&restored, "date", "symbol", "ret").unwrap(), series);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_csv(dir.path().join("absent.csv")).is_err());
    }
}
