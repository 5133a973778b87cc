//! Long-format panel conversion.

use std::collections::BTreeMap;

use bab_primitives::{Date, Symbol, TimeSeries};
use chrono::Datelike;
use polars::prelude::*;

use crate::UtilsError;

/// Default name of the date column.
pub const DATE_COLUMN: &str = "date";

/// Default name of the symbol column.
pub const SYMBOL_COLUMN: &str = "symbol";

/// Days from 0001-01-01 to 1970-01-01; polars stores dates relative to the latter.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Split a long panel into one series per symbol.
///
/// The date column may be a date or datetime; values are cast to `f64` and
/// nulls become undefined entries.
///
/// # Errors
/// Returns an error if a column is missing, a date or symbol is null, or a
/// symbol has the same date twice.
pub fn panel_to_series(
    df: &DataFrame,
    date_col: &str,
    symbol_col: &str,
    value_col: &str,
) -> Result<BTreeMap<Symbol, TimeSeries>, UtilsError> {
    let dates = dates(df, date_col)?;
    let symbols = column(df, symbol_col)?.str()?;
    let values = column(df, value_col)?.cast(&DataType::Float64)?;
    let values = values.f64()?;

    let mut grouped: BTreeMap<Symbol, Vec<(Date, Option<f64>)>> = BTreeMap::new();
    for (row, ((date, symbol), value)) in dates.into_iter().zip(symbols).zip(values).enumerate() {
        let date = date.ok_or_else(|| null_key(date_col, row))?;
        let symbol = symbol.ok_or_else(|| null_key(symbol_col, row))?;
        grouped.entry(Symbol::from(symbol)).or_default().push((date, value));
    }

    grouped
        .into_iter()
        .map(|(symbol, pairs)| Ok((symbol, TimeSeries::from_pairs(pairs)?)))
        .collect()
}

/// Read one series from a frame with a date column and a value column.
///
/// # Errors
/// Returns an error if a column is missing, a date is null, or a date repeats.
pub fn frame_to_series(
    df: &DataFrame,
    date_col: &str,
    value_col: &str,
) -> Result<TimeSeries, UtilsError> {
    let dates = dates(df, date_col)?;
    let values = column(df, value_col)?.cast(&DataType::Float64)?;
    let values = values.f64()?;

    let pairs = dates
        .into_iter()
        .zip(values)
        .enumerate()
        .map(|(row, (date, value))| Ok((date.ok_or_else(|| null_key(date_col, row))?, value)))
        .collect::<Result<Vec<_>, UtilsError>>()?;
    Ok(TimeSeries::from_pairs(pairs)?)
}

/// Stack per-symbol series into a long panel sorted by symbol, then date.
///
/// # Errors
/// Returns an error if polars fails to build the frame.
pub fn series_to_panel(
    series: &BTreeMap<Symbol, TimeSeries>,
    value_col: &str,
) -> Result<DataFrame, UtilsError> {
    let rows = series.values().map(TimeSeries::len).sum();
    let mut dates = Vec::with_capacity(rows);
    let mut symbols = Vec::with_capacity(rows);
    let mut values = Vec::with_capacity(rows);

    for (symbol, s) in series {
        for (date, value) in s.iter() {
            dates.push(date);
            symbols.push(symbol.as_str());
            values.push(value);
        }
    }

    Ok(DataFrame::new(vec![
        date_column(DATE_COLUMN, &dates)?,
        Column::new(SYMBOL_COLUMN.into(), symbols),
        Column::new(value_col.into(), values),
    ])?)
}

/// One series as a two-column frame: `date` and `value_col`.
///
/// # Errors
/// Returns an error if polars fails to build the frame.
pub fn series_to_frame(series: &TimeSeries, value_col: &str) -> Result<DataFrame, UtilsError> {
    let (dates, values): (Vec<Date>, Vec<Option<f64>>) = series.iter().unzip();
    Ok(DataFrame::new(vec![
        date_column(DATE_COLUMN, &dates)?,
        Column::new(value_col.into(), values),
    ])?)
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, UtilsError> {
    df.column(name).map_err(|_| UtilsError::MissingColumn(name.to_string()))
}

fn null_key(column: &str, row: usize) -> UtilsError {
    UtilsError::NullKey { column: column.to_string(), row }
}

fn dates(df: &DataFrame, name: &str) -> Result<Vec<Option<Date>>, UtilsError> {
    let days = column(df, name)?.cast(&DataType::Date)?.cast(&DataType::Int32)?;
    days.i32()?.into_iter().map(|d| d.map(from_epoch_days).transpose()).collect()
}

fn date_column(name: &str, dates: &[Date]) -> Result<Column, UtilsError> {
    let days: Vec<i32> =
        dates.iter().map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE).collect();
    Ok(Series::new(name.into(), days).cast(&DataType::Date)?.into())
}

fn from_epoch_days(days: i32) -> Result<Date, UtilsError> {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(Date::from_num_days_from_ce_opt)
        .ok_or(UtilsError::DateOutOfRange(days))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_panel() -> DataFrame {
        let dates = [
            date(2024, 1, 31),
            date(2024, 2, 29),
            date(2024, 1, 31),
            date(2024, 2, 29),
            date(2024, 3, 31),
        ];
        DataFrame::new(vec![
            date_column("date", &dates).unwrap(),
            Column::new("symbol".into(), ["B", "B", "A", "A", "A"]),
            Column::new("ret".into(), [Some(0.01), None, Some(-0.02), Some(0.03), Some(0.0)]),
        ])
        .unwrap()
    }

    #[test]
    fn epoch_conversion() {
        assert_eq!(from_epoch_days(0).unwrap(), date(1970, 1, 1));
        assert_eq!(from_epoch_days(19_723).unwrap(), date(2024, 1, 1));
        assert!(matches!(from_epoch_days(i32::MAX), Err(UtilsError::DateOutOfRange(_))));
    }

    #[test]
    fn panel_groups_by_symbol() {
        let series = panel_to_series(&sample_panel(), "date", "symbol", "ret").unwrap();

        assert_eq!(series.len(), 2);
        let a = &series["A"];
        assert_eq!(a.len(), 3);
        assert_eq!(a.get(date(2024, 2, 29)), Some(0.03));
        let b = &series["B"];
        assert_eq!(b.len(), 2);
        assert!(b.contains_date(date(2024, 2, 29)));
        assert_eq!(b.get(date(2024, 2, 29)), None);
    }

    #[rstest]
    #[case("when", "symbol", "ret")]
    #[case("date", "ticker", "ret")]
    #[case("date", "symbol", "value")]
    fn missing_columns_are_named(#[case] d: &str, #[case] s: &str, #[case] v: &str) {
        let err = panel_to_series(&sample_panel(), d, s, v).unwrap_err();
        assert!(matches!(err, UtilsError::MissingColumn(_)));
    }

    #[test]
    fn duplicate_dates_rejected() {
        let dates = [date(2024, 1, 31), date(2024, 1, 31)];
        let df = DataFrame::new(vec![
            date_column("date", &dates).unwrap(),
            Column::new("symbol".into(), ["A", "A"]),
            Column::new("ret".into(), [0.01, 0.02]),
        ])
        .unwrap();
        assert!(matches!(
            panel_to_series(&df, "date", "symbol", "ret"),
            Err(UtilsError::Primitives(_))
        ));
    }

    #[test]
    fn null_symbol_rejected() {
        let dates = [date(2024, 1, 31), date(2024, 2, 29)];
        let df = DataFrame::new(vec![
            date_column("date", &dates).unwrap(),
            Column::new("symbol".into(), [Some("A"), None]),
            Column::new("ret".into(), [0.01, 0.02]),
        ])
        .unwrap();
        let err = panel_to_series(&df, "date", "symbol", "ret").unwrap_err();
        assert!(matches!(err, UtilsError::NullKey { row: 1, .. }));
    }

    #[test]
    fn panel_round_trip_preserves_undefined() {
        let series = panel_to_series(&sample_panel(), "date", "symbol", "ret").unwrap();
        let panel = series_to_panel(&series, "ret").unwrap();

        assert_eq!(panel.height(), 5);
        assert_eq!(panel.column("ret").unwrap().null_count(), 1);
        assert_eq!(panel_to_series(&panel, DATE_COLUMN, SYMBOL_COLUMN, "ret").unwrap(), series);
    }

    #[test]
    fn single_series_frame() {
        let series =
            TimeSeries::from_pairs([(date(2024, 1, 31), Some(1.0)), (date(2024, 2, 29), None)])
                .unwrap();
        let frame = series_to_frame(&series, "wealth").unwrap();

        assert_eq!(frame.get_column_names_str(), vec!["date", "wealth"]);
        assert_eq!(frame_to_series(&frame, "date", "wealth").unwrap(), series);
    }
}
