//! Returns provider backed by CSV files.

use std::{collections::BTreeMap, path::Path};

use bab_primitives::{Symbol, TimeSeries};
use bab_traits::{AcquiredUniverse, AcquisitionRequest, ProviderError, ReturnsProvider};
use bab_utils::{
    DATE_COLUMN, SYMBOL_COLUMN, UtilsError, frame_to_series, panel_to_series, read_csv,
};
use tracing::{info, warn};

/// Name of the value column in both files.
pub const RETURN_COLUMN: &str = "return";

/// Serves periodic returns loaded from disk.
///
/// Entity returns come from a long panel with `date`, `symbol` and `return`
/// columns; the benchmark from a file with `date` and `return`. Both files
/// are read once when the provider is opened.
#[derive(Debug, Clone)]
pub struct CsvReturnsProvider {
    returns: BTreeMap<Symbol, TimeSeries>,
    benchmark: TimeSeries,
}

impl CsvReturnsProvider {
    /// Load the entity panel and the benchmark series.
    ///
    /// # Errors
    /// Returns [`ProviderError::Source`] if either file cannot be read or
    /// lacks the expected columns.
    pub fn open(
        returns_path: impl AsRef<Path>,
        benchmark_path: impl AsRef<Path>,
    ) -> Result<Self, ProviderError> {
        let source = |e: UtilsError| ProviderError::Source(e.to_string());

        let panel = read_csv(returns_path).map_err(source)?;
        let returns =
            panel_to_series(&panel, DATE_COLUMN, SYMBOL_COLUMN, RETURN_COLUMN).map_err(source)?;

        let frame = read_csv(benchmark_path).map_err(source)?;
        let benchmark = frame_to_series(&frame, DATE_COLUMN, RETURN_COLUMN).map_err(source)?;

        info!(entities = returns.len(), benchmark = benchmark.len(), "loaded csv returns");
        Ok(Self { returns, benchmark })
    }

    /// Symbols present in the panel.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.returns.keys()
    }

    fn assemble(&self, request: &AcquisitionRequest) -> Result<AcquiredUniverse, ProviderError> {
        request.validate()?;

        let benchmark = self.benchmark.between(request.start, request.end);
        if benchmark.count_defined() == 0 {
            return Err(ProviderError::Benchmark {
                symbol: request.benchmark.clone(),
                reason: "no returns in range".to_string(),
            });
        }

        let mut universe = AcquiredUniverse { benchmark, ..AcquiredUniverse::default() };
        for symbol in &request.symbols {
            let returns = self.returns.get(symbol).map(|s| s.between(request.start, request.end));
            match returns {
                Some(returns) if returns.count_defined() > 0 => {
                    universe.returns.insert(symbol.clone(), returns);
                    universe.resolved.push(symbol.clone());
                }
                Some(_) => {
                    warn!(%symbol, "no returns in range");
                    universe.failed.push((symbol.clone(), "no returns in range".to_string()));
                }
                None => {
                    warn!(%symbol, "symbol not in file");
                    universe.failed.push((symbol.clone(), "symbol not in file".to_string()));
                }
            }
        }

        info!(
            requested = request.symbols.len(),
            resolved = universe.resolved.len(),
            failed = universe.failed.len(),
            "acquired universe"
        );
        universe.ensure_nonempty()
    }
}

impl ReturnsProvider for CsvReturnsProvider {
    async fn fetch(&self, request: &AcquisitionRequest) -> Result<AcquiredUniverse, ProviderError> {
        self.assemble(request)
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use bab_primitives::Date;
    use tempfile::TempDir;

    use super::*;

    const PANEL: &str = "date,symbol,return
2023-12-31,AAA,0.5
2024-01-31,AAA,0.01
2024-02-29,AAA,
2024-03-31,AAA,0.03
2024-01-31,BBB,-0.02
2024-02-29,BBB,0.04
2023-12-31,OLD,0.02
";

    const BENCHMARK: &str = "date,return
2024-01-31,0.01
2024-02-29,0.02
2024-03-31,-0.01
";

    fn files(panel: &str, benchmark: &str) -> (TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let returns = dir.path().join("returns.csv");
        let bench = dir.path().join("benchmark.csv");
        fs::write(&returns, panel).unwrap();
        fs::write(&bench, benchmark).unwrap();
        (dir, returns, bench)
    }

    fn request(symbols: &[&str]) -> AcquisitionRequest {
        AcquisitionRequest {
            start: Date::from_ymd_opt(2024, 1, 1).unwrap(),
            end: Date::from_ymd_opt(2024, 12, 31).unwrap(),
            symbols: symbols.iter().map(|&s| Symbol::from(s)).collect(),
            benchmark: Symbol::from("^GSPC"),
        }
    }

    #[test]
    fn loads_panel_and_benchmark() {
        let (_dir, returns, bench) = files(PANEL, BENCHMARK);
        let provider = CsvReturnsProvider::open(returns, bench).unwrap();

        let symbols: Vec<&str> = provider.symbols().map(Symbol::as_str).collect();
        assert_eq!(symbols, vec!["AAA", "BBB", "OLD"]);

        let universe = provider.assemble(&request(&["AAA", "BBB"])).unwrap();
        assert_eq!(universe.benchmark.count_defined(), 3);
        let aaa = &universe.returns[&Symbol::from("AAA")];
        assert_eq!(aaa.len(), 3);
        assert_eq!(aaa.count_defined(), 2);
        assert_eq!(aaa.get(Date::from_ymd_opt(2024, 3, 31).unwrap()), Some(0.03));
        assert!(universe.failed.is_empty());
    }

    #[test]
    fn unknown_and_out_of_range_symbols_fail_individually() {
        let (_dir, returns, bench) = files(PANEL, BENCHMARK);
        let provider = CsvReturnsProvider::open(returns, bench).unwrap();

        let universe = provider.assemble(&request(&["AAA", "OLD", "ZZZ"])).unwrap();
        assert_eq!(universe.resolved, vec![Symbol::from("AAA")]);
        let failed: Vec<&str> = universe.failed.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(failed, vec!["OLD", "ZZZ"]);
    }

    #[test]
    fn nothing_resolved_is_fatal() {
        let (_dir, returns, bench) = files(PANEL, BENCHMARK);
        let provider = CsvReturnsProvider::open(returns, bench).unwrap();
        assert!(matches!(
            provider.assemble(&request(&["ZZZ"])),
            Err(ProviderError::NoEntities { requested: 1 })
        ));
    }

    #[test]
    fn empty_benchmark_window_is_fatal() {
        let (_dir, returns, bench) = files(PANEL, "date,return\n2020-01-31,0.01\n");
        let provider = CsvReturnsProvider::open(returns, bench).unwrap();
        assert!(matches!(
            provider.assemble(&request(&["AAA"])),
            Err(ProviderError::Benchmark { .. })
        ));
    }

    #[test]
    fn missing_column_is_a_source_error() {
        let (_dir, returns, bench) = files("date,ticker,return\n2024-01-31,AAA,0.01\n", BENCHMARK);
        assert!(matches!(
            CsvReturnsProvider::open(returns, bench),
            Err(ProviderError::Source(_))
        ));
    }
}
