//! Console and CSV report sink.

use std::{
    collections::BTreeMap,
    fmt, fs,
    io::{self, Write as _},
    path::PathBuf,
};

use bab_primitives::{PerformanceReport, RegressionSummary, RunSummary, Symbol};
use bab_traits::{ReportContext, ReportError, ReportSink};
use bab_utils::{UtilsError, series_to_frame, series_to_panel, write_csv};
use tracing::info;

const RULE: &str =
    "================================================================================";
const THIN_RULE: &str =
    "--------------------------------------------------------------------------------";

/// Prints the performance report and run summary to stdout.
///
/// With a CSV directory set, also writes `strategy_returns.csv` and
/// `wealth.csv` (strategy and benchmark curves in long format).
#[derive(Debug, Clone, Default)]
pub struct ConsoleReport {
    csv_dir: Option<PathBuf>,
}

impl ConsoleReport {
    /// Console-only report.
    #[must_use]
    pub const fn new() -> Self {
        Self { csv_dir: None }
    }

    /// Also export series as CSV into `dir`.
    #[must_use]
    pub fn with_csv_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.csv_dir = Some(dir.into());
        self
    }

    /// Render the report as text.
    #[must_use]
    pub fn format(&self, context: &ReportContext<'_>) -> String {
        Rendered(context).to_string()
    }

    fn export_csv(&self, context: &ReportContext<'_>) -> Result<(), ReportError> {
        let Some(dir) = &self.csv_dir else {
            return Ok(());
        };
        fs::create_dir_all(dir)?;

        let render = |e: UtilsError| ReportError::Render(e.to_string());

        let mut returns = series_to_frame(context.strategy, "strategy_return").map_err(render)?;
        write_csv(&mut returns, dir.join("strategy_returns.csv")).map_err(render)?;

        let curves = BTreeMap::from([
            (Symbol::from("benchmark"), context.benchmark_wealth.clone()),
            (Symbol::from("strategy"), context.strategy_wealth.clone()),
        ]);
        let mut wealth = series_to_panel(&curves, "wealth").map_err(render)?;
        write_csv(&mut wealth, dir.join("wealth.csv")).map_err(render)?;

        info!(dir = %dir.display(), "exported csv");
        Ok(())
    }
}

impl ReportSink for ConsoleReport {
    fn render(&self, context: &ReportContext<'_>) -> Result<(), ReportError> {
        write!(io::stdout().lock(), "{}", Rendered(context))?;
        self.export_csv(context)
    }
}

struct Rendered<'a>(&'a ReportContext<'a>);

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_report(f, self.0)
    }
}

fn write_report(out: &mut fmt::Formatter<'_>, context: &ReportContext<'_>) -> fmt::Result {
    writeln!(out, "\n{RULE}")?;
    writeln!(out, "BETTING AGAINST BETA")?;
    writeln!(out, "{RULE}")?;

    match context.report {
        Some(report) => write_performance(out, report)?,
        None => writeln!(out, "No strategy returns: performance report unavailable.")?,
    }

    write_summary(out, context.summary)?;
    writeln!(out, "{RULE}")
}

fn write_performance(out: &mut dyn fmt::Write, report: &PerformanceReport) -> fmt::Result {
    writeln!(
        out,
        "Period: {} to {} ({} periods, {} per year)",
        report.start, report.end, report.observations, report.periods_per_year
    )?;
    writeln!(out, "{THIN_RULE}")?;
    writeln!(out, "{:<28} {:>12}", "Cumulative Return", pct(Some(report.cumulative_return)))?;
    writeln!(out, "{:<28} {:>12}", "Annualized Return", pct(Some(report.annualized_return)))?;
    writeln!(out, "{:<28} {:>12}", "Annualized Volatility", pct(report.annualized_volatility))?;
    writeln!(out, "{:<28} {:>12}", "Sharpe Ratio", num(report.sharpe_ratio))?;
    writeln!(out, "{:<28} {:>12}", "Max Drawdown", pct(Some(report.max_drawdown)))?;

    match &report.regression {
        Some(regression) => write_regression(out, regression),
        None => writeln!(out, "\nRegression omitted: too few aligned benchmark observations."),
    }
}

fn write_regression(out: &mut dyn fmt::Write, r: &RegressionSummary) -> fmt::Result {
    writeln!(
        out,
        "\nCAPM REGRESSION (Newey-West, {} lags, {} observations)",
        r.lags, r.observations
    )?;
    writeln!(out, "{:<12} {:>12} {:>12} {:>10} {:>10}", "", "Estimate", "Std Err", "t", "p")?;
    writeln!(out, "{:-<12} {:-^12} {:-^12} {:-^10} {:-^10}", "", "", "", "", "")?;
    writeln!(
        out,
        "{:<12} {:>12.5} {:>12.5} {:>10} {:>10}",
        "Alpha",
        r.alpha,
        r.alpha_std_error,
        num(r.alpha_t_stat),
        num(r.alpha_p_value)
    )?;
    writeln!(
        out,
        "{:<12} {:>12.5} {:>12.5} {:>10} {:>10}",
        "Beta",
        r.beta,
        r.beta_std_error,
        num(r.beta_t_stat),
        num(r.beta_p_value)
    )?;
    writeln!(out, "Annualized Alpha: {}", pct(Some(r.annualized_alpha)))?;
    writeln!(out, "R-squared: {:.4}", r.r_squared)
}

fn write_summary(out: &mut dyn fmt::Write, s: &RunSummary) -> fmt::Result {
    writeln!(out, "\nRUN SUMMARY")?;
    writeln!(out, "{THIN_RULE}")?;
    writeln!(out, "{:<28} {:>8} {:>8}", "", "used", "skipped")?;
    writeln!(
        out,
        "{:<28} {:>8} {:>8}",
        "Entities",
        s.entities_with_beta,
        s.entities_failed + s.entities_capped + s.entities_without_beta()
    )?;
    writeln!(out, "{:<28} {:>8} {:>8}", "Rebalancing dates", s.dates_ranked, s.dates_skipped)?;
    writeln!(
        out,
        "{:<28} {:>8} {:>8}",
        "Holding periods", s.periods_aggregated, s.periods_undefined
    )?;
    writeln!(
        out,
        "Requested {} | resolved {} | failed {} | capped {} | missing observations {}",
        s.entities_requested,
        s.entities_resolved,
        s.entities_failed,
        s.entities_capped,
        s.missing_observations
    )
}

fn pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:+.2}%", v * 100.0))
}

fn num(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.3}"))
}

#[cfg(test)]
mod tests {
    use bab_primitives::{Date, TimeSeries};

    use super::*;

    fn date(m: u32) -> Date {
        Date::from_ymd_opt(2024, m, 28).unwrap()
    }

    fn report(regression: Option<RegressionSummary>) -> PerformanceReport {
        PerformanceReport {
            start: date(1),
            end: date(3),
            observations: 3,
            periods_per_year: 12,
            cumulative_return: -0.076,
            annualized_return: -0.2,
            annualized_volatility: Some(0.5),
            sharpe_ratio: None,
            max_drawdown: 0.2,
            regression,
        }
    }

    fn series() -> TimeSeries {
        TimeSeries::from_pairs([(date(1), Some(0.1)), (date(2), Some(-0.2)), (date(3), None)])
            .unwrap()
    }

    #[test]
    fn formats_statistics_and_counts() {
        let report = report(None);
        let strategy = series();
        let wealth = strategy.cumulative_wealth();
        let summary = RunSummary {
            entities_requested: 10,
            entities_resolved: 9,
            entities_failed: 1,
            entities_with_beta: 8,
            dates_ranked: 3,
            dates_skipped: 35,
            ..RunSummary::default()
        };
        let context = ReportContext {
            report: Some(&report),
            strategy: &strategy,
            strategy_wealth: &wealth,
            benchmark_wealth: &wealth,
            summary: &summary,
        };

        let text = ConsoleReport::new().format(&context);
        assert!(text.contains("Max Drawdown"));
        assert!(text.contains("+20.00%"));
        assert!(text.contains("Regression omitted"));
        let sharpe = text.lines().find(|l| l.starts_with("Sharpe Ratio")).unwrap();
        assert!(sharpe.ends_with("n/a"));
        assert!(text.contains("failed 1"));
    }

    #[test]
    fn missing_report_is_stated() {
        let strategy = TimeSeries::new();
        let summary = RunSummary::default();
        let context = ReportContext {
            report: None,
            strategy: &strategy,
            strategy_wealth: &strategy,
            benchmark_wealth: &strategy,
            summary: &summary,
        };
        assert!(ConsoleReport::new().format(&context).contains("unavailable"));
    }

    #[test]
    fn regression_block_is_printed() {
        let regression = RegressionSummary {
            observations: 24,
            lags: 2,
            alpha: 0.004,
            annualized_alpha: 0.048,
            alpha_std_error: 0.002,
            alpha_t_stat: Some(2.0),
            alpha_p_value: Some(0.058),
            beta: -0.6,
            beta_std_error: 0.05,
            beta_t_stat: Some(-12.0),
            beta_p_value: Some(0.0),
            r_squared: 0.91,
        };
        let mut out = String::new();
        write_performance(&mut out, &report(Some(regression))).unwrap();
        assert!(out.contains("Newey-West, 2 lags, 24 observations"));
        assert!(out.contains("Annualized Alpha: +4.80%"));
    }

    #[test]
    fn csv_export_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let strategy = series();
        let wealth = strategy.cumulative_wealth();
        let summary = RunSummary::default();
        let context = ReportContext {
            report: None,
            strategy: &strategy,
            strategy_wealth: &wealth,
            benchmark_wealth: &wealth,
            summary: &summary,
        };

        let sink = ConsoleReport::new().with_csv_dir(dir.path().join("out"));
        sink.export_csv(&context).unwrap();

        let returns = fs::read_to_string(dir.path().join("out/strategy_returns.csv")).unwrap();
        assert!(returns.starts_with("date,strategy_return"));
        assert_eq!(returns.lines().count(), 4);
        let wealth = fs::read_to_string(dir.path().join("out/wealth.csv")).unwrap();
        assert!(wealth.contains("benchmark"));
        assert!(wealth.contains("strategy"));
    }
}
