use std::path::Path;

use chrono::Utc;
use serde_json::json;

use crate::models::{BacktestResult, TradeSide};
use crate::Result;

/// Output format of a rendered report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Html,
    Json,
    Csv,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(ReportFormat::Html),
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(format!("unsupported format: {}", other)),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Toggles for the optional report sections
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub include_charts: bool,
    pub include_trades: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            include_charts: true,
            include_trades: true,
        }
    }
}

/// Render a backtest result to the requested format
pub fn render(
    result: &BacktestResult,
    format: ReportFormat,
    options: &ReportOptions,
) -> Result<String> {
    match format {
        ReportFormat::Html => render_html(result, options),
        ReportFormat::Json => render_json(result, options),
        ReportFormat::Csv => render_csv(result, options),
    }
}

/// Render and persist a report to disk
pub fn write_report(
    result: &BacktestResult,
    format: ReportFormat,
    options: &ReportOptions,
    path: &Path,
) -> Result<()> {
    let content = render(result, format, options)?;
    std::fs::write(path, content)?;
    tracing::info!(
        "Wrote {} report for '{}' to {}",
        format,
        result.strategy_name,
        path.display()
    );
    Ok(())
}

fn fmt_profit_factor(value: f64) -> String {
    if value.is_infinite() {
        "Infinity".to_string()
    } else {
        format!("{:.2}", value)
    }
}

fn render_json(result: &BacktestResult, options: &ReportOptions) -> Result<String> {
    let mut report = json!({
        "strategy_name": result.strategy_name,
        "generation_time": Utc::now().to_rfc3339(),
        "summary": {
            "net_profit_percent": result.net_profit_percent,
            "total_trades": result.total_trades,
            "winning_trades": result.winning_trades,
            "losing_trades": result.losing_trades,
            "win_rate": result.win_rate,
            // JSON has no infinity; the sentinel serializes as null
            "profit_factor": result.profit_factor,
            "max_drawdown_percent": result.max_drawdown_percent,
            "risk_adjusted_metric": result.risk_adjusted_metric,
        },
    });

    if options.include_charts {
        report["charts"] = serde_json::to_value(&result.chart_data)?;
    }
    if options.include_trades {
        report["trades"] = serde_json::to_value(&result.trades)?;
    }

    Ok(serde_json::to_string_pretty(&report)?)
}

fn csv_into_string(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    let content = String::from_utf8(bytes)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    Ok(content)
}

fn render_csv(result: &BacktestResult, options: &ReportOptions) -> Result<String> {
    let mut out = String::new();
    out.push_str(&format!("# Backtest Report: {}\n", result.strategy_name));
    out.push_str(&format!(
        "# Generated: {}\n\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S")
    ));

    out.push_str("## Performance Summary\n");
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Metric", "Value"])?;
    let summary_rows = [
        ("Net Profit", format!("{}%", result.net_profit_percent)),
        ("Total Trades", result.total_trades.to_string()),
        ("Winning Trades", result.winning_trades.to_string()),
        ("Losing Trades", result.losing_trades.to_string()),
        ("Win Rate", format!("{}%", result.win_rate)),
        ("Profit Factor", fmt_profit_factor(result.profit_factor)),
        ("Max Drawdown", format!("{}%", result.max_drawdown_percent)),
        (
            "Risk-Adjusted Metric",
            result.risk_adjusted_metric.to_string(),
        ),
    ];
    for (metric, value) in &summary_rows {
        writer.write_record([*metric, value.as_str()])?;
    }
    out.push_str(&csv_into_string(writer)?);

    if options.include_trades {
        out.push_str("\n## Trade History\n");
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record([
            "ID",
            "Entry Date",
            "Exit Date",
            "Side",
            "Entry Price",
            "Exit Price",
            "Profit/Loss",
            "P/L (%)",
        ])?;
        for trade in &result.trades {
            writer.write_record([
                trade.id.to_string(),
                trade.entry_date.to_string(),
                trade.exit_date.to_string(),
                match trade.side {
                    TradeSide::Long => "Long".to_string(),
                    TradeSide::Short => "Short".to_string(),
                },
                trade.entry_price.to_string(),
                trade.exit_price.to_string(),
                trade.profit_amount.to_string(),
                format!("{}%", trade.profit_percent),
            ])?;
        }
        out.push_str(&csv_into_string(writer)?);
    }

    Ok(out)
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn chart_arrays(points: &[crate::models::ChartPoint]) -> Result<(String, String)> {
    let labels: Vec<&str> = points.iter().map(|p| p.label.as_str()).collect();
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    Ok((
        serde_json::to_string(&labels)?,
        serde_json::to_string(&values)?,
    ))
}

fn render_html(result: &BacktestResult, options: &ReportOptions) -> Result<String> {
    let name = html_escape(&result.strategy_name);

    let mut html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
<title>Backtest Report: {name}</title>
<style>
body {{ font-family: Arial, sans-serif; line-height: 1.6; margin: 20px; color: #333; }}
h1, h2 {{ color: #2c3e50; }}
.summary-box {{ background-color: #f8f9fa; border: 1px solid #dee2e6; border-radius: 5px; padding: 15px; margin-bottom: 20px; }}
table {{ border-collapse: collapse; width: 100%; margin-bottom: 20px; }}
th, td {{ border: 1px solid #dee2e6; padding: 8px 12px; text-align: left; }}
th {{ background-color: #e9ecef; }}
tr:nth-child(even) {{ background-color: #f2f2f2; }}
.chart-container {{ margin-bottom: 30px; }}
.profit {{ color: green; }}
.loss {{ color: red; }}
</style>
<script src="https://cdn.plot.ly/plotly-latest.min.js"></script>
</head>
<body>
<h1>Backtest Report: {name}</h1>
<div class="summary-box">
<h2>Performance Summary</h2>
<table>
<tr><th>Metric</th><th>Value</th></tr>
<tr><td>Symbol / Timeframe</td><td>{symbol} / {timeframe}</td></tr>
<tr><td>Period</td><td>{start} to {end}</td></tr>
<tr><td>Net Profit</td><td>{net_profit}%</td></tr>
<tr><td>Total Trades</td><td>{total_trades}</td></tr>
<tr><td>Win Rate</td><td>{win_rate}%</td></tr>
<tr><td>Profit Factor</td><td>{profit_factor}</td></tr>
<tr><td>Max Drawdown</td><td>{max_drawdown}%</td></tr>
<tr><td>Risk-Adjusted Metric</td><td>{risk_metric}</td></tr>
</table>
</div>
"#,
        name = name,
        symbol = html_escape(&result.symbol),
        timeframe = html_escape(&result.timeframe),
        start = result.start_date,
        end = result.end_date,
        net_profit = result.net_profit_percent,
        total_trades = result.total_trades,
        win_rate = result.win_rate,
        profit_factor = fmt_profit_factor(result.profit_factor),
        max_drawdown = result.max_drawdown_percent,
        risk_metric = result.risk_adjusted_metric,
    );

    if options.include_charts {
        let (equity_labels, equity_values) = chart_arrays(&result.chart_data.equity_curve)?;
        let (drawdown_labels, drawdown_values) = chart_arrays(&result.chart_data.drawdown_curve)?;
        let months: Vec<&str> = result
            .chart_data
            .monthly_returns
            .iter()
            .map(|m| m.month.as_str())
            .collect();
        let month_values: Vec<f64> = result
            .chart_data
            .monthly_returns
            .iter()
            .map(|m| m.return_percent)
            .collect();

        html.push_str(&format!(
            r#"<h2>Performance Charts</h2>
<div class="chart-container"><div id="equity-chart" style="width: 100%; height: 400px;"></div></div>
<div class="chart-container"><div id="drawdown-chart" style="width: 100%; height: 300px;"></div></div>
<div class="chart-container"><div id="monthly-returns-chart" style="width: 100%; height: 300px;"></div></div>
<script>
Plotly.newPlot('equity-chart', [{{
  x: {equity_labels}, y: {equity_values}, mode: 'lines', name: 'Equity Curve',
  line: {{ color: 'rgb(31, 119, 180)', width: 2 }}
}}], {{ title: 'Equity Curve', yaxis: {{ title: 'Equity (%)' }} }});
Plotly.newPlot('drawdown-chart', [{{
  x: {drawdown_labels}, y: {drawdown_values}, mode: 'lines', name: 'Drawdown',
  line: {{ color: 'rgb(214, 39, 40)', width: 2 }}
}}], {{ title: 'Drawdown', yaxis: {{ title: 'Drawdown (%)' }} }});
Plotly.newPlot('monthly-returns-chart', [{{
  x: {months}, y: {month_values}, type: 'bar', name: 'Monthly Returns',
  marker: {{ color: 'rgb(44, 160, 44)' }}
}}], {{ title: 'Monthly Returns', yaxis: {{ title: 'Return (%)' }} }});
</script>
"#,
            equity_labels = equity_labels,
            equity_values = equity_values,
            drawdown_labels = drawdown_labels,
            drawdown_values = drawdown_values,
            months = serde_json::to_string(&months)?,
            month_values = serde_json::to_string(&month_values)?,
        ));
    }

    if options.include_trades {
        html.push_str(
            r#"<h2>Trade History</h2>
<table>
<tr><th>ID</th><th>Entry Date</th><th>Exit Date</th><th>Side</th><th>Entry Price</th><th>Exit Price</th><th>P/L</th><th>P/L (%)</th></tr>
"#,
        );
        for trade in &result.trades {
            let class = if trade.profit_amount >= 0.0 {
                "profit"
            } else {
                "loss"
            };
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:?}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td class=\"{}\">{}%</td></tr>\n",
                trade.id,
                trade.entry_date,
                trade.exit_date,
                trade.side,
                trade.entry_price,
                trade.exit_price,
                class,
                trade.profit_amount,
                class,
                trade.profit_percent,
            ));
        }
        html.push_str("</table>\n");
    }

    html.push_str("</body>\n</html>\n");
    Ok(html)
}
