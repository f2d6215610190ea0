//! CLI definition and dispatch.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_file_adapter::JsonFileAdapter;
use crate::adapters::png_chart::{ChartConfig, PngChartAdapter};
use crate::domain::error::RiskviewError;
use crate::domain::frame::TimeSeriesFrame;
use crate::domain::payload::{AnalysisPayload, SchemaVariant};
use crate::domain::report::render_report;
use crate::domain::signal_table::SignalTable;
use crate::ports::analysis_port::AnalysisPort;
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(name = "riskview", about = "Risk analysis report renderer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a report bundle from an analysis payload
    Render {
        #[arg(short, long)]
        payload: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        chart_out: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List analyses available in a payload directory
    List {
        #[arg(short, long)]
        dir: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Parse and validate a payload without rendering
    Inspect {
        #[arg(short, long)]
        payload: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Render {
            payload,
            output,
            chart_out,
            config,
        } => run_render(&payload, output.as_ref(), chart_out.as_ref(), config.as_ref()),
        Command::List { dir, config } => run_list(dir, config.as_ref()),
        Command::Inspect { payload } => run_inspect(&payload),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = RiskviewError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn load_payload(path: &PathBuf) -> Result<AnalysisPayload, ExitCode> {
    let document = match fs::read_to_string(path) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("error: failed to read {}: {e}", path.display());
            return Err(ExitCode::from(1));
        }
    };
    AnalysisPayload::from_json(&document).map_err(|e| {
        eprintln!("error: {e}");
        (&e).into()
    })
}

fn variant_name(variant: SchemaVariant) -> &'static str {
    if variant.is_extended() { "extended" } else { "legacy" }
}

fn run_render(
    payload_path: &PathBuf,
    output_path: Option<&PathBuf>,
    chart_out: Option<&PathBuf>,
    config_path: Option<&PathBuf>,
) -> ExitCode {
    eprintln!("Loading payload from {}", payload_path.display());
    let payload = match load_payload(payload_path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let chart_config = match config_path {
        Some(path) => {
            let adapter = match load_config(path) {
                Ok(a) => a,
                Err(code) => return code,
            };
            match ChartConfig::from_config(&adapter) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("error: {e}");
                    return (&e).into();
                }
            }
        }
        None => ChartConfig::default(),
    };

    let variant = SchemaVariant::detect(&payload);
    eprintln!("Analysis {}: {} schema", payload.id, variant_name(variant));

    let chart = PngChartAdapter::with_config(chart_config);
    let bundle = match render_report(&payload, &chart) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if let Some(total) = bundle.total_p_l {
        eprintln!("  Total P&L: {total:.2}");
    }
    if let Some(avg) = bundle.avg_var_95 {
        eprintln!("  Avg VaR 95%: {avg:.4}");
    }

    let json = match serde_json::to_string_pretty(&bundle) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("error: failed to serialize bundle: {e}");
            return ExitCode::from(1);
        }
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                eprintln!("error: failed to write bundle: {e}");
                return ExitCode::from(1);
            }
            eprintln!("Report bundle written to: {}", path.display());
        }
        None => println!("{json}"),
    }

    if let Some(path) = chart_out {
        let bytes = match STANDARD.decode(&bundle.ts_chart) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("error: chart artifact is not valid base64: {e}");
                return ExitCode::from(1);
            }
        };
        if let Err(e) = fs::write(path, bytes) {
            eprintln!("error: failed to write chart: {e}");
            return ExitCode::from(1);
        }
        eprintln!("Chart PNG written to: {}", path.display());
    }

    ExitCode::SUCCESS
}

fn run_list(dir: Option<PathBuf>, config_path: Option<&PathBuf>) -> ExitCode {
    let dir = match dir {
        Some(dir) => dir,
        None => {
            let Some(path) = config_path else {
                eprintln!("error: --dir or --config is required for list");
                return ExitCode::from(2);
            };
            let config = match load_config(path) {
                Ok(c) => c,
                Err(code) => return code,
            };
            match config.get_string("source", "dir") {
                Some(dir) => PathBuf::from(dir),
                None => {
                    let err = RiskviewError::ConfigMissing {
                        section: "source".into(),
                        key: "dir".into(),
                    };
                    eprintln!("error: {err}");
                    return (&err).into();
                }
            }
        }
    };

    let adapter = JsonFileAdapter::new(&dir);
    let summaries = match adapter.list_analyses() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if summaries.is_empty() {
        eprintln!("No analyses found in {}", dir.display());
        return ExitCode::SUCCESS;
    }

    for summary in &summaries {
        let meta = serde_json::to_string(&summary.meta).unwrap_or_default();
        println!("{}  {}", summary.id, meta);
    }
    eprintln!("{} analyses found", summaries.len());
    ExitCode::SUCCESS
}

fn run_inspect(payload_path: &PathBuf) -> ExitCode {
    eprintln!("Inspecting payload: {}", payload_path.display());
    let payload = match load_payload(payload_path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let variant = SchemaVariant::detect(&payload);
    let frame = match TimeSeriesFrame::from_payload(&payload) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("Analysis id:       {}", payload.id);
    eprintln!("Schema variant:    {}", variant_name(variant));
    eprintln!("Rows:              {}", frame.len());
    if let Some((start, end)) = frame.date_range() {
        eprintln!("Date range:        {start} to {end}");
    }
    let positions = frame.rows.iter().filter(|r| r.has_position()).count();
    eprintln!("Position changes:  {positions}");

    match SignalTable::build(&frame, variant) {
        Ok(table) => eprintln!("Signal table rows: {}", table.len()),
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }

    match frame.last_position_date() {
        Some(date) => eprintln!("Last position:     {date}"),
        None => {
            let err = RiskviewError::NoTradingPosition;
            eprintln!("error: {err}");
            return (&err).into();
        }
    }

    eprintln!("\nPayload is renderable");
    ExitCode::SUCCESS
}
