//! CLI integration tests for the render, list, and inspect commands.
//!
//! Exit codes are opaque to assertions, so the tests verify observable
//! effects: files written, bundles decodable, nothing produced on failure.

mod common;

use clap::Parser;
use common::*;
use serde_json::{Value, json};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use riskview::cli::{self, Cli};

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn sample_payload_value() -> Value {
    json!({
        "id": 1,
        "name": "AMZN daily",
        "data": [
            record(1, 100.0, Some(99.0), None, Some(0.0)),
            record(2, 105.0, Some(101.0), Some(1), Some(5.0)),
        ],
    })
}

mod render_command {
    use super::*;

    #[test]
    fn render_writes_bundle_and_chart() {
        let dir = TempDir::new().unwrap();
        let payload = write_file(&dir, "1.json", &sample_payload_value().to_string());
        let bundle_path = dir.path().join("bundle.json");
        let chart_path = dir.path().join("chart.png");

        let cli = Cli::parse_from([
            "riskview",
            "render",
            "--payload",
            payload.to_str().unwrap(),
            "--output",
            bundle_path.to_str().unwrap(),
            "--chart-out",
            chart_path.to_str().unwrap(),
        ]);
        let _ = cli::run(cli);

        let bundle: Value =
            serde_json::from_str(&fs::read_to_string(&bundle_path).unwrap()).unwrap();
        assert_eq!(bundle["total_p_l"], 5.0);
        assert!(bundle["avg_var_95"].is_null());
        assert!(bundle["avg_var_99"].is_null());
        assert!(bundle["sig_table"].as_str().unwrap().contains("Buy"));
        assert!(bundle["analysis"].get("data").is_none());
        assert_eq!(bundle["analysis"]["name"], "AMZN daily");

        let chart = fs::read(&chart_path).unwrap();
        assert_eq!(&chart[..8], &PNG_MAGIC);
    }

    #[test]
    fn render_honors_chart_dimensions_from_config() {
        let dir = TempDir::new().unwrap();
        let payload = write_file(&dir, "1.json", &sample_payload_value().to_string());
        let config = write_file(&dir, "riskview.ini", "[chart]\nwidth = 400\nheight = 300\n");
        let chart_path = dir.path().join("chart.png");

        let cli = Cli::parse_from([
            "riskview",
            "render",
            "--payload",
            payload.to_str().unwrap(),
            "--output",
            dir.path().join("bundle.json").to_str().unwrap(),
            "--chart-out",
            chart_path.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ]);
        let _ = cli::run(cli);

        // PNG IHDR carries the dimensions right after the signature.
        let chart = fs::read(&chart_path).unwrap();
        let width = u32::from_be_bytes(chart[16..20].try_into().unwrap());
        let height = u32::from_be_bytes(chart[20..24].try_into().unwrap());
        assert_eq!((width, height), (400, 300));
    }

    #[test]
    fn render_malformed_payload_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let payload = write_file(&dir, "bad.json", r#"{"id": 2, "name": "no data"}"#);
        let bundle_path = dir.path().join("bundle.json");

        let cli = Cli::parse_from([
            "riskview",
            "render",
            "--payload",
            payload.to_str().unwrap(),
            "--output",
            bundle_path.to_str().unwrap(),
        ]);
        let _ = cli::run(cli);

        assert!(!bundle_path.exists());
    }

    #[test]
    fn render_without_position_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let value = json!({
            "id": 3,
            "data": [record(1, 100.0, None, Some(0), Some(0.0))],
        });
        let payload = write_file(&dir, "flat.json", &value.to_string());
        let bundle_path = dir.path().join("bundle.json");

        let cli = Cli::parse_from([
            "riskview",
            "render",
            "--payload",
            payload.to_str().unwrap(),
            "--output",
            bundle_path.to_str().unwrap(),
        ]);
        let _ = cli::run(cli);

        assert!(!bundle_path.exists());
    }
}

mod list_command {
    use super::*;

    fn seeded_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "2.json", r#"{"id": 2, "name": "beta", "data": []}"#);
        write_file(&dir, "1.json", r#"{"id": 1, "name": "alpha", "data": []}"#);
        dir
    }

    #[test]
    fn list_with_explicit_dir_runs() {
        let dir = seeded_dir();
        let cli = Cli::parse_from(["riskview", "list", "--dir", dir.path().to_str().unwrap()]);
        let _ = cli::run(cli);
    }

    #[test]
    fn list_resolves_dir_from_config() {
        let dir = seeded_dir();
        let config_dir = TempDir::new().unwrap();
        let config = write_file(
            &config_dir,
            "riskview.ini",
            &format!("[source]\ndir = {}\n", dir.path().display()),
        );
        let cli = Cli::parse_from(["riskview", "list", "--config", config.to_str().unwrap()]);
        let _ = cli::run(cli);
    }
}

mod inspect_command {
    use super::*;

    #[test]
    fn inspect_valid_payload_runs() {
        let dir = TempDir::new().unwrap();
        let payload = write_file(&dir, "1.json", &sample_payload_value().to_string());
        let cli = Cli::parse_from(["riskview", "inspect", "--payload", payload.to_str().unwrap()]);
        let _ = cli::run(cli);
    }

    #[test]
    fn inspect_reports_missing_position_without_panicking() {
        let dir = TempDir::new().unwrap();
        let value = json!({
            "id": 4,
            "data": [record(1, 100.0, None, None, None)],
        });
        let payload = write_file(&dir, "flat.json", &value.to_string());
        let cli = Cli::parse_from(["riskview", "inspect", "--payload", payload.to_str().unwrap()]);
        let _ = cli::run(cli);
    }
}

mod argument_parsing {
    use super::*;

    #[test]
    fn render_requires_payload() {
        assert!(Cli::try_parse_from(["riskview", "render"]).is_err());
    }

    #[test]
    fn unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["riskview", "serve"]).is_err());
    }
}
