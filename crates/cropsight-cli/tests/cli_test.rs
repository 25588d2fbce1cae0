//! Integration tests for the cropsight binary
//!
//! Every command runs in a fresh temporary directory so no stray
//! cropsight.toml or environment override leaks in.

use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const FEATURE_NAMES: [&str; 14] = [
    "NDVI",
    "SAVI",
    "Chlorophyll_Content",
    "Leaf_Area_Index",
    "Temperature",
    "Humidity",
    "Vapor_Pressure_Deficit",
    "Soil_Moisture",
    "Soil_pH",
    "Rainfall",
    "Crop_Stress_Indicator",
    "Crop_Maize",
    "Crop_Rice",
    "Crop_Wheat",
];

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cropsight"))
        .args(args)
        .current_dir(dir)
        .env_remove("CROPSIGHT_MODEL_PATH")
        .env_remove("CROPSIGHT_SCALER_PATH")
        .env_remove("CROPSIGHT_REFLECTANCE_SCALE")
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute cropsight")
}

fn stdout_json(output: &Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("Output should be valid JSON")
}

/// Writes model/scaler.json and model/crop_health_model.json under `dir`
fn write_models(dir: &Path) {
    let model_dir = dir.join("model");
    fs::create_dir_all(&model_dir).unwrap();

    let scaler = json!({
        "feature_names": FEATURE_NAMES,
        "mean": vec![0.0; 14],
        "scale": vec![1.0; 14]
    });
    fs::write(model_dir.join("scaler.json"), scaler.to_string()).unwrap();

    let model = json!({
        "feature_names": FEATURE_NAMES,
        "classes": [0, 1],
        "model": {
            "type": "random_forest",
            "trees": [{
                "children_left": [1, -1, -1],
                "children_right": [2, -1, -1],
                "feature": [0, -2, -2],
                "threshold": [0.4, -2.0, -2.0],
                "value": [[50.0, 50.0], [9.0, 1.0], [2.0, 8.0]]
            }]
        }
    });
    fs::write(model_dir.join("crop_health_model.json"), model.to_string()).unwrap();
}

#[test]
fn test_classify_json_envelope() {
    let dir = TempDir::new().unwrap();
    let output = run(
        dir.path(),
        &[
            "--json", "classify", "--ndvi", "0.6", "--evi", "0.5", "--ndwi", "-0.05", "--msi",
            "1.2", "--green", "0.15", "--nir", "0.3", "--red", "0.1",
        ],
    );

    assert!(output.status.success());
    let parsed = stdout_json(&output);
    assert_eq!(parsed["status"], "success");
    assert_eq!(parsed["data"]["zone_type"], "Vegetation");
    assert_eq!(parsed["data"]["health_status"], "Healthy and dense vegetation");
}

#[test]
fn test_classify_human_output() {
    let dir = TempDir::new().unwrap();
    let output = run(
        dir.path(),
        &[
            "classify", "--ndvi", "0.8", "--evi", "0.2", "--ndwi", "0.0", "--green", "0.05",
            "--nir", "0.3", "--red", "0.05",
        ],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Bare soil"));
    assert!(stdout.contains("Exposed soil or recently harvested field"));
}

#[test]
fn test_classify_accepts_negative_msi() {
    let dir = TempDir::new().unwrap();
    let output = run(
        dir.path(),
        &[
            "--json", "classify", "--ndvi", "0.3", "--evi", "0.5", "--ndwi", "0.0", "--msi",
            "-0.5", "--green", "0.2", "--nir", "0.3", "--red", "0.2",
        ],
    );

    assert!(output.status.success());
    let parsed = stdout_json(&output);
    assert_eq!(parsed["data"]["health_status"], "Early growth stage or sparse vegetation");
}

#[test]
fn test_config_reports_sources() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("cropsight.toml"), "reflectance_scale = 1.0\n").unwrap();

    let output = run(dir.path(), &["--json", "--model", "rf.json", "config"]);

    assert!(output.status.success());
    let parsed = stdout_json(&output);
    assert_eq!(parsed["data"]["model_path"]["value"], "rf.json");
    assert_eq!(parsed["data"]["model_path"]["source"], "Cli");
    assert_eq!(parsed["data"]["reflectance_scale"]["source"], "File");
    assert_eq!(parsed["data"]["scaler_path"]["source"], "Default");
}

#[test]
fn test_model_command_validates_artifacts() {
    let dir = TempDir::new().unwrap();
    write_models(dir.path());

    let output = run(dir.path(), &["--json", "model"]);

    assert!(output.status.success());
    let parsed = stdout_json(&output);
    assert_eq!(parsed["data"]["classifier"], "random forest (1 trees)");
    assert_eq!(parsed["data"]["feature_names"].as_array().unwrap().len(), 14);
}

#[test]
fn test_missing_artifacts_report_error() {
    let dir = TempDir::new().unwrap();

    let output = run(dir.path(), &["--json", "model"]);

    assert!(!output.status.success());
    let parsed = stdout_json(&output);
    assert_eq!(parsed["status"], "error");
    assert!(parsed["message"].as_str().unwrap().contains("model artifacts"));
}

#[test]
fn test_predict_with_crop_and_weather() {
    let dir = TempDir::new().unwrap();
    write_models(dir.path());

    let output = run(
        dir.path(),
        &[
            "--json", "predict", "--ndvi", "0.7", "--savi", "0.5", "--ndwi", "-0.1", "--crop",
            "rice", "--temperature", "30",
        ],
    );

    assert!(output.status.success());
    let parsed = stdout_json(&output);
    assert_eq!(parsed["data"]["prediction"], "Healthy");
    assert_eq!(parsed["data"]["confidence"], 0.8);
    assert_eq!(parsed["data"]["estimated_inputs"]["leaf_area_index"], 3.85);
}

#[test]
fn test_analyze_with_missing_polygon_fails() {
    let dir = TempDir::new().unwrap();
    write_models(dir.path());

    let output = run(
        dir.path(),
        &[
            "--json", "analyze", "--polygon", "missing.geojson", "--blue", "B02.tif", "--green",
            "B03.tif", "--red", "B04.tif", "--nir", "B08.tif", "--swir", "B11.tif",
        ],
    );

    assert!(!output.status.success());
    let parsed = stdout_json(&output);
    assert_eq!(parsed["status"], "error");
    assert!(parsed["message"].as_str().unwrap().contains("field polygon"));
}
