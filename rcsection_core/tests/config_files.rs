//! Configuration files from disk through to reports and CSV exports.

use std::env::temp_dir;
use std::fs;
use std::path::PathBuf;

use rcsection_core::calculations::CurvatureRange;
use rcsection_core::config::SectionConfigFile;
use rcsection_core::errors::SectionError;
use rcsection_core::file_io::{load_config, save_json, write_results_csv, CSV_HEADER};
use rcsection_core::report::{AnalysisReport, BalanceOutcome};
use rcsection_core::FailureMode;

fn temp_path(name: &str) -> PathBuf {
    temp_dir().join(format!("rcsection_it_{}_{}", std::process::id(), name))
}

const RECTANGULAR_BEAM: &str = r#"{
    "section_name": "Rectangular beam",
    "description": "300 x 500, symmetric reinforcement",
    "version": "1.0",
    "materials": { "concrete_type": "C30", "steel_type": "HRB400" },
    "geometry": {
        "height": 500.0,
        "rectangle": { "width": 300.0, "height": 500.0 }
    },
    "reinforcement": {
        "cover_thickness": 50.0,
        "layers": {
            "top": { "count": 3, "diameter": 20.0 },
            "bottom": { "count": 3, "diameter": 20.0 }
        }
    },
    "analysis": {
        "target_axial_force": 0.0,
        "curvature_range": { "start": 0.0, "end": 0.0015, "steps": 200 }
    }
}"#;

#[test]
fn rectangular_beam_from_disk() {
    let path = temp_path("rectangular.json");
    fs::write(&path, RECTANGULAR_BEAM).unwrap();

    let file = load_config(&path).unwrap();
    assert_eq!(file.analysis.fiber_count, 50);
    assert!(file.analysis.single_calculation.is_none());

    let report = AnalysisReport::generate(&file, Some(&path)).unwrap();
    assert_eq!(report.section_info.height, 500.0);
    assert_eq!(report.section_info.reinforcement.len(), 2);
    assert!(report.full_analysis.failure.is_structural_failure());
    assert!(report.full_analysis.max_moment.unwrap() > 100.0);
    assert!(report.balance_calculation.is_none());

    let _ = fs::remove_file(&path);
}

#[test]
fn template_report_and_csv() {
    let path = temp_path("template.json");
    let mut template = SectionConfigFile::template();
    template.analysis.curvature_range = CurvatureRange::new(0.0, 1e-6, 6);
    save_json(&template, &path).unwrap();

    let file = load_config(&path).unwrap();
    let config = file.to_configuration().unwrap();
    let result = rcsection_core::analyze(&config, &file.analysis_request().unwrap()).unwrap();
    assert_eq!(result.failure_mode, FailureMode::NoFailure);
    assert_eq!(result.len(), 6);

    let report = AnalysisReport::assemble(&file, &config, &result, Some(&path));
    let balance = report.balance_calculation.unwrap();
    match balance.outcome {
        BalanceOutcome::Converged { residual, .. } => assert!(residual.abs() <= 1.0),
        other => panic!("balance failed: {:?}", other),
    }

    let csv_path = temp_path("template_results.csv");
    write_results_csv(&result, &csv_path).unwrap();
    let csv = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.lines().next(), Some(CSV_HEADER));
    assert_eq!(csv.lines().count(), 7);
    assert!(csv.lines().skip(1).all(|line| line.ends_with(",1")));

    let _ = fs::remove_file(&path);
    let _ = fs::remove_file(&csv_path);
}

#[test]
fn processed_config_keeps_source_fields() {
    let processed = SectionConfigFile::template().process().unwrap();
    let json = serde_json::to_value(&processed).unwrap();
    assert_eq!(json["section_name"], "Custom section");
    assert_eq!(json["calculated_params"]["f_cd"], 40.0);
    assert!(json["calculated_areas"]["bottom"].as_f64().unwrap() > 1500.0);
}

#[test]
fn missing_curvature_range_is_reported_by_path() {
    let mut value: serde_json::Value = serde_json::from_str(RECTANGULAR_BEAM).unwrap();
    value["analysis"].as_object_mut().unwrap().remove("curvature_range");
    let err = SectionConfigFile::from_value(value).unwrap_err();
    assert_eq!(err, SectionError::missing_field("analysis.curvature_range"));
}

#[test]
fn unknown_grade_is_rejected() {
    let json = RECTANGULAR_BEAM.replace("\"C30\"", "\"C99\"");
    let file = SectionConfigFile::from_json_str(&json).unwrap();
    let err = file.to_configuration().unwrap_err();
    assert!(matches!(err, SectionError::MaterialNotFound { .. }));
}

#[test]
fn bundled_demo_files_are_valid() {
    let demos = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../demos");
    for name in ["section_template.json", "rectangular_beam.json"] {
        let file = load_config(&demos.join(name)).unwrap();
        file.validate().unwrap();
        assert!(file.to_configuration().is_ok(), "{} does not build", name);
    }

    let template = load_config(&demos.join("section_template.json")).unwrap();
    assert_eq!(template.materials, SectionConfigFile::template().materials);
    assert_eq!(template.reinforcement, SectionConfigFile::template().reinforcement);
}
