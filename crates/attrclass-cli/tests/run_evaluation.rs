use std::fs;

use attrclass_classifiers::config::{args, FailurePolicy, TrainingConfig};
use attrclass_classifiers::{ClassifierError, Registry};
use attrclass_cli::evaluate::input::{load_evaluate_config, EvaluateConfig};
use attrclass_cli::evaluate::run::run_evaluation;

#[test]
fn default_run_reports_bundled_iris() {
    let outcome = run_evaluation(&EvaluateConfig::default(), &Registry::default()).unwrap();
    assert_eq!(outcome.source, "iris.arff");
    assert_eq!(outcome.evaluation.matrix.total(), 150);

    let report = outcome.render(false);
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("For Iris-versicolor, num correct="));

    let summary = outcome.render(true);
    let correct = outcome.evaluation.matrix.correct();
    assert_eq!(
        summary.trim_end(),
        format!(
            "Out of 150 instances, {} matched the value in the iris.arff file, for a success percent of {}",
            correct,
            100 * correct / 150
        )
    );
}

#[test]
fn config_file_drives_dataset_and_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("weather.csv");
    fs::write(
        &data_path,
        "temperature,humidity,play\n\
         85,85,no\n80,90,no\n83,86,yes\n70,96,yes\n68,80,yes\n65,70,no\n64,65,yes\n\
         72,95,no\n69,70,yes\n75,80,yes\n75,70,yes\n72,90,yes\n81,75,yes\n71,91,no\n",
    )
    .unwrap();
    let tsv_path = dir.path().join("matrix.tsv");

    let config = EvaluateConfig {
        data: Some(data_path.clone()),
        training: TrainingConfig::new("ZeroR", vec![]),
        summary: true,
        parallel: true,
        failure_policy: FailurePolicy::Abort,
        matrix_tsv: Some(tsv_path.clone()),
    };
    let config_path = dir.path().join("config.json");
    fs::write(&config_path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

    let loaded = load_evaluate_config(&config_path).unwrap();
    assert_eq!(loaded, config);

    let outcome = run_evaluation(&loaded, &Registry::default()).unwrap();
    assert_eq!(outcome.source, "weather.csv");
    // labels in first-seen order: no, yes; ZeroR predicts the majority "yes"
    assert_eq!(outcome.evaluation.matrix.get("yes", "yes").unwrap(), 9);
    assert_eq!(outcome.evaluation.matrix.get("no", "yes").unwrap(), 5);
    assert_eq!(outcome.summary().percent(), 64);

    let tsv = fs::read_to_string(&tsv_path).unwrap();
    assert_eq!(tsv.lines().next().unwrap(), "expected\\actual\tno\tyes");
}

#[test]
fn training_failures_surface_as_classifier_errors() {
    let config = EvaluateConfig {
        training: TrainingConfig::new("J48", args(&["-C", "0.9"])),
        ..EvaluateConfig::default()
    };
    let err = run_evaluation(&config, &Registry::default()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ClassifierError>(),
        Some(ClassifierError::Training(_))
    ));
}

#[test]
fn missing_config_file_is_an_error() {
    assert!(load_evaluate_config("/nonexistent/attrclass.json").is_err());
}
