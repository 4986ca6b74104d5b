use anyhow::Result;
use clap::{Arg, ArgAction, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use attrclass_classifiers::Registry;
use attrclass_cli::evaluate::input::EvaluateConfig;
use attrclass_cli::evaluate::run::run_evaluation;
use attrclass_cli::exit_code::exit_code;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("ATTRCLASS_LOG", "error,attrclass=info"))
        .init();

    let matches = Command::new("attrclass")
        .version(clap::crate_version!())
        .author("Justin Sing <justincsing@gmail.com>")
        .about("Train a classifier on a labeled dataset and report how it classifies every record")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to evaluation configuration file (JSON)")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("data")
                .short('d')
                .long("data")
                .help(
                    "Path to the dataset (*.arff or *.csv). Overrides the dataset \
                     specified in the configuration file. Defaults to the bundled iris data.",
                )
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("summary")
                .long("summary")
                .help("Print the one-line self-check summary instead of the per-class report.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .help("Classify records on the rayon thread pool.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("skip_failures")
                .long("skip-failures")
                .help("Skip records that fail to classify instead of aborting.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("matrix_tsv")
                .long("matrix-tsv")
                .help("Write the confusion matrix as TSV to this path.")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Written by {author-with-newline}Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    let config = EvaluateConfig::from_arguments(&matches)?;
    if matches.get_one::<PathBuf>("config").is_none() {
        let default_json = serde_json::to_string_pretty(&config).unwrap_or_default();
        log::debug!("[attrclass] Effective config:\n{}", default_json);
    }

    match run_evaluation(&config, &Registry::default()) {
        Ok(outcome) => {
            print!("{}", outcome.render(config.summary));
            Ok(())
        }
        Err(e) => {
            log::error!("Evaluation failed: {:#}", e);
            std::process::exit(exit_code(&e))
        }
    }
}
