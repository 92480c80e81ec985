//! memo-recorder CLI entry point

use std::process::ExitCode;

use clap::Parser;

use memo_recorder::cli::{
    app::{init_tracing, load_default_config},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
    run_check, run_record, RecordOptions, EXIT_ERROR, EXIT_USAGE_ERROR,
};
use memo_recorder::domain::config::AppConfig;
use memo_recorder::domain::transcription::Language;
use memo_recorder::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let presenter = Presenter::new();

    // Build CLI config from args
    let cli_config = AppConfig {
        api_key: None, // API key comes from env/file only
        output: cli.output.as_ref().map(|p| p.to_string_lossy().to_string()),
        language: cli
            .language
            .map(|l| Language::from(l).code().to_string()),
        min_duration: cli.min_duration.clone(),
        max_duration: cli.max_duration.clone(),
        ..Default::default()
    };

    // Handle subcommands
    match cli.command {
        Some(Commands::Config { action }) => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        Some(Commands::Check { file }) => {
            let config = load_default_config(cli_config).await;
            return match RecordOptions::from_config(&config, false) {
                Ok(options) => run_check(&file, &options.limits),
                Err(e) => {
                    presenter.error(&e);
                    ExitCode::from(EXIT_USAGE_ERROR)
                }
            };
        }
        None => {}
    }

    // Merge config
    let config = load_default_config(cli_config).await;

    let options = match RecordOptions::from_config(&config, !cli.no_transcribe) {
        Ok(options) => options,
        Err(e) => {
            presenter.error(&e);
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    run_record(options).await
}
