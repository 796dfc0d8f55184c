//! Lab Assist CLI entry point

use std::process::ExitCode;

use clap::Parser;

use lab_assist::cli::{
    app::{load_merged_config, run},
    args::Cli,
    logging::init_tracing,
    presenter::Presenter,
};
use lab_assist::domain::config::AppConfig;
use lab_assist::domain::inference::Language;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // API key comes from env/file only
    let cli_config = AppConfig {
        language: cli
            .lang
            .map(|lang| Language::from(lang).as_str().to_string()),
        max_duration: cli.max_duration.clone(),
        ..Default::default()
    };
    let config = load_merged_config(cli_config).await;

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Presenter::new().error(&e.to_string());
            ExitCode::from(e.exit_code())
        }
    }
}
