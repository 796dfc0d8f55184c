//! Command runner: wires the orchestrator to the CLI

use std::env;
use std::io::IsTerminal;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::io::AsyncReadExt;

use crate::application::ports::{ConfigStore, InferenceProvider, MediaCapture};
use crate::application::{
    ActionFailure, ActionRejected, CaptureStart, Settlement, Submission, TaskOrchestrator,
};
use crate::domain::action::ActionSlot;
use crate::domain::capture::CaptureLimit;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;
use crate::domain::inference::{Language, PromptTemplate};
use crate::domain::workspace::{seed_inventory, Workspace};
use crate::infrastructure::{DeviceCapture, GeminiProvider, XdgConfigStore};

use super::args::{Commands, InventoryAction, TicketAction};
use super::config_cmd::handle_config_command;
use super::presenter::Presenter;
use super::signals::{wait_for_stop, StopReason};

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

const PROGRESS_TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum AppError {
    #[error(
        "Missing API key. Set GEMINI_API_KEY environment variable \
         or run 'lab-assist config set api_key <key>'"
    )]
    MissingApiKey,

    #[error(transparent)]
    Rejected(#[from] ActionRejected),

    #[error(transparent)]
    Failed(#[from] ActionFailure),

    #[error("Capture cancelled")]
    Cancelled,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Usage(String),
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) => EXIT_USAGE_ERROR,
            _ => EXIT_ERROR,
        }
    }
}

/// Settings resolved from the merged config
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub language: Language,
    pub max_duration: CaptureLimit,
}

impl RunOptions {
    /// Resolve options, rejecting malformed values instead of defaulting
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let language = match config.language.as_deref() {
            Some(s) => s
                .parse::<Language>()
                .map_err(|e| AppError::Usage(e.to_string()))?,
            None => Language::default(),
        };
        let max_duration = match config.max_duration.as_deref() {
            Some(s) => s
                .parse::<CaptureLimit>()
                .map_err(|e| AppError::Usage(format!("Invalid max-duration: {}", e)))?,
            None => CaptureLimit::default(),
        };
        Ok(Self {
            language,
            max_duration,
        })
    }
}

/// Run one command to completion
pub async fn run(command: Commands, config: &AppConfig) -> Result<(), AppError> {
    let mut presenter = Presenter::new();

    let command = match command {
        Commands::Config { action } => {
            handle_config_command(action, &XdgConfigStore::new(), &presenter).await?;
            return Ok(());
        }
        command => command,
    };

    let options = RunOptions::from_config(config)?;
    let mut workspace = Workspace::new(
        options.language,
        config.precursors_or_default(),
        seed_inventory(),
    );
    let today = chrono::Local::now().date_naive();

    // Listing is local; everything else needs the provider.
    if let Commands::Inventory {
        action: InventoryAction::List,
    } = &command
    {
        presenter.inventory(&workspace.inventory, today);
        return Ok(());
    }

    let provider = GeminiProvider::from_config(api_key(config)?, config);

    match command {
        Commands::Recommend {
            element,
            precursors,
        } => {
            if !precursors.is_empty() {
                workspace.precursors = precursors;
            }
            let orchestrator = TaskOrchestrator::new(DeviceCapture::microphone(), provider);
            submit_text(
                &orchestrator,
                &mut presenter,
                &mut workspace,
                PromptTemplate::ProcessRecommendation,
                &element,
            )
            .await?;
            presenter.recommendations(&workspace.recommendations);
        }
        Commands::Ticket { action } => {
            let orchestrator = TaskOrchestrator::new(DeviceCapture::microphone(), provider);
            let text = match action {
                TicketAction::Analyze { text } => match text {
                    Some(text) => text,
                    None => read_stdin(&presenter).await?,
                },
                TicketAction::Dictate { analyze } => {
                    capture_audio(
                        &orchestrator,
                        &mut presenter,
                        &mut workspace,
                        PromptTemplate::FaultTranscription,
                        options.max_duration,
                    )
                    .await?;
                    presenter.output(&workspace.ticket_draft);
                    if !analyze {
                        return Ok(());
                    }
                    workspace.ticket_draft.clone()
                }
            };
            submit_text(
                &orchestrator,
                &mut presenter,
                &mut workspace,
                PromptTemplate::TicketExtraction,
                &text,
            )
            .await?;
            if let Some(analysis) = &workspace.ticket_analysis {
                presenter.ticket(analysis);
            }
        }
        Commands::Inventory { action } => match action {
            InventoryAction::List => presenter.inventory(&workspace.inventory, today),
            InventoryAction::Voice => {
                let orchestrator = TaskOrchestrator::new(DeviceCapture::microphone(), provider);
                capture_audio(
                    &orchestrator,
                    &mut presenter,
                    &mut workspace,
                    PromptTemplate::InventoryVoiceEntry,
                    options.max_duration,
                )
                .await?;
                if let Some(item) = workspace.inventory.first() {
                    presenter.inventory_item(item, today);
                }
            }
            InventoryAction::Scan { image } => {
                let orchestrator = TaskOrchestrator::new(DeviceCapture::camera(image), provider);
                capture_frame(
                    &orchestrator,
                    &mut presenter,
                    &mut workspace,
                    PromptTemplate::InventoryLabelScan,
                )
                .await?;
                if let Some(item) = workspace.inventory.first() {
                    presenter.inventory_item(item, today);
                }
                if let Some(slip) = &workspace.report {
                    presenter.markdown(&slip.markdown);
                }
            }
            InventoryAction::Inspect { image } => {
                let orchestrator = TaskOrchestrator::new(DeviceCapture::camera(image), provider);
                capture_frame(
                    &orchestrator,
                    &mut presenter,
                    &mut workspace,
                    PromptTemplate::StorageInspection,
                )
                .await?;
                if let Some(inspection) = &workspace.inspection {
                    presenter.markdown(&inspection.to_markdown(workspace.language));
                }
            }
            InventoryAction::Report { analytics } => {
                let template = if analytics {
                    PromptTemplate::LabAnalyticsReport
                } else {
                    PromptTemplate::InventoryReport
                };
                let orchestrator = TaskOrchestrator::new(DeviceCapture::microphone(), provider);
                presenter.start_spinner(&format!("Generating {}...", template));
                let submission = orchestrator
                    .submit_context(template, workspace.language, workspace.context_for(template))
                    .await;
                settle_submission(&mut presenter, &mut workspace, submission)?;
                if let Some(report) = &workspace.report {
                    presenter.markdown(&report.markdown);
                }
            }
        },
        Commands::Config { .. } => {}
    }

    Ok(())
}

async fn submit_text<C, P>(
    orchestrator: &TaskOrchestrator<C, P>,
    presenter: &mut Presenter,
    workspace: &mut Workspace,
    template: PromptTemplate,
    text: &str,
) -> Result<(), AppError>
where
    C: MediaCapture,
    P: InferenceProvider,
{
    presenter.start_spinner(&format!("Running {}...", template));
    let submission = orchestrator
        .submit_text(template, text, workspace.language, workspace.context_for(template))
        .await;
    settle_submission(presenter, workspace, submission)
}

/// Record the microphone until Enter, Ctrl-C or the limit, then infer.
async fn capture_audio<C, P>(
    orchestrator: &TaskOrchestrator<C, P>,
    presenter: &mut Presenter,
    workspace: &mut Workspace,
    template: PromptTemplate,
    limit: CaptureLimit,
) -> Result<(), AppError>
where
    C: MediaCapture,
    P: InferenceProvider,
{
    match orchestrator.start_capture(template, workspace.language).await? {
        CaptureStart::Capturing => {}
        CaptureStart::Failed(settlement) => return finish(presenter, workspace, settlement),
    }
    let slot = ActionSlot::for_template(template);

    presenter.start_spinner("Listening...");
    let started = Instant::now();
    let stop = wait_for_stop(limit);
    tokio::pin!(stop);
    let mut ticker = tokio::time::interval(PROGRESS_TICK);

    let reason = loop {
        tokio::select! {
            reason = &mut stop => break reason,
            _ = ticker.tick() => {
                let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                presenter.update_capture_progress(elapsed, limit.as_millis());
            }
        }
    };

    if !reason.keeps_media() {
        orchestrator.cancel_capture(slot).await?;
        presenter.spinner_fail("Capture cancelled");
        return Err(AppError::Cancelled);
    }
    if reason == StopReason::LimitReached {
        tracing::info!(slot = %slot, limit = %limit, "capture limit reached");
    }

    presenter.update_spinner(&format!("Running {}...", template));
    let settlement = orchestrator.stop_capture(slot).await?;
    finish(presenter, workspace, settlement)
}

/// Grab a single camera frame and infer.
async fn capture_frame<C, P>(
    orchestrator: &TaskOrchestrator<C, P>,
    presenter: &mut Presenter,
    workspace: &mut Workspace,
    template: PromptTemplate,
) -> Result<(), AppError>
where
    C: MediaCapture,
    P: InferenceProvider,
{
    match orchestrator.start_capture(template, workspace.language).await? {
        CaptureStart::Capturing => {}
        CaptureStart::Failed(settlement) => return finish(presenter, workspace, settlement),
    }
    presenter.start_spinner(&format!("Running {}...", template));
    let settlement = orchestrator
        .stop_capture(ActionSlot::for_template(template))
        .await?;
    finish(presenter, workspace, settlement)
}

fn settle_submission(
    presenter: &mut Presenter,
    workspace: &mut Workspace,
    submission: Result<Submission, ActionRejected>,
) -> Result<(), AppError> {
    match submission {
        Ok(Submission::Settled(settlement)) => finish(presenter, workspace, settlement),
        Ok(Submission::Ignored) => {
            presenter.stop_spinner();
            presenter.warn("Already waiting for a result; submission ignored");
            Ok(())
        }
        Err(rejected) => {
            presenter.stop_spinner();
            Err(rejected.into())
        }
    }
}

fn finish(
    presenter: &mut Presenter,
    workspace: &mut Workspace,
    settlement: Settlement,
) -> Result<(), AppError> {
    let slot = settlement.slot;
    match settlement.apply(workspace) {
        Ok(()) => {
            presenter.spinner_success(&format!("{} complete", slot));
            Ok(())
        }
        Err(failure) => {
            presenter.spinner_fail(&format!("{} failed", slot));
            Err(failure.into())
        }
    }
}

async fn read_stdin(presenter: &Presenter) -> Result<String, AppError> {
    if std::io::stdin().is_terminal() {
        presenter.info("Enter the ticket text, then Ctrl-D");
    }
    let mut text = String::new();
    tokio::io::stdin().read_to_string(&mut text).await?;
    Ok(text)
}

fn api_key(config: &AppConfig) -> Result<String, AppError> {
    config
        .api_key
        .clone()
        .filter(|key| !key.trim().is_empty())
        .ok_or(AppError::MissingApiKey)
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|e| {
        tracing::warn!(
            error = %e,
            path = %store.path().display(),
            "ignoring unreadable config file"
        );
        AppConfig::empty()
    });

    let env_config = AppConfig {
        api_key: env::var("GEMINI_API_KEY").ok().filter(|s| !s.is_empty()),
        endpoint: env::var("LAB_ASSIST_ENDPOINT").ok().filter(|s| !s.is_empty()),
        ..Default::default()
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}
