//! Interactive terminal front-end for the Quantum-Morph wizard.
//!
//! The conversation is printed to stdout; logs go to stderr. Plain input
//! answers the current step (a number picks a listed option). Slash
//! commands control the session:
//!
//! - `/back` `/reset` `/retry`
//! - `/history` `/load <id>` `/delete <id>` `/compare <id> <id>`
//! - `/export json|report`
//! - `/quit`

use std::error::Error;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use quantum_morph::adapters::{
    FileKeyValueStore, FileReportExporter, HttpOptimizerClient, HttpOptimizerConfig,
    StoredExperimentHistory,
};
use quantum_morph::application::{
    ControllerError, JobOutcome, Rehydrated, Turn, WizardController, WizardPersistence,
};
use quantum_morph::config::{AppConfig, LogFormat, LoggingConfig};
use quantum_morph::domain::foundation::{EntryId, ExperimentId, Timestamp};
use quantum_morph::domain::wizard::{EntryRole, WizardError, WizardSession};
use quantum_morph::ports::{KeyValueStore, ReportExporter};

const HELP: &str = "Commands: /back /reset /retry /history /load <id> /delete <id> \
/compare <id> <id> /export json|report /quit";

type Pending = Option<JoinHandle<Result<Option<JobOutcome>, ControllerError>>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.logging)?;

    tracing::info!(optimizer = %config.optimizer.base_url, "starting quantum-morph");

    let store: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(&config.storage.data_dir));
    let optimizer = HttpOptimizerClient::new(
        HttpOptimizerConfig::new(config.optimizer.base_url.clone())
            .with_secret_api_key(config.optimizer.api_key.clone())
            .with_timeout(config.optimizer.request_timeout()),
    )?;
    let history = StoredExperimentHistory::with_limit(store.clone(), config.storage.history_limit);
    let exporter = FileReportExporter::new(&config.storage.export_dir);

    let controller = WizardController::new(
        WizardPersistence::new(store),
        Arc::new(optimizer),
        Arc::new(history),
        config.optimizer.poll_policy(),
    );

    let mut transcript = Transcript::default();
    let mut pending: Pending = None;

    match controller.rehydrate().await {
        Rehydrated::ResumePolling(handle) => {
            println!("Resuming job {}...", handle.job_id);
            let resumed = controller.clone();
            pending = Some(tokio::spawn(async move { Ok(resumed.resume().await) }));
        }
        Rehydrated::Completed | Rehydrated::Restored => println!("Restored previous session."),
        Rehydrated::Fresh => {}
    }
    transcript.show(&controller.snapshot().await);
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            finished = wait(&mut pending), if pending.is_some() => {
                pending = None;
                match finished {
                    Ok(Ok(Some(JobOutcome::Cancelled))) => println!("(job cancelled)"),
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => println!("{e}"),
                    Err(e) => tracing::error!(error = %e, "wizard task panicked"),
                }
                transcript.show(&controller.snapshot().await);
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "/quit" {
                    break;
                }
                if let Some(command) = line.strip_prefix('/') {
                    run_command(command, &controller, &exporter, &mut pending).await;
                } else {
                    answer(line, &controller, &mut pending).await;
                }
                transcript.show(&controller.snapshot().await);
            }
        }
    }

    if pending.is_some() {
        println!("A job is still running; it will resume on next start.");
    }
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.log_format()? {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?,
    }
    Ok(())
}

async fn wait(
    pending: &mut Pending,
) -> Result<Result<Option<JobOutcome>, ControllerError>, tokio::task::JoinError> {
    match pending {
        Some(task) => task.await,
        None => std::future::pending().await,
    }
}

/// Answers run in their own task so a final answer that submits a job
/// does not block `/reset`.
async fn answer(line: &str, controller: &WizardController, pending: &mut Pending) {
    if pending.is_some() {
        println!("Still processing, please wait or /reset.");
        return;
    }
    let session = controller.snapshot().await;
    let input = pick_option(&session, line);
    let controller = controller.clone();
    let task = tokio::spawn(async move {
        controller.handle_input(&input).await.map(|turn| match turn {
            Turn::Finished(outcome) => Some(outcome),
            _ => None,
        })
    });
    settle(task, pending).await;
}

/// Waits briefly so quick turns print in order; a turn that is still
/// running afterwards is a job and stays pending.
async fn settle(
    mut task: JoinHandle<Result<Option<JobOutcome>, ControllerError>>,
    pending: &mut Pending,
) {
    match tokio::time::timeout(std::time::Duration::from_millis(200), &mut task).await {
        Ok(Ok(Ok(_))) => {}
        Ok(Ok(Err(e))) => println!("{}", describe(&e)),
        Ok(Err(e)) => tracing::error!(error = %e, "wizard task panicked"),
        Err(_) => *pending = Some(task),
    }
}

async fn run_command(
    command: &str,
    controller: &WizardController,
    exporter: &FileReportExporter,
    pending: &mut Pending,
) {
    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();

    match (name, arg) {
        ("back", _) => match controller.go_back().await {
            Ok(true) => {}
            Ok(false) => println!("Nothing to go back to."),
            Err(e) => println!("{}", describe(&e)),
        },
        ("reset", _) => {
            controller.reset().await;
            if let Some(task) = pending.take() {
                let _ = task.await;
            }
            println!("Started over.");
        }
        ("retry", _) => {
            if pending.is_some() {
                println!("Still processing, please wait or /reset.");
                return;
            }
            let retried = controller.clone();
            let task = tokio::spawn(async move {
                retried.retry_submission().await.map(|turn| match turn {
                    Turn::Finished(outcome) => Some(outcome),
                    _ => None,
                })
            });
            settle(task, pending).await;
        }
        ("history", _) => match controller.history_list().await {
            Ok(records) if records.is_empty() => println!("No saved experiments."),
            Ok(records) => {
                for record in records {
                    println!("{}  {}", record.id, record.summary());
                }
            }
            Err(e) => println!("{e}"),
        },
        ("load", Some(id)) => match id.parse::<ExperimentId>() {
            Ok(id) => {
                if let Err(e) = controller.load_experiment(id).await {
                    println!("{e}");
                }
            }
            Err(_) => println!("Not an experiment id: {id}"),
        },
        ("delete", Some(id)) => match id.parse::<ExperimentId>() {
            Ok(id) => match controller.delete_experiment(id).await {
                Ok(()) => println!("Deleted {id}."),
                Err(e) => println!("{e}"),
            },
            Err(_) => println!("Not an experiment id: {id}"),
        },
        ("compare", Some(first)) => {
            let ids = (first.parse::<ExperimentId>(), parts.next().map(str::parse::<ExperimentId>));
            match ids {
                (Ok(a), Some(Ok(b))) => match controller.compare_experiments(a, b).await {
                    Ok(comparison) => println!("{comparison}"),
                    Err(e) => println!("{e}"),
                },
                _ => println!("Usage: /compare <id> <id>"),
            }
        }
        ("export", Some(kind @ ("json" | "report"))) => {
            let session = controller.snapshot().await;
            let Some(result) = session.result() else {
                println!("No result to export yet.");
                return;
            };
            let name = format!("quantum_morph_{}", Timestamp::now().timestamp_millis());
            let written = if kind == "json" {
                exporter.export_json(result, &name).await
            } else {
                exporter.export_report(result, &name).await
            };
            match written {
                Ok(path) => println!("Exported to {}", path.display()),
                Err(e) => println!("{e}"),
            }
        }
        _ => println!("{HELP}"),
    }
}

fn describe(error: &ControllerError) -> String {
    match error {
        ControllerError::Wizard(WizardError::Busy) => {
            "Still processing, please wait or /reset.".to_string()
        }
        ControllerError::Wizard(WizardError::AlreadyComplete) => {
            "This experiment is complete. Use /reset to start a new one.".to_string()
        }
        other => other.to_string(),
    }
}

/// Maps "2" to the second option of the current step.
fn pick_option(session: &WizardSession, line: &str) -> String {
    let options = session.step().options().unwrap_or_default();
    match line.parse::<usize>() {
        Ok(n) if (1..=options.len()).contains(&n) => options[n - 1].to_string(),
        _ => line.to_string(),
    }
}

/// Prints log entries not yet shown.
#[derive(Default)]
struct Transcript {
    first: Option<EntryId>,
    shown: usize,
}

impl Transcript {
    fn show(&mut self, session: &WizardSession) {
        let entries = session.log().entries();
        let first = entries.first().map(|e| e.id);
        if first != self.first {
            self.first = first;
            self.shown = 0;
        } else if entries.len() < self.shown {
            // rewound by /back: repeat the current prompt
            self.shown = entries.len().saturating_sub(1);
        }
        for entry in &entries[self.shown..] {
            match entry.role {
                EntryRole::User => println!("> {}", entry.content),
                EntryRole::Assistant => {
                    println!("\n{}", entry.content);
                    for (i, option) in entry.options.iter().flatten().enumerate() {
                        println!("  {}. {}", i + 1, option);
                    }
                }
            }
        }
        self.shown = entries.len();
        println!("[progress {}%]", session.progress_percent());
    }
}
