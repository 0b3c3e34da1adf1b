mod config;
mod engine_select;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use orcharden_core::SystemClock;
use orcharden_engine::Engine;
use orcharden_graph::TaskGraphStore;
use orcharden_integrate::run_integration_pipeline;
use orcharden_run::{run_coordinator_loop, RunConfig, RunDirectory, SupervisorConfig};
use orcharden_vcs::GitVcs;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::load_config;
use crate::engine_select::resolve_engine;

#[derive(Parser)]
#[command(name = "orcharden", about = "Parallel task orchestrator for autonomous coding agents")]
struct Cli {
    /// Path to the run-config file.
    #[arg(long, default_value = "orcharden.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a task graph to completion, then integrate the result.
    Run {
        /// Identifier for this PRD/run, used for the artifacts and
        /// worktree layout.
        prd_id: String,
        /// Path to the task-graph YAML file.
        #[arg(long)]
        tasks: PathBuf,
        /// Which engine adapter to invoke: a, b, c, or d.
        #[arg(long)]
        engine: Option<String>,
        #[arg(long)]
        concurrency: Option<usize>,
        #[arg(long)]
        retries: Option<u32>,
        #[arg(long)]
        retry_delay: Option<u64>,
        #[arg(long)]
        external_failure_timeout: Option<u64>,
        #[arg(long)]
        base_branch: Option<String>,
        /// Print the admission order the scheduler would take and exit
        /// without invoking any engine or touching the repository.
        #[arg(long)]
        dry_run: bool,
        /// Push-mode: leave completed task branches open for a change
        /// request instead of running the integration pipeline. This
        /// workspace's VCS port has no remote-push operation, so the flag
        /// only changes whether integration runs.
        #[arg(long)]
        create_change_request: bool,
        /// Resume a previously started run: tasks already marked
        /// `completed` in the graph are skipped.
        #[arg(long)]
        resume: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config).await?;

    let exit_code = match cli.command {
        Commands::Run {
            prd_id,
            tasks,
            engine,
            concurrency,
            retries,
            retry_delay,
            external_failure_timeout,
            base_branch,
            dry_run,
            create_change_request,
            resume,
        } => {
            run_command(
                &config,
                prd_id,
                tasks,
                engine,
                concurrency,
                retries,
                retry_delay,
                external_failure_timeout,
                base_branch,
                dry_run,
                create_change_request,
                resume,
            )
            .await?
        }
    };

    std::process::exit(exit_code);
}

#[allow(clippy::too_many_arguments)]
async fn run_command(
    config: &config::OrchardenConfig,
    prd_id: String,
    tasks_path: PathBuf,
    engine: Option<String>,
    concurrency: Option<usize>,
    retries: Option<u32>,
    retry_delay: Option<u64>,
    external_failure_timeout: Option<u64>,
    base_branch: Option<String>,
    dry_run: bool,
    create_change_request: bool,
    resume: bool,
) -> anyhow::Result<i32> {
    let engine_name = engine.unwrap_or_else(|| config.run.engine.clone());
    let concurrency = concurrency.unwrap_or(config.run.concurrency);
    let retries = retries.unwrap_or(config.run.retries);
    let retry_delay_ms = retry_delay.unwrap_or(config.run.retry_delay_ms);
    let external_failure_timeout_secs =
        external_failure_timeout.unwrap_or(config.run.external_failure_timeout_secs);
    let base_branch = base_branch.unwrap_or_else(|| config.run.base_branch.clone());
    let repo_root = config.run.repo_root.clone().unwrap_or_else(|| PathBuf::from("."));

    let mut store = TaskGraphStore::load(&tasks_path).await?;
    if !resume {
        let already_completed = store.tasks().iter().any(|t| t.completed);
        if already_completed {
            warn!(
                "task graph has already-completed tasks but --resume wasn't passed; they will still be skipped"
            );
        }
    }

    if dry_run {
        print_dry_run_plan(&store);
        return Ok(0);
    }

    let engine_adapter: Arc<dyn Engine> = resolve_engine(&engine_name)?;
    let vcs = Arc::new(GitVcs::new(repo_root.clone()));
    let clock = Arc::new(SystemClock);

    let run_dir = RunDirectory::new(config.run.artifacts_root.clone(), &prd_id);
    run_dir.ensure_dirs().await?;
    let worktrees_root = config.run.worktrees_root.clone();

    let run_config = RunConfig {
        max_concurrent: concurrency.max(1),
        base_branch: base_branch.clone(),
        external_failure_timeout: Duration::from_secs(external_failure_timeout_secs),
        supervisor: SupervisorConfig {
            max_retries: retries,
            retry_delay: Duration::from_millis(retry_delay_ms),
            push_mode: create_change_request,
        },
    };

    info!(prd_id = %prd_id, engine = %engine_name, concurrency, "starting run");

    let summary = tokio::select! {
        result = run_coordinator_loop(&mut store, engine_adapter, vcs.clone(), clock, &run_dir, worktrees_root, run_config) => {
            result?
        }
        _ = wait_for_shutdown_signal() => {
            warn!("interrupted; already-running supervisors will finish their current attempt");
            return Ok(130);
        }
    };

    if summary.deadlocked {
        error!("run deadlocked: the following tasks cannot proceed");
        for task in store.tasks() {
            if !task.completed {
                info!(task = %task.id, "pending task with no path to admission");
            }
        }
        return Ok(1);
    }

    if summary.externally_failed {
        error!("run stopped after an external failure; see task reports for details");
        return Ok(2);
    }

    let completed_count = summary.reports.iter().filter(|r| r.status == orcharden_run::ReportStatus::Done).count();
    if completed_count == 0 {
        info!("no tasks completed; skipping integration");
        return Ok(0);
    }
    if create_change_request {
        info!("push-mode is enabled; skipping the integration pipeline so branches stay open for a change request");
        return Ok(0);
    }

    let reviewer: Arc<dyn Engine> = resolve_engine(&engine_name)?;
    let integration_worktree = worktrees_root_join(&config.run.worktrees_root, &prd_id);
    let integration_branch = format!("integration/{prd_id}");

    let reports_summary = summarize_reports(&summary.reports);
    let outcome = run_integration_pipeline(
        vcs.as_ref(),
        reviewer.as_ref(),
        reviewer.as_ref(),
        &mut store,
        &base_branch,
        &integration_branch,
        &integration_worktree,
        &reports_summary,
    )
    .await?;

    match outcome {
        orcharden_integrate::IntegrationOutcome::MergeIncomplete { records } => {
            error!(unresolved = ?records, "integration left unresolved merge conflicts");
            Ok(3)
        }
        orcharden_integrate::IntegrationOutcome::Finalized { finalize, .. } => {
            info!(outcome = ?finalize, "integration finalized");
            Ok(0)
        }
    }
}

fn worktrees_root_join(worktrees_root: &std::path::Path, prd_id: &str) -> PathBuf {
    worktrees_root.join("integration").join(prd_id)
}

fn summarize_reports(reports: &[orcharden_run::Report]) -> String {
    reports
        .iter()
        .map(|r| format!("- {} ({:?}, {} commit(s))", r.task_id, r.status, r.commits))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wait for Ctrl-C or, on Unix, `SIGTERM`/`SIGHUP`. Matches the pack's
/// Unix-oriented toolchain — there is no Windows-specific signal path
/// anywhere in this workspace.
#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let sigterm = signal(SignalKind::terminate());
    let sighup = signal(SignalKind::hangup());
    match (sigterm, sighup) {
        (Ok(mut sigterm), Ok(mut sighup)) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
                _ = sighup.recv() => {}
            }
        }
        _ => {
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn print_dry_run_plan(store: &TaskGraphStore) {
    println!("Dry run: no engine invoked, no repository mutated.");
    for task in store.tasks() {
        let status = if task.completed { "completed" } else { "pending" };
        println!("  [{status}] {} — {}", task.id, task.title);
        if !task.depends_on.is_empty() {
            println!("    depends on: {}", task.depends_on.join(", "));
        }
        let locks = orcharden_graph::effective_locks(task);
        if !locks.is_empty() {
            println!("    locks: {}", locks.join(", "));
        }
    }
}
