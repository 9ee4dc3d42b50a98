use crate::config::{self, ConfigOverrides, TransportConfig};
use crate::dispatch::{GoalDispatcher, OutputSink, ProcessTransport};
use crate::error::ReportedFailure;
use crate::model::{round_coordinate, GoalRequest};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "nav-goal",
    version,
    about = "Send a NavigateToGoal action goal to a multi-map navigation stack, with optional TUI"
)]
pub struct Cli {
    /// Target map identifier (e.g. map2)
    #[arg(long)]
    pub map: Option<String>,

    /// Target X coordinate, in [-1000, 1000]
    #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub x: f64,

    /// Target Y coordinate, in [-1000, 1000]
    #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub y: f64,

    /// Topic to publish the goal on [default: /navigate_to_goal/goal]
    #[arg(long)]
    pub topic: Option<String>,

    /// Message type name [default: multi_map_nav/NavigateToGoalActionGoal]
    #[arg(long)]
    pub message_type: Option<String>,

    /// Publish command, whitespace separated; {topic}, {type} and {payload} are substituted
    /// [default: "rostopic pub -1 {topic} {type} {payload}"]
    #[arg(long, value_name = "COMMAND")]
    pub transport_command: Option<String>,

    /// JSON config file (defaults to <config dir>/nav-goal/config.json when present)
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,

    /// Send one goal, print a JSON report and exit (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Send one goal, print a text summary and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Run silently: suppress all output except errors (for scripts)
    #[arg(long)]
    pub silent: bool,

    /// Build and show the payload without publishing it
    #[arg(long)]
    pub dry_run: bool,

    /// Append logs to this file (the only log sink while the TUI is open)
    #[arg(long)]
    pub log_file: Option<std::path::PathBuf>,
}

impl Cli {
    pub fn is_interactive(&self) -> bool {
        !(self.silent || self.json || self.text)
    }

    fn config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            topic: self.topic.clone(),
            message_type: self.message_type.clone(),
            transport_command: self
                .transport_command
                .as_deref()
                .map(|c| c.split_whitespace().map(str::to_string).collect()),
        }
    }

    /// The goal described by the command line, at input-layer precision.
    pub fn goal_request(&self) -> GoalRequest {
        GoalRequest::new(
            self.map.clone().unwrap_or_default(),
            round_coordinate(self.x),
            round_coordinate(self.y),
        )
    }
}

pub async fn run(args: Cli) -> Result<()> {
    // Validate that --silent can only be used with --json
    if args.silent && !args.json {
        return Err(anyhow::anyhow!(
            "--silent can only be used with --json. Use --silent --json together."
        ));
    }

    crate::logging::init(args.is_interactive(), args.log_file.as_deref())?;

    let cfg = build_config(&args)?;

    if args.is_interactive() {
        #[cfg(feature = "tui")]
        {
            // The TUI owns the terminal; publisher output would corrupt it.
            let dispatcher = build_dispatcher(&cfg, OutputSink::Discard);
            return crate::tui::run(args, dispatcher).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            let dispatcher = build_dispatcher(&cfg, OutputSink::Inherit);
            return run_once(args, dispatcher, OutputMode::Text).await;
        }
    }

    let dispatcher = build_dispatcher(&cfg, OutputSink::Inherit);
    let mode = if args.silent {
        OutputMode::Silent
    } else if args.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };
    run_once(args, dispatcher, mode).await
}

/// Resolve the transport configuration from defaults, config file and flags.
pub fn build_config(args: &Cli) -> Result<TransportConfig> {
    config::resolve(args.config.as_deref(), args.config_overrides())
        .context("invalid configuration")
}

pub fn build_dispatcher(
    cfg: &TransportConfig,
    output: OutputSink,
) -> GoalDispatcher<ProcessTransport> {
    let transport = ProcessTransport::new(cfg.transport_command.clone()).with_output(output);
    tracing::debug!(command = ?transport.template(), ?output, "publisher configured");
    GoalDispatcher::new(cfg.topic.clone(), cfg.message_type.clone(), transport)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Text,
    Json,
    Silent,
}

/// Send the goal given on the command line and report the outcome.
async fn run_once(
    args: Cli,
    dispatcher: GoalDispatcher<ProcessTransport>,
    mode: OutputMode,
) -> Result<()> {
    let request = args.goal_request();
    let dry_run = args.dry_run;
    let report = tokio::task::spawn_blocking(move || {
        crate::orchestrator::send_goal(&dispatcher, &request, dry_run)
    })
    .await
    .context("dispatch task failed")?;

    if mode != OutputMode::Silent {
        let (out_tx, out_handle) = spawn_output_writer();
        match mode {
            OutputMode::Json => {
                let out = serde_json::to_string_pretty(&report)?;
                let _ = out_tx.send(OutputLine::Stdout(out));
            }
            _ => {
                let summary = crate::text_summary::build_text_summary(&report);
                for line in summary.lines {
                    let _ = out_tx.send(OutputLine::Stdout(line));
                }
                let _ = out_tx.send(OutputLine::Stderr(format!(
                    "Finished: {}",
                    report.timestamp_utc
                )));
            }
        }
        drop(out_tx);
        let _ = out_handle.await;
    }

    match report.outcome.failure_reason() {
        None => Ok(()),
        // Silent mode printed nothing, so main still has to show the reason.
        Some(reason) if mode == OutputMode::Silent => Err(anyhow::anyhow!(reason.to_string())),
        Some(reason) => Err(ReportedFailure(reason.to_string()).into()),
    }
}
