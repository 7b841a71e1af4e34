// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Weft command line interface: one transformation session per invocation.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use weft_client::{SessionConfig, SessionController, SessionStatus, DEFAULT_ENDPOINT};
use weft_core::{Framework, Stage};

/// Generate UI code from a screenshot.
#[derive(Parser, Debug)]
#[command(name = "weft", about = "Generate UI code from a screenshot", version)]
struct Args {
	/// Path to the screenshot (png, jpeg, gif, webp, or bmp)
	image: PathBuf,

	/// Target framework for the generated code
	#[arg(long, default_value = "react")]
	framework: Framework,

	/// Backend WebSocket endpoint
	#[arg(long, env = "WEFT_SERVER", default_value = DEFAULT_ENDPOINT)]
	server: String,

	/// Where to write the artifact; defaults to a name chosen by framework
	#[arg(long)]
	output: Option<PathBuf>,

	/// Seconds of server silence tolerated before giving up
	#[arg(long, default_value_t = 120)]
	timeout: u64,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.with_writer(std::io::stderr)
		.init();

	let args = Args::parse();

	let image = std::fs::read(&args.image)
		.with_context(|| format!("failed to read image {}", args.image.display()))?;

	let config = SessionConfig::new(&args.server)
		.with_context(|| format!("invalid server endpoint {}", args.server))?
		.with_idle_timeout(Duration::from_secs(args.timeout));

	let mut controller = SessionController::new(config);
	let progress = spawn_progress_printer(&controller);

	if let Err(e) = controller.start(&image, args.framework).await {
		eprintln!("error: {e}");
		return Ok(ExitCode::FAILURE);
	}

	let outcome = tokio::select! {
		status = controller.run() => Some(status?),
		_ = tokio::signal::ctrl_c() => None,
	};

	let code = match outcome {
		Some(SessionStatus::Complete) => {
			let path = args
				.output
				.unwrap_or_else(|| PathBuf::from(args.framework.output_filename()));
			let artifact = controller.state().final_artifact();
			std::fs::write(&path, &artifact)
				.with_context(|| format!("failed to write {}", path.display()))?;
			println!("Wrote {} ({} bytes)", path.display(), artifact.len());
			ExitCode::SUCCESS
		}
		Some(_) => {
			if let Some(line) = controller.state().log.last() {
				eprintln!("session failed: {line}");
			} else {
				eprintln!("session failed");
			}
			if !controller.state().artifact.is_empty() {
				eprintln!("(partial artifact was generated before the failure; rerun to retry)");
			}
			ExitCode::FAILURE
		}
		None => {
			eprintln!("interrupted, closing session");
			controller.reset().await;
			ExitCode::from(130)
		}
	};

	drop(controller);
	let _ = progress.await;
	Ok(code)
}

/// Print stage transitions and new log lines as snapshots arrive.
fn spawn_progress_printer(controller: &SessionController) -> tokio::task::JoinHandle<()> {
	let mut rx = controller.subscribe();
	tokio::spawn(async move {
		let mut printed = 0usize;
		let mut last_stage: Option<Stage> = None;
		while rx.changed().await.is_ok() {
			let (stage, lines) = {
				let state = rx.borrow_and_update();
				printed = printed.min(state.log.len());
				let lines: Vec<String> = state.log.iter().skip(printed).cloned().collect();
				(state.current_stage, lines)
			};
			if stage != last_stage {
				if let Some(stage) = stage {
					eprintln!("==> {}", stage.label());
				}
				last_stage = stage;
			}
			for line in &lines {
				eprintln!("    {line}");
			}
			printed += lines.len();
		}
	})
}
