use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use staticsync::logging::init_tracing;
use staticsync::progress::CliProgressCallback;
use staticsync::shutdown::setup_signal_handlers;
use staticsync::{storage, RunOutcome, SyncConfig, SyncEngine, SyncError, Target};

fn cli() -> Command {
	Command::new("staticsync")
		.version(env!("CARGO_PKG_VERSION"))
		.about("Mirror a local directory into object storage, uploading only missing objects")
		.subcommand_required(true)
		.arg(
			Arg::new("config")
				.long("config")
				.value_name("FILE")
				.global(true)
				.value_parser(value_parser!(PathBuf))
				.help("Config file (TOML, or JSON with a .json extension)"),
		)
		.subcommand(
			Command::new("sync")
				.about("Sync a local directory with a remote prefix")
				.arg(
					Arg::new("source")
						.short('s')
						.long("source")
						.required(true)
						.value_parser(value_parser!(PathBuf))
						.help("Path to the local directory"),
				)
				.arg(
					Arg::new("target")
						.short('t')
						.long("target")
						.required(true)
						.help("Remote URL in the format scheme://bucket/path"),
				)
				.arg(
					Arg::new("lockfile")
						.short('l')
						.long("lockfile")
						.required(true)
						.help("Remote file path, relative to the target, that must not exist before sync"),
				)
				.arg(
					Arg::new("cache-control")
						.long("cache-control")
						.help("Cache-Control header value for uploaded files"),
				)
				.arg(
					Arg::new("concurrency")
						.short('c')
						.long("concurrency")
						.value_parser(value_parser!(usize))
						.help("Maximum number of files processed at once [default: 20]"),
				)
				.arg(
					Arg::new("lock-policy")
						.long("lock-policy")
						.value_parser(["after-success", "before-sync"])
						.help("When to create the lock file [default: after-success]"),
				)
				.arg(
					Arg::new("exclude")
						.short('x')
						.long("exclude")
						.action(ArgAction::Append)
						.value_name("GLOB")
						.help("Leave matching paths out of the sync (repeatable)"),
				)
				.arg(
					Arg::new("syncignore")
						.long("syncignore")
						.action(ArgAction::SetTrue)
						.help("Honor .syncignore files in the source tree"),
				)
				.arg(
					Arg::new("follow-symlinks")
						.long("follow-symlinks")
						.action(ArgAction::SetTrue)
						.help("Follow symlinks instead of skipping them"),
				)
				.arg(
					Arg::new("dry-run")
						.short('n')
						.long("dry-run")
						.action(ArgAction::SetTrue)
						.help("Only report what would be uploaded"),
				),
		)
}

/// Defaults, then config file, then environment, then flags
fn build_config(matches: &ArgMatches) -> Result<SyncConfig, SyncError> {
	let mut config = match matches.get_one::<PathBuf>("config") {
		Some(path) => SyncConfig::load(path)?,
		None => SyncConfig::default(),
	};
	config.apply_env()?;

	if let Some(value) = matches.get_one::<String>("cache-control") {
		config.cache_control = Some(value.clone());
	}
	if let Some(value) = matches.get_one::<usize>("concurrency") {
		config.concurrency = *value;
	}
	if let Some(value) = matches.get_one::<String>("lock-policy") {
		config.lock_policy = value.parse()?;
	}
	if let Some(patterns) = matches.get_many::<String>("exclude") {
		config.exclude_patterns.extend(patterns.cloned());
	}
	if matches.get_flag("syncignore") {
		config.respect_ignore_files = true;
	}
	if matches.get_flag("follow-symlinks") {
		config.follow_symlinks = true;
	}
	if matches.get_flag("dry-run") {
		config.dry_run = true;
	}

	config.validate()?;
	Ok(config)
}

async fn sync(matches: &ArgMatches, config: SyncConfig) -> Result<RunOutcome, SyncError> {
	let source = matches.get_one::<PathBuf>("source").ok_or(SyncError::InvalidConfig {
		message: "source argument is required".to_string(),
	})?;
	let lockfile = matches.get_one::<String>("lockfile").ok_or(SyncError::InvalidConfig {
		message: "lockfile argument is required".to_string(),
	})?;
	let target: Target = matches
		.get_one::<String>("target")
		.ok_or(SyncError::InvalidConfig { message: "target argument is required".to_string() })?
		.parse()?;

	if !source.is_dir() {
		return Err(SyncError::RootNotFound { path: source.clone() });
	}

	let client = storage::connect(&target, &config).await?;
	debug!("Storage client ready: {} (lock object {})", client.location(), target.key(lockfile));

	let cancel = CancellationToken::new();
	setup_signal_handlers(cancel.clone());

	let engine = SyncEngine::new(client, config)
		.with_callbacks(Arc::new(CliProgressCallback::new()))
		.with_cancel_token(cancel);
	engine.run(source, &target.prefix, lockfile).await
}

#[tokio::main]
async fn main() -> ExitCode {
	let matches = cli().get_matches();
	let Some(("sync", sub_matches)) = matches.subcommand() else {
		return ExitCode::FAILURE;
	};

	let config = match build_config(sub_matches) {
		Ok(config) => config,
		Err(e) => {
			init_tracing("info");
			error!("{}", e);
			return ExitCode::FAILURE;
		}
	};
	init_tracing(&config.log_level);
	let dry_run = config.dry_run;

	match sync(sub_matches, config).await {
		Ok(RunOutcome::Locked { key }) => {
			println!("lock file {} exists, skipping sync", key);
			ExitCode::SUCCESS
		}
		Ok(RunOutcome::Synced(summary)) if dry_run => {
			println!(
				"Dry run finished: {} file(s) would be uploaded, {} already present",
				summary.planned, summary.skipped
			);
			ExitCode::SUCCESS
		}
		Ok(RunOutcome::Synced(summary)) => {
			println!(
				"Sync finished: {} uploaded, {} skipped in {:.1}s",
				summary.uploaded,
				summary.skipped,
				summary.elapsed_ms as f64 / 1000.0
			);
			ExitCode::SUCCESS
		}
		Err(e) => {
			// Per-file errors were already reported as they happened
			error!("directory sync failed: {}", e);
			ExitCode::FAILURE
		}
	}
}

// vim: ts=4
