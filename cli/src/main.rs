mod cli;
mod utils;

use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ghsync::config::{token_from_env, ConfigError, ConfigFile, SyncConfig};
use ghsync::github::GithubClient;
use ghsync::ops::{self, SyncReport};
use ghsync::utils::error::SyncError;
use ghsync::utils::logger;

use crate::cli::Cli;
use crate::utils::progress::MultiProgress;

fn main() -> ExitCode {
    // usage errors exit with code 2 here, before anything else happens
    let cli = Cli::parse();

    if let Err(e) = utils::logger::init_log(cli.verbose) {
        eprintln!("init logger failed: {:#}", e);
    }
    dotenvy::dotenv().ok();

    match exec(cli) {
        Ok(report) => {
            let summary = ops::render(&report);
            match report.has_failures() {
                true => {
                    eprintln!("{}", summary);
                    ExitCode::FAILURE
                }
                false => {
                    println!("{}", summary);
                    ExitCode::SUCCESS
                }
            }
        }
        Err(e) => {
            logger::error(format!("{:#}", e));
            if let Some(SyncError::List(list_error)) = e.downcast_ref::<SyncError>() {
                if list_error.is_authentication() {
                    logger::error("Check that GITHUB_API_TOKEN holds a valid token with repo scope");
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn exec(cli: Cli) -> anyhow::Result<SyncReport> {
    let token = token_from_env().ok_or(ConfigError::MissingToken)?;

    let mut config = SyncConfig::new(token, &cli.directory);
    if let Some(path) = &cli.config {
        config.merge_file(ConfigFile::load(path)?);
    }
    cli.apply(&mut config);
    config.validate()?;
    logger::debug(format!("{:?}", config));

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
        logger::warn("Interrupted, finishing running repositories (press Ctrl-C again to abort)");
    })
    .context("install Ctrl-C handler failed")?;

    let client = GithubClient::new(&config)?;
    let report = ops::sync_repos(&config, &client, MultiProgress::default(), &cancel)?;
    Ok(report)
}
