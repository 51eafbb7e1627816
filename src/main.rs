//! git-publish - save and publish your work in one command.

mod cli;
mod config;
mod logger;
mod utils;
mod workflow;

use clap::{ColorChoice, Parser};
use cli::{Cli, StdinPrompt};
use config::PublishConfig;
use workflow::Outcome;

fn main() {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = match PublishConfig::load(&cli) {
        Ok(config) => config,
        Err(err) => fail(
            &err,
            &format!("Check `{}` and the command-line options.", cli.config.display()),
        ),
    };
    log!("publish"; "project directory: {}", config.root.display());

    match workflow::publish(&config, &mut StdinPrompt) {
        Ok(Outcome::Clean) => {}
        Ok(Outcome::Published { branch, message }) => {
            log!("done"; "published \"{}\" to origin/{}", message, branch);
        }
        Err(err) => fail(&err, &workflow::hint_for(&err, &config.branch)),
    }
}

/// Report a fatal error with a remediation hint and exit with status 1.
fn fail(err: &anyhow::Error, hint: &str) -> ! {
    log!("error"; "{:#}", err);
    log!("hint"; "{}", hint);
    std::process::exit(1)
}
