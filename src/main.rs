//! creature-notifier CLI
//!
//! Loads the settings once, then evaluates either a single event file or a
//! stream of newline-delimited events from stdin.

use std::fs;
use std::io;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{info, warn};

use creature_notifier::app::config::Config;
use creature_notifier::app::logging::init_logging;
use creature_notifier::app::slack::{SlackPoster, StdoutPoster};
use creature_notifier::core::{CreatureEvent, MessagePoster, Notifier, Outcome, Settings};

mod cli;
use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    init_logging(&config.logging, cli.verbose)?;

    let settings = config.into_settings(cli.origin)?;
    info!(origin = %settings.origin, dry_run = cli.dry_run, "creature-notifier starting");

    if cli.dry_run {
        run(&cli, &settings, StdoutPoster)
    } else {
        let poster = SlackPoster::new(&settings).context("setting up Slack delivery")?;
        run(&cli, &settings, poster)
    }
}

fn run<P: MessagePoster>(cli: &Cli, settings: &Settings, poster: P) -> Result<()> {
    let notifier = Notifier::new(settings, poster);

    let Some(path) = &cli.event else {
        notifier
            .run_lines(io::stdin().lock(), Local::now)
            .context("reading events from stdin")?;
        return Ok(());
    };

    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let event = CreatureEvent::from_json(&json)?;

    match notifier.handle(&event, &Local::now())? {
        Outcome::Skipped(reason) => {
            info!(name = %event.name, ?reason, "Not notified");
        }
        Outcome::Posted { delivery, .. } if delivery.ok => {
            info!(name = %event.name, "Notified");
        }
        Outcome::Posted { delivery, .. } => {
            warn!(
                name = %event.name,
                error = delivery.error.as_deref().unwrap_or("unknown"),
                "Chat service rejected message"
            );
        }
    }
    Ok(())
}
