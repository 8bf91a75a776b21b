// CLI definitions using clap

use clap::Parser;
use std::path::PathBuf;

use creature_notifier::app::config::Config;
use creature_notifier::core::GeoPoint;

#[derive(Parser)]
#[command(name = "creature-notifier")]
#[command(author, version, about = "Post nearby creature sightings to Slack")]
pub struct Cli {
    /// Config file (.toml, or .json for the legacy format)
    #[arg(short, long, value_name = "FILE", default_value = Config::CONFIG_FILENAME)]
    pub config: PathBuf,

    /// Origin to measure distances from, as LAT,LNG (overrides [origin])
    #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true)]
    pub origin: Option<GeoPoint>,

    /// Print messages to stdout instead of posting them
    #[arg(long)]
    pub dry_run: bool,

    /// Log every filter decision
    #[arg(short, long)]
    pub verbose: bool,

    /// Event JSON file; reads newline-delimited events from stdin when omitted
    #[arg(value_name = "EVENT")]
    pub event: Option<PathBuf>,
}
