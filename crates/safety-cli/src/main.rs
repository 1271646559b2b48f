//! Safety Check CLI
//!
//! Usage:
//!   safety-check assess --fences data/geofences.json --lat 28.62 --lng 77.21
//!   safety-check dispatch --teams data/teams.json --lat 28.62 --lng 77.21 \
//!                         --output data/teams_after.json

use anyhow::Result;
use clap::{Parser, Subcommand};
use emergency_response::dispatch;
use geo_primitives::Coordinate;
use safety_cli::loader;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "safety-check",
    about = "Assess tourist positions against geofences and plan emergency dispatch"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report the highest-risk zone containing a position
    Assess {
        /// Path to geofences JSON file
        #[arg(short, long, default_value = "data/geofences.json")]
        fences: PathBuf,

        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },
    /// Dispatch every available team to an incident, nearest first
    Dispatch {
        /// Path to response teams JSON file
        #[arg(short, long, default_value = "data/teams.json")]
        teams: PathBuf,

        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lng: f64,

        /// Write dispatch records and the updated roster here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Assess { fences, lat, lng } => {
            let point = Coordinate::new(lat, lng)?;
            let fences = loader::load_geofences(&fences)?;

            let assessment = geofencing::assess(point, &fences);
            info!(
                "Assessment at {:.6}, {:.6}: {} (level {}/10)",
                lat, lng, assessment.kind, assessment.level
            );

            println!("{}", serde_json::to_string_pretty(&assessment)?);
        }
        Command::Dispatch {
            teams,
            lat,
            lng,
            output,
        } => {
            let incident = Coordinate::new(lat, lng)?;
            let mut roster = loader::load_teams(&teams)?;

            let records = dispatch(incident, &mut roster);
            for record in &records {
                info!(
                    "  {:12} | {:10} | ETA {} min",
                    record.team_id, record.team_kind, record.eta_minutes
                );
            }
            if records.is_empty() {
                info!("No available teams to dispatch");
            }

            match output {
                Some(path) => {
                    info!("Writing dispatch plan to {:?}", path);
                    let file = File::create(&path)?;
                    let writer = BufWriter::new(file);
                    serde_json::to_writer_pretty(
                        writer,
                        &serde_json::json!({
                            "dispatched": records,
                            "teams": roster,
                        }),
                    )?;
                }
                None => println!("{}", serde_json::to_string_pretty(&records)?),
            }
        }
    }

    Ok(())
}
