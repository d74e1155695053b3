use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use geohunt::{GeoHunt, HuntConfig, HuntStatus, LocationEvent, Progress};

#[derive(Parser, Debug)]
#[command(
    name = "geohunt",
    version,
    about = "Replay a recorded walk through a treasure hunt course",
    long_about = "Loads a course (the built-in Nice walk when --course is omitted), replays \
                  a recorded track of position fixes against it and prints the screen the \
                  player would see after every location callback."
)]
struct Args {
    /// Recorded track (YAML list of fixes and errors)
    #[arg(short, long)]
    track: PathBuf,

    /// Course file; defaults to the built-in course
    #[arg(short, long)]
    course: Option<PathBuf>,

    /// Playback speed multiplier
    #[arg(short, long, default_value_t = 1.0)]
    speed: f64,

    /// Press "I'm here" automatically whenever the player is in the zone
    #[arg(long)]
    auto_advance: bool,

    /// Ask the provider for low-accuracy fixes
    #[arg(long)]
    no_high_accuracy: bool,

    /// Verbose output (show debug messages)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let mut config = match &args.course {
        Some(path) => HuntConfig::from_file(path)
            .with_context(|| format!("Failed to load course {}", path.display()))?,
        None => HuntConfig::default(),
    };
    if args.no_high_accuracy {
        config.watch.high_accuracy = false;
    }

    let mut session = GeoHunt::replay(&config, &args.track, args.speed)
        .with_context(|| format!("Failed to replay {}", args.track.display()))?;

    info!("{} ({} checkpoints)", config.title, session.course().len());
    println!("{}\n", session.screen());
    session.start();
    println!("{}\n", session.screen());

    while let Some(event) = session.next_event().await {
        if let LocationEvent::Error(message) = &event {
            warn!("Recorded location error: {}", message);
        }

        if args.auto_advance && session.state().in_zone {
            match session.advance() {
                Progress::Next(index) => info!("Unlocked checkpoint {}", index + 1),
                Progress::Finished => info!("Last checkpoint reached"),
                Progress::Ignored => {}
            }
        }

        println!("{}\n", session.screen());
        if session.state().status == HuntStatus::Finished {
            break;
        }
    }

    let state = session.state();
    if state.status != HuntStatus::Finished {
        info!(
            "Track ended at checkpoint {}/{}",
            state.current_index + 1,
            session.course().len()
        );
    }
    Ok(())
}
