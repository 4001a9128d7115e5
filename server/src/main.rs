use clap::Parser;
use log::{info, warn};
use server::network::{HostCommand, HostConfig, HostSession};
use shared::Direction;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Simulation tick rate (ticks per second)
    #[arg(short, long, default_value = "10")]
    tick_rate: u32,

    /// Outcome log backing the leaderboard
    #[arg(long, default_value = "highscores.txt")]
    scores: PathBuf,
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let mut config = HostConfig::new(args.scores);
    config.tick_interval = Duration::from_millis(1000 / u64::from(args.tick_rate.max(1)));

    let (session, commands) = match HostSession::bind(&args.host, args.port, config).await {
        Ok(bound) => bound,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    info!("controls: type up/down/left/right (or w/a/s/d) to steer, quit to leave");
    spawn_input_reader(commands);

    session.run().await;
}

/// Reads steering and quit commands from stdin, standing in for the event
/// layer of the windowed build.
fn spawn_input_reader(commands: mpsc::UnboundedSender<HostCommand>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let Some(command) = parse_command(&line) else {
                if !line.trim().is_empty() {
                    warn!("unrecognized input {:?}", line.trim());
                }
                continue;
            };
            if commands.send(command).is_err() {
                break;
            }
        }
    });
}

fn parse_command(line: &str) -> Option<HostCommand> {
    let word = line.trim().to_ascii_lowercase();
    match word.as_str() {
        "quit" | "exit" => Some(HostCommand::Quit),
        _ => word
            .parse::<Direction>()
            .ok()
            .map(HostCommand::Steer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_words_parse() {
        assert_eq!(parse_command("up"), Some(HostCommand::Steer(Direction::Up)));
        assert_eq!(
            parse_command("  d "),
            Some(HostCommand::Steer(Direction::Right))
        );
        assert_eq!(parse_command("QUIT"), Some(HostCommand::Quit));
        assert_eq!(parse_command("sideways"), None);
        assert_eq!(parse_command(""), None);
    }
}
