use clap::Parser;
use client::network::{GuestConfig, GuestSession};
use log::{error, info, warn};
use shared::{Direction, Winner};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1")]
    server: String,

    /// Server port to connect to
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Connection timeout in seconds
    #[arg(long, default_value = "5")]
    timeout: u64,
}

/// Input read from stdin, standing in for the event layer of the windowed
/// build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UiCommand {
    Steer(Direction),
    Restart,
    Quit,
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    info!("joining {}:{}", args.server, args.port);

    let config = GuestConfig {
        connect_timeout: Duration::from_secs(args.timeout.max(1)),
        ..GuestConfig::default()
    };

    let mut session = match GuestSession::connect(&args.server, args.port, config).await {
        Ok(session) => session,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    info!("controls: type up/down/left/right (or w/a/s/d) to steer, restart or quit after a game");
    let mut commands = spawn_input_reader();
    let mut last_scores = None;

    'rounds: loop {
        session.countdown().await;

        let final_state = loop {
            loop {
                match commands.try_recv() {
                    Ok(UiCommand::Steer(direction)) => {
                        session.set_direction(direction);
                    }
                    Ok(UiCommand::Quit) => break 'rounds,
                    Ok(UiCommand::Restart) => {}
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => break 'rounds,
                }
            }

            match session.tick().await {
                Ok(state) => {
                    let scores_now = (state.score1, state.score2);
                    if last_scores != Some(scores_now) {
                        info!("score: host {} - you {}", state.score1, state.score2);
                        last_scores = Some(scores_now);
                    }
                    log::debug!("snapshot: {:?}", state);
                    if state.game_over {
                        break state;
                    }
                }
                Err(e) => {
                    error!("match ended: {}", e);
                    session.close().await;
                    return;
                }
            }
        };

        match final_state.winner {
            Some(Winner::Draw) => info!("game over: a draw"),
            Some(winner) => info!("game over: {} wins", winner),
            None => warn!("game over without a winner label"),
        }
        info!("type restart to play again, quit to leave");

        loop {
            match commands.recv().await {
                Some(UiCommand::Restart) => match session.request_restart().await {
                    Ok(()) => continue 'rounds,
                    Err(e) => {
                        error!("{}", e);
                        break 'rounds;
                    }
                },
                Some(UiCommand::Quit) | None => break 'rounds,
                Some(UiCommand::Steer(_)) => {}
            }
        }
    }

    session.close().await;
}

fn spawn_input_reader() -> mpsc::UnboundedReceiver<UiCommand> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let Some(command) = parse_command(&line) else {
                if !line.trim().is_empty() {
                    warn!("unrecognized input {:?}", line.trim());
                }
                continue;
            };
            if tx.send(command).is_err() {
                break;
            }
        }
    });
    rx
}

fn parse_command(line: &str) -> Option<UiCommand> {
    let word = line.trim().to_ascii_lowercase();
    match word.as_str() {
        "quit" | "exit" => Some(UiCommand::Quit),
        "restart" => Some(UiCommand::Restart),
        _ => word.parse::<Direction>().ok().map(UiCommand::Steer),
    }
}
