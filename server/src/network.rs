//! Host-side session driver: listener, accept polling, background receive
//! task, fixed-tick broadcast loop, and the restart handshake.

use crate::game::MatchSim;
use crate::scores::{ScoreLog, LEADERBOARD_SIZE};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::session::run_countdown;
use shared::{
    read_packet, write_packet, BindError, Direction, Packet, Phase, Role, Session,
    TransportError, ACCEPT_POLL_INTERVAL, COUNTDOWN_STEP, COUNTDOWN_STEPS, GUEST_START_DIRECTION,
    TICK_INTERVAL,
};
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, timeout, MissedTickBehavior};

/// Input pushed into the session by the embedding event layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    /// Steer the local snake.
    Steer(Direction),
    /// Cancel the accept wait, or leave the match/game-over screen.
    Quit,
}

/// Timing and persistence knobs; tests shrink the durations.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub tick_interval: Duration,
    pub countdown_step: Duration,
    pub accept_poll: Duration,
    pub scores_path: PathBuf,
}

impl HostConfig {
    pub fn new(scores_path: impl Into<PathBuf>) -> Self {
        Self {
            tick_interval: TICK_INTERVAL,
            countdown_step: COUNTDOWN_STEP,
            accept_poll: ACCEPT_POLL_INTERVAL,
            scores_path: scores_path.into(),
        }
    }
}

/// How an active match loop ended.
enum MatchEnd {
    GameOver,
    Quit,
    Transport,
}

/// What the game-over wait resolved to.
enum OverOutcome {
    Restart,
    Exit,
}

/// The authoritative host session. Binds, waits for exactly one guest,
/// simulates at a fixed tick, and broadcasts a full snapshot every tick.
pub struct HostSession {
    listener: TcpListener,
    config: HostConfig,
    session: Session,
    sim: MatchSim,
    scores: ScoreLog,
    rng: StdRng,
    commands: mpsc::UnboundedReceiver<HostCommand>,
}

impl HostSession {
    /// Binds the listener, distinguishing a malformed address from a busy
    /// port. Returns the session and the sender the event layer uses to
    /// push [`HostCommand`]s.
    pub async fn bind(
        host: &str,
        port: u16,
        config: HostConfig,
    ) -> Result<(Self, mpsc::UnboundedSender<HostCommand>), BindError> {
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .map_err(|_| BindError::InvalidAddr(format!("{}:{}", host, port)))?;

        let listener = TcpListener::bind(addr).await.map_err(|e| match e.kind() {
            ErrorKind::AddrInUse => BindError::AddrInUse(port),
            ErrorKind::AddrNotAvailable => BindError::InvalidAddr(format!("{}:{}", host, port)),
            _ => BindError::Io(e),
        })?;
        info!("hosting on {}", listener.local_addr()?);

        let (command_tx, commands) = mpsc::unbounded_channel();
        let mut rng = StdRng::from_entropy();
        let sim = MatchSim::new(&mut rng);
        let scores = ScoreLog::new(&config.scores_path);

        Ok((
            Self {
                listener,
                config,
                session: Session::new(Role::Host),
                sim,
                scores,
                rng,
                commands,
            },
            command_tx,
        ))
    }

    /// The address the listener actually bound, for display next to the
    /// "waiting for an opponent" screen.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the whole session lifecycle: accept, countdown, match loop,
    /// game-over wait, restarts, teardown. Every failure past `bind` is
    /// resolved here; the caller regains control once the session is closed.
    pub async fn run(mut self) {
        let stream = match self.wait_for_connection().await {
            Some(stream) => stream,
            None => {
                self.session.enter(Phase::Closed);
                info!("hosting cancelled before anyone joined");
                return;
            }
        };

        let (read_half, mut writer) = stream.into_split();

        // Fresh hosted session: fresh state, stale leaderboard dropped
        self.sim.reset(&mut self.rng);
        if let Err(e) = self.scores.clear() {
            warn!("failed to clear the outcome log: {}", e);
        }

        let (direction_tx, mut direction_rx) = watch::channel(GUEST_START_DIRECTION);
        let restart_requested = Arc::new(AtomicBool::new(false));
        let running = Arc::new(AtomicBool::new(true));
        let receive_task = spawn_receiver(
            read_half,
            direction_tx,
            Arc::clone(&restart_requested),
            Arc::clone(&running),
        );

        loop {
            self.session.enter(Phase::Countdown);
            run_countdown(COUNTDOWN_STEPS, self.config.countdown_step).await;
            self.session.enter(Phase::Active);

            match self
                .match_loop(&mut writer, &mut direction_rx, &running)
                .await
            {
                MatchEnd::GameOver => {
                    self.session.enter(Phase::Over);
                    self.record_outcome();

                    match self.wait_at_game_over(&restart_requested, &running).await {
                        OverOutcome::Restart => {
                            self.session.enter(Phase::RestartPending);
                            self.sim.reset(&mut self.rng);
                            if let Err(e) = self.scores.clear() {
                                warn!("failed to clear the outcome log: {}", e);
                            }
                            if let Err(e) = write_packet(&mut writer, &Packet::RestartAck).await {
                                warn!("failed to confirm the restart: {}", e);
                                break;
                            }
                            info!("restart honored, returning to the countdown");
                        }
                        OverOutcome::Exit => break,
                    }
                }
                MatchEnd::Quit => break,
                MatchEnd::Transport => {
                    self.session.enter(Phase::Over);
                    break;
                }
            }
        }

        // The receive task must not outlive the session
        receive_task.abort();
        let _ = receive_task.await;
        self.session.enter(Phase::Closed);
        info!("session closed");
    }

    /// Polls for the single inbound connection with a short bounded wait per
    /// iteration so local cancel input stays responsive. `None` means the
    /// wait was cancelled locally.
    async fn wait_for_connection(&mut self) -> Option<TcpStream> {
        info!("waiting for an opponent to join");
        loop {
            match timeout(self.config.accept_poll, self.listener.accept()).await {
                Ok(Ok((stream, peer))) => {
                    info!("opponent connected from {}", peer);
                    if let Err(e) = stream.set_nodelay(true) {
                        debug!("failed to disable Nagle: {}", e);
                    }
                    return Some(stream);
                }
                Ok(Err(e)) => {
                    error!("accept failed: {}", e);
                    sleep(Duration::from_millis(10)).await;
                }
                Err(_) => {}
            }

            loop {
                match self.commands.try_recv() {
                    Ok(HostCommand::Quit) => return None,
                    Ok(HostCommand::Steer(_)) => {}
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => return None,
                }
            }
        }
    }

    /// The fixed-tick simulation/broadcast loop. Applies at most one remote
    /// direction update per tick (last write wins) and sends a snapshot
    /// every tick, including the final one carrying the game-over flag.
    async fn match_loop(
        &mut self,
        writer: &mut OwnedWriteHalf,
        direction_rx: &mut watch::Receiver<Direction>,
        running: &AtomicBool,
    ) -> MatchEnd {
        let mut ticker = interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            if !running.load(Ordering::Relaxed) {
                warn!("transport lost, ending the match");
                return MatchEnd::Transport;
            }

            loop {
                match self.commands.try_recv() {
                    Ok(HostCommand::Steer(direction)) => {
                        if !self.sim.steer_local(direction) {
                            debug!("rejected local reversal into {:?}", direction);
                        }
                    }
                    Ok(HostCommand::Quit) => {
                        info!("local quit during the match");
                        return MatchEnd::Quit;
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        info!("control channel closed, ending the match");
                        return MatchEnd::Quit;
                    }
                }
            }

            if direction_rx.has_changed().unwrap_or(false) {
                let direction = *direction_rx.borrow_and_update();
                if !self.sim.steer_remote(direction) {
                    debug!("rejected remote reversal into {:?}", direction);
                }
            }

            let outcome = self.sim.tick(&mut self.rng);
            if outcome.fed1 || outcome.fed2 {
                debug!(
                    "score {} : {}",
                    self.sim.state().score1,
                    self.sim.state().score2
                );
            }

            let snapshot = Packet::Snapshot {
                state: self.sim.state().clone(),
            };
            if let Err(e) = write_packet(writer, &snapshot).await {
                warn!("failed to send a snapshot: {}", e);
                return MatchEnd::Transport;
            }

            if outcome.finished {
                return MatchEnd::GameOver;
            }
        }
    }

    /// Game-over wait: resolves to a restart (inbound request) or an exit
    /// (local quit, or the guest is gone).
    async fn wait_at_game_over(
        &mut self,
        restart_requested: &AtomicBool,
        running: &AtomicBool,
    ) -> OverOutcome {
        info!("waiting for a restart request or a local exit");
        let mut poll = interval(self.config.accept_poll);

        loop {
            poll.tick().await;

            if restart_requested.swap(false, Ordering::Relaxed) {
                info!("guest requested a restart");
                return OverOutcome::Restart;
            }
            if !running.load(Ordering::Relaxed) {
                info!("guest left the game-over screen");
                return OverOutcome::Exit;
            }

            loop {
                match self.commands.try_recv() {
                    Ok(HostCommand::Quit) => return OverOutcome::Exit,
                    Ok(HostCommand::Steer(_)) => {}
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => return OverOutcome::Exit,
                }
            }
        }
    }

    /// Appends the final outcome exactly once and logs the leaderboard the
    /// game-over screen shows.
    fn record_outcome(&self) {
        let Some((winner, score)) = self.sim.outcome() else {
            return;
        };
        info!("game over: {} with {} points", winner, score);

        if let Err(e) = self.scores.append(&winner.to_string(), score) {
            warn!("failed to persist the outcome: {}", e);
        }
        for (rank, (name, points)) in self.scores.top(LEADERBOARD_SIZE).iter().enumerate() {
            info!("  {}. {} - {}", rank + 1, name, points);
        }
    }
}

/// Background receive task: the only place that blocks on network reads.
/// Direction updates overwrite the single-slot mailbox; a restart request
/// sets its flag; everything else, including any transport failure, ends the
/// task, observed by the tick loop as "session no longer running".
fn spawn_receiver(
    mut read_half: OwnedReadHalf,
    directions: watch::Sender<Direction>,
    restart_requested: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match read_packet(&mut read_half).await {
                Ok(Packet::DirectionInput { direction }) => {
                    let _ = directions.send(direction);
                }
                Ok(Packet::RestartRequest) => {
                    restart_requested.store(true, Ordering::Relaxed);
                }
                Ok(packet) => {
                    warn!("unexpected {:?} from the guest, dropping the connection", packet);
                    break;
                }
                Err(TransportError::PeerClosed) => {
                    info!("guest closed the connection");
                    break;
                }
                Err(e) => {
                    error!("receive failed: {}", e);
                    break;
                }
            }
        }
        running.store(false, Ordering::Relaxed);
    })
}
