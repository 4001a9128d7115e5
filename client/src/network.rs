//! Guest-side session driver: connection with categorized failures, the
//! background receive task, per-tick direction sending, and the restart
//! handshake.

use log::{debug, error, info, warn};
use shared::session::run_countdown;
use shared::{
    read_packet, write_packet, ConnectError, Direction, MatchState, Packet, Phase, Role, Session,
    TransportError, CONNECT_TIMEOUT, COUNTDOWN_STEP, COUNTDOWN_STEPS, GUEST_START_DIRECTION,
    RESTART_ACK_TIMEOUT,
};
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Timing knobs; tests shrink the durations.
#[derive(Debug, Clone)]
pub struct GuestConfig {
    pub connect_timeout: Duration,
    pub ack_timeout: Duration,
    pub countdown_step: Duration,
}

impl Default for GuestConfig {
    fn default() -> Self {
        Self {
            connect_timeout: CONNECT_TIMEOUT,
            ack_timeout: RESTART_ACK_TIMEOUT,
            countdown_step: COUNTDOWN_STEP,
        }
    }
}

/// The guest session: a connected consumer of snapshots and producer of
/// direction changes.
pub struct GuestSession {
    writer: OwnedWriteHalf,
    snapshots: watch::Receiver<Option<MatchState>>,
    acks: mpsc::UnboundedReceiver<()>,
    running: Arc<AtomicBool>,
    receive_task: JoinHandle<()>,
    session: Session,
    direction: Direction,
    direction_dirty: bool,
    config: GuestConfig,
}

impl GuestSession {
    /// Connects with a bounded timeout. Timeout, refusal, and a malformed
    /// address each fail with their own reason.
    pub async fn connect(
        host: &str,
        port: u16,
        config: GuestConfig,
    ) -> Result<Self, ConnectError> {
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .map_err(|_| ConnectError::InvalidAddr(format!("{}:{}", host, port)))?;

        let stream = match timeout(config.connect_timeout, TcpStream::connect(addr)).await {
            Err(_) => return Err(ConnectError::Timeout),
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => {
                return Err(ConnectError::Refused)
            }
            Ok(Err(e)) => return Err(ConnectError::Io(e)),
            Ok(Ok(stream)) => stream,
        };
        if let Err(e) = stream.set_nodelay(true) {
            debug!("failed to disable Nagle: {}", e);
        }
        info!("connected to {}", addr);

        let (read_half, writer) = stream.into_split();
        let (snapshot_tx, snapshots) = watch::channel(None);
        let (ack_tx, acks) = mpsc::unbounded_channel();
        let running = Arc::new(AtomicBool::new(true));
        let receive_task = spawn_receiver(read_half, snapshot_tx, ack_tx, Arc::clone(&running));

        Ok(Self {
            writer,
            snapshots,
            acks,
            running,
            receive_task,
            session: Session::new(Role::Guest),
            direction: GUEST_START_DIRECTION,
            direction_dirty: false,
            config,
        })
    }

    /// Runs the pre-match countdown and enters the active phase. Called
    /// once after connecting and again after every honored restart.
    pub async fn countdown(&mut self) {
        self.session.enter(Phase::Countdown);
        run_countdown(COUNTDOWN_STEPS, self.config.countdown_step).await;
        self.session.enter(Phase::Active);
    }

    /// Records a direction change from the input layer. Reversals into the
    /// snake's own neck and repeats of the current heading are ignored;
    /// anything accepted is sent on the next tick.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if direction == self.direction || direction == self.direction.opposite() {
            return false;
        }
        self.direction = direction;
        self.direction_dirty = true;
        true
    }

    /// One guest tick: sends the heading if it changed, then waits for the
    /// next snapshot and applies it verbatim. Ends the session with a
    /// transport error when the host is gone or the stream is corrupt.
    pub async fn tick(&mut self) -> Result<MatchState, TransportError> {
        if self.direction_dirty {
            let packet = Packet::DirectionInput {
                direction: self.direction,
            };
            write_packet(&mut self.writer, &packet).await?;
            self.direction_dirty = false;
        }

        if self.snapshots.changed().await.is_err() {
            return Err(TransportError::PeerClosed);
        }
        let state = match self.snapshots.borrow_and_update().clone() {
            Some(state) => state,
            None => return Err(TransportError::PeerClosed),
        };

        if state.game_over && self.session.phase() == Phase::Active {
            self.session.enter(Phase::Over);
        }
        Ok(state)
    }

    /// The latest snapshot without waiting, for the render layer.
    pub fn latest(&self) -> Option<MatchState> {
        self.snapshots.borrow().clone()
    }

    /// Whether the background receive task still holds a live connection.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Asks the host to play another round and waits, bounded, for the
    /// acknowledgment. An absent acknowledgment is reported, not retried.
    pub async fn request_restart(&mut self) -> Result<(), TransportError> {
        write_packet(&mut self.writer, &Packet::RestartRequest).await?;
        info!("restart requested, waiting for the host");

        match timeout(self.config.ack_timeout, self.acks.recv()).await {
            Err(_) => Err(TransportError::AckTimeout),
            Ok(None) => Err(TransportError::PeerClosed),
            Ok(Some(())) => {
                self.session.enter(Phase::RestartPending);
                self.direction = GUEST_START_DIRECTION;
                self.direction_dirty = false;
                Ok(())
            }
        }
    }

    /// Releases the connection and stops the receive task before returning
    /// control; no task outlives the session.
    pub async fn close(mut self) {
        self.receive_task.abort();
        let _ = self.receive_task.await;
        self.session.enter(Phase::Closed);
        info!("session closed");
    }
}

/// Background receive task: the only place that blocks on network reads.
/// Snapshots overwrite the single-slot mailbox; restart acknowledgments are
/// queued for the waiter; anything else ends the task, observed by callers
/// as "session no longer running".
fn spawn_receiver(
    mut read_half: OwnedReadHalf,
    snapshots: watch::Sender<Option<MatchState>>,
    acks: mpsc::UnboundedSender<()>,
    running: Arc<AtomicBool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match read_packet(&mut read_half).await {
                Ok(Packet::Snapshot { state }) => {
                    let _ = snapshots.send(Some(state));
                }
                Ok(Packet::RestartAck) => {
                    if acks.send(()).is_err() {
                        break;
                    }
                }
                Ok(packet) => {
                    warn!("unexpected {:?} from the host, dropping the connection", packet);
                    break;
                }
                Err(TransportError::PeerClosed) => {
                    info!("host closed the connection");
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
