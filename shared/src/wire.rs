//! Framed wire codec for the match protocol.
//!
//! Every message is one length-prefixed bincode frame: a 4-byte big-endian
//! payload length followed by exactly that many bytes. Frames are
//! self-delimiting, so the codec never relies on read sizes matching message
//! boundaries on a byte stream. A partial or corrupt frame is a fatal
//! transport error; the connection is torn down, never resynchronized.
//!
//! There is no version negotiation; both ends must run matching codec logic.

use crate::error::TransportError;
use crate::rules::Direction;
use crate::state::MatchState;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on a frame payload. Anything larger is a protocol violation;
/// a well-formed snapshot stays far below this.
pub const MAX_FRAME_LEN: u32 = 64 * 1024;

/// The four messages of the match protocol. Payloads are plain data decoded
/// into this closed set; anything that does not match is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Packet {
    /// Guest -> host: new heading for the remote snake.
    DirectionInput { direction: Direction },
    /// Guest -> host: ask to play another round after game over.
    RestartRequest,
    /// Host -> guest: full authoritative state, sent every tick.
    Snapshot { state: MatchState },
    /// Host -> guest: the restart was honored, resume at the countdown.
    RestartAck,
}

/// Serializes and frames one packet as a single transport write.
pub async fn write_packet<W>(writer: &mut W, packet: &Packet) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    let payload = bincode::serialize(packet).map_err(|_| TransportError::Malformed)?;
    if payload.len() as u64 > MAX_FRAME_LEN as u64 {
        return Err(TransportError::OversizedFrame(payload.len() as u64));
    }

    writer.write_all(&(payload.len() as u32).to_be_bytes()).await?;
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one framed packet. A clean close before the length prefix is
/// `PeerClosed`; a short or undecodable payload is `Malformed`; a length
/// outside protocol limits is `OversizedFrame`.
pub async fn read_packet<R>(reader: &mut R) -> Result<Packet, TransportError>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Err(TransportError::PeerClosed),
        Err(e) => return Err(TransportError::Io(e)),
    }

    let len = u32::from_be_bytes(len_buf);
    if len == 0 || len > MAX_FRAME_LEN {
        return Err(TransportError::OversizedFrame(len as u64));
    }

    let mut payload = vec![0u8; len as usize];
    match reader.read_exact(&mut payload).await {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Err(TransportError::Malformed),
        Err(e) => return Err(TransportError::Io(e)),
    }

    bincode::deserialize(&payload).map_err(|_| TransportError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Position, Snake};
    use crate::state::Winner;

    fn sample_state() -> MatchState {
        MatchState {
            snake1: Snake::from_segments(vec![
                Position::new(64, 64),
                Position::new(96, 64),
                Position::new(128, 64),
            ]),
            snake2: Snake::new(Position::new(320, 320)),
            food: Position::new(640, 480),
            score1: 2,
            score2: 0,
            winner: None,
            game_over: false,
        }
    }

    async fn roundtrip(packet: Packet) -> Packet {
        let (mut a, mut b) = tokio::io::duplex(4096);
        write_packet(&mut a, &packet).await.unwrap();
        read_packet(&mut b).await.unwrap()
    }

    #[tokio::test]
    async fn all_packet_types_roundtrip() {
        let packets = vec![
            Packet::DirectionInput {
                direction: Direction::Up,
            },
            Packet::RestartRequest,
            Packet::Snapshot {
                state: sample_state(),
            },
            Packet::RestartAck,
        ];

        for packet in packets {
            let decoded = roundtrip(packet.clone()).await;
            assert_eq!(decoded, packet);
        }
    }

    #[tokio::test]
    async fn empty_snakes_and_zero_scores_roundtrip() {
        let state = MatchState {
            snake1: Snake::from_segments(vec![]),
            snake2: Snake::from_segments(vec![]),
            food: Position::new(0, 64),
            score1: 0,
            score2: 0,
            winner: Some(Winner::Draw),
            game_over: true,
        };
        let packet = Packet::Snapshot { state };

        assert_eq!(roundtrip(packet.clone()).await, packet);
    }

    #[tokio::test]
    async fn frames_arrive_in_send_order() {
        let (mut a, mut b) = tokio::io::duplex(4096);
        for direction in [Direction::Up, Direction::Left, Direction::Down] {
            write_packet(&mut a, &Packet::DirectionInput { direction })
                .await
                .unwrap();
        }

        for expected in [Direction::Up, Direction::Left, Direction::Down] {
            match read_packet(&mut b).await.unwrap() {
                Packet::DirectionInput { direction } => assert_eq!(direction, expected),
                other => panic!("unexpected packet {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn clean_close_reads_as_peer_closed() {
        let (a, mut b) = tokio::io::duplex(64);
        drop(a);

        match read_packet(&mut b).await {
            Err(TransportError::PeerClosed) => {}
            other => panic!("expected PeerClosed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn oversized_length_prefix_is_rejected() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(&(MAX_FRAME_LEN + 1).to_be_bytes()).await.unwrap();

        match read_packet(&mut b).await {
            Err(TransportError::OversizedFrame(len)) => {
                assert_eq!(len, (MAX_FRAME_LEN + 1) as u64)
            }
            other => panic!("expected OversizedFrame, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn zero_length_prefix_is_rejected() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(&0u32.to_be_bytes()).await.unwrap();

        assert!(matches!(
            read_packet(&mut b).await,
            Err(TransportError::OversizedFrame(0))
        ));
    }

    #[tokio::test]
    async fn truncated_frame_is_malformed() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(&10u32.to_be_bytes()).await.unwrap();
        a.write_all(&[1, 2, 3]).await.unwrap();
        drop(a);

        assert!(matches!(
            read_packet(&mut b).await,
            Err(TransportError::Malformed)
        ));
    }

    #[tokio::test]
    async fn garbage_payload_is_malformed() {
        let (mut a, mut b) = tokio::io::duplex(64);
        let garbage = [0xffu8; 16];
        a.write_all(&(garbage.len() as u32).to_be_bytes())
            .await
            .unwrap();
        a.write_all(&garbage).await.unwrap();

        assert!(matches!(
            read_packet(&mut b).await,
            Err(TransportError::Malformed)
        ));
    }
}
