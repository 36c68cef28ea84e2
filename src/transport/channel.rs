//! Duplex transcription channel.
//!
//! Outbound: encoded audio packets, fire-and-forget. Inbound: transcript
//! events, delivered through a crossbeam receiver that the pipeline wires
//! straight into the router station.

use crate::error::{Result, SlatewireError};
use crate::pipeline::types::{AudioPacket, TranscriptEvent};
use crate::transport::protocol::{SessionHello, TranscriptMessage};
use crossbeam_channel::{Receiver, Sender, bounded};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Buffer size for inbound transcript events.
const EVENT_BUFFER: usize = 64;

/// Trait for the duplex channel to the transcription service.
///
/// This trait allows swapping implementations (real relay vs mock).
pub trait TranscriptionChannel: Send {
    /// Send one encoded packet. Fire-and-forget: a failure drops this
    /// packet only and must not poison the channel for later sends.
    fn send_packet(&mut self, packet: &AudioPacket) -> Result<()>;

    /// Take the inbound transcript event receiver. Yields `Some` exactly
    /// once; the pipeline consumes it when wiring up.
    fn take_events(&mut self) -> Option<Receiver<TranscriptEvent>>;

    /// Close the channel, signalling end of audio to the service.
    fn close(&mut self);
}

/// TCP implementation of the transcription channel.
///
/// Connects, sends a JSON greeting with the session token and sample rate,
/// then streams raw 16-bit little-endian PCM. A reader thread parses
/// newline-delimited JSON transcript messages into events; malformed lines
/// are skipped with a warning.
pub struct TcpTranscriptionChannel {
    stream: TcpStream,
    events_rx: Option<Receiver<TranscriptEvent>>,
    _reader_handle: Option<thread::JoinHandle<()>>,
}

impl TcpTranscriptionChannel {
    /// Connect to the relay at `addr` with a 10 second timeout.
    pub fn connect(addr: &str, token: &str, sample_rate: u32) -> Result<Self> {
        Self::connect_with_timeout(addr, token, sample_rate, Duration::from_secs(10))
    }

    /// Connect to the relay with a custom timeout.
    pub fn connect_with_timeout(
        addr: &str,
        token: &str,
        sample_rate: u32,
        timeout: Duration,
    ) -> Result<Self> {
        use std::net::ToSocketAddrs;
        let resolved = addr
            .to_socket_addrs()
            .map_err(|e| SlatewireError::SessionConnect {
                message: format!("invalid relay address '{}': {}", addr, e),
            })?
            .next()
            .ok_or_else(|| SlatewireError::SessionConnect {
                message: format!("relay address '{}' resolved to nothing", addr),
            })?;
        let mut stream = TcpStream::connect_timeout(&resolved, timeout).map_err(|e| {
            SlatewireError::SessionConnect {
                message: format!("{}: {}", addr, e),
            }
        })?;

        // Low-latency streaming: no Nagle batching, bounded write stalls
        stream
            .set_nodelay(true)
            .map_err(|e| SlatewireError::SessionConnect {
                message: format!("set_nodelay: {}", e),
            })?;
        stream
            .set_write_timeout(Some(Duration::from_secs(5)))
            .map_err(|e| SlatewireError::SessionConnect {
                message: format!("set_write_timeout: {}", e),
            })?;

        let hello = SessionHello {
            token: token.to_string(),
            sample_rate,
        }
        .to_json()
        .map_err(|e| SlatewireError::SessionConnect {
            message: format!("encode greeting: {}", e),
        })?;
        stream
            .write_all(format!("{}\n", hello).as_bytes())
            .map_err(|e| SlatewireError::SessionConnect {
                message: format!("send greeting: {}", e),
            })?;

        let read_stream = stream
            .try_clone()
            .map_err(|e| SlatewireError::SessionConnect {
                message: format!("clone stream: {}", e),
            })?;
        let (events_tx, events_rx) = bounded(EVENT_BUFFER);

        let handle = thread::spawn(move || {
            Self::read_events(read_stream, events_tx);
        });

        Ok(Self {
            stream,
            events_rx: Some(events_rx),
            _reader_handle: Some(handle),
        })
    }

    /// Reader loop: one JSON transcript message per line.
    fn read_events(stream: TcpStream, tx: Sender<TranscriptEvent>) {
        let reader = BufReader::new(stream);

        for line in reader.lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    eprintln!("slatewire: transcript read error: {}", e);
                    break;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            let Some(message) = TranscriptMessage::from_json(&line) else {
                eprintln!("slatewire: skipping malformed transcript line");
                continue;
            };

            let event = TranscriptEvent {
                text: message.transcript,
                is_final: message.end_of_turn,
                timestamp: Instant::now(),
            };

            if tx.send(event).is_err() {
                // Receiver dropped: the pipeline is gone, stop reading
                break;
            }
        }
    }
}

impl TranscriptionChannel for TcpTranscriptionChannel {
    fn send_packet(&mut self, packet: &AudioPacket) -> Result<()> {
        self.stream
            .write_all(&packet.to_le_bytes())
            .and_then(|_| self.stream.flush())
            .map_err(|e| SlatewireError::Transport {
                message: e.to_string(),
            })
    }

    fn take_events(&mut self) -> Option<Receiver<TranscriptEvent>> {
        self.events_rx.take()
    }

    fn close(&mut self) {
        // Shut down the write side to signal EOF; the reader thread exits
        // when the relay closes its side
        if let Err(e) = self.stream.shutdown(std::net::Shutdown::Write) {
            if e.kind() != std::io::ErrorKind::NotConnected {
                eprintln!("slatewire: channel close: {}", e);
            }
        }
    }
}

impl Drop for TcpTranscriptionChannel {
    fn drop(&mut self) {
        self.close();
    }
}

/// Mock transcription channel for testing.
pub struct MockTranscriptionChannel {
    sent: Arc<Mutex<Vec<AudioPacket>>>,
    events_tx: Sender<TranscriptEvent>,
    events_rx: Option<Receiver<TranscriptEvent>>,
    closed: Arc<Mutex<bool>>,
    fail_sends: bool,
}

impl MockTranscriptionChannel {
    /// Creates a mock channel that accepts every packet.
    pub fn new() -> Self {
        let (events_tx, events_rx) = bounded(EVENT_BUFFER);
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            events_tx,
            events_rx: Some(events_rx),
            closed: Arc::new(Mutex::new(false)),
            fail_sends: false,
        }
    }

    /// Configure the mock to fail every send.
    pub fn with_send_failure(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    /// Handle for injecting transcript events from a test.
    pub fn event_injector(&self) -> Sender<TranscriptEvent> {
        self.events_tx.clone()
    }

    /// Shared view of every packet accepted so far.
    pub fn sent_packets(&self) -> Arc<Mutex<Vec<AudioPacket>>> {
        self.sent.clone()
    }

    /// Shared closed flag.
    pub fn closed_flag(&self) -> Arc<Mutex<bool>> {
        self.closed.clone()
    }
}

impl Default for MockTranscriptionChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptionChannel for MockTranscriptionChannel {
    fn send_packet(&mut self, packet: &AudioPacket) -> Result<()> {
        if self.fail_sends {
            return Err(SlatewireError::Transport {
                message: "mock send failure".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(packet.clone());
        Ok(())
    }

    fn take_events(&mut self) -> Option<Receiver<TranscriptEvent>> {
        self.events_rx.take()
    }

    fn close(&mut self) {
        *self.closed.lock().unwrap_or_else(|e| e.into_inner()) = true;
    }
}
