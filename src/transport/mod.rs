//! Transport to the external transcription service.

pub mod channel;
pub mod protocol;
pub mod token;

pub use channel::{MockTranscriptionChannel, TcpTranscriptionChannel, TranscriptionChannel};
pub use protocol::{SessionHello, TranscriptMessage};
pub use token::TokenClient;
