//! Error kinds raised by the codec, HPACK machinery and stream state machine.
//!
//! The core never retries and never decides connection disposition itself;
//! it classifies a failure into one of three kinds (§7 of the design) and
//! lets the driver decide what to do with it.

use std::fmt;

/// HTTP/2 error codes (RFC 7540 §7), carried on RST_STREAM and GOAWAY frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NoError,
    ProtocolError,
    InternalError,
    FlowControlError,
    SettingsTimeout,
    StreamClosed,
    FrameSizeError,
    RefusedStream,
    Cancel,
    CompressionError,
    ConnectError,
    EnhanceYourCalm,
    InadequateSecurity,
}

impl ErrorCode {
    pub fn as_u32(self) -> u32 {
        match self {
            ErrorCode::NoError => 0,
            ErrorCode::ProtocolError => 1,
            ErrorCode::InternalError => 2,
            ErrorCode::FlowControlError => 3,
            ErrorCode::SettingsTimeout => 4,
            ErrorCode::StreamClosed => 5,
            ErrorCode::FrameSizeError => 6,
            ErrorCode::RefusedStream => 7,
            ErrorCode::Cancel => 8,
            ErrorCode::CompressionError => 9,
            ErrorCode::ConnectError => 10,
            ErrorCode::EnhanceYourCalm => 11,
            ErrorCode::InadequateSecurity => 12,
        }
    }

    /// Unknown codes are mapped to `InternalError`; HTTP/2 peers may send
    /// codes this implementation does not know about.
    pub fn from_u32(v: u32) -> ErrorCode {
        match v {
            0 => ErrorCode::NoError,
            1 => ErrorCode::ProtocolError,
            2 => ErrorCode::InternalError,
            3 => ErrorCode::FlowControlError,
            4 => ErrorCode::SettingsTimeout,
            5 => ErrorCode::StreamClosed,
            6 => ErrorCode::FrameSizeError,
            7 => ErrorCode::RefusedStream,
            8 => ErrorCode::Cancel,
            9 => ErrorCode::CompressionError,
            10 => ErrorCode::ConnectError,
            11 => ErrorCode::EnhanceYourCalm,
            12 => ErrorCode::InadequateSecurity,
            _ => ErrorCode::InternalError,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.as_u32())
    }
}

/// The three failure kinds the core can raise.
///
/// A `Compression` or `Protocol` error is fatal to the whole connection; a
/// `Stream` error is confined to one stream and the connection survives.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HPACK or frame-serialization failure. Fatal: the driver should send
    /// GOAWAY(compression_error).
    #[error("compression error: {0}")]
    Compression(String),

    /// HTTP/2 framing violation confined to the whole connection (wrong
    /// stream id for a connection-scope frame, malformed SETTINGS payload,
    /// a frame the current stream state forbids where the spec mandates a
    /// connection-level failure).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Violation confined to a single stream. The driver queues a
    /// RST_STREAM with `code` and the stream transitions to closed; the
    /// connection is unaffected.
    #[error("stream error on stream {stream_id}: {reason} ({code})")]
    Stream {
        stream_id: u32,
        code: ErrorCode,
        reason: String,
    },
}

impl Error {
    pub fn compression(msg: impl Into<String>) -> Error {
        Error::Compression(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Error {
        Error::Protocol(msg.into())
    }

    pub fn stream(stream_id: u32, code: ErrorCode, reason: impl Into<String>) -> Error {
        Error::Stream {
            stream_id,
            code,
            reason: reason.into(),
        }
    }

    /// The error code a RST_STREAM or GOAWAY carrying this error should use.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Compression(_) => ErrorCode::CompressionError,
            Error::Protocol(_) => ErrorCode::ProtocolError,
            Error::Stream { code, .. } => *code,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
