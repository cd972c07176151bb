//! Frame codec (§4.E): the 9-byte frame header plus per-type payload
//! encode/decode for every frame kind this core understands.
//!
//! `parse` is non-destructive on an incomplete frame: it returns `Ok(None)`
//! and leaves the buffer cursor untouched so the caller can feed it more
//! bytes and try again once a full frame has arrived.

use crate::buffer::Buffer;
use crate::error::{Error, ErrorCode};

pub const FRAME_HEADER_LEN: usize = 9;
pub const CONNECTION_PREFACE: &[u8] = b"PRI * HTTP/2.0\r\n\r\nSM\r\n\r\n";

/// 14-bit length field: a frame may never declare more than this many
/// payload bytes (§4.E).
pub const MAX_FRAME_LENGTH: u32 = (1 << 14) - 1;

pub mod frame_type {
    pub const DATA: u8 = 0x0;
    pub const HEADERS: u8 = 0x1;
    pub const PRIORITY: u8 = 0x2;
    pub const RST_STREAM: u8 = 0x3;
    pub const SETTINGS: u8 = 0x4;
    pub const PUSH_PROMISE: u8 = 0x5;
    pub const PING: u8 = 0x6;
    pub const GOAWAY: u8 = 0x7;
    pub const WINDOW_UPDATE: u8 = 0x8;
    pub const CONTINUATION: u8 = 0x9;
    pub const ALTSVC: u8 = 0xa;
    pub const BLOCKED: u8 = 0xb;
}

pub mod flags {
    pub const END_STREAM: u8 = 0x1;
    pub const ACK: u8 = 0x1;
    pub const END_HEADERS: u8 = 0x4;
    pub const PADDED: u8 = 0x8;
    pub const PRIORITY: u8 = 0x20;
}

pub mod settings_id {
    pub const HEADER_TABLE_SIZE: u16 = 0x1;
    pub const ENABLE_PUSH: u16 = 0x2;
    pub const MAX_CONCURRENT_STREAMS: u16 = 0x3;
    pub const INITIAL_WINDOW_SIZE: u16 = 0x4;
    pub const COMPRESS_DATA: u16 = 0x5;
}

/// The flag bits a given frame type recognizes. `None` for an unrecognized
/// frame type, since RFC 7540 §4.1 says those are ignored wholesale rather
/// than validated.
fn valid_flags_mask(frame_type: u8) -> Option<u8> {
    use self::flags::*;
    match frame_type {
        frame_type::DATA => Some(END_STREAM | PADDED),
        frame_type::HEADERS => Some(END_STREAM | END_HEADERS | PADDED | PRIORITY),
        frame_type::PRIORITY => Some(0),
        frame_type::RST_STREAM => Some(0),
        frame_type::SETTINGS => Some(ACK),
        frame_type::PUSH_PROMISE => Some(END_HEADERS | PADDED),
        frame_type::PING => Some(ACK),
        frame_type::GOAWAY => Some(0),
        frame_type::WINDOW_UPDATE => Some(0),
        frame_type::CONTINUATION => Some(END_HEADERS),
        frame_type::ALTSVC => Some(0),
        frame_type::BLOCKED => Some(0),
        _ => None,
    }
}

/// Decoded frame header, always exactly 9 bytes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub length: u32,
    pub frame_type: u8,
    pub flags: u8,
    pub stream_id: u32,
}

impl FrameHeader {
    pub fn parse(bytes: &[u8]) -> Result<FrameHeader, Error> {
        if bytes.len() < FRAME_HEADER_LEN {
            return Err(Error::compression("short frame header"));
        }
        let length = u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]);
        if length > MAX_FRAME_LENGTH {
            return Err(Error::compression("frame length exceeds 2^14-1"));
        }
        let frame_type = bytes[3];
        let flags = bytes[4];
        let stream_id = u32::from_be_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]) & 0x7fff_ffff;
        if let Some(mask) = valid_flags_mask(frame_type) {
            if flags & !mask != 0 {
                return Err(Error::compression("unknown flag for frame type"));
            }
        }
        Ok(FrameHeader {
            length,
            frame_type,
            flags,
            stream_id,
        })
    }

    pub fn encode(&self) -> [u8; FRAME_HEADER_LEN] {
        let mut out = [0u8; FRAME_HEADER_LEN];
        out[0..3].copy_from_slice(&self.length.to_be_bytes()[1..]);
        out[3] = self.frame_type;
        out[4] = self.flags;
        out[5..9].copy_from_slice(&(self.stream_id & 0x7fff_ffff).to_be_bytes());
        out
    }

    pub fn total_size(&self) -> usize {
        FRAME_HEADER_LEN + self.length as usize
    }

    pub fn is_end_stream(&self) -> bool {
        self.flags & flags::END_STREAM != 0
    }

    pub fn is_end_headers(&self) -> bool {
        self.flags & flags::END_HEADERS != 0
    }

    pub fn is_ack(&self) -> bool {
        self.flags & flags::ACK != 0
    }

    pub fn is_padded(&self) -> bool {
        self.flags & flags::PADDED != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Priority {
    pub exclusive: bool,
    pub dependency: u32,
    pub weight: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting {
    HeaderTableSize(u32),
    EnablePush(bool),
    MaxConcurrentStreams(u32),
    InitialWindowSize(u32),
    CompressData(bool),
    Unknown(u16, u32),
}

/// One parsed frame. Payloads carry only the bytes meaningful to the
/// caller; padding and the 5-byte priority prefix on HEADERS are already
/// stripped out into dedicated fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Data {
        stream_id: u32,
        end_stream: bool,
        data: Vec<u8>,
    },
    Headers {
        stream_id: u32,
        end_stream: bool,
        end_headers: bool,
        priority: Option<Priority>,
        header_block: Vec<u8>,
    },
    Priority {
        stream_id: u32,
        priority: Priority,
    },
    RstStream {
        stream_id: u32,
        error_code: ErrorCode,
    },
    Settings {
        ack: bool,
        settings: Vec<Setting>,
    },
    PushPromise {
        stream_id: u32,
        promised_stream_id: u32,
        end_headers: bool,
        header_block: Vec<u8>,
    },
    Ping {
        ack: bool,
        payload: [u8; 8],
    },
    GoAway {
        last_stream_id: u32,
        error_code: ErrorCode,
        debug_data: Vec<u8>,
    },
    WindowUpdate {
        stream_id: u32,
        increment: u32,
    },
    Continuation {
        stream_id: u32,
        end_headers: bool,
        header_block: Vec<u8>,
    },
    AltSvc {
        stream_id: u32,
        origin: Vec<u8>,
        value: Vec<u8>,
    },
    Blocked {
        stream_id: u32,
    },
    /// A frame type this implementation does not recognize. RFC 7540 §4.1
    /// requires these to be ignored rather than treated as a protocol
    /// error, so the payload is discarded and only the type is kept.
    Unknown {
        frame_type: u8,
    },
}

/// Attempt to parse one frame from the front of `buf`. Returns `Ok(None)`
/// without consuming anything if the buffer does not yet hold a complete
/// frame.
pub fn parse(buf: &mut Buffer) -> Result<Option<Frame>, Error> {
    if buf.size() < FRAME_HEADER_LEN {
        return Ok(None);
    }
    let header = FrameHeader::parse(buf.peek(FRAME_HEADER_LEN)?)?;
    if buf.size() < header.total_size() {
        return Ok(None);
    }
    buf.read(FRAME_HEADER_LEN)?;
    let payload = buf.read(header.length as usize)?.to_vec();
    Ok(Some(parse_payload(&header, &payload)?))
}

fn strip_padding(flags: u8, payload: &[u8]) -> Result<(&[u8], usize), Error> {
    if flags & self::flags::PADDED == 0 {
        return Ok((payload, 0));
    }
    if payload.is_empty() {
        return Err(Error::protocol("PADDED flag set with empty payload"));
    }
    let pad_len = payload[0] as usize;
    let rest = &payload[1..];
    if pad_len > rest.len() {
        return Err(Error::protocol("pad length exceeds frame payload"));
    }
    Ok((&rest[..rest.len() - pad_len], pad_len))
}

fn parse_priority(bytes: &[u8]) -> Result<Priority, Error> {
    if bytes.len() < 5 {
        return Err(Error::protocol("short priority field"));
    }
    let raw = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    Ok(Priority {
        exclusive: raw & 0x8000_0000 != 0,
        dependency: raw & 0x7fff_ffff,
        weight: bytes[4],
    })
}

fn parse_payload(header: &FrameHeader, payload: &[u8]) -> Result<Frame, Error> {
    match header.frame_type {
        frame_type::DATA => {
            let (data, _) = strip_padding(header.flags, payload)?;
            Ok(Frame::Data {
                stream_id: header.stream_id,
                end_stream: header.is_end_stream(),
                data: data.to_vec(),
            })
        }
        frame_type::HEADERS => {
            let (unpadded, _) = strip_padding(header.flags, payload)?;
            let (priority, rest) = if header.flags & flags::PRIORITY != 0 {
                (Some(parse_priority(unpadded)?), &unpadded[5..])
            } else {
                (None, unpadded)
            };
            Ok(Frame::Headers {
                stream_id: header.stream_id,
                end_stream: header.is_end_stream(),
                end_headers: header.is_end_headers(),
                priority,
                header_block: rest.to_vec(),
            })
        }
        frame_type::PRIORITY => Ok(Frame::Priority {
            stream_id: header.stream_id,
            priority: parse_priority(payload)?,
        }),
        frame_type::RST_STREAM => {
            if payload.len() != 4 {
                return Err(Error::protocol("RST_STREAM payload must be 4 bytes"));
            }
            Ok(Frame::RstStream {
                stream_id: header.stream_id,
                error_code: ErrorCode::from_u32(u32::from_be_bytes([
                    payload[0], payload[1], payload[2], payload[3],
                ])),
            })
        }
        frame_type::SETTINGS => {
            if header.is_ack() {
                return Ok(Frame::Settings {
                    ack: true,
                    settings: Vec::new(),
                });
            }
            if payload.len() % 6 != 0 {
                return Err(Error::protocol("SETTINGS payload not a multiple of 6"));
            }
            let mut settings = Vec::new();
            for chunk in payload.chunks(6) {
                let id = u16::from_be_bytes([chunk[0], chunk[1]]);
                let value = u32::from_be_bytes([chunk[2], chunk[3], chunk[4], chunk[5]]);
                settings.push(match id {
                    settings_id::HEADER_TABLE_SIZE => Setting::HeaderTableSize(value),
                    settings_id::ENABLE_PUSH => Setting::EnablePush(value != 0),
                    settings_id::MAX_CONCURRENT_STREAMS => Setting::MaxConcurrentStreams(value),
                    settings_id::INITIAL_WINDOW_SIZE => Setting::InitialWindowSize(value),
                    settings_id::COMPRESS_DATA => Setting::CompressData(value != 0),
                    other => Setting::Unknown(other, value),
                });
            }
            Ok(Frame::Settings {
                ack: false,
                settings,
            })
        }
        frame_type::PUSH_PROMISE => {
            let (unpadded, _) = strip_padding(header.flags, payload)?;
            if unpadded.len() < 4 {
                return Err(Error::protocol("short PUSH_PROMISE payload"));
            }
            let promised_stream_id =
                u32::from_be_bytes([unpadded[0], unpadded[1], unpadded[2], unpadded[3]])
                    & 0x7fff_ffff;
            Ok(Frame::PushPromise {
                stream_id: header.stream_id,
                promised_stream_id,
                end_headers: header.is_end_headers(),
                header_block: unpadded[4..].to_vec(),
            })
        }
        frame_type::PING => {
            if payload.len() != 8 {
                return Err(Error::protocol("PING payload must be 8 bytes"));
            }
            let mut p = [0u8; 8];
            p.copy_from_slice(payload);
            Ok(Frame::Ping {
                ack: header.is_ack(),
                payload: p,
            })
        }
        frame_type::GOAWAY => {
            if payload.len() < 8 {
                return Err(Error::protocol("short GOAWAY payload"));
            }
            let last_stream_id =
                u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]) & 0x7fff_ffff;
            let error_code = ErrorCode::from_u32(u32::from_be_bytes([
                payload[4], payload[5], payload[6], payload[7],
            ]));
            Ok(Frame::GoAway {
                last_stream_id,
                error_code,
                debug_data: payload[8..].to_vec(),
            })
        }
        frame_type::WINDOW_UPDATE => {
            if payload.len() != 4 {
                return Err(Error::protocol("WINDOW_UPDATE payload must be 4 bytes"));
            }
            let increment =
                u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]) & 0x7fff_ffff;
            Ok(Frame::WindowUpdate {
                stream_id: header.stream_id,
                increment,
            })
        }
        frame_type::CONTINUATION => Ok(Frame::Continuation {
            stream_id: header.stream_id,
            end_headers: header.is_end_headers(),
            header_block: payload.to_vec(),
        }),
        frame_type::ALTSVC => {
            if payload.len() < 2 {
                return Err(Error::protocol("short ALTSVC payload"));
            }
            let origin_len = u16::from_be_bytes([payload[0], payload[1]]) as usize;
            if payload.len() < 2 + origin_len {
                return Err(Error::protocol("ALTSVC origin length out of range"));
            }
            Ok(Frame::AltSvc {
                stream_id: header.stream_id,
                origin: payload[2..2 + origin_len].to_vec(),
                value: payload[2 + origin_len..].to_vec(),
            })
        }
        frame_type::BLOCKED => Ok(Frame::Blocked {
            stream_id: header.stream_id,
        }),
        other => Ok(Frame::Unknown { frame_type: other }),
    }
}

fn header_for(frame_type: u8, flags: u8, stream_id: u32, length: usize) -> [u8; FRAME_HEADER_LEN] {
    FrameHeader {
        length: length as u32,
        frame_type,
        flags,
        stream_id,
    }
    .encode()
}

/// Serialize a frame to wire bytes, including its 9-byte header.
pub fn generate(frame: &Frame) -> Vec<u8> {
    match frame {
        Frame::Data {
            stream_id,
            end_stream,
            data,
        } => {
            let flags = if *end_stream { flags::END_STREAM } else { 0 };
            let mut out = header_for(frame_type::DATA, flags, *stream_id, data.len()).to_vec();
            out.extend_from_slice(data);
            out
        }
        Frame::Headers {
            stream_id,
            end_stream,
            end_headers,
            priority,
            header_block,
        } => {
            let mut flags = 0;
            if *end_stream {
                flags |= self::flags::END_STREAM;
            }
            if *end_headers {
                flags |= self::flags::END_HEADERS;
            }
            let mut payload = Vec::new();
            if let Some(p) = priority {
                flags |= self::flags::PRIORITY;
                let raw = (p.exclusive as u32) << 31 | (p.dependency & 0x7fff_ffff);
                payload.extend_from_slice(&raw.to_be_bytes());
                payload.push(p.weight);
            }
            payload.extend_from_slice(header_block);
            let mut out = header_for(frame_type::HEADERS, flags, *stream_id, payload.len()).to_vec();
            out.extend(payload);
            out
        }
        Frame::Priority {
            stream_id,
            priority,
        } => {
            let raw = (priority.exclusive as u32) << 31 | (priority.dependency & 0x7fff_ffff);
            let mut payload = raw.to_be_bytes().to_vec();
            payload.push(priority.weight);
            let mut out = header_for(frame_type::PRIORITY, 0, *stream_id, payload.len()).to_vec();
            out.extend(payload);
            out
        }
        Frame::RstStream {
            stream_id,
            error_code,
        } => {
            let mut out = header_for(frame_type::RST_STREAM, 0, *stream_id, 4).to_vec();
            out.extend_from_slice(&error_code.as_u32().to_be_bytes());
            out
        }
        Frame::Settings { ack, settings } => {
            if *ack {
                return header_for(frame_type::SETTINGS, flags::ACK, 0, 0).to_vec();
            }
            let mut payload = Vec::with_capacity(settings.len() * 6);
            for s in settings {
                let (id, value) = match s {
                    Setting::HeaderTableSize(v) => (settings_id::HEADER_TABLE_SIZE, *v),
                    Setting::EnablePush(v) => (settings_id::ENABLE_PUSH, *v as u32),
                    Setting::MaxConcurrentStreams(v) => (settings_id::MAX_CONCURRENT_STREAMS, *v),
                    Setting::InitialWindowSize(v) => (settings_id::INITIAL_WINDOW_SIZE, *v),
                    Setting::CompressData(v) => (settings_id::COMPRESS_DATA, *v as u32),
                    Setting::Unknown(id, v) => (*id, *v),
                };
                payload.extend_from_slice(&id.to_be_bytes());
                payload.extend_from_slice(&value.to_be_bytes());
            }
            let mut out = header_for(frame_type::SETTINGS, 0, 0, payload.len()).to_vec();
            out.extend(payload);
            out
        }
        Frame::PushPromise {
            stream_id,
            promised_stream_id,
            end_headers,
            header_block,
        } => {
            let flags = if *end_headers { self::flags::END_HEADERS } else { 0 };
            let mut payload = (promised_stream_id & 0x7fff_ffff).to_be_bytes().to_vec();
            payload.extend_from_slice(header_block);
            let mut out =
                header_for(frame_type::PUSH_PROMISE, flags, *stream_id, payload.len()).to_vec();
            out.extend(payload);
            out
        }
        Frame::Ping { ack, payload } => {
            let flags = if *ack { self::flags::ACK } else { 0 };
            let mut out = header_for(frame_type::PING, flags, 0, 8).to_vec();
            out.extend_from_slice(payload);
            out
        }
        Frame::GoAway {
            last_stream_id,
            error_code,
            debug_data,
        } => {
            let mut payload = (last_stream_id & 0x7fff_ffff).to_be_bytes().to_vec();
            payload.extend_from_slice(&error_code.as_u32().to_be_bytes());
            payload.extend_from_slice(debug_data);
            let mut out = header_for(frame_type::GOAWAY, 0, 0, payload.len()).to_vec();
            out.extend(payload);
            out
        }
        Frame::WindowUpdate {
            stream_id,
            increment,
        } => {
            let mut out = header_for(frame_type::WINDOW_UPDATE, 0, *stream_id, 4).to_vec();
            out.extend_from_slice(&(increment & 0x7fff_ffff).to_be_bytes());
            out
        }
        Frame::Continuation {
            stream_id,
            end_headers,
            header_block,
        } => {
            let flags = if *end_headers { self::flags::END_HEADERS } else { 0 };
            let mut out =
                header_for(frame_type::CONTINUATION, flags, *stream_id, header_block.len())
                    .to_vec();
            out.extend_from_slice(header_block);
            out
        }
        Frame::AltSvc {
            stream_id,
            origin,
            value,
        } => {
            let mut payload = (origin.len() as u16).to_be_bytes().to_vec();
            payload.extend_from_slice(origin);
            payload.extend_from_slice(value);
            let mut out = header_for(frame_type::ALTSVC, 0, *stream_id, payload.len()).to_vec();
            out.extend(payload);
            out
        }
        Frame::Blocked { stream_id } => header_for(frame_type::BLOCKED, 0, *stream_id, 0).to_vec(),
        Frame::Unknown { frame_type } => header_for(*frame_type, 0, 0, 0).to_vec(),
    }
}

pub fn is_h2c_preface(bytes: &[u8]) -> bool {
    bytes.starts_with(CONNECTION_PREFACE)
}
