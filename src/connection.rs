//! Connection driver: the piece that glues the frame codec, HPACK context
//! and per-stream state machines into the single `process(bytes) -> events`
//! / `encode(command) -> bytes` surface a caller actually drives.
//!
//! Mirrors the shape of the teacher's original frame-processing loop
//! (accumulate bytes, parse frames off the front, translate into events)
//! but drives real HPACK decompression, flow control and stream lifecycle
//! instead of only exposing raw header blocks.

use std::collections::HashMap;

use crate::error::{Error, ErrorCode};
use crate::flow::{FlowController, DEFAULT_INITIAL_WINDOW_SIZE};
use crate::frame::{self, Frame, Priority, Setting};
use crate::hpack::{Compressor, Decompressor, HpackOptions};
use crate::stream::{Stream, StreamEvent};
use crate::buffer::Buffer;

pub const MAX_HEADER_BLOCK_SIZE: usize = 16 * 1024 * 1024;

/// A connection-level view of what happened while processing inbound
/// bytes: one entry per completed frame (or per stream event a frame
/// produced).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Headers {
        stream_id: u32,
        headers: Vec<(Vec<u8>, Vec<u8>)>,
        end_stream: bool,
    },
    Data {
        stream_id: u32,
        data: Vec<u8>,
        end_stream: bool,
    },
    Priority {
        stream_id: u32,
        priority: Priority,
    },
    StreamReset {
        stream_id: u32,
        error_code: ErrorCode,
    },
    PushPromise {
        stream_id: u32,
        promised_stream_id: u32,
    },
    Settings(Vec<Setting>),
    SettingsAck,
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
    StreamClosed {
        stream_id: u32,
        error_code: ErrorCode,
    },
}

struct PendingHeaderBlock {
    stream_id: u32,
    end_stream: bool,
    priority: Option<Priority>,
    bytes: Vec<u8>,
}

/// Drives one direction of the sans-I/O connection: frames in, events out.
pub struct Connection {
    buffer: Buffer,
    preface_received: bool,
    expects_preface: bool,
    streams: HashMap<u32, Stream>,
    decoder: Decompressor,
    encoder: Compressor,
    recv_window: FlowController,
    send_window: FlowController,
    initial_window_size: i64,
    pending: Option<PendingHeaderBlock>,
}

impl Connection {
    /// `expects_preface` is true for a server-role connection, which must
    /// see the client connection preface before any frame.
    pub fn new(expects_preface: bool, hpack_options: HpackOptions) -> Connection {
        Connection {
            buffer: Buffer::new(),
            preface_received: !expects_preface,
            expects_preface,
            streams: HashMap::new(),
            decoder: Decompressor::new(hpack_options),
            encoder: Compressor::new(hpack_options),
            recv_window: FlowController::new(DEFAULT_INITIAL_WINDOW_SIZE),
            send_window: FlowController::new(DEFAULT_INITIAL_WINDOW_SIZE),
            initial_window_size: DEFAULT_INITIAL_WINDOW_SIZE,
            pending: None,
        }
    }

    pub fn preface_received(&self) -> bool {
        self.preface_received
    }

    fn stream_mut(&mut self, id: u32) -> &mut Stream {
        self.streams
            .entry(id)
            .or_insert_with(|| Stream::new(id, self.initial_window_size, DEFAULT_INITIAL_WINDOW_SIZE))
    }

    fn stream_events_to_conn_events(&self, stream_id: u32, events: Vec<StreamEvent>) -> Vec<Event> {
        let mut out = Vec::new();
        for e in events {
            match e {
                StreamEvent::Headers(h) => out.push(Event::Headers {
                    stream_id,
                    headers: h,
                    end_stream: false,
                }),
                StreamEvent::Data(d) => out.push(Event::Data {
                    stream_id,
                    data: d,
                    end_stream: false,
                }),
                StreamEvent::Priority(p) => out.push(Event::Priority {
                    stream_id,
                    priority: p,
                }),
                StreamEvent::Close(code) => out.push(Event::StreamClosed {
                    stream_id,
                    error_code: code,
                }),
                StreamEvent::Window(_)
                | StreamEvent::LocalWindow(_)
                | StreamEvent::Active
                | StreamEvent::Reserved
                | StreamEvent::HalfClose => {}
            }
        }
        out
    }

    /// Feed newly-received bytes and drain as many complete frames as are
    /// available, translating each into zero or more [`Event`]s.
    pub fn process(&mut self, bytes: &[u8]) -> Result<Vec<Event>, Error> {
        self.buffer.append(bytes);
        let mut events = Vec::new();

        if self.expects_preface && !self.preface_received {
            if self.buffer.size() < frame::CONNECTION_PREFACE.len() {
                return Ok(events);
            }
            let prefix = self.buffer.peek(frame::CONNECTION_PREFACE.len())?;
            if !frame::is_h2c_preface(prefix) {
                return Err(Error::protocol("missing connection preface"));
            }
            self.buffer.read(frame::CONNECTION_PREFACE.len())?;
            self.preface_received = true;
            tracing::debug!("connection preface received");
        }

        loop {
            if self.buffer.size() < frame::FRAME_HEADER_LEN {
                break;
            }
            let Some(parsed) = frame::parse(&mut self.buffer)? else {
                break;
            };
            events.extend(self.handle_frame(parsed)?);
        }
        self.buffer.compact();
        Ok(events)
    }

    fn handle_frame(&mut self, frame: Frame) -> Result<Vec<Event>, Error> {
        match frame {
            Frame::Headers {
                stream_id,
                end_stream,
                end_headers,
                priority,
                header_block,
            } => {
                if end_headers {
                    self.finish_header_block(stream_id, end_stream, priority, header_block)
                } else {
                    if header_block.len() > MAX_HEADER_BLOCK_SIZE {
                        return Err(Error::protocol("header block exceeds configured maximum"));
                    }
                    self.pending = Some(PendingHeaderBlock {
                        stream_id,
                        end_stream,
                        priority,
                        bytes: header_block,
                    });
                    Ok(Vec::new())
                }
            }
            Frame::Continuation {
                stream_id,
                end_headers,
                header_block,
            } => {
                let pending = self
                    .pending
                    .as_mut()
                    .ok_or_else(|| Error::protocol("CONTINUATION without preceding HEADERS"))?;
                if pending.stream_id != stream_id {
                    return Err(Error::protocol("CONTINUATION stream id mismatch"));
                }
                pending.bytes.extend(header_block);
                if pending.bytes.len() > MAX_HEADER_BLOCK_SIZE {
                    return Err(Error::protocol("header block exceeds configured maximum"));
                }
                if end_headers {
                    let pending = self.pending.take().unwrap();
                    self.finish_header_block(
                        pending.stream_id,
                        pending.end_stream,
                        pending.priority,
                        pending.bytes,
                    )
                } else {
                    Ok(Vec::new())
                }
            }
            Frame::Data {
                stream_id,
                end_stream,
                data,
            } => {
                self.recv_window.receive(data.len())?;
                let stream = self.stream_mut(stream_id);
                let events = stream
                    .recv_data(data, end_stream)
                    .map_err(|_| Error::stream(stream_id, ErrorCode::StreamClosed, "DATA on non-open stream"))?;
                Ok(self.stream_events_to_conn_events(stream_id, events))
            }
            Frame::Priority {
                stream_id,
                priority,
            } => {
                let stream = self.stream_mut(stream_id);
                let events = stream.recv_priority(priority);
                Ok(self.stream_events_to_conn_events(stream_id, events))
            }
            Frame::RstStream {
                stream_id,
                error_code,
            } => {
                tracing::debug!(stream_id, ?error_code, "stream reset by peer");
                let stream = self.stream_mut(stream_id);
                let events = stream.recv_rst_stream(error_code);
                Ok(self.stream_events_to_conn_events(stream_id, events))
            }
            Frame::Settings { ack, settings } => {
                if ack {
                    return Ok(vec![Event::SettingsAck]);
                }
                for s in &settings {
                    if let Setting::InitialWindowSize(n) = s {
                        self.initial_window_size = *n as i64;
                        for stream in self.streams.values_mut() {
                            stream.apply_initial_window_change(*n as i64)?;
                        }
                    }
                    if let Setting::HeaderTableSize(n) = s {
                        self.decoder.set_max_table_size(*n as usize);
                    }
                }
                Ok(vec![Event::Settings(settings)])
            }
            Frame::PushPromise {
                stream_id,
                promised_stream_id,
                end_headers: _,
                header_block: _,
            } => {
                self.stream_mut(promised_stream_id).reserve_remote()?;
                Ok(vec![Event::PushPromise {
                    stream_id,
                    promised_stream_id,
                }])
            }
            Frame::Ping { ack, payload } => Ok(vec![Event::Ping { ack, payload }]),
            Frame::GoAway {
                last_stream_id,
                error_code,
                debug_data,
            } => {
                tracing::info!(last_stream_id, ?error_code, "peer sent GOAWAY");
                Ok(vec![Event::GoAway {
                    last_stream_id,
                    error_code,
                    debug_data,
                }])
            }
            Frame::WindowUpdate {
                stream_id,
                increment,
            } => {
                if stream_id == 0 {
                    self.send_window.apply_window_update(increment)?;
                } else {
                    self.stream_mut(stream_id).recv_window_update(increment)?;
                }
                Ok(vec![Event::WindowUpdate {
                    stream_id,
                    increment,
                }])
            }
            Frame::AltSvc { .. } | Frame::Blocked { .. } | Frame::Unknown { .. } => Ok(Vec::new()),
        }
    }

    fn finish_header_block(
        &mut self,
        stream_id: u32,
        end_stream: bool,
        priority: Option<Priority>,
        header_block: Vec<u8>,
    ) -> Result<Vec<Event>, Error> {
        let headers = self.decoder.decode(&header_block)?;
        let stream = self.stream_mut(stream_id);
        let mut events = stream.recv_headers(headers.clone(), end_stream)?;
        if let Some(p) = priority {
            events.extend(stream.recv_priority(p));
        }
        let mut out = self.stream_events_to_conn_events(stream_id, events);
        // The `Headers` conn-event carries `end_stream` directly; patch it
        // in since `stream_events_to_conn_events` does not see the frame.
        for e in out.iter_mut() {
            if let Event::Headers { end_stream: es, .. } = e {
                *es = end_stream;
            }
        }
        Ok(out)
    }

    /// Encode an outbound header list into one or more HEADERS/CONTINUATION
    /// frames, splitting at `max_frame_size` if the compressed block does
    /// not fit in one frame.
    pub fn create_headers(
        &mut self,
        stream_id: u32,
        headers: &[(Vec<u8>, Vec<u8>)],
        end_stream: bool,
        max_frame_size: usize,
    ) -> Result<Vec<u8>, Error> {
        let block = self.encoder.encode(headers)?;
        let chunks: Vec<&[u8]> = block.chunks(max_frame_size.max(1)).collect();
        let chunks: Vec<&[u8]> = if chunks.is_empty() { vec![&[][..]] } else { chunks };
        let last = chunks.len() - 1;

        let mut out = Vec::new();
        out.extend(frame::generate(&Frame::Headers {
            stream_id,
            end_stream,
            end_headers: last == 0,
            priority: None,
            header_block: chunks[0].to_vec(),
        }));
        for (i, chunk) in chunks.iter().enumerate().skip(1) {
            out.extend(frame::generate(&Frame::Continuation {
                stream_id,
                end_headers: i == last,
                header_block: chunk.to_vec(),
            }));
        }
        Ok(out)
    }

    pub fn create_rst_stream(&self, stream_id: u32, error_code: ErrorCode) -> Vec<u8> {
        frame::generate(&Frame::RstStream {
            stream_id,
            error_code,
        })
    }

    pub fn create_goaway(&self, last_stream_id: u32, error_code: ErrorCode, debug_data: Vec<u8>) -> Vec<u8> {
        frame::generate(&Frame::GoAway {
            last_stream_id,
            error_code,
            debug_data,
        })
    }

    pub fn create_settings_ack(&self) -> Vec<u8> {
        frame::generate(&Frame::Settings {
            ack: true,
            settings: Vec::new(),
        })
    }

    pub fn create_settings(&self, settings: Vec<Setting>) -> Vec<u8> {
        frame::generate(&Frame::Settings {
            ack: false,
            settings,
        })
    }

    pub fn create_ping_ack(&self, payload: [u8; 8]) -> Vec<u8> {
        frame::generate(&Frame::Ping { ack: true, payload })
    }

    pub fn create_window_update(&self, stream_id: u32, increment: u32) -> Vec<u8> {
        frame::generate(&Frame::WindowUpdate {
            stream_id,
            increment,
        })
    }
}
