//! Per-stream lifecycle state machine (§4.G), modeled after RFC 7540 §5.1's
//! stream state diagram: idle, reserved (via server push), open,
//! half-closed in either direction, and closed.
//!
//! A [`Stream`] does not touch the wire; `recv_*`/`send_*` methods are
//! called once the caller has already decided a frame applies to this
//! stream, and return the events the driver should surface.

use crate::error::{Error, ErrorCode};
use crate::flow::FlowController;
use crate::frame::Priority;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    ReservedLocal,
    ReservedRemote,
    Open,
    HalfClosedLocal,
    HalfClosedRemote,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// The stream left `Idle` and became usable for headers/data.
    Active,
    /// The stream entered a reserved state via PUSH_PROMISE.
    Reserved,
    Headers(Vec<(Vec<u8>, Vec<u8>)>),
    Data(Vec<u8>),
    Priority(Priority),
    /// One side has sent its last frame; the stream is now half-closed.
    HalfClose,
    /// The stream is fully closed; carries the reason.
    Close(ErrorCode),
    /// A WINDOW_UPDATE changed this stream's send window.
    Window(u32),
    /// Local processing freed receive-window bytes worth announcing.
    LocalWindow(u32),
}

/// A single HTTP/2 stream's state and flow-control windows.
///
/// Per RFC 7540 §5.1, PRIORITY frames are valid from either peer in any
/// state including `Closed`, so `recv_priority` never consults `state`.
pub struct Stream {
    pub id: u32,
    pub state: StreamState,
    pub weight: u8,
    pub dependency: u32,
    send_window: FlowController,
    recv_window: FlowController,
}

impl Stream {
    pub fn new(id: u32, initial_send_window: i64, initial_recv_window: i64) -> Stream {
        Stream {
            id,
            state: StreamState::Idle,
            weight: 16,
            dependency: 0,
            send_window: FlowController::new(initial_send_window),
            recv_window: FlowController::new(initial_recv_window),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state == StreamState::Closed
    }

    pub fn send_window(&self) -> i64 {
        self.send_window.current_window()
    }

    pub fn recv_window(&self) -> i64 {
        self.recv_window.current_window()
    }

    fn ensure_open_for_headers(&self, receiving: bool) -> Result<(), Error> {
        let ok = match self.state {
            StreamState::Idle => true,
            StreamState::ReservedLocal if !receiving => true,
            StreamState::ReservedRemote if receiving => true,
            StreamState::Open => true,
            StreamState::HalfClosedLocal if receiving => true,
            StreamState::HalfClosedRemote if !receiving => true,
            _ => false,
        };
        if !ok {
            tracing::debug!(stream_id = self.id, state = ?self.state, "HEADERS rejected");
            return Err(Error::stream(
                self.id,
                ErrorCode::StreamClosed,
                "HEADERS not valid in current stream state",
            ));
        }
        Ok(())
    }

    fn advance_after_headers(&mut self, receiving: bool, end_stream: bool) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        self.state = match self.state {
            StreamState::Idle | StreamState::Open => {
                if self.state == StreamState::Idle {
                    events.push(StreamEvent::Active);
                }
                if end_stream {
                    events.push(StreamEvent::HalfClose);
                    if receiving {
                        StreamState::HalfClosedRemote
                    } else {
                        StreamState::HalfClosedLocal
                    }
                } else {
                    StreamState::Open
                }
            }
            StreamState::ReservedLocal | StreamState::ReservedRemote => {
                // A push response's HEADERS moves a reserved stream
                // straight to half-closed: the reserving side can only
                // send (local) or only receive (remote) from here.
                events.push(StreamEvent::HalfClose);
                if receiving {
                    StreamState::HalfClosedLocal
                } else {
                    StreamState::HalfClosedRemote
                }
            }
            StreamState::HalfClosedLocal | StreamState::HalfClosedRemote => {
                events.push(StreamEvent::Close(ErrorCode::NoError));
                StreamState::Closed
            }
            StreamState::Closed => StreamState::Closed,
        };
        events
    }

    pub fn recv_headers(
        &mut self,
        headers: Vec<(Vec<u8>, Vec<u8>)>,
        end_stream: bool,
    ) -> Result<Vec<StreamEvent>, Error> {
        self.ensure_open_for_headers(true)?;
        let mut events = self.advance_after_headers(true, end_stream);
        events.insert(0, StreamEvent::Headers(headers));
        Ok(events)
    }

    pub fn send_headers(
        &mut self,
        headers: Vec<(Vec<u8>, Vec<u8>)>,
        end_stream: bool,
    ) -> Result<Vec<StreamEvent>, Error> {
        self.ensure_open_for_headers(false)?;
        let mut events = self.advance_after_headers(false, end_stream);
        events.insert(0, StreamEvent::Headers(headers));
        Ok(events)
    }

    fn ensure_open_for_data(&self, receiving: bool) -> Result<(), Error> {
        let ok = match self.state {
            StreamState::Open => true,
            StreamState::HalfClosedLocal if receiving => true,
            StreamState::HalfClosedRemote if !receiving => true,
            _ => false,
        };
        if !ok {
            return Err(Error::stream(
                self.id,
                ErrorCode::StreamClosed,
                "DATA not valid in current stream state",
            ));
        }
        Ok(())
    }

    pub fn recv_data(&mut self, data: Vec<u8>, end_stream: bool) -> Result<Vec<StreamEvent>, Error> {
        self.ensure_open_for_data(true)?;
        self.recv_window.receive(data.len())?;
        let mut events = vec![StreamEvent::Data(data)];
        if let Some(increment) = self.recv_window.create_window_update() {
            events.push(StreamEvent::LocalWindow(increment));
        }
        if end_stream {
            events.push(StreamEvent::HalfClose);
            self.state = match self.state {
                StreamState::Open => StreamState::HalfClosedRemote,
                _ => {
                    events.push(StreamEvent::Close(ErrorCode::NoError));
                    StreamState::Closed
                }
            };
        }
        Ok(events)
    }

    pub fn send_data(&mut self, len: usize, end_stream: bool) -> Result<Vec<StreamEvent>, Error> {
        self.ensure_open_for_data(false)?;
        self.send_window.debit_send(len)?;
        let mut events = Vec::new();
        if end_stream {
            events.push(StreamEvent::HalfClose);
            self.state = match self.state {
                StreamState::Open => StreamState::HalfClosedLocal,
                _ => {
                    events.push(StreamEvent::Close(ErrorCode::NoError));
                    StreamState::Closed
                }
            };
        }
        Ok(events)
    }

    /// PRIORITY is legal from either peer in any state, including after
    /// the stream has closed (RFC 7540 §5.1); it never errors.
    pub fn recv_priority(&mut self, priority: Priority) -> Vec<StreamEvent> {
        self.weight = priority.weight;
        self.dependency = priority.dependency;
        vec![StreamEvent::Priority(priority)]
    }

    pub fn reserve_local(&mut self) -> Result<Vec<StreamEvent>, Error> {
        if self.state != StreamState::Idle {
            return Err(Error::protocol("PUSH_PROMISE on a non-idle stream"));
        }
        self.state = StreamState::ReservedLocal;
        Ok(vec![StreamEvent::Reserved])
    }

    pub fn reserve_remote(&mut self) -> Result<Vec<StreamEvent>, Error> {
        if self.state != StreamState::Idle {
            return Err(Error::protocol("PUSH_PROMISE on a non-idle stream"));
        }
        self.state = StreamState::ReservedRemote;
        Ok(vec![StreamEvent::Reserved])
    }

    pub fn recv_rst_stream(&mut self, code: ErrorCode) -> Vec<StreamEvent> {
        self.state = StreamState::Closed;
        vec![StreamEvent::Close(code)]
    }

    pub fn local_rst(&mut self, code: ErrorCode) -> Vec<StreamEvent> {
        self.state = StreamState::Closed;
        vec![StreamEvent::Close(code)]
    }

    pub fn recv_window_update(&mut self, increment: u32) -> Result<Vec<StreamEvent>, Error> {
        self.send_window.apply_window_update(increment)?;
        Ok(vec![StreamEvent::Window(increment)])
    }

    pub fn apply_initial_window_change(&mut self, new_initial: i64) -> Result<(), Error> {
        self.send_window.adjust_initial_window(new_initial)
    }
}
