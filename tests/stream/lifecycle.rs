use h2_endpoint_core::frame::Priority;
use h2_endpoint_core::{ErrorCode, Stream, StreamEvent, StreamState};

fn priority(weight: u8) -> Priority {
    Priority {
        exclusive: false,
        dependency: 0,
        weight,
    }
}

#[test]
fn server_receives_request_then_sends_response_and_closes() {
    let mut s = Stream::new(1, 65_535, 65_535);
    s.recv_headers(vec![(b":method".to_vec(), b"GET".to_vec())], true)
        .unwrap();
    assert_eq!(s.state, StreamState::HalfClosedRemote);

    let events = s
        .send_headers(vec![(b":status".to_vec(), b"200".to_vec())], true)
        .unwrap();
    assert!(events.contains(&StreamEvent::Close(ErrorCode::NoError)));
    assert!(s.is_closed());
}

#[test]
fn headers_without_end_stream_stays_open_for_data() {
    let mut s = Stream::new(1, 65_535, 65_535);
    s.recv_headers(vec![], false).unwrap();
    assert_eq!(s.state, StreamState::Open);
    s.recv_data(b"body".to_vec(), false).unwrap();
    assert_eq!(s.state, StreamState::Open);
}

#[test]
fn headers_after_the_stream_is_fully_closed_is_rejected() {
    let mut s = Stream::new(1, 65_535, 65_535);
    s.recv_headers(vec![], true).unwrap();
    s.send_headers(vec![], true).unwrap();
    assert!(s.is_closed());
    assert!(s.recv_headers(vec![], false).is_err());
}

#[test]
fn push_promise_reservations_require_an_idle_stream() {
    let mut s = Stream::new(2, 65_535, 65_535);
    s.reserve_remote().unwrap();
    assert_eq!(s.state, StreamState::ReservedRemote);
    assert!(s.reserve_remote().is_err());
}

#[test]
fn pushed_stream_headers_half_close_the_receiving_side() {
    let mut s = Stream::new(2, 65_535, 65_535);
    s.reserve_remote().unwrap();
    let events = s.recv_headers(vec![], false).unwrap();
    assert!(events.contains(&StreamEvent::HalfClose));
    assert_eq!(s.state, StreamState::HalfClosedLocal);
}

#[test]
fn priority_updates_weight_and_dependency_without_touching_state() {
    let mut s = Stream::new(1, 65_535, 65_535);
    let before = s.state;
    let events = s.recv_priority(priority(42));
    assert_eq!(s.state, before);
    assert_eq!(s.weight, 42);
    assert_eq!(events, vec![StreamEvent::Priority(priority(42))]);
}

#[test]
fn local_rst_and_remote_rst_both_close_immediately() {
    let mut a = Stream::new(1, 65_535, 65_535);
    a.recv_headers(vec![], false).unwrap();
    a.local_rst(ErrorCode::Cancel);
    assert!(a.is_closed());

    let mut b = Stream::new(3, 65_535, 65_535);
    b.recv_headers(vec![], false).unwrap();
    b.recv_rst_stream(ErrorCode::InternalError);
    assert!(b.is_closed());
}
