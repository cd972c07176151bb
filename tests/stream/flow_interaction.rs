use h2_endpoint_core::{Stream, StreamEvent};

#[test]
fn send_data_is_rejected_once_the_window_is_exhausted() {
    let mut s = Stream::new(1, 10, 65_535);
    s.recv_headers(vec![], false).unwrap();
    s.send_data(10, false).unwrap();
    assert_eq!(s.send_window(), 0);
    assert!(s.send_data(1, false).is_err());
}

#[test]
fn receiving_past_half_the_window_queues_a_local_window_update() {
    let mut s = Stream::new(1, 100, 100);
    s.recv_headers(vec![], false).unwrap();
    let events = s.recv_data(vec![0u8; 60], false).unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, StreamEvent::LocalWindow(60))));
    assert_eq!(s.recv_window(), 100);
}

#[test]
fn a_window_update_frame_arriving_on_a_debited_stream_restores_capacity() {
    let mut s = Stream::new(1, 50, 65_535);
    s.recv_headers(vec![], false).unwrap();
    s.send_data(50, false).unwrap();
    assert_eq!(s.send_window(), 0);
    s.recv_window_update(200).unwrap();
    assert_eq!(s.send_window(), 200);
}

#[test]
fn settings_driven_initial_window_change_propagates_to_the_stream() {
    let mut s = Stream::new(1, 65_535, 65_535);
    s.recv_headers(vec![], false).unwrap();
    s.send_data(65_000, false).unwrap();
    s.apply_initial_window_change(1_000).unwrap();
    assert_eq!(s.send_window(), 1_000 - 65_000);
}

#[test]
fn receiving_more_than_the_window_allows_is_a_stream_level_error() {
    let mut s = Stream::new(1, 65_535, 10);
    s.recv_headers(vec![], false).unwrap();
    assert!(s.recv_data(vec![0u8; 11], false).is_err());
}
