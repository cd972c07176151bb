use h2_endpoint_core::connection::{Connection, Event};
use h2_endpoint_core::frame::{self, Frame};
use h2_endpoint_core::hpack::HpackOptions;

#[test]
fn server_connection_requires_preface_before_frames() {
    let mut conn = Connection::new(true, HpackOptions::default());
    let settings = frame::generate(&Frame::Settings {
        ack: false,
        settings: vec![],
    });
    // Sent without the preface first: must fail rather than silently parse.
    assert!(conn.process(&settings).is_err());
}

#[test]
fn client_connection_does_not_expect_a_preface() {
    let mut conn = Connection::new(false, HpackOptions::default());
    let settings = frame::generate(&Frame::Settings {
        ack: false,
        settings: vec![],
    });
    let events = conn.process(&settings).unwrap();
    assert_eq!(events, vec![Event::Settings(vec![])]);
}

#[test]
fn preface_arriving_in_two_pieces_is_recognized() {
    let mut conn = Connection::new(true, HpackOptions::default());
    let (first, second) = frame::CONNECTION_PREFACE.split_at(10);
    assert!(conn.process(first).unwrap().is_empty());
    assert!(!conn.preface_received());
    let settings = frame::generate(&Frame::Settings {
        ack: false,
        settings: vec![],
    });
    let mut rest = second.to_vec();
    rest.extend(settings);
    let events = conn.process(&rest).unwrap();
    assert!(conn.preface_received());
    assert_eq!(events, vec![Event::Settings(vec![])]);
}

#[test]
fn garbage_instead_of_preface_is_a_protocol_error() {
    let mut conn = Connection::new(true, HpackOptions::default());
    let garbage = b"GET / HTTP/1.1\r\nHost: x\r\n\r\n";
    assert!(garbage.len() >= frame::CONNECTION_PREFACE.len());
    assert!(conn.process(garbage).is_err());
}
