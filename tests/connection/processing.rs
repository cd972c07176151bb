use h2_endpoint_core::connection::{Connection, Event};
use h2_endpoint_core::frame::{self, Frame};
use h2_endpoint_core::hpack::{Compressor, HpackOptions};

fn encode(headers: &[(&str, &str)]) -> Vec<u8> {
    let pairs: Vec<(Vec<u8>, Vec<u8>)> = headers
        .iter()
        .map(|(n, v)| (n.as_bytes().to_vec(), v.as_bytes().to_vec()))
        .collect();
    Compressor::new(HpackOptions::default()).encode(&pairs).unwrap()
}

#[test]
fn headers_then_data_then_end_stream_closes_the_stream() {
    let mut conn = Connection::new(false, HpackOptions::default());
    let block = encode(&[(":method", "GET"), (":path", "/")]);

    let mut bytes = frame::generate(&Frame::Headers {
        stream_id: 1,
        end_stream: false,
        end_headers: true,
        priority: None,
        header_block: block,
    });
    bytes.extend(frame::generate(&Frame::Data {
        stream_id: 1,
        end_stream: true,
        data: b"body".to_vec(),
    }));

    let events = conn.process(&bytes).unwrap();
    assert!(matches!(
        &events[0],
        Event::Headers { stream_id: 1, end_stream: false, .. }
    ));
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::Data { stream_id: 1, data, end_stream: false } if data == b"body")));
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::StreamClosed { stream_id: 1, .. })));
}

#[test]
fn settings_ack_round_trips_as_its_own_event() {
    let mut conn = Connection::new(false, HpackOptions::default());
    let ack = frame::generate(&Frame::Settings {
        ack: true,
        settings: vec![],
    });
    assert_eq!(conn.process(&ack).unwrap(), vec![Event::SettingsAck]);
}

#[test]
fn ping_is_echoed_back_via_create_ping_ack() {
    let mut conn = Connection::new(false, HpackOptions::default());
    let ping = frame::generate(&Frame::Ping {
        ack: false,
        payload: [7; 8],
    });
    let events = conn.process(&ping).unwrap();
    assert_eq!(
        events,
        vec![Event::Ping {
            ack: false,
            payload: [7; 8]
        }]
    );
    let reply = conn.create_ping_ack([7; 8]);
    assert_eq!(&reply[frame::FRAME_HEADER_LEN..], &[7u8; 8]);
    assert_eq!(reply[4] & 0x1, 0x1, "ACK flag must be set on the reply");
}

#[test]
fn multiple_frames_in_one_chunk_all_produce_events() {
    let mut conn = Connection::new(false, HpackOptions::default());
    let mut bytes = Vec::new();
    bytes.extend(frame::generate(&Frame::Ping {
        ack: false,
        payload: [1; 8],
    }));
    bytes.extend(frame::generate(&Frame::Ping {
        ack: false,
        payload: [2; 8],
    }));
    let events = conn.process(&bytes).unwrap();
    assert_eq!(events.len(), 2);
}

#[test]
fn window_update_on_stream_zero_affects_connection_send_window() {
    let mut conn = Connection::new(false, HpackOptions::default());
    let update = frame::generate(&Frame::WindowUpdate {
        stream_id: 0,
        increment: 100,
    });
    let events = conn.process(&update).unwrap();
    assert_eq!(
        events,
        vec![Event::WindowUpdate {
            stream_id: 0,
            increment: 100
        }]
    );
}
