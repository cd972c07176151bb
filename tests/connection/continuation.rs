use h2_endpoint_core::connection::{Connection, Event};
use h2_endpoint_core::frame::{self, Frame};
use h2_endpoint_core::hpack::{Compressor, HpackOptions};

fn big_header_block() -> Vec<u8> {
    let headers: Vec<(Vec<u8>, Vec<u8>)> = (0..50)
        .map(|i| {
            (
                format!("x-custom-{i}").into_bytes(),
                format!("value-{i}-{}", "x".repeat(20)).into_bytes(),
            )
        })
        .collect();
    Compressor::new(HpackOptions::default()).encode(&headers).unwrap()
}

#[test]
fn header_block_split_across_continuation_frames_reassembles() {
    let mut conn = Connection::new(false, HpackOptions::default());
    let block = big_header_block();
    let split = block.len() / 3;

    let mut bytes = frame::generate(&Frame::Headers {
        stream_id: 1,
        end_stream: true,
        end_headers: false,
        priority: None,
        header_block: block[..split].to_vec(),
    });
    bytes.extend(frame::generate(&Frame::Continuation {
        stream_id: 1,
        end_headers: false,
        header_block: block[split..2 * split].to_vec(),
    }));
    bytes.extend(frame::generate(&Frame::Continuation {
        stream_id: 1,
        end_headers: true,
        header_block: block[2 * split..].to_vec(),
    }));

    let events = conn.process(&bytes).unwrap();
    match &events[0] {
        Event::Headers {
            stream_id,
            headers,
            end_stream,
        } => {
            assert_eq!(*stream_id, 1);
            assert!(*end_stream);
            assert_eq!(headers.len(), 50);
        }
        other => panic!("expected Headers event, got {other:?}"),
    }
}

#[test]
fn continuation_without_preceding_headers_is_a_protocol_error() {
    let mut conn = Connection::new(false, HpackOptions::default());
    let cont = frame::generate(&Frame::Continuation {
        stream_id: 1,
        end_headers: true,
        header_block: vec![0x80],
    });
    assert!(conn.process(&cont).is_err());
}

#[test]
fn continuation_for_a_different_stream_is_a_protocol_error() {
    let mut conn = Connection::new(false, HpackOptions::default());
    let block = big_header_block();
    let split = block.len() / 2;
    let mut bytes = frame::generate(&Frame::Headers {
        stream_id: 1,
        end_stream: false,
        end_headers: false,
        priority: None,
        header_block: block[..split].to_vec(),
    });
    bytes.extend(frame::generate(&Frame::Continuation {
        stream_id: 3,
        end_headers: true,
        header_block: block[split..].to_vec(),
    }));
    assert!(conn.process(&bytes).is_err());
}

#[test]
fn create_headers_splits_large_block_and_round_trips() {
    let mut conn = Connection::new(false, HpackOptions::default());
    let headers: Vec<(Vec<u8>, Vec<u8>)> = (0..50)
        .map(|i| {
            (
                format!("x-custom-{i}").into_bytes(),
                format!("value-{i}-{}", "x".repeat(20)).into_bytes(),
            )
        })
        .collect();
    let bytes = conn.create_headers(1, &headers, true, 64).unwrap();

    let mut receiver = Connection::new(false, HpackOptions::default());
    let events = receiver.process(&bytes).unwrap();
    match &events[0] {
        Event::Headers { headers: got, .. } => assert_eq!(got.len(), 50),
        other => panic!("expected Headers event, got {other:?}"),
    }
}
