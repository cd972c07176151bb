use h2_endpoint_core::connection::Connection;
use h2_endpoint_core::error::Error;
use h2_endpoint_core::frame::{self, Frame};
use h2_endpoint_core::hpack::HpackOptions;

#[test]
fn data_before_any_headers_is_a_stream_error_not_fatal() {
    let mut conn = Connection::new(false, HpackOptions::default());
    let data = frame::generate(&Frame::Data {
        stream_id: 1,
        end_stream: false,
        data: b"x".to_vec(),
    });
    match conn.process(&data) {
        Err(Error::Stream { stream_id, .. }) => assert_eq!(stream_id, 1),
        other => panic!("expected a stream error, got {other:?}"),
    }
}

#[test]
fn malformed_settings_payload_is_a_protocol_error() {
    let mut conn = Connection::new(false, HpackOptions::default());
    let header = frame::FrameHeader {
        length: 5,
        frame_type: frame::frame_type::SETTINGS,
        flags: 0,
        stream_id: 0,
    };
    let mut bytes = header.encode().to_vec();
    bytes.extend_from_slice(&[0, 0, 0, 0, 0]);
    assert!(matches!(conn.process(&bytes), Err(Error::Protocol(_))));
}

#[test]
fn oversized_rst_stream_payload_is_a_protocol_error() {
    let mut conn = Connection::new(false, HpackOptions::default());
    let header = frame::FrameHeader {
        length: 5,
        frame_type: frame::frame_type::RST_STREAM,
        flags: 0,
        stream_id: 1,
    };
    let mut bytes = header.encode().to_vec();
    bytes.extend_from_slice(&[0, 0, 0, 8, 0]);
    assert!(matches!(conn.process(&bytes), Err(Error::Protocol(_))));
}

#[test]
fn oversize_frame_length_is_a_compression_error() {
    let mut conn = Connection::new(false, HpackOptions::default());
    let header = frame::FrameHeader {
        length: 1 << 14,
        frame_type: frame::frame_type::DATA,
        flags: 0,
        stream_id: 1,
    };
    let mut bytes = header.encode().to_vec();
    bytes.extend(vec![0u8; 1 << 14]);
    assert!(matches!(conn.process(&bytes), Err(Error::Compression(_))));
}

#[test]
fn unrecognized_flag_on_a_known_frame_type_is_a_compression_error() {
    let mut conn = Connection::new(false, HpackOptions::default());
    // GOAWAY carries no flags at all.
    let header = frame::FrameHeader {
        length: 8,
        frame_type: frame::frame_type::GOAWAY,
        flags: 0x1,
        stream_id: 0,
    };
    let mut bytes = header.encode().to_vec();
    bytes.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0]);
    assert!(matches!(conn.process(&bytes), Err(Error::Compression(_))));
}

#[test]
fn garbled_header_block_is_a_compression_error() {
    let mut conn = Connection::new(false, HpackOptions::default());
    // Indexed representation referencing an index far outside the table.
    let bad_block = vec![0xff, 0xff, 0xff, 0x7f];
    let bytes = frame::generate(&Frame::Headers {
        stream_id: 1,
        end_stream: true,
        end_headers: true,
        priority: None,
        header_block: bad_block,
    });
    assert!(matches!(conn.process(&bytes), Err(Error::Compression(_))));
}
