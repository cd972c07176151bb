use h2_endpoint_core::hpack::{Compressor, Decompressor, HpackOptions};

fn pairs(headers: &[(&str, &str)]) -> Vec<(Vec<u8>, Vec<u8>)> {
    headers
        .iter()
        .map(|(n, v)| (n.as_bytes().to_vec(), v.as_bytes().to_vec()))
        .collect()
}

#[test]
fn encoding_static_table_only_headers_is_small() {
    let mut enc = Compressor::new(HpackOptions::default());
    let headers = pairs(&[(":method", "GET"), (":scheme", "http"), (":path", "/")]);
    let block = enc.encode(&headers).unwrap();
    // Three pure static-table hits plus at most a handful of refset
    // bookkeeping bytes should stay well under naive literal encoding.
    assert!(block.len() < 10, "block was {} bytes: {:?}", block.len(), block);
}

#[test]
fn literal_header_grows_the_dynamic_table() {
    let mut enc = Compressor::new(HpackOptions::default());
    let headers = pairs(&[("x-custom-key", "custom-value")]);
    enc.encode(&headers).unwrap();
    assert_eq!(enc.context().table_len(), 1);
}

#[test]
fn never_indexed_mode_never_grows_the_table() {
    let mut enc = Compressor::new(HpackOptions::NAIVE);
    enc.encode(&pairs(&[("x-secret", "value")])).unwrap();
    assert_eq!(enc.context().table_len(), 0);
}

#[test]
fn second_identical_block_is_no_larger_than_the_first() {
    let mut enc = Compressor::new(HpackOptions::default());
    let mut dec = Decompressor::new(HpackOptions::default());
    let headers = pairs(&[
        (":method", "GET"),
        (":scheme", "http"),
        (":path", "/"),
        (":authority", "www.example.com"),
    ]);
    let first = enc.encode(&headers).unwrap();
    dec.decode(&first).unwrap();
    let second = enc.encode(&headers).unwrap();
    assert!(second.len() <= first.len());
}

#[test]
fn huffman_shorter_mode_only_uses_huffman_when_it_helps() {
    let mut enc = Compressor::new(HpackOptions::default());
    // Highly repetitive text compresses well under Huffman.
    let block = enc
        .encode(&pairs(&[("x-note", "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa")]))
        .unwrap();
    assert!(block.len() < 40);
}
