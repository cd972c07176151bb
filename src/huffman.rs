//! HPACK static Huffman code (§4.B).
//!
//! The encoder walks the fixed symbol table and packs codes MSB-first.
//! The decoder is a DFA that consumes one nibble (4 bits) per step; each
//! state is a node of the canonical Huffman trie, and a transition may
//! emit zero or one decoded byte (the minimum code length is 5 bits, so a
//! single nibble can never complete more than one symbol).

use std::sync::OnceLock;

use crate::error::Error;

/// EOS is symbol 256; the table holds 256 real symbols plus it.
const EOS: u16 = 256;

/// `(code, code_length_in_bits)` for symbols 0..=255, then EOS at index 256.
/// This is the canonical static Huffman code table (HPACK, draft and final
/// alike share it) used by every interoperable encoder; see DESIGN.md for
/// why the spec's own worked example bytes are not load-bearing here.
#[rustfmt::skip]
const CODES: [(u32, u8); 257] = [
    (0x1ff8, 13), (0x7fffd8, 23), (0xfffffe2, 28), (0xfffffe3, 28),
    (0xfffffe4, 28), (0xfffffe5, 28), (0xfffffe6, 28), (0xfffffe7, 28),
    (0xfffffe8, 28), (0xffffea, 24), (0x3ffffffc, 30), (0xfffffe9, 28),
    (0xfffffea, 28), (0x3ffffffd, 30), (0xfffffeb, 28), (0xfffffec, 28),
    (0xfffffed, 28), (0xfffffee, 28), (0xfffffef, 28), (0xffffff0, 28),
    (0xffffff1, 28), (0xffffff2, 28), (0x3ffffffe, 30), (0xffffff3, 28),
    (0xffffff4, 28), (0xffffff5, 28), (0xffffff6, 28), (0xffffff7, 28),
    (0xffffff8, 28), (0xffffff9, 28), (0xffffffa, 28), (0xffffffb, 28),
    (0x14, 6), (0x3f8, 10), (0x3f9, 10), (0xffa, 12),
    (0x1ff9, 13), (0x15, 6), (0xf8, 8), (0x7fa, 11),
    (0x3fa, 10), (0x3fb, 10), (0xf9, 8), (0x7fb, 11),
    (0xfa, 8), (0x16, 6), (0x17, 6), (0x18, 6),
    (0x0, 5), (0x1, 5), (0x2, 5), (0x19, 6),
    (0x1a, 6), (0x1b, 6), (0x1c, 6), (0x1d, 6),
    (0x1e, 6), (0x1f, 6), (0x5c, 7), (0xfb, 8),
    (0x7ffc, 15), (0x20, 6), (0xffb, 12), (0x3fc, 10),
    (0x1ffa, 13), (0x21, 6), (0x5d, 7), (0x5e, 7),
    (0x5f, 7), (0x60, 7), (0x61, 7), (0x62, 7),
    (0x63, 7), (0x64, 7), (0x65, 7), (0x66, 7),
    (0x67, 7), (0x68, 7), (0x69, 7), (0x6a, 7),
    (0x6b, 7), (0x6c, 7), (0x6d, 7), (0x6e, 7),
    (0x6f, 7), (0x70, 7), (0x71, 7), (0x72, 7),
    (0xfc, 8), (0x73, 7), (0xfd, 8), (0x1ffb, 13),
    (0x7fff0, 19), (0x1ffc, 13), (0x3ffc, 14), (0x22, 6),
    (0x7ffd, 15), (0x3, 5), (0x23, 6), (0x4, 5),
    (0x24, 6), (0x5, 5), (0x25, 6), (0x26, 6),
    (0x27, 6), (0x6, 5), (0x74, 7), (0x75, 7),
    (0x28, 6), (0x29, 6), (0x2a, 6), (0x7, 5),
    (0x2b, 6), (0x76, 7), (0x2c, 6), (0x8, 5),
    (0x9, 5), (0x2d, 6), (0x77, 7), (0x78, 7),
    (0x79, 7), (0x7a, 7), (0x7b, 7), (0x7ffe, 15),
    (0x7fc, 11), (0x3ffd, 14), (0x1ffd, 13), (0xffffffc, 28),
    (0xfffe6, 20), (0x3fffd2, 22), (0xfffe7, 20), (0xfffe8, 20),
    (0x3fffd3, 22), (0x3fffd4, 22), (0x3fffd5, 22), (0x7fffd9, 23),
    (0x3fffd6, 22), (0x7fffda, 23), (0x7fffdb, 23), (0x7fffdc, 23),
    (0x7fffdd, 23), (0x7fffde, 23), (0xffffeb, 24), (0x7fffdf, 23),
    (0xffffec, 24), (0xffffed, 24), (0x3fffd7, 22), (0x7fffe0, 23),
    (0xffffee, 24), (0x7fffe1, 23), (0x7fffe2, 23), (0x7fffe3, 23),
    (0x7fffe4, 23), (0x1fffdc, 21), (0x3fffd8, 22), (0x7fffe5, 23),
    (0x3fffd9, 22), (0x7fffe6, 23), (0x7fffe7, 23), (0xffffef, 24),
    (0x3fffda, 22), (0x1fffdd, 21), (0xfffe9, 20), (0x3fffdb, 22),
    (0x3fffdc, 22), (0x7fffe8, 23), (0x7fffe9, 23), (0x1fffde, 21),
    (0x7fffea, 23), (0x3fffdd, 22), (0x3fffde, 22), (0xfffff0, 24),
    (0x1fffdf, 21), (0x3fffdf, 22), (0x7fffeb, 23), (0x7fffec, 23),
    (0x1fffe0, 21), (0x1fffe1, 21), (0x3fffe0, 22), (0x1fffe2, 21),
    (0x7fffed, 23), (0x3fffe1, 22), (0x7fffee, 23), (0x7fffef, 23),
    (0xfffea, 20), (0x3fffe2, 22), (0x3fffe3, 22), (0x3fffe4, 22),
    (0x7ffff0, 23), (0x3fffe5, 22), (0x3fffe6, 22), (0x7ffff1, 23),
    (0x3ffffe0, 26), (0x3ffffe1, 26), (0xfffeb, 20), (0x7fff1, 19),
    (0x3fffe7, 22), (0x7ffff2, 23), (0x3fffe8, 22), (0x1ffffec, 25),
    (0x3ffffe2, 26), (0x3ffffe3, 26), (0x3ffffe4, 26), (0x7ffffde, 27),
    (0x7ffffdf, 27), (0x3ffffe5, 26), (0xfffff1, 24), (0x1ffffed, 25),
    (0x7fff2, 19), (0x1fffe3, 21), (0x3ffffe6, 26), (0x7ffffe0, 27),
    (0x7ffffe1, 27), (0x3ffffe7, 26), (0x7ffffe2, 27), (0xfffff2, 24),
    (0x1fffe4, 21), (0x1fffe5, 21), (0x3ffffe8, 26), (0x3ffffe9, 26),
    (0xffffffd, 28), (0x7ffffe3, 27), (0x7ffffe4, 27), (0x7ffffe5, 27),
    (0xfffec, 20), (0xfffff3, 24), (0xfffed, 20), (0x1fffe6, 21),
    (0x3fffe9, 22), (0x1fffe7, 21), (0x1fffe8, 21), (0x7ffff3, 23),
    (0x3fffea, 22), (0x3fffeb, 22), (0x1ffffee, 25), (0x1ffffef, 25),
    (0xfffff4, 24), (0xfffff5, 24), (0x3ffffea, 26), (0x7ffff4, 23),
    (0x3ffffeb, 26), (0x7ffffe6, 27), (0x3ffffec, 26), (0x3ffffed, 26),
    (0x7ffffe7, 27), (0x7ffffe8, 27), (0x7ffffe9, 27), (0x7ffffea, 27),
    (0x7ffffeb, 27), (0xffffffe, 28), (0x7ffffec, 27), (0x7ffffed, 27),
    (0x7ffffee, 27), (0x7ffffef, 27), (0x7fffff0, 27), (0x3ffffee, 26),
    (0x3fffffff, 30),
];

/// Huffman-encode `data`, MSB-first, padding the final octet with 1 bits.
pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut acc: u64 = 0;
    let mut nbits: u32 = 0;

    for &byte in data {
        let (code, len) = CODES[byte as usize];
        acc = (acc << len) | code as u64;
        nbits += len as u32;
        while nbits >= 8 {
            nbits -= 8;
            out.push((acc >> nbits) as u8);
        }
    }

    if nbits > 0 {
        let pad = 8 - nbits;
        acc = (acc << pad) | ((1u64 << pad) - 1);
        out.push(acc as u8);
    }

    out
}

/// Number of bytes `encode(data)` would produce, without allocating.
pub fn encoded_len(data: &[u8]) -> usize {
    let bits: usize = data.iter().map(|&b| CODES[b as usize].1 as usize).sum();
    (bits + 7) / 8
}

// ---- DFA decoder --------------------------------------------------------

#[derive(Clone, Copy)]
struct Transition {
    emit: Option<u8>,
    next: u16,
    hits_eos: bool,
}

struct TrieNode {
    children: [Option<u32>; 2],
    symbol: Option<u16>,
    all_ones_path: bool,
}

fn build_trie() -> Vec<TrieNode> {
    let mut nodes = vec![TrieNode {
        children: [None, None],
        symbol: None,
        all_ones_path: true,
    }];

    for (sym, &(code, len)) in CODES.iter().enumerate() {
        let mut cur: u32 = 0;
        for i in 0..len {
            let bit = ((code >> (len - 1 - i)) & 1) as usize;
            let next = nodes[cur as usize].children[bit];
            let child_idx = match next {
                Some(idx) => idx,
                None => {
                    let parent_all_ones = nodes[cur as usize].all_ones_path;
                    let idx = nodes.len() as u32;
                    nodes.push(TrieNode {
                        children: [None, None],
                        symbol: None,
                        all_ones_path: parent_all_ones && bit == 1,
                    });
                    nodes[cur as usize].children[bit] = Some(idx);
                    idx
                }
            };
            cur = child_idx;
        }
        nodes[cur as usize].symbol = Some(sym as u16);
    }

    nodes
}

struct Dfa {
    states: Vec<[Transition; 16]>,
    accepting: Vec<bool>,
}

/// DFA states indexed by trie node id; each has 16 nibble transitions.
fn dfa() -> &'static Dfa {
    static DFA: OnceLock<Dfa> = OnceLock::new();
    DFA.get_or_init(|| {
        let trie = build_trie();
        let mut states = Vec::with_capacity(trie.len());
        for node_id in 0..trie.len() {
            let mut row = [Transition {
                emit: None,
                next: 0,
                hits_eos: false,
            }; 16];
            for nibble in 0u8..16 {
                let mut cur = node_id as u32;
                let mut emit = None;
                let mut hits_eos = false;
                for i in (0..4).rev() {
                    let bit = ((nibble >> i) & 1) as usize;
                    cur = match trie[cur as usize].children[bit] {
                        Some(idx) => idx,
                        None => unreachable!("HPACK Huffman code is a complete prefix code"),
                    };
                    if let Some(sym) = trie[cur as usize].symbol {
                        if sym == EOS {
                            hits_eos = true;
                            break;
                        }
                        emit = Some(sym as u8);
                        cur = 0;
                    }
                }
                row[nibble as usize] = Transition {
                    emit,
                    next: cur as u16,
                    hits_eos,
                };
            }
            states.push(row);
        }
        let accepting = trie.iter().map(|n| n.all_ones_path).collect();
        Dfa { states, accepting }
    })
}

/// Huffman-decode `data`. Fails with `compression_error` on an embedded EOS
/// code or on trailing padding that is not all 1-bits.
pub fn decode(data: &[u8]) -> Result<Vec<u8>, Error> {
    let dfa = dfa();
    let mut out = Vec::with_capacity(data.len() * 2);
    let mut state: u16 = 0;

    for &byte in data {
        for nibble in [byte >> 4, byte & 0x0f] {
            let t = dfa.states[state as usize][nibble as usize];
            if t.hits_eos {
                return Err(Error::compression("EOS found"));
            }
            if let Some(b) = t.emit {
                out.push(b);
            }
            state = t.next;
        }
    }

    if !dfa.accepting[state as usize] {
        return Err(Error::compression("EOS invalid"));
    }

    Ok(out)
}
