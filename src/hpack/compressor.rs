//! HPACK encoder (§4.D, encode direction): turns a header list into a
//! header block, driving the shared [`Context`] exactly the way the
//! decompressor will when it reads the bytes back.

use crate::error::Error;
use crate::hpack::context::{Command, Context, NameRef, Options, RefMark};
use crate::hpack::integer;
use crate::hpack::representation::REFSET_EMPTY_BYTE;
use crate::huffman;

pub struct Compressor {
    ctx: Context,
}

impl Compressor {
    pub fn new(options: Options) -> Compressor {
        Compressor {
            ctx: Context::new(options),
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Encode a full header list into one header block.
    pub fn encode(&mut self, headers: &[(Vec<u8>, Vec<u8>)]) -> Result<Vec<u8>, Error> {
        let headers: Vec<(Vec<u8>, Vec<u8>)> = headers
            .iter()
            .map(|(n, v)| (n.to_ascii_lowercase(), v.clone()))
            .collect();

        self.ctx.unmark();
        let mut out = Vec::new();

        let clear_all = self.should_clear_refset(&headers);
        if clear_all {
            self.ctx.process(Command::RefSetEmpty)?;
            out.push(REFSET_EMPTY_BYTE);
        }

        for (name, value) in &headers {
            self.encode_header(&mut out, name, value, clear_all)?;
        }

        if !clear_all {
            let stale: Vec<usize> = self
                .ctx
                .refset()
                .iter()
                .filter(|(_, mark)| *mark == RefMark::None)
                .map(|(idx, _)| *idx)
                .collect();
            for idx in stale {
                self.ctx.process(Command::Indexed(idx))?;
                out.extend(encode_indexed(idx));
            }
        }

        Ok(out)
    }

    fn should_clear_refset(&self, headers: &[(Vec<u8>, Vec<u8>)]) -> bool {
        match self.ctx.options.refset {
            crate::hpack::context::RefSetMode::Never => true,
            crate::hpack::context::RefSetMode::Always => false,
            crate::hpack::context::RefSetMode::Shorter => {
                let mut stale = 0;
                let mut common = 0;
                for (idx, _) in self.ctx.refset() {
                    let in_new = self
                        .ctx
                        .dereference(*idx)
                        .map(|(n, v, _)| headers.iter().any(|(hn, hv)| hn == &n && hv == &v))
                        .unwrap_or(false);
                    if in_new {
                        common += 1;
                    } else {
                        stale += 1;
                    }
                }
                stale > common
            }
        }
    }

    fn encode_header(
        &mut self,
        out: &mut Vec<u8>,
        name: &[u8],
        value: &[u8],
        refset_cleared: bool,
    ) -> Result<(), Error> {
        use crate::hpack::context::IndexMode::*;

        // `index: never` forgoes the table entirely: always a fresh
        // literal, never even an indexed reference to the static table.
        if self.ctx.options.index == Never {
            let cmd = Command::NoIndex {
                name: NameRef::Literal(name.to_vec()),
                value: value.to_vec(),
            };
            return self.emit(out, cmd);
        }

        let (exact, name_only) = self.find(name, value);

        if let Some(idx) = exact {
            if !refset_cleared {
                if let Some(RefMark::None) = self.ctx.refset_mark(idx) {
                    self.ctx.mark_common(idx);
                    return Ok(());
                }
            }
            self.ctx.process(Command::Indexed(idx))?;
            out.extend(encode_indexed(idx));
            return Ok(());
        }

        let name_ref = match name_only {
            Some(idx) => NameRef::Indexed(idx),
            None => NameRef::Literal(name.to_vec()),
        };

        let cmd = match self.ctx.options.index {
            All | Header => Command::Incremental {
                name: name_ref,
                value: value.to_vec(),
            },
            Static | Never => Command::NoIndex {
                name: name_ref,
                value: value.to_vec(),
            },
        };
        self.emit(out, cmd)
    }

    fn emit(&mut self, out: &mut Vec<u8>, cmd: Command) -> Result<(), Error> {
        use crate::hpack::representation::{
            INCREMENTAL_PREFIX, INCREMENTAL_TAG, NEVERINDEXED_PREFIX, NEVERINDEXED_TAG,
            NOINDEX_PREFIX, NOINDEX_TAG,
        };
        let (tag, prefix, name_ref, value): (u8, u8, Option<NameRef>, Option<&[u8]>) = match &cmd
        {
            Command::Incremental { name, value } => {
                (INCREMENTAL_TAG, INCREMENTAL_PREFIX, Some(name.clone()), Some(value))
            }
            Command::NoIndex { name, value } => {
                (NOINDEX_TAG, NOINDEX_PREFIX, Some(name.clone()), Some(value))
            }
            Command::NeverIndexed { name, value } => {
                (NEVERINDEXED_TAG, NEVERINDEXED_PREFIX, Some(name.clone()), Some(value))
            }
            _ => unreachable!("emit only handles literal representations"),
        };

        match &name_ref {
            Some(NameRef::Indexed(idx)) => {
                out.extend(integer::encode((*idx + 1) as u64, prefix, tag));
            }
            Some(NameRef::Literal(bytes)) => {
                out.extend(integer::encode(0, prefix, tag));
                out.extend(self.encode_string(bytes));
            }
            None => unreachable!(),
        }
        if let Some(value) = value {
            out.extend(self.encode_string(value));
        }

        self.ctx.process(cmd)?;
        Ok(())
    }

    fn encode_string(&self, bytes: &[u8]) -> Vec<u8> {
        let huffman_bytes = huffman::encode(bytes);
        let use_huffman = match self.ctx.options.huffman {
            crate::hpack::context::HuffmanMode::Always => true,
            crate::hpack::context::HuffmanMode::Never => false,
            crate::hpack::context::HuffmanMode::Shorter => huffman_bytes.len() < bytes.len(),
        };
        let (tag, payload): (u8, &[u8]) = if use_huffman {
            (0x80, &huffman_bytes)
        } else {
            (0x00, bytes)
        };
        let mut out = integer::encode(payload.len() as u64, 7, tag);
        out.extend_from_slice(payload);
        out
    }

    /// `(exact name+value match, name-only match)`, dynamic table first.
    fn find(&self, name: &[u8], value: &[u8]) -> (Option<usize>, Option<usize>) {
        let mut name_only = None;
        for idx in 0..self.ctx.combined_len() {
            if let Ok((n, v, _)) = self.ctx.dereference(idx) {
                if n == name && v == value {
                    return (Some(idx), name_only);
                }
                if n == name && name_only.is_none() {
                    name_only = Some(idx);
                }
            }
        }
        (None, name_only)
    }
}

fn encode_indexed(idx: usize) -> Vec<u8> {
    use crate::hpack::representation::{INDEXED_PREFIX, INDEXED_TAG};
    integer::encode((idx + 1) as u64, INDEXED_PREFIX, INDEXED_TAG)
}
