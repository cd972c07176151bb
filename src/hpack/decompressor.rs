//! HPACK decoder (§4.D, decode direction): turns a header block back into
//! the header list, driving the same [`Context`] state machine the
//! compressor uses so the two sides never diverge.

use crate::buffer::Buffer;
use crate::error::Error;
use crate::hpack::context::{Command, Context, NameRef, Options, RefMark};
use crate::hpack::integer;
use crate::hpack::representation::{
    CHANGETABLESIZE_PREFIX, CHANGETABLESIZE_TAG, INCREMENTAL_PREFIX, INCREMENTAL_TAG,
    INDEXED_PREFIX, INDEXED_TAG, NEVERINDEXED_PREFIX, NEVERINDEXED_TAG, NOINDEX_PREFIX,
    NOINDEX_TAG, REFSET_EMPTY_BYTE,
};
use crate::huffman;

pub struct Decompressor {
    ctx: Context,
}

impl Decompressor {
    pub fn new(options: Options) -> Decompressor {
        Decompressor {
            ctx: Context::new(options),
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn set_max_table_size(&mut self, size: usize) {
        self.ctx.change_table_size(size);
    }

    /// Decode a full header block into an ordered header list.
    pub fn decode(&mut self, block: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, Error> {
        self.ctx.unmark();
        let mut buf = Buffer::from_vec(block.to_vec());
        let mut headers = Vec::new();

        while !buf.empty() {
            let first = *buf.peek(1)?.first().unwrap();

            if first == REFSET_EMPTY_BYTE {
                buf.getbyte()?;
                if let Some(h) = self.ctx.process(Command::RefSetEmpty)? {
                    headers.push(h);
                }
                continue;
            }

            if first & INDEXED_TAG != 0 {
                let raw = integer::decode(&mut buf, INDEXED_PREFIX)?;
                if raw == 0 {
                    return Err(Error::compression("indexed(0)"));
                }
                if let Some(h) = self.ctx.process(Command::Indexed((raw - 1) as usize))? {
                    headers.push(h);
                }
                continue;
            }

            if first & 0xc0 == INCREMENTAL_TAG {
                let (name, value) = self.read_literal(&mut buf, INCREMENTAL_PREFIX)?;
                if let Some(h) = self.ctx.process(Command::Incremental { name, value })? {
                    headers.push(h);
                }
                continue;
            }

            if first & 0xf0 == NEVERINDEXED_TAG {
                let (name, value) = self.read_literal(&mut buf, NEVERINDEXED_PREFIX)?;
                if let Some(h) = self.ctx.process(Command::NeverIndexed { name, value })? {
                    headers.push(h);
                }
                continue;
            }

            if first & 0xf0 == NOINDEX_TAG {
                let (name, value) = self.read_literal(&mut buf, NOINDEX_PREFIX)?;
                if let Some(h) = self.ctx.process(Command::NoIndex { name, value })? {
                    headers.push(h);
                }
                continue;
            }

            if first & 0xf0 == CHANGETABLESIZE_TAG {
                let n = integer::decode(&mut buf, CHANGETABLESIZE_PREFIX)? as usize;
                self.ctx.process(Command::ChangeTableSize(n))?;
                continue;
            }

            return Err(Error::compression("unrecognized representation pattern"));
        }

        // Entries already processed this block (`Emitted`) already pushed
        // their header above via `process`'s return value. Anything still
        // `None` (untouched all block) or `Common` (the encoder marks
        // these explicitly) is a header carried over with no wire bytes
        // at all, and must surface here instead.
        for (idx, mark) in self.ctx.refset().to_vec() {
            if mark != RefMark::Emitted {
                let (name, value, _) = self.ctx.dereference(idx)?;
                headers.push((name, value));
            }
        }

        Ok(headers)
    }

    fn read_literal(&self, buf: &mut Buffer, prefix: u8) -> Result<(NameRef, Vec<u8>), Error> {
        let raw = integer::decode(buf, prefix)?;
        let name = if raw == 0 {
            NameRef::Literal(decode_string(buf)?)
        } else {
            NameRef::Indexed((raw - 1) as usize)
        };
        let value = decode_string(buf)?;
        Ok((name, value))
    }
}

fn decode_string(buf: &mut Buffer) -> Result<Vec<u8>, Error> {
    let first = *buf
        .peek(1)
        .map_err(|_| Error::compression("too short"))?
        .first()
        .unwrap();
    let huffman_coded = first & 0x80 != 0;
    let len = integer::decode(buf, 7)? as usize;
    let raw = buf
        .read(len)
        .map_err(|_| Error::compression("too short"))?
        .to_vec();
    if huffman_coded {
        huffman::decode(&raw)
    } else {
        Ok(raw)
    }
}
