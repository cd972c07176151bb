//! HPACK context (§3 "HPACK context", §4.C): the dynamic table, reference
//! set and static-table lookup shared by the compressor and decompressor.
//!
//! Both directions of a connection own one `Context` each; nothing here is
//! aware of which side (encoder or decoder) is driving it; `process`
//! implements the representation semantics the HPACK draft mandates
//! identically for both.

use crate::hpack::static_table::{STATIC_TABLE, STATIC_TABLE_LEN};
use crate::error::Error;

const ENTRY_OVERHEAD: usize = 32;

/// Mark carried by a reference-set member; only meaningful to the
/// `refset: always` encoder strategy and its paired decoder bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefMark {
    None,
    Emitted,
    Common,
}

/// Where a name (and possibly value) for a literal representation comes
/// from: a literal byte string, or an index into the combined table.
#[derive(Debug, Clone)]
pub enum NameRef {
    Literal(Vec<u8>),
    Indexed(usize),
}

/// One representation, with wire details (prefix widths, huffman bits)
/// already stripped by the compressor/decompressor layer. `index` fields
/// are zero-based into the combined (dynamic ++ static) address space.
#[derive(Debug, Clone)]
pub enum Command {
    RefSetEmpty,
    ChangeTableSize(usize),
    Indexed(usize),
    Incremental { name: NameRef, value: Vec<u8> },
    NoIndex { name: NameRef, value: Vec<u8> },
    NeverIndexed { name: NameRef, value: Vec<u8> },
}

pub fn entry_cost(name: &[u8], value: &[u8]) -> usize {
    name.len() + value.len() + ENTRY_OVERHEAD
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuffmanMode {
    Always,
    Never,
    Shorter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    All,
    Header,
    Static,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefSetMode {
    Always,
    Never,
    Shorter,
}

/// Encoder/decoder-shared configuration (§6 "Configuration options").
#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub huffman: HuffmanMode,
    pub index: IndexMode,
    pub refset: RefSetMode,
    pub table_size: usize,
}

impl Default for Options {
    fn default() -> Options {
        Options::SHORTER
    }
}

impl Options {
    pub const NAIVE: Options = Options {
        huffman: HuffmanMode::Never,
        index: IndexMode::Never,
        refset: RefSetMode::Never,
        table_size: 4096,
    };
    pub const LINEAR: Options = Options {
        huffman: HuffmanMode::Never,
        index: IndexMode::All,
        refset: RefSetMode::Never,
        table_size: 4096,
    };
    pub const STATIC: Options = Options {
        huffman: HuffmanMode::Never,
        index: IndexMode::Static,
        refset: RefSetMode::Never,
        table_size: 4096,
    };
    pub const DIFF: Options = Options {
        huffman: HuffmanMode::Never,
        index: IndexMode::All,
        refset: RefSetMode::Always,
        table_size: 4096,
    };
    pub const SHORTER: Options = Options {
        huffman: HuffmanMode::Shorter,
        index: IndexMode::All,
        refset: RefSetMode::Shorter,
        table_size: 4096,
    };
    pub const NAIVE_H: Options = Options {
        huffman: HuffmanMode::Always,
        ..Options::NAIVE
    };
    pub const LINEAR_H: Options = Options {
        huffman: HuffmanMode::Always,
        ..Options::LINEAR
    };
    pub const STATIC_H: Options = Options {
        huffman: HuffmanMode::Always,
        ..Options::STATIC
    };
    pub const DIFF_H: Options = Options {
        huffman: HuffmanMode::Always,
        ..Options::DIFF
    };
    pub const SHORTER_H: Options = Options {
        huffman: HuffmanMode::Always,
        ..Options::SHORTER
    };
}

#[derive(Debug, Clone)]
pub struct Context {
    /// Index 0 is the most recently inserted entry.
    table: Vec<(Vec<u8>, Vec<u8>)>,
    cost: usize,
    limit: usize,
    refset: Vec<(usize, RefMark)>,
    pub options: Options,
}

impl Context {
    pub fn new(options: Options) -> Context {
        Context {
            table: Vec::new(),
            cost: 0,
            limit: options.table_size,
            refset: Vec::new(),
            options,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn table_cost(&self) -> usize {
        self.cost
    }

    pub fn table_len(&self) -> usize {
        self.table.len()
    }

    /// Size of the combined dynamic-table-then-static-table address space.
    pub fn combined_len(&self) -> usize {
        self.table.len() + STATIC_TABLE_LEN
    }

    pub fn refset(&self) -> &[(usize, RefMark)] {
        &self.refset
    }

    pub fn refset_mark(&self, index: usize) -> Option<RefMark> {
        self.refset
            .iter()
            .find(|(idx, _)| *idx == index)
            .map(|(_, mark)| *mark)
    }

    fn refset_set(&mut self, index: usize, mark: RefMark) {
        match self.refset.iter_mut().find(|(idx, _)| *idx == index) {
            Some(entry) => entry.1 = mark,
            None => self.refset.push((index, mark)),
        }
    }

    /// Mark an existing refset member as carried over ("common") without
    /// emitting any representation for it. Used by the encoder when a
    /// header is already part of the reference set from a prior block.
    pub fn mark_common(&mut self, index: usize) {
        self.refset_set(index, RefMark::Common);
    }

    fn refset_remove(&mut self, index: usize) {
        self.refset.retain(|(idx, _)| *idx != index);
    }

    /// Clears every refset membership (not just marks). Used by the
    /// `refsetempty` representation and by a full-table clear.
    pub fn refset_clear(&mut self) {
        self.refset.clear();
    }

    /// Resets every refset entry's mark to `None`, keeping membership.
    /// The decoder calls this at the start of every header block.
    pub fn unmark(&mut self) {
        for (_, mark) in self.refset.iter_mut() {
            *mark = RefMark::None;
        }
    }

    /// Resolve a zero-based combined index into `(name, value, is_static)`.
    pub fn dereference(&self, index: usize) -> Result<(Vec<u8>, Vec<u8>, bool), Error> {
        if index < self.table.len() {
            let (name, value) = &self.table[index];
            return Ok((name.clone(), value.clone(), false));
        }
        let static_idx = index - self.table.len();
        if static_idx < STATIC_TABLE_LEN {
            let (name, value) = STATIC_TABLE[static_idx];
            return Ok((name.as_bytes().to_vec(), value.as_bytes().to_vec(), true));
        }
        Err(Error::compression("Index too large"))
    }

    /// Indices (current numbering, tail-first) that adding an entry costing
    /// `incoming_cost` would evict. Pure; does not mutate the table.
    pub fn size_check(&self, incoming_cost: usize) -> Vec<usize> {
        let mut evicted = Vec::new();
        let mut cost = self.cost;
        let mut n = self.table.len();
        while cost + incoming_cost > self.limit && n > 0 {
            n -= 1;
            evicted.push(n);
            let (name, value) = &self.table[n];
            cost -= entry_cost(name, value);
        }
        evicted
    }

    /// Insert `(name, value)` at the front, evicting tail entries as
    /// needed. Returns the new index (always 0) or `None` if the entry
    /// alone exceeds `limit` (in which case the whole table is cleared and
    /// nothing is added).
    pub fn add_to_table(&mut self, name: Vec<u8>, value: Vec<u8>) -> Option<usize> {
        let cost = entry_cost(&name, &value);
        if cost > self.limit {
            self.table.clear();
            self.cost = 0;
            self.refset_clear();
            return None;
        }

        for idx in self.size_check(cost) {
            self.table.truncate(idx);
            self.refset_remove(idx);
        }
        self.cost = self.table.iter().map(|(n, v)| entry_cost(n, v)).sum();

        for (idx, _) in self.refset.iter_mut() {
            *idx += 1;
        }
        self.table.insert(0, (name, value));
        self.cost += cost;
        Some(0)
    }

    /// Change the table size limit, evicting as needed (`changetablesize`).
    pub fn change_table_size(&mut self, new_limit: usize) {
        self.limit = new_limit;
        for idx in self.size_check(0) {
            self.table.truncate(idx);
            self.refset_remove(idx);
        }
        self.cost = self.table.iter().map(|(n, v)| entry_cost(n, v)).sum();
    }

    fn resolve_name(&self, name: &NameRef) -> Result<Vec<u8>, Error> {
        match name {
            NameRef::Literal(bytes) => Ok(bytes.clone()),
            NameRef::Indexed(idx) => Ok(self.dereference(*idx)?.0),
        }
    }

    /// Apply one representation, returning the header it produces (if
    /// any). Shared verbatim by the compressor and decompressor so the two
    /// sides of a connection can never drift apart.
    pub fn process(&mut self, cmd: Command) -> Result<Option<(Vec<u8>, Vec<u8>)>, Error> {
        match cmd {
            Command::RefSetEmpty => {
                self.refset_clear();
                Ok(None)
            }
            Command::ChangeTableSize(n) => {
                self.change_table_size(n);
                Ok(None)
            }
            Command::Indexed(idx) => {
                if self.refset_mark(idx).is_some() {
                    self.refset_remove(idx);
                    return Ok(None);
                }
                let (name, value, is_static) = self.dereference(idx)?;
                if is_static {
                    if let Some(new_idx) = self.add_to_table(name.clone(), value.clone()) {
                        self.refset_set(new_idx, RefMark::Emitted);
                    }
                } else {
                    self.refset_set(idx, RefMark::Emitted);
                }
                Ok(Some((name, value)))
            }
            Command::Incremental { name, value } => {
                let name = self.resolve_name(&name)?;
                let result = (name.clone(), value.clone());
                if let Some(new_idx) = self.add_to_table(name, value) {
                    self.refset_set(new_idx, RefMark::Emitted);
                }
                Ok(Some(result))
            }
            Command::NoIndex { name, value } | Command::NeverIndexed { name, value } => {
                let name = self.resolve_name(&name)?;
                Ok(Some((name, value)))
            }
        }
    }
}
