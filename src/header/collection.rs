//! Ordered sequence of header records plus the reference-sequence and
//! read-group indices derived from them (spec.md §3/§4.5).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{Result, SamError};
use crate::header::readgroup::ReadGroup;
use crate::header::record::Header;
use crate::header::refseq::RefSequence;
use crate::header::registry;

/// Bit flags controlling which indices [`Collection::push_back`] populates.
pub const ADD_HEADER: u8 = 1 << 0;
pub const ADD_REFSEQ: u8 = 1 << 1;
pub const ADD_REFNAME: u8 = 1 << 2;
/// Convenience: populate every index a fully-parsed header line should.
pub const ADD_ALL: u8 = ADD_HEADER | ADD_REFSEQ | ADD_REFNAME;

/// Shared internal state of a [`Collection`]. Lives behind `Rc<RefCell<_>>`
/// so the process-wide cindex registry ([`crate::header::registry`]) can
/// hold a non-owning `Weak` reference to it.
pub struct CollectionInner {
    headers: Vec<Header>,
    refseqs: Vec<RefSequence>,
    refseq_by_name: HashMap<String, usize>,
    readgroups: HashMap<String, ReadGroup>,
    cindex: u16,
}

impl CollectionInner {
    pub(crate) fn new() -> Self {
        CollectionInner {
            headers: Vec::new(),
            refseqs: Vec::new(),
            refseq_by_name: HashMap::new(),
            readgroups: HashMap::new(),
            cindex: 0,
        }
    }
}

/// Header collection: the `@HD`/`@SQ`/`@RG`/... lines of a SAM/BAM stream,
/// plus derived indices. Cheap to clone (an `Rc` handle); every clone
/// shares the same underlying data and the same cindex.
#[derive(Clone)]
pub struct Collection(Rc<RefCell<CollectionInner>>);

impl Collection {
    pub fn new() -> Self {
        let inner = Rc::new(RefCell::new(CollectionInner::new()));
        let cindex = registry::allocate(&inner);
        inner.borrow_mut().cindex = cindex;
        Collection(inner)
    }

    /// The small integer alignment records carry to resolve `rindex` back
    /// to this collection without holding a direct reference (spec.md §3).
    pub fn cindex(&self) -> u16 {
        self.0.borrow().cindex
    }

    /// Resolve a cindex back to its owning `Collection`, if it is still alive.
    pub fn by_cindex(cindex: u16) -> Option<Collection> {
        registry::resolve(cindex).map(Collection)
    }

    /// Parse one `@XY\t...` header line and fold it into this collection
    /// according to `flags` (spec.md §4.5).
    pub fn push_back(&self, text: &str, flags: u8) -> Result<()> {
        let trimmed = text
            .strip_prefix('@')
            .ok_or_else(|| SamError::bad_format("header line does not start with '@'"))?;
        let mut parts = trimmed.split('\t');
        let type_code = parts.next().unwrap_or("");
        let fields: Vec<&str> = parts.collect();
        let header = Header::parse(type_code, &fields)?;

        let mut inner = self.0.borrow_mut();

        if header.type_equals("SQ") && flags & ADD_REFSEQ != 0 {
            let name = header.field::<String>("SN")?;
            if inner.refseq_by_name.contains_key(&name) {
                return Err(SamError::bad_format(format!(
                    "duplicate reference sequence name \"{}\"",
                    name
                )));
            }
            let index = inner.refseqs.len() as i32;
            let refseq = RefSequence::from_header(header.clone(), index)?;
            inner.refseqs.push(refseq);
            if flags & ADD_REFNAME != 0 {
                inner.refseq_by_name.insert(name, index as usize);
            }
        } else if header.type_equals("RG") {
            let rg = ReadGroup::from_header(header.clone())?;
            inner.readgroups.insert(rg.id().to_string(), rg);
        }

        if flags & ADD_HEADER != 0 {
            inner.headers.push(header);
        }
        Ok(())
    }

    /// Look up a reference sequence by name. `"*"` always resolves to the
    /// shared unmapped sentinel.
    pub fn findseq_by_name(&self, name: &str) -> Result<RefSequence> {
        if name == "*" {
            return Ok(RefSequence::unmapped());
        }
        let inner = self.0.borrow();
        let idx = inner
            .refseq_by_name
            .get(name)
            .ok_or_else(|| SamError::bad_format(format!("unknown reference sequence \"{}\"", name)))?;
        Ok(inner.refseqs[*idx].clone())
    }

    /// Look up a reference sequence by dense index. `-1` always resolves to
    /// the shared unmapped sentinel.
    pub fn findseq_by_index(&self, index: i32) -> Result<RefSequence> {
        if index == -1 {
            return Ok(RefSequence::unmapped());
        }
        let inner = self.0.borrow();
        inner
            .refseqs
            .get(index as usize)
            .cloned()
            .ok_or_else(|| SamError::bad_format(format!("reference index {} out of range", index)))
    }

    pub fn findgroup(&self, id: &str) -> Result<ReadGroup> {
        self.0
            .borrow()
            .readgroups
            .get(id)
            .cloned()
            .ok_or_else(|| SamError::bad_format(format!("unknown read group \"{}\"", id)))
    }

    pub fn refseq_count(&self) -> usize {
        self.0.borrow().refseqs.len()
    }

    pub fn refseqs(&self) -> Vec<RefSequence> {
        self.0.borrow().refseqs.clone()
    }

    /// All header lines in insertion order.
    pub fn headers(&self) -> Vec<Header> {
        self.0.borrow().headers.clone()
    }

    /// Reconstruct the canonical multi-line header text (no trailing
    /// newline on the last line), used by the BAM header block encoder and
    /// by the SAM writer's header pass.
    pub fn text(&self) -> String {
        self.0
            .borrow()
            .headers
            .iter()
            .map(|h| h.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Discard all indexed state while keeping the same cindex, used when a
    /// stream re-reads headers into the same collection handle
    /// (spec.md §3, §4.5 "reallocate").
    pub fn reallocate(&self) {
        let mut inner = self.0.borrow_mut();
        let cindex = inner.cindex;
        *inner = CollectionInner::new();
        inner.cindex = cindex;
        drop(inner);
        registry::reallocate(cindex, &self.0);
    }
}

impl Default for Collection {
    fn default() -> Self {
        Collection::new()
    }
}

impl Drop for CollectionInner {
    fn drop(&mut self) {
        registry::free(self.cindex);
    }
}
