//! Process-wide (per spec.md §3/§6) collection-index registry.
//!
//! Resolved here as *thread-local* rather than a global `static`, per the
//! Open Question in spec.md §9: the registry's concurrency story is
//! unspecified upstream, and spec.md §5 requires it be touched from a
//! single thread only. A `thread_local!` makes "single-threaded" a
//! structural property instead of a documentation comment — see
//! SPEC_FULL.md §9.
//!
//! Index `0` is reserved (spec.md §6): it is never dispensed by
//! [`allocate`], so a default-constructed or "no collection" `cindex` of
//! `0` can never collide with a real entry.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::header::collection::CollectionInner;

thread_local! {
    static REGISTRY: RefCell<Vec<Weak<RefCell<CollectionInner>>>> =
        RefCell::new(vec![Weak::new()]); // index 0 reserved
    static FREE_LIST: RefCell<Vec<u16>> = RefCell::new(Vec::new());
}

/// Dispense a fresh cindex for `inner`, reusing a freed slot if one exists.
pub fn allocate(inner: &Rc<RefCell<CollectionInner>>) -> u16 {
    let reused = FREE_LIST.with(|f| f.borrow_mut().pop());
    REGISTRY.with(|r| {
        let mut r = r.borrow_mut();
        match reused {
            Some(idx) => {
                r[idx as usize] = Rc::downgrade(inner);
                idx
            }
            None => {
                r.push(Rc::downgrade(inner));
                (r.len() - 1) as u16
            }
        }
    })
}

/// Re-point an existing cindex slot at a (possibly new) collection, used
/// when a stream re-reads headers into the same collection handle.
pub fn reallocate(cindex: u16, inner: &Rc<RefCell<CollectionInner>>) {
    REGISTRY.with(|r| {
        let mut r = r.borrow_mut();
        if let Some(slot) = r.get_mut(cindex as usize) {
            *slot = Rc::downgrade(inner);
        }
    });
}

/// Clear a registry slot and return it to the free list.
pub fn free(cindex: u16) {
    if cindex == 0 {
        return;
    }
    REGISTRY.with(|r| {
        if let Some(slot) = r.borrow_mut().get_mut(cindex as usize) {
            *slot = Weak::new();
        }
    });
    FREE_LIST.with(|f| f.borrow_mut().push(cindex));
}

/// Resolve a cindex back to its collection, if it (or the registry slot)
/// still exists.
pub fn resolve(cindex: u16) -> Option<Rc<RefCell<CollectionInner>>> {
    REGISTRY.with(|r| r.borrow().get(cindex as usize).and_then(|w| w.upgrade()))
}
