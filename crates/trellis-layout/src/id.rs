//! Stable element ids.
//!
//! Ids are derived from a string label (optionally with an index and a parent
//! seed) with a one-at-a-time hash so the same declaration yields the same id
//! in every frame. Hover and scroll state are keyed on these ids.

use std::borrow::Cow;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ElementId {
    /// Hash of label, offset and seed. Never 0 for a hashed id.
    pub id: u32,
    /// Index passed to [`ElementId::indexed`].
    pub offset: u32,
    /// Hash of the label alone (or the seed for anonymous elements).
    pub base_id: u32,
    /// The label the id was created from, empty for anonymous elements.
    pub string_id: Cow<'static, str>,
}

impl ElementId {
    /// Global id from a label.
    pub fn new(label: impl Into<Cow<'static, str>>) -> Self {
        Self::indexed(label, 0)
    }

    /// Global id from a label plus an index, for repeated elements.
    pub fn indexed(label: impl Into<Cow<'static, str>>, index: u32) -> Self {
        hash_string_with_offset(label.into(), index, 0)
    }

    /// Id that is only unique below the element with `parent_id`.
    pub fn local(label: impl Into<Cow<'static, str>>, index: u32, parent_id: u32) -> Self {
        hash_string_with_offset(label.into(), index, parent_id)
    }

    /// Id for an element declared without one: the child index seeded by the
    /// parent id.
    pub(crate) fn anonymous(child_index: u32, parent_id: u32) -> Self {
        hash_number(child_index, parent_id)
    }
}

impl From<&'static str> for ElementId {
    fn from(label: &'static str) -> Self {
        ElementId::new(label)
    }
}

fn hash_string_with_offset(key: Cow<'static, str>, offset: u32, seed: u32) -> ElementId {
    let mut base: u32 = seed;
    for b in key.bytes() {
        base = base.wrapping_add(b as u32);
        base = base.wrapping_add(base << 10);
        base ^= base >> 6;
    }
    let mut hash = base;
    hash = hash.wrapping_add(offset);
    hash = hash.wrapping_add(hash << 10);
    hash ^= hash >> 6;

    hash = hash.wrapping_add(hash << 3);
    base = base.wrapping_add(base << 3);
    hash ^= hash >> 11;
    base ^= base >> 11;
    hash = hash.wrapping_add(hash << 15);
    base = base.wrapping_add(base << 15);
    ElementId {
        id: hash.wrapping_add(1),
        offset,
        base_id: base.wrapping_add(1),
        string_id: key,
    }
}

fn hash_number(offset: u32, seed: u32) -> ElementId {
    let mut hash = seed;
    hash = hash.wrapping_add(offset.wrapping_add(48));
    hash = hash.wrapping_add(hash << 10);
    hash ^= hash >> 6;
    hash = hash.wrapping_add(hash << 3);
    hash ^= hash >> 11;
    hash = hash.wrapping_add(hash << 15);
    ElementId {
        id: hash.wrapping_add(1),
        offset,
        base_id: seed,
        string_id: Cow::Borrowed(""),
    }
}

/// Hash used for the word measurement cache.
pub(crate) fn hash_bytes(data: &[u8], seed: u64) -> u64 {
    let mut hash: u64 = seed;
    for &b in data {
        hash = hash.wrapping_add(b as u64);
        hash = hash.wrapping_add(hash << 10);
        hash ^= hash >> 6;
    }
    hash = hash.wrapping_add(hash << 3);
    hash ^= hash >> 11;
    hash.wrapping_add(hash << 15)
}
