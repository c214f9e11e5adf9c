//! Core identifiers, capacities, and the component signature bitset.
//!
//! This module defines the small, copyable types shared by every subsystem
//! of the store:
//!
//! - compact numeric identifiers for components and archetypes,
//! - the compile-time ceiling on distinct component types,
//! - the [`Signature`] bitset that identifies an archetype by the exact set
//!   of component types it carries.
//!
//! ## Design
//!
//! The store is built around dense storage and bitset-based signatures:
//!
//! - Component types are numbered densely in `[0, MAX_COMPONENTS)`.
//! - An archetype is keyed by a fixed-width bitset over those numbers.
//! - Signature comparison, subset and disjointness checks are word-wise
//!   bitwise operations.
//!
//! All constants are chosen so that a signature fits in a handful of machine
//! words and signature operations never allocate.

/// Unique identifier for a component type.
///
/// Assigned densely by the registry, starting at `0`, in first-use order.
pub type ComponentId = u16;

/// Unique identifier for an archetype.
///
/// Indexes into the world's archetype vector and stays stable for the life
/// of the world, which keeps entity locations valid across archetype
/// creation.
pub type ArchetypeId = u32;

/// Row index within an archetype.
pub type RowId = u32;

/// Maximum number of distinct component types registrable in one process.
pub const MAX_COMPONENTS: usize = 64;

/// Number of `u64` words required to represent a full component signature.
pub const SIGNATURE_WORDS: usize = (MAX_COMPONENTS + 63) / 64;

const _: [(); 1] = [(); (MAX_COMPONENTS > 0) as usize];
const _: [(); 1] = [(); (MAX_COMPONENTS <= (ComponentId::MAX as usize + 1)) as usize];

/// Bitset over [`ComponentId`] identifying a set of component types.
///
/// Signatures compare by value and key the archetype index. All operations
/// are word-wise and branch-light.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Signature {
    /// Packed component bitset.
    pub words: [u64; SIGNATURE_WORDS],
}

impl Default for Signature {
    fn default() -> Self {
        Self { words: [0u64; SIGNATURE_WORDS] }
    }
}

impl Signature {
    /// Returns the empty signature.
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sets the bit corresponding to `component_id`.
    #[inline]
    pub fn set(&mut self, component_id: ComponentId) {
        let index = (component_id as usize) / 64;
        let bit = (component_id as usize) % 64;
        self.words[index] |= 1u64 << bit;
    }

    /// Clears the bit corresponding to `component_id`.
    #[inline]
    pub fn clear(&mut self, component_id: ComponentId) {
        let index = (component_id as usize) / 64;
        let bit = (component_id as usize) % 64;
        self.words[index] &= !(1u64 << bit);
    }

    /// Returns `true` if `component_id` is present in this signature.
    #[inline]
    pub fn has(&self, component_id: ComponentId) -> bool {
        let index = (component_id as usize) / 64;
        let bit = (component_id as usize) % 64;
        (self.words[index] >> bit) & 1 == 1
    }

    /// Returns `true` if every component in `other` is present in `self`.
    #[inline]
    pub fn contains_all(&self, other: &Signature) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(word, required)| (word & required) == *required)
    }

    /// Returns `true` if `self` and `other` share no components.
    #[inline]
    pub fn is_disjoint(&self, other: &Signature) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(a, b)| (a & b) == 0)
    }

    /// Returns `true` if no component is present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&word| word == 0)
    }

    /// Returns the number of components present.
    #[inline]
    pub fn len(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Iterates over all component IDs set in this signature, ascending.
    pub fn iter(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.words.iter().enumerate().flat_map(|(word_index, &word)| {
            let base = word_index * 64;
            let mut bits = word;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let tz = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some((base + tz) as ComponentId)
            })
        })
    }

    /// Builds a signature from a list of component IDs.
    pub fn from_ids(component_ids: &[ComponentId]) -> Signature {
        let mut signature = Signature::default();
        for &component_id in component_ids {
            signature.set(component_id);
        }
        signature
    }

    /// Returns `true` if this signature matches an include/exclude mask pair.
    ///
    /// A signature matches iff it contains every included component and none
    /// of the excluded ones.
    #[inline]
    pub fn matches(&self, include: &Signature, exclude: &Signature) -> bool {
        self.contains_all(include) && self.is_disjoint(exclude)
    }
}
