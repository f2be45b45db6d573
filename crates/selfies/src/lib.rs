//! A decoder from SELFIES, a grammar-constrained molecular line notation, to SMILES

pub mod constraints;
pub mod errors;
pub mod index_codec;
pub mod parsers;
pub mod state;
pub mod symbol_stream;

mod bond;
mod decoder;
mod derivation;
mod rings;

// External Crate Imports
use ahash::HashMap;
use derive_more::{Deref, Display};

// FIXME: Work out what's publicly exported / part of the API! Maybe create a prelude?
pub use errors::{ConstraintError, Result, SelfiesError};
pub use symbol_stream::SymbolStream;

// NOTE: For the types in this module, 'c lifetimes indicate references to a `BondConstraints` table, whilst 's
// lifetimes indicate references into the SELFIES text being decoded

// Bond Constraints ====================================================================================================

/// The maximum number of simultaneous bonds for each atom-or-ion key (like `N` or `O+1`), with a mandatory `?`
/// wildcard entry used for every key that isn't listed
#[derive(Clone, Eq, PartialEq, Debug, Deref)]
pub struct BondConstraints {
    #[deref]
    table: HashMap<String, u8>,
    wildcard: u8,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Display)]
pub enum ConstraintPreset {
    #[default]
    #[display("default")]
    Default,
    #[display("octet_rule")]
    OctetRule,
    #[display("hypervalent")]
    Hypervalent,
}

/// Owns the "active" constraint table that decoding runs against when no preset override is requested
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct ConstraintRegistry {
    active: BondConstraints,
}

// Decoding ============================================================================================================

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Decoder<'c> {
    constraints: &'c BondConstraints,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct DecodeOptions {
    /// Render decoding failures as a report on standard error
    pub print_error: bool,
    /// Decode against this preset instead of the registry's active table
    pub constraints: Option<ConstraintPreset>,
}

// ---------------------------------------------------------------------------------------------------------------------

/// The derivation state: `0` before anything has been bonded, a positive count of the bonds the most recently derived
/// atom still has free, or [`TERMINAL_STATE`] once that atom is saturated
pub type State = i32;

pub const TERMINAL_STATE: State = -1;

/// An optional leading bond character (`=`, `#`, `/`, `\`, or `-`); `None` is an implicit single bond
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Bond(Option<char>);

// Symbols =============================================================================================================

/// The element, hydrogen count, and charge of a SMILES atom like `[13CH2-]` or `Cl`
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct AtomSymbol<'s> {
    pub element: &'s str,
    pub hydrogens: u8,
    pub charge: i32,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SelfiesSymbol<'s> {
    Epsilon,
    Atom(&'s str),
    Branch(&'s str),
    Ring(&'s str),
}

/// `[Branch{L}_{X}]`: `L` index symbols encode the branch length, `X` caps the order of the bond into the branch
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct BranchSymbol {
    pub length_digits: u8,
    pub bond_order: u8,
}

/// `[Ring{L}]` or `[Expl{b}Ring{L}]`: `L` index symbols encode how far back the ring closes
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct RingSymbol {
    pub length_digits: u8,
    pub bond: Bond,
}

// Convenience API =====================================================================================================

/// Decodes `selfies` against the default constraint preset
pub fn decode(selfies: impl AsRef<str>) -> Result<String> {
    let constraints = BondConstraints::default();
    Decoder::new(&constraints).decode(selfies)
}
