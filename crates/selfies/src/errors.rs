use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

pub type Result<T, E = Box<SelfiesError>> = std::result::Result<T, E>;

// NOTE: Every variant here is recoverable. A failure anywhere in a fragment aborts the whole decode call, but never
// the process
#[derive(Debug, Diagnostic, Error)]
pub enum SelfiesError {
    #[diagnostic(help("every SELFIES symbol must be wrapped in square brackets, like [C] or [=N]"))]
    #[error("malformed SELFIES: misplaced or missing brackets")]
    MalformedBrackets {
        #[source_code]
        fragment: String,
        #[label("expected a complete `[...]` symbol here")]
        span: SourceSpan,
    },

    #[error("the symbol {symbol:?} could not be recognized")]
    UnrecognizedSymbol { symbol: String },

    #[diagnostic(help("branch symbols take the form [BranchL_X], where both L and X are between 1 and 3"))]
    #[error("unknown branch symbol {symbol:?}")]
    UnknownBranchSymbol { symbol: String },

    #[diagnostic(help("consider adjusting the bond constraints, or decoding with the \"hypervalent\" preset"))]
    #[error("too many Hs in symbol {symbol:?}: {hydrogens} hydrogens leave no room within a bond capacity of {max_bonds}")]
    ExcessHydrogens {
        symbol: String,
        hydrogens: u8,
        max_bonds: u8,
    },

    #[error("the atom symbol {symbol:?} is malformed")]
    MalformedAtomSymbol { symbol: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    InvalidConstraintTable(#[from] ConstraintError),

    #[diagnostic(help("the known constraint presets are \"default\", \"octet_rule\", and \"hypervalent\""))]
    #[error("unrecognized constraint type {name:?}")]
    UnrecognizedConstraintType { name: String },

    #[error("failed to read a bond constraint table")]
    ConstraintDocument(#[source] knuffel::Error),
}

impl SelfiesError {
    pub(crate) fn malformed_brackets(fragment: &str, offset: usize) -> Self {
        let fragment = fragment.to_owned();
        // NOTE: Point at the rest of the fragment, since a missing ']' could belong anywhere after the '['
        let span = SourceSpan::from(offset..fragment.len());

        Self::MalformedBrackets { fragment, span }
    }

    pub(crate) fn unrecognized_symbol(symbol: &str) -> Self {
        let symbol = symbol.to_owned();

        Self::UnrecognizedSymbol { symbol }
    }

    pub(crate) fn unknown_branch_symbol(symbol: &str) -> Self {
        let symbol = symbol.to_owned();

        Self::UnknownBranchSymbol { symbol }
    }

    pub(crate) fn excess_hydrogens(symbol: &str, hydrogens: u8, max_bonds: u8) -> Self {
        let symbol = symbol.to_owned();

        Self::ExcessHydrogens {
            symbol,
            hydrogens,
            max_bonds,
        }
    }

    pub(crate) fn malformed_atom_symbol(symbol: &str) -> Self {
        let symbol = symbol.to_owned();

        Self::MalformedAtomSymbol { symbol }
    }

    pub(crate) fn unrecognized_constraint_type(name: &str) -> Self {
        let name = name.to_owned();

        Self::UnrecognizedConstraintType { name }
    }
}

#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum ConstraintError {
    #[diagnostic(help("add a \"?\" entry giving the capacity of every atom or ion that isn't listed"))]
    #[error("bond constraints are missing '?' as a key")]
    MissingWildcard,

    #[error("the bond constraint for {key:?} is {value}, which is not between 1 and 8 inclusive")]
    OutOfRange { key: String, value: u8 },
}
