//! Walks the symbols of a fragment, deriving its atoms and recording where branches and rings need to go

// Standard Library Imports
use std::iter;

// External Crate Imports
use ahash::HashMap;
use tracing::trace;

// Local Crate Imports
use crate::{
    Bond, BondConstraints, BranchSymbol, Result, RingSymbol, SelfiesSymbol, State, SymbolStream,
    index_codec::symbols_to_index, state,
};

/// An atom that has been derived, in derivation order
#[derive(Clone, Eq, PartialEq, Debug)]
pub(crate) struct DerivedAtom {
    /// The SMILES atom, preceded by the bond connecting it to its parent
    pub text: String,
    /// The number of bonds this atom still has free. Ring and branch bonds keep whittling this down after the atom has
    /// been derived, so it can dip below zero
    pub capacity: State,
    pub parent: Option<usize>,
}

/// A ring closure between two derived atoms, exactly as it was requested
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) struct RingRequest {
    pub left: usize,
    pub right: usize,
    pub bond: Bond,
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub(crate) struct Derivation {
    pub atoms: Vec<DerivedAtom>,
    /// Maps the first atom of each branch to its last
    pub branches: HashMap<usize, usize>,
    pub rings: Vec<RingRequest>,
}

// ---------------------------------------------------------------------------------------------------------------------

/// One chain of the derivation, either the main chain of a fragment or one of its branches
struct Frame<'s> {
    symbols: SymbolStream<'s>,
    state: State,
    /// The most recently derived atom, which the next atom of this chain bonds to
    parent: Option<usize>,
    /// For branches, the index the first atom of this branch was derived at
    branch_start: Option<usize>,
}

enum Step<'s> {
    Continue,
    Open(Frame<'s>),
    Finished,
}

impl Derivation {
    pub fn derive(symbols: SymbolStream<'_>, constraints: &BondConstraints) -> Result<Self> {
        let mut derivation = Self::default();

        // NOTE: Branches are walked with an explicit stack, so deeply nested input can't overflow the call stack
        let mut chains = vec![Frame {
            symbols,
            state: 0,
            parent: None,
            branch_start: None,
        }];
        while let Some(chain) = chains.last_mut() {
            match chain.step(&mut derivation, constraints)? {
                Step::Continue => (),
                Step::Open(branch) => chains.push(branch),
                Step::Finished => {
                    if let Some(branch_start) = chains.pop().and_then(|chain| chain.branch_start) {
                        derivation.close_branch(branch_start);
                    }
                }
            }
        }

        Ok(derivation)
    }

    fn push_atom(&mut self, text: String, capacity: State, parent: Option<usize>) -> usize {
        if let Some(parent) = parent {
            self.atoms[parent].capacity -= State::from(Bond::leading_order(&text));
        }
        trace!(index = self.atoms.len(), %text, capacity, ?parent, "derived atom");

        self.atoms.push(DerivedAtom {
            text,
            capacity,
            parent,
        });
        self.atoms.len() - 1
    }

    fn close_branch(&mut self, mut start: usize) {
        let Some(end) = self.atoms.len().checked_sub(1) else {
            return;
        };

        // NOTE: If an earlier branch off the same atom already starts here, then this branch follows it instead of
        // swallowing it: C((C)Cl)C should become C(C)(Cl)C
        while let Some(&earlier_end) = self.branches.get(&start) {
            start = earlier_end + 1;
        }

        if start <= end {
            trace!(start, end, "closed branch");
            self.branches.insert(start, end);
        }
    }
}

impl<'s> Frame<'s> {
    fn step(&mut self, derivation: &mut Derivation, constraints: &BondConstraints) -> Result<Step<'s>> {
        let Some(symbol) = self.symbols.next_symbol()? else {
            return Ok(Step::Finished);
        };
        if self.state < 0 {
            return Ok(Step::Finished);
        }

        match SelfiesSymbol::classify(symbol) {
            SelfiesSymbol::Branch(symbol) => return self.open_branch(symbol, derivation),
            SelfiesSymbol::Ring(symbol) => self.request_ring(symbol, derivation)?,
            SelfiesSymbol::Epsilon | SelfiesSymbol::Atom(_) => {
                let (text, next_state) = state::next_atom_state(symbol, self.state, constraints)?;
                if !text.is_empty() {
                    self.parent = Some(derivation.push_atom(text, next_state, self.parent));
                }
                self.state = next_state;
            }
        }

        Ok(Step::Continue)
    }

    // FIXME: A branch with no room to open (a state of 0 or 1) consumes none of the symbols that follow it, so its
    // length and contents are read as part of the main chain instead. That's lenient, but it's how SELFIES has always
    // been decoded, so changing it would change the meaning of existing strings
    fn open_branch(&mut self, symbol: &str, derivation: &Derivation) -> Result<Step<'s>> {
        let branch = BranchSymbol::parse(symbol)?;
        let (branch_state, next_state) = state::next_branch_state(branch, self.state);
        if self.state <= 1 {
            return Ok(Step::Continue);
        }

        let length = self.read_index(branch.length_digits)?;
        let contents = self
            .symbols
            .by_ref()
            .take(length + 1)
            .collect::<Result<Vec<_>>>()?;
        self.state = next_state;

        Ok(Step::Open(Frame {
            symbols: SymbolStream::from_symbols(contents),
            state: branch_state,
            parent: self.parent,
            branch_start: Some(derivation.atoms.len()),
        }))
    }

    fn request_ring(&mut self, symbol: &str, derivation: &mut Derivation) -> Result<()> {
        if self.state == 0 {
            return Ok(());
        }

        let RingSymbol {
            length_digits,
            bond,
        } = RingSymbol::parse(symbol)?;
        let distance = self.read_index(length_digits)?;

        if let Some(right) = self.parent {
            let left = right.saturating_sub(distance.saturating_add(1));
            trace!(left, right, %bond, "requested ring");
            derivation.rings.push(RingRequest { left, right, bond });
        }
        Ok(())
    }

    /// Reads an index spelled out over the next `digits` symbols. Running out of symbols is the same as reading zeros.
    fn read_index(&mut self, digits: u8) -> Result<usize> {
        let digits = usize::from(digits);
        let symbols = self
            .symbols
            .by_ref()
            .take(digits)
            .collect::<Result<Vec<_>>>()?;
        let padding = digits - symbols.len();
        Ok(symbols_to_index(symbols.into_iter().chain(iter::repeat_n("", padding))))
    }
}

// Module Tests ========================================================================================================
