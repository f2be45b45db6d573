//! The grammar rules that take the derivation from one state to the next

// Local Crate Imports
use crate::{
    AtomSymbol, BondConstraints, BranchSymbol, Result, SelfiesError, State, TERMINAL_STATE,
    parsers::{EPSILON, parse_atom_symbol, selfies_symbol::atom_symbol},
};

// Public API ==========================================================================================================

/// Derives the SMILES atom (with its leading bond) for an atom or `[epsilon]` symbol, returning it alongside the next
/// derivation state
pub fn next_atom_state(
    symbol: &str,
    state: State,
    constraints: &BondConstraints,
) -> Result<(String, State)> {
    if symbol == EPSILON {
        let next_state = if state == 0 { 0 } else { TERMINAL_STATE };
        return Ok((String::new(), next_state));
    }

    let (bond, smiles_atom) = atom_symbol(symbol)?;
    let AtomSymbol {
        element,
        hydrogens,
        charge,
    } = parse_atom_symbol(&smiles_atom)?;

    let atom_or_ion = if charge == 0 {
        element.to_owned()
    } else {
        format!("{element}{charge:+}")
    };
    let max_bonds = constraints.max_bonds(&atom_or_ion);

    // NOTE: Anything but the first atom needs a free bond left over for whatever it's bonded to
    if hydrogens > max_bonds || (hydrogens == max_bonds && state > 0) {
        return Err(SelfiesError::excess_hydrogens(symbol, hydrogens, max_bonds).into());
    }
    let capacity = max_bonds - hydrogens;

    if state == 0 {
        return Ok((smiles_atom, State::from(capacity)));
    }

    let max_order = u8::try_from(state).map_or(capacity, |state| state.min(capacity));
    let bond = bond.capped(max_order);
    let next_state = match State::from(capacity - bond.order()) {
        0 => TERMINAL_STATE,
        remaining => remaining,
    };

    Ok((format!("{bond}{smiles_atom}"), next_state))
}

/// Returns the state a branch should start from and the state the main chain picks up with afterwards. Branches can
/// only be opened from states `2..=8`, otherwise the branch starts in the [`TERMINAL_STATE`] and the main chain is
/// left untouched.
#[must_use]
pub fn next_branch_state(branch: BranchSymbol, state: State) -> (State, State) {
    if (2..=8).contains(&state) {
        let branch_state = (state - 1).min(State::from(branch.bond_order));
        (branch_state, state - branch_state)
    } else {
        (TERMINAL_STATE, state)
    }
}

// Module Tests ========================================================================================================
