//! Closes the rings requested during derivation, merging any that land between the same pair of atoms

// External Crate Imports
use ahash::{HashMap, HashMapExt};
use tracing::debug;

// Local Crate Imports
use crate::{
    Bond, State,
    derivation::{DerivedAtom, RingRequest},
};

const MAX_ORDER: u8 = 3;

/// Settles every ring in request order, then writes matching ring-closure numbers onto both ends of each
pub(crate) fn form_rings(atoms: &mut [DerivedAtom], rings: &[RingRequest]) {
    let closures = settle_rings(atoms, rings);
    debug!(requested = rings.len(), closed = closures.len(), "formed rings");

    for (number, ((left, right), bond)) in (1..).zip(closures) {
        let closure = format!("{bond}{}", ring_number(number));
        atoms[left].text.push_str(&closure);
        atoms[right].text.push_str(&closure);
    }
}

// ---------------------------------------------------------------------------------------------------------------------

fn settle_rings(atoms: &mut [DerivedAtom], rings: &[RingRequest]) -> Vec<((usize, usize), Bond)> {
    // NOTE: Closures keep the order they were first requested in, which is the order their numbers are handed out in
    let mut closures = Vec::new();
    let mut closure_index = HashMap::new();

    for &RingRequest { left, right, bond } in rings {
        if left == right {
            continue;
        }

        let (left_capacity, right_capacity) = (atoms[left].capacity, atoms[right].capacity);
        if left_capacity <= 0 || right_capacity <= 0 {
            continue;
        }
        let bond = bond.capped(order_limit(left_capacity.min(right_capacity)));

        if atoms[right].parent == Some(left) {
            // The atoms are already bonded, so that bond is upgraded instead: CC1C1C becomes CC=CC
            let right_atom = &mut atoms[right].text;
            let (existing, atom) = Bond::split_leading(right_atom);
            let upgraded = merge_bonds(existing, bond);
            *right_atom = format!("{upgraded}{atom}");
        } else {
            let location = (left.min(right), left.max(right));
            if let Some(&index) = closure_index.get(&location) {
                let (_, existing) = closures[index];
                closures[index] = (location, merge_bonds(existing, bond));
            } else {
                closure_index.insert(location, closures.len());
                closures.push((location, bond));
            }
        }

        let order = State::from(bond.order());
        atoms[left].capacity -= order;
        atoms[right].capacity -= order;
    }

    closures
}

fn merge_bonds(existing: Bond, additional: Bond) -> Bond {
    Bond::from_order((existing.order() + additional.order()).min(MAX_ORDER))
}

fn order_limit(capacity: State) -> u8 {
    u8::try_from(capacity).unwrap_or(u8::MAX)
}

// NOTE: Numbers past 99 use the `%(N)` extended syntax of OpenSMILES, since `%` on its own only takes two digits
fn ring_number(number: usize) -> String {
    match number {
        0..=9 => number.to_string(),
        10..=99 => format!("%{number}"),
        _ => format!("%({number})"),
    }
}

// Module Tests ========================================================================================================
