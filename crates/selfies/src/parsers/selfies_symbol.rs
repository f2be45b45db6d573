// External Crate Imports
use nom::{
    bytes::complete::{tag, take_until},
    character::complete::{anychar, char, satisfy},
    combinator::{all_consuming, map, opt},
    sequence::{delimited, pair, preceded, separated_pair, terminated, tuple},
};

// Local Crate Imports
use super::ParseResult;
use crate::{Bond, BranchSymbol, Result, RingSymbol, SelfiesError, SelfiesSymbol};

/// Derives nothing, but may end a chain early (or be skipped at the very start of one)
pub const EPSILON: &str = "[epsilon]";

/// Dropped from the symbol stream before derivation ever sees it
pub const NOP: &str = "[nop]";

const LEVELS: std::ops::RangeInclusive<u8> = 1..=3;

const BRANCH: &str = "Branch";

// Public API ==========================================================================================================

impl<'s> SelfiesSymbol<'s> {
    // NOTE: Branch and ring symbols are only parsed in full once derivation actually needs them
    #[must_use]
    pub fn classify(symbol: &'s str) -> Self {
        if symbol == EPSILON {
            Self::Epsilon
        } else if symbol.contains("Branch") {
            Self::Branch(symbol)
        } else if symbol.contains("Ring") {
            Self::Ring(symbol)
        } else {
            Self::Atom(symbol)
        }
    }
}

impl BranchSymbol {
    pub fn parse(symbol: &str) -> Result<Self> {
        let (_, (length_digits, bond_order)) = all_consuming(branch_symbol)(symbol)
            .map_err(|_| SelfiesError::unknown_branch_symbol(symbol))?;

        // NOTE: Any single digit is a valid length, but only bond orders that exist are accepted
        if !LEVELS.contains(&bond_order) {
            return Err(SelfiesError::unknown_branch_symbol(symbol).into());
        }

        Ok(Self {
            length_digits,
            bond_order,
        })
    }
}

impl RingSymbol {
    pub fn parse(symbol: &str) -> Result<Self> {
        let (_, (bond, length_digits)) = all_consuming(ring_symbol)(symbol)
            .map_err(|_| SelfiesError::unrecognized_symbol(symbol))?;

        if !LEVELS.contains(&length_digits) {
            return Err(SelfiesError::unrecognized_symbol(symbol).into());
        }

        Ok(Self {
            length_digits,
            bond,
        })
    }
}

/// Splits an atom symbol like `[=C]` or `[#N+1expl]` into its leading bond and the SMILES atom it derives. `expl`
/// atoms keep their brackets in SMILES, while the rest lose them
pub(crate) fn atom_symbol(symbol: &str) -> Result<(Bond, String)> {
    let body = symbol
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| SelfiesError::malformed_atom_symbol(symbol))?;

    let (bond, atom) = match body.chars().next() {
        Some(c @ ('/' | '\\' | '=' | '#')) => (Bond::new(c), &body[c.len_utf8()..]),
        _ => (Bond::SINGLE, body),
    };

    let smiles_atom = match atom.strip_suffix("expl") {
        Some(explicit) => format!("[{explicit}]"),
        None => atom.to_owned(),
    };

    Ok((bond, smiles_atom))
}

// Private Sub-Parsers =================================================================================================

/// Branch Symbol = "[" , { ? any character ? } , "Branch" , digit , "_" , digit , "]" ;
fn branch_symbol(i: &str) -> ParseResult<'_, (u8, u8)> {
    let prefix = tuple((char('['), take_until(BRANCH), tag(BRANCH)));
    preceded(prefix, terminated(separated_pair(digit, char('_'), digit), char(']')))(i)
}

/// Ring Symbol = "[" , [ "Expl" , ? bond character ? ] , "Ring" , digit , "]" ;
fn ring_symbol(i: &str) -> ParseResult<'_, (Bond, u8)> {
    let explicit_bond = map(opt(preceded(tag("Expl"), anychar)), |b| {
        b.map_or(Bond::SINGLE, Bond::new)
    });
    delimited(
        char('['),
        pair(explicit_bond, preceded(tag("Ring"), digit)),
        char(']'),
    )(i)
}

fn digit(i: &str) -> ParseResult<'_, u8> {
    map(satisfy(|c| c.is_ascii_digit()), |c| c as u8 - b'0')(i)
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_symbols() {
        assert_eq!(SelfiesSymbol::classify("[epsilon]"), SelfiesSymbol::Epsilon);
        assert_eq!(SelfiesSymbol::classify("[C]"), SelfiesSymbol::Atom("[C]"));
        assert_eq!(SelfiesSymbol::classify("[=N+1expl]"), SelfiesSymbol::Atom("[=N+1expl]"));
        assert_eq!(SelfiesSymbol::classify("[Ring2]"), SelfiesSymbol::Ring("[Ring2]"));
        assert_eq!(SelfiesSymbol::classify("[Expl=Ring1]"), SelfiesSymbol::Ring("[Expl=Ring1]"));
        assert_eq!(SelfiesSymbol::classify("[Branch1_3]"), SelfiesSymbol::Branch("[Branch1_3]"));
        // Branches are checked before rings
        assert_eq!(SelfiesSymbol::classify("[BranchRing]"), SelfiesSymbol::Branch("[BranchRing]"));
    }

    #[test]
    fn parse_branch_symbols() {
        assert_eq!(
            BranchSymbol::parse("[Branch1_1]").unwrap(),
            BranchSymbol {
                length_digits: 1,
                bond_order: 1
            }
        );
        assert_eq!(
            BranchSymbol::parse("[Branch3_2]").unwrap(),
            BranchSymbol {
                length_digits: 3,
                bond_order: 2
            }
        );
        // Lengths can be any digit, and anything may come between the bracket and "Branch"
        assert_eq!(
            BranchSymbol::parse("[Branch4_1]").unwrap(),
            BranchSymbol {
                length_digits: 4,
                bond_order: 1
            }
        );
        assert_eq!(
            BranchSymbol::parse("[Branch0_3]").unwrap(),
            BranchSymbol {
                length_digits: 0,
                bond_order: 3
            }
        );
        assert_eq!(
            BranchSymbol::parse("[=Branch1_2]").unwrap(),
            BranchSymbol {
                length_digits: 1,
                bond_order: 2
            }
        );
        for symbol in ["[Branch1_4]", "[Branch1_0]", "[BranchX_1]", "[Branch1]", "[Branch1_1", "Branch1_1]"] {
            let err = BranchSymbol::parse(symbol).unwrap_err();
            assert!(matches!(*err, SelfiesError::UnknownBranchSymbol { .. }), "{symbol:?}");
        }
    }

    #[test]
    fn parse_ring_symbols() {
        assert_eq!(
            RingSymbol::parse("[Ring1]").unwrap(),
            RingSymbol {
                length_digits: 1,
                bond: Bond::SINGLE
            }
        );
        assert_eq!(
            RingSymbol::parse("[Expl=Ring3]").unwrap(),
            RingSymbol {
                length_digits: 3,
                bond: Bond::new('=')
            }
        );
        assert_eq!(
            RingSymbol::parse("[Expl/Ring2]").unwrap(),
            RingSymbol {
                length_digits: 2,
                bond: Bond::new('/')
            }
        );
        for symbol in ["[Ring]", "[Ring0]", "[Ring4]", "[RingX]", "[Expl=Ring]", "[Ring1]x"] {
            let err = RingSymbol::parse(symbol).unwrap_err();
            assert!(matches!(*err, SelfiesError::UnrecognizedSymbol { .. }), "{symbol:?}");
        }
    }

    #[test]
    fn split_atom_symbols() {
        assert_eq!(atom_symbol("[C]").unwrap(), (Bond::SINGLE, "C".to_owned()));
        assert_eq!(atom_symbol("[=O]").unwrap(), (Bond::new('='), "O".to_owned()));
        assert_eq!(atom_symbol("[#N]").unwrap(), (Bond::new('#'), "N".to_owned()));
        assert_eq!(atom_symbol("[/C]").unwrap(), (Bond::new('/'), "C".to_owned()));
        assert_eq!(atom_symbol("[\\C]").unwrap(), (Bond::new('\\'), "C".to_owned()));
        assert_eq!(
            atom_symbol("[C@@Hexpl]").unwrap(),
            (Bond::SINGLE, "[C@@H]".to_owned())
        );
        assert_eq!(
            atom_symbol("[=N+1expl]").unwrap(),
            (Bond::new('='), "[N+1]".to_owned())
        );
        // Not bonds, so left in the atom
        assert_eq!(atom_symbol("[-C]").unwrap(), (Bond::SINGLE, "-C".to_owned()));
        // Missing brackets
        assert!(atom_symbol("C").is_err());
        assert!(atom_symbol("[C").is_err());
        assert!(atom_symbol("").is_err());
    }
}
