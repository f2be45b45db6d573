// Standard Library Imports
use std::ops::Range;

// External Crate Imports
use nom::{
    branch::alt,
    character::complete::{anychar, char, digit0, digit1, one_of, satisfy},
    combinator::{cut, map, map_res, opt, peek, recognize, success},
    multi::fold_many1,
    sequence::{pair, preceded, terminated, tuple},
};

// Local Crate Imports
use super::ParseResult;
use crate::{AtomSymbol, Result, SelfiesError};

// Public API ==========================================================================================================

/// Finds the byte range of the element within a SMILES atom symbol. A bare symbol is entirely element, while a
/// bracketed one skips any isotope number first:
///
/// - `b` -> `0..1`
/// - `[13C]` -> `3..4`
/// - `[nH+]` -> `1..2`
pub fn locate_element(atom_symbol: &str) -> Result<Range<usize>> {
    if !atom_symbol.starts_with('[') {
        return bare_atom(atom_symbol).map(|_| 0..atom_symbol.len());
    }

    let (_, (prefix, element)) = pair(isotope_prefix, element)(atom_symbol)
        .map_err(|_| SelfiesError::malformed_atom_symbol(atom_symbol))?;
    let start = prefix.len();

    Ok(start..start + element.len())
}

/// Parses the element, hydrogen count, and charge out of a SMILES atom symbol. Only `@` and `@@` are understood as
/// chirality markers.
pub fn parse_atom_symbol(atom_symbol: &str) -> Result<AtomSymbol<'_>> {
    if !atom_symbol.starts_with('[') {
        return bare_atom(atom_symbol);
    }

    let (_, atom) =
        bracket_atom(atom_symbol).map_err(|_| SelfiesError::malformed_atom_symbol(atom_symbol))?;

    Ok(atom)
}

// Private Sub-Parsers =================================================================================================

fn bare_atom(atom_symbol: &str) -> Result<AtomSymbol<'_>> {
    if atom_symbol.is_empty() {
        return Err(SelfiesError::malformed_atom_symbol(atom_symbol).into());
    }

    Ok(AtomSymbol {
        element: atom_symbol,
        hydrogens: 0,
        charge: 0,
    })
}

// NOTE: Whatever follows the charge (usually the closing ']') is never consumed, but it must exist. Running out of
// input partway through a bracketed atom means that atom was cut short
/// Bracket Atom = Isotope Prefix , Element , [ Chirality ] , [ Hydrogens ] , [ Charge ] , ? any character ? ;
fn bracket_atom(i: &str) -> ParseResult<'_, AtomSymbol<'_>> {
    let parser = tuple((
        preceded(isotope_prefix, element),
        preceded(opt(chirality), opt(hydrogens)),
        opt(charge),
    ));
    let atom = map(parser, |(element, hydrogens, charge)| AtomSymbol {
        element,
        hydrogens: hydrogens.unwrap_or(0),
        charge: charge.unwrap_or(0),
    });
    terminated(atom, peek(anychar))(i)
}

/// Isotope Prefix = "[" , { digit } ;
fn isotope_prefix(i: &str) -> ParseResult<'_, &str> {
    recognize(pair(char('['), digit0))(i)
}

// NOTE: The first character is taken on faith, but a second is only part of the element if it's a letter other than
// `H`, which keeps the `H` of `[CH4]` out of the element while still catching `Cl` or `Se`
/// Element = ? any character ? , [ letter - "H" ] ;
fn element(i: &str) -> ParseResult<'_, &str> {
    let second_letter = satisfy(|c| c.is_alphabetic() && c != 'H');
    recognize(tuple((anychar, peek(anychar), opt(second_letter))))(i)
}

/// Chirality = "@" , [ "@" ] ;
fn chirality(i: &str) -> ParseResult<'_, &str> {
    recognize(pair(char('@'), opt(char('@'))))(i)
}

/// Hydrogens = "H" , [ digit ] ;
fn hydrogens(i: &str) -> ParseResult<'_, u8> {
    let digit = map(satisfy(|c| c.is_ascii_digit()), |c| c as u8 - b'0');
    preceded(char('H'), map(opt(digit), |count| count.unwrap_or(1)))(i)
}

/// Charge = Sign , [ { Sign }- | { digit }- ] ;
fn charge(i: &str) -> ParseResult<'_, i32> {
    let (i, sign) = map(one_of("+-"), sign_value)(i)?;

    // NOTE: Signs accumulate (`[Cu++]` is +2, `[N+-]` is neutral), whilst a magnitude multiplies (`[Cu+2]`)
    let repeated_signs = fold_many1(one_of("+-"), move || sign, |charge, c| charge + sign_value(c));
    let magnitude = map(
        preceded(peek(digit1), cut(map_res(digit1, |m: &str| m.parse::<i32>()))),
        move |m| sign * m,
    );
    alt((repeated_signs, magnitude, success(sign)))(i)
}

const fn sign_value(sign: char) -> i32 {
    if sign == '+' { 1 } else { -1 }
}

// Module Tests ========================================================================================================
