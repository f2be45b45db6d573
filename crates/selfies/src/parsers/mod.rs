pub mod atom_symbol;
pub mod selfies_symbol;

use nom::IResult;

pub(crate) type ParseResult<'s, O> = IResult<&'s str, O>;

// Re-exports
pub use atom_symbol::{locate_element, parse_atom_symbol};
pub use selfies_symbol::{EPSILON, NOP};
