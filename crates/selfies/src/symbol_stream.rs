//! A lazy, forward-only stream over the bracketed symbols of a single (dot-free) fragment

// Standard Library Imports
use std::vec;

// External Crate Imports
use nom::{
    bytes::complete::take_till,
    character::complete::char,
    combinator::recognize,
    sequence::tuple,
};

// Local Crate Imports
use crate::{
    Result, SelfiesError,
    parsers::{NOP, ParseResult},
};

/// Yields the symbols of one fragment, either cut out of SELFIES text or taken from a pre-split list. `[nop]` symbols
/// are dropped, and once the stream runs dry (or hits malformed brackets) it stays exhausted
#[derive(Clone, Debug)]
pub struct SymbolStream<'s> {
    source: Source<'s>,
}

#[derive(Clone, Debug)]
enum Source<'s> {
    Text { fragment: &'s str, rest: &'s str },
    Symbols(vec::IntoIter<&'s str>),
    Exhausted,
}

impl<'s> SymbolStream<'s> {
    /// Anything before the first `[` is skipped, but any text found between later symbols is an error
    #[must_use]
    pub fn from_text(fragment: &'s str) -> Self {
        let source = match fragment.find('[') {
            Some(start) => Source::Text {
                fragment,
                rest: &fragment[start..],
            },
            None => Source::Exhausted,
        };
        Self { source }
    }

    /// An empty symbol in the list marks the end of the stream, just like running out of symbols
    pub fn from_symbols(symbols: impl IntoIterator<Item = &'s str>) -> Self {
        let symbols: Vec<_> = symbols.into_iter().collect();
        Self {
            source: Source::Symbols(symbols.into_iter()),
        }
    }

    pub fn next_symbol(&mut self) -> Result<Option<&'s str>> {
        let next = match &mut self.source {
            Source::Text { fragment, rest } => next_in_text(*fragment, rest),
            Source::Symbols(symbols) => Ok(symbols.find(|&symbol| symbol != NOP)),
            Source::Exhausted => Ok(None),
        };

        if !matches!(next, Ok(Some(symbol)) if !symbol.is_empty()) {
            self.source = Source::Exhausted;
            return next.map(|_| None);
        }
        next
    }
}

impl<'s> Iterator for SymbolStream<'s> {
    type Item = Result<&'s str>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_symbol().transpose()
    }
}

// ---------------------------------------------------------------------------------------------------------------------

fn next_in_text<'s>(fragment: &str, rest: &mut &'s str) -> Result<Option<&'s str>> {
    while !rest.is_empty() {
        let (remaining, symbol) = bracketed_symbol(*rest).map_err(|_| {
            let offset = fragment.len() - rest.len();
            SelfiesError::malformed_brackets(fragment, offset)
        })?;
        *rest = remaining;

        if symbol != NOP {
            return Ok(Some(symbol));
        }
    }
    Ok(None)
}

/// Bracketed Symbol = "[" , { ? any character except "]" ? } , "]" ;
fn bracketed_symbol(i: &str) -> ParseResult<'_, &str> {
    recognize(tuple((char('['), take_till(|c| c == ']'), char(']'))))(i)
}

// Module Tests ========================================================================================================
