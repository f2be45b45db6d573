//! Branch lengths and ring distances are spelled out in base-16, using ordinary SELFIES symbols as the digits

/// The digits `0` through `F`, in order
pub const INDEX_ALPHABET: [&str; 16] = [
    "[C]",
    "[Ring1]",
    "[Ring2]",
    "[Branch1_1]",
    "[Branch1_2]",
    "[Branch1_3]",
    "[Branch2_1]",
    "[Branch2_2]",
    "[Branch2_3]",
    "[O]",
    "[N]",
    "[=N]",
    "[=C]",
    "[#C]",
    "[S]",
    "[P]",
];

const BASE: usize = INDEX_ALPHABET.len();

/// Reads `symbols` as a base-16 number, most-significant digit first. Symbols outside of [`INDEX_ALPHABET`] count as
/// zero.
pub fn symbols_to_index<'s>(symbols: impl IntoIterator<Item = &'s str>) -> usize {
    symbols.into_iter().fold(0, |index, symbol| {
        index.saturating_mul(BASE).saturating_add(digit(symbol))
    })
}

/// The inverse of [`symbols_to_index`]. Zero is written as a single `[C]`, never as an empty list.
#[must_use]
pub fn index_to_symbols(mut index: usize) -> Vec<&'static str> {
    if index == 0 {
        return vec![INDEX_ALPHABET[0]];
    }

    let mut symbols = Vec::new();
    while index > 0 {
        symbols.push(INDEX_ALPHABET[index % BASE]);
        index /= BASE;
    }
    symbols.reverse();
    symbols
}

fn digit(symbol: &str) -> usize {
    INDEX_ALPHABET
        .iter()
        .position(|&digit| digit == symbol)
        .unwrap_or(0)
}

// Module Tests ========================================================================================================
