use std::fmt::{self, Display, Formatter};

use crate::Bond;

impl Bond {
    pub const SINGLE: Self = Self(None);

    pub(crate) const fn new(symbol: char) -> Self {
        Self(Some(symbol))
    }

    /// The SMILES bond for an order of 1, 2, or 3. Anything higher is clamped to a triple bond
    pub(crate) const fn from_order(order: u8) -> Self {
        match order {
            0 | 1 => Self::SINGLE,
            2 => Self(Some('=')),
            _ => Self(Some('#')),
        }
    }

    /// Unrecognized bond characters (like the stereo bonds `/` and `\`) count as single bonds
    pub const fn order(self) -> u8 {
        match self.0 {
            Some('=') => 2,
            Some('#') => 3,
            _ => 1,
        }
    }

    /// Splits any explicit bond character off the front of a derived SMILES fragment
    pub(crate) fn split_leading(fragment: &str) -> (Self, &str) {
        match fragment.chars().next() {
            Some(c @ ('-' | '/' | '\\' | '=' | '#')) => (Self::new(c), &fragment[c.len_utf8()..]),
            _ => (Self::SINGLE, fragment),
        }
    }

    /// The order of the bond implied by the first character of a derived fragment
    pub(crate) fn leading_order(fragment: &str) -> u8 {
        match fragment.chars().next() {
            Some('=') => 2,
            Some('#') => 3,
            _ => 1,
        }
    }

    /// Caps this bond at `max_order`, falling back to a plain `''`, `=`, or `#` bond when that cap bites
    pub(crate) fn capped(self, max_order: u8) -> Self {
        if self.order() > max_order {
            Self::from_order(max_order)
        } else {
            self
        }
    }
}

impl Display for Bond {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(symbol) = self.0 {
            write!(f, "{symbol}")?;
        }
        Ok(())
    }
}

// Module Tests ========================================================================================================
