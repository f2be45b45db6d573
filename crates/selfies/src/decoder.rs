//! Splits SELFIES into fragments, translates each into SMILES, and stitches the results back together

// External Crate Imports
use itertools::Itertools;
use miette::{GraphicalReportHandler, GraphicalTheme};
use tracing::debug;

// Local Crate Imports
use crate::{
    BondConstraints, ConstraintRegistry, DecodeOptions, Decoder, Result, SelfiesError, SymbolStream,
    derivation::Derivation, rings::form_rings,
};

const FRAGMENT_SEPARATOR: &str = ".";

// Public API ==========================================================================================================

impl<'c> Decoder<'c> {
    #[must_use]
    pub const fn new(constraints: &'c BondConstraints) -> Self {
        Self { constraints }
    }

    /// Decodes `selfies` into SMILES. Empty fragments (like the one in `[C]..[C]`) are dropped, and a failure in any
    /// fragment fails the whole decode.
    pub fn decode(&self, selfies: impl AsRef<str>) -> Result<String> {
        let fragments = selfies
            .as_ref()
            .split(FRAGMENT_SEPARATOR)
            .map(SymbolStream::from_text);
        self.join_fragments(fragments)
    }

    /// Decodes SELFIES that have already been split into symbols, with `"."` symbols separating fragments
    pub fn decode_symbols(&self, symbols: &[&str]) -> Result<String> {
        let fragments = symbols
            .split(|&symbol| symbol == FRAGMENT_SEPARATOR)
            .map(|fragment| SymbolStream::from_symbols(fragment.iter().copied()));
        self.join_fragments(fragments)
    }

    /// Translates the symbols of a single fragment, which never contain a fragment separator
    pub fn translate_fragment(&self, symbols: SymbolStream<'_>) -> Result<String> {
        let Derivation {
            mut atoms,
            branches,
            rings,
        } = Derivation::derive(symbols, self.constraints)?;
        form_rings(&mut atoms, &rings);

        for (&start, &end) in &branches {
            atoms[start].text.insert(0, '(');
            atoms[end].text.push(')');
        }

        let smiles: String = atoms.into_iter().map(|atom| atom.text).collect();
        debug!(%smiles, branches = branches.len(), "translated fragment");
        Ok(smiles)
    }

    fn join_fragments<'s>(&self, fragments: impl Iterator<Item = SymbolStream<'s>>) -> Result<String> {
        let fragments: Vec<_> = fragments
            .map(|symbols| self.translate_fragment(symbols))
            .filter_ok(|smiles| !smiles.is_empty())
            .collect::<Result<_>>()?;
        Ok(fragments.join(FRAGMENT_SEPARATOR))
    }
}

// ---------------------------------------------------------------------------------------------------------------------

impl ConstraintRegistry {
    /// A decoder that borrows the active table
    #[must_use]
    pub const fn decoder(&self) -> Decoder<'_> {
        Decoder::new(self.constraints())
    }

    pub fn decode(&self, selfies: impl AsRef<str>) -> Result<String> {
        self.decode_with(selfies, &DecodeOptions::default())
    }

    /// Decodes against the active table, or against a preset if `options` asks for one. The registry itself is never
    /// touched, so an override can't outlive the call that asked for it.
    pub fn decode_with(&self, selfies: impl AsRef<str>, options: &DecodeOptions) -> Result<String> {
        let selfies = selfies.as_ref();
        let preset_constraints = options.constraints.map(|preset| preset.constraints());
        let constraints = preset_constraints.as_ref().unwrap_or(self.constraints());

        let result = Decoder::new(constraints).decode(selfies);
        if let Err(error) = &result {
            debug!(selfies, %error, "failed to decode");
            if options.print_error {
                print_error(selfies, error);
            }
        }
        result
    }
}

fn print_error(selfies: &str, error: &SelfiesError) {
    let mut report = String::new();
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
    if handler.render_report(&mut report, error).is_ok() {
        eprintln!("Decoding error {selfies:?}:\n{report}");
    } else {
        eprintln!("Decoding error {selfies:?}: {error}");
    }
}

// Module Tests ========================================================================================================
