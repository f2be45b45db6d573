//! Bond capacity tables and the registry holding the active one

// Standard Library Imports
use std::{collections::BTreeSet, str::FromStr};

// External Crate Imports
use ahash::HashMap;
use itertools::iproduct;
use knuffel::Decode;

// Local Crate Imports
use crate::{
    BondConstraints, ConstraintError, ConstraintPreset, ConstraintRegistry, Result, SelfiesError,
};

// Preset Tables =======================================================================================================

/// The default preset, written out as a KDL document that [`BondConstraints::from_kdl`] accepts
pub const DEFAULT_KDL: &str = include_str!("../data/default_constraints.kdl");

const UNLISTED_MAX_BONDS: u8 = 8;

const DEFAULT_CONSTRAINTS: [(&str, u8); 21] = [
    ("H", 1),
    ("F", 1),
    ("Cl", 1),
    ("Br", 1),
    ("I", 1),
    ("O", 2),
    ("O+1", 3),
    ("O-1", 1),
    ("N", 3),
    ("N+1", 4),
    ("N-1", 2),
    ("C", 4),
    ("C+1", 5),
    ("C-1", 3),
    ("P", 5),
    ("P+1", 6),
    ("P-1", 4),
    ("S", 6),
    ("S+1", 7),
    ("S-1", 5),
    (BondConstraints::WILDCARD, UNLISTED_MAX_BONDS),
];

const OCTET_RULE_OVERRIDES: [(&str, u8); 6] = [
    ("S", 2),
    ("S+1", 3),
    ("S-1", 1),
    ("P", 3),
    ("P+1", 4),
    ("P-1", 2),
];

const HYPERVALENT_OVERRIDES: [(&str, u8); 4] = [("Cl", 7), ("Br", 7), ("I", 7), ("N", 5)];

// NOTE: Atoms in the organic subset can be written without brackets in SMILES, so their symbols don't need `expl`
const ORGANIC_SUBSET: [&str; 10] = ["B", "C", "N", "O", "S", "P", "F", "Cl", "Br", "I"];

// Public API ==========================================================================================================

impl BondConstraints {
    pub const WILDCARD: &'static str = "?";

    /// Builds a validated table: `?` must be present and every capacity must lie within `1..=8`
    pub fn new<K: Into<String>>(
        entries: impl IntoIterator<Item = (K, u8)>,
    ) -> Result<Self, ConstraintError> {
        let table: HashMap<_, _> = entries
            .into_iter()
            .map(|(key, max_bonds)| (key.into(), max_bonds))
            .collect();

        let &wildcard = table
            .get(Self::WILDCARD)
            .ok_or(ConstraintError::MissingWildcard)?;

        // NOTE: Reports the alphabetically-first offender so that errors don't depend on hash ordering
        let out_of_range = table
            .iter()
            .filter(|(_, max_bonds)| !(1..=8).contains(*max_bonds))
            .min_by_key(|&(key, _)| key);
        if let Some((key, &value)) = out_of_range {
            let key = key.clone();
            return Err(ConstraintError::OutOfRange { key, value });
        }

        Ok(Self { table, wildcard })
    }

    #[must_use]
    pub fn preset(preset: ConstraintPreset) -> Self {
        let overrides: &[_] = match preset {
            ConstraintPreset::Default => &[],
            ConstraintPreset::OctetRule => &OCTET_RULE_OVERRIDES,
            ConstraintPreset::Hypervalent => &HYPERVALENT_OVERRIDES,
        };
        let table = DEFAULT_CONSTRAINTS
            .iter()
            .chain(overrides)
            .map(|&(key, max_bonds)| (key.to_owned(), max_bonds))
            .collect();

        Self {
            table,
            wildcard: UNLISTED_MAX_BONDS,
        }
    }

    pub fn from_kdl(file_name: impl AsRef<str>, text: impl AsRef<str>) -> Result<Self> {
        let parsed: Vec<ConstraintKdl> = knuffel::parse(file_name.as_ref(), text.as_ref())
            .map_err(SelfiesError::ConstraintDocument)?;
        let entries = parsed
            .into_iter()
            .map(|ConstraintKdl { key, max_bonds }| (key, max_bonds));

        Self::new(entries).map_err(|error| SelfiesError::from(error).into())
    }

    /// The capacity of `atom_or_ion` (like `C` or `N+1`), falling back to the `?` entry
    #[must_use]
    pub fn max_bonds(&self, atom_or_ion: &str) -> u8 {
        self.table
            .get(atom_or_ion)
            .copied()
            .unwrap_or(self.wildcard)
    }

    /// Every symbol whose derivation is constrained by this table: atoms and ions with each bond they have room for,
    /// plus the full set of ring and branch symbols
    #[must_use]
    pub fn robust_alphabet(&self) -> BTreeSet<String> {
        let bonds = [("", 1), ("=", 2), ("#", 3)];

        let atoms = iproduct!(&self.table, bonds)
            .filter(|&((key, &max_bonds), (_, order))| key != Self::WILDCARD && order <= max_bonds)
            .map(|((key, _), (bond, _))| {
                if ORGANIC_SUBSET.contains(&key.as_str()) {
                    format!("[{bond}{key}]")
                } else {
                    format!("[{bond}{key}expl]")
                }
            });

        let rings = (1..=3).flat_map(|l| [format!("[Ring{l}]"), format!("[Expl=Ring{l}]")]);
        let branches = iproduct!(1..=3, 1..=3).map(|(l, x)| format!("[Branch{l}_{x}]"));

        atoms.chain(rings).chain(branches).collect()
    }
}

impl Default for BondConstraints {
    fn default() -> Self {
        Self::preset(ConstraintPreset::Default)
    }
}

// ---------------------------------------------------------------------------------------------------------------------

impl ConstraintPreset {
    #[must_use]
    pub fn constraints(self) -> BondConstraints {
        BondConstraints::preset(self)
    }
}

impl FromStr for ConstraintPreset {
    type Err = Box<SelfiesError>;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "default" => Ok(Self::Default),
            "octet_rule" => Ok(Self::OctetRule),
            "hypervalent" => Ok(Self::Hypervalent),
            name => Err(SelfiesError::unrecognized_constraint_type(name).into()),
        }
    }
}

// ---------------------------------------------------------------------------------------------------------------------

impl ConstraintRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the active table. Later changes to the registry won't show up in it
    #[must_use]
    pub fn active(&self) -> BondConstraints {
        self.active.clone()
    }

    #[must_use]
    pub const fn constraints(&self) -> &BondConstraints {
        &self.active
    }

    /// Installs `constraints` as the active table, or resets to the default preset if given `None`
    pub fn set_active(&mut self, constraints: Option<BondConstraints>) {
        self.active = constraints.unwrap_or_default();
    }

    /// Validates and installs a table of raw `(atom-or-ion, capacity)` entries, leaving the active table untouched if
    /// validation fails
    pub fn set_active_table<K: Into<String>>(
        &mut self,
        entries: impl IntoIterator<Item = (K, u8)>,
    ) -> Result<()> {
        let constraints = BondConstraints::new(entries).map_err(SelfiesError::from)?;
        self.active = constraints;
        Ok(())
    }
}

// KDL File Schema =====================================================================================================

#[derive(Debug, Decode)]
struct ConstraintKdl {
    #[knuffel(node_name)]
    key: String,
    #[knuffel(argument)]
    max_bonds: u8,
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn preset_tables() {
        let default = BondConstraints::preset(ConstraintPreset::Default);
        assert_eq!(default.len(), 21);
        assert_eq!(default.max_bonds("C"), 4);
        assert_eq!(default.max_bonds("O-1"), 1);
        assert_eq!(default.max_bonds("S"), 6);
        assert_eq!(default.max_bonds("Cl"), 1);

        let octet_rule = BondConstraints::preset(ConstraintPreset::OctetRule);
        assert_eq!(octet_rule.len(), 21);
        assert_eq!(octet_rule.max_bonds("S"), 2);
        assert_eq!(octet_rule.max_bonds("S+1"), 3);
        assert_eq!(octet_rule.max_bonds("P-1"), 2);
        assert_eq!(octet_rule.max_bonds("Cl"), 1);

        let hypervalent = BondConstraints::preset(ConstraintPreset::Hypervalent);
        assert_eq!(hypervalent.len(), 21);
        assert_eq!(hypervalent.max_bonds("Cl"), 7);
        assert_eq!(hypervalent.max_bonds("N"), 5);
        assert_eq!(hypervalent.max_bonds("S"), 6);
    }

    #[test]
    fn presets_are_fresh_copies() {
        assert_eq!(BondConstraints::default(), ConstraintPreset::Default.constraints());
        assert_ne!(
            ConstraintPreset::Default.constraints(),
            ConstraintPreset::OctetRule.constraints()
        );
    }

    #[test]
    fn unlisted_atoms_use_wildcard() {
        let default = BondConstraints::default();
        assert_eq!(default.max_bonds("Fe"), 8);
        assert_eq!(default.max_bonds("N+2"), 8);

        let custom = BondConstraints::new([("?", 3), ("C", 4)]).unwrap();
        assert_eq!(custom.max_bonds("C"), 4);
        assert_eq!(custom.max_bonds("Xe"), 3);
    }

    #[test]
    fn invalid_tables() {
        assert_eq!(
            BondConstraints::new([("?", 9)]),
            Err(ConstraintError::OutOfRange {
                key: "?".to_owned(),
                value: 9
            })
        );
        assert_eq!(
            BondConstraints::new([("?", 8), ("C", 0)]),
            Err(ConstraintError::OutOfRange {
                key: "C".to_owned(),
                value: 0
            })
        );
        assert_eq!(
            BondConstraints::new([("C", 4)]),
            Err(ConstraintError::MissingWildcard)
        );
        // The missing wildcard is reported before any out-of-range values
        assert_eq!(
            BondConstraints::new([("C", 12)]),
            Err(ConstraintError::MissingWildcard)
        );
    }

    #[test]
    fn parse_preset_names() {
        assert_eq!("default".parse::<ConstraintPreset>().unwrap(), ConstraintPreset::Default);
        assert_eq!(
            "octet_rule".parse::<ConstraintPreset>().unwrap(),
            ConstraintPreset::OctetRule
        );
        assert_eq!(
            "hypervalent".parse::<ConstraintPreset>().unwrap(),
            ConstraintPreset::Hypervalent
        );
        let err = "octet".parse::<ConstraintPreset>().unwrap_err();
        assert!(matches!(*err, SelfiesError::UnrecognizedConstraintType { ref name } if name == "octet"));
        // Names survive a round-trip through `Display`
        for preset in [
            ConstraintPreset::Default,
            ConstraintPreset::OctetRule,
            ConstraintPreset::Hypervalent,
        ] {
            assert_eq!(preset.to_string().parse::<ConstraintPreset>().unwrap(), preset);
        }
    }

    #[test]
    fn registry_lifecycle() {
        let mut registry = ConstraintRegistry::new();
        assert_eq!(registry.active(), BondConstraints::default());

        registry.set_active(Some(ConstraintPreset::Hypervalent.constraints()));
        assert_eq!(registry.constraints().max_bonds("N"), 5);

        // Snapshots are copies, not views
        let snapshot = registry.active();
        registry.set_active(None);
        assert_eq!(snapshot.max_bonds("N"), 5);
        assert_eq!(registry.constraints().max_bonds("N"), 3);
    }

    #[test]
    fn registry_rejects_invalid_tables() {
        let mut registry = ConstraintRegistry::new();
        registry.set_active_table([("?", 2), ("C", 3)]).unwrap();
        assert_eq!(registry.constraints().max_bonds("C"), 3);

        let err = registry.set_active_table([("?", 9)]).unwrap_err();
        assert!(matches!(
            *err,
            SelfiesError::InvalidConstraintTable(ConstraintError::OutOfRange { .. })
        ));
        // A failed update leaves the previous table in place
        assert_eq!(registry.constraints().max_bonds("C"), 3);
    }

    #[test]
    fn parse_default_constraint_file() {
        let constraints = BondConstraints::from_kdl("default_constraints.kdl", DEFAULT_KDL).unwrap();
        assert_eq!(constraints, BondConstraints::default());
    }

    #[test]
    fn parse_custom_constraints() {
        let kdl = indoc! {r#"
            C 4
            Fe 6
            "Fe+2" 4
            "?" 2
        "#};
        let constraints = BondConstraints::from_kdl("custom.kdl", kdl).unwrap();
        assert_eq!(constraints.max_bonds("Fe+2"), 4);
        assert_eq!(constraints.max_bonds("N"), 2);
    }

    #[test]
    fn invalid_constraint_files() {
        let err = BondConstraints::from_kdl("test", "C 4").unwrap_err();
        assert!(matches!(
            *err,
            SelfiesError::InvalidConstraintTable(ConstraintError::MissingWildcard)
        ));

        let err = BondConstraints::from_kdl("test", "\"?\" 9").unwrap_err();
        assert!(matches!(
            *err,
            SelfiesError::InvalidConstraintTable(ConstraintError::OutOfRange { .. })
        ));

        let err = BondConstraints::from_kdl("test", "C \"four\"\n\"?\" 8").unwrap_err();
        assert!(matches!(*err, SelfiesError::ConstraintDocument(_)));
    }

    #[test]
    fn robust_alphabet() {
        let alphabet = BondConstraints::default().robust_alphabet();
        // Organic atoms are plain, with every bond they have room for
        assert!(alphabet.contains("[C]"));
        assert!(alphabet.contains("[=C]"));
        assert!(alphabet.contains("[#C]"));
        assert!(alphabet.contains("[=O]"));
        assert!(!alphabet.contains("[#O]"));
        assert!(alphabet.contains("[F]"));
        assert!(!alphabet.contains("[=F]"));
        // Ions and hydrogen need `expl`
        assert!(alphabet.contains("[O-1expl]"));
        assert!(alphabet.contains("[=N+1expl]"));
        assert!(alphabet.contains("[Hexpl]"));
        // The wildcard never becomes a symbol
        assert!(!alphabet.iter().any(|s| s.contains('?')));
        // Rings and branches
        assert!(alphabet.contains("[Ring3]"));
        assert!(alphabet.contains("[Expl=Ring2]"));
        assert!(alphabet.contains("[Branch3_2]"));
        assert_eq!(alphabet.iter().filter(|s| s.contains("Branch")).count(), 9);
        assert_eq!(alphabet.iter().filter(|s| s.contains("Ring")).count(), 6);
    }
}
