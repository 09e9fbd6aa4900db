use crate::{
    constants::{EVEN_INCREMENT, SINGLE_INCREMENT},
    error::{ArrangerError, Result},
};
use std::{str::FromStr, sync::LazyLock};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Section types a song can be built from, in catalog declaration order.
///
/// Display and parse names are case-sensitive and match what the front end
/// shows as choices.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum SectionKind {
    Intro,
    Verse,
    Build,
    Drop,
    Break,
    #[strum(serialize = "Break_sm")]
    BreakSm,
    #[strum(serialize = "Break_lg")]
    BreakLg,
    Outro,
    PreChorus,
    Bridge,
}

impl SectionKind {
    /// Position in declaration order
    pub fn index(self) -> usize {
        self as usize
    }

    /// Parse a section name, reporting the available names on failure
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name.trim()).map_err(|_| ArrangerError::UnknownSection {
            name: name.to_string(),
            available: Self::names().join(", "),
        })
    }

    pub fn names() -> Vec<&'static str> {
        Self::iter().map(|kind| kind.into()).collect()
    }

    /// Built-in weight/even/rank/balance table
    pub fn builtin_def(self) -> SectionDef {
        use SectionKind::*;
        match self {
            Intro => SectionDef::new(1.0, true, 4, true),
            Verse => SectionDef::new(4.0, true, 5, true),
            Build => SectionDef::new(2.0, true, 6, true),
            Drop => SectionDef::new(3.0, true, 7, true),
            Break => SectionDef::new(2.5, true, 1, false),
            BreakSm => SectionDef::new(3.0, true, 2, false),
            BreakLg => SectionDef::new(1.0, true, 1, false),
            Outro => SectionDef::new(1.0, true, 3, true),
            PreChorus => SectionDef::new(1.5, true, 2, true),
            Bridge => SectionDef::new(2.0, true, 3, true),
        }
    }
}

/// Allocation attributes of one section type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionDef {
    /// Relative share of the beat budget
    pub weight: f64,
    /// Measure count must stay a multiple of two
    pub even: bool,
    /// Lower rank receives leftover measures first
    pub rank: u32,
    /// Leftovers go to every instance at once or not at all
    pub balance: bool,
}

impl SectionDef {
    pub const fn new(weight: f64, even: bool, rank: u32, balance: bool) -> Self {
        Self {
            weight,
            even,
            rank,
            balance,
        }
    }

    /// Smallest number of measures this type can grow or shrink by
    pub fn increment(&self) -> u64 {
        if self.even {
            EVEN_INCREMENT
        } else {
            SINGLE_INCREMENT
        }
    }
}

static BUILTIN: LazyLock<SectionCatalog> =
    LazyLock::new(|| SectionCatalog::from_fn(SectionKind::builtin_def));

/// Total mapping from [`SectionKind`] to [`SectionDef`].
///
/// The rank-sorted view is computed once when the catalog is built. Ties in
/// rank keep declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionCatalog {
    defs: Vec<SectionDef>, // indexed by SectionKind::index
    ranked: Vec<SectionKind>,
}

impl SectionCatalog {
    pub fn builtin() -> &'static SectionCatalog {
        &BUILTIN
    }

    pub fn from_fn(def_of: impl Fn(SectionKind) -> SectionDef) -> Self {
        Self::from_defs(SectionKind::iter().map(def_of).collect())
    }

    fn from_defs(defs: Vec<SectionDef>) -> Self {
        let mut ranked: Vec<SectionKind> = SectionKind::iter().collect();
        // sort_by_key is stable
        ranked.sort_by_key(|kind| defs[kind.index()].rank);
        Self { defs, ranked }
    }

    /// Copy of this catalog with one definition replaced
    pub fn with_definition(&self, kind: SectionKind, def: SectionDef) -> Self {
        let mut defs = self.defs.clone();
        defs[kind.index()] = def;
        Self::from_defs(defs)
    }

    pub fn get(&self, kind: SectionKind) -> &SectionDef {
        &self.defs[kind.index()]
    }

    /// Entries in declaration order
    pub fn entries(&self) -> impl Iterator<Item = (SectionKind, &SectionDef)> + '_ {
        SectionKind::iter().zip(self.defs.iter())
    }

    /// Entries in leftover-distribution priority order
    pub fn ranked(&self) -> impl Iterator<Item = (SectionKind, &SectionDef)> + '_ {
        self.ranked.iter().map(move |&kind| (kind, self.get(kind)))
    }
}
