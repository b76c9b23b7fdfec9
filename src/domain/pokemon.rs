use serde::{Deserialize, Serialize};

/// One row of the `pokemon` table.
///
/// The id is the source-assigned stable identifier; every other attribute is
/// mutable and overwritten on re-load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: i64,
    pub name: String,
    pub height: Option<i64>,
    pub weight: Option<i64>,
    pub base_experience: Option<i64>,

    /// Free-form reference to the species resource. Deliberately kept as
    /// text: species details are out of scope and the URL is not a
    /// guaranteed stable identifier.
    pub species_url: Option<String>,
}

/// A pokemon's reference to a type, with the source-assigned slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSlot {
    pub name: String,
    pub slot: Option<i64>,
}

/// A pokemon's reference to an ability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilitySlot {
    pub name: String,
    pub slot: Option<i64>,
    pub is_hidden: bool,
}

/// A pokemon's value for one stat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatValue {
    pub name: String,
    pub base_stat: Option<i64>,
    pub effort: Option<i64>,
}

/// Fully normalized form of one raw API record: everything the writer needs
/// to persist the record across the relational tables.
///
/// The slot-bearing collections keep the source ordering; slot values are
/// taken verbatim, never re-derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedPokemon {
    pub pokemon: Pokemon,
    pub types: Vec<TypeSlot>,
    pub abilities: Vec<AbilitySlot>,
    pub stats: Vec<StatValue>,
}

/// Which lookup table a canonical name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Type,
    Ability,
    Stat,
}

impl LookupKind {
    pub fn table(&self) -> &'static str {
        match self {
            LookupKind::Type => "type",
            LookupKind::Ability => "ability",
            LookupKind::Stat => "stat",
        }
    }
}
