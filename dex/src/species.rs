use crate::ids::Id;
use crate::types::Type;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The six permanent stats.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum StatName {
    Hp,
    Atk,
    Def,
    SpA,
    SpD,
    Spe,
}

/// The seven boostable stages: the five non-HP stats plus the two
/// accuracy-side stages.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum BoostName {
    Atk,
    Def,
    SpA,
    SpD,
    Spe,
    Accuracy,
    Evasion,
}

/// One value per permanent stat. Used for base stats, EV and IV spreads,
/// and computed battle stats alike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsTable {
    #[serde(default)]
    pub hp: u16,
    #[serde(default)]
    pub atk: u16,
    #[serde(default)]
    pub def: u16,
    #[serde(default)]
    pub spa: u16,
    #[serde(default)]
    pub spd: u16,
    #[serde(default)]
    pub spe: u16,
}

impl StatsTable {
    pub fn uniform(value: u16) -> StatsTable {
        StatsTable {
            hp: value,
            atk: value,
            def: value,
            spa: value,
            spd: value,
            spe: value,
        }
    }

    pub fn get(&self, stat: StatName) -> u16 {
        match stat {
            StatName::Hp => self.hp,
            StatName::Atk => self.atk,
            StatName::Def => self.def,
            StatName::SpA => self.spa,
            StatName::SpD => self.spd,
            StatName::Spe => self.spe,
        }
    }

    pub fn set(&mut self, stat: StatName, value: u16) {
        match stat {
            StatName::Hp => self.hp = value,
            StatName::Atk => self.atk = value,
            StatName::Def => self.def = value,
            StatName::SpA => self.spa = value,
            StatName::SpD => self.spd = value,
            StatName::Spe => self.spe = value,
        }
    }
}

/// Static species record. Mega formes are their own entries linked back to
/// the base species through `base_species` + `required_item`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesData {
    pub name: String,
    pub num: u16,
    pub types: Vec<Type>,
    pub base_stats: StatsTable,
    #[serde(default)]
    pub abilities: Vec<Id>,
    #[serde(default)]
    pub base_species: Option<Id>,
    #[serde(default)]
    pub required_item: Option<Id>,
}

impl SpeciesData {
    pub fn has_type(&self, t: Type) -> bool {
        self.types.contains(&t)
    }
}
