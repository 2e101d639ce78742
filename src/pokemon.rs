use crate::errors::BattleInitError;
use dex::{Dex, Id, StatsTable, Type};
use serde::{Deserialize, Serialize};

/// A team member as the player builds it, before any battle state exists.
///
/// Sets are plain data so they can be read from JSON or built in code. All
/// referenced ids are validated against the dex when a battle is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonSet {
    /// Nickname; the species display name is used when absent.
    #[serde(default)]
    pub name: Option<String>,
    pub species: Id,
    #[serde(default = "default_level")]
    pub level: u8,
    /// Defaults to the species' first listed ability.
    #[serde(default)]
    pub ability: Option<Id>,
    #[serde(default)]
    pub item: Option<Id>,
    pub moves: Vec<Id>,
    #[serde(default = "default_ivs")]
    pub ivs: StatsTable,
    #[serde(default)]
    pub evs: StatsTable,
    /// Tera type this set may terastallize into, when the format allows it.
    #[serde(default)]
    pub tera_type: Option<Type>,
}

fn default_level() -> u8 {
    100
}

fn default_ivs() -> StatsTable {
    StatsTable::uniform(31)
}

impl PokemonSet {
    pub fn new(species: &str, level: u8, moves: &[&str]) -> PokemonSet {
        PokemonSet {
            name: None,
            species: Id::new(species),
            level,
            ability: None,
            item: None,
            moves: moves.iter().map(|m| Id::new(m)).collect(),
            ivs: default_ivs(),
            evs: StatsTable::default(),
            tera_type: None,
        }
    }

    pub fn with_item(mut self, item: &str) -> PokemonSet {
        self.item = Some(Id::new(item));
        self
    }

    pub fn with_ability(mut self, ability: &str) -> PokemonSet {
        self.ability = Some(Id::new(ability));
        self
    }

    pub fn with_tera(mut self, tera_type: Type) -> PokemonSet {
        self.tera_type = Some(tera_type);
        self
    }

    /// Check every id against the dex before the set can enter a battle.
    pub fn validate(&self, dex: &Dex) -> Result<(), BattleInitError> {
        if dex.species_data(&self.species).is_none() {
            return Err(BattleInitError::UnknownSpecies(self.species.clone()));
        }
        for move_id in &self.moves {
            if dex.move_data(move_id).is_none() {
                return Err(BattleInitError::UnknownMove(move_id.clone()));
            }
        }
        Ok(())
    }

    pub fn display_name(&self, dex: &Dex) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        dex.species_data(&self.species)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| self.species.as_str().to_string())
    }
}

/// Gen 3+ stat formula without natures. HP uses its own variant below.
pub fn calc_stat(base: u16, iv: u16, ev: u16, level: u8) -> u16 {
    let inner = 2 * u32::from(base) + u32::from(iv.min(31)) + u32::from(ev.min(255)) / 4;
    (inner * u32::from(level) / 100 + 5) as u16
}

pub fn calc_hp(base: u16, iv: u16, ev: u16, level: u8) -> u16 {
    let inner = 2 * u32::from(base) + u32::from(iv.min(31)) + u32::from(ev.min(255)) / 4;
    (inner * u32::from(level) / 100 + u32::from(level) + 10) as u16
}
