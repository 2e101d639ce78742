// Dex - the read-only data collaborator for the battle engine.
//
// Species records, move records, the type chart, format rules, and the
// one-time-mechanic tables (Z-crystals, mega formes, Z-/Max-move names)
// live here. The engine receives a Dex at battle construction and never
// mutates it.

pub use formats::{FormatRules, GameType};
pub use ids::{to_id, Id};
pub use moves::{
    BoostList, MoveCategory, MoveData, MoveFlags, MoveTarget, MultiHit, SecondaryEffect,
};
pub use species::{BoostName, SpeciesData, StatName, StatsTable};
pub use tables::{max_move_name, z_crystal_type, z_move_name, z_move_power, MAX_GUARD};
pub use types::{type_effectiveness, Effectiveness, Type};

pub mod formats;
pub mod ids;
pub mod moves;
pub mod species;
pub mod tables;
pub mod types;

use std::collections::HashMap;

/// Immutable lookup tables, parsed once from the embedded data documents.
#[derive(Debug, Clone)]
pub struct Dex {
    species: HashMap<Id, SpeciesData>,
    moves: HashMap<Id, MoveData>,
}

impl Dex {
    /// The shipped generation-9 data set.
    ///
    /// The embedded documents are part of the crate; failing to parse them
    /// is a build defect, not a runtime condition.
    pub fn gen9() -> Dex {
        let species = ron::from_str(include_str!("../data/species.ron"))
            .expect("species.ron: malformed embedded data");
        let moves = ron::from_str(include_str!("../data/moves.ron"))
            .expect("moves.ron: malformed embedded data");
        Dex { species, moves }
    }

    pub fn species_data(&self, id: &Id) -> Option<&SpeciesData> {
        self.species.get(id)
    }

    pub fn move_data(&self, id: &Id) -> Option<&MoveData> {
        self.moves.get(id)
    }

    /// The mega forme `species` changes into while holding `item`, if any.
    pub fn mega_forme(&self, species: &Id, item: &Id) -> Option<(Id, &SpeciesData)> {
        self.species.iter().find_map(|(forme_id, data)| {
            let base = data.base_species.as_ref()?;
            let required = data.required_item.as_ref()?;
            (base == species && required == item).then(|| (forme_id.clone(), data))
        })
    }

    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_data_parses() {
        let dex = Dex::gen9();
        assert!(dex.species_count() >= 15);
        assert!(dex.move_count() >= 40);
    }

    #[test]
    fn species_lookup() {
        let dex = Dex::gen9();
        let pikachu = dex.species_data(&Id::new("Pikachu")).unwrap();
        assert_eq!(pikachu.name, "Pikachu");
        assert_eq!(pikachu.base_stats.spe, 90);
        assert_eq!(pikachu.types, vec![Type::Electric]);
    }

    #[test]
    fn move_lookup() {
        let dex = Dex::gen9();
        let eq = dex.move_data(&Id::new("Earthquake")).unwrap();
        assert_eq!(eq.base_power, 100);
        assert_eq!(eq.move_type, Type::Ground);
        assert_eq!(eq.target, MoveTarget::AllAdjacent);

        let sd = dex.move_data(&Id::new("Swords Dance")).unwrap();
        assert_eq!(sd.category, MoveCategory::Status);
        assert_eq!(sd.target, MoveTarget::User);
    }

    #[test]
    fn mega_formes_resolve_through_items() {
        let dex = Dex::gen9();
        let (forme_id, forme) = dex
            .mega_forme(&Id::new("gengar"), &Id::new("gengarite"))
            .unwrap();
        assert_eq!(forme_id, "gengarmega");
        assert_eq!(forme.base_stats.spa, 170);
        assert!(dex
            .mega_forme(&Id::new("gengar"), &Id::new("leftovers"))
            .is_none());
    }
}
