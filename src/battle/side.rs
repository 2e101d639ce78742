use crate::battle::pokemon::{EffectState, Pokemon};
use dex::Id;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One player's half of the battle: the roster, which roster members are
/// on the field, side conditions, and the once-per-battle mechanic flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Side {
    pub name: String,
    pub team: Vec<Pokemon>,
    /// Field slots; each holds a roster index while occupied. Singles has
    /// one slot, doubles two.
    pub active: Vec<Option<usize>>,
    pub conditions: BTreeMap<Id, EffectState>,
    pub mega_used: bool,
    pub z_used: bool,
    pub tera_used: bool,
}

impl Side {
    pub fn new(name: String, team: Vec<Pokemon>, slots: usize) -> Side {
        Side {
            name,
            team,
            active: vec![None; slots],
            conditions: BTreeMap::new(),
            mega_used: false,
            z_used: false,
            tera_used: false,
        }
    }

    pub fn active_index(&self, slot: usize) -> Option<usize> {
        self.active.get(slot).copied().flatten()
    }

    pub fn active_pokemon(&self, slot: usize) -> Option<&Pokemon> {
        self.active_index(slot).and_then(|i| self.team.get(i))
    }

    /// Roster indices currently on the field.
    pub fn active_indices(&self) -> Vec<usize> {
        self.active.iter().filter_map(|slot| *slot).collect()
    }

    /// The field slot a roster member occupies, if it is out.
    pub fn slot_of(&self, poke: usize) -> Option<usize> {
        self.active.iter().position(|slot| *slot == Some(poke))
    }

    pub fn is_active(&self, poke: usize) -> bool {
        self.slot_of(poke).is_some()
    }

    /// Bench members that could still be sent out.
    pub fn switchable(&self) -> Vec<usize> {
        (0..self.team.len())
            .filter(|&i| !self.team[i].is_fainted() && !self.is_active(i))
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.team.iter().filter(|p| !p.is_fainted()).count()
    }

    pub fn all_fainted(&self) -> bool {
        self.remaining() == 0
    }

    pub fn has_condition(&self, id: &str) -> bool {
        self.conditions.contains_key(id)
    }

    pub fn add_condition(&mut self, id: Id, state: EffectState) -> bool {
        if self.conditions.contains_key(&id) {
            return false;
        }
        self.conditions.insert(id, state);
        true
    }

    pub fn remove_condition(&mut self, id: &str) -> Option<EffectState> {
        self.conditions.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pokemon::PokemonSet;
    use dex::Dex;
    use pretty_assertions::assert_eq;

    fn side_of(dex: &Dex, names: &[&str]) -> Side {
        let team = names
            .iter()
            .map(|n| Pokemon::from_set(&PokemonSet::new(n, 50, &["Tackle"]), dex).unwrap())
            .collect();
        Side::new("Player 1".to_string(), team, 1)
    }

    #[test]
    fn tracks_active_slots_and_bench() {
        let dex = Dex::gen9();
        let mut side = side_of(&dex, &["Pikachu", "Snorlax", "Garchomp"]);
        assert_eq!(side.active_index(0), None);
        side.active[0] = Some(1);
        assert_eq!(side.active_pokemon(0).unwrap().name, "Snorlax");
        assert_eq!(side.slot_of(1), Some(0));
        assert_eq!(side.switchable(), vec![0, 2]);
    }

    #[test]
    fn counts_remaining_team_members() {
        let dex = Dex::gen9();
        let mut side = side_of(&dex, &["Pikachu", "Snorlax"]);
        assert_eq!(side.remaining(), 2);
        side.team[0].apply_damage(9999);
        assert_eq!(side.remaining(), 1);
        assert!(!side.all_fainted());
        side.team[1].apply_damage(9999);
        assert!(side.all_fainted());
    }

    #[test]
    fn side_conditions_do_not_stack_by_insert() {
        let dex = Dex::gen9();
        let mut side = side_of(&dex, &["Pikachu"]);
        assert!(side.add_condition(Id::new("reflect"), EffectState::new(1).with_duration(5)));
        assert!(!side.add_condition(Id::new("reflect"), EffectState::new(2).with_duration(5)));
        assert!(side.has_condition("reflect"));
        assert!(side.remove_condition("reflect").is_some());
        assert!(!side.has_condition("reflect"));
    }
}
