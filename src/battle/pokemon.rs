use crate::pokemon::{calc_hp, calc_stat, PokemonSet};
use dex::{BoostName, Dex, Id, StatName, StatsTable, Type};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stable reference to one team slot: side index plus roster index.
///
/// Rosters are settled once the leads go out (team preview is the only
/// thing that reorders them), so a `MonId` taken during play stays valid
/// across switches and faints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonId {
    pub side: usize,
    pub poke: usize,
}

impl MonId {
    pub fn new(side: usize, poke: usize) -> MonId {
        MonId { side, poke }
    }
}

impl fmt::Display for MonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}#{}", self.side + 1, self.poke)
    }
}

/// The six major status conditions. At most one at a time per Pokemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusId {
    Burn,
    Paralysis,
    Sleep,
    Freeze,
    Poison,
    Toxic,
}

impl StatusId {
    /// Handler-registry key for this status.
    pub fn id(&self) -> &'static str {
        match self {
            StatusId::Burn => "brn",
            StatusId::Paralysis => "par",
            StatusId::Sleep => "slp",
            StatusId::Freeze => "frz",
            StatusId::Poison => "psn",
            StatusId::Toxic => "tox",
        }
    }

    pub fn from_id(id: &str) -> Option<StatusId> {
        match id {
            "brn" => Some(StatusId::Burn),
            "par" => Some(StatusId::Paralysis),
            "slp" => Some(StatusId::Sleep),
            "frz" => Some(StatusId::Freeze),
            "psn" => Some(StatusId::Poison),
            "tox" => Some(StatusId::Toxic),
            _ => None,
        }
    }
}

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StatusId::Burn => "burn",
            StatusId::Paralysis => "paralysis",
            StatusId::Sleep => "sleep",
            StatusId::Freeze => "freeze",
            StatusId::Poison => "poison",
            StatusId::Toxic => "bad poison",
        };
        write!(f, "{}", text)
    }
}

/// Per-instance bookkeeping shared by every attached effect: statuses,
/// volatiles, side conditions, weather, terrain and pseudo-weather all carry
/// one of these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectState {
    /// Remaining turns, when the effect times out on its own. Decremented
    /// during the residual phase; the effect ends when it reaches zero.
    pub duration: Option<u8>,
    /// Free counter: toxic stage, protect stall streak, spikes layers.
    pub counter: u32,
    /// Who created the effect, when that matters later.
    pub source: Option<MonId>,
    /// Move tied to this effect, e.g. the move a choice item locked in.
    pub linked_move: Option<Id>,
    /// Global start ordinal; the final tiebreak when effects collide.
    pub effect_order: u32,
}

impl EffectState {
    pub fn new(effect_order: u32) -> EffectState {
        EffectState {
            effect_order,
            ..EffectState::default()
        }
    }

    pub fn with_duration(mut self, turns: u8) -> EffectState {
        self.duration = Some(turns);
        self
    }

    pub fn with_source(mut self, source: MonId) -> EffectState {
        self.source = Some(source);
        self
    }

    pub fn with_counter(mut self, counter: u32) -> EffectState {
        self.counter = counter;
        self
    }
}

/// Stat stages, clamped to [-6, +6].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostTable {
    pub atk: i8,
    pub def: i8,
    pub spa: i8,
    pub spd: i8,
    pub spe: i8,
    pub accuracy: i8,
    pub evasion: i8,
}

impl BoostTable {
    pub fn get(&self, stat: BoostName) -> i8 {
        match stat {
            BoostName::Atk => self.atk,
            BoostName::Def => self.def,
            BoostName::SpA => self.spa,
            BoostName::SpD => self.spd,
            BoostName::Spe => self.spe,
            BoostName::Accuracy => self.accuracy,
            BoostName::Evasion => self.evasion,
        }
    }

    pub fn set(&mut self, stat: BoostName, stage: i8) {
        let stage = stage.clamp(-6, 6);
        match stat {
            BoostName::Atk => self.atk = stage,
            BoostName::Def => self.def = stage,
            BoostName::SpA => self.spa = stage,
            BoostName::SpD => self.spd = stage,
            BoostName::Spe => self.spe = stage,
            BoostName::Accuracy => self.accuracy = stage,
            BoostName::Evasion => self.evasion = stage,
        }
    }

    /// Apply a stage change and report how far the stage actually moved.
    pub fn apply(&mut self, stat: BoostName, delta: i8) -> i8 {
        let before = self.get(stat);
        self.set(stat, before.saturating_add(delta));
        self.get(stat) - before
    }
}

/// Multiplier for a boosted stat stage, as numerator and denominator.
/// Positive stages scale by (2 + stage) / 2, negative by 2 / (2 - stage).
pub fn stat_stage_fraction(stage: i8) -> (u32, u32) {
    if stage >= 0 {
        ((2 + stage) as u32, 2)
    } else {
        (2, (2 - stage) as u32)
    }
}

/// Accuracy and evasion use a 3-based table instead of the 2-based one.
pub fn acc_stage_fraction(stage: i8) -> (u32, u32) {
    if stage >= 0 {
        ((3 + stage) as u32, 3)
    } else {
        (3, (3 - stage) as u32)
    }
}

/// One of up to four learned moves, with its remaining PP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSlot {
    pub id: Id,
    pub pp: u8,
    pub max_pp: u8,
    pub disabled: bool,
}

impl MoveSlot {
    pub fn new(id: Id, pp: u8) -> MoveSlot {
        MoveSlot {
            id,
            pp,
            max_pp: pp,
            disabled: false,
        }
    }

    pub fn usable(&self) -> bool {
        self.pp > 0 && !self.disabled
    }

    pub fn deduct_pp(&mut self, amount: u8) {
        self.pp = self.pp.saturating_sub(amount);
    }
}

/// A Pokemon as it exists inside a battle: computed stats, current HP,
/// status, stages and attached volatile effects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pokemon {
    pub name: String,
    pub species: Id,
    pub level: u8,
    /// Current defensive typing. Replaced wholesale by terastallization.
    pub types: Vec<Type>,
    /// Typing from the species record, kept for the tera STAB rule.
    pub base_types: Vec<Type>,
    pub stats: StatsTable,
    pub ivs: StatsTable,
    pub evs: StatsTable,
    pub hp: u16,
    pub max_hp: u16,
    pub fainted: bool,
    pub status: Option<StatusId>,
    pub status_state: EffectState,
    pub volatiles: BTreeMap<Id, EffectState>,
    pub boosts: BoostTable,
    pub moves: Vec<MoveSlot>,
    pub ability: Id,
    pub item: Option<Id>,
    /// Start ordinals stamped at switch-in so ability and item listeners
    /// tie-break like any other effect.
    pub ability_order: u32,
    pub item_order: u32,
    pub tera_type: Option<Type>,
    pub terastallized: Option<Type>,
    pub is_mega: bool,
    /// Turns spent on the field since the last switch-in.
    pub active_turns: u32,
}

impl Pokemon {
    pub fn from_set(set: &PokemonSet, dex: &Dex) -> Result<Pokemon, crate::errors::BattleInitError> {
        set.validate(dex)?;
        let species = dex
            .species_data(&set.species)
            .ok_or_else(|| crate::errors::BattleInitError::UnknownSpecies(set.species.clone()))?;

        let mut stats = StatsTable::default();
        for stat in [
            StatName::Atk,
            StatName::Def,
            StatName::SpA,
            StatName::SpD,
            StatName::Spe,
        ] {
            stats.set(
                stat,
                calc_stat(
                    species.base_stats.get(stat),
                    set.ivs.get(stat),
                    set.evs.get(stat),
                    set.level,
                ),
            );
        }
        let max_hp = calc_hp(
            species.base_stats.hp,
            set.ivs.hp,
            set.evs.hp,
            set.level,
        );
        stats.hp = max_hp;

        let ability = set
            .ability
            .clone()
            .or_else(|| species.abilities.first().cloned())
            .unwrap_or_else(|| Id::new(""));

        let moves = set
            .moves
            .iter()
            .map(|id| {
                // Checked by validate above.
                let data = dex.move_data(id).ok_or_else(|| {
                    crate::errors::BattleInitError::UnknownMove(id.clone())
                })?;
                Ok(MoveSlot::new(id.clone(), data.pp))
            })
            .collect::<Result<Vec<MoveSlot>, crate::errors::BattleInitError>>()?;

        Ok(Pokemon {
            name: set.display_name(dex),
            species: set.species.clone(),
            level: set.level,
            types: species.types.clone(),
            base_types: species.types.clone(),
            stats,
            ivs: set.ivs,
            evs: set.evs,
            hp: max_hp,
            max_hp,
            fainted: false,
            status: None,
            status_state: EffectState::default(),
            volatiles: BTreeMap::new(),
            boosts: BoostTable::default(),
            moves,
            ability,
            item: set.item.clone(),
            ability_order: 0,
            item_order: 0,
            tera_type: set.tera_type,
            terastallized: None,
            is_mega: false,
            active_turns: 0,
        })
    }

    pub fn is_fainted(&self) -> bool {
        self.fainted
    }

    /// Raw computed stat, before stages or effects.
    pub fn stat(&self, stat: StatName) -> u32 {
        u32::from(self.stats.get(stat))
    }

    /// Stat after its current stage multiplier.
    pub fn boosted_stat(&self, stat: StatName) -> u32 {
        let boost = match stat {
            StatName::Hp => return self.stat(stat),
            StatName::Atk => self.boosts.atk,
            StatName::Def => self.boosts.def,
            StatName::SpA => self.boosts.spa,
            StatName::SpD => self.boosts.spd,
            StatName::Spe => self.boosts.spe,
        };
        self.stat_with_stage(stat, boost)
    }

    /// Stat under an explicit stage, for the paths that ignore stored
    /// stages (critical hits clamp them).
    pub fn stat_with_stage(&self, stat: StatName, stage: i8) -> u32 {
        let (num, den) = stat_stage_fraction(stage);
        self.stat(stat) * num / den
    }

    /// Subtract HP, reporting the amount actually lost. Faints at zero.
    pub fn apply_damage(&mut self, amount: u16) -> u16 {
        let dealt = amount.min(self.hp);
        self.hp -= dealt;
        if self.hp == 0 {
            self.fainted = true;
        }
        dealt
    }

    /// Restore HP up to the cap, reporting the amount actually gained.
    pub fn heal(&mut self, amount: u16) -> u16 {
        if self.fainted {
            return 0;
        }
        let healed = amount.min(self.max_hp - self.hp);
        self.hp += healed;
        healed
    }

    pub fn has_type(&self, t: Type) -> bool {
        self.types.contains(&t)
    }

    /// Grounded unless Flying-typed or held aloft by Levitate.
    pub fn is_grounded(&self) -> bool {
        !self.has_type(Type::Flying) && self.ability != *"levitate"
    }

    pub fn set_status(&mut self, status: StatusId, state: EffectState) -> bool {
        if self.status.is_some() || self.fainted {
            return false;
        }
        self.status = Some(status);
        self.status_state = state;
        true
    }

    pub fn cure_status(&mut self) -> Option<StatusId> {
        let cured = self.status.take();
        if cured.is_some() {
            self.status_state = EffectState::default();
        }
        cured
    }

    pub fn has_volatile(&self, id: &str) -> bool {
        self.volatiles.contains_key(id)
    }

    pub fn add_volatile(&mut self, id: Id, state: EffectState) -> bool {
        if self.fainted || self.volatiles.contains_key(&id) {
            return false;
        }
        self.volatiles.insert(id, state);
        true
    }

    pub fn remove_volatile(&mut self, id: &str) -> Option<EffectState> {
        self.volatiles.remove(id)
    }

    pub fn move_slot(&self, id: &str) -> Option<&MoveSlot> {
        self.moves.iter().find(|slot| slot.id == *id)
    }

    pub fn move_slot_mut(&mut self, id: &str) -> Option<&mut MoveSlot> {
        self.moves.iter_mut().find(|slot| slot.id == *id)
    }

    pub fn has_usable_move(&self) -> bool {
        self.moves.iter().any(|slot| slot.usable())
    }

    /// Everything a Pokemon sheds when it leaves the field. Toxic damage
    /// restarts from stage one the next time it comes in.
    pub fn reset_on_switch_out(&mut self) {
        self.boosts = BoostTable::default();
        self.volatiles.clear();
        self.active_turns = 0;
        if self.status == Some(StatusId::Toxic) {
            self.status_state.counter = 0;
        }
    }

    /// Replace current typing with the tera type. One way, for the rest of
    /// the battle.
    pub fn terastallize(&mut self, tera: Type) {
        self.types = vec![tera];
        self.terastallized = Some(tera);
    }

    /// Swap in the mega forme's types, ability and non-HP stats. Current
    /// and max HP are untouched.
    pub fn mega_evolve(&mut self, dex: &Dex) -> Option<Id> {
        if self.is_mega {
            return None;
        }
        let item = self.item.as_ref()?;
        let (forme_id, forme) = dex.mega_forme(&self.species, item)?;
        for stat in [
            StatName::Atk,
            StatName::Def,
            StatName::SpA,
            StatName::SpD,
            StatName::Spe,
        ] {
            self.stats.set(
                stat,
                calc_stat(
                    forme.base_stats.get(stat),
                    self.ivs.get(stat),
                    self.evs.get(stat),
                    self.level,
                ),
            );
        }
        if self.terastallized.is_none() {
            self.types = forme.types.clone();
        }
        self.base_types = forme.types.clone();
        self.ability = forme.abilities.first().cloned().unwrap_or_else(|| Id::new(""));
        self.species = forme_id.clone();
        self.is_mega = true;
        Some(forme_id)
    }
}
