//! Battle state: the sides, the field, the queue and the log, plus the
//! mutation helpers every move and effect handler goes through.
//!
//! Anything that changes HP, status, stages or conditions funnels into a
//! method here so the log and the effect bookkeeping stay consistent no
//! matter who triggered the change.

use serde::{Deserialize, Serialize};

use crate::battle::actions::ActiveMove;
use crate::battle::choices::{Decision, RequestState};
use crate::battle::dispatch::{self, EffectHolder, EffectKind, Listener};
use crate::battle::effects::{condition_name, handlers_for, item_name};
use crate::battle::field::Field;
use crate::battle::log::{BattleLog, LogEntry};
use crate::battle::pokemon::{EffectState, MonId, Pokemon, StatusId};
use crate::battle::queue::ActionQueue;
use crate::battle::rng::Prng;
use crate::battle::side::Side;
use dex::{BoostList, Dex, FormatRules, Id, StatName, Type};

/// How a finished battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win(usize),
    Tie,
}

/// The whole battle. Owns every piece of mutable state; the free
/// functions in `actions` and `dispatch` drive it from outside.
#[derive(Debug)]
pub struct Battle {
    pub sides: Vec<Side>,
    pub field: Field,
    pub queue: ActionQueue,
    pub prng: Prng,
    pub log: BattleLog,
    pub dex: Dex,
    /// Set while a move resolves, so effect handlers can inspect it.
    pub active_move: Option<ActiveMove>,
    pub rules: FormatRules,
    pub turn: u32,
    /// What each side is currently being asked for.
    pub requests: Vec<Option<RequestState>>,
    /// Slots a Switch request wants filled, per side.
    pub switch_slots: Vec<Vec<usize>>,
    /// Decisions committed by a side, waiting for the other.
    pub pending: Vec<Option<Vec<Decision>>>,
    pub outcome: Option<Outcome>,
    /// Every accepted submission, in order. With the seed this replays
    /// the battle exactly.
    pub input_log: Vec<(usize, Vec<Decision>)>,
    pub(crate) effect_order: u32,
}

impl Battle {
    pub fn side(&self, side: usize) -> &Side {
        &self.sides[side]
    }

    pub fn side_mut(&mut self, side: usize) -> &mut Side {
        &mut self.sides[side]
    }

    pub fn mon(&self, id: MonId) -> &Pokemon {
        &self.sides[id.side].team[id.poke]
    }

    pub fn mon_mut(&mut self, id: MonId) -> &mut Pokemon {
        &mut self.sides[id.side].team[id.poke]
    }

    pub fn name_of(&self, id: MonId) -> String {
        self.mon(id).name.clone()
    }

    pub fn is_on_field(&self, id: MonId) -> bool {
        self.sides[id.side]
            .active
            .iter()
            .flatten()
            .any(|&poke| poke == id.poke)
    }

    pub fn active_per_side(&self) -> usize {
        self.rules.game_type.active_per_side()
    }

    /// Every Pokemon standing in a slot, fainted occupants included.
    pub fn active_mon_ids(&self) -> Vec<MonId> {
        let mut ids = Vec::new();
        for (side, state) in self.sides.iter().enumerate() {
            for poke in state.active_indices() {
                ids.push(MonId::new(side, poke));
            }
        }
        ids
    }

    /// Living active Pokemon on the side opposing `side`.
    pub fn active_foes(&self, side: usize) -> Vec<MonId> {
        let foe = 1 - side;
        self.sides[foe]
            .active_indices()
            .into_iter()
            .map(|poke| MonId::new(foe, poke))
            .filter(|&id| !self.mon(id).is_fainted())
            .collect()
    }

    /// The living partner in the other slot, if the format has one.
    pub fn ally_of(&self, id: MonId) -> Option<MonId> {
        self.sides[id.side]
            .active_indices()
            .into_iter()
            .filter(|&poke| poke != id.poke)
            .map(|poke| MonId::new(id.side, poke))
            .find(|&ally| !self.mon(ally).is_fainted())
    }

    pub fn ended(&self) -> bool {
        self.outcome.is_some()
    }

    /// True while a side still owes the engine a decision.
    pub fn awaiting_choices(&self) -> bool {
        self.requests.iter().any(Option::is_some)
    }

    /// Hand out the next effect start ordinal. Never reused, never reset.
    pub fn next_effect_order(&mut self) -> u32 {
        self.effect_order += 1;
        self.effect_order
    }

    /// Speed used for action ordering: boosted speed through the stat
    /// hooks, then inverted under Trick Room.
    pub fn action_speed(&self, id: MonId) -> u32 {
        let base = self.mon(id).boosted_stat(StatName::Spe);
        let speed = dispatch::stat_chain(self, id, StatName::Spe, base);
        if self.field.has_pseudo_weather("trickroom") {
            10239u32.saturating_sub(speed) & 0x1FFF
        } else {
            speed
        }
    }

    /// Deal damage attributed to an effect rather than a move's own hit.
    /// Applies, logs, and records the faint. Returns HP actually removed.
    pub fn effect_damage(&mut self, target: MonId, amount: u32, source: Option<&str>) -> u16 {
        if amount == 0 || self.mon(target).is_fainted() {
            return 0;
        }
        let dealt = self
            .mon_mut(target)
            .apply_damage(amount.min(u32::from(u16::MAX)) as u16);
        if dealt == 0 {
            return 0;
        }
        let hp = self.mon(target).hp;
        let max_hp = self.mon(target).max_hp;
        self.log.push(LogEntry::Damage {
            target: self.name_of(target),
            amount: dealt,
            remaining_hp: hp,
            max_hp,
            source: source.map(str::to_string),
        });
        if self.mon(target).is_fainted() {
            self.log.push(LogEntry::Faint {
                name: self.name_of(target),
            });
        }
        dealt
    }

    /// Heal from an effect. Healing nothing (full HP, fainted) stays out
    /// of the log. Returns HP actually restored.
    pub fn effect_heal(&mut self, target: MonId, amount: u32, source: Option<&str>) -> u16 {
        let healed = self
            .mon_mut(target)
            .heal(amount.min(u32::from(u16::MAX)) as u16);
        if healed == 0 {
            return 0;
        }
        let hp = self.mon(target).hp;
        self.log.push(LogEntry::Heal {
            target: self.name_of(target),
            amount: healed,
            new_hp: hp,
            source: source.map(str::to_string),
        });
        healed
    }

    /// Apply stage changes, after giving vetoes a chance to strip entries.
    /// Logs each change, including ones pinned at the cap. Returns whether
    /// any stage actually moved.
    pub fn apply_boosts(
        &mut self,
        target: MonId,
        source: Option<MonId>,
        boosts: &BoostList,
    ) -> bool {
        if self.mon(target).is_fainted() {
            return false;
        }
        let mut list = boosts.clone();
        dispatch::run_try_boost(self, target, source, &mut list);
        let mut moved = false;
        for (stat, delta) in &list {
            if *delta == 0 {
                continue;
            }
            let actual = self.mon_mut(target).boosts.apply(*stat, *delta);
            let stage = self.mon(target).boosts.get(*stat);
            self.log.push(LogEntry::BoostChanged {
                target: self.name_of(target),
                stat: *stat,
                delta: actual,
                stage,
            });
            if actual != 0 {
                moved = true;
            }
        }
        moved
    }

    /// Try to inflict a major status, honoring type immunities and the
    /// set-status vetoes.
    pub fn try_set_status(
        &mut self,
        target: MonId,
        source: Option<MonId>,
        status: StatusId,
    ) -> bool {
        if self.mon(target).is_fainted() || self.mon(target).status.is_some() {
            return false;
        }
        let immune = {
            let mon = self.mon(target);
            match status {
                StatusId::Burn => mon.has_type(Type::Fire),
                StatusId::Paralysis => mon.has_type(Type::Electric),
                StatusId::Poison | StatusId::Toxic => {
                    mon.has_type(Type::Poison) || mon.has_type(Type::Steel)
                }
                StatusId::Freeze => mon.has_type(Type::Ice),
                StatusId::Sleep => false,
            }
        };
        if immune || !dispatch::status_allowed(self, target, source, status) {
            return false;
        }

        let order = self.next_effect_order();
        let mut state = EffectState::new(order);
        state.source = source;
        if status == StatusId::Sleep {
            // One to three acting turns, decided up front.
            state.counter = self.prng.next_between(2, 5);
        }
        self.mon_mut(target).set_status(status, state);
        self.log.push(LogEntry::StatusApplied {
            target: self.name_of(target),
            status,
        });
        true
    }

    pub fn cure_status_of(&mut self, target: MonId) {
        if let Some(cured) = self.mon_mut(target).cure_status() {
            self.log.push(LogEntry::StatusCured {
                target: self.name_of(target),
                status: cured,
            });
        }
    }

    /// Attach a volatile by id, with its standard duration and counter.
    pub fn add_volatile_to(&mut self, target: MonId, id: &str) -> bool {
        if self.mon(target).is_fainted() || self.mon(target).has_volatile(id) {
            return false;
        }
        let order = self.next_effect_order();
        let mut state = EffectState::new(order);
        match id {
            "flinch" | "protect" => state.duration = Some(1),
            "mustrecharge" => state.duration = Some(2),
            "confusion" => state.counter = self.prng.next_between(2, 6),
            _ => {}
        }
        if !self.mon_mut(target).add_volatile(Id::new(id), state) {
            return false;
        }
        match id {
            // Flinch only ever announces itself when it stops a move.
            "flinch" => {}
            "protect" => self.log.push(LogEntry::Protected {
                name: self.name_of(target),
            }),
            _ => self.log.push(LogEntry::VolatileApplied {
                target: self.name_of(target),
                volatile: condition_name(id),
            }),
        }
        true
    }

    pub fn remove_volatile_from(&mut self, target: MonId, id: &str) -> bool {
        if self.mon_mut(target).remove_volatile(id).is_none() {
            return false;
        }
        if !Battle::volatile_end_is_silent(id) {
            self.log.push(LogEntry::VolatileEnded {
                target: self.name_of(target),
                volatile: condition_name(id),
            });
        }
        true
    }

    /// Volatiles whose natural end produces no message of its own.
    pub(crate) fn volatile_end_is_silent(id: &str) -> bool {
        matches!(
            id,
            "protect" | "stall" | "mustrecharge" | "flinch" | "choicelock"
        )
    }

    /// Replace the weather. Fails when that weather is already up.
    pub fn set_weather_id(&mut self, id: &Id, source: Option<MonId>) -> bool {
        let order = self.next_effect_order();
        let mut state = EffectState::new(order).with_duration(5);
        state.source = source;
        if !self.field.set_weather(id.clone(), state) {
            return false;
        }
        self.log.push(LogEntry::WeatherStart {
            weather: condition_name(id.as_str()),
        });
        true
    }

    /// Replace the terrain. Fails when that terrain is already down.
    pub fn set_terrain_id(&mut self, id: &Id, source: Option<MonId>) -> bool {
        let order = self.next_effect_order();
        let mut state = EffectState::new(order).with_duration(5);
        state.source = source;
        if !self.field.set_terrain(id.clone(), state) {
            return false;
        }
        self.log.push(LogEntry::FieldStart {
            effect: condition_name(id.as_str()),
        });
        true
    }

    pub fn add_pseudo_weather_id(&mut self, id: &Id, source: Option<MonId>) -> bool {
        let order = self.next_effect_order();
        let mut state = EffectState::new(order).with_duration(5);
        state.source = source;
        if !self.field.add_pseudo_weather(id.clone(), state) {
            return false;
        }
        self.log.push(LogEntry::FieldStart {
            effect: condition_name(id.as_str()),
        });
        true
    }

    pub fn remove_pseudo_weather_id(&mut self, id: &str) -> bool {
        if self.field.remove_pseudo_weather(id).is_none() {
            return false;
        }
        self.log.push(LogEntry::FieldEnd {
            effect: condition_name(id),
        });
        true
    }

    /// Lay a side condition. Spikes stack to three layers, each layer
    /// logging again; screens get their five turn clock here.
    pub fn add_side_condition(&mut self, side: usize, id: &Id) -> bool {
        if *id == "spikes" {
            if let Some(state) = self.sides[side].conditions.get_mut("spikes") {
                if state.counter >= 3 {
                    return false;
                }
                state.counter += 1;
                self.log.push(LogEntry::SideConditionStart {
                    side,
                    condition: condition_name(id.as_str()),
                });
                return true;
            }
        }
        let order = self.next_effect_order();
        let mut state = EffectState::new(order);
        match id.as_str() {
            "reflect" | "lightscreen" => state.duration = Some(5),
            "spikes" => state.counter = 1,
            _ => {}
        }
        if !self.sides[side].add_condition(id.clone(), state) {
            return false;
        }
        self.log.push(LogEntry::SideConditionStart {
            side,
            condition: condition_name(id.as_str()),
        });
        true
    }

    /// Remove and return the held item, logging the loss.
    pub fn consume_item(&mut self, target: MonId) -> Option<Id> {
        let item = self.mon_mut(target).item.take()?;
        self.log.push(LogEntry::ItemConsumed {
            name: self.name_of(target),
            item: item_name(item.as_str()),
        });
        Some(item)
    }

    /// Pause the turn so `side` can pick a replacement for `slot` before
    /// the remaining actions run.
    pub fn request_midturn_switch(&mut self, side: usize, slot: usize) {
        self.requests[side] = Some(RequestState::Switch);
        if !self.switch_slots[side].contains(&slot) {
            self.switch_slots[side].push(slot);
        }
    }

    /// Put a roster member into a slot: switch-out bookkeeping for the
    /// outgoing Pokemon, entry hazards for the incoming one. Switch-in
    /// ability and item triggers are batched by the caller so
    /// simultaneous entries resolve in speed order.
    pub fn perform_switch(&mut self, side: usize, slot: usize, team_index: usize, dragged: bool) {
        if let Some(out_index) = self.sides[side].active_index(slot) {
            let out = MonId::new(side, out_index);
            if !self.mon(out).is_fainted() {
                self.log.push(LogEntry::SwitchOut {
                    side,
                    name: self.name_of(out),
                });
            }
            self.mon_mut(out).reset_on_switch_out();
        }
        self.sides[side].active[slot] = Some(team_index);

        let incoming = MonId::new(side, team_index);
        let ability_order = self.next_effect_order();
        let item_order = self.next_effect_order();
        {
            let mon = self.mon_mut(incoming);
            mon.ability_order = ability_order;
            mon.item_order = item_order;
        }
        let (level, hp, max_hp) = {
            let mon = self.mon(incoming);
            (mon.level, mon.hp, mon.max_hp)
        };
        self.log.push(LogEntry::SwitchIn {
            side,
            name: self.name_of(incoming),
            level,
            hp,
            max_hp,
            dragged,
        });
        dispatch::run_entry_hazards(self, incoming);
    }

    /// End-of-turn residual phase. Every listener ticks its clock down
    /// first; an effect whose clock runs out ends now and its handler
    /// does not fire this turn.
    pub fn run_residual_phase(&mut self) {
        for listener in dispatch::collect_residuals(self) {
            if !dispatch::is_live(self, &listener) {
                continue;
            }
            if self.tick_residual_duration(&listener) {
                self.end_residual_effect(&listener);
                continue;
            }
            let handlers = handlers_for(listener.effect.as_str());
            if let Some(hook) = handlers.on_residual {
                let ctx = listener.context(listener_mon(&listener), None);
                hook(self, &ctx);
            }
        }
    }

    /// Decrement the listener's remaining duration, if it has one.
    /// Returns true when it just ran out.
    fn tick_residual_duration(&mut self, listener: &Listener) -> bool {
        let Some(state) = self.residual_state_mut(listener) else {
            return false;
        };
        let Some(duration) = state.duration else {
            return false;
        };
        let left = duration.saturating_sub(1);
        state.duration = Some(left);
        left == 0
    }

    fn residual_state_mut(&mut self, listener: &Listener) -> Option<&mut EffectState> {
        match (listener.kind, listener.holder) {
            (EffectKind::Status, EffectHolder::Mon(mon)) => {
                Some(&mut self.sides[mon.side].team[mon.poke].status_state)
            }
            (EffectKind::Volatile, EffectHolder::Mon(mon)) => self.sides[mon.side].team[mon.poke]
                .volatiles
                .get_mut(&listener.effect),
            (EffectKind::SideCondition, EffectHolder::Side(side)) => {
                self.sides[side].conditions.get_mut(&listener.effect)
            }
            (EffectKind::Weather, EffectHolder::Field) => Some(&mut self.field.weather_state),
            (EffectKind::Terrain, EffectHolder::Field) => Some(&mut self.field.terrain_state),
            (EffectKind::PseudoWeather, EffectHolder::Field) => {
                self.field.pseudo_weather.get_mut(&listener.effect)
            }
            _ => None,
        }
    }

    fn end_residual_effect(&mut self, listener: &Listener) {
        let id = listener.effect.as_str();
        match (listener.kind, listener.holder) {
            (EffectKind::Volatile, EffectHolder::Mon(mon)) => {
                self.remove_volatile_from(mon, id);
            }
            (EffectKind::Status, EffectHolder::Mon(mon)) => {
                self.cure_status_of(mon);
            }
            (EffectKind::SideCondition, EffectHolder::Side(side)) => {
                self.sides[side].remove_condition(id);
                self.log.push(LogEntry::SideConditionEnd {
                    side,
                    condition: condition_name(id),
                });
            }
            (EffectKind::Weather, EffectHolder::Field) => {
                self.field.clear_weather();
                self.log.push(LogEntry::WeatherEnd {
                    weather: condition_name(id),
                });
            }
            (EffectKind::Terrain, EffectHolder::Field)
            | (EffectKind::PseudoWeather, EffectHolder::Field) => {
                if listener.kind == EffectKind::Terrain {
                    self.field.clear_terrain();
                } else {
                    self.field.remove_pseudo_weather(id);
                }
                self.log.push(LogEntry::FieldEnd {
                    effect: condition_name(id),
                });
            }
            _ => {}
        }
    }
}

fn listener_mon(listener: &Listener) -> Option<MonId> {
    match listener.holder {
        EffectHolder::Mon(mon) => Some(mon),
        _ => None,
    }
}
