//! Side conditions: screens and entry hazards that belong to a side
//! rather than to any one Pokemon.

use crate::battle::damage::type_modifier;
use crate::battle::dispatch::{EffectHolder, EventContext};
use crate::battle::effects::EffectHandlers;
use crate::battle::state::Battle;
use dex::{MoveCategory, Type};

pub(super) fn handlers(id: &str) -> Option<&'static EffectHandlers> {
    match id {
        "reflect" => Some(&REFLECT),
        "lightscreen" => Some(&LIGHT_SCREEN),
        "stealthrock" => Some(&STEALTH_ROCK),
        "spikes" => Some(&SPIKES),
        _ => None,
    }
}

/// Screens halve damage in singles and cut about a third in doubles,
/// where spread pressure already splits the hit.
fn screen_modifier(battle: &Battle) -> u32 {
    if battle.active_per_side() > 1 {
        2732
    } else {
        2048
    }
}

static REFLECT: EffectHandlers = EffectHandlers {
    residual_order: Some(21),
    on_modify_damage: Some(reflect_damage),
    ..EffectHandlers::NONE
};

fn reflect_damage(battle: &Battle, _ctx: &EventContext, _damage: u32) -> Option<u32> {
    let mv = battle.active_move.as_ref()?;
    if mv.data.category != MoveCategory::Physical || mv.crit {
        return None;
    }
    Some(screen_modifier(battle))
}

static LIGHT_SCREEN: EffectHandlers = EffectHandlers {
    residual_order: Some(21),
    on_modify_damage: Some(light_screen_damage),
    ..EffectHandlers::NONE
};

fn light_screen_damage(battle: &Battle, _ctx: &EventContext, _damage: u32) -> Option<u32> {
    let mv = battle.active_move.as_ref()?;
    if mv.data.category != MoveCategory::Special || mv.crit {
        return None;
    }
    Some(screen_modifier(battle))
}

static STEALTH_ROCK: EffectHandlers = EffectHandlers {
    on_entry_hazard: Some(stealth_rock_entry),
    ..EffectHandlers::NONE
};

/// An eighth of max HP, scaled by how hard Rock hits the arriving types.
fn stealth_rock_entry(battle: &mut Battle, ctx: &EventContext) {
    let Some(mon) = ctx.mon else { return };
    let pokemon = battle.mon(mon);
    let Some(doublings) = type_modifier(Type::Rock, &pokemon.types) else {
        return;
    };
    let max_hp = u32::from(pokemon.max_hp);
    let amount = if doublings >= 0 {
        max_hp * (1u32 << doublings as u32) / 8
    } else {
        max_hp / (8u32 << (-doublings) as u32)
    };
    battle.effect_damage(mon, amount.max(1), Some("Stealth Rock"));
}

static SPIKES: EffectHandlers = EffectHandlers {
    on_entry_hazard: Some(spikes_entry),
    ..EffectHandlers::NONE
};

fn spikes_entry(battle: &mut Battle, ctx: &EventContext) {
    let Some(mon) = ctx.mon else { return };
    if !battle.mon(mon).is_grounded() {
        return;
    }
    let EffectHolder::Side(side) = ctx.holder else { return };
    let layers = battle
        .side(side)
        .conditions
        .get("spikes")
        .map(|state| state.counter.clamp(1, 3))
        .unwrap_or(1);
    let denominator = [8, 6, 4][(layers - 1) as usize];
    let amount = (u32::from(battle.mon(mon).max_hp) / denominator).max(1);
    battle.effect_damage(mon, amount, Some("Spikes"));
}
