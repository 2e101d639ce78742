//! Abilities. Collected like any other attached effect; the holder's
//! switch-in stamps the start ordinal that orders them against items.

use crate::battle::dispatch::EventContext;
use crate::battle::effects::EffectHandlers;
use crate::battle::log::LogEntry;
use crate::battle::pokemon::StatusId;
use crate::battle::state::Battle;
use dex::{BoostList, BoostName, Id, MoveCategory, MoveData, Type};

pub(super) fn handlers(id: &str) -> Option<&'static EffectHandlers> {
    match id {
        "static" => Some(&STATIC),
        "intimidate" => Some(&INTIMIDATE),
        "levitate" => Some(&LEVITATE),
        "technician" => Some(&TECHNICIAN),
        "reckless" => Some(&RECKLESS),
        "adaptability" => Some(&ADAPTABILITY),
        "sturdy" => Some(&STURDY),
        "speedboost" => Some(&SPEED_BOOST),
        "prankster" => Some(&PRANKSTER),
        "clearbody" => Some(&CLEAR_BODY),
        "sandstream" => Some(&SAND_STREAM),
        _ => None,
    }
}

static STATIC: EffectHandlers = EffectHandlers {
    on_damaging_hit: Some(static_damaging_hit),
    ..EffectHandlers::NONE
};

fn static_damaging_hit(battle: &mut Battle, ctx: &EventContext, _damage: u32) {
    let (Some(holder), Some(attacker)) = (ctx.holder_mon(), ctx.source) else {
        return;
    };
    let contact = battle
        .active_move
        .as_ref()
        .map(|mv| mv.data.flags.contact)
        .unwrap_or(false);
    if !contact || battle.mon(attacker).is_fainted() {
        return;
    }
    if battle.prng.chance(3, 10) {
        battle.try_set_status(attacker, Some(holder), StatusId::Paralysis);
    }
}

static INTIMIDATE: EffectHandlers = EffectHandlers {
    on_switch_in: Some(intimidate_switch_in),
    ..EffectHandlers::NONE
};

fn intimidate_switch_in(battle: &mut Battle, ctx: &EventContext) {
    let Some(mon) = ctx.holder_mon() else { return };
    battle.log.push(LogEntry::AbilityActivated {
        name: battle.name_of(mon),
        ability: "Intimidate".to_string(),
    });
    let drop: BoostList = vec![(BoostName::Atk, -1)];
    for foe in battle.active_foes(mon.side) {
        battle.apply_boosts(foe, Some(mon), &drop);
    }
}

static LEVITATE: EffectHandlers = EffectHandlers {
    on_immunity: Some(levitate_immunity),
    ..EffectHandlers::NONE
};

fn levitate_immunity(_battle: &Battle, _ctx: &EventContext, move_type: Type) -> bool {
    move_type != Type::Ground
}

static TECHNICIAN: EffectHandlers = EffectHandlers {
    on_base_power: Some(technician_base_power),
    ..EffectHandlers::NONE
};

fn technician_base_power(_battle: &Battle, _ctx: &EventContext, value: u32) -> Option<u32> {
    if value <= 60 {
        Some(6144)
    } else {
        None
    }
}

static RECKLESS: EffectHandlers = EffectHandlers {
    on_base_power: Some(reckless_base_power),
    ..EffectHandlers::NONE
};

/// Boosts recoil moves. Struggle's recoil is not a move property, so it
/// stays out.
fn reckless_base_power(battle: &Battle, _ctx: &EventContext, _value: u32) -> Option<u32> {
    let recoil = battle
        .active_move
        .as_ref()
        .map(|mv| mv.data.recoil.is_some())
        .unwrap_or(false);
    if recoil {
        Some(4915)
    } else {
        None
    }
}

static ADAPTABILITY: EffectHandlers = EffectHandlers {
    on_modify_stab: Some(adaptability_stab),
    ..EffectHandlers::NONE
};

fn adaptability_stab(_battle: &Battle, _ctx: &EventContext, stab: u32) -> Option<u32> {
    match stab {
        6144 => Some(8192),
        8192 => Some(9216),
        _ => None,
    }
}

static STURDY: EffectHandlers = EffectHandlers {
    on_damage: Some((-30.0, sturdy_damage)),
    ..EffectHandlers::NONE
};

fn sturdy_damage(battle: &mut Battle, ctx: &EventContext, damage: u32) -> Option<u32> {
    let Some(mon) = ctx.holder_mon() else { return None };
    let pokemon = battle.mon(mon);
    let hp = u32::from(pokemon.hp);
    if pokemon.hp == pokemon.max_hp && damage >= hp {
        battle.log.push(LogEntry::AbilityActivated {
            name: battle.name_of(mon),
            ability: "Sturdy".to_string(),
        });
        return Some(hp - 1);
    }
    None
}

static SPEED_BOOST: EffectHandlers = EffectHandlers {
    residual_order: Some(26),
    on_residual: Some(speed_boost_residual),
    ..EffectHandlers::NONE
};

/// No boost on the turn the holder entered mid-turn; `active_turns` only
/// ticks up at turn start.
fn speed_boost_residual(battle: &mut Battle, ctx: &EventContext) {
    let Some(mon) = ctx.holder_mon() else { return };
    if battle.mon(mon).active_turns == 0 {
        return;
    }
    let boost: BoostList = vec![(BoostName::Spe, 1)];
    battle.apply_boosts(mon, None, &boost);
}

static PRANKSTER: EffectHandlers = EffectHandlers {
    on_modify_priority: Some(prankster_priority),
    ..EffectHandlers::NONE
};

fn prankster_priority(
    _battle: &Battle,
    _ctx: &EventContext,
    mv: &MoveData,
    priority: f64,
) -> Option<f64> {
    if mv.category == MoveCategory::Status {
        Some(priority + 1.0)
    } else {
        None
    }
}

static CLEAR_BODY: EffectHandlers = EffectHandlers {
    on_try_boost: Some(clear_body_try_boost),
    ..EffectHandlers::NONE
};

fn clear_body_try_boost(battle: &mut Battle, ctx: &EventContext, boosts: &mut BoostList) {
    let Some(mon) = ctx.holder_mon() else { return };
    if ctx.source.is_none() || ctx.source == Some(mon) {
        return;
    }
    let before = boosts.len();
    boosts.retain(|(_, delta)| *delta >= 0);
    if boosts.len() < before {
        battle.log.push(LogEntry::BoostBlocked {
            target: battle.name_of(mon),
            effect: "Clear Body".to_string(),
        });
    }
}

static SAND_STREAM: EffectHandlers = EffectHandlers {
    on_switch_in: Some(sand_stream_switch_in),
    ..EffectHandlers::NONE
};

fn sand_stream_switch_in(battle: &mut Battle, ctx: &EventContext) {
    let Some(mon) = ctx.holder_mon() else { return };
    if battle.field.is_weather("sandstorm") {
        return;
    }
    battle.log.push(LogEntry::AbilityActivated {
        name: battle.name_of(mon),
        ability: "Sand Stream".to_string(),
    });
    battle.set_weather_id(&Id::new("sandstorm"), Some(mon));
}
