//! Major status conditions. Exactly one may occupy a Pokemon's status
//! slot; volatiles live elsewhere.

use crate::battle::dispatch::EventContext;
use crate::battle::effects::EffectHandlers;
use crate::battle::log::LogEntry;
use crate::battle::state::Battle;

pub(super) fn handlers(id: &str) -> Option<&'static EffectHandlers> {
    match id {
        "brn" => Some(&BURN),
        "par" => Some(&PARALYSIS),
        "slp" => Some(&SLEEP),
        "frz" => Some(&FREEZE),
        "psn" => Some(&POISON),
        "tox" => Some(&TOXIC),
        _ => None,
    }
}

static BURN: EffectHandlers = EffectHandlers {
    residual_order: Some(10),
    on_residual: Some(burn_residual),
    ..EffectHandlers::NONE
};

fn burn_residual(battle: &mut Battle, ctx: &EventContext) {
    let Some(mon) = ctx.holder_mon() else { return };
    let amount = u32::from(battle.mon(mon).max_hp / 16).max(1);
    battle.effect_damage(mon, amount, Some("its burn"));
}

static PARALYSIS: EffectHandlers = EffectHandlers {
    on_modify_spe: Some(paralysis_speed),
    on_before_move: Some((1.0, paralysis_before_move)),
    ..EffectHandlers::NONE
};

fn paralysis_speed(_battle: &Battle, _ctx: &EventContext, _speed: u32) -> Option<u32> {
    Some(2048)
}

fn paralysis_before_move(battle: &mut Battle, ctx: &EventContext) -> bool {
    let Some(mon) = ctx.holder_mon() else { return true };
    if battle.prng.chance(1, 4) {
        battle.log.push(LogEntry::Cant {
            name: battle.name_of(mon),
            reason: "fully paralyzed".to_string(),
        });
        return false;
    }
    true
}

static SLEEP: EffectHandlers = EffectHandlers {
    on_before_move: Some((10.0, sleep_before_move)),
    ..EffectHandlers::NONE
};

fn sleep_before_move(battle: &mut Battle, ctx: &EventContext) -> bool {
    let Some(mon) = ctx.holder_mon() else { return true };
    let state = &mut battle.mon_mut(mon).status_state;
    state.counter = state.counter.saturating_sub(1);
    if state.counter == 0 {
        battle.cure_status_of(mon);
        return true;
    }
    battle.log.push(LogEntry::Cant {
        name: battle.name_of(mon),
        reason: "fast asleep".to_string(),
    });
    false
}

static FREEZE: EffectHandlers = EffectHandlers {
    on_before_move: Some((10.0, freeze_before_move)),
    ..EffectHandlers::NONE
};

fn freeze_before_move(battle: &mut Battle, ctx: &EventContext) -> bool {
    let Some(mon) = ctx.holder_mon() else { return true };
    if battle.prng.chance(1, 5) {
        battle.cure_status_of(mon);
        return true;
    }
    battle.log.push(LogEntry::Cant {
        name: battle.name_of(mon),
        reason: "frozen solid".to_string(),
    });
    false
}

static POISON: EffectHandlers = EffectHandlers {
    residual_order: Some(9),
    on_residual: Some(poison_residual),
    ..EffectHandlers::NONE
};

fn poison_residual(battle: &mut Battle, ctx: &EventContext) {
    let Some(mon) = ctx.holder_mon() else { return };
    let amount = u32::from(battle.mon(mon).max_hp / 8).max(1);
    battle.effect_damage(mon, amount, Some("poison"));
}

static TOXIC: EffectHandlers = EffectHandlers {
    residual_order: Some(9),
    on_residual: Some(toxic_residual),
    ..EffectHandlers::NONE
};

/// Damage climbs by one sixteenth of max HP each turn on the field. The
/// counter resets when the holder switches out.
fn toxic_residual(battle: &mut Battle, ctx: &EventContext) {
    let Some(mon) = ctx.holder_mon() else { return };
    let pokemon = battle.mon_mut(mon);
    pokemon.status_state.counter += 1;
    let stage = pokemon.status_state.counter;
    let amount = (u32::from(pokemon.max_hp) * stage / 16).max(1);
    battle.effect_damage(mon, amount, Some("poison"));
}
