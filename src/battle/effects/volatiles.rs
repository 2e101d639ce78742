//! Volatile conditions: transient flags that stack alongside the major
//! status and clear on switch-out.

use crate::battle::dispatch::EventContext;
use crate::battle::effects::EffectHandlers;
use crate::battle::log::LogEntry;
use crate::battle::state::Battle;

/// Base power of the typeless self-hit rolled while confused.
pub const CONFUSION_POWER: u16 = 40;

pub(super) fn handlers(id: &str) -> Option<&'static EffectHandlers> {
    match id {
        "flinch" => Some(&FLINCH),
        "confusion" => Some(&CONFUSION),
        "protect" => Some(&PROTECT),
        "mustrecharge" => Some(&MUST_RECHARGE),
        _ => None,
    }
}

static FLINCH: EffectHandlers = EffectHandlers {
    on_before_move: Some((8.0, flinch_before_move)),
    ..EffectHandlers::NONE
};

fn flinch_before_move(battle: &mut Battle, ctx: &EventContext) -> bool {
    let Some(mon) = ctx.holder_mon() else { return true };
    battle.log.push(LogEntry::Cant {
        name: battle.name_of(mon),
        reason: "flinched".to_string(),
    });
    false
}

static CONFUSION: EffectHandlers = EffectHandlers {
    on_before_move: Some((3.0, confusion_before_move)),
    ..EffectHandlers::NONE
};

/// Counts down on each move attempt, not at end of turn. A third of the
/// attempts while confused turn into a typeless physical self-hit.
fn confusion_before_move(battle: &mut Battle, ctx: &EventContext) -> bool {
    let Some(mon) = ctx.holder_mon() else { return true };
    let remaining = {
        let pokemon = battle.mon_mut(mon);
        let Some(state) = pokemon.volatiles.get_mut(&ctx.effect) else {
            return true;
        };
        state.counter = state.counter.saturating_sub(1);
        state.counter
    };
    if remaining == 0 {
        battle.remove_volatile_from(mon, "confusion");
        return true;
    }
    if battle.prng.chance(33, 100) {
        crate::battle::actions::confusion_self_hit(battle, mon);
        return false;
    }
    true
}

static PROTECT: EffectHandlers = EffectHandlers {
    on_try_hit: Some((3.0, protect_try_hit)),
    ..EffectHandlers::NONE
};

fn protect_try_hit(battle: &mut Battle, ctx: &EventContext) -> Option<()> {
    let mon = ctx.holder_mon()?;
    let (blockable, broken) = battle
        .active_move
        .as_ref()
        .map(|mv| (mv.data.flags.protect, mv.data.breaks_protect))
        .unwrap_or((false, false));
    if broken {
        // Feint-style moves tear the shield down and connect.
        battle.remove_volatile_from(mon, "protect");
        return None;
    }
    if !blockable {
        return None;
    }
    battle.log.push(LogEntry::Protected {
        name: battle.name_of(mon),
    });
    Some(())
}

static MUST_RECHARGE: EffectHandlers = EffectHandlers {
    on_before_move: Some((11.0, recharge_before_move)),
    ..EffectHandlers::NONE
};

fn recharge_before_move(battle: &mut Battle, ctx: &EventContext) -> bool {
    let Some(mon) = ctx.holder_mon() else { return true };
    battle.log.push(LogEntry::Cant {
        name: battle.name_of(mon),
        reason: "must recharge".to_string(),
    });
    battle.remove_volatile_from(mon, "mustrecharge");
    false
}
