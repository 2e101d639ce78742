//! Held items. An item leaves the registry's reach when consumed or
//! knocked away, since `is_live` re-checks the holder's item slot.

use crate::battle::dispatch::EventContext;
use crate::battle::effects::EffectHandlers;
use crate::battle::log::LogEntry;
use crate::battle::state::Battle;

pub(super) fn handlers(id: &str) -> Option<&'static EffectHandlers> {
    match id {
        "leftovers" => Some(&LEFTOVERS),
        "lifeorb" => Some(&LIFE_ORB),
        "choiceband" => Some(&CHOICE_BAND),
        "choicescarf" => Some(&CHOICE_SCARF),
        "focussash" => Some(&FOCUS_SASH),
        "quickclaw" => Some(&QUICK_CLAW),
        _ => None,
    }
}

/// Display name for an item id. Items are not dex documents, so the
/// handful the engine knows are mapped here; unknown ids pass through.
pub(crate) fn item_name(id: &str) -> String {
    match id {
        "leftovers" => "Leftovers".to_string(),
        "lifeorb" => "Life Orb".to_string(),
        "choiceband" => "Choice Band".to_string(),
        "choicescarf" => "Choice Scarf".to_string(),
        "focussash" => "Focus Sash".to_string(),
        "quickclaw" => "Quick Claw".to_string(),
        other => other.to_string(),
    }
}

static LEFTOVERS: EffectHandlers = EffectHandlers {
    residual_order: Some(5),
    residual_sub_order: 4,
    on_residual: Some(leftovers_residual),
    ..EffectHandlers::NONE
};

fn leftovers_residual(battle: &mut Battle, ctx: &EventContext) {
    let Some(mon) = ctx.holder_mon() else { return };
    let pokemon = battle.mon(mon);
    if pokemon.hp >= pokemon.max_hp {
        return;
    }
    let amount = u32::from(pokemon.max_hp / 16).max(1);
    battle.effect_heal(mon, amount, Some("its Leftovers"));
}

static LIFE_ORB: EffectHandlers = EffectHandlers {
    on_modify_damage: Some(life_orb_damage),
    on_after_move_secondary_self: Some(life_orb_recoil),
    ..EffectHandlers::NONE
};

/// Only scales the holder's own attacks; the damage chain also carries
/// the defender's effects.
fn life_orb_damage(_battle: &Battle, ctx: &EventContext, _damage: u32) -> Option<u32> {
    if ctx.holder_mon().is_some() && ctx.holder_mon() == ctx.source {
        Some(5324)
    } else {
        None
    }
}

fn life_orb_recoil(battle: &mut Battle, ctx: &EventContext, total_damage: u32) {
    let Some(mon) = ctx.holder_mon() else { return };
    if total_damage == 0 || battle.mon(mon).is_fainted() {
        return;
    }
    let amount = u32::from(battle.mon(mon).max_hp / 10).max(1);
    battle.effect_damage(mon, amount, Some("its Life Orb"));
}

static CHOICE_BAND: EffectHandlers = EffectHandlers {
    is_choice: true,
    on_modify_atk: Some(choice_band_atk),
    ..EffectHandlers::NONE
};

fn choice_band_atk(_battle: &Battle, _ctx: &EventContext, _atk: u32) -> Option<u32> {
    Some(6144)
}

static CHOICE_SCARF: EffectHandlers = EffectHandlers {
    is_choice: true,
    on_modify_spe: Some(choice_scarf_spe),
    ..EffectHandlers::NONE
};

fn choice_scarf_spe(_battle: &Battle, _ctx: &EventContext, _spe: u32) -> Option<u32> {
    Some(6144)
}

static FOCUS_SASH: EffectHandlers = EffectHandlers {
    on_damage: Some((-40.0, focus_sash_damage)),
    ..EffectHandlers::NONE
};

fn focus_sash_damage(battle: &mut Battle, ctx: &EventContext, damage: u32) -> Option<u32> {
    let Some(mon) = ctx.holder_mon() else { return None };
    let pokemon = battle.mon(mon);
    let hp = u32::from(pokemon.hp);
    if pokemon.hp == pokemon.max_hp && damage >= hp {
        battle.consume_item(mon);
        return Some(hp - 1);
    }
    None
}

static QUICK_CLAW: EffectHandlers = EffectHandlers {
    on_fractional_priority: Some(quick_claw_priority),
    ..EffectHandlers::NONE
};

fn quick_claw_priority(battle: &mut Battle, ctx: &EventContext) -> Option<f64> {
    let Some(mon) = ctx.holder_mon() else { return None };
    if battle.prng.chance(1, 5) {
        battle.log.push(LogEntry::ItemActivated {
            name: battle.name_of(mon),
            item: "Quick Claw".to_string(),
        });
        return Some(0.1);
    }
    None
}
