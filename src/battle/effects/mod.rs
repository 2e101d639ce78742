//! Static handler tables for every effect the engine knows: statuses,
//! volatiles, side conditions, weather, terrain, abilities and items.
//!
//! An effect is a bundle of optional hooks. The dispatcher collects the
//! hooks attached around an event, orders them, and calls them; an id
//! with no table entry is simply inert. Handlers are plain `fn` pointers
//! so the whole registry lives in statics.

use crate::battle::dispatch::EventContext;
use crate::battle::pokemon::StatusId;
use crate::battle::state::Battle;
use dex::{BoostList, MoveData, Type};

mod abilities;
mod items;
mod sides;
mod statuses;
mod volatiles;
mod weather;

pub use volatiles::CONFUSION_POWER;
pub(crate) use items::item_name;

/// Contributes one 4096ths modifier to a multiplier chain, or passes.
/// The `u32` argument is the running value of the number being modified.
pub type ChainHook = fn(&Battle, &EventContext, u32) -> Option<u32>;

/// Replaces the STAB numerator outright (Adaptability).
pub type StabHook = fn(&Battle, &EventContext, u32) -> Option<u32>;

/// Rewrites a move's integer priority (Prankster). Runs while the action
/// is being queued, so the move comes in by reference rather than through
/// the active move slot.
pub type PriorityHook = fn(&Battle, &EventContext, &MoveData, f64) -> Option<f64>;

/// Adds a fractional nudge to priority. May roll the PRNG (Quick Claw),
/// hence the mutable battle.
pub type FractionalPriorityHook = fn(&mut Battle, &EventContext) -> Option<f64>;

/// Returns false when the holder is immune to the given move type.
pub type ImmunityHook = fn(&Battle, &EventContext, Type) -> bool;

/// Returns Some(()) to block the incoming hit. The blocker logs its own
/// message.
pub type TryHitHook = fn(&mut Battle, &EventContext) -> Option<()>;

/// Returns false to veto a status about to be set on `ctx.mon`.
pub type SetStatusHook = fn(&mut Battle, &EventContext, StatusId) -> bool;

/// Edits a pending boost list in place, dropping vetoed entries.
pub type TryBoostHook = fn(&mut Battle, &EventContext, &mut BoostList);

/// Returns false to cancel the holder's move this turn.
pub type BeforeMoveHook = fn(&mut Battle, &EventContext) -> bool;

/// Fires when the holder enters the field.
pub type SwitchInHook = fn(&mut Battle, &EventContext);

/// Fires on a Pokemon arriving on the side holding the hazard.
pub type EntryHazardHook = fn(&mut Battle, &EventContext);

/// Fires on the holder after it takes a damaging hit; `ctx.source` is the
/// attacker and the `u32` the damage dealt.
pub type DamagingHitHook = fn(&mut Battle, &EventContext, u32);

/// Fires on the move user once its move fully resolves; the `u32` is the
/// total damage the move dealt.
pub type AfterMoveSelfHook = fn(&mut Battle, &EventContext, u32);

/// May rewrite incoming damage at the last moment (Focus Sash, Sturdy).
pub type DamageHook = fn(&mut Battle, &EventContext, u32) -> Option<u32>;

/// End-of-turn pulse.
pub type ResidualHook = fn(&mut Battle, &EventContext);

/// The full hook table for one effect id. Most entries stay `None`;
/// tables are written with struct update from [`EffectHandlers::NONE`].
pub struct EffectHandlers {
    /// Position in the end-of-turn walk. `None` sorts after every
    /// numbered residual, which is where pure countdowns belong.
    pub residual_order: Option<u32>,
    pub residual_sub_order: u32,
    /// Choice items lock their holder into the first move picked.
    pub is_choice: bool,

    pub on_modify_atk: Option<ChainHook>,
    pub on_modify_def: Option<ChainHook>,
    pub on_modify_spa: Option<ChainHook>,
    pub on_modify_spd: Option<ChainHook>,
    pub on_modify_spe: Option<ChainHook>,
    pub on_base_power: Option<ChainHook>,
    pub on_weather_modify_damage: Option<ChainHook>,
    pub on_modify_damage: Option<ChainHook>,
    pub on_modify_stab: Option<StabHook>,
    pub on_modify_priority: Option<PriorityHook>,
    pub on_fractional_priority: Option<FractionalPriorityHook>,
    pub on_immunity: Option<ImmunityHook>,
    /// Paired with a priority so Protect outranks slower blockers.
    pub on_try_hit: Option<(f64, TryHitHook)>,
    pub on_set_status: Option<SetStatusHook>,
    pub on_try_boost: Option<TryBoostHook>,
    /// Paired with a priority: sleep and freeze check before flinch,
    /// flinch before confusion, confusion before paralysis.
    pub on_before_move: Option<(f64, BeforeMoveHook)>,
    pub on_switch_in: Option<SwitchInHook>,
    pub on_entry_hazard: Option<EntryHazardHook>,
    pub on_damaging_hit: Option<DamagingHitHook>,
    pub on_after_move_secondary_self: Option<AfterMoveSelfHook>,
    /// Paired with a priority: Sturdy clamps before Focus Sash, which
    /// then sees the hit no longer as lethal and keeps itself.
    pub on_damage: Option<(f64, DamageHook)>,
    pub on_residual: Option<ResidualHook>,
}

impl EffectHandlers {
    pub const NONE: EffectHandlers = EffectHandlers {
        residual_order: None,
        residual_sub_order: 0,
        is_choice: false,
        on_modify_atk: None,
        on_modify_def: None,
        on_modify_spa: None,
        on_modify_spd: None,
        on_modify_spe: None,
        on_base_power: None,
        on_weather_modify_damage: None,
        on_modify_damage: None,
        on_modify_stab: None,
        on_modify_priority: None,
        on_fractional_priority: None,
        on_immunity: None,
        on_try_hit: None,
        on_set_status: None,
        on_try_boost: None,
        on_before_move: None,
        on_switch_in: None,
        on_entry_hazard: None,
        on_damaging_hit: None,
        on_after_move_secondary_self: None,
        on_damage: None,
        on_residual: None,
    };
}

/// Look up the handler table for an effect id. Unknown ids get the empty
/// table and behave as pure markers.
pub fn handlers_for(id: &str) -> &'static EffectHandlers {
    statuses::handlers(id)
        .or_else(|| volatiles::handlers(id))
        .or_else(|| sides::handlers(id))
        .or_else(|| weather::handlers(id))
        .or_else(|| abilities::handlers(id))
        .or_else(|| items::handlers(id))
        .unwrap_or(&EffectHandlers::NONE)
}

/// Display name for a condition id as it shows up in the log.
pub(crate) fn condition_name(id: &str) -> String {
    match id {
        "raindance" => "Rain".to_string(),
        "sunnyday" => "Harsh Sunlight".to_string(),
        "sandstorm" => "Sandstorm".to_string(),
        "snowscape" => "Snow".to_string(),
        "electricterrain" => "Electric Terrain".to_string(),
        "grassyterrain" => "Grassy Terrain".to_string(),
        "trickroom" => "Trick Room".to_string(),
        "stealthrock" => "Stealth Rock".to_string(),
        "spikes" => "Spikes".to_string(),
        "reflect" => "Reflect".to_string(),
        "lightscreen" => "Light Screen".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_ids_are_inert() {
        let handlers = handlers_for("notaneffect");
        assert!(handlers.on_residual.is_none());
        assert!(handlers.residual_order.is_none());
        assert!(!handlers.is_choice);
    }

    #[test]
    fn every_registry_resolves_its_own_ids() {
        for id in [
            "brn", "par", "slp", "frz", "psn", "tox", "flinch", "confusion", "protect",
            "reflect", "lightscreen", "stealthrock", "spikes", "raindance", "sunnyday",
            "sandstorm", "snowscape", "electricterrain", "grassyterrain", "trickroom",
            "static", "intimidate", "levitate", "technician", "adaptability", "sturdy",
            "leftovers", "lifeorb", "choiceband", "choicescarf", "focussash", "quickclaw",
        ] {
            let handlers = handlers_for(id);
            let has_any = handlers.residual_order.is_some()
                || handlers.is_choice
                || handlers.on_residual.is_some()
                || handlers.on_before_move.is_some()
                || handlers.on_modify_atk.is_some()
                || handlers.on_modify_spe.is_some()
                || handlers.on_modify_spd.is_some()
                || handlers.on_modify_def.is_some()
                || handlers.on_base_power.is_some()
                || handlers.on_modify_damage.is_some()
                || handlers.on_weather_modify_damage.is_some()
                || handlers.on_modify_stab.is_some()
                || handlers.on_try_hit.is_some()
                || handlers.on_switch_in.is_some()
                || handlers.on_entry_hazard.is_some()
                || handlers.on_damaging_hit.is_some()
                || handlers.on_damage.is_some()
                || handlers.on_immunity.is_some()
                || handlers.on_set_status.is_some()
                || handlers.on_try_boost.is_some()
                || handlers.on_fractional_priority.is_some()
                || handlers.on_modify_priority.is_some()
                || handlers.on_after_move_secondary_self.is_some();
            assert!(has_any, "{} resolved to the empty table", id);
        }
    }
}
