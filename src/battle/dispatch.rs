use crate::battle::effects::{handlers_for, EffectHandlers};
use crate::battle::pokemon::MonId;
use crate::battle::queue::{compare_priority, Prioritized};
use crate::battle::state::Battle;
use dex::{BoostList, Id, StatName, Type};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Where an effect instance is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectHolder {
    Mon(MonId),
    Side(usize),
    Field,
}

/// What kind of attachment an effect instance is. Used both for the
/// sub-order bracket and to re-check that an effect still exists before
/// its handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    Status,
    Volatile,
    SideCondition,
    Weather,
    Terrain,
    PseudoWeather,
    Ability,
    Item,
}

impl EffectKind {
    /// Bracket applied when two listeners tie on priority and speed.
    /// Lower runs first.
    fn bracket(&self) -> u32 {
        match self {
            EffectKind::Status | EffectKind::Volatile => 2,
            EffectKind::SideCondition => 4,
            EffectKind::Weather => 5,
            EffectKind::Terrain | EffectKind::PseudoWeather => 6,
            EffectKind::Ability => 7,
            EffectKind::Item => 8,
        }
    }
}

/// Everything a handler gets to know about why it is running.
#[derive(Debug, Clone)]
pub struct EventContext {
    /// The effect whose handler is running.
    pub effect: Id,
    pub holder: EffectHolder,
    /// The Pokemon the event is about, when there is one.
    pub mon: Option<MonId>,
    /// The opposing party, when there is one.
    pub source: Option<MonId>,
}

impl EventContext {
    /// The Pokemon carrying the effect, for mon-attached effects.
    pub fn holder_mon(&self) -> Option<MonId> {
        match self.holder {
            EffectHolder::Mon(mon) => Some(mon),
            _ => None,
        }
    }
}

/// A collected handler, detached from battle borrows so the battle can be
/// mutated while the list is walked.
#[derive(Debug, Clone)]
pub struct Listener {
    pub effect: Id,
    pub kind: EffectKind,
    pub holder: EffectHolder,
    pub order: Option<u32>,
    pub priority: OrderedFloat<f64>,
    pub speed: u32,
    pub sub_order: u32,
    pub effect_order: u32,
}

impl Listener {
    pub fn context(&self, mon: Option<MonId>, source: Option<MonId>) -> EventContext {
        EventContext {
            effect: self.effect.clone(),
            holder: self.holder,
            mon,
            source,
        }
    }
}

impl Prioritized for Listener {
    fn order(&self) -> Option<u32> {
        self.order
    }

    fn priority(&self) -> OrderedFloat<f64> {
        self.priority
    }

    fn speed(&self) -> u32 {
        self.speed
    }

    fn sub_order(&self) -> u32 {
        self.sub_order
    }

    fn effect_order(&self) -> u32 {
        self.effect_order
    }
}

/// One attached effect instance, before hook filtering.
struct RawEffect {
    id: Id,
    kind: EffectKind,
    holder: EffectHolder,
    effect_order: u32,
}

/// Sort key a hook contributes when it subscribes to an event.
struct ListenerKey {
    order: Option<u32>,
    priority: f64,
    /// None means "use the effect kind's bracket".
    sub_order: Option<u32>,
}

impl ListenerKey {
    fn with_priority(priority: f64) -> ListenerKey {
        ListenerKey {
            order: None,
            priority,
            sub_order: None,
        }
    }

    fn residual(order: Option<u32>, sub_order: u32) -> ListenerKey {
        ListenerKey {
            order,
            priority: 0.0,
            sub_order: Some(sub_order),
        }
    }
}

fn push_mon_effects(battle: &Battle, mon: MonId, out: &mut Vec<RawEffect>) {
    let pokemon = battle.mon(mon);
    if pokemon.is_fainted() {
        return;
    }
    if let Some(status) = pokemon.status {
        out.push(RawEffect {
            id: Id::new(status.id()),
            kind: EffectKind::Status,
            holder: EffectHolder::Mon(mon),
            effect_order: pokemon.status_state.effect_order,
        });
    }
    for (id, state) in &pokemon.volatiles {
        out.push(RawEffect {
            id: id.clone(),
            kind: EffectKind::Volatile,
            holder: EffectHolder::Mon(mon),
            effect_order: state.effect_order,
        });
    }
    if !pokemon.ability.is_empty() {
        out.push(RawEffect {
            id: pokemon.ability.clone(),
            kind: EffectKind::Ability,
            holder: EffectHolder::Mon(mon),
            effect_order: pokemon.ability_order,
        });
    }
    if let Some(item) = &pokemon.item {
        out.push(RawEffect {
            id: item.clone(),
            kind: EffectKind::Item,
            holder: EffectHolder::Mon(mon),
            effect_order: pokemon.item_order,
        });
    }
}

fn push_side_effects(battle: &Battle, side: usize, out: &mut Vec<RawEffect>) {
    for (id, state) in &battle.side(side).conditions {
        out.push(RawEffect {
            id: id.clone(),
            kind: EffectKind::SideCondition,
            holder: EffectHolder::Side(side),
            effect_order: state.effect_order,
        });
    }
}

fn push_field_effects(battle: &Battle, out: &mut Vec<RawEffect>) {
    if let Some(weather) = &battle.field.weather {
        out.push(RawEffect {
            id: weather.clone(),
            kind: EffectKind::Weather,
            holder: EffectHolder::Field,
            effect_order: battle.field.weather_state.effect_order,
        });
    }
    if let Some(terrain) = &battle.field.terrain {
        out.push(RawEffect {
            id: terrain.clone(),
            kind: EffectKind::Terrain,
            holder: EffectHolder::Field,
            effect_order: battle.field.terrain_state.effect_order,
        });
    }
    for (id, state) in &battle.field.pseudo_weather {
        out.push(RawEffect {
            id: id.clone(),
            kind: EffectKind::PseudoWeather,
            holder: EffectHolder::Field,
            effect_order: state.effect_order,
        });
    }
}

/// Effects that can respond to an event about `mon`: the mon's own
/// attachments, its side's conditions, and the field.
fn effects_around(battle: &Battle, mon: MonId) -> Vec<RawEffect> {
    let mut out = Vec::new();
    push_mon_effects(battle, mon, &mut out);
    push_side_effects(battle, mon.side, &mut out);
    push_field_effects(battle, &mut out);
    out
}

fn holder_speed(battle: &Battle, holder: EffectHolder) -> u32 {
    match holder {
        EffectHolder::Mon(mon) => battle.mon(mon).boosted_stat(StatName::Spe),
        _ => 0,
    }
}

/// Filter raw effects down to the ones carrying a given hook, keyed by the
/// hook's priority, and sort them into execution order.
///
/// Start ordinals are unique per effect instance, so this ordering is total
/// and costs no PRNG frames.
fn build_listeners(
    battle: &Battle,
    raw: Vec<RawEffect>,
    pick: impl Fn(&'static EffectHandlers) -> Option<ListenerKey>,
) -> Vec<Listener> {
    let mut listeners: Vec<Listener> = raw
        .into_iter()
        .filter_map(|effect| {
            let handlers = handlers_for(effect.id.as_str());
            let key = pick(handlers)?;
            let sub_order = key.sub_order.unwrap_or_else(|| effect.kind.bracket());
            Some(Listener {
                effect: effect.id,
                kind: effect.kind,
                holder: effect.holder,
                order: key.order,
                priority: OrderedFloat(key.priority),
                speed: holder_speed(battle, effect.holder),
                sub_order,
                effect_order: effect.effect_order,
            })
        })
        .collect();
    listeners.sort_by(compare_priority);
    listeners
}

/// An effect may be removed by an earlier handler in the same event; check
/// it still exists before running it.
pub fn is_live(battle: &Battle, listener: &Listener) -> bool {
    match (listener.kind, listener.holder) {
        (EffectKind::Status, EffectHolder::Mon(mon)) => {
            let p = battle.mon(mon);
            !p.is_fainted() && p.status.map(|s| s.id() == listener.effect.as_str()).unwrap_or(false)
        }
        (EffectKind::Volatile, EffectHolder::Mon(mon)) => {
            let p = battle.mon(mon);
            !p.is_fainted() && p.has_volatile(listener.effect.as_str())
        }
        (EffectKind::Ability, EffectHolder::Mon(mon)) => {
            let p = battle.mon(mon);
            !p.is_fainted() && p.ability == listener.effect && battle.is_on_field(mon)
        }
        (EffectKind::Item, EffectHolder::Mon(mon)) => {
            let p = battle.mon(mon);
            !p.is_fainted()
                && p.item.as_ref().map(|i| *i == listener.effect).unwrap_or(false)
                && battle.is_on_field(mon)
        }
        (EffectKind::SideCondition, EffectHolder::Side(side)) => {
            battle.side(side).has_condition(listener.effect.as_str())
        }
        (EffectKind::Weather, EffectHolder::Field) => {
            battle.field.is_weather(listener.effect.as_str())
        }
        (EffectKind::Terrain, EffectHolder::Field) => {
            battle.field.is_terrain(listener.effect.as_str())
        }
        (EffectKind::PseudoWeather, EffectHolder::Field) => {
            battle.field.has_pseudo_weather(listener.effect.as_str())
        }
        _ => false,
    }
}

/// Fold a chain of 4096ths modifiers over `base`. Each handler sees the
/// running value and may contribute one more modifier.
fn run_chain(
    battle: &Battle,
    listeners: Vec<Listener>,
    mon: Option<MonId>,
    source: Option<MonId>,
    base: u32,
    hook_of: impl Fn(&'static EffectHandlers) -> Option<crate::battle::effects::ChainHook>,
) -> u32 {
    let mut acc = 4096u32;
    for listener in listeners {
        if !is_live(battle, &listener) {
            continue;
        }
        let Some(hook) = hook_of(handlers_for(listener.effect.as_str())) else {
            continue;
        };
        let current = crate::battle::damage::apply_modifier(base, acc);
        let ctx = listener.context(mon, source);
        if let Some(modifier) = hook(battle, &ctx, current) {
            acc = crate::battle::damage::chain_modifier(acc, modifier);
        }
    }
    crate::battle::damage::apply_modifier(base, acc)
}

/// Stat after attached effects: paralysis speed, choice items, weather
/// defense boosts and the like.
pub fn stat_chain(battle: &Battle, mon: MonId, stat: StatName, base: u32) -> u32 {
    let listeners = build_listeners(battle, effects_around(battle, mon), |h| {
        stat_hook(h, stat).map(|_| ListenerKey::with_priority(0.0))
    });
    run_chain(battle, listeners, Some(mon), None, base, |h| stat_hook(h, stat))
}

fn stat_hook(
    handlers: &'static EffectHandlers,
    stat: StatName,
) -> Option<crate::battle::effects::ChainHook> {
    match stat {
        StatName::Atk => handlers.on_modify_atk,
        StatName::Def => handlers.on_modify_def,
        StatName::SpA => handlers.on_modify_spa,
        StatName::SpD => handlers.on_modify_spd,
        StatName::Spe => handlers.on_modify_spe,
        StatName::Hp => None,
    }
}

/// Base-power modifiers from the attacker's perspective: Technician,
/// Reckless, terrain boosts.
pub fn base_power_chain(battle: &Battle, attacker: MonId, defender: MonId, base: u32) -> u32 {
    let listeners = build_listeners(battle, effects_around(battle, attacker), |h| {
        h.on_base_power.map(|_| ListenerKey::with_priority(0.0))
    });
    run_chain(battle, listeners, Some(attacker), Some(defender), base, |h| {
        h.on_base_power
    })
}

/// Weather-driven damage scaling for Fire and Water moves.
pub fn weather_damage_chain(battle: &Battle, attacker: MonId, base: u32) -> u32 {
    let listeners = build_listeners(battle, effects_around(battle, attacker), |h| {
        h.on_weather_modify_damage.map(|_| ListenerKey::with_priority(0.0))
    });
    run_chain(battle, listeners, Some(attacker), None, base, |h| {
        h.on_weather_modify_damage
    })
}

/// Final damage modifiers: the attacker's own (Life Orb) plus whatever
/// shields the defender's side holds (screens).
pub fn damage_mod_chain(battle: &Battle, attacker: MonId, defender: MonId, base: u32) -> u32 {
    let mut raw = Vec::new();
    push_mon_effects(battle, attacker, &mut raw);
    push_mon_effects(battle, defender, &mut raw);
    push_side_effects(battle, defender.side, &mut raw);
    let listeners = build_listeners(battle, raw, |h| h.on_modify_damage.map(|_| ListenerKey::with_priority(0.0)));
    run_chain(battle, listeners, Some(defender), Some(attacker), base, |h| {
        h.on_modify_damage
    })
}

/// STAB override: handlers see the current numerator and may replace it.
pub fn stab_value(battle: &Battle, attacker: MonId, base: u32) -> u32 {
    let listeners = build_listeners(battle, effects_around(battle, attacker), |h| {
        h.on_modify_stab.map(|_| ListenerKey::with_priority(0.0))
    });
    let mut value = base;
    for listener in listeners {
        if !is_live(battle, &listener) {
            continue;
        }
        if let Some(hook) = handlers_for(listener.effect.as_str()).on_modify_stab {
            let ctx = listener.context(Some(attacker), None);
            if let Some(replacement) = hook(battle, &ctx, value) {
                value = replacement;
            }
        }
    }
    value
}

/// Resolve a move's effective priority for the action queue: integer
/// rewrites first (Prankster), then fractional nudges (Quick Claw, which
/// rolls and therefore needs the battle mutable).
pub fn move_priority(battle: &mut Battle, mon: MonId, mv: &dex::MoveData, base: f64) -> f64 {
    let mut priority = base;
    let listeners = build_listeners(battle, effects_around(battle, mon), |h| {
        h.on_modify_priority.map(|_| ListenerKey::with_priority(0.0))
    });
    for listener in listeners {
        if !is_live(battle, &listener) {
            continue;
        }
        if let Some(hook) = handlers_for(listener.effect.as_str()).on_modify_priority {
            let ctx = listener.context(Some(mon), None);
            if let Some(new_priority) = hook(battle, &ctx, mv, priority) {
                priority = new_priority;
            }
        }
    }
    let listeners = build_listeners(battle, effects_around(battle, mon), |h| {
        h.on_fractional_priority.map(|_| ListenerKey::with_priority(0.0))
    });
    for listener in listeners {
        if !is_live(battle, &listener) {
            continue;
        }
        if let Some(hook) = handlers_for(listener.effect.as_str()).on_fractional_priority {
            let ctx = listener.context(Some(mon), None);
            if let Some(bonus) = hook(battle, &ctx) {
                priority += bonus;
            }
        }
    }
    priority
}

/// True when some effect grants the defender outright immunity to this
/// move type (Levitate against Ground).
pub fn grants_immunity(battle: &Battle, defender: MonId, move_type: Type) -> bool {
    let listeners = build_listeners(battle, effects_around(battle, defender), |h| {
        h.on_immunity.map(|_| ListenerKey::with_priority(0.0))
    });
    for listener in listeners {
        if !is_live(battle, &listener) {
            continue;
        }
        if let Some(hook) = handlers_for(listener.effect.as_str()).on_immunity {
            let ctx = listener.context(Some(defender), None);
            if !hook(battle, &ctx, move_type) {
                return true;
            }
        }
    }
    false
}

/// Give the defender's effects a chance to block the incoming hit
/// entirely. The first blocker wins; it logs its own message.
pub fn try_hit_blocked(battle: &mut Battle, attacker: MonId, defender: MonId) -> bool {
    let listeners = build_listeners(battle, effects_around(battle, defender), |h| {
        h.on_try_hit.map(|(priority, _)| ListenerKey::with_priority(priority))
    });
    for listener in listeners {
        if !is_live(battle, &listener) {
            continue;
        }
        if let Some((_, hook)) = handlers_for(listener.effect.as_str()).on_try_hit {
            let ctx = listener.context(Some(defender), Some(attacker));
            if hook(battle, &ctx).is_some() {
                return true;
            }
        }
    }
    false
}

/// Let the target's effects strip entries out of a pending boost list
/// (Clear Body). The list is edited in place.
pub fn run_try_boost(
    battle: &mut Battle,
    target: MonId,
    source: Option<MonId>,
    boosts: &mut BoostList,
) {
    let listeners = build_listeners(battle, effects_around(battle, target), |h| {
        h.on_try_boost.map(|_| ListenerKey::with_priority(0.0))
    });
    for listener in listeners {
        if !is_live(battle, &listener) {
            continue;
        }
        if let Some(hook) = handlers_for(listener.effect.as_str()).on_try_boost {
            let ctx = listener.context(Some(target), source);
            hook(battle, &ctx, boosts);
        }
    }
}

/// True when no effect vetoes putting `status` on the target (Electric
/// Terrain blocks sleep on grounded Pokemon).
pub fn status_allowed(
    battle: &mut Battle,
    target: MonId,
    source: Option<MonId>,
    status: crate::battle::pokemon::StatusId,
) -> bool {
    let listeners = build_listeners(battle, effects_around(battle, target), |h| {
        h.on_set_status.map(|_| ListenerKey::with_priority(0.0))
    });
    for listener in listeners {
        if !is_live(battle, &listener) {
            continue;
        }
        if let Some(hook) = handlers_for(listener.effect.as_str()).on_set_status {
            let ctx = listener.context(Some(target), source);
            if !hook(battle, &ctx, status) {
                return false;
            }
        }
    }
    true
}

/// The gauntlet a Pokemon runs before its chosen move: sleep, freeze,
/// flinch, confusion, paralysis. The first handler that cancels stops the
/// walk; later checks never see the attempt.
pub fn run_before_move(battle: &mut Battle, mon: MonId) -> bool {
    let listeners = build_listeners(battle, effects_around(battle, mon), |h| {
        h.on_before_move.map(|(priority, _)| ListenerKey::with_priority(priority))
    });
    for listener in listeners {
        if !is_live(battle, &listener) {
            continue;
        }
        if let Some((_, hook)) = handlers_for(listener.effect.as_str()).on_before_move {
            let ctx = listener.context(Some(mon), None);
            if !hook(battle, &ctx) {
                return false;
            }
        }
    }
    true
}

/// Abilities that fire as their holder enters the field, speed-ordered
/// across simultaneous entries.
pub fn run_switch_in(battle: &mut Battle, entered: &[MonId]) {
    let mut raw = Vec::new();
    for &mon in entered {
        push_mon_effects(battle, mon, &mut raw);
    }
    let listeners = build_listeners(battle, raw, |h| h.on_switch_in.map(|_| ListenerKey::with_priority(0.0)));
    for listener in listeners {
        if !is_live(battle, &listener) {
            continue;
        }
        if let Some(hook) = handlers_for(listener.effect.as_str()).on_switch_in {
            let mon = match listener.holder {
                EffectHolder::Mon(m) => Some(m),
                _ => None,
            };
            let ctx = listener.context(mon, None);
            hook(battle, &ctx);
        }
    }
}

/// Entry hazards on `side` greet a Pokemon arriving there.
pub fn run_entry_hazards(battle: &mut Battle, entering: MonId) {
    let mut raw = Vec::new();
    push_side_effects(battle, entering.side, &mut raw);
    let listeners = build_listeners(battle, raw, |h| h.on_entry_hazard.map(|_| ListenerKey::with_priority(0.0)));
    for listener in listeners {
        if !is_live(battle, &listener) {
            continue;
        }
        if battle.mon(entering).is_fainted() {
            break;
        }
        if let Some(hook) = handlers_for(listener.effect.as_str()).on_entry_hazard {
            let ctx = listener.context(Some(entering), None);
            hook(battle, &ctx);
        }
    }
}

/// After a damaging hit lands: contact punishment and similar.
pub fn run_damaging_hit(battle: &mut Battle, defender: MonId, attacker: MonId, damage: u32) {
    let listeners = build_listeners(battle, effects_around(battle, defender), |h| {
        h.on_damaging_hit.map(|_| ListenerKey::with_priority(0.0))
    });
    for listener in listeners {
        if !is_live(battle, &listener) {
            continue;
        }
        if let Some(hook) = handlers_for(listener.effect.as_str()).on_damaging_hit {
            let ctx = listener.context(Some(defender), Some(attacker));
            hook(battle, &ctx, damage);
        }
    }
}

/// Self-inflicted consequences once a move has fully resolved (Life Orb).
pub fn run_after_move_self(battle: &mut Battle, attacker: MonId, total_damage: u32) {
    let listeners = build_listeners(battle, effects_around(battle, attacker), |h| {
        h.on_after_move_secondary_self.map(|_| ListenerKey::with_priority(0.0))
    });
    for listener in listeners {
        if !is_live(battle, &listener) {
            continue;
        }
        if let Some(hook) = handlers_for(listener.effect.as_str()).on_after_move_secondary_self {
            let ctx = listener.context(Some(attacker), None);
            hook(battle, &ctx, total_damage);
        }
    }
}

/// Last-moment damage rewrites: Focus Sash and Sturdy keep their holder
/// standing. Runs highest priority first.
pub fn clamp_damage(
    battle: &mut Battle,
    target: MonId,
    source: Option<MonId>,
    damage: u32,
) -> u32 {
    let listeners = build_listeners(battle, effects_around(battle, target), |h| {
        h.on_damage.map(|(priority, _)| ListenerKey::with_priority(priority))
    });
    let mut damage = damage;
    for listener in listeners {
        if !is_live(battle, &listener) {
            continue;
        }
        if let Some((_, hook)) = handlers_for(listener.effect.as_str()).on_damage {
            let ctx = listener.context(Some(target), source);
            if let Some(clamped) = hook(battle, &ctx, damage) {
                damage = clamped;
            }
        }
    }
    damage
}

/// Everything that wants the end-of-turn phase: effects with a residual
/// handler and effects that merely count down. Sorted by residual order;
/// pure countdowns have no order and land after everything else.
pub fn collect_residuals(battle: &Battle) -> Vec<Listener> {
    let mut raw = Vec::new();
    for mon in battle.active_mon_ids() {
        push_mon_effects(battle, mon, &mut raw);
    }
    for side in 0..battle.sides.len() {
        push_side_effects(battle, side, &mut raw);
    }
    push_field_effects(battle, &mut raw);

    let mut listeners: Vec<Listener> = raw
        .into_iter()
        .filter_map(|effect| {
            let handlers = handlers_for(effect.id.as_str());
            let counts_down = effect_duration(battle, &effect).is_some();
            if handlers.on_residual.is_none() && handlers.residual_order.is_none() && !counts_down
            {
                return None;
            }
            let key = ListenerKey::residual(handlers.residual_order, handlers.residual_sub_order);
            Some(Listener {
                effect: effect.id,
                kind: effect.kind,
                holder: effect.holder,
                order: key.order,
                priority: OrderedFloat(key.priority),
                speed: holder_speed(battle, effect.holder),
                sub_order: key.sub_order.unwrap_or_else(|| effect.kind.bracket()),
                effect_order: effect.effect_order,
            })
        })
        .collect();
    listeners.sort_by(compare_priority);
    listeners
}

fn effect_duration(battle: &Battle, effect: &RawEffect) -> Option<u8> {
    match (effect.kind, effect.holder) {
        (EffectKind::Status, EffectHolder::Mon(mon)) => battle.mon(mon).status_state.duration,
        (EffectKind::Volatile, EffectHolder::Mon(mon)) => battle
            .mon(mon)
            .volatiles
            .get(&effect.id)
            .and_then(|state| state.duration),
        (EffectKind::SideCondition, EffectHolder::Side(side)) => battle
            .side(side)
            .conditions
            .get(&effect.id)
            .and_then(|state| state.duration),
        (EffectKind::Weather, EffectHolder::Field) => battle.field.weather_state.duration,
        (EffectKind::Terrain, EffectHolder::Field) => battle.field.terrain_state.duration,
        (EffectKind::PseudoWeather, EffectHolder::Field) => battle
            .field
            .pseudo_weather
            .get(&effect.id)
            .and_then(|state| state.duration),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_brackets_put_conditions_before_abilities_and_items() {
        assert!(EffectKind::Status.bracket() < EffectKind::SideCondition.bracket());
        assert!(EffectKind::SideCondition.bracket() < EffectKind::Weather.bracket());
        assert!(EffectKind::Weather.bracket() < EffectKind::Ability.bracket());
        assert!(EffectKind::Ability.bracket() < EffectKind::Item.bracket());
    }
}
