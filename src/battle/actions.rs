//! Move execution: everything between "this Pokemon acts now" and the
//! last log line its move produces.
//!
//! The pipeline for a targeted move runs, in order: the before-move
//! gauntlet, charge handling, PP, protection, immunity, invulnerability,
//! accuracy, then per-hit damage with its riders. Failures at each gate
//! log their own message; a move that finds no target at all says
//! nothing.

use crate::battle::damage::{base_damage, compute_damage, type_modifier};
use crate::battle::dispatch;
use crate::battle::effects::{handlers_for, CONFUSION_POWER};
use crate::battle::log::LogEntry;
use crate::battle::pokemon::{acc_stage_fraction, EffectState, MonId, StatusId};
use crate::battle::rng::Prng;
use crate::battle::state::Battle;
use dex::{
    z_move_name, z_move_power, BoostList, BoostName, Id, MoveData, MoveFlags, MoveTarget,
    MultiHit, StatName,
};

/// Moves that still connect with a target in the semi-invulnerable turn
/// of a charging move.
const HITS_AIRBORNE: [&str; 7] = [
    "gust",
    "twister",
    "thunder",
    "hurricane",
    "skyuppercut",
    "smackdown",
    "thousandarrows",
];

/// The move currently executing. A synced copy sits in
/// [`Battle::active_move`] while handlers run, so effects can inspect the
/// move that is hitting them.
#[derive(Debug, Clone)]
pub struct ActiveMove {
    pub id: Id,
    /// Owned copy of the dex record; Z transformation rewrites it.
    pub data: MoveData,
    pub user: MonId,
    pub zmove: bool,
    /// Struck more than one target this use, so damage takes the spread
    /// penalty.
    pub spread: bool,
    /// Whether the hit being resolved is a critical hit.
    pub crit: bool,
    /// Damage dealt across all hits and targets so far.
    pub total_damage: u32,
}

/// How one target fared against the executing move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// The move affected the target.
    Hit,
    /// It failed, and the failure message is already in the log.
    Fail,
    /// It failed silently; nobody was there to fail against.
    Skip,
}

/// Execute a queued move action from start to finish.
pub fn run_move_action(
    battle: &mut Battle,
    user: MonId,
    move_id: &Id,
    chosen_target: Option<MonId>,
    zmove: bool,
) {
    if battle.mon(user).is_fainted() || !battle.is_on_field(user) {
        return;
    }

    // A volatile named after the move marks the release turn of a
    // two-turn move.
    let releasing = battle.mon(user).has_volatile(move_id.as_str());

    if !dispatch::run_before_move(battle, user) {
        if releasing {
            battle.mon_mut(user).remove_volatile(move_id.as_str());
        }
        return;
    }

    let Some(data) = battle.dex.move_data(move_id).cloned() else {
        return;
    };

    if data.flags.charge && !releasing && !zmove {
        charge_turn(battle, user, move_id, &data);
        return;
    }

    if releasing {
        battle.mon_mut(user).remove_volatile(move_id.as_str());
    } else if *move_id != "struggle" {
        if let Some(slot) = battle.mon_mut(user).move_slot_mut(move_id.as_str()) {
            slot.deduct_pp(1);
        }
    }

    // A choice item locks its holder into the first move it picks.
    let choice_item = battle
        .mon(user)
        .item
        .as_ref()
        .map(|item| handlers_for(item.as_str()).is_choice)
        .unwrap_or(false);
    if choice_item && *move_id != "struggle" && !battle.mon(user).has_volatile("choicelock") {
        let order = battle.next_effect_order();
        let mut state = EffectState::new(order);
        state.linked_move = Some(move_id.clone());
        battle.mon_mut(user).add_volatile(Id::new("choicelock"), state);
    }

    let mut active = ActiveMove {
        id: move_id.clone(),
        data,
        user,
        zmove,
        spread: false,
        crit: false,
        total_damage: 0,
    };
    if zmove {
        transform_z(battle, &mut active);
    }

    battle.log.push(LogEntry::MoveUsed {
        side: user.side,
        user: battle.name_of(user),
        move_name: active.data.name.clone(),
    });

    match active.data.target {
        MoveTarget::User => execute_self_move(battle, &mut active),
        MoveTarget::AllySide | MoveTarget::FoeSide | MoveTarget::All => {
            execute_field_move(battle, &mut active)
        }
        _ => execute_targeted_move(battle, &mut active, chosen_target),
    }

    battle.active_move = None;
}

/// Announce and go semi-invulnerable; the move itself runs next turn.
/// PP is spent now, not on release.
fn charge_turn(battle: &mut Battle, user: MonId, move_id: &Id, data: &MoveData) {
    if let Some(slot) = battle.mon_mut(user).move_slot_mut(move_id.as_str()) {
        slot.deduct_pp(1);
    }
    battle.log.push(LogEntry::MoveUsed {
        side: user.side,
        user: battle.name_of(user),
        move_name: data.name.clone(),
    });
    battle.log.push(LogEntry::MovePrepare {
        user: battle.name_of(user),
        move_name: data.name.clone(),
    });
    let order = battle.next_effect_order();
    battle
        .mon_mut(user)
        .add_volatile(move_id.clone(), EffectState::new(order).with_duration(2));
}

fn execute_targeted_move(battle: &mut Battle, active: &mut ActiveMove, chosen: Option<MonId>) {
    let user = active.user;
    let targets = resolve_targets(battle, user, &active.data, chosen);
    if targets.is_empty() {
        return;
    }
    active.spread = targets.len() > 1;

    let mut connected = false;
    for target in targets {
        if battle.mon(user).is_fainted() {
            break;
        }
        if run_one_target(battle, active, target) == HitOutcome::Hit {
            connected = true;
        }
    }

    if connected && active.data.flags.recharge && !battle.mon(user).is_fainted() {
        let order = battle.next_effect_order();
        battle
            .mon_mut(user)
            .add_volatile(Id::new("mustrecharge"), EffectState::new(order).with_duration(2));
        battle.log.push(LogEntry::MustRecharge {
            name: battle.name_of(user),
        });
    }

    dispatch::run_after_move_self(battle, user, active.total_damage);

    if connected
        && active.data.self_switch
        && !battle.mon(user).is_fainted()
        && !battle.side(user.side).switchable().is_empty()
    {
        if let Some(slot) = battle.side(user.side).slot_of(user.poke) {
            battle.request_midturn_switch(user.side, slot);
        }
    }
}

/// One target's trip through the gates: protection, immunity,
/// invulnerability, accuracy, then the hit itself.
fn run_one_target(battle: &mut Battle, active: &mut ActiveMove, target: MonId) -> HitOutcome {
    let user = active.user;
    if battle.mon(target).is_fainted() || !battle.is_on_field(target) {
        return HitOutcome::Skip;
    }

    battle.active_move = Some(active.clone());
    if dispatch::try_hit_blocked(battle, user, target) {
        return HitOutcome::Fail;
    }

    let move_type = active.data.move_type;
    if active.data.is_damaging() || !active.data.ignore_immunity {
        let type_immune = type_modifier(move_type, &battle.mon(target).types).is_none();
        if type_immune || dispatch::grants_immunity(battle, target, move_type) {
            battle.log.push(LogEntry::Effectiveness {
                target: battle.name_of(target),
                multiplier: 0.0,
            });
            return HitOutcome::Fail;
        }
    }

    if semi_invulnerable(battle, target) && !HITS_AIRBORNE.contains(&active.id.as_str()) {
        battle.log.push(LogEntry::MoveMissed {
            user: battle.name_of(user),
            target: battle.name_of(target),
        });
        return HitOutcome::Fail;
    }

    // The accuracy frame is consumed whenever the move has an accuracy
    // value, even when stages push it to a guaranteed hit.
    if let Some(accuracy) = active.data.accuracy {
        let stage = (battle.mon(user).boosts.accuracy - battle.mon(target).boosts.evasion)
            .clamp(-6, 6);
        let (num, den) = acc_stage_fraction(stage);
        let effective = (u32::from(accuracy) * num / den).min(100);
        if !battle.prng.chance(effective, 100) {
            battle.log.push(LogEntry::MoveMissed {
                user: battle.name_of(user),
                target: battle.name_of(target),
            });
            return HitOutcome::Fail;
        }
    }

    if active.data.steals_boosts {
        steal_boosts(battle, user, target);
    }

    if active.data.is_damaging() {
        run_damaging_hits(battle, active, target)
    } else {
        run_status_payload(battle, active, target)
    }
}

fn run_damaging_hits(battle: &mut Battle, active: &mut ActiveMove, target: MonId) -> HitOutcome {
    let user = active.user;
    let planned = roll_hit_count(&mut battle.prng, active.data.multihit);
    let crit_den = crit_denominator(active.data.crit_ratio);

    let mut hits_landed: u8 = 0;
    for _ in 0..planned {
        if battle.mon(user).is_fainted() || battle.mon(target).is_fainted() {
            break;
        }

        let crit = battle.prng.chance(1, crit_den);
        let roll = battle.prng.next(16);
        active.crit = crit;
        battle.active_move = Some(active.clone());
        let mut damage = compute_damage(battle, user, target, active, crit, roll);

        if active.data.no_faint {
            let hp = u32::from(battle.mon(target).hp);
            damage = damage.min(hp.saturating_sub(1));
        }
        damage = dispatch::clamp_damage(battle, target, Some(user), damage);

        if crit && damage > 0 {
            battle.log.push(LogEntry::CriticalHit {
                target: battle.name_of(target),
            });
        }
        let doublings =
            type_modifier(active.data.move_type, &battle.mon(target).types).unwrap_or(0);
        if doublings != 0 && damage > 0 {
            battle.log.push(LogEntry::Effectiveness {
                target: battle.name_of(target),
                multiplier: 2f64.powi(i32::from(doublings)),
            });
        }

        let dealt = u32::from(battle.effect_damage(target, damage, None));
        hits_landed += 1;
        active.total_damage += dealt;

        if dealt > 0 {
            if let Some((num, den)) = active.data.drain {
                battle.effect_heal(user, fraction_of(dealt, num, den), Some("drain"));
            }
            if let Some((num, den)) = active.data.recoil {
                battle.effect_damage(user, fraction_of(dealt, num, den), Some("recoil"));
            }
        }
        if active.data.struggle_recoil {
            let amount = quarter_max_hp(battle.mon(user).max_hp);
            battle.effect_damage(user, amount, Some("recoil"));
        }

        for secondary in active.data.secondaries.clone() {
            if !battle.prng.chance(u32::from(secondary.chance), 100) {
                continue;
            }
            if battle.mon(target).is_fainted() {
                continue;
            }
            if let Some(status) = &secondary.status {
                if let Some(status) = StatusId::from_id(status.as_str()) {
                    battle.try_set_status(target, Some(user), status);
                }
            }
            if let Some(volatile) = &secondary.volatile_status {
                battle.add_volatile_to(target, volatile.as_str());
            }
            if let Some(boosts) = &secondary.boosts {
                battle.apply_boosts(target, Some(user), boosts);
            }
        }

        if dealt > 0 {
            dispatch::run_damaging_hit(battle, target, user, dealt);
        }
    }

    if hits_landed == 0 {
        return HitOutcome::Skip;
    }
    if active.data.multihit.is_some() {
        battle.log.push(LogEntry::HitCount { hits: hits_landed });
    }
    HitOutcome::Hit
}

/// A status move's primary payloads against one target. If none of them
/// does anything, the move announces its failure.
fn run_status_payload(battle: &mut Battle, active: &mut ActiveMove, target: MonId) -> HitOutcome {
    let user = active.user;
    let mut any = false;

    if let Some(status) = &active.data.status {
        if let Some(status) = StatusId::from_id(status.as_str()) {
            any |= battle.try_set_status(target, Some(user), status);
        }
    }
    if let Some(volatile) = &active.data.volatile_status {
        any |= battle.add_volatile_to(target, volatile.as_str());
    }
    if let Some(boosts) = &active.data.boosts {
        // Stage changes always report, either movement or "won't go".
        battle.apply_boosts(target, Some(user), boosts);
        any = true;
    }
    if active.data.force_switch {
        any |= force_switch_out(battle, target);
    }

    if any {
        HitOutcome::Hit
    } else {
        battle.log.push(LogEntry::MoveFailed {
            user: battle.name_of(user),
        });
        HitOutcome::Fail
    }
}

fn execute_self_move(battle: &mut Battle, active: &mut ActiveMove) {
    let user = active.user;
    battle.active_move = Some(active.clone());

    if active.data.stall && !run_stall_check(battle, user) {
        battle.log.push(LogEntry::MoveFailed {
            user: battle.name_of(user),
        });
        return;
    }

    let mut any = false;
    if let Some(volatile) = &active.data.volatile_status {
        let applied = battle.add_volatile_to(user, volatile.as_str());
        if applied && active.data.stall {
            bump_stall(battle, user);
        }
        any |= applied;
    }
    if let Some(boosts) = &active.data.boosts {
        battle.apply_boosts(user, Some(user), boosts);
        any = true;
    }
    if let Some((num, den)) = active.data.heal {
        let amount =
            (u32::from(battle.mon(user).max_hp) * u32::from(num) / u32::from(den)).max(1);
        any |= battle.effect_heal(user, amount, None) > 0;
    }

    if !any {
        battle.log.push(LogEntry::MoveFailed {
            user: battle.name_of(user),
        });
    }
}

fn execute_field_move(battle: &mut Battle, active: &mut ActiveMove) {
    let user = active.user;
    battle.active_move = Some(active.clone());

    let mut any = false;
    if let Some(condition) = &active.data.side_condition {
        let side = match active.data.target {
            MoveTarget::AllySide => user.side,
            _ => 1 - user.side,
        };
        any |= battle.add_side_condition(side, condition);
    }
    if let Some(weather) = &active.data.weather {
        any |= battle.set_weather_id(weather, Some(user));
    }
    if let Some(terrain) = &active.data.terrain {
        any |= battle.set_terrain_id(terrain, Some(user));
    }
    if let Some(pseudo) = &active.data.pseudo_weather {
        // Using the move while its room is up tears the room back down.
        any |= if battle.field.has_pseudo_weather(pseudo.as_str()) {
            battle.remove_pseudo_weather_id(pseudo.as_str())
        } else {
            battle.add_pseudo_weather_id(pseudo, Some(user))
        };
    }

    if !any {
        battle.log.push(LogEntry::MoveFailed {
            user: battle.name_of(user),
        });
    }
}

fn resolve_targets(
    battle: &mut Battle,
    user: MonId,
    data: &MoveData,
    chosen: Option<MonId>,
) -> Vec<MonId> {
    match data.target {
        MoveTarget::Normal => {
            if let Some(target) = chosen {
                if battle.is_on_field(target) && !battle.mon(target).is_fainted() {
                    return vec![target];
                }
            }
            // The chosen slot is empty or down; redirect to any live foe.
            match battle.active_foes(user.side).first() {
                Some(&foe) => vec![foe],
                None => Vec::new(),
            }
        }
        MoveTarget::RandomNormal => {
            let foes = battle.active_foes(user.side);
            if foes.is_empty() {
                Vec::new()
            } else {
                vec![*battle.prng.sample(&foes)]
            }
        }
        MoveTarget::AllAdjacentFoes => battle.active_foes(user.side),
        MoveTarget::AllAdjacent => {
            let mut targets = battle.active_foes(user.side);
            targets.extend(battle.ally_of(user));
            targets
        }
        _ => Vec::new(),
    }
}

/// Protection moves fail when nothing else is due to act this turn, and
/// their odds fall to a third for each consecutive use.
fn run_stall_check(battle: &mut Battle, user: MonId) -> bool {
    if !battle.queue.will_act() {
        battle.mon_mut(user).remove_volatile("stall");
        return false;
    }
    let counter = battle
        .mon(user)
        .volatiles
        .get("stall")
        .map(|state| state.counter)
        .unwrap_or(0);
    if counter > 0 && !battle.prng.chance(1, counter) {
        battle.mon_mut(user).remove_volatile("stall");
        return false;
    }
    true
}

fn bump_stall(battle: &mut Battle, user: MonId) {
    let order = battle.next_effect_order();
    let pokemon = battle.mon_mut(user);
    if let Some(state) = pokemon.volatiles.get_mut("stall") {
        state.counter = (state.counter * 3).min(729);
        state.duration = Some(2);
    } else {
        pokemon.add_volatile(
            Id::new("stall"),
            EffectState::new(order).with_duration(2).with_counter(3),
        );
    }
}

const BOOSTABLE: [BoostName; 7] = [
    BoostName::Atk,
    BoostName::Def,
    BoostName::SpA,
    BoostName::SpD,
    BoostName::Spe,
    BoostName::Accuracy,
    BoostName::Evasion,
];

/// Move the target's positive stages onto the user, zeroing them on the
/// target. Runs before damage, so the stolen stages power the hit.
fn steal_boosts(battle: &mut Battle, user: MonId, target: MonId) {
    let mut stolen: BoostList = Vec::new();
    let boosts = battle.mon(target).boosts;
    for stat in BOOSTABLE {
        let stage = boosts.get(stat);
        if stage > 0 {
            stolen.push((stat, stage));
        }
    }
    if stolen.is_empty() {
        return;
    }
    battle.log.push(LogEntry::BoostsStolen {
        user: battle.name_of(user),
        target: battle.name_of(target),
    });
    for (stat, _) in &stolen {
        battle.mon_mut(target).boosts.set(*stat, 0);
    }
    battle.apply_boosts(user, None, &stolen);
}

/// Drag the target out for a random bench replacement. Fails when the
/// bench is empty.
fn force_switch_out(battle: &mut Battle, target: MonId) -> bool {
    let bench = battle.side(target.side).switchable();
    if bench.is_empty() {
        return false;
    }
    let Some(slot) = battle.side(target.side).slot_of(target.poke) else {
        return false;
    };
    let replacement = *battle.prng.sample(&bench);
    battle.perform_switch(target.side, slot, replacement, true);
    let incoming = MonId::new(target.side, replacement);
    if !battle.mon(incoming).is_fainted() {
        dispatch::run_switch_in(battle, &[incoming]);
    }
    true
}

/// Rewrite the move into its Z form: typed name, stepped power, perfect
/// accuracy, a single hit, no riders.
fn transform_z(battle: &mut Battle, active: &mut ActiveMove) {
    if !active.data.is_damaging() {
        return;
    }
    let Some(name) = z_move_name(active.data.move_type) else {
        return;
    };
    battle.side_mut(active.user.side).z_used = true;
    battle.log.push(LogEntry::ZPower {
        name: battle.name_of(active.user),
        move_name: name.to_string(),
    });
    active.data.name = name.to_string();
    active.data.base_power = z_move_power(active.data.base_power);
    active.data.accuracy = None;
    active.data.multihit = None;
    active.data.drain = None;
    active.data.recoil = None;
    active.data.struggle_recoil = false;
    active.data.secondaries = Vec::new();
    active.data.self_switch = false;
    active.data.force_switch = false;
    active.data.flags = MoveFlags {
        protect: active.data.flags.protect,
        ..MoveFlags::default()
    };
}

/// The typeless physical self-hit rolled while confused: plain base
/// damage into the holder's own Defense, randomized, nothing else from
/// the damage ladder.
pub fn confusion_self_hit(battle: &mut Battle, mon: MonId) {
    let pokemon = battle.mon(mon);
    let attack = pokemon.boosted_stat(StatName::Atk);
    let defense = pokemon.boosted_stat(StatName::Def);
    let base = base_damage(pokemon.level, u32::from(CONFUSION_POWER), attack, defense) + 2;
    let roll = battle.prng.next(16);
    let damage = (u64::from(base) * u64::from(100 - roll) / 100) as u32;
    battle.effect_damage(mon, damage.max(1), Some("its confusion"));
}

fn semi_invulnerable(battle: &Battle, target: MonId) -> bool {
    battle.mon(target).volatiles.keys().any(|id| {
        battle
            .dex
            .move_data(id)
            .map(|data| data.flags.charge)
            .unwrap_or(false)
    })
}

fn crit_denominator(stage: u8) -> u32 {
    match stage {
        0 | 1 => 24,
        2 => 8,
        3 => 2,
        _ => 1,
    }
}

fn roll_hit_count(prng: &mut Prng, multihit: Option<MultiHit>) -> u8 {
    match multihit {
        None => 1,
        Some(MultiHit::Fixed(hits)) => hits,
        // The standard 2-5 spread is weighted toward two and three hits.
        Some(MultiHit::Range(2, 5)) => *prng.sample(&[2u8, 2, 3, 3, 4, 5]),
        Some(MultiHit::Range(min, max)) => {
            prng.next_between(u32::from(min), u32::from(max) + 1) as u8
        }
    }
}

/// Rounded to nearest with halves up, floored at one. Drain and recoil
/// fractions both round this way.
fn fraction_of(amount: u32, num: u8, den: u8) -> u32 {
    ((2 * amount * u32::from(num) + u32::from(den)) / (2 * u32::from(den))).max(1)
}

fn quarter_max_hp(max_hp: u16) -> u32 {
    ((2 * u32::from(max_hp) + 4) / 8).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::rng::PrngSeed;
    use pretty_assertions::assert_eq;

    #[test]
    fn drain_and_recoil_round_half_up() {
        assert_eq!(fraction_of(48, 1, 2), 24);
        assert_eq!(fraction_of(49, 1, 2), 25);
        assert_eq!(fraction_of(1, 1, 4), 1);
        assert_eq!(fraction_of(90, 33, 100), 30);
        assert_eq!(fraction_of(100, 1, 3), 33);
    }

    #[test]
    fn crit_stages_follow_the_denominator_table() {
        assert_eq!(crit_denominator(0), 24);
        assert_eq!(crit_denominator(1), 24);
        assert_eq!(crit_denominator(2), 8);
        assert_eq!(crit_denominator(3), 2);
        assert_eq!(crit_denominator(4), 1);
        assert_eq!(crit_denominator(9), 1);
    }

    #[test]
    fn struggle_recoil_rounds_half_up() {
        assert_eq!(quarter_max_hp(357), 89);
        assert_eq!(quarter_max_hp(358), 90);
        assert_eq!(quarter_max_hp(2), 1);
    }

    #[test]
    fn multihit_rolls_stay_in_range_and_favor_low_counts() {
        let mut prng = Prng::new(PrngSeed::from_state(0xFACE));
        let mut counts = [0u32; 6];
        for _ in 0..6000 {
            let hits = roll_hit_count(&mut prng, Some(MultiHit::Range(2, 5)));
            assert!((2..=5).contains(&hits));
            counts[usize::from(hits)] += 1;
        }
        assert!(counts[2] > counts[4]);
        assert!(counts[3] > counts[5]);
        assert_eq!(roll_hit_count(&mut prng, Some(MultiHit::Fixed(2))), 2);
        assert_eq!(roll_hit_count(&mut prng, None), 1);
    }
}
