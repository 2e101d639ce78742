use crate::battle::actions::ActiveMove;
use crate::battle::dispatch;
use crate::battle::pokemon::MonId;
use crate::battle::state::Battle;
use dex::{type_effectiveness, Effectiveness, MoveCategory, StatName, Type};

/// 32-bit truncation, the width every intermediate damage value lives in.
fn tr(value: u64) -> u64 {
    value & 0xFFFF_FFFF
}

/// Chain two modifiers expressed in 4096ths.
pub fn chain_modifier(previous: u32, next: u32) -> u32 {
    ((u64::from(previous) * u64::from(next) + 0x800) >> 12) as u32
}

/// Apply a 4096ths modifier to a value, rounding half down.
pub fn apply_modifier(value: u32, modifier: u32) -> u32 {
    ((u64::from(value) * u64::from(modifier) + 2048 - 1) / 4096) as u32
}

/// The pre-modifier core: level, power, and the attack/defense ratio, with
/// truncation after every step.
pub fn base_damage(level: u8, power: u32, attack: u32, defense: u32) -> u32 {
    let level_term = tr(2 * u64::from(level) / 5 + 2);
    let numerator = tr(level_term * u64::from(power) * u64::from(attack));
    let ratio = tr(numerator / u64::from(defense.max(1)));
    tr(ratio / 50) as u32
}

/// Net type effectiveness of `move_type` into `defender_types`, as a count
/// of doublings. None means at least one type is immune.
pub fn type_modifier(move_type: Type, defender_types: &[Type]) -> Option<i8> {
    let mut doublings: i8 = 0;
    for &def_type in defender_types {
        match type_effectiveness(move_type, def_type) {
            Effectiveness::Immune => return None,
            Effectiveness::Super => doublings += 1,
            Effectiveness::NotVery => doublings -= 1,
            Effectiveness::Neutral => {}
        }
    }
    Some(doublings.clamp(-6, 6))
}

/// STAB numerator in 4096ths before ability overrides: 6144 when the move
/// shares a type with the user (tera'd users keep STAB on their original
/// types), 8192 when it matches the tera type itself.
fn stab_base(battle: &Battle, attacker: MonId, move_type: Type) -> u32 {
    let user = battle.mon(attacker);
    if user.terastallized == Some(move_type) {
        return 8192;
    }
    if user.has_type(move_type) || user.base_types.contains(&move_type) {
        return 6144;
    }
    4096
}

/// Damage for one hit of `mv` into `defender`, given the crit flag and the
/// damage roll (0..=15) already drawn.
///
/// Pure with respect to battle state, which keeps it directly testable:
/// the caller owns every random decision.
pub fn compute_damage(
    battle: &Battle,
    attacker: MonId,
    defender: MonId,
    mv: &ActiveMove,
    crit: bool,
    roll: u32,
) -> u32 {
    let user = battle.mon(attacker);
    let target = battle.mon(defender);

    let base_power = dispatch::base_power_chain(
        battle,
        attacker,
        defender,
        u32::from(mv.data.base_power),
    );
    if base_power == 0 {
        return 0;
    }

    let (off_stat, def_stat) = match mv.data.category {
        MoveCategory::Physical => (StatName::Atk, StatName::Def),
        _ => (StatName::SpA, StatName::SpD),
    };

    // Crits ignore the attacker's unfavorable stages and the defender's
    // favorable ones.
    let mut off_stage = user.boosts.get(stat_to_boost(off_stat));
    let mut def_stage = target.boosts.get(stat_to_boost(def_stat));
    if crit {
        off_stage = off_stage.max(0);
        def_stage = def_stage.min(0);
    }
    let attack = dispatch::stat_chain(
        battle,
        attacker,
        off_stat,
        user.stat_with_stage(off_stat, off_stage),
    );
    let defense = dispatch::stat_chain(
        battle,
        defender,
        def_stat,
        target.stat_with_stage(def_stat, def_stage),
    );

    let mut damage = u64::from(base_damage(user.level, base_power, attack, defense));

    damage += 2;

    if mv.spread {
        damage = u64::from(apply_modifier(damage as u32, 3072));
    }

    damage = u64::from(dispatch::weather_damage_chain(battle, attacker, damage as u32));

    if crit {
        damage = tr(damage * 3 / 2);
    }

    damage = tr(damage * u64::from(100 - roll.min(15)) / 100);

    let stab = dispatch::stab_value(
        battle,
        attacker,
        stab_base(battle, attacker, mv.data.move_type),
    );
    if stab != 4096 {
        damage = u64::from(apply_modifier(damage as u32, stab));
    }

    let doublings = type_modifier(mv.data.move_type, &target.types).unwrap_or(0);
    for _ in 0..doublings.max(0) {
        damage = tr(damage * 2);
    }
    for _ in 0..(-doublings).max(0) {
        damage = tr(damage / 2);
    }

    if user.status == Some(crate::battle::pokemon::StatusId::Burn)
        && mv.data.category == MoveCategory::Physical
    {
        damage = u64::from(apply_modifier(damage as u32, 2048));
    }

    damage = u64::from(dispatch::damage_mod_chain(
        battle,
        attacker,
        defender,
        damage as u32,
    ));

    // The cartridge works in 16-bit damage words.
    damage &= 0xFFFF;

    (damage as u32).max(1)
}

fn stat_to_boost(stat: StatName) -> dex::BoostName {
    match stat {
        StatName::Atk => dex::BoostName::Atk,
        StatName::Def => dex::BoostName::Def,
        StatName::SpA => dex::BoostName::SpA,
        StatName::SpD => dex::BoostName::SpD,
        _ => dex::BoostName::Spe,
    }
}
