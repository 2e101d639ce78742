//! Field-wide effects: weather, terrains and Trick Room.

use crate::battle::dispatch::EventContext;
use crate::battle::effects::EffectHandlers;
use crate::battle::pokemon::StatusId;
use crate::battle::state::Battle;
use dex::Type;

pub(super) fn handlers(id: &str) -> Option<&'static EffectHandlers> {
    match id {
        "raindance" => Some(&RAIN),
        "sunnyday" => Some(&SUN),
        "sandstorm" => Some(&SANDSTORM),
        "snowscape" => Some(&SNOW),
        "electricterrain" => Some(&ELECTRIC_TERRAIN),
        "grassyterrain" => Some(&GRASSY_TERRAIN),
        "trickroom" => Some(&TRICK_ROOM),
        _ => None,
    }
}

fn active_move_type(battle: &Battle) -> Option<Type> {
    battle.active_move.as_ref().map(|mv| mv.data.move_type)
}

static RAIN: EffectHandlers = EffectHandlers {
    residual_order: Some(1),
    on_weather_modify_damage: Some(rain_damage),
    ..EffectHandlers::NONE
};

fn rain_damage(battle: &Battle, _ctx: &EventContext, _damage: u32) -> Option<u32> {
    match active_move_type(battle)? {
        Type::Water => Some(6144),
        Type::Fire => Some(2048),
        _ => None,
    }
}

static SUN: EffectHandlers = EffectHandlers {
    residual_order: Some(1),
    on_weather_modify_damage: Some(sun_damage),
    ..EffectHandlers::NONE
};

fn sun_damage(battle: &Battle, _ctx: &EventContext, _damage: u32) -> Option<u32> {
    match active_move_type(battle)? {
        Type::Fire => Some(6144),
        Type::Water => Some(2048),
        _ => None,
    }
}

static SANDSTORM: EffectHandlers = EffectHandlers {
    residual_order: Some(1),
    on_modify_spd: Some(sandstorm_spd),
    on_residual: Some(sandstorm_residual),
    ..EffectHandlers::NONE
};

/// Rock types get a half-again special defense boost in sand.
fn sandstorm_spd(battle: &Battle, ctx: &EventContext, _value: u32) -> Option<u32> {
    let mon = ctx.mon?;
    if battle.mon(mon).has_type(Type::Rock) {
        Some(6144)
    } else {
        None
    }
}

fn sandstorm_residual(battle: &mut Battle, _ctx: &EventContext) {
    for mon in battle.active_mon_ids() {
        let pokemon = battle.mon(mon);
        if pokemon.is_fainted()
            || pokemon.has_type(Type::Rock)
            || pokemon.has_type(Type::Ground)
            || pokemon.has_type(Type::Steel)
        {
            continue;
        }
        let amount = u32::from(pokemon.max_hp / 16).max(1);
        battle.effect_damage(mon, amount, Some("the sandstorm"));
    }
}

static SNOW: EffectHandlers = EffectHandlers {
    residual_order: Some(1),
    on_modify_def: Some(snow_def),
    ..EffectHandlers::NONE
};

fn snow_def(battle: &Battle, ctx: &EventContext, _value: u32) -> Option<u32> {
    let mon = ctx.mon?;
    if battle.mon(mon).has_type(Type::Ice) {
        Some(6144)
    } else {
        None
    }
}

static ELECTRIC_TERRAIN: EffectHandlers = EffectHandlers {
    residual_order: Some(27),
    on_base_power: Some(electric_terrain_power),
    on_set_status: Some(electric_terrain_status),
    ..EffectHandlers::NONE
};

fn electric_terrain_power(battle: &Battle, ctx: &EventContext, _power: u32) -> Option<u32> {
    let attacker = ctx.mon?;
    if battle.mon(attacker).is_grounded() && active_move_type(battle)? == Type::Electric {
        Some(5325)
    } else {
        None
    }
}

fn electric_terrain_status(battle: &mut Battle, ctx: &EventContext, status: StatusId) -> bool {
    let Some(target) = ctx.mon else { return true };
    !(status == StatusId::Sleep && battle.mon(target).is_grounded())
}

static GRASSY_TERRAIN: EffectHandlers = EffectHandlers {
    residual_order: Some(5),
    residual_sub_order: 2,
    on_base_power: Some(grassy_terrain_power),
    on_residual: Some(grassy_terrain_residual),
    ..EffectHandlers::NONE
};

fn grassy_terrain_power(battle: &Battle, ctx: &EventContext, _power: u32) -> Option<u32> {
    let attacker = ctx.mon?;
    if battle.mon(attacker).is_grounded() && active_move_type(battle)? == Type::Grass {
        Some(5325)
    } else {
        None
    }
}

fn grassy_terrain_residual(battle: &mut Battle, _ctx: &EventContext) {
    for mon in battle.active_mon_ids() {
        let pokemon = battle.mon(mon);
        if pokemon.is_fainted() || !pokemon.is_grounded() || pokemon.hp == pokemon.max_hp {
            continue;
        }
        let amount = u32::from(pokemon.max_hp / 16).max(1);
        battle.effect_heal(mon, amount, Some("Grassy Terrain"));
    }
}

static TRICK_ROOM: EffectHandlers = EffectHandlers {
    residual_order: Some(27),
    ..EffectHandlers::NONE
};
