use crate::ids::Id;
use crate::types::Type;

/// Name of the Z-move a damaging move of the given type becomes.
pub fn z_move_name(move_type: Type) -> Option<&'static str> {
    Some(match move_type {
        Type::Normal => "Breakneck Blitz",
        Type::Fighting => "All-Out Pummeling",
        Type::Flying => "Supersonic Skystrike",
        Type::Poison => "Acid Downpour",
        Type::Ground => "Tectonic Rage",
        Type::Rock => "Continental Crush",
        Type::Bug => "Savage Spin-Out",
        Type::Ghost => "Never-Ending Nightmare",
        Type::Steel => "Corkscrew Crash",
        Type::Fire => "Inferno Overdrive",
        Type::Water => "Hydro Vortex",
        Type::Grass => "Bloom Doom",
        Type::Electric => "Gigavolt Havoc",
        Type::Psychic => "Shattered Psyche",
        Type::Ice => "Subzero Slammer",
        Type::Dragon => "Devastating Drake",
        Type::Dark => "Black Hole Eclipse",
        Type::Fairy => "Twinkle Tackle",
        Type::Typeless => return None,
    })
}

/// Name of the Max move a damaging move of the given type becomes.
/// Status moves all become `MAX_GUARD`.
pub fn max_move_name(move_type: Type) -> Option<&'static str> {
    Some(match move_type {
        Type::Normal => "Max Strike",
        Type::Fighting => "Max Knuckle",
        Type::Flying => "Max Airstream",
        Type::Poison => "Max Ooze",
        Type::Ground => "Max Quake",
        Type::Rock => "Max Rockfall",
        Type::Bug => "Max Flutterby",
        Type::Ghost => "Max Phantasm",
        Type::Steel => "Max Steelspike",
        Type::Fire => "Max Flare",
        Type::Water => "Max Geyser",
        Type::Grass => "Max Overgrowth",
        Type::Electric => "Max Lightning",
        Type::Psychic => "Max Mindstorm",
        Type::Ice => "Max Hailstorm",
        Type::Dragon => "Max Wyrmwind",
        Type::Dark => "Max Darkness",
        Type::Fairy => "Max Starfall",
        Type::Typeless => return None,
    })
}

pub const MAX_GUARD: &str = "Max Guard";

/// Z-move power derived from the base move's power, per the standard step
/// table.
pub fn z_move_power(base_power: u16) -> u16 {
    match base_power {
        0..=55 => 100,
        56..=65 => 120,
        66..=75 => 140,
        76..=85 => 160,
        86..=95 => 175,
        96..=100 => 180,
        101..=110 => 185,
        111..=125 => 190,
        126..=130 => 195,
        _ => 200,
    }
}

/// Type unlocked by a held Z-crystal, if the item is one.
pub fn z_crystal_type(item: &Id) -> Option<Type> {
    Some(match item.as_str() {
        "normaliumz" => Type::Normal,
        "fightiniumz" => Type::Fighting,
        "flyiniumz" => Type::Flying,
        "poisoniumz" => Type::Poison,
        "groundiumz" => Type::Ground,
        "rockiumz" => Type::Rock,
        "buginiumz" => Type::Bug,
        "ghostiumz" => Type::Ghost,
        "steeliumz" => Type::Steel,
        "firiumz" => Type::Fire,
        "wateriumz" => Type::Water,
        "grassiumz" => Type::Grass,
        "electriumz" => Type::Electric,
        "psychiumz" => Type::Psychic,
        "iciumz" => Type::Ice,
        "dragoniumz" => Type::Dragon,
        "darkiniumz" => Type::Dark,
        "fairiumz" => Type::Fairy,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_real_type_has_both_names() {
        for t in Type::iter() {
            if t == Type::Typeless {
                assert_eq!(z_move_name(t), None);
                assert_eq!(max_move_name(t), None);
            } else {
                assert!(z_move_name(t).is_some());
                assert!(max_move_name(t).is_some());
            }
        }
    }

    #[test]
    fn z_power_steps() {
        assert_eq!(z_move_power(40), 100);
        assert_eq!(z_move_power(60), 120);
        assert_eq!(z_move_power(80), 160);
        assert_eq!(z_move_power(90), 175);
        assert_eq!(z_move_power(100), 180);
        assert_eq!(z_move_power(120), 190);
        assert_eq!(z_move_power(150), 200);
    }

    #[test]
    fn crystals_map_to_types() {
        assert_eq!(z_crystal_type(&Id::new("Firium Z")), Some(Type::Fire));
        assert_eq!(z_crystal_type(&Id::new("Leftovers")), None);
    }
}
