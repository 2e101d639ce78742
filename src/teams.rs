//! Prebuilt teams for the demo binary and integration tests.

use crate::battle::engine::TeamSheet;
use crate::pokemon::PokemonSet;
use dex::Type;

/// Mixed offense around Charizard. Carries a mega stone that only matters
/// under rules that allow it.
pub fn team_red() -> TeamSheet {
    TeamSheet::new(
        "Red",
        vec![
            PokemonSet::new(
                "Pikachu",
                50,
                &["Thunderbolt", "Quick Attack", "Thunder Wave", "Protect"],
            )
            .with_item("focussash")
            .with_tera(Type::Electric),
            PokemonSet::new(
                "Charizard",
                50,
                &["Flamethrower", "Air Slash", "Earthquake", "Sunny Day"],
            )
            .with_item("charizarditex"),
            PokemonSet::new(
                "Garchomp",
                50,
                &["Earthquake", "Stone Edge", "Swords Dance", "Protect"],
            )
            .with_item("leftovers")
            .with_tera(Type::Steel),
        ],
    )
}

/// Bulkier counterpart with status spread and a hazard setter.
pub fn team_blue() -> TeamSheet {
    TeamSheet::new(
        "Blue",
        vec![
            PokemonSet::new(
                "Gengar",
                50,
                &["Shadow Ball", "Thunderbolt", "Will-O-Wisp", "Confuse Ray"],
            )
            .with_item("gengarite"),
            PokemonSet::new("Blastoise", 50, &["Surf", "Ice Beam", "Icy Wind", "Protect"])
                .with_item("leftovers")
                .with_tera(Type::Water),
            PokemonSet::new(
                "Tyranitar",
                50,
                &["Stone Edge", "Earthquake", "Stealth Rock", "Protect"],
            )
            .with_item("quickclaw")
            .with_tera(Type::Rock),
        ],
    )
}
