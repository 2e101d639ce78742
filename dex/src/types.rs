use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The eighteen modern types plus `Typeless` for moves that resolve without
/// a type (the no-PP fallback move, confusion self-hits).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Type {
    Normal,
    Fighting,
    Flying,
    Poison,
    Ground,
    Rock,
    Bug,
    Ghost,
    Steel,
    Fire,
    Water,
    Grass,
    Electric,
    Psychic,
    Ice,
    Dragon,
    Dark,
    Fairy,
    Typeless,
}

/// Single-type matchup result. Multipliers for dual-typed defenders come
/// from folding one matchup per defending type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effectiveness {
    Immune,
    NotVery,
    Neutral,
    Super,
}

/// The full attacking-type versus defending-type chart.
pub fn type_effectiveness(attacking: Type, defending: Type) -> Effectiveness {
    use Effectiveness::*;
    use Type::*;

    match (attacking, defending) {
        (Normal, Ghost) => Immune,
        (Normal, Rock) | (Normal, Steel) => NotVery,
        (Normal, _) => Neutral,

        (Fighting, Ghost) => Immune,
        (Fighting, Normal) | (Fighting, Ice) | (Fighting, Rock) | (Fighting, Dark)
        | (Fighting, Steel) => Super,
        (Fighting, Poison) | (Fighting, Flying) | (Fighting, Psychic) | (Fighting, Bug)
        | (Fighting, Fairy) => NotVery,
        (Fighting, _) => Neutral,

        (Flying, Grass) | (Flying, Fighting) | (Flying, Bug) => Super,
        (Flying, Electric) | (Flying, Rock) | (Flying, Steel) => NotVery,
        (Flying, _) => Neutral,

        (Poison, Steel) => Immune,
        (Poison, Grass) | (Poison, Fairy) => Super,
        (Poison, Poison) | (Poison, Ground) | (Poison, Rock) | (Poison, Ghost) => NotVery,
        (Poison, _) => Neutral,

        (Ground, Flying) => Immune,
        (Ground, Fire) | (Ground, Electric) | (Ground, Poison) | (Ground, Rock)
        | (Ground, Steel) => Super,
        (Ground, Grass) | (Ground, Bug) => NotVery,
        (Ground, _) => Neutral,

        (Rock, Fire) | (Rock, Ice) | (Rock, Flying) | (Rock, Bug) => Super,
        (Rock, Fighting) | (Rock, Ground) | (Rock, Steel) => NotVery,
        (Rock, _) => Neutral,

        (Bug, Grass) | (Bug, Psychic) | (Bug, Dark) => Super,
        (Bug, Fire) | (Bug, Fighting) | (Bug, Poison) | (Bug, Flying) | (Bug, Ghost)
        | (Bug, Steel) | (Bug, Fairy) => NotVery,
        (Bug, _) => Neutral,

        (Ghost, Normal) => Immune,
        (Ghost, Psychic) | (Ghost, Ghost) => Super,
        (Ghost, Dark) => NotVery,
        (Ghost, _) => Neutral,

        (Steel, Ice) | (Steel, Rock) | (Steel, Fairy) => Super,
        (Steel, Fire) | (Steel, Water) | (Steel, Electric) | (Steel, Steel) => NotVery,
        (Steel, _) => Neutral,

        (Fire, Grass) | (Fire, Ice) | (Fire, Bug) | (Fire, Steel) => Super,
        (Fire, Fire) | (Fire, Water) | (Fire, Rock) | (Fire, Dragon) => NotVery,
        (Fire, _) => Neutral,

        (Water, Fire) | (Water, Ground) | (Water, Rock) => Super,
        (Water, Water) | (Water, Grass) | (Water, Dragon) => NotVery,
        (Water, _) => Neutral,

        (Grass, Water) | (Grass, Ground) | (Grass, Rock) => Super,
        (Grass, Fire) | (Grass, Grass) | (Grass, Poison) | (Grass, Flying) | (Grass, Bug)
        | (Grass, Dragon) | (Grass, Steel) => NotVery,
        (Grass, _) => Neutral,

        (Electric, Ground) => Immune,
        (Electric, Water) | (Electric, Flying) => Super,
        (Electric, Electric) | (Electric, Grass) | (Electric, Dragon) => NotVery,
        (Electric, _) => Neutral,

        (Psychic, Dark) => Immune,
        (Psychic, Fighting) | (Psychic, Poison) => Super,
        (Psychic, Psychic) | (Psychic, Steel) => NotVery,
        (Psychic, _) => Neutral,

        (Ice, Grass) | (Ice, Ground) | (Ice, Flying) | (Ice, Dragon) => Super,
        (Ice, Fire) | (Ice, Water) | (Ice, Ice) | (Ice, Steel) => NotVery,
        (Ice, _) => Neutral,

        (Dragon, Fairy) => Immune,
        (Dragon, Dragon) => Super,
        (Dragon, Steel) => NotVery,
        (Dragon, _) => Neutral,

        (Dark, Psychic) | (Dark, Ghost) => Super,
        (Dark, Fighting) | (Dark, Dark) | (Dark, Fairy) => NotVery,
        (Dark, _) => Neutral,

        (Fairy, Fighting) | (Fairy, Dragon) | (Fairy, Dark) => Super,
        (Fairy, Fire) | (Fairy, Poison) | (Fairy, Steel) => NotVery,
        (Fairy, _) => Neutral,

        (Typeless, _) => Neutral,
    }
}
