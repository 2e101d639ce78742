use crate::ids::Id;
use crate::species::BoostName;
use crate::types::Type;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

/// Who a move aims at. Slot choice only matters for `Normal`/`Any` targets
/// in doubles; spread and side targets resolve without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveTarget {
    /// One adjacent foe, chosen (or redirected) at execution time.
    Normal,
    /// A random adjacent foe, never chosen.
    RandomNormal,
    /// The user itself.
    User,
    /// Every adjacent Pokemon, foes and ally.
    AllAdjacent,
    /// Every adjacent foe.
    AllAdjacentFoes,
    /// The user's side of the field.
    AllySide,
    /// The opposing side of the field.
    FoeSide,
    /// The whole field.
    All,
}

impl Default for MoveTarget {
    fn default() -> MoveTarget {
        MoveTarget::Normal
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveFlags {
    /// Makes contact (contact-punishing abilities key off this).
    #[serde(default)]
    pub contact: bool,
    /// Blocked by protection volatiles.
    #[serde(default)]
    pub protect: bool,
    /// Two-turn move: charges (semi-invulnerable) on the first turn.
    #[serde(default)]
    pub charge: bool,
    /// Forces a recharge turn after a successful use.
    #[serde(default)]
    pub recharge: bool,
}

/// Hit-count declaration for multi-hit moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiHit {
    Fixed(u8),
    /// Inclusive range; 2..=5 uses the weighted [2,2,3,3,4,5] sample.
    Range(u8, u8),
}

pub type BoostList = Vec<(BoostName, i8)>;

/// A chance-based rider resolved per target after a damaging hit lands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecondaryEffect {
    /// Percent chance, rolled once per struck target per hit.
    pub chance: u8,
    #[serde(default)]
    pub status: Option<Id>,
    #[serde(default)]
    pub volatile_status: Option<Id>,
    #[serde(default)]
    pub boosts: Option<BoostList>,
}

/// Static move record. Everything the pipeline needs is declared here;
/// behavior lives in the engine, keyed off these fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveData {
    pub name: String,
    pub num: u16,
    #[serde(rename = "type")]
    pub move_type: Type,
    pub category: MoveCategory,
    #[serde(default)]
    pub base_power: u16,
    /// `None` means the move never rolls accuracy.
    #[serde(default)]
    pub accuracy: Option<u8>,
    pub pp: u8,
    #[serde(default)]
    pub priority: i8,
    #[serde(default)]
    pub target: MoveTarget,
    #[serde(default)]
    pub flags: MoveFlags,
    /// Crit stage contributed by the move itself (1 = normal).
    #[serde(default = "default_crit_ratio")]
    pub crit_ratio: u8,
    #[serde(default)]
    pub multihit: Option<MultiHit>,
    /// Fraction of damage dealt healed back, numerator/denominator.
    #[serde(default)]
    pub drain: Option<(u8, u8)>,
    /// Fraction of damage dealt taken as recoil, numerator/denominator.
    #[serde(default)]
    pub recoil: Option<(u8, u8)>,
    /// Quarter-max-HP recoil charged whether or not the move dealt damage.
    #[serde(default)]
    pub struggle_recoil: bool,
    #[serde(default)]
    pub secondaries: Vec<SecondaryEffect>,
    /// Primary status applied to the target (status moves).
    #[serde(default)]
    pub status: Option<Id>,
    /// Primary volatile applied to the target.
    #[serde(default)]
    pub volatile_status: Option<Id>,
    /// Primary stage changes; applied to the user when `target` is `User`.
    #[serde(default)]
    pub boosts: Option<BoostList>,
    /// Fraction of max HP restored to the user.
    #[serde(default)]
    pub heal: Option<(u8, u8)>,
    #[serde(default)]
    pub side_condition: Option<Id>,
    #[serde(default)]
    pub weather: Option<Id>,
    #[serde(default)]
    pub terrain: Option<Id>,
    #[serde(default)]
    pub pseudo_weather: Option<Id>,
    /// Drags the target out for a random replacement.
    #[serde(default)]
    pub force_switch: bool,
    /// Switches the user out after the move resolves.
    #[serde(default)]
    pub self_switch: bool,
    /// Transfers the target's positive boosts to the user before damage.
    #[serde(default)]
    pub steals_boosts: bool,
    /// Cannot bring the target below 1 HP.
    #[serde(default)]
    pub no_faint: bool,
    /// Hits through type immunities (status moves only check immunity when
    /// this is false).
    #[serde(default)]
    pub ignore_immunity: bool,
    /// Protection move using the shared consecutive-use counter.
    #[serde(default)]
    pub stall: bool,
    /// Lands through protection and removes it.
    #[serde(default)]
    pub breaks_protect: bool,
}

fn default_crit_ratio() -> u8 {
    1
}

impl MoveData {
    pub fn is_damaging(&self) -> bool {
        self.category != MoveCategory::Status
    }

    /// Spread moves can strike more than one target in doubles.
    pub fn is_spread(&self) -> bool {
        matches!(
            self.target,
            MoveTarget::AllAdjacent | MoveTarget::AllAdjacentFoes
        )
    }
}
