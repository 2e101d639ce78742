use crate::battle::pokemon::StatusId;
use dex::BoostName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything observable that happens in a battle, in order.
///
/// Entries carry resolved display names so a transcript stands on its own;
/// two battles are identical exactly when their serialized logs are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogEntry {
    // Lifecycle
    BattleStart {
        seed: String,
        format: String,
    },
    TeamPreview,
    TurnStart {
        turn: u32,
    },
    Win {
        side: usize,
        name: String,
    },
    Tie,

    // Switching
    SwitchIn {
        side: usize,
        name: String,
        level: u8,
        hp: u16,
        max_hp: u16,
        /// True when the switch was forced by an opposing move.
        dragged: bool,
    },
    SwitchOut {
        side: usize,
        name: String,
    },

    // Moves
    MoveUsed {
        side: usize,
        user: String,
        move_name: String,
    },
    MoveMissed {
        user: String,
        target: String,
    },
    MoveFailed {
        user: String,
    },
    /// The charging turn of a two-turn move.
    MovePrepare {
        user: String,
        move_name: String,
    },
    HitCount {
        hits: u8,
    },
    CriticalHit {
        target: String,
    },
    Effectiveness {
        target: String,
        /// Net multiplier over both defending types: 0.25 to 4.0, or 0.
        multiplier: f64,
    },

    // HP changes
    Damage {
        target: String,
        amount: u16,
        remaining_hp: u16,
        max_hp: u16,
        /// Effect responsible when it was not the move itself, e.g.
        /// "its burn", "recoil", "the sandstorm", "Stealth Rock".
        source: Option<String>,
    },
    Heal {
        target: String,
        amount: u16,
        new_hp: u16,
        source: Option<String>,
    },
    Faint {
        name: String,
    },

    // Statuses and volatiles
    StatusApplied {
        target: String,
        status: StatusId,
    },
    StatusCured {
        target: String,
        status: StatusId,
    },
    Cant {
        name: String,
        reason: String,
    },
    VolatileApplied {
        target: String,
        volatile: String,
    },
    VolatileEnded {
        target: String,
        volatile: String,
    },

    // Stat stages
    BoostChanged {
        target: String,
        stat: BoostName,
        delta: i8,
        stage: i8,
    },
    BoostsStolen {
        user: String,
        target: String,
    },
    BoostBlocked {
        target: String,
        effect: String,
    },

    // Side conditions and field
    SideConditionStart {
        side: usize,
        condition: String,
    },
    SideConditionEnd {
        side: usize,
        condition: String,
    },
    WeatherStart {
        weather: String,
    },
    WeatherEnd {
        weather: String,
    },
    FieldStart {
        effect: String,
    },
    FieldEnd {
        effect: String,
    },

    /// A protection effect turned a hit away.
    Protected {
        name: String,
    },

    // Abilities, items, one-time mechanics
    AbilityActivated {
        name: String,
        ability: String,
    },
    ItemActivated {
        name: String,
        item: String,
    },
    ItemConsumed {
        name: String,
        item: String,
    },
    MegaEvolve {
        name: String,
        forme: String,
    },
    Terastallize {
        name: String,
        tera_type: String,
    },
    ZPower {
        name: String,
        move_name: String,
    },
    MustRecharge {
        name: String,
    },
}

impl LogEntry {
    /// Human-readable line for this entry, or None for entries that exist
    /// only for machine consumers.
    pub fn text(&self) -> Option<String> {
        match self {
            LogEntry::BattleStart { format, .. } => Some(format!("Battle started ({})", format)),
            LogEntry::TeamPreview => Some("Team preview".to_string()),
            LogEntry::TurnStart { turn } => Some(format!("=== Turn {} ===", turn)),
            LogEntry::Win { name, .. } => Some(format!("{} won the battle!", name)),
            LogEntry::Tie => Some("The battle ended in a tie!".to_string()),

            LogEntry::SwitchIn {
                name, dragged: true, ..
            } => Some(format!("{} was dragged out!", name)),
            LogEntry::SwitchIn { name, .. } => Some(format!("Go! {}!", name)),
            LogEntry::SwitchOut { name, .. } => Some(format!("{} withdrew!", name)),

            LogEntry::MoveUsed {
                user, move_name, ..
            } => Some(format!("{} used {}!", user, move_name)),
            LogEntry::MoveMissed { user, .. } => Some(format!("{}'s attack missed!", user)),
            LogEntry::MoveFailed { .. } => Some("But it failed!".to_string()),
            LogEntry::MovePrepare {
                user, move_name, ..
            } => Some(format!("{} is preparing {}!", user, move_name)),
            LogEntry::HitCount { hits } => Some(format!("Hit {} time(s)!", hits)),
            LogEntry::CriticalHit { .. } => Some("A critical hit!".to_string()),
            LogEntry::Effectiveness { multiplier, .. } => match *multiplier {
                m if m == 0.0 => Some("It had no effect!".to_string()),
                m if m > 1.0 => Some("It's super effective!".to_string()),
                m if m < 1.0 => Some("It's not very effective...".to_string()),
                _ => None,
            },

            LogEntry::Damage {
                target,
                amount,
                source: Some(source),
                ..
            } => Some(format!("{} took {} damage from {}!", target, amount, source)),
            LogEntry::Damage { target, amount, .. } => {
                Some(format!("{} took {} damage!", target, amount))
            }
            LogEntry::Heal { target, amount, .. } => {
                Some(format!("{} recovered {} HP!", target, amount))
            }
            LogEntry::Faint { name } => Some(format!("{} fainted!", name)),

            LogEntry::StatusApplied { target, status } => {
                Some(format!("{} was afflicted with {}!", target, status))
            }
            LogEntry::StatusCured { target, status } => {
                Some(format!("{} recovered from {}!", target, status))
            }
            LogEntry::Cant { name, reason } => Some(format!("{} can't move ({})!", name, reason)),
            LogEntry::VolatileApplied { target, volatile } => {
                Some(format!("{} was affected by {}!", target, volatile))
            }
            LogEntry::VolatileEnded { target, volatile } => {
                Some(format!("{}'s {} wore off.", target, volatile))
            }

            LogEntry::BoostChanged {
                target,
                stat,
                delta,
                ..
            } => {
                let text = match delta {
                    2.. => "rose sharply",
                    1 => "rose",
                    0 => "won't go any further",
                    -1 => "fell",
                    _ => "fell harshly",
                };
                Some(format!("{}'s {} {}!", target, stat, text))
            }
            LogEntry::BoostsStolen { user, target } => {
                Some(format!("{} stole {}'s stat changes!", user, target))
            }
            LogEntry::BoostBlocked { target, effect } => {
                Some(format!("{}'s {} prevented the stat change!", target, effect))
            }

            LogEntry::SideConditionStart { condition, side } => {
                Some(format!("{} took effect on side {}!", condition, side + 1))
            }
            LogEntry::SideConditionEnd { condition, side } => {
                Some(format!("{} faded from side {}.", condition, side + 1))
            }
            LogEntry::WeatherStart { weather } => Some(format!("The weather became {}!", weather)),
            LogEntry::WeatherEnd { weather } => Some(format!("The {} subsided.", weather)),
            LogEntry::FieldStart { effect } => Some(format!("{} began!", effect)),
            LogEntry::FieldEnd { effect } => Some(format!("{} ended.", effect)),

            LogEntry::Protected { name } => Some(format!("{} protected itself!", name)),

            LogEntry::AbilityActivated { name, ability } => {
                Some(format!("{}'s {} activated!", name, ability))
            }
            LogEntry::ItemActivated { name, item } => {
                Some(format!("{}'s {} activated!", name, item))
            }
            LogEntry::ItemConsumed { name, item } => {
                Some(format!("{} used up its {}!", name, item))
            }
            LogEntry::MegaEvolve { name, forme } => {
                Some(format!("{} mega evolved into {}!", name, forme))
            }
            LogEntry::Terastallize { name, tera_type } => {
                Some(format!("{} terastallized into the {} type!", name, tera_type))
            }
            LogEntry::ZPower { name, move_name } => Some(format!(
                "{} unleashed its full-force Z-Move, {}!",
                name, move_name
            )),
            LogEntry::MustRecharge { name } => Some(format!("{} must recharge!", name)),
        }
    }
}

/// Ordered collection of everything that happened, growable only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleLog {
    entries: Vec<LogEntry>,
}

impl BattleLog {
    pub fn new() -> BattleLog {
        BattleLog::default()
    }

    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries appended at or after `mark`, for incremental consumers.
    pub fn since(&self, mark: usize) -> &[LogEntry] {
        &self.entries[mark.min(self.entries.len())..]
    }

    /// The human-readable transcript, skipping machine-only entries.
    pub fn render(&self) -> Vec<String> {
        self.entries.iter().filter_map(|e| e.text()).collect()
    }

    /// Canonical serialized form; byte-equal between identical battles.
    pub fn to_json(&self) -> String {
        // Log entries contain only serializable plain data.
        serde_json::to_string(&self.entries).unwrap_or_default()
    }
}

impl fmt::Display for BattleLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.render() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
