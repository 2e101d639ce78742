//! A deterministic, turn-based battle engine.
//!
//! Battles are seeded: the same seed and the same decision sequence
//! reproduce the same battle, log line for log line. The engine never
//! blocks. It hands out [`ChoiceRequest`]s describing what each side owes,
//! accepts decisions through [`Battle::choose`], and runs the battle
//! forward as far as the outstanding requests allow.

pub mod battle;
pub mod errors;
pub mod pokemon;
pub mod teams;

// The working surface most callers need, importable from the crate root.
pub use battle::choices::{ChoiceRequest, Decision, RequestState};
pub use battle::engine::TeamSheet;
pub use battle::log::{BattleLog, LogEntry};
pub use battle::pokemon::MonId;
pub use battle::rng::{Prng, PrngSeed};
pub use battle::state::{Battle, Outcome};
pub use errors::{BattleError, BattleInitError, BattleResult, ChoiceError, ChoiceResult};
pub use pokemon::{calc_hp, calc_stat, PokemonSet};

// Static data lives in its own crate; re-export the types that appear in
// this crate's public signatures.
pub use dex::{Dex, FormatRules, GameType, Id, StatName, Type};
