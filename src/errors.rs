use dex::Id;
use std::fmt;

/// Main error type for the battle engine.
///
/// Expected in-battle outcomes (misses, immunities, failed moves) are
/// values in the pipeline's result types, never errors. Only the three
/// cases below surface as `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleError {
    /// The battle could not be constructed or started.
    Init(BattleInitError),
    /// A submitted decision was illegal; state is unchanged and the same
    /// request stands.
    Choice(ChoiceError),
    /// The engine observed a broken internal invariant. The battle is
    /// aborted; its determinism guarantee no longer holds.
    Violation(EngineViolation),
}

/// Construction-time failures. All of these are fatal to `Battle::new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleInitError {
    /// The seed string did not match any accepted format.
    BadSeed(String),
    /// A set referenced a species the Dex does not know.
    UnknownSpecies(Id),
    /// A set referenced a move the Dex does not know.
    UnknownMove(Id),
    /// A side's team is empty.
    EmptyTeam(usize),
    /// A side's team exceeds the format's team size.
    TeamTooLarge { side: usize, size: usize, max: usize },
    /// A set's level exceeds the format's cap.
    OverLevelCap { level: u8, cap: u8 },
}

/// Rejected player decisions. Recoverable: the engine re-requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceError {
    /// No decision is being requested from this side right now.
    NotRequested,
    /// The side must decide for every slot the request names.
    WrongDecisionCount { expected: usize, got: usize },
    /// Decision kind does not answer the current request.
    WrongKind,
    /// Move slot index out of range.
    InvalidMoveSlot(usize),
    /// The move has no PP left.
    NoPp(Id),
    /// The move is disabled (choice lock or an in-progress move).
    MoveDisabled(Id),
    /// The Pokemon is locked into a move and must use it.
    MustUseLockedMove(Id),
    /// The Pokemon must spend this turn recharging.
    MustRecharge,
    /// Switch target index out of range.
    InvalidSwitchTarget(usize),
    /// Switch target is already active.
    AlreadyActive(usize),
    /// Switch target has fainted.
    FaintedSwitchTarget(usize),
    /// Mega/Z/tera is not available to this side right now.
    MechanicUnavailable(&'static str),
    /// Chosen target slot is not a legal target for the move.
    InvalidTarget,
    /// Team order must be a permutation of the full team.
    BadTeamOrder,
    /// The battle is over.
    BattleEnded,
}

/// Broken engine invariants. Fatal: the battle aborts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineViolation {
    /// A queued action referenced a side/slot with no active Pokemon and
    /// eligibility re-validation did not catch it.
    MissingActive { side: usize, slot: usize },
    /// An action referenced a team index outside the roster.
    DanglingPokemon { side: usize, index: usize },
    /// The queue or request bookkeeping contradicts itself.
    InconsistentState(String),
}

impl fmt::Display for BattleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleError::Init(err) => write!(f, "battle setup error: {}", err),
            BattleError::Choice(err) => write!(f, "illegal decision: {}", err),
            BattleError::Violation(err) => write!(f, "engine invariant violated: {}", err),
        }
    }
}

impl fmt::Display for BattleInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleInitError::BadSeed(seed) => write!(f, "unrecognized seed format: {:?}", seed),
            BattleInitError::UnknownSpecies(id) => write!(f, "unknown species: {}", id),
            BattleInitError::UnknownMove(id) => write!(f, "unknown move: {}", id),
            BattleInitError::EmptyTeam(side) => write!(f, "side {} has an empty team", side + 1),
            BattleInitError::TeamTooLarge { side, size, max } => {
                write!(f, "side {} team has {} members, max {}", side + 1, size, max)
            }
            BattleInitError::OverLevelCap { level, cap } => {
                write!(f, "level {} exceeds the format cap of {}", level, cap)
            }
        }
    }
}

impl fmt::Display for ChoiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChoiceError::NotRequested => write!(f, "no decision requested"),
            ChoiceError::WrongDecisionCount { expected, got } => {
                write!(f, "expected {} decisions, got {}", expected, got)
            }
            ChoiceError::WrongKind => write!(f, "decision does not answer the current request"),
            ChoiceError::InvalidMoveSlot(slot) => write!(f, "invalid move slot: {}", slot),
            ChoiceError::NoPp(id) => write!(f, "{} has no PP left", id),
            ChoiceError::MoveDisabled(id) => write!(f, "{} is disabled", id),
            ChoiceError::MustUseLockedMove(id) => write!(f, "locked into {}", id),
            ChoiceError::MustRecharge => write!(f, "must recharge this turn"),
            ChoiceError::InvalidSwitchTarget(index) => {
                write!(f, "invalid switch target: {}", index)
            }
            ChoiceError::AlreadyActive(index) => {
                write!(f, "switch target {} is already active", index)
            }
            ChoiceError::FaintedSwitchTarget(index) => {
                write!(f, "switch target {} has fainted", index)
            }
            ChoiceError::MechanicUnavailable(which) => {
                write!(f, "{} is not available", which)
            }
            ChoiceError::InvalidTarget => write!(f, "illegal target slot"),
            ChoiceError::BadTeamOrder => write!(f, "team order must use each slot exactly once"),
            ChoiceError::BattleEnded => write!(f, "the battle has ended"),
        }
    }
}

impl fmt::Display for EngineViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineViolation::MissingActive { side, slot } => {
                write!(f, "no active Pokemon at side {} slot {}", side + 1, slot)
            }
            EngineViolation::DanglingPokemon { side, index } => {
                write!(f, "side {} has no team member {}", side + 1, index)
            }
            EngineViolation::InconsistentState(details) => {
                write!(f, "inconsistent state: {}", details)
            }
        }
    }
}

impl std::error::Error for BattleError {}
impl std::error::Error for BattleInitError {}
impl std::error::Error for ChoiceError {}
impl std::error::Error for EngineViolation {}

impl From<BattleInitError> for BattleError {
    fn from(err: BattleInitError) -> Self {
        BattleError::Init(err)
    }
}

impl From<ChoiceError> for BattleError {
    fn from(err: ChoiceError) -> Self {
        BattleError::Choice(err)
    }
}

impl From<EngineViolation> for BattleError {
    fn from(err: EngineViolation) -> Self {
        BattleError::Violation(err)
    }
}

/// Type alias for Results using BattleError.
pub type BattleResult<T> = Result<T, BattleError>;

/// Type alias for Results using ChoiceError.
pub type ChoiceResult<T> = Result<T, ChoiceError>;
