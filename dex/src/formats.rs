use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameType {
    Singles,
    Doubles,
}

impl GameType {
    /// Active slots per side.
    pub fn active_per_side(&self) -> usize {
        match self {
            GameType::Singles => 1,
            GameType::Doubles => 2,
        }
    }
}

/// Format-level constraints consulted at battle start and switch-in.
/// These are data, not behavior: the engine reads them, never derives them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatRules {
    pub game_type: GameType,
    pub team_size: usize,
    pub level_cap: u8,
    pub team_preview: bool,
    pub allow_mega: bool,
    pub allow_z: bool,
    pub allow_tera: bool,
}

impl FormatRules {
    /// Current-generation singles: terastallization only.
    pub fn gen9_singles() -> FormatRules {
        FormatRules {
            game_type: GameType::Singles,
            team_size: 6,
            level_cap: 100,
            team_preview: false,
            allow_mega: false,
            allow_z: false,
            allow_tera: true,
        }
    }

    /// Current-generation doubles, with team preview.
    pub fn gen9_doubles() -> FormatRules {
        FormatRules {
            game_type: GameType::Doubles,
            team_preview: true,
            ..FormatRules::gen9_singles()
        }
    }

    /// Kitchen-sink rules for exhibition play: every one-time mechanic on.
    pub fn anything_goes() -> FormatRules {
        FormatRules {
            allow_mega: true,
            allow_z: true,
            ..FormatRules::gen9_singles()
        }
    }
}
