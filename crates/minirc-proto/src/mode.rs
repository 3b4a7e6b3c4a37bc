//! Channel mode changes.
//!
//! The server understands exactly four flag strings: `+b`, `-b`, `+m`, `-m`.
//! Each takes a nickname target.

use std::fmt;
use std::str::FromStr;

use crate::error::MessageParseError;

/// What a mode flag controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeFlag {
    /// `b` - banned-nickname list.
    Ban,
    /// `m` - muted-nickname list.
    Mute,
}

impl ModeFlag {
    fn letter(self) -> char {
        match self {
            ModeFlag::Ban => 'b',
            ModeFlag::Mute => 'm',
        }
    }
}

/// A single parsed mode change (`+b`, `-b`, `+m`, `-m`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeChange {
    /// True for `+`, false for `-`.
    pub grant: bool,
    /// Which list the change applies to.
    pub flag: ModeFlag,
}

impl FromStr for ModeChange {
    type Err = MessageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+b" => Ok(ModeChange { grant: true, flag: ModeFlag::Ban }),
            "-b" => Ok(ModeChange { grant: false, flag: ModeFlag::Ban }),
            "+m" => Ok(ModeChange { grant: true, flag: ModeFlag::Mute }),
            "-m" => Ok(ModeChange { grant: false, flag: ModeFlag::Mute }),
            _ => Err(MessageParseError::InvalidModeString { raw: s.to_string() }),
        }
    }
}

impl fmt::Display for ModeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.grant { '+' } else { '-' };
        write!(f, "{}{}", sign, self.flag.letter())
    }
}
