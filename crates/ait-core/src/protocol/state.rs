//! Sequence state mask.
//!
//! The state carried by every emission is a small tagged value: one
//! [`Status`] plus named flags. It converts to and from the legacy bit
//! layout so display collaborators that bind on bits keep working:
//!
//! ```text
//! Loaded=1 GetReady=2 Active=4 Warning=8 Completed=16 Error=32 Start=64 Instant=128
//! ```
//!
//! `start` and `instant` are momentary: they only live for the tick that
//! set them.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Loaded,
    Active,
    Completed,
    Error,
}

/// A single flag of the legacy bit layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    Loaded,
    GetReady,
    Active,
    Warning,
    Completed,
    Error,
    Start,
    Instant,
}

impl Flag {
    pub const ALL: [Flag; 8] = [
        Flag::Loaded,
        Flag::GetReady,
        Flag::Active,
        Flag::Warning,
        Flag::Completed,
        Flag::Error,
        Flag::Start,
        Flag::Instant,
    ];

    pub const fn bit(self) -> u8 {
        match self {
            Flag::Loaded => 1,
            Flag::GetReady => 2,
            Flag::Active => 4,
            Flag::Warning => 8,
            Flag::Completed => 16,
            Flag::Error => 32,
            Flag::Start => 64,
            Flag::Instant => 128,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Flag::Loaded => "Loaded",
            Flag::GetReady => "GetReady",
            Flag::Active => "Active",
            Flag::Warning => "Warning",
            Flag::Completed => "Completed",
            Flag::Error => "Error",
            Flag::Start => "Start",
            Flag::Instant => "Instant",
        }
    }

    fn status(self) -> Option<Status> {
        match self {
            Flag::Loaded => Some(Status::Loaded),
            Flag::Active => Some(Status::Active),
            Flag::Completed => Some(Status::Completed),
            Flag::Error => Some(Status::Error),
            _ => None,
        }
    }
}

/// Composite state of a countdown or sequence at one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateMask {
    pub status: Status,
    /// Inside the get-ready window of a phase (or the countdown phase).
    pub get_ready: bool,
    /// Inside a configured warning window of an active phase.
    pub warning: bool,
    /// First tick of a phase.
    pub start: bool,
    /// Tick lands on a whole second (or begins a phase).
    pub instant: bool,
}

impl StateMask {
    pub const LOADED: StateMask = StateMask::plain(Status::Loaded);
    pub const ACTIVE: StateMask = StateMask::plain(Status::Active);
    pub const COMPLETED: StateMask = StateMask::plain(Status::Completed);
    pub const ERROR: StateMask = StateMask::plain(Status::Error);

    /// Active|Start|Instant
    pub const ACTIVE_START: StateMask = StateMask {
        status: Status::Active,
        get_ready: false,
        warning: false,
        start: true,
        instant: true,
    };

    /// Active|GetReady
    pub const ACTIVE_GET_READY: StateMask = StateMask {
        status: Status::Active,
        get_ready: true,
        warning: false,
        start: false,
        instant: false,
    };

    /// Active|GetReady|Instant
    pub const ACTIVE_GET_READY_INSTANT: StateMask = StateMask {
        status: Status::Active,
        get_ready: true,
        warning: false,
        start: false,
        instant: true,
    };

    const fn plain(status: Status) -> Self {
        Self {
            status,
            get_ready: false,
            warning: false,
            start: false,
            instant: false,
        }
    }

    pub fn has(&self, flag: Flag) -> bool {
        match flag {
            Flag::GetReady => self.get_ready,
            Flag::Warning => self.warning,
            Flag::Start => self.start,
            Flag::Instant => self.instant,
            status_flag => status_flag.status() == Some(self.status),
        }
    }

    /// True when every flag of `other` is present in `self`.
    pub fn contains(&self, other: StateMask) -> bool {
        self.bits() & other.bits() == other.bits()
    }

    /// Add a flag. Status flags replace the current status.
    pub fn with(mut self, flag: Flag) -> Self {
        match flag {
            Flag::GetReady => self.get_ready = true,
            Flag::Warning => self.warning = true,
            Flag::Start => self.start = true,
            Flag::Instant => self.instant = true,
            status_flag => {
                if let Some(status) = status_flag.status() {
                    self.status = status;
                }
            }
        }
        self
    }

    /// Remove modifier flags. The status is not a removable flag and is
    /// left as is.
    pub fn without(mut self, flags: &[Flag]) -> Self {
        for flag in flags {
            match flag {
                Flag::GetReady => self.get_ready = false,
                Flag::Warning => self.warning = false,
                Flag::Start => self.start = false,
                Flag::Instant => self.instant = false,
                _ => {}
            }
        }
        self
    }

    /// Clear `start` and `instant`.
    pub fn clear_momentary(self) -> Self {
        self.without(&[Flag::Start, Flag::Instant])
    }

    /// The mask a view binds on: momentary flags and warning stripped.
    pub fn view(self) -> Self {
        self.without(&[Flag::Start, Flag::Instant, Flag::Warning])
    }

    pub fn bits(&self) -> u8 {
        Flag::ALL
            .iter()
            .filter(|flag| self.has(**flag))
            .fold(0, |acc, flag| acc | flag.bit())
    }

    /// Decode the legacy bit layout. Exactly one status bit must be set.
    pub fn from_bits(bits: u8) -> Option<Self> {
        let mut status = None;
        let mut mask = StateMask::LOADED;
        for flag in Flag::ALL {
            if bits & flag.bit() == 0 {
                continue;
            }
            match flag.status() {
                Some(s) => {
                    if status.replace(s).is_some() {
                        return None;
                    }
                }
                None => mask = mask.with(flag),
            }
        }
        mask.status = status?;
        Some(mask)
    }
}

impl Default for StateMask {
    fn default() -> Self {
        StateMask::LOADED
    }
}

impl fmt::Display for StateMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = Flag::ALL
            .iter()
            .filter(|flag| self.has(**flag))
            .map(|flag| flag.label())
            .collect();
        write!(f, "{}", labels.join("|"))
    }
}
