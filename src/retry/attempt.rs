use std::fmt;

/// Which send of a request is in flight. A request gets at most one replay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attempt {
    Original,
    Replay,
}

impl Attempt {
    /// Only the original send may enter the refresh protocol.
    pub fn may_refresh(self) -> bool {
        matches!(self, Attempt::Original)
    }

    pub fn number(self) -> u8 {
        match self {
            Attempt::Original => 1,
            Attempt::Replay => 2,
        }
    }
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attempt::Original => write!(f, "original"),
            Attempt::Replay => write!(f, "replay"),
        }
    }
}
