use serde::{Deserialize, Serialize};

/// Persistent identity assigned to a detected object by the external tracker.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TrackId(u32);

impl TrackId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the two statistics slots a selected player is assigned to.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    pub const ALL: [PlayerSlot; 2] = [PlayerSlot::One, PlayerSlot::Two];

    /// Zero-based position of the slot, for indexing per-slot arrays.
    pub fn index(&self) -> usize {
        match self {
            PlayerSlot::One => 0,
            PlayerSlot::Two => 1,
        }
    }

    /// Returns the other slot.
    pub fn opponent(&self) -> Self {
        match self {
            PlayerSlot::One => PlayerSlot::Two,
            PlayerSlot::Two => PlayerSlot::One,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(PlayerSlot::One),
            1 => Some(PlayerSlot::Two),
            _ => None,
        }
    }
}

impl std::fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerSlot::One => write!(f, "player 1"),
            PlayerSlot::Two => write!(f, "player 2"),
        }
    }
}
