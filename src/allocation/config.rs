//! Allocation configuration.

use serde::{Deserialize, Serialize};

use super::types::RoomId;
use crate::error::{Error, Result};

/// Configuration for the room allocation engine.
///
/// # Examples
///
/// ```
/// use u_roomalloc::allocation::AllocationConfig;
///
/// let config = AllocationConfig::default().with_room_size(3);
/// assert_eq!(config.room_size, 3);
/// assert_eq!(config.first_room_id, 1);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// Maximum number of records sharing one room.
    pub room_size: usize,

    /// Id given to the first room created by a run.
    pub first_room_id: u64,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            room_size: 4,
            first_room_id: 1,
        }
    }
}

impl AllocationConfig {
    /// Sets the room capacity.
    pub fn with_room_size(mut self, n: usize) -> Self {
        self.room_size = n;
        self
    }

    /// Sets the id of the first generated room.
    pub fn with_first_room_id(mut self, id: u64) -> Self {
        self.first_room_id = id;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.room_size == 0 {
            return Err(Error::InvalidConfig("room_size must be at least 1".into()));
        }
        if self.first_room_id == 0 {
            return Err(Error::InvalidConfig(
                "first_room_id must be positive".into(),
            ));
        }
        if self.first_room_id > RoomId::MAX_FIRST.get() {
            return Err(Error::InvalidConfig(format!(
                "first_room_id must be at most {}",
                RoomId::MAX_FIRST
            )));
        }
        Ok(())
    }
}
