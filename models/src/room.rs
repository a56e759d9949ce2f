// models/src/room.rs

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::resident::Id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: Id,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRoom {
    pub name: String,
}

impl NewRoom {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        Ok(())
    }
}

/// A single sleeping space inside a room; the unit of occupancy.
/// `resident_id` is the back half of the resident<->cot link and is only
/// ever written by the occupancy manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cot {
    pub id: Id,
    pub name: String,
    pub room_id: Id,
    pub resident_id: Option<Id>,
}

impl Cot {
    pub fn is_occupied(&self) -> bool {
        self.resident_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCot {
    pub name: String,
    pub room_id: Id,
}

impl NewCot {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        Ok(())
    }
}
