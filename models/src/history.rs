// models/src/history.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::resident::Id;

/// Append-only assignment trail. Room and cot names are snapshots taken at
/// assignment time, not live references; an open entry (`end_date` None) is
/// the resident's current placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomHistory {
    pub id: Id,
    pub resident_id: Id,
    pub room_name: String,
    pub cot_name: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoomHistory {
    pub resident_id: Id,
    pub room_name: String,
    pub cot_name: String,
    pub start_date: NaiveDate,
}

impl NewRoomHistory {
    pub fn into_history(self, id: Id) -> RoomHistory {
        RoomHistory {
            id,
            resident_id: self.resident_id,
            room_name: self.room_name,
            cot_name: self.cot_name,
            start_date: self.start_date,
            end_date: None,
        }
    }
}
