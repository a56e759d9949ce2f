// models/src/feedback.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::resident::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackStatus {
    New,
    Viewed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackCategory {
    General,
    Complaint,
    Request,
}

/// `resident_name` is a denormalized snapshot so feedback stays readable
/// after the resident row changes or is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: Id,
    pub resident_id: Id,
    pub resident_name: String,
    pub message: String,
    pub date: NaiveDate,
    pub status: FeedbackStatus,
    pub category: FeedbackCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeedback {
    pub resident_id: Id,
    pub resident_name: String,
    pub message: String,
    pub date: NaiveDate,
    pub category: FeedbackCategory,
}

impl NewFeedback {
    pub fn into_feedback(self, id: Id) -> Feedback {
        Feedback {
            id,
            resident_id: self.resident_id,
            resident_name: self.resident_name,
            message: self.message,
            date: self.date,
            status: FeedbackStatus::New,
            category: self.category,
        }
    }
}
