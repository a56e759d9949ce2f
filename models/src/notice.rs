// models/src/notice.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::resident::Id;

/// Admin-authored broadcast, read-only to residents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub id: Id,
    pub title: String,
    pub content: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotice {
    pub title: String,
    pub content: String,
    pub date: NaiveDate,
}

impl NewNotice {
    pub fn into_notice(self, id: Id) -> Notice {
        Notice {
            id,
            title: self.title,
            content: self.content,
            date: self.date,
        }
    }
}
