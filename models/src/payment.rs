// models/src/payment.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::resident::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Paid,
    Due,
    Overdue,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PaymentStatus::Paid => write!(f, "Paid"),
            PaymentStatus::Due => write!(f, "Due"),
            PaymentStatus::Overdue => write!(f, "Overdue"),
        }
    }
}

impl PaymentStatus {
    /// Creation-time status: a due date already in the past starts Overdue,
    /// today or a future date starts Due. Paid is never assigned here.
    pub fn for_due_date(due: NaiveDate, today: NaiveDate) -> Self {
        if due < today {
            PaymentStatus::Overdue
        } else {
            PaymentStatus::Due
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Id,
    pub resident_id: Id,
    pub amount: i64,
    /// Due date.
    pub date: NaiveDate,
    pub status: PaymentStatus,
    pub description: String,
}

impl Payment {
    /// Derived read-side status: a stored Due whose date has passed reads as
    /// Overdue. There is no persisted Due->Overdue sweep; the stored status
    /// only changes on explicit confirmation.
    pub fn effective_status(&self, today: NaiveDate) -> PaymentStatus {
        match self.status {
            PaymentStatus::Due if self.date < today => PaymentStatus::Overdue,
            other => other,
        }
    }
}

/// Creation DTO; status is computed from the due date at insert time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub resident_id: Id,
    pub amount: i64,
    pub date: NaiveDate,
    pub description: String,
}

impl NewPayment {
    pub fn into_payment(self, id: Id, today: NaiveDate) -> Payment {
        let status = PaymentStatus::for_due_date(self.date, today);
        Payment {
            id,
            resident_id: self.resident_id,
            amount: self.amount,
            date: self.date,
            status,
            description: self.description,
        }
    }
}
