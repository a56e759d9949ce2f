// models/src/resident.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ValidationError;

/// Gateway-assigned record id, shared by every collection.
pub type Id = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResidentRole {
    Admin,
    Resident,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResidentType {
    Student,
    #[serde(rename = "Working Women")]
    WorkingWomen,
}

impl fmt::Display for ResidentType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResidentType::Student => write!(f, "Student"),
            ResidentType::WorkingWomen => write!(f, "Working Women"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResidentStatus {
    Active,
    Vacated,
    Deleted,
}

impl fmt::Display for ResidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResidentStatus::Active => write!(f, "Active"),
            ResidentStatus::Vacated => write!(f, "Vacated"),
            ResidentStatus::Deleted => write!(f, "Deleted"),
        }
    }
}

/// Three independent meal opt-ins; no plan hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealPlan {
    pub breakfast: bool,
    pub lunch: bool,
    pub dinner: bool,
}

/// Stored resident row. `cot_id` is meaningful only while `status` is
/// Active; the occupancy manager clears it when a resident vacates or is
/// deleted so the forward and back references never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resident {
    pub id: Id,
    pub account_id: Option<String>,
    pub role: ResidentRole,
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub resident_type: ResidentType,
    pub phone: Option<String>,
    pub email: String,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub national_id: Option<String>,
    pub cot_id: Option<Id>,
    pub rent: i64,
    pub deposit_amount: i64,
    pub meal_plan: MealPlan,
    pub status: ResidentStatus,
}

/// DTO for creating or updating a resident; everything but the id. New
/// residents always start Active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResident {
    #[serde(default)]
    pub account_id: Option<String>,
    pub role: ResidentRole,
    pub name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub resident_type: ResidentType,
    #[serde(default)]
    pub phone: Option<String>,
    pub email: String,
    #[serde(default)]
    pub guardian_name: Option<String>,
    #[serde(default)]
    pub guardian_phone: Option<String>,
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub cot_id: Option<Id>,
    pub rent: i64,
    #[serde(default)]
    pub deposit_amount: i64,
    #[serde(default)]
    pub meal_plan: MealPlan,
}

impl NewResident {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::MissingField("email"));
        }
        if self.rent < 0 {
            return Err(ValidationError::InvalidValue {
                field: "rent",
                reason: "must not be negative".to_string(),
            });
        }
        Ok(())
    }

    /// Materializes the stored row once the gateway has assigned an id.
    pub fn into_resident(self, id: Id) -> Resident {
        Resident {
            id,
            account_id: self.account_id,
            role: self.role,
            name: self.name,
            date_of_birth: self.date_of_birth,
            resident_type: self.resident_type,
            phone: self.phone,
            email: self.email,
            guardian_name: self.guardian_name,
            guardian_phone: self.guardian_phone,
            national_id: self.national_id,
            cot_id: self.cot_id,
            rent: self.rent,
            deposit_amount: self.deposit_amount,
            meal_plan: self.meal_plan,
            status: ResidentStatus::Active,
        }
    }
}
