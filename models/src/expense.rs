// models/src/expense.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ValidationError;
use crate::resident::Id;

/// Closed category set; serialized with the display labels the ledger has
/// always used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpenseCategory {
    #[serde(rename = "Food Supplies")]
    FoodSupplies,
    Utilities,
    Maintenance,
    #[serde(rename = "Staff Salary")]
    StaffSalary,
    Miscellaneous,
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            ExpenseCategory::FoodSupplies => "Food Supplies",
            ExpenseCategory::Utilities => "Utilities",
            ExpenseCategory::Maintenance => "Maintenance",
            ExpenseCategory::StaffSalary => "Staff Salary",
            ExpenseCategory::Miscellaneous => "Miscellaneous",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for ExpenseCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Food Supplies" => Ok(ExpenseCategory::FoodSupplies),
            "Utilities" => Ok(ExpenseCategory::Utilities),
            "Maintenance" => Ok(ExpenseCategory::Maintenance),
            "Staff Salary" => Ok(ExpenseCategory::StaffSalary),
            "Miscellaneous" => Ok(ExpenseCategory::Miscellaneous),
            other => Err(ValidationError::InvalidValue {
                field: "category",
                reason: format!("unknown expense category: {}", other),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Id,
    pub date: NaiveDate,
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: i64,
}

impl NewExpense {
    pub fn into_expense(self, id: Id) -> Expense {
        Expense {
            id,
            date: self.date,
            category: self.category,
            description: self.description,
            amount: self.amount,
        }
    }
}
