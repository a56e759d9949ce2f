// models/src/lib.rs
//
// Entity types and the shared error taxonomy for the hostel backend.

pub mod admin;
pub mod errors;
pub mod expense;
pub mod feedback;
pub mod history;
pub mod notice;
pub mod payment;
pub mod resident;
pub mod room;
pub mod stats;

pub use admin::{AdminAccount, NewAdmin};
pub use errors::{AuthFailure, HostelError, ValidationError};
pub use expense::{Expense, ExpenseCategory, NewExpense};
pub use feedback::{Feedback, FeedbackCategory, FeedbackStatus, NewFeedback};
pub use history::{NewRoomHistory, RoomHistory};
pub use notice::{NewNotice, Notice};
pub use payment::{NewPayment, Payment, PaymentStatus};
pub use resident::{
    Id, MealPlan, NewResident, Resident, ResidentRole, ResidentStatus, ResidentType,
};
pub use room::{Cot, NewCot, NewRoom, Room};
pub use stats::{IncomeChange, Stats};
