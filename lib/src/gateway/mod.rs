// lib/src/gateway/mod.rs
//
// Persistence gateway: the one seam between the hostel core and whatever
// actually stores the collections. Backends own durability; callers get
// plain collections back and every failure as HostelError::Gateway.

use async_trait::async_trait;
use chrono::NaiveDate;

use models::errors::HostelError;
use models::{
    AdminAccount, Cot, Expense, Feedback, FeedbackStatus, Id, NewCot, NewExpense, NewFeedback,
    NewNotice, NewPayment, NewResident, NewRoom, NewRoomHistory, Notice, Payment, PaymentStatus,
    Resident, Room, RoomHistory,
};

mod memory;
mod sled_storage;

pub use memory::MemoryGateway;
pub use sled_storage::SledGateway;

/// The single logo asset name; blob storage holds exactly this one object.
pub const LOGO_ASSET: &str = "logo.png";

/// Hard cap on logo uploads.
pub const LOGO_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Rejects a logo payload before it reaches storage: size cap and a
/// magic-byte sniff for PNG or JPEG.
pub fn validate_logo(bytes: &[u8]) -> Result<(), HostelError> {
    use models::errors::ValidationError;

    if bytes.len() > LOGO_MAX_BYTES {
        return Err(ValidationError::LogoTooLarge(bytes.len()).into());
    }
    let is_png = bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    let is_jpeg = bytes.starts_with(&[0xFF, 0xD8, 0xFF]);
    if !is_png && !is_jpeg {
        return Err(ValidationError::LogoBadFormat.into());
    }
    Ok(())
}

/// CRUD surface over the persisted collections, plus the login lookup and
/// the single blob asset. List calls return the store's conventional sort:
/// residents, rooms, and cots by name; payments, expenses, feedback, and
/// notices by date descending; room history by start date descending.
#[async_trait]
pub trait HostelGateway: Send + Sync {
    // Residents
    async fn list_residents(&self) -> Result<Vec<Resident>, HostelError>;
    async fn get_resident(&self, id: Id) -> Result<Option<Resident>, HostelError>;
    async fn insert_resident(&self, new: NewResident) -> Result<Resident, HostelError>;
    async fn update_resident(&self, resident: Resident) -> Result<Resident, HostelError>;
    /// Exact-match portal login lookup; returns every matching row so the
    /// caller can refuse duplicates instead of silently picking one.
    async fn find_residents_by_login(
        &self,
        email: &str,
        phone: &str,
    ) -> Result<Vec<Resident>, HostelError>;

    // Rooms
    async fn list_rooms(&self) -> Result<Vec<Room>, HostelError>;
    async fn get_room(&self, id: Id) -> Result<Option<Room>, HostelError>;
    async fn insert_room(&self, new: NewRoom) -> Result<Room, HostelError>;
    async fn delete_room(&self, id: Id) -> Result<(), HostelError>;

    // Cots
    async fn list_cots(&self) -> Result<Vec<Cot>, HostelError>;
    async fn get_cot(&self, id: Id) -> Result<Option<Cot>, HostelError>;
    async fn insert_cot(&self, new: NewCot) -> Result<Cot, HostelError>;
    async fn update_cot(&self, cot: Cot) -> Result<Cot, HostelError>;
    async fn delete_cot(&self, id: Id) -> Result<(), HostelError>;

    // Payments
    async fn list_payments(&self) -> Result<Vec<Payment>, HostelError>;
    async fn get_payment(&self, id: Id) -> Result<Option<Payment>, HostelError>;
    /// `today` fixes the creation-time Due/Overdue decision.
    async fn insert_payment(
        &self,
        new: NewPayment,
        today: NaiveDate,
    ) -> Result<Payment, HostelError>;
    async fn update_payment_status(
        &self,
        id: Id,
        status: PaymentStatus,
    ) -> Result<Payment, HostelError>;

    // Expenses
    async fn list_expenses(&self) -> Result<Vec<Expense>, HostelError>;
    async fn insert_expense(&self, new: NewExpense) -> Result<Expense, HostelError>;

    // Feedback
    async fn list_feedback(&self) -> Result<Vec<Feedback>, HostelError>;
    async fn insert_feedback(&self, new: NewFeedback) -> Result<Feedback, HostelError>;
    async fn update_feedback_status(
        &self,
        id: Id,
        status: FeedbackStatus,
    ) -> Result<Feedback, HostelError>;

    // Notices
    async fn list_notices(&self) -> Result<Vec<Notice>, HostelError>;
    async fn insert_notice(&self, new: NewNotice) -> Result<Notice, HostelError>;
    async fn delete_notice(&self, id: Id) -> Result<(), HostelError>;

    // Room history
    async fn list_room_history(&self) -> Result<Vec<RoomHistory>, HostelError>;
    async fn insert_room_history(&self, new: NewRoomHistory)
        -> Result<RoomHistory, HostelError>;
    async fn update_room_history(&self, entry: RoomHistory) -> Result<RoomHistory, HostelError>;

    // Admin accounts
    async fn find_admin_by_email(&self, email: &str)
        -> Result<Option<AdminAccount>, HostelError>;
    async fn count_admins(&self) -> Result<usize, HostelError>;
    async fn insert_admin(
        &self,
        email: String,
        password_hash: String,
    ) -> Result<AdminAccount, HostelError>;

    // Blob storage: exactly one named asset, upserted on re-upload.
    async fn put_logo(&self, bytes: Vec<u8>) -> Result<(), HostelError>;
    async fn get_logo(&self) -> Result<Option<Vec<u8>>, HostelError>;
}

#[cfg(test)]
mod tests {
    use super::validate_logo;

    #[test]
    fn should_accept_png_and_jpeg_magic() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0];
        assert!(validate_logo(&png).is_ok());
        assert!(validate_logo(&jpeg).is_ok());
    }

    #[test]
    fn should_reject_other_formats_and_oversize() {
        assert!(validate_logo(b"GIF89a").is_err());
        let mut huge = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        huge.resize(super::LOGO_MAX_BYTES + 1, 0);
        assert!(validate_logo(&huge).is_err());
    }
}
