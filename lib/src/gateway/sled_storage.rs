// lib/src/gateway/sled_storage.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::info;

use models::errors::HostelError;
use models::{
    AdminAccount, Cot, Expense, Feedback, FeedbackStatus, Id, NewCot, NewExpense, NewFeedback,
    NewNotice, NewPayment, NewResident, NewRoom, NewRoomHistory, Notice, Payment, PaymentStatus,
    Resident, Room, RoomHistory,
};

use super::{HostelGateway, LOGO_ASSET};

/// Durable backend: one sled tree per collection, big-endian id keys, JSON
/// values. Ids come from sled's monotonic generator so they are unique
/// across every collection.
#[derive(Debug)]
pub struct SledGateway {
    db: sled::Db,
    residents: sled::Tree,
    rooms: sled::Tree,
    cots: sled::Tree,
    payments: sled::Tree,
    expenses: sled::Tree,
    feedback: sled::Tree,
    notices: sled::Tree,
    room_history: sled::Tree,
    admins: sled::Tree,
    assets: sled::Tree,
}

impl SledGateway {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, HostelError> {
        let db = sled::open(path.as_ref())
            .map_err(|e| HostelError::Gateway(format!("failed to open sled db: {}", e)))?;
        info!(path = %path.as_ref().display(), "opened hostel store");
        Ok(SledGateway {
            residents: db.open_tree("residents")?,
            rooms: db.open_tree("rooms")?,
            cots: db.open_tree("cots")?,
            payments: db.open_tree("payments")?,
            expenses: db.open_tree("expenses")?,
            feedback: db.open_tree("feedback")?,
            notices: db.open_tree("notices")?,
            room_history: db.open_tree("room_history")?,
            admins: db.open_tree("admins")?,
            assets: db.open_tree("assets")?,
            db,
        })
    }

    fn generate_id(&self) -> Result<Id, HostelError> {
        // sled ids start at 0; shift so record ids start at 1.
        let raw = self
            .db
            .generate_id()
            .map_err(|e| HostelError::Gateway(format!("id generation failed: {}", e)))?;
        Ok(raw as Id + 1)
    }

    fn put_json<T: Serialize>(tree: &sled::Tree, id: Id, value: &T) -> Result<(), HostelError> {
        let bytes = serde_json::to_vec(value)?;
        tree.insert(id.to_be_bytes(), bytes)?;
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(tree: &sled::Tree, id: Id) -> Result<Option<T>, HostelError> {
        match tree.get(id.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn read_all<T: DeserializeOwned>(tree: &sled::Tree) -> Result<Vec<T>, HostelError> {
        let mut rows = Vec::new();
        for item in tree.iter() {
            let (_, bytes) = item?;
            rows.push(serde_json::from_slice(&bytes)?);
        }
        Ok(rows)
    }

    fn remove(tree: &sled::Tree, id: Id, what: &str) -> Result<(), HostelError> {
        if tree.remove(id.to_be_bytes())?.is_none() {
            return Err(HostelError::NotFound(format!("{} {}", what, id)));
        }
        Ok(())
    }
}

#[async_trait]
impl HostelGateway for SledGateway {
    async fn list_residents(&self) -> Result<Vec<Resident>, HostelError> {
        let mut rows: Vec<Resident> = Self::read_all(&self.residents)?;
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn get_resident(&self, id: Id) -> Result<Option<Resident>, HostelError> {
        Self::get_json(&self.residents, id)
    }

    async fn insert_resident(&self, new: NewResident) -> Result<Resident, HostelError> {
        let resident = new.into_resident(self.generate_id()?);
        Self::put_json(&self.residents, resident.id, &resident)?;
        Ok(resident)
    }

    async fn update_resident(&self, resident: Resident) -> Result<Resident, HostelError> {
        if self.residents.get(resident.id.to_be_bytes())?.is_none() {
            return Err(HostelError::NotFound(format!("resident {}", resident.id)));
        }
        Self::put_json(&self.residents, resident.id, &resident)?;
        Ok(resident)
    }

    async fn find_residents_by_login(
        &self,
        email: &str,
        phone: &str,
    ) -> Result<Vec<Resident>, HostelError> {
        let rows: Vec<Resident> = Self::read_all(&self.residents)?;
        Ok(rows
            .into_iter()
            .filter(|r| r.email == email && r.phone.as_deref() == Some(phone))
            .collect())
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, HostelError> {
        let mut rows: Vec<Room> = Self::read_all(&self.rooms)?;
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn get_room(&self, id: Id) -> Result<Option<Room>, HostelError> {
        Self::get_json(&self.rooms, id)
    }

    async fn insert_room(&self, new: NewRoom) -> Result<Room, HostelError> {
        let room = Room {
            id: self.generate_id()?,
            name: new.name,
        };
        Self::put_json(&self.rooms, room.id, &room)?;
        Ok(room)
    }

    async fn delete_room(&self, id: Id) -> Result<(), HostelError> {
        Self::remove(&self.rooms, id, "room")
    }

    async fn list_cots(&self) -> Result<Vec<Cot>, HostelError> {
        let mut rows: Vec<Cot> = Self::read_all(&self.cots)?;
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn get_cot(&self, id: Id) -> Result<Option<Cot>, HostelError> {
        Self::get_json(&self.cots, id)
    }

    async fn insert_cot(&self, new: NewCot) -> Result<Cot, HostelError> {
        let cot = Cot {
            id: self.generate_id()?,
            name: new.name,
            room_id: new.room_id,
            resident_id: None,
        };
        Self::put_json(&self.cots, cot.id, &cot)?;
        Ok(cot)
    }

    async fn update_cot(&self, cot: Cot) -> Result<Cot, HostelError> {
        if self.cots.get(cot.id.to_be_bytes())?.is_none() {
            return Err(HostelError::NotFound(format!("cot {}", cot.id)));
        }
        Self::put_json(&self.cots, cot.id, &cot)?;
        Ok(cot)
    }

    async fn delete_cot(&self, id: Id) -> Result<(), HostelError> {
        Self::remove(&self.cots, id, "cot")
    }

    async fn list_payments(&self) -> Result<Vec<Payment>, HostelError> {
        let mut rows: Vec<Payment> = Self::read_all(&self.payments)?;
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn get_payment(&self, id: Id) -> Result<Option<Payment>, HostelError> {
        Self::get_json(&self.payments, id)
    }

    async fn insert_payment(
        &self,
        new: NewPayment,
        today: NaiveDate,
    ) -> Result<Payment, HostelError> {
        let payment = new.into_payment(self.generate_id()?, today);
        Self::put_json(&self.payments, payment.id, &payment)?;
        Ok(payment)
    }

    async fn update_payment_status(
        &self,
        id: Id,
        status: PaymentStatus,
    ) -> Result<Payment, HostelError> {
        let mut payment: Payment = Self::get_json(&self.payments, id)?
            .ok_or_else(|| HostelError::NotFound(format!("payment {}", id)))?;
        payment.status = status;
        Self::put_json(&self.payments, id, &payment)?;
        Ok(payment)
    }

    async fn list_expenses(&self) -> Result<Vec<Expense>, HostelError> {
        let mut rows: Vec<Expense> = Self::read_all(&self.expenses)?;
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn insert_expense(&self, new: NewExpense) -> Result<Expense, HostelError> {
        let expense = new.into_expense(self.generate_id()?);
        Self::put_json(&self.expenses, expense.id, &expense)?;
        Ok(expense)
    }

    async fn list_feedback(&self) -> Result<Vec<Feedback>, HostelError> {
        let mut rows: Vec<Feedback> = Self::read_all(&self.feedback)?;
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn insert_feedback(&self, new: NewFeedback) -> Result<Feedback, HostelError> {
        let entry = new.into_feedback(self.generate_id()?);
        Self::put_json(&self.feedback, entry.id, &entry)?;
        Ok(entry)
    }

    async fn update_feedback_status(
        &self,
        id: Id,
        status: FeedbackStatus,
    ) -> Result<Feedback, HostelError> {
        let mut entry: Feedback = Self::get_json(&self.feedback, id)?
            .ok_or_else(|| HostelError::NotFound(format!("feedback {}", id)))?;
        entry.status = status;
        Self::put_json(&self.feedback, id, &entry)?;
        Ok(entry)
    }

    async fn list_notices(&self) -> Result<Vec<Notice>, HostelError> {
        let mut rows: Vec<Notice> = Self::read_all(&self.notices)?;
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn insert_notice(&self, new: NewNotice) -> Result<Notice, HostelError> {
        let notice = new.into_notice(self.generate_id()?);
        Self::put_json(&self.notices, notice.id, &notice)?;
        Ok(notice)
    }

    async fn delete_notice(&self, id: Id) -> Result<(), HostelError> {
        Self::remove(&self.notices, id, "notice")
    }

    async fn list_room_history(&self) -> Result<Vec<RoomHistory>, HostelError> {
        let mut rows: Vec<RoomHistory> = Self::read_all(&self.room_history)?;
        rows.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn insert_room_history(
        &self,
        new: NewRoomHistory,
    ) -> Result<RoomHistory, HostelError> {
        let entry = new.into_history(self.generate_id()?);
        Self::put_json(&self.room_history, entry.id, &entry)?;
        Ok(entry)
    }

    async fn update_room_history(&self, entry: RoomHistory) -> Result<RoomHistory, HostelError> {
        if self.room_history.get(entry.id.to_be_bytes())?.is_none() {
            return Err(HostelError::NotFound(format!("room history {}", entry.id)));
        }
        Self::put_json(&self.room_history, entry.id, &entry)?;
        Ok(entry)
    }

    async fn find_admin_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AdminAccount>, HostelError> {
        let rows: Vec<AdminAccount> = Self::read_all(&self.admins)?;
        Ok(rows.into_iter().find(|a| a.email == email))
    }

    async fn count_admins(&self) -> Result<usize, HostelError> {
        Ok(self.admins.len())
    }

    async fn insert_admin(
        &self,
        email: String,
        password_hash: String,
    ) -> Result<AdminAccount, HostelError> {
        let admin = AdminAccount {
            id: self.generate_id()?,
            email,
            password_hash,
        };
        Self::put_json(&self.admins, admin.id, &admin)?;
        Ok(admin)
    }

    async fn put_logo(&self, bytes: Vec<u8>) -> Result<(), HostelError> {
        super::validate_logo(&bytes)?;
        self.assets.insert(LOGO_ASSET, bytes)?;
        Ok(())
    }

    async fn get_logo(&self) -> Result<Option<Vec<u8>>, HostelError> {
        Ok(self.assets.get(LOGO_ASSET)?.map(|v| v.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{MealPlan, ResidentRole, ResidentType};

    fn new_resident(name: &str) -> NewResident {
        NewResident {
            account_id: None,
            role: ResidentRole::Resident,
            name: name.to_string(),
            date_of_birth: None,
            resident_type: ResidentType::Student,
            phone: Some("9000000001".to_string()),
            email: format!("{}@example.com", name.to_lowercase()),
            guardian_name: None,
            guardian_phone: None,
            national_id: None,
            cot_id: None,
            rent: 8000,
            deposit_amount: 5000,
            meal_plan: MealPlan::default(),
        }
    }

    #[tokio::test]
    async fn should_persist_and_sort_residents_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = SledGateway::open(dir.path()).unwrap();
        gateway.insert_resident(new_resident("Meera")).await.unwrap();
        gateway.insert_resident(new_resident("Asha")).await.unwrap();

        let rows = gateway.list_residents().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Asha");
        assert_eq!(rows[1].name, "Meera");
        assert_ne!(rows[0].id, rows[1].id);
    }

    #[tokio::test]
    async fn should_upsert_logo_and_reject_bad_payloads() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = SledGateway::open(dir.path()).unwrap();
        assert!(gateway.get_logo().await.unwrap().is_none());

        let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2];
        gateway.put_logo(png.clone()).await.unwrap();
        assert_eq!(gateway.get_logo().await.unwrap(), Some(png));

        assert!(gateway.put_logo(b"not an image".to_vec()).await.is_err());
    }

    #[tokio::test]
    async fn should_report_not_found_on_missing_update() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = SledGateway::open(dir.path()).unwrap();
        let err = gateway
            .update_payment_status(42, PaymentStatus::Paid)
            .await
            .unwrap_err();
        assert!(matches!(err, HostelError::NotFound(_)));
    }
}
