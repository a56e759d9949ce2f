// lib/src/gateway/memory.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use models::errors::HostelError;
use models::{
    AdminAccount, Cot, Expense, Feedback, FeedbackStatus, Id, NewCot, NewExpense, NewFeedback,
    NewNotice, NewPayment, NewResident, NewRoom, NewRoomHistory, Notice, Payment, PaymentStatus,
    Resident, Room, RoomHistory,
};

use super::HostelGateway;

/// In-memory backend with the same contract as the durable one. Used by the
/// core tests and available as a throwaway mode for the server.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    next_id: AtomicI64,
    residents: Arc<RwLock<HashMap<Id, Resident>>>,
    rooms: Arc<RwLock<HashMap<Id, Room>>>,
    cots: Arc<RwLock<HashMap<Id, Cot>>>,
    payments: Arc<RwLock<HashMap<Id, Payment>>>,
    expenses: Arc<RwLock<HashMap<Id, Expense>>>,
    feedback: Arc<RwLock<HashMap<Id, Feedback>>>,
    notices: Arc<RwLock<HashMap<Id, Notice>>>,
    room_history: Arc<RwLock<HashMap<Id, RoomHistory>>>,
    admins: Arc<RwLock<HashMap<Id, AdminAccount>>>,
    logo: Arc<RwLock<Option<Vec<u8>>>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    fn generate_id(&self) -> Id {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl HostelGateway for MemoryGateway {
    async fn list_residents(&self) -> Result<Vec<Resident>, HostelError> {
        let residents = self.residents.read().await;
        let mut rows: Vec<Resident> = residents.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn get_resident(&self, id: Id) -> Result<Option<Resident>, HostelError> {
        Ok(self.residents.read().await.get(&id).cloned())
    }

    async fn insert_resident(&self, new: NewResident) -> Result<Resident, HostelError> {
        let resident = new.into_resident(self.generate_id());
        self.residents
            .write()
            .await
            .insert(resident.id, resident.clone());
        Ok(resident)
    }

    async fn update_resident(&self, resident: Resident) -> Result<Resident, HostelError> {
        let mut residents = self.residents.write().await;
        if !residents.contains_key(&resident.id) {
            return Err(HostelError::NotFound(format!("resident {}", resident.id)));
        }
        residents.insert(resident.id, resident.clone());
        Ok(resident)
    }

    async fn find_residents_by_login(
        &self,
        email: &str,
        phone: &str,
    ) -> Result<Vec<Resident>, HostelError> {
        let residents = self.residents.read().await;
        Ok(residents
            .values()
            .filter(|r| r.email == email && r.phone.as_deref() == Some(phone))
            .cloned()
            .collect())
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, HostelError> {
        let rooms = self.rooms.read().await;
        let mut rows: Vec<Room> = rooms.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn get_room(&self, id: Id) -> Result<Option<Room>, HostelError> {
        Ok(self.rooms.read().await.get(&id).cloned())
    }

    async fn insert_room(&self, new: NewRoom) -> Result<Room, HostelError> {
        let room = Room {
            id: self.generate_id(),
            name: new.name,
        };
        self.rooms.write().await.insert(room.id, room.clone());
        Ok(room)
    }

    async fn delete_room(&self, id: Id) -> Result<(), HostelError> {
        if self.rooms.write().await.remove(&id).is_none() {
            return Err(HostelError::NotFound(format!("room {}", id)));
        }
        Ok(())
    }

    async fn list_cots(&self) -> Result<Vec<Cot>, HostelError> {
        let cots = self.cots.read().await;
        let mut rows: Vec<Cot> = cots.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn get_cot(&self, id: Id) -> Result<Option<Cot>, HostelError> {
        Ok(self.cots.read().await.get(&id).cloned())
    }

    async fn insert_cot(&self, new: NewCot) -> Result<Cot, HostelError> {
        let cot = Cot {
            id: self.generate_id(),
            name: new.name,
            room_id: new.room_id,
            resident_id: None,
        };
        self.cots.write().await.insert(cot.id, cot.clone());
        Ok(cot)
    }

    async fn update_cot(&self, cot: Cot) -> Result<Cot, HostelError> {
        let mut cots = self.cots.write().await;
        if !cots.contains_key(&cot.id) {
            return Err(HostelError::NotFound(format!("cot {}", cot.id)));
        }
        cots.insert(cot.id, cot.clone());
        Ok(cot)
    }

    async fn delete_cot(&self, id: Id) -> Result<(), HostelError> {
        if self.cots.write().await.remove(&id).is_none() {
            return Err(HostelError::NotFound(format!("cot {}", id)));
        }
        Ok(())
    }

    async fn list_payments(&self) -> Result<Vec<Payment>, HostelError> {
        let payments = self.payments.read().await;
        let mut rows: Vec<Payment> = payments.values().cloned().collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn get_payment(&self, id: Id) -> Result<Option<Payment>, HostelError> {
        Ok(self.payments.read().await.get(&id).cloned())
    }

    async fn insert_payment(
        &self,
        new: NewPayment,
        today: NaiveDate,
    ) -> Result<Payment, HostelError> {
        let payment = new.into_payment(self.generate_id(), today);
        self.payments
            .write()
            .await
            .insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn update_payment_status(
        &self,
        id: Id,
        status: PaymentStatus,
    ) -> Result<Payment, HostelError> {
        let mut payments = self.payments.write().await;
        let payment = payments
            .get_mut(&id)
            .ok_or_else(|| HostelError::NotFound(format!("payment {}", id)))?;
        payment.status = status;
        Ok(payment.clone())
    }

    async fn list_expenses(&self) -> Result<Vec<Expense>, HostelError> {
        let expenses = self.expenses.read().await;
        let mut rows: Vec<Expense> = expenses.values().cloned().collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn insert_expense(&self, new: NewExpense) -> Result<Expense, HostelError> {
        let expense = new.into_expense(self.generate_id());
        self.expenses
            .write()
            .await
            .insert(expense.id, expense.clone());
        Ok(expense)
    }

    async fn list_feedback(&self) -> Result<Vec<Feedback>, HostelError> {
        let feedback = self.feedback.read().await;
        let mut rows: Vec<Feedback> = feedback.values().cloned().collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn insert_feedback(&self, new: NewFeedback) -> Result<Feedback, HostelError> {
        let entry = new.into_feedback(self.generate_id());
        self.feedback.write().await.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn update_feedback_status(
        &self,
        id: Id,
        status: FeedbackStatus,
    ) -> Result<Feedback, HostelError> {
        let mut feedback = self.feedback.write().await;
        let entry = feedback
            .get_mut(&id)
            .ok_or_else(|| HostelError::NotFound(format!("feedback {}", id)))?;
        entry.status = status;
        Ok(entry.clone())
    }

    async fn list_notices(&self) -> Result<Vec<Notice>, HostelError> {
        let notices = self.notices.read().await;
        let mut rows: Vec<Notice> = notices.values().cloned().collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn insert_notice(&self, new: NewNotice) -> Result<Notice, HostelError> {
        let notice = new.into_notice(self.generate_id());
        self.notices
            .write()
            .await
            .insert(notice.id, notice.clone());
        Ok(notice)
    }

    async fn delete_notice(&self, id: Id) -> Result<(), HostelError> {
        if self.notices.write().await.remove(&id).is_none() {
            return Err(HostelError::NotFound(format!("notice {}", id)));
        }
        Ok(())
    }

    async fn list_room_history(&self) -> Result<Vec<RoomHistory>, HostelError> {
        let history = self.room_history.read().await;
        let mut rows: Vec<RoomHistory> = history.values().cloned().collect();
        rows.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn insert_room_history(
        &self,
        new: NewRoomHistory,
    ) -> Result<RoomHistory, HostelError> {
        let entry = new.into_history(self.generate_id());
        self.room_history
            .write()
            .await
            .insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn update_room_history(&self, entry: RoomHistory) -> Result<RoomHistory, HostelError> {
        let mut history = self.room_history.write().await;
        if !history.contains_key(&entry.id) {
            return Err(HostelError::NotFound(format!("room history {}", entry.id)));
        }
        history.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn find_admin_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AdminAccount>, HostelError> {
        let admins = self.admins.read().await;
        Ok(admins.values().find(|a| a.email == email).cloned())
    }

    async fn count_admins(&self) -> Result<usize, HostelError> {
        Ok(self.admins.read().await.len())
    }

    async fn insert_admin(
        &self,
        email: String,
        password_hash: String,
    ) -> Result<AdminAccount, HostelError> {
        let admin = AdminAccount {
            id: self.generate_id(),
            email,
            password_hash,
        };
        self.admins.write().await.insert(admin.id, admin.clone());
        Ok(admin)
    }

    async fn put_logo(&self, bytes: Vec<u8>) -> Result<(), HostelError> {
        super::validate_logo(&bytes)?;
        *self.logo.write().await = Some(bytes);
        Ok(())
    }

    async fn get_logo(&self) -> Result<Option<Vec<u8>>, HostelError> {
        Ok(self.logo.read().await.clone())
    }
}
