// lib/src/occupancy.rs
//
// Keeps Resident.cot_id and Cot.resident_id mutually consistent across every
// mutating operation, and gates destructive operations on occupancy state.
// All writes go through the gateway, strictly sequentially; no write is
// issued before the previous one has returned.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};

use models::errors::HostelError;
use models::{
    Cot, Id, NewCot, NewResident, NewRoom, NewRoomHistory, Resident, ResidentStatus, Room,
};

use crate::gateway::HostelGateway;

pub struct OccupancyManager {
    gateway: Arc<dyn HostelGateway>,
}

impl OccupancyManager {
    pub fn new(gateway: Arc<dyn HostelGateway>) -> Self {
        OccupancyManager { gateway }
    }

    /// Creates or updates a resident as one logical command. When the cot
    /// link changes, the new cot's back-reference is set first and the old
    /// one cleared after; if a cot write fails after the resident row has
    /// been saved, the prior resident row is restored best-effort before the
    /// error propagates. The assignment trail is closed/appended on every
    /// change of cot.
    ///
    /// The target cot must be unoccupied or already held by this resident;
    /// this is re-checked against a fresh read, not just the caller's view.
    pub async fn assign_or_update_resident(
        &self,
        id: Option<Id>,
        data: NewResident,
        today: NaiveDate,
    ) -> Result<Resident, HostelError> {
        data.validate()?;

        let previous = match id {
            Some(id) => Some(
                self.gateway
                    .get_resident(id)
                    .await?
                    .ok_or_else(|| HostelError::NotFound(format!("resident {}", id)))?,
            ),
            None => None,
        };
        let previous_cot = previous.as_ref().and_then(|r| r.cot_id);

        // Only Active residents may hold a cot.
        if let Some(existing) = &previous {
            if existing.status != ResidentStatus::Active && data.cot_id.is_some() {
                return Err(HostelError::Conflict(
                    "cannot assign a cot to a non-active resident".to_string(),
                ));
            }
        }

        // Guard the target cot before any write.
        let target_cot = match data.cot_id {
            Some(cot_id) => {
                let cot = self
                    .gateway
                    .get_cot(cot_id)
                    .await?
                    .ok_or_else(|| HostelError::NotFound(format!("cot {}", cot_id)))?;
                match cot.resident_id {
                    Some(holder) if Some(holder) != id => {
                        return Err(HostelError::Conflict(format!(
                            "cot {} is already occupied",
                            cot_id
                        )));
                    }
                    _ => Some(cot),
                }
            }
            None => None,
        };

        let resident = match &previous {
            Some(existing) => {
                let mut updated = data.clone().into_resident(existing.id);
                updated.status = existing.status;
                self.gateway.update_resident(updated).await?
            }
            None => self.gateway.insert_resident(data.clone()).await?,
        };

        let new_cot = resident.cot_id;
        if new_cot != previous_cot {
            if let Some(cot) = target_cot {
                let mut updated = cot;
                updated.resident_id = Some(resident.id);
                if let Err(err) = self.gateway.update_cot(updated).await {
                    self.compensate_resident_write(&previous, &resident).await;
                    return Err(err);
                }
            }
            if let Some(prev_id) = previous_cot {
                if let Some(mut prev_cot) = self.gateway.get_cot(prev_id).await? {
                    if prev_cot.resident_id == Some(resident.id) {
                        prev_cot.resident_id = None;
                        if let Err(err) = self.gateway.update_cot(prev_cot).await {
                            self.compensate_resident_write(&previous, &resident).await;
                            return Err(err);
                        }
                    }
                }
            }
            self.record_assignment_change(&resident, new_cot, today).await?;
            info!(
                resident = resident.id,
                previous = ?previous_cot,
                new = ?new_cot,
                "cot assignment changed"
            );
        }

        Ok(resident)
    }

    /// Rolls the resident row back after a failed cot write. Best effort:
    /// a failure here is logged and swallowed so the original error is the
    /// one the caller sees.
    async fn compensate_resident_write(
        &self,
        previous: &Option<Resident>,
        saved: &Resident,
    ) {
        let outcome = match previous {
            Some(prior) => self.gateway.update_resident(prior.clone()).await.map(|_| ()),
            None => {
                let mut detached = saved.clone();
                detached.cot_id = None;
                self.gateway.update_resident(detached).await.map(|_| ())
            }
        };
        if let Err(err) = outcome {
            warn!(resident = saved.id, %err, "compensation after failed cot write also failed");
        }
    }

    /// Closes the resident's open history entry and, when a cot was newly
    /// assigned, appends a fresh one with denormalized room and cot names.
    async fn record_assignment_change(
        &self,
        resident: &Resident,
        new_cot: Option<Id>,
        today: NaiveDate,
    ) -> Result<(), HostelError> {
        self.close_open_history(resident.id, today).await?;

        if let Some(cot_id) = new_cot {
            let cot = self
                .gateway
                .get_cot(cot_id)
                .await?
                .ok_or_else(|| HostelError::NotFound(format!("cot {}", cot_id)))?;
            let room_name = self
                .gateway
                .get_room(cot.room_id)
                .await?
                .map(|r| r.name)
                .unwrap_or_default();
            self.gateway
                .insert_room_history(NewRoomHistory {
                    resident_id: resident.id,
                    room_name,
                    cot_name: cot.name,
                    start_date: today,
                })
                .await?;
        }
        Ok(())
    }

    async fn close_open_history(&self, resident_id: Id, today: NaiveDate) -> Result<(), HostelError> {
        let history = self.gateway.list_room_history().await?;
        for mut entry in history
            .into_iter()
            .filter(|h| h.resident_id == resident_id && h.end_date.is_none())
        {
            entry.end_date = Some(today);
            self.gateway.update_room_history(entry).await?;
        }
        Ok(())
    }

    /// Moves a resident between lifecycle states. Leaving Active releases
    /// the held cot on both sides of the link and closes the open history
    /// entry. Re-activating never assigns a cot. Calling with the current
    /// status is a no-op.
    pub async fn change_resident_status(
        &self,
        id: Id,
        status: ResidentStatus,
        today: NaiveDate,
    ) -> Result<Resident, HostelError> {
        let resident = self
            .gateway
            .get_resident(id)
            .await?
            .ok_or_else(|| HostelError::NotFound(format!("resident {}", id)))?;

        if resident.status == status {
            return Ok(resident);
        }

        let held_cot = resident.cot_id;
        let mut updated = resident;
        updated.status = status;
        if status != ResidentStatus::Active {
            updated.cot_id = None;
        }
        let updated = self.gateway.update_resident(updated).await?;

        if status != ResidentStatus::Active {
            if let Some(cot_id) = held_cot {
                if let Some(mut cot) = self.gateway.get_cot(cot_id).await? {
                    if cot.resident_id == Some(id) {
                        cot.resident_id = None;
                        self.gateway.update_cot(cot).await?;
                    }
                }
            }
            self.close_open_history(id, today).await?;
            info!(resident = id, %status, "resident left active state, cot released");
        }

        Ok(updated)
    }

    /// Soft-delete recovery: Deleted -> Active. The resident comes back
    /// cot-less; assignment is a separate step.
    pub async fn restore_resident(&self, id: Id, today: NaiveDate) -> Result<Resident, HostelError> {
        self.change_resident_status(id, ResidentStatus::Active, today)
            .await
    }

    pub async fn add_room(&self, new: NewRoom) -> Result<Room, HostelError> {
        new.validate()?;
        self.gateway.insert_room(new).await
    }

    pub async fn add_cot(&self, new: NewCot) -> Result<Cot, HostelError> {
        new.validate()?;
        self.gateway
            .get_room(new.room_id)
            .await?
            .ok_or_else(|| HostelError::NotFound(format!("room {}", new.room_id)))?;
        self.gateway.insert_cot(new).await
    }

    /// Refused while any cot in the room is occupied; nothing is persisted
    /// on refusal. On success the room's (free) cots go with it.
    pub async fn delete_room(&self, room_id: Id) -> Result<(), HostelError> {
        self.gateway
            .get_room(room_id)
            .await?
            .ok_or_else(|| HostelError::NotFound(format!("room {}", room_id)))?;

        let cots: Vec<Cot> = self
            .gateway
            .list_cots()
            .await?
            .into_iter()
            .filter(|c| c.room_id == room_id)
            .collect();
        if cots.iter().any(Cot::is_occupied) {
            return Err(HostelError::Conflict("room has occupied cots".to_string()));
        }
        for cot in cots {
            self.gateway.delete_cot(cot.id).await?;
        }
        self.gateway.delete_room(room_id).await
    }

    pub async fn delete_cot(&self, cot_id: Id) -> Result<(), HostelError> {
        let cot = self
            .gateway
            .get_cot(cot_id)
            .await?
            .ok_or_else(|| HostelError::NotFound(format!("cot {}", cot_id)))?;
        if cot.is_occupied() {
            return Err(HostelError::Conflict(
                "cannot delete an occupied cot".to_string(),
            ));
        }
        self.gateway.delete_cot(cot_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{HostelGateway, MemoryGateway};
    use models::{MealPlan, ResidentRole, ResidentType};

    fn today() -> NaiveDate {
        "2024-03-05".parse().unwrap()
    }

    fn new_resident(name: &str, cot_id: Option<Id>) -> NewResident {
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
            cot_id,
            rent: 8000,
            deposit_amount: 5000,
            meal_plan: MealPlan::default(),
        }
    }

    struct Fixture {
        gateway: Arc<MemoryGateway>,
        manager: OccupancyManager,
        room: Room,
        cots: Vec<Cot>,
    }

    async fn fixture(cot_count: usize) -> Fixture {
        let gateway = Arc::new(MemoryGateway::new());
        let manager = OccupancyManager::new(gateway.clone());
        let room = manager
            .add_room(NewRoom {
                name: "Room A".to_string(),
            })
            .await
            .unwrap();
        let mut cots = Vec::new();
        for i in 0..cot_count {
            cots.push(
                manager
                    .add_cot(NewCot {
                        name: format!("A-{}", i + 1),
                        room_id: room.id,
                    })
                    .await
                    .unwrap(),
            );
        }
        Fixture {
            gateway,
            manager,
            room,
            cots,
        }
    }

    /// Every Active resident with a cot must be the unique holder of that
    /// cot, and every occupied cot must point back at an Active resident
    /// holding it.
    async fn assert_bijection(gateway: &MemoryGateway) {
        let residents = gateway.list_residents().await.unwrap();
        let cots = gateway.list_cots().await.unwrap();

        for resident in residents.iter().filter(|r| r.cot_id.is_some()) {
            assert_eq!(resident.status, ResidentStatus::Active);
            let cot = cots.iter().find(|c| Some(c.id) == resident.cot_id).unwrap();
            assert_eq!(cot.resident_id, Some(resident.id));
        }
        for cot in cots.iter().filter(|c| c.resident_id.is_some()) {
            let resident = residents
                .iter()
                .find(|r| Some(r.id) == cot.resident_id)
                .unwrap();
            assert_eq!(resident.status, ResidentStatus::Active);
            assert_eq!(resident.cot_id, Some(cot.id));
        }
    }

    #[tokio::test]
    async fn should_link_both_sides_on_assignment() {
        let fx = fixture(2).await;
        let resident = fx
            .manager
            .assign_or_update_resident(None, new_resident("Asha", Some(fx.cots[0].id)), today())
            .await
            .unwrap();

        let cot = fx.gateway.get_cot(fx.cots[0].id).await.unwrap().unwrap();
        assert_eq!(cot.resident_id, Some(resident.id));
        assert_bijection(&fx.gateway).await;
    }

    #[tokio::test]
    async fn should_move_link_on_reassignment_without_touching_other_cots() {
        let fx = fixture(3).await;
        let resident = fx
            .manager
            .assign_or_update_resident(None, new_resident("Asha", Some(fx.cots[0].id)), today())
            .await
            .unwrap();
        // Occupy a bystander cot with someone else.
        let other = fx
            .manager
            .assign_or_update_resident(None, new_resident("Meera", Some(fx.cots[2].id)), today())
            .await
            .unwrap();

        fx.manager
            .assign_or_update_resident(
                Some(resident.id),
                new_resident("Asha", Some(fx.cots[1].id)),
                today(),
            )
            .await
            .unwrap();

        let old_cot = fx.gateway.get_cot(fx.cots[0].id).await.unwrap().unwrap();
        let new_cot = fx.gateway.get_cot(fx.cots[1].id).await.unwrap().unwrap();
        let bystander = fx.gateway.get_cot(fx.cots[2].id).await.unwrap().unwrap();
        assert_eq!(old_cot.resident_id, None);
        assert_eq!(new_cot.resident_id, Some(resident.id));
        assert_eq!(bystander.resident_id, Some(other.id));
        assert_bijection(&fx.gateway).await;
    }

    #[tokio::test]
    async fn should_refuse_occupied_cot() {
        let fx = fixture(1).await;
        fx.manager
            .assign_or_update_resident(None, new_resident("Asha", Some(fx.cots[0].id)), today())
            .await
            .unwrap();

        let err = fx
            .manager
            .assign_or_update_resident(None, new_resident("Meera", Some(fx.cots[0].id)), today())
            .await
            .unwrap_err();
        assert!(matches!(err, HostelError::Conflict(_)));
        assert_bijection(&fx.gateway).await;
    }

    #[tokio::test]
    async fn should_allow_resaving_resident_on_own_cot() {
        let fx = fixture(1).await;
        let resident = fx
            .manager
            .assign_or_update_resident(None, new_resident("Asha", Some(fx.cots[0].id)), today())
            .await
            .unwrap();

        // Same cot, changed phone; must not conflict with itself.
        let mut data = new_resident("Asha", Some(fx.cots[0].id));
        data.phone = Some("9111111111".to_string());
        fx.manager
            .assign_or_update_resident(Some(resident.id), data, today())
            .await
            .unwrap();
        assert_bijection(&fx.gateway).await;
    }

    #[tokio::test]
    async fn should_release_cot_on_vacate_and_clear_forward_reference() {
        let fx = fixture(1).await;
        let resident = fx
            .manager
            .assign_or_update_resident(None, new_resident("Asha", Some(fx.cots[0].id)), today())
            .await
            .unwrap();

        let vacated = fx
            .manager
            .change_resident_status(resident.id, ResidentStatus::Vacated, today())
            .await
            .unwrap();

        assert_eq!(vacated.status, ResidentStatus::Vacated);
        assert_eq!(vacated.cot_id, None);
        let cot = fx.gateway.get_cot(fx.cots[0].id).await.unwrap().unwrap();
        assert_eq!(cot.resident_id, None);
        assert_bijection(&fx.gateway).await;
    }

    #[tokio::test]
    async fn should_be_idempotent_on_repeated_status_change() {
        let fx = fixture(1).await;
        let resident = fx
            .manager
            .assign_or_update_resident(None, new_resident("Asha", Some(fx.cots[0].id)), today())
            .await
            .unwrap();

        let first = fx
            .manager
            .change_resident_status(resident.id, ResidentStatus::Vacated, today())
            .await
            .unwrap();
        let second = fx
            .manager
            .change_resident_status(resident.id, ResidentStatus::Vacated, today())
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_bijection(&fx.gateway).await;
    }

    #[tokio::test]
    async fn should_refuse_assigning_cot_to_non_active_resident() {
        let fx = fixture(2).await;
        let resident = fx
            .manager
            .assign_or_update_resident(None, new_resident("Asha", Some(fx.cots[0].id)), today())
            .await
            .unwrap();
        fx.manager
            .change_resident_status(resident.id, ResidentStatus::Vacated, today())
            .await
            .unwrap();

        let err = fx
            .manager
            .assign_or_update_resident(
                Some(resident.id),
                new_resident("Asha", Some(fx.cots[1].id)),
                today(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, HostelError::Conflict(_)));

        // Nothing was linked on either side.
        let cot = fx.gateway.get_cot(fx.cots[1].id).await.unwrap().unwrap();
        assert_eq!(cot.resident_id, None);
        let row = fx.gateway.get_resident(resident.id).await.unwrap().unwrap();
        assert_eq!(row.cot_id, None);
        assert_eq!(row.status, ResidentStatus::Vacated);
        assert_bijection(&fx.gateway).await;
    }

    #[tokio::test]
    async fn should_restore_without_reassigning_a_cot() {
        let fx = fixture(1).await;
        let resident = fx
            .manager
            .assign_or_update_resident(None, new_resident("Asha", Some(fx.cots[0].id)), today())
            .await
            .unwrap();
        fx.manager
            .change_resident_status(resident.id, ResidentStatus::Deleted, today())
            .await
            .unwrap();

        let restored = fx.manager.restore_resident(resident.id, today()).await.unwrap();
        assert_eq!(restored.status, ResidentStatus::Active);
        assert_eq!(restored.cot_id, None);
        let cot = fx.gateway.get_cot(fx.cots[0].id).await.unwrap().unwrap();
        assert_eq!(cot.resident_id, None);
    }

    #[tokio::test]
    async fn should_refuse_deleting_room_with_occupied_cots_without_mutation() {
        let fx = fixture(2).await;
        fx.manager
            .assign_or_update_resident(None, new_resident("Asha", Some(fx.cots[0].id)), today())
            .await
            .unwrap();

        let err = fx.manager.delete_room(fx.room.id).await.unwrap_err();
        assert!(matches!(err, HostelError::Conflict(_)));
        // Nothing was deleted.
        assert!(fx.gateway.get_room(fx.room.id).await.unwrap().is_some());
        assert_eq!(fx.gateway.list_cots().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn should_delete_empty_room_with_its_free_cots() {
        let fx = fixture(2).await;
        fx.manager.delete_room(fx.room.id).await.unwrap();
        assert!(fx.gateway.get_room(fx.room.id).await.unwrap().is_none());
        assert!(fx.gateway.list_cots().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_refuse_deleting_occupied_cot() {
        let fx = fixture(1).await;
        fx.manager
            .assign_or_update_resident(None, new_resident("Asha", Some(fx.cots[0].id)), today())
            .await
            .unwrap();

        let err = fx.manager.delete_cot(fx.cots[0].id).await.unwrap_err();
        assert!(matches!(err, HostelError::Conflict(_)));
        assert!(fx.gateway.get_cot(fx.cots[0].id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn should_append_and_close_history_on_assignment_changes() {
        let fx = fixture(2).await;
        let resident = fx
            .manager
            .assign_or_update_resident(None, new_resident("Asha", Some(fx.cots[0].id)), today())
            .await
            .unwrap();

        let history = fx.gateway.list_room_history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].cot_name, "A-1");
        assert_eq!(history[0].room_name, "Room A");
        assert_eq!(history[0].end_date, None);

        let later: NaiveDate = "2024-04-01".parse().unwrap();
        fx.manager
            .assign_or_update_resident(
                Some(resident.id),
                new_resident("Asha", Some(fx.cots[1].id)),
                later,
            )
            .await
            .unwrap();

        let mut history = fx.gateway.list_room_history().await.unwrap();
        history.sort_by_key(|h| h.id);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].end_date, Some(later));
        assert_eq!(history[1].cot_name, "A-2");
        assert_eq!(history[1].end_date, None);
    }

    #[tokio::test]
    async fn should_close_history_on_vacate() {
        let fx = fixture(1).await;
        let resident = fx
            .manager
            .assign_or_update_resident(None, new_resident("Asha", Some(fx.cots[0].id)), today())
            .await
            .unwrap();

        let later: NaiveDate = "2024-05-01".parse().unwrap();
        fx.manager
            .change_resident_status(resident.id, ResidentStatus::Vacated, later)
            .await
            .unwrap();

        let history = fx.gateway.list_room_history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].end_date, Some(later));
    }
}
