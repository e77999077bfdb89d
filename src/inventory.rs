//! Application root for the clinic data: both record stores plus the activity
//! log. Every mutation that changes the tables goes through here so that it
//! leaves exactly one line in the activity log and one `tracing` event. The TUI
//! owns a single `Inventory` and borrows it from its handlers.

use chrono::{Days, Local, NaiveDate};
use tracing::info;

use crate::activity::ActivityLog;
use crate::models::{
    Equipment, EquipmentFields, EquipmentFilter, EquipmentSortField, Medicine, MedicineFields,
    MedicineFilter, MedicineSortField, RecordId, Threshold,
};
use crate::store::{RecordStore, StoreError};

/// Default low-stock threshold applied to a medicine's total quantity.
pub const DEFAULT_LOW_STOCK_MEDICINE: u32 = 5;
/// Default low-stock threshold applied to equipment stock.
pub const DEFAULT_LOW_STOCK_EQUIPMENT: u32 = 3;
/// Default look-ahead window for expiring medicines.
pub const DEFAULT_EXPIRY_DAYS: u32 = 30;

/// Thresholds used by [`Inventory::statistics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventorySettings {
    pub low_stock_medicine: u32,
    pub low_stock_equipment: u32,
    pub expiry_days: u32,
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            low_stock_medicine: DEFAULT_LOW_STOCK_MEDICINE,
            low_stock_equipment: DEFAULT_LOW_STOCK_EQUIPMENT,
            expiry_days: DEFAULT_EXPIRY_DAYS,
        }
    }
}

/// Aggregate counts, recomputed on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Statistics {
    pub medicines: usize,
    pub equipment: usize,
    pub low_stock_medicines: usize,
    pub low_stock_equipment: usize,
    pub expiring_medicines: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Inventory {
    medicines: RecordStore<Medicine>,
    equipment: RecordStore<Equipment>,
    activity: ActivityLog,
    settings: InventorySettings,
}

impl Inventory {
    pub fn new(settings: InventorySettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Fresh inventory whose log opens with the start-up line.
    pub fn started(settings: InventorySettings) -> Self {
        let mut inventory = Self::new(settings);
        inventory.log("Application started.");
        inventory
    }

    pub fn medicines(&self) -> &RecordStore<Medicine> {
        &self.medicines
    }

    pub fn equipment(&self) -> &RecordStore<Equipment> {
        &self.equipment
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn settings(&self) -> InventorySettings {
        self.settings
    }

    pub fn add_medicine(&mut self, fields: MedicineFields) -> Medicine {
        let medicine = self.medicines.append(fields);
        self.log(format!("Added medicine: {}", medicine.name));
        medicine
    }

    pub fn insert_medicine_at(
        &mut self,
        position: usize,
        fields: MedicineFields,
    ) -> Result<Medicine, StoreError> {
        let medicine = self.medicines.insert_at(position, fields)?;
        if position == 0 {
            self.log(format!("Inserted medicine at beginning: {}", medicine.name));
        } else {
            self.log(format!(
                "Inserted medicine at position {position}: {}",
                medicine.name
            ));
        }
        Ok(medicine)
    }

    pub fn insert_medicine_first(&mut self, fields: MedicineFields) -> Medicine {
        let medicine = self.medicines.prepend(fields);
        self.log(format!("Inserted medicine at beginning: {}", medicine.name));
        medicine
    }

    pub fn update_medicine(&mut self, id: RecordId, fields: MedicineFields) -> bool {
        let name = fields.name.clone();
        let updated = self.medicines.update(id, fields);
        if updated {
            self.log(format!("Updated medicine: {name} (ID: {id})"));
        }
        updated
    }

    pub fn remove_medicine_by_id(&mut self, id: RecordId) -> Option<Medicine> {
        let removed = self.medicines.remove_by_id(id)?;
        self.log(format!("Removed medicine by ID: {id}"));
        Some(removed)
    }

    /// Update the row at `position`, for callers that track rows by position
    /// because ids may repeat. Logs the same line as an id-based update.
    pub fn update_medicine_at(&mut self, position: usize, fields: MedicineFields) -> bool {
        let Some(id) = self.medicines.get_by_index(position).map(|row| row.id) else {
            return false;
        };
        let name = fields.name.clone();
        self.medicines.update_at(position, fields);
        self.log(format!("Updated medicine: {name} (ID: {id})"));
        true
    }

    pub fn remove_medicine_at(&mut self, position: usize) -> Option<Medicine> {
        let removed = self.medicines.remove_at(position)?;
        self.log(format!("Removed medicine by ID: {}", removed.id));
        Some(removed)
    }

    pub fn remove_medicine_by_name(&mut self, name: &str) -> Option<Medicine> {
        let removed = self.medicines.remove_by_name(name)?;
        self.log(format!("Removed medicine by name: {}", removed.name));
        Some(removed)
    }

    pub fn remove_last_medicine(&mut self) -> Option<Medicine> {
        let removed = self.medicines.remove_last()?;
        self.log(format!("Removed last medicine: {}", removed.name));
        Some(removed)
    }

    pub fn sort_medicines(&mut self, field: MedicineSortField, ascending: bool) -> Vec<Medicine> {
        let sorted = self.medicines.sort_by(field, ascending);
        self.log(format!(
            "Sorted medicines by {} ({})",
            field.label(),
            order_label(ascending)
        ));
        sorted
    }

    pub fn clear_medicines(&mut self) {
        let count = self.medicines.count();
        self.medicines.clear();
        self.log(format!("Cleared {count} medicines"));
    }

    pub fn add_equipment(&mut self, fields: EquipmentFields) -> Equipment {
        let equipment = self.equipment.append(fields);
        self.log(format!("Added equipment: {}", equipment.name));
        equipment
    }

    pub fn insert_equipment_at(
        &mut self,
        position: usize,
        fields: EquipmentFields,
    ) -> Result<Equipment, StoreError> {
        let equipment = self.equipment.insert_at(position, fields)?;
        if position == 0 {
            self.log(format!("Inserted equipment at beginning: {}", equipment.name));
        } else {
            self.log(format!(
                "Inserted equipment at position {position}: {}",
                equipment.name
            ));
        }
        Ok(equipment)
    }

    pub fn insert_equipment_first(&mut self, fields: EquipmentFields) -> Equipment {
        let equipment = self.equipment.prepend(fields);
        self.log(format!("Inserted equipment at beginning: {}", equipment.name));
        equipment
    }

    pub fn update_equipment(&mut self, id: RecordId, fields: EquipmentFields) -> bool {
        let name = fields.name.clone();
        let updated = self.equipment.update(id, fields);
        if updated {
            self.log(format!("Updated equipment: {name} (ID: {id})"));
        }
        updated
    }

    pub fn remove_equipment_by_id(&mut self, id: RecordId) -> Option<Equipment> {
        let removed = self.equipment.remove_by_id(id)?;
        self.log(format!("Removed equipment by ID: {id}"));
        Some(removed)
    }

    /// Update the row at `position`, for callers that track rows by position
    /// because ids may repeat. Logs the same line as an id-based update.
    pub fn update_equipment_at(&mut self, position: usize, fields: EquipmentFields) -> bool {
        let Some(id) = self.equipment.get_by_index(position).map(|row| row.id) else {
            return false;
        };
        let name = fields.name.clone();
        self.equipment.update_at(position, fields);
        self.log(format!("Updated equipment: {name} (ID: {id})"));
        true
    }

    pub fn remove_equipment_at(&mut self, position: usize) -> Option<Equipment> {
        let removed = self.equipment.remove_at(position)?;
        self.log(format!("Removed equipment by ID: {}", removed.id));
        Some(removed)
    }

    pub fn remove_equipment_by_name(&mut self, name: &str) -> Option<Equipment> {
        let removed = self.equipment.remove_by_name(name)?;
        self.log(format!("Removed equipment by name: {}", removed.name));
        Some(removed)
    }

    pub fn remove_last_equipment(&mut self) -> Option<Equipment> {
        let removed = self.equipment.remove_last()?;
        self.log(format!("Removed last equipment: {}", removed.name));
        Some(removed)
    }

    pub fn sort_equipment(&mut self, field: EquipmentSortField, ascending: bool) -> Vec<Equipment> {
        let sorted = self.equipment.sort_by(field, ascending);
        self.log(format!(
            "Sorted equipment by {} ({})",
            field.label(),
            order_label(ascending)
        ));
        sorted
    }

    pub fn clear_equipment(&mut self) {
        let count = self.equipment.count();
        self.equipment.clear();
        self.log(format!("Cleared {count} equipment"));
    }

    /// Medicines whose total quantity is at or below `threshold`.
    pub fn low_stock_medicines(&self, threshold: u32) -> Vec<Medicine> {
        self.medicines
            .filter(&MedicineFilter::TotalQuantity(Threshold::AtMost(threshold)))
    }

    /// Equipment whose stock is at or below `threshold`.
    pub fn low_stock_equipment(&self, threshold: u32) -> Vec<Equipment> {
        self.equipment
            .filter(&EquipmentFilter::Stock(Threshold::AtMost(threshold)))
    }

    /// Medicines expiring on or before `today + days`. Already expired batches
    /// are included.
    pub fn expiring_within(&self, days: u32, today: NaiveDate) -> Vec<Medicine> {
        self.medicines
            .filter(&MedicineFilter::ExpiresBy(expiry_cutoff(today, days)))
    }

    pub fn expiring_within_now(&self, days: u32) -> Vec<Medicine> {
        self.expiring_within(days, Local::now().date_naive())
    }

    pub fn statistics(&self, today: NaiveDate) -> Statistics {
        Statistics {
            medicines: self.medicines.count(),
            equipment: self.equipment.count(),
            low_stock_medicines: self
                .low_stock_medicines(self.settings.low_stock_medicine)
                .len(),
            low_stock_equipment: self
                .low_stock_equipment(self.settings.low_stock_equipment)
                .len(),
            expiring_medicines: self
                .expiring_within(self.settings.expiry_days, today)
                .len(),
        }
    }

    fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!(activity = %message, "inventory changed");
        self.activity.record(message);
    }
}

/// Last date still counted as "expiring soon". Saturates at the calendar's end.
pub fn expiry_cutoff(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

fn order_label(ascending: bool) -> &'static str {
    if ascending {
        "ascending"
    } else {
        "descending"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn messages(inventory: &Inventory) -> Vec<String> {
        inventory
            .activity()
            .entries()
            .map(|entry| entry.message.clone())
            .collect()
    }

    #[test]
    fn started_logs_startup_line() {
        let inventory = Inventory::started(InventorySettings::default());
        assert_eq!(messages(&inventory), ["Application started."]);
    }

    #[test]
    fn mutations_leave_activity_lines() {
        let mut inventory = Inventory::default();
        inventory.add_medicine(MedicineFields::new("Paracetamol", 5, 10, date(2026, 1, 1)));
        inventory.insert_equipment_first(EquipmentFields::new("Mask", 4, "boxed"));
        inventory.update_medicine(1, MedicineFields::new("Paracetamol", 6, 10, date(2026, 1, 1)));
        inventory.remove_equipment_by_id(1);
        inventory.remove_last_medicine();

        assert_eq!(
            messages(&inventory),
            [
                "Added medicine: Paracetamol",
                "Inserted equipment at beginning: Mask",
                "Updated medicine: Paracetamol (ID: 1)",
                "Removed equipment by ID: 1",
                "Removed last medicine: Paracetamol",
            ]
        );
    }

    #[test]
    fn positional_inserts_name_removals_and_clears_leave_activity_lines() {
        let mut inventory = Inventory::default();
        inventory.add_medicine(MedicineFields::new("A", 1, 1, date(2026, 1, 1)));
        inventory.add_medicine(MedicineFields::new("B", 1, 1, date(2026, 1, 1)));
        inventory
            .insert_medicine_at(1, MedicineFields::new("Mid", 1, 1, date(2026, 1, 1)))
            .unwrap();
        inventory.remove_medicine_by_name("mid");
        inventory.clear_medicines();

        assert_eq!(
            messages(&inventory),
            [
                "Added medicine: A",
                "Added medicine: B",
                "Inserted medicine at position 1: Mid",
                "Removed medicine by name: Mid",
                "Cleared 2 medicines",
            ]
        );
    }

    #[test]
    fn equipment_position_updates_and_clears_leave_activity_lines() {
        let mut inventory = Inventory::default();
        inventory.add_equipment(EquipmentFields::new("X", 1, ""));
        inventory.add_equipment(EquipmentFields::new("Z", 1, ""));
        inventory
            .insert_equipment_at(1, EquipmentFields::new("Y", 1, ""))
            .unwrap();
        assert!(inventory.update_equipment_at(1, EquipmentFields::new("Y2", 5, "")));
        assert!(!inventory.update_equipment_at(9, EquipmentFields::new("none", 1, "")));
        assert_eq!(inventory.remove_equipment_at(0).unwrap().name, "X");
        assert!(inventory.remove_equipment_at(9).is_none());
        inventory.remove_equipment_by_name("y2");
        inventory.clear_equipment();

        assert_eq!(
            messages(&inventory),
            [
                "Added equipment: X",
                "Added equipment: Z",
                "Inserted equipment at position 1: Y",
                "Updated equipment: Y2 (ID: 2)",
                "Removed equipment by ID: 1",
                "Removed equipment by name: Y2",
                "Cleared 1 equipment",
            ]
        );
    }

    #[test]
    fn misses_do_not_log() {
        let mut inventory = Inventory::default();
        assert!(inventory.remove_medicine_by_id(4).is_none());
        assert!(inventory.remove_last_equipment().is_none());
        assert!(!inventory.update_equipment(1, EquipmentFields::new("x", 1, "")));
        assert!(inventory
            .insert_medicine_at(3, MedicineFields::new("x", 1, 1, date(2026, 1, 1)))
            .is_err());
        assert!(inventory.activity().is_empty());
    }

    #[test]
    fn sort_logs_field_and_order() {
        let mut inventory = Inventory::default();
        inventory.sort_equipment(EquipmentSortField::Stock, false);
        assert_eq!(messages(&inventory), ["Sorted equipment by stock (descending)"]);
    }

    #[test]
    fn low_stock_scenario() {
        let mut inventory = Inventory::default();
        let first = inventory.add_medicine(MedicineFields::new("Paracetamol", 5, 10, date(2026, 1, 1)));
        assert_eq!((first.id, first.total_quantity), (1, 50));
        let second = inventory.add_medicine(MedicineFields::new("Amoxicillin", 1, 2, date(2025, 6, 1)));
        assert_eq!(second.id, 2);

        let low = inventory.low_stock_medicines(DEFAULT_LOW_STOCK_MEDICINE);
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Amoxicillin");
        assert_eq!(low[0].total_quantity, 2);
    }

    #[test]
    fn expiring_includes_already_expired() {
        let mut inventory = Inventory::default();
        inventory.add_medicine(MedicineFields::new("Old", 1, 1, date(2024, 1, 1)));
        inventory.add_medicine(MedicineFields::new("Edge", 1, 1, date(2026, 1, 31)));
        inventory.add_medicine(MedicineFields::new("Later", 1, 1, date(2026, 2, 1)));

        let expiring = inventory.expiring_within(30, date(2026, 1, 1));
        let names: Vec<&str> = expiring.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Old", "Edge"]);
    }

    #[test]
    fn statistics_use_configured_thresholds() {
        let mut inventory = Inventory::new(InventorySettings {
            low_stock_medicine: 10,
            low_stock_equipment: 1,
            expiry_days: 0,
        });
        inventory.add_medicine(MedicineFields::new("A", 2, 5, date(2026, 3, 1)));
        inventory.add_medicine(MedicineFields::new("B", 2, 6, date(2026, 1, 1)));
        inventory.add_equipment(EquipmentFields::new("C", 1, ""));
        inventory.add_equipment(EquipmentFields::new("D", 2, ""));

        let stats = inventory.statistics(date(2026, 1, 1));
        assert_eq!(
            stats,
            Statistics {
                medicines: 2,
                equipment: 2,
                low_stock_medicines: 1,
                low_stock_equipment: 1,
                expiring_medicines: 1,
            }
        );
    }

    #[test]
    fn default_equipment_threshold_is_three() {
        let mut inventory = Inventory::default();
        inventory.add_equipment(EquipmentFields::new("C", 3, ""));
        inventory.add_equipment(EquipmentFields::new("D", 4, ""));
        assert_eq!(inventory.low_stock_equipment(DEFAULT_LOW_STOCK_EQUIPMENT).len(), 1);
    }
}
