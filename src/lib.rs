//! Clinic inventory: in-memory medicine and equipment stores, a rolling
//! activity log and the terminal UI that drives them.
//!
//! The binary wires [`config::AppConfig`] and [`logging::init`] around an
//! [`Inventory`] and hands it to [`run_app`]. Everything below `ui` is usable
//! without a terminal.
pub mod activity;
pub mod config;
pub mod inventory;
pub mod logging;
pub mod models;
pub mod store;
pub mod ui;

pub use activity::{ActivityEntry, ActivityLog, ACTIVITY_CAPACITY};
pub use inventory::{Inventory, InventorySettings, Statistics};
pub use models::{
    Equipment, EquipmentFields, EquipmentFilter, EquipmentSortField, Medicine, MedicineFields,
    MedicineFilter, MedicineSortField, RecordId, Threshold,
};
pub use store::{Record, RecordStore, StoreError};

/// Terminal front-end: `App` wraps an `Inventory`, `run_app` drives it until quit.
pub use ui::{run_app, App};
