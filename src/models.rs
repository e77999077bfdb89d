//! Domain models for the two inventory collections. These types stay plain
//! data holders so the store can focus on ordering and lookup while the TUI
//! focuses on presentation. Every query hands out owned clones of them, so a
//! caller holding a record never aliases store internals.

use std::fmt;

use chrono::NaiveDate;

/// Sequential, 1-based row identifier. It mirrors the row position at the time
/// of the last append or positional insert rather than acting as a permanent
/// handle (see [`crate::store::RecordStore`]).
pub type RecordId = u32;

/// Medicine rows flag themselves for attention at or below this many packs.
pub const ATTENTION_PACKS: u32 = 2;
/// Medicine rows flag themselves for attention at or below this total.
pub const ATTENTION_MEDICINE_TOTAL: u32 = 5;
/// Equipment rows flag themselves for attention at or below this stock.
pub const ATTENTION_EQUIPMENT_STOCK: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A medicine line item tracked by packs.
pub struct Medicine {
    /// Positional identifier assigned by the store.
    pub id: RecordId,
    /// Display name; duplicates are allowed.
    pub name: String,
    /// Number of packs on the shelf.
    pub packs: u32,
    /// Units contained in a single pack.
    pub items_per_pack: u32,
    /// Units on hand. Written by the caller, normally `packs * items_per_pack`.
    pub total_quantity: u32,
    /// Expiry date of the batch.
    pub expiry: NaiveDate,
}

impl Medicine {
    /// Split the record back into its editable fields.
    pub fn fields(&self) -> MedicineFields {
        MedicineFields {
            name: self.name.clone(),
            packs: self.packs,
            items_per_pack: self.items_per_pack,
            total_quantity: self.total_quantity,
            expiry: self.expiry,
        }
    }

    /// True when the table should tint the row: few packs left or a small
    /// total quantity.
    pub fn needs_attention(&self) -> bool {
        self.packs <= ATTENTION_PACKS || self.total_quantity <= ATTENTION_MEDICINE_TOTAL
    }
}

impl fmt::Display for Medicine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}, Name: {}, Packs: {}, Items/Pack: {}, Total Qty: {}, Expiry: {}",
            self.id,
            self.name,
            self.packs,
            self.items_per_pack,
            self.total_quantity,
            self.expiry.format("%Y-%m-%d")
        )
    }
}

/// Everything about a medicine except its id. Used for append, insert and
/// update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicineFields {
    pub name: String,
    pub packs: u32,
    pub items_per_pack: u32,
    pub total_quantity: u32,
    pub expiry: NaiveDate,
}

impl MedicineFields {
    /// Build fields with the total derived from packs and items per pack. The
    /// product saturates instead of wrapping.
    pub fn new(name: impl Into<String>, packs: u32, items_per_pack: u32, expiry: NaiveDate) -> Self {
        Self {
            name: name.into(),
            packs,
            items_per_pack,
            total_quantity: packs.saturating_mul(items_per_pack),
            expiry,
        }
    }

    /// Build fields with an explicit total. The store never re-derives it.
    pub fn with_total(
        name: impl Into<String>,
        packs: u32,
        items_per_pack: u32,
        total_quantity: u32,
        expiry: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            packs,
            items_per_pack,
            total_quantity,
            expiry,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A piece of equipment counted by units.
pub struct Equipment {
    pub id: RecordId,
    pub name: String,
    pub stock: u32,
    /// Free-form status. The TUI labels it "Description".
    pub status: String,
}

impl Equipment {
    pub fn fields(&self) -> EquipmentFields {
        EquipmentFields {
            name: self.name.clone(),
            stock: self.stock,
            status: self.status.clone(),
        }
    }

    pub fn needs_attention(&self) -> bool {
        self.stock <= ATTENTION_EQUIPMENT_STOCK
    }
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}, Name: {}, Stock: {}, Status: {}",
            self.id, self.name, self.stock, self.status
        )
    }
}

/// Everything about an equipment row except its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentFields {
    pub name: String,
    pub stock: u32,
    pub status: String,
}

impl EquipmentFields {
    pub fn new(name: impl Into<String>, stock: u32, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stock,
            status: status.into(),
        }
    }
}

/// Columns a medicine table can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MedicineSortField {
    Name,
    Expiry,
    TotalQuantity,
    Packs,
}

impl MedicineSortField {
    pub const ALL: [MedicineSortField; 4] = [
        MedicineSortField::Name,
        MedicineSortField::Expiry,
        MedicineSortField::TotalQuantity,
        MedicineSortField::Packs,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MedicineSortField::Name => "name",
            MedicineSortField::Expiry => "expiry",
            MedicineSortField::TotalQuantity => "total_qty",
            MedicineSortField::Packs => "packs",
        }
    }
}

/// Columns an equipment table can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipmentSortField {
    Name,
    Stock,
    Status,
}

impl EquipmentSortField {
    pub const ALL: [EquipmentSortField; 3] = [
        EquipmentSortField::Name,
        EquipmentSortField::Stock,
        EquipmentSortField::Status,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EquipmentSortField::Name => "name",
            EquipmentSortField::Stock => "stock",
            EquipmentSortField::Status => "status",
        }
    }
}

/// One-sided numeric comparison against a quantity column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    /// Value `<=` the bound.
    AtMost(u32),
    /// Value `>=` the bound.
    AtLeast(u32),
}

impl Threshold {
    pub fn admits(self, value: u32) -> bool {
        match self {
            Threshold::AtMost(bound) => value <= bound,
            Threshold::AtLeast(bound) => value >= bound,
        }
    }
}

/// Predicates supported by the medicine store. Text matches ignore case and
/// every range is inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MedicineFilter {
    NameContains(String),
    TotalQuantity(Threshold),
    TotalQuantityBetween { min: u32, max: u32 },
    PacksBetween { min: u32, max: u32 },
    ExpiryBetween { start: NaiveDate, end: NaiveDate },
    /// Expiry on or before the cutoff, with no lower bound.
    ExpiresBy(NaiveDate),
}

/// Predicates supported by the equipment store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EquipmentFilter {
    NameContains(String),
    StatusContains(String),
    /// Matches either the name or the status, as the search box does.
    NameOrStatusContains(String),
    Stock(Threshold),
    StockBetween { min: u32, max: u32 },
}
