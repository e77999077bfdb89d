use std::cmp::Ordering;

use super::{compare_text, contains_ignore_case, Record};
use crate::models::{Medicine, MedicineFields, MedicineFilter, MedicineSortField, RecordId};

impl Record for Medicine {
    type Fields = MedicineFields;
    type SortField = MedicineSortField;
    type Filter = MedicineFilter;

    fn from_fields(id: RecordId, fields: MedicineFields) -> Self {
        Medicine {
            id,
            name: fields.name,
            packs: fields.packs,
            items_per_pack: fields.items_per_pack,
            total_quantity: fields.total_quantity,
            expiry: fields.expiry,
        }
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn overwrite(&mut self, fields: MedicineFields) {
        self.name = fields.name;
        self.packs = fields.packs;
        self.items_per_pack = fields.items_per_pack;
        self.total_quantity = fields.total_quantity;
        self.expiry = fields.expiry;
    }

    fn compare_by(&self, other: &Self, field: MedicineSortField) -> Ordering {
        match field {
            MedicineSortField::Name => compare_text(&self.name, &other.name),
            MedicineSortField::Expiry => self.expiry.cmp(&other.expiry),
            MedicineSortField::TotalQuantity => self.total_quantity.cmp(&other.total_quantity),
            MedicineSortField::Packs => self.packs.cmp(&other.packs),
        }
    }

    fn matches(&self, filter: &MedicineFilter) -> bool {
        match filter {
            MedicineFilter::NameContains(pattern) => contains_ignore_case(&self.name, pattern),
            MedicineFilter::TotalQuantity(threshold) => threshold.admits(self.total_quantity),
            MedicineFilter::TotalQuantityBetween { min, max } => {
                (*min..=*max).contains(&self.total_quantity)
            }
            MedicineFilter::PacksBetween { min, max } => (*min..=*max).contains(&self.packs),
            MedicineFilter::ExpiryBetween { start, end } => {
                *start <= self.expiry && self.expiry <= *end
            }
            MedicineFilter::ExpiresBy(cutoff) => self.expiry <= *cutoff,
        }
    }
}
