use std::cmp::Ordering;

use super::{compare_text, contains_ignore_case, Record};
use crate::models::{Equipment, EquipmentFields, EquipmentFilter, EquipmentSortField, RecordId};

impl Record for Equipment {
    type Fields = EquipmentFields;
    type SortField = EquipmentSortField;
    type Filter = EquipmentFilter;

    fn from_fields(id: RecordId, fields: EquipmentFields) -> Self {
        Equipment {
            id,
            name: fields.name,
            stock: fields.stock,
            status: fields.status,
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

    fn overwrite(&mut self, fields: EquipmentFields) {
        self.name = fields.name;
        self.stock = fields.stock;
        self.status = fields.status;
    }

    fn compare_by(&self, other: &Self, field: EquipmentSortField) -> Ordering {
        match field {
            EquipmentSortField::Name => compare_text(&self.name, &other.name),
            EquipmentSortField::Stock => self.stock.cmp(&other.stock),
            EquipmentSortField::Status => compare_text(&self.status, &other.status),
        }
    }

    fn matches(&self, filter: &EquipmentFilter) -> bool {
        match filter {
            EquipmentFilter::NameContains(pattern) => contains_ignore_case(&self.name, pattern),
            EquipmentFilter::StatusContains(pattern) => contains_ignore_case(&self.status, pattern),
            EquipmentFilter::NameOrStatusContains(pattern) => {
                contains_ignore_case(&self.name, pattern)
                    || contains_ignore_case(&self.status, pattern)
            }
            EquipmentFilter::Stock(threshold) => threshold.admits(self.stock),
            EquipmentFilter::StockBetween { min, max } => (*min..=*max).contains(&self.stock),
        }
    }
}
