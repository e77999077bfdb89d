//! End-to-end checks through the public library surface, without a terminal.

use chrono::NaiveDate;

use clinic_inventory::{
    Equipment, EquipmentFields, EquipmentFilter, Inventory, InventorySettings, MedicineFields,
    MedicineSortField, RecordStore, StoreError, ACTIVITY_CAPACITY,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn inventory() -> Inventory {
    Inventory::new(InventorySettings::default())
}

#[test]
fn paracetamol_and_amoxicillin() {
    let mut inventory = inventory();
    let paracetamol =
        inventory.add_medicine(MedicineFields::new("Paracetamol", 5, 10, date(2026, 1, 1)));
    assert_eq!(paracetamol.id, 1);
    assert_eq!(paracetamol.total_quantity, 50);

    let amoxicillin =
        inventory.add_medicine(MedicineFields::new("Amoxicillin", 1, 2, date(2025, 6, 1)));
    assert_eq!(amoxicillin.id, 2);

    let low = inventory.low_stock_medicines(5);
    assert_eq!(low, vec![amoxicillin]);
}

#[test]
fn insert_at_front_renumbers_existing_rows() {
    let mut inventory = inventory();
    inventory.add_medicine(MedicineFields::new("A", 1, 1, date(2026, 1, 1)));
    inventory.add_medicine(MedicineFields::new("B", 1, 1, date(2026, 1, 1)));

    let z = inventory
        .insert_medicine_at(0, MedicineFields::new("Z", 1, 1, date(2026, 1, 1)))
        .unwrap();
    assert_eq!(z.id, 1);

    let rows: Vec<(u32, String)> = inventory
        .medicines()
        .records()
        .iter()
        .map(|m| (m.id, m.name.clone()))
        .collect();
    assert_eq!(
        rows,
        [(1, "Z".to_string()), (2, "A".to_string()), (3, "B".to_string())]
    );
}

#[test]
fn two_front_inserts_stack_newest_first() {
    let mut store: RecordStore<Equipment> = RecordStore::new();
    store.append(EquipmentFields::new("base", 1, ""));
    store.insert_at(0, EquipmentFields::new("r", 1, "")).unwrap();
    store.insert_at(0, EquipmentFields::new("r'", 1, "")).unwrap();

    let rows: Vec<(u32, &str)> = store
        .records()
        .iter()
        .map(|e| (e.id, e.name.as_str()))
        .collect();
    assert_eq!(rows, [(1, "r'"), (2, "r"), (3, "base")]);
}

#[test]
fn out_of_bounds_insert_leaves_store_untouched() {
    let mut inventory = inventory();
    inventory.add_equipment(EquipmentFields::new("Gloves", 10, "boxed"));

    let err = inventory
        .insert_equipment_at(5, EquipmentFields::new("Mask", 1, ""))
        .unwrap_err();
    assert_eq!(err, StoreError::OutOfBounds { position: 5, len: 1 });
    assert_eq!(
        err.to_string(),
        "Index 5 is out of bounds for a store of size 1."
    );
    assert_eq!(inventory.equipment().count(), 1);
    assert_eq!(inventory.activity().len(), 1);
}

#[test]
fn removal_keeps_gaps_and_append_can_repeat_an_id() {
    let mut inventory = inventory();
    for name in ["A", "B", "C"] {
        inventory.add_equipment(EquipmentFields::new(name, 1, ""));
    }
    assert!(inventory.remove_equipment_by_id(2).is_some());
    assert!(inventory.equipment().find_by_id(2).is_none());

    let ids: Vec<u32> = inventory.equipment().records().iter().map(|e| e.id).collect();
    assert_eq!(ids, [1, 3]);

    // len + 1 collides with the surviving "C".
    let d = inventory.add_equipment(EquipmentFields::new("D", 1, ""));
    assert_eq!(d.id, 3);
    assert_eq!(inventory.equipment().find_by_id(3).unwrap().name, "C");
}

#[test]
fn stock_range_filter_is_inclusive_and_ordered() {
    let mut store: RecordStore<Equipment> = RecordStore::new();
    for (name, stock) in [("Gloves", 0), ("Thermometer", 5), ("Bandage", 15)] {
        store.append(EquipmentFields::new(name, stock, ""));
    }
    let matched = store.filter(&EquipmentFilter::StockBetween { min: 1, max: 10 });
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].stock, 5);
}

#[test]
fn slice_past_the_end_returns_what_exists() {
    let mut inventory = inventory();
    inventory.add_medicine(MedicineFields::new("A", 1, 1, date(2026, 1, 1)));
    inventory.add_medicine(MedicineFields::new("B", 1, 1, date(2026, 1, 1)));
    assert_eq!(inventory.medicines().slice(0, 3).len(), 2);
    assert!(inventory.medicines().slice(4, 9).is_empty());
}

#[test]
fn case_insensitive_name_lookups_take_the_first_match() {
    let mut inventory = inventory();
    inventory.add_medicine(MedicineFields::new("Ibuprofen", 1, 1, date(2026, 1, 1)));
    inventory.add_medicine(MedicineFields::new("IBUPROFEN", 2, 1, date(2026, 1, 1)));

    assert_eq!(inventory.medicines().count_by_name("ibuprofen"), 2);
    let removed = inventory.remove_medicine_by_name("ibuprofen").unwrap();
    assert_eq!(removed.packs, 1);
    assert_eq!(inventory.medicines().find_by_name("Ibuprofen").unwrap().packs, 2);
}

#[test]
fn activity_panel_keeps_the_latest_lines() {
    let mut inventory = Inventory::started(InventorySettings::default());
    for packs in 1..=8 {
        inventory.add_medicine(MedicineFields::new(format!("M{packs}"), packs, 1, date(2026, 1, 1)));
    }
    inventory.sort_medicines(MedicineSortField::Packs, false);

    let lines = inventory.activity().snapshot();
    assert_eq!(lines.len(), ACTIVITY_CAPACITY);
    assert!(lines[0].ends_with("Added medicine: M3"));
    assert!(lines[6].ends_with("Sorted medicines by packs (descending)"));
    assert!(lines.iter().all(|line| line.starts_with('[')));
}

#[test]
fn statistics_follow_mutations() {
    let mut inventory = inventory();
    let today = date(2026, 1, 1);
    inventory.add_medicine(MedicineFields::new("Soon", 10, 10, date(2026, 1, 15)));
    inventory.add_medicine(MedicineFields::new("Low", 1, 1, date(2027, 1, 1)));
    inventory.add_equipment(EquipmentFields::new("Scale", 1, "calibrate"));

    let stats = inventory.statistics(today);
    assert_eq!(stats.medicines, 2);
    assert_eq!(stats.low_stock_medicines, 1);
    assert_eq!(stats.low_stock_equipment, 1);
    assert_eq!(stats.expiring_medicines, 1);

    inventory.clear_medicines();
    let stats = inventory.statistics(today);
    assert_eq!(stats.medicines, 0);
    assert_eq!(stats.expiring_medicines, 0);
}

#[test]
fn expiring_now_includes_long_expired_batches() {
    let mut inventory = inventory();
    inventory.add_medicine(MedicineFields::new("Expired", 1, 1, date(2000, 1, 1)));
    inventory.add_medicine(MedicineFields::new("Distant", 1, 1, date(9999, 1, 1)));

    let expiring = inventory.expiring_within_now(30);
    assert_eq!(expiring.len(), 1);
    assert_eq!(expiring[0].name, "Expired");
}

#[test]
fn update_from_existing_fields_keeps_id_and_position() {
    let mut inventory = inventory();
    inventory.add_equipment(EquipmentFields::new("Gloves", 10, "boxed"));
    let scale = inventory.add_equipment(EquipmentFields::new("Scale", 1, "calibrate"));

    let mut fields = scale.fields();
    fields.stock = 4;
    assert!(inventory.update_equipment(scale.id, fields));

    let updated = inventory.equipment().get_by_index(1).unwrap();
    assert_eq!((updated.id, updated.stock), (2, 4));
    assert_eq!(updated.status, "calibrate");

    let medicine = inventory.add_medicine(MedicineFields::new("Saline", 2, 6, date(2026, 5, 1)));
    let mut fields = medicine.fields();
    fields.name = "Saline 0.9%".into();
    assert!(inventory.update_medicine(medicine.id, fields));
    assert_eq!(
        inventory.medicines().find_by_id(1).unwrap().total_quantity,
        12
    );
}
