use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{
    Equipment, EquipmentFields, EquipmentFilter, EquipmentSortField, Medicine, MedicineFields,
    MedicineFilter, MedicineSortField, RecordId, Threshold,
};

/// Date format accepted by every date input.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// What saving a record form will do.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum FormPurpose {
    Add,
    InsertFirst,
    /// Overwrite the row at `position`; `id` is only shown in the title.
    Update { id: RecordId, position: usize },
}

impl FormPurpose {
    pub(crate) fn title(self, noun: &str) -> String {
        match self {
            FormPurpose::Add => format!("Add {noun}"),
            FormPurpose::InsertFirst => format!("Insert {noun} First"),
            FormPurpose::Update { id, .. } => format!("Update {noun} (ID {id})"),
        }
    }
}

/// Render a `Label: value` line, highlighting the focused field and showing a
/// placeholder for empty ones.
fn field_line(field_name: &str, value: &str, is_active: bool, placeholder: &str) -> Line<'static> {
    let display = if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{field_name}: ")),
        Span::styled(display, style),
    ])
}

/// Internal representation of the medicine form fields.
#[derive(Default, Clone)]
pub(crate) struct MedicineForm {
    pub(crate) name: String,
    pub(crate) packs: String,
    pub(crate) items_per_pack: String,
    pub(crate) expiry: String,
    pub(crate) active: MedicineField,
    pub(crate) error: Option<String>,
}

/// Fields available within the medicine form, in tab order.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum MedicineField {
    #[default]
    Name,
    Packs,
    ItemsPerPack,
    Expiry,
}

impl MedicineField {
    pub(crate) const ORDER: [MedicineField; 4] = [
        MedicineField::Name,
        MedicineField::Packs,
        MedicineField::ItemsPerPack,
        MedicineField::Expiry,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            MedicineField::Name => "Name",
            MedicineField::Packs => "Packs",
            MedicineField::ItemsPerPack => "Items / Pack",
            MedicineField::Expiry => "Expiry (YYYY-MM-DD)",
        }
    }

    fn index(self) -> usize {
        match self {
            MedicineField::Name => 0,
            MedicineField::Packs => 1,
            MedicineField::ItemsPerPack => 2,
            MedicineField::Expiry => 3,
        }
    }
}

impl MedicineForm {
    /// Populate the form from an existing medicine when updating.
    pub(crate) fn from_medicine(medicine: &Medicine) -> Self {
        Self {
            name: medicine.name.clone(),
            packs: medicine.packs.to_string(),
            items_per_pack: medicine.items_per_pack.to_string(),
            expiry: medicine.expiry.format(DATE_FORMAT).to_string(),
            active: MedicineField::Name,
            error: None,
        }
    }

    pub(crate) fn toggle_field(&mut self) {
        let next = (self.active.index() + 1) % MedicineField::ORDER.len();
        self.active = MedicineField::ORDER[next];
    }

    pub(crate) fn previous_field(&mut self) {
        let len = MedicineField::ORDER.len();
        let previous = (self.active.index() + len - 1) % len;
        self.active = MedicineField::ORDER[previous];
    }

    /// Append a character to the active field. Count fields only take digits
    /// and the expiry only takes digits and dashes.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            MedicineField::Name => {
                if ch.is_control() {
                    return false;
                }
                self.name.push(ch);
            }
            MedicineField::Packs => {
                if !ch.is_ascii_digit() {
                    return false;
                }
                self.packs.push(ch);
            }
            MedicineField::ItemsPerPack => {
                if !ch.is_ascii_digit() {
                    return false;
                }
                self.items_per_pack.push(ch);
            }
            MedicineField::Expiry => {
                if !(ch.is_ascii_digit() || ch == '-') {
                    return false;
                }
                self.expiry.push(ch);
            }
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.value_mut(self.active).pop();
    }

    /// Live total shown under the inputs. Anything unparsable counts as zero.
    pub(crate) fn total_preview(&self) -> u32 {
        let packs = self.packs.trim().parse::<u32>().unwrap_or(0);
        let items = self.items_per_pack.trim().parse::<u32>().unwrap_or(0);
        packs.saturating_mul(items)
    }

    /// Validate the inputs and return typed fields with the derived total.
    pub(crate) fn parse_inputs(&self) -> Result<MedicineFields> {
        let name = self.name.trim();
        let packs = self.packs.trim();
        let items = self.items_per_pack.trim();
        let expiry = self.expiry.trim();
        if name.is_empty() || packs.is_empty() || items.is_empty() || expiry.is_empty() {
            return Err(anyhow!("Please fill all medicine fields."));
        }

        let packs = packs
            .parse::<u32>()
            .context("Packs and Items/Pack must be integers.")?;
        let items = items
            .parse::<u32>()
            .context("Packs and Items/Pack must be integers.")?;
        let expiry = parse_date(expiry).context("Expiry date must be in YYYY-MM-DD format.")?;

        Ok(MedicineFields::new(name, packs, items, expiry))
    }

    pub(crate) fn build_line(&self, field: MedicineField) -> Line<'static> {
        let placeholder = match field {
            MedicineField::Name => "<required>",
            MedicineField::Packs => "e.g. 5",
            MedicineField::ItemsPerPack => "e.g. 10",
            MedicineField::Expiry => "YYYY-MM-DD",
        };
        field_line(
            field.label(),
            self.value(field),
            self.active == field,
            placeholder,
        )
    }

    /// Cursor column offset (label plus value) and row for the active field.
    pub(crate) fn cursor(&self) -> (u16, u16) {
        let field = self.active;
        let column = field.label().len() + 2 + self.value(field).chars().count();
        (column as u16, field.index() as u16)
    }

    fn value(&self, field: MedicineField) -> &str {
        match field {
            MedicineField::Name => &self.name,
            MedicineField::Packs => &self.packs,
            MedicineField::ItemsPerPack => &self.items_per_pack,
            MedicineField::Expiry => &self.expiry,
        }
    }

    fn value_mut(&mut self, field: MedicineField) -> &mut String {
        match field {
            MedicineField::Name => &mut self.name,
            MedicineField::Packs => &mut self.packs,
            MedicineField::ItemsPerPack => &mut self.items_per_pack,
            MedicineField::Expiry => &mut self.expiry,
        }
    }
}

/// Form state for equipment. The status column is presented as a
/// description.
#[derive(Default, Clone)]
pub(crate) struct EquipmentForm {
    pub(crate) name: String,
    pub(crate) quantity: String,
    pub(crate) description: String,
    pub(crate) active: EquipmentField,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum EquipmentField {
    #[default]
    Name,
    Quantity,
    Description,
}

impl EquipmentField {
    pub(crate) fn label(self) -> &'static str {
        match self {
            EquipmentField::Name => "Name",
            EquipmentField::Quantity => "Quantity",
            EquipmentField::Description => "Description",
        }
    }

    fn row(self) -> u16 {
        match self {
            EquipmentField::Name => 0,
            EquipmentField::Quantity => 1,
            EquipmentField::Description => 2,
        }
    }
}

impl EquipmentForm {
    pub(crate) fn from_equipment(equipment: &Equipment) -> Self {
        Self {
            name: equipment.name.clone(),
            quantity: equipment.stock.to_string(),
            description: equipment.status.clone(),
            active: EquipmentField::Name,
            error: None,
        }
    }

    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            EquipmentField::Name => EquipmentField::Quantity,
            EquipmentField::Quantity => EquipmentField::Description,
            EquipmentField::Description => EquipmentField::Name,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            EquipmentField::Name => EquipmentField::Description,
            EquipmentField::Quantity => EquipmentField::Name,
            EquipmentField::Description => EquipmentField::Quantity,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            EquipmentField::Quantity => {
                if ch.is_ascii_digit() {
                    self.quantity.push(ch);
                    true
                } else {
                    false
                }
            }
            EquipmentField::Name | EquipmentField::Description => {
                if ch.is_control() {
                    return false;
                }
                self.value_mut(self.active).push(ch);
                true
            }
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.value_mut(self.active).pop();
    }

    /// Name and quantity are required; the description may stay blank.
    pub(crate) fn parse_inputs(&self) -> Result<EquipmentFields> {
        let name = self.name.trim();
        let quantity = self.quantity.trim();
        if name.is_empty() || quantity.is_empty() {
            return Err(anyhow!("Please fill name and quantity for equipment."));
        }
        let stock = quantity
            .parse::<u32>()
            .context("Quantity must be an integer.")?;
        Ok(EquipmentFields::new(name, stock, self.description.trim()))
    }

    pub(crate) fn build_line(&self, field: EquipmentField) -> Line<'static> {
        let placeholder = match field {
            EquipmentField::Name => "<required>",
            EquipmentField::Quantity => "e.g. 3",
            EquipmentField::Description => "e.g. First-aid cabinet",
        };
        field_line(
            field.label(),
            self.value(field),
            self.active == field,
            placeholder,
        )
    }

    pub(crate) fn cursor(&self) -> (u16, u16) {
        let field = self.active;
        let column = field.label().len() + 2 + self.value(field).chars().count();
        (column as u16, field.row())
    }

    fn value(&self, field: EquipmentField) -> &str {
        match field {
            EquipmentField::Name => &self.name,
            EquipmentField::Quantity => &self.quantity,
            EquipmentField::Description => &self.description,
        }
    }

    fn value_mut(&mut self, field: EquipmentField) -> &mut String {
        match field {
            EquipmentField::Name => &mut self.name,
            EquipmentField::Quantity => &mut self.quantity,
            EquipmentField::Description => &mut self.description,
        }
    }
}

/// Single-line numeric prompt used by "remove by ID".
#[derive(Default, Clone)]
pub(crate) struct IdPrompt {
    pub(crate) value: String,
    pub(crate) error: Option<String>,
}

impl IdPrompt {
    /// Pre-fill with the selected row's id so Enter removes what is
    /// highlighted.
    pub(crate) fn with_id(id: Option<RecordId>) -> Self {
        Self {
            value: id.map(|id| id.to_string()).unwrap_or_default(),
            error: None,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_ascii_digit() {
            self.value.push(ch);
            true
        } else {
            false
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.value.pop();
    }

    pub(crate) fn parse_id(&self) -> Result<RecordId> {
        let raw = self.value.trim();
        if raw.is_empty() {
            return Err(anyhow!("Please enter an ID to remove."));
        }
        raw.parse::<RecordId>()
            .context("Please enter a valid integer ID.")
    }
}

/// Column and direction picker for sorting the active table.
#[derive(Clone, Default)]
pub(crate) struct SortPicker {
    pub(crate) index: usize,
    pub(crate) ascending: bool,
}

impl SortPicker {
    pub(crate) fn new() -> Self {
        Self {
            index: 0,
            ascending: true,
        }
    }

    /// Move the highlighted column, wrapping within `len` options.
    pub(crate) fn move_selection(&mut self, offset: isize, len: usize) {
        if len == 0 {
            return;
        }
        let len = len as isize;
        self.index = (self.index as isize + offset).rem_euclid(len) as usize;
    }

    pub(crate) fn toggle_order(&mut self) {
        self.ascending = !self.ascending;
    }

    pub(crate) fn medicine_field(&self) -> MedicineSortField {
        MedicineSortField::ALL[self.index % MedicineSortField::ALL.len()]
    }

    pub(crate) fn equipment_field(&self) -> EquipmentSortField {
        EquipmentSortField::ALL[self.index % EquipmentSortField::ALL.len()]
    }
}

/// Filter choices offered on the medicine tab.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum MedicineFilterKind {
    Name,
    LowStock,
    ExpiryRange,
    PacksRange,
}

impl MedicineFilterKind {
    pub(crate) const ALL: [MedicineFilterKind; 4] = [
        MedicineFilterKind::Name,
        MedicineFilterKind::LowStock,
        MedicineFilterKind::ExpiryRange,
        MedicineFilterKind::PacksRange,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            MedicineFilterKind::Name => "name",
            MedicineFilterKind::LowStock => "low_stock",
            MedicineFilterKind::ExpiryRange => "expiry_range",
            MedicineFilterKind::PacksRange => "packs_range",
        }
    }

    pub(crate) fn hint(self) -> &'static str {
        match self {
            MedicineFilterKind::Name => "part of a name",
            MedicineFilterKind::LowStock => "threshold, e.g. 5",
            MedicineFilterKind::ExpiryRange => "YYYY-MM-DD,YYYY-MM-DD",
            MedicineFilterKind::PacksRange => "min,max e.g. 1,10",
        }
    }

    /// Turn raw filter text into a store predicate.
    pub(crate) fn parse(self, value: &str) -> Result<MedicineFilter> {
        let value = value.trim();
        if value.is_empty() {
            return Err(anyhow!("Please enter a filter value!"));
        }
        match self {
            MedicineFilterKind::Name => Ok(MedicineFilter::NameContains(value.to_string())),
            MedicineFilterKind::LowStock => {
                let threshold = value
                    .parse::<u32>()
                    .context("Low stock threshold must be a number!")?;
                Ok(MedicineFilter::TotalQuantity(Threshold::AtMost(threshold)))
            }
            MedicineFilterKind::ExpiryRange => {
                let (start, end) = split_pair(value)
                    .and_then(|(start, end)| Ok((parse_date(start)?, parse_date(end)?)))
                    .context(
                        "Expiry range format: start_date,end_date (YYYY-MM-DD,YYYY-MM-DD)",
                    )?;
                Ok(MedicineFilter::ExpiryBetween { start, end })
            }
            MedicineFilterKind::PacksRange => {
                let (min, max) =
                    parse_range(value).context("Packs range format: min,max (e.g., 1,10)")?;
                Ok(MedicineFilter::PacksBetween { min, max })
            }
        }
    }
}

/// Filter choices offered on the equipment tab.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum EquipmentFilterKind {
    Name,
    Status,
    StockLevel,
    StockRange,
}

impl EquipmentFilterKind {
    pub(crate) const ALL: [EquipmentFilterKind; 4] = [
        EquipmentFilterKind::Name,
        EquipmentFilterKind::Status,
        EquipmentFilterKind::StockLevel,
        EquipmentFilterKind::StockRange,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            EquipmentFilterKind::Name => "name",
            EquipmentFilterKind::Status => "status",
            EquipmentFilterKind::StockLevel => "stock_level",
            EquipmentFilterKind::StockRange => "stock_range",
        }
    }

    pub(crate) fn hint(self) -> &'static str {
        match self {
            EquipmentFilterKind::Name => "part of a name",
            EquipmentFilterKind::Status => "part of a description",
            EquipmentFilterKind::StockLevel => "threshold,above|below e.g. 5,above",
            EquipmentFilterKind::StockRange => "min,max e.g. 1,10",
        }
    }

    pub(crate) fn parse(self, value: &str) -> Result<EquipmentFilter> {
        let value = value.trim();
        if value.is_empty() {
            return Err(anyhow!("Please enter a filter value!"));
        }
        match self {
            EquipmentFilterKind::Name => Ok(EquipmentFilter::NameContains(value.to_string())),
            EquipmentFilterKind::Status => Ok(EquipmentFilter::StatusContains(value.to_string())),
            EquipmentFilterKind::StockLevel => {
                let threshold = split_pair(value)
                    .and_then(|(threshold, direction)| {
                        let threshold = threshold.parse::<u32>()?;
                        // Anything other than "above" reads as "below".
                        if direction.eq_ignore_ascii_case("above") {
                            Ok(Threshold::AtLeast(threshold))
                        } else {
                            Ok(Threshold::AtMost(threshold))
                        }
                    })
                    .context(
                        "Stock level format: threshold,direction (e.g., 5,above or 3,below)",
                    )?;
                Ok(EquipmentFilter::Stock(threshold))
            }
            EquipmentFilterKind::StockRange => {
                let (min, max) =
                    parse_range(value).context("Stock range format: min,max (e.g., 1,10)")?;
                Ok(EquipmentFilter::StockBetween { min, max })
            }
        }
    }
}

/// Kind selector plus free-text value for the filter popup.
#[derive(Clone, Default)]
pub(crate) struct FilterForm {
    pub(crate) kind: usize,
    pub(crate) value: String,
    pub(crate) error: Option<String>,
}

impl FilterForm {
    pub(crate) fn cycle_kind(&mut self, offset: isize, len: usize) {
        if len == 0 {
            return;
        }
        let len = len as isize;
        self.kind = (self.kind as isize + offset).rem_euclid(len) as usize;
        self.error = None;
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.value.pop();
    }

    pub(crate) fn medicine_kind(&self) -> MedicineFilterKind {
        MedicineFilterKind::ALL[self.kind % MedicineFilterKind::ALL.len()]
    }

    pub(crate) fn equipment_kind(&self) -> EquipmentFilterKind {
        EquipmentFilterKind::ALL[self.kind % EquipmentFilterKind::ALL.len()]
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .with_context(|| format!("invalid date '{}'", raw.trim()))
}

/// Split `a,b` into two trimmed halves.
fn split_pair(value: &str) -> Result<(&str, &str)> {
    let (first, second) = value
        .split_once(',')
        .ok_or_else(|| anyhow!("expected two comma-separated values"))?;
    if second.contains(',') {
        return Err(anyhow!("expected exactly two values"));
    }
    Ok((first.trim(), second.trim()))
}

fn parse_range(value: &str) -> Result<(u32, u32)> {
    let (min, max) = split_pair(value)?;
    Ok((min.parse::<u32>()?, max.parse::<u32>()?))
}
