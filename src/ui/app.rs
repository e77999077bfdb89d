use std::mem;

use anyhow::{anyhow, Result};
use chrono::Local;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Clear, List, ListItem, Paragraph, Table, TableState, Tabs, Wrap,
};
use ratatui::Frame;

use crate::activity::ACTIVITY_CAPACITY;
use crate::inventory::{expiry_cutoff, Inventory};
use crate::models::{
    Equipment, EquipmentFilter, EquipmentSortField, Medicine, MedicineFilter, MedicineSortField,
    RecordId, Threshold,
};

use super::forms::{
    EquipmentField, EquipmentFilterKind, EquipmentForm, FilterForm, FormPurpose, IdPrompt,
    MedicineField, MedicineFilterKind, MedicineForm, SortPicker, DATE_FORMAT,
};
use super::helpers::{
    centered_rect, clock_label, equipment_row, header_row, medicine_row, statistics_line,
    surface_error, EQUIPMENT_HEADERS, MEDICINE_HEADERS,
};
use super::screens::{InfoPopup, Tab, TableView};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Activity panel height: one line per retained entry plus borders.
const ACTIVITY_HEIGHT: u16 = ACTIVITY_CAPACITY as u16 + 2;
/// Rows shown by the "view first" popup.
const FIRST_ROWS: usize = 3;
/// Rows skipped by PageUp/PageDown.
const PAGE: isize = 5;

/// Fine-grained modes layered over the tables.
enum Mode {
    Normal,
    EditingMedicine {
        purpose: FormPurpose,
        form: MedicineForm,
    },
    EditingEquipment {
        purpose: FormPurpose,
        form: EquipmentForm,
    },
    RemovingById(IdPrompt),
    ConfirmRemoveLast,
    Sorting(SortPicker),
    Filtering(FilterForm),
    Searching(SearchState),
    Viewing(InfoPopup),
}

/// State for an active inline search.
#[derive(Default)]
struct SearchState {
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    inventory: Inventory,
    tab: Tab,
    medicines: TableView<Medicine>,
    equipment: TableView<Equipment>,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(inventory: Inventory) -> Self {
        let mut app = Self {
            inventory,
            tab: Tab::Medicines,
            medicines: TableView::new(),
            equipment: TableView::new(),
            mode: Mode::Normal,
            status: None,
        };
        app.refresh_tables();
        app
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Route a key press to the active mode. Returns `true` when the user asked
    /// to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::EditingMedicine { purpose, form } => {
                self.handle_medicine_form(code, purpose, form)
            }
            Mode::EditingEquipment { purpose, form } => {
                self.handle_equipment_form(code, purpose, form)
            }
            Mode::RemovingById(prompt) => self.handle_remove_by_id(code, prompt),
            Mode::ConfirmRemoveLast => self.handle_confirm_remove_last(code),
            Mode::Sorting(picker) => self.handle_sort(code, picker),
            Mode::Filtering(form) => self.handle_filter(code, form),
            Mode::Searching(state) => self.handle_search(code, state),
            Mode::Viewing(_) => Mode::Normal,
        };

        exit
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => {
                if self.clear_filter() {
                    self.set_status("Filter cleared.", StatusKind::Info);
                } else {
                    *exit = true;
                }
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.clear_status();
                self.tab = self.tab.toggle();
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-PAGE),
            KeyCode::PageDown => self.move_selection(PAGE),
            KeyCode::Home => match self.tab {
                Tab::Medicines => self.medicines.select_first(),
                Tab::Equipment => self.equipment.select_first(),
            },
            KeyCode::End => match self.tab {
                Tab::Medicines => self.medicines.select_last(),
                Tab::Equipment => self.equipment.select_last(),
            },
            KeyCode::Char('+') | KeyCode::Char('a') => {
                self.clear_status();
                return self.open_form(FormPurpose::Add);
            }
            KeyCode::Char('i') => {
                self.clear_status();
                return self.open_form(FormPurpose::InsertFirst);
            }
            KeyCode::Char('e') | KeyCode::Enter => return self.open_update_form(),
            KeyCode::Char('d') => {
                self.clear_status();
                let selected = self.selected_position().map(|(_, id)| id);
                return Mode::RemovingById(IdPrompt::with_id(selected));
            }
            KeyCode::Char('x') => {
                if self.active_is_empty() {
                    self.set_status(
                        format!("No {} to remove.", self.tab.noun()),
                        StatusKind::Error,
                    );
                } else {
                    self.clear_status();
                    return Mode::ConfirmRemoveLast;
                }
            }
            KeyCode::Char('v') => return self.view_last(),
            KeyCode::Char('3') => return self.view_first_rows(),
            KeyCode::Char('o') => {
                self.clear_status();
                return Mode::Sorting(SortPicker::new());
            }
            KeyCode::Char('f') => {
                self.clear_status();
                return Mode::Filtering(FilterForm::default());
            }
            KeyCode::Char('/') => {
                self.clear_status();
                match self.tab {
                    Tab::Medicines => self.medicines.stash_filter(self.inventory.medicines()),
                    Tab::Equipment => self.equipment.stash_filter(self.inventory.equipment()),
                }
                return Mode::Searching(SearchState::default());
            }
            KeyCode::Char('c') => {
                if self.clear_filter() {
                    self.set_status("Filter cleared.", StatusKind::Info);
                } else {
                    self.set_status("No filter active.", StatusKind::Info);
                }
            }
            KeyCode::Char('l') => self.show_low_stock(),
            KeyCode::Char('w') => self.show_expiring(),
            _ => {}
        }
        Mode::Normal
    }

    fn handle_medicine_form(
        &mut self,
        code: KeyCode,
        purpose: FormPurpose,
        mut form: MedicineForm,
    ) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status(
                    format!("{} cancelled.", purpose.title("medicine")),
                    StatusKind::Info,
                );
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.toggle_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_medicine(purpose, &form) {
                Ok(()) => return Mode::Normal,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::EditingMedicine { purpose, form }
    }

    fn handle_equipment_form(
        &mut self,
        code: KeyCode,
        purpose: FormPurpose,
        mut form: EquipmentForm,
    ) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status(
                    format!("{} cancelled.", purpose.title("equipment")),
                    StatusKind::Info,
                );
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.toggle_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_equipment(purpose, &form) {
                Ok(()) => return Mode::Normal,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::EditingEquipment { purpose, form }
    }

    fn handle_remove_by_id(&mut self, code: KeyCode, mut prompt: IdPrompt) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Removal cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Backspace => prompt.backspace(),
            KeyCode::Enter => match self.remove_by_id(&prompt) {
                Ok(()) => return Mode::Normal,
                Err(err) => {
                    let message = surface_error(&err);
                    prompt.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if prompt.push_char(ch) {
                    prompt.error = None;
                }
            }
            _ => {}
        }
        Mode::RemovingById(prompt)
    }

    fn handle_confirm_remove_last(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Removal cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => self.remove_last(),
            _ => Mode::ConfirmRemoveLast,
        }
    }

    fn handle_sort(&mut self, code: KeyCode, mut picker: SortPicker) -> Mode {
        let options = self.sort_options().len();
        match code {
            KeyCode::Esc => {
                self.set_status("Sort cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Up => picker.move_selection(-1, options),
            KeyCode::Down => picker.move_selection(1, options),
            KeyCode::Left
            | KeyCode::Right
            | KeyCode::Tab
            | KeyCode::BackTab
            | KeyCode::Char(' ') => picker.toggle_order(),
            KeyCode::Enter => {
                self.apply_sort(&picker);
                return Mode::Normal;
            }
            _ => {}
        }
        Mode::Sorting(picker)
    }

    fn handle_filter(&mut self, code: KeyCode, mut form: FilterForm) -> Mode {
        let kinds = self.filter_kind_labels().len();
        match code {
            KeyCode::Esc => {
                self.set_status("Filter cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Up | KeyCode::BackTab => form.cycle_kind(-1, kinds),
            KeyCode::Down | KeyCode::Tab => form.cycle_kind(1, kinds),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.apply_filter(&form) {
                Ok(()) => return Mode::Normal,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::Filtering(form)
    }

    /// Incremental search: every keystroke re-filters the active table.
    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Mode {
        match code {
            KeyCode::Esc => {
                if self.restore_filter() {
                    self.set_status(
                        "Search cancelled. Previous filter restored.",
                        StatusKind::Info,
                    );
                } else {
                    self.set_status("Search cancelled.", StatusKind::Info);
                }
                return Mode::Normal;
            }
            KeyCode::Enter => {
                if state.query.trim().is_empty() {
                    self.restore_filter();
                    self.set_status("Enter search keywords.", StatusKind::Info);
                } else {
                    match self.tab {
                        Tab::Medicines => self.medicines.drop_stash(),
                        Tab::Equipment => self.equipment.drop_stash(),
                    }
                    let found = self.active_row_count();
                    self.set_status(
                        format!("{found} {} match '{}'.", self.tab.noun(), state.query.trim()),
                        StatusKind::Info,
                    );
                }
                return Mode::Normal;
            }
            KeyCode::Backspace => {
                state.query.pop();
                self.apply_search(&state.query);
            }
            KeyCode::Char(ch) => {
                if !ch.is_control() {
                    state.query.push(ch);
                    self.apply_search(&state.query);
                }
            }
            _ => {}
        }
        Mode::Searching(state)
    }

    fn open_form(&self, purpose: FormPurpose) -> Mode {
        match self.tab {
            Tab::Medicines => Mode::EditingMedicine {
                purpose,
                form: MedicineForm::default(),
            },
            Tab::Equipment => Mode::EditingEquipment {
                purpose,
                form: EquipmentForm::default(),
            },
        }
    }

    fn open_update_form(&mut self) -> Mode {
        let mode = match self.tab {
            Tab::Medicines => {
                self.medicines
                    .current_with_position()
                    .map(|(position, medicine)| Mode::EditingMedicine {
                        purpose: FormPurpose::Update {
                            id: medicine.id,
                            position,
                        },
                        form: MedicineForm::from_medicine(medicine),
                    })
            }
            Tab::Equipment => {
                self.equipment
                    .current_with_position()
                    .map(|(position, equipment)| Mode::EditingEquipment {
                        purpose: FormPurpose::Update {
                            id: equipment.id,
                            position,
                        },
                        form: EquipmentForm::from_equipment(equipment),
                    })
            }
        };
        match mode {
            Some(mode) => {
                self.clear_status();
                mode
            }
            None => {
                self.set_status(
                    format!("Please select a {} to update.", self.tab.singular()),
                    StatusKind::Error,
                );
                Mode::Normal
            }
        }
    }

    fn save_medicine(&mut self, purpose: FormPurpose, form: &MedicineForm) -> Result<()> {
        let fields = form.parse_inputs()?;
        let (position, message) = match purpose {
            FormPurpose::Add => {
                let medicine = self.inventory.add_medicine(fields);
                (
                    self.inventory.medicines().count() - 1,
                    format!("Added medicine: {}.", medicine.name),
                )
            }
            FormPurpose::InsertFirst => {
                self.inventory.insert_medicine_first(fields);
                (0, "Medicine inserted at the beginning of the list.".to_string())
            }
            FormPurpose::Update { id, position } => {
                if !self.inventory.update_medicine_at(position, fields) {
                    return Err(anyhow!("Failed to update medicine ID {id}."));
                }
                (position, format!("Medicine ID {id} updated successfully."))
            }
        };
        self.medicines.refresh_focus(self.inventory.medicines(), position);
        self.set_status(message, StatusKind::Info);
        Ok(())
    }

    fn save_equipment(&mut self, purpose: FormPurpose, form: &EquipmentForm) -> Result<()> {
        let fields = form.parse_inputs()?;
        let (position, message) = match purpose {
            FormPurpose::Add => {
                let equipment = self.inventory.add_equipment(fields);
                (
                    self.inventory.equipment().count() - 1,
                    format!("Added equipment: {}.", equipment.name),
                )
            }
            FormPurpose::InsertFirst => {
                self.inventory.insert_equipment_first(fields);
                (0, "Equipment inserted at the beginning of the list.".to_string())
            }
            FormPurpose::Update { id, position } => {
                if !self.inventory.update_equipment_at(position, fields) {
                    return Err(anyhow!("Failed to update equipment ID {id}."));
                }
                (position, format!("Equipment ID {id} updated successfully."))
            }
        };
        self.equipment.refresh_focus(self.inventory.equipment(), position);
        self.set_status(message, StatusKind::Info);
        Ok(())
    }

    fn remove_by_id(&mut self, prompt: &IdPrompt) -> Result<()> {
        let id = prompt.parse_id()?;
        // The highlighted row wins when it carries the typed id; otherwise the
        // id must name exactly one row.
        let selected = self
            .selected_position()
            .filter(|&(_, selected_id)| selected_id == id)
            .map(|(position, _)| position);
        let removed = match (self.tab, selected) {
            (Tab::Medicines, Some(position)) => {
                self.inventory.remove_medicine_at(position).is_some()
            }
            (Tab::Equipment, Some(position)) => {
                self.inventory.remove_equipment_at(position).is_some()
            }
            (tab, None) => {
                let matches = match tab {
                    Tab::Medicines => self.inventory.medicines().count_by_id(id),
                    Tab::Equipment => self.inventory.equipment().count_by_id(id),
                };
                if matches > 1 {
                    return Err(anyhow!(
                        "ID {id} is shared by {matches} {}. Highlight the row to remove and press d.",
                        tab.noun()
                    ));
                }
                match tab {
                    Tab::Medicines => self.inventory.remove_medicine_by_id(id).is_some(),
                    Tab::Equipment => self.inventory.remove_equipment_by_id(id).is_some(),
                }
            }
        };
        if !removed {
            return Err(anyhow!("No {} found with ID {id}.", self.tab.singular()));
        }
        self.refresh_tables();
        self.set_status(
            format!("{} with ID {id} removed.", self.tab.title()),
            StatusKind::Info,
        );
        Ok(())
    }

    fn remove_last(&mut self) -> Mode {
        let details = match self.tab {
            Tab::Medicines => self
                .inventory
                .remove_last_medicine()
                .map(|medicine| (medicine.name.clone(), medicine_details(&medicine))),
            Tab::Equipment => self
                .inventory
                .remove_last_equipment()
                .map(|equipment| (equipment.name.clone(), equipment_details(&equipment))),
        };
        self.refresh_tables();

        match details {
            Some((name, lines)) => {
                self.set_status(
                    format!("Removed last {}: {name}", self.tab.singular()),
                    StatusKind::Info,
                );
                Mode::Viewing(InfoPopup::new(
                    format!("Removed Last {}", self.tab.title()),
                    lines,
                ))
            }
            None => {
                self.set_status(
                    format!("No {} to remove.", self.tab.noun()),
                    StatusKind::Error,
                );
                Mode::Normal
            }
        }
    }

    fn view_last(&mut self) -> Mode {
        let lines = match self.tab {
            Tab::Medicines => self.inventory.medicines().last().map(|m| medicine_details(&m)),
            Tab::Equipment => self.inventory.equipment().last().map(|e| equipment_details(&e)),
        };
        match lines {
            Some(lines) => {
                self.clear_status();
                Mode::Viewing(InfoPopup::new(
                    format!("Last {} in List", self.tab.title()),
                    lines,
                ))
            }
            None => {
                self.set_status(
                    format!("No {} in inventory.", self.tab.noun()),
                    StatusKind::Info,
                );
                Mode::Normal
            }
        }
    }

    fn view_first_rows(&mut self) -> Mode {
        let lines: Vec<String> = match self.tab {
            Tab::Medicines => self
                .inventory
                .medicines()
                .slice(0, FIRST_ROWS)
                .iter()
                .map(ToString::to_string)
                .collect(),
            Tab::Equipment => self
                .inventory
                .equipment()
                .slice(0, FIRST_ROWS)
                .iter()
                .map(ToString::to_string)
                .collect(),
        };
        if lines.is_empty() {
            self.set_status(
                format!("No {} in inventory.", self.tab.noun()),
                StatusKind::Info,
            );
            return Mode::Normal;
        }
        self.clear_status();
        Mode::Viewing(InfoPopup::new(
            format!("First {FIRST_ROWS} {} in List", title_plural(self.tab)),
            lines,
        ))
    }

    fn apply_sort(&mut self, picker: &SortPicker) {
        let label = match self.tab {
            Tab::Medicines => {
                let field = picker.medicine_field();
                self.inventory.sort_medicines(field, picker.ascending);
                field.label()
            }
            Tab::Equipment => {
                let field = picker.equipment_field();
                self.inventory.sort_equipment(field, picker.ascending);
                field.label()
            }
        };
        self.refresh_tables();
        self.set_status(
            format!(
                "{} sorted by {label} ({})",
                title_plural(self.tab),
                if picker.ascending {
                    "ascending"
                } else {
                    "descending"
                }
            ),
            StatusKind::Info,
        );
    }

    fn apply_filter(&mut self, form: &FilterForm) -> Result<()> {
        let found = match self.tab {
            Tab::Medicines => {
                let kind = form.medicine_kind();
                let filter = kind.parse(&form.value)?;
                self.medicines.set_filter(
                    self.inventory.medicines(),
                    filter,
                    format!("{}: {}", kind.label(), form.value.trim()),
                )
            }
            Tab::Equipment => {
                let kind = form.equipment_kind();
                let filter = kind.parse(&form.value)?;
                self.equipment.set_filter(
                    self.inventory.equipment(),
                    filter,
                    format!("{}: {}", kind.label(), form.value.trim()),
                )
            }
        };
        self.report_matches(found);
        Ok(())
    }

    fn apply_search(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            self.clear_filter();
            return;
        }
        let label = format!("search: {query}");
        match self.tab {
            Tab::Medicines => {
                self.medicines.set_filter(
                    self.inventory.medicines(),
                    MedicineFilter::NameContains(query.to_string()),
                    label,
                );
            }
            Tab::Equipment => {
                self.equipment.set_filter(
                    self.inventory.equipment(),
                    EquipmentFilter::NameOrStatusContains(query.to_string()),
                    label,
                );
            }
        }
    }

    fn show_low_stock(&mut self) {
        let settings = self.inventory.settings();
        let found = match self.tab {
            Tab::Medicines => self.medicines.set_filter(
                self.inventory.medicines(),
                MedicineFilter::TotalQuantity(Threshold::AtMost(settings.low_stock_medicine)),
                format!("low stock: total <= {}", settings.low_stock_medicine),
            ),
            Tab::Equipment => self.equipment.set_filter(
                self.inventory.equipment(),
                EquipmentFilter::Stock(Threshold::AtMost(settings.low_stock_equipment)),
                format!("low stock: stock <= {}", settings.low_stock_equipment),
            ),
        };
        self.report_matches(found);
    }

    fn show_expiring(&mut self) {
        if self.tab != Tab::Medicines {
            self.set_status("Only medicines have expiry dates.", StatusKind::Error);
            return;
        }
        let days = self.inventory.settings().expiry_days;
        let cutoff = expiry_cutoff(Local::now().date_naive(), days);
        let found = self.medicines.set_filter(
            self.inventory.medicines(),
            MedicineFilter::ExpiresBy(cutoff),
            format!("expiring within {days} days"),
        );
        self.report_matches(found);
    }

    fn report_matches(&mut self, found: usize) {
        if found == 0 {
            let message = match self.tab {
                Tab::Medicines => "No medicines match the filter criteria.".to_string(),
                Tab::Equipment => "No equipment matches the filter criteria.".to_string(),
            };
            self.set_status(message, StatusKind::Info);
        } else {
            self.set_status(
                format!("Found {found} {} matching the filter.", self.tab.noun()),
                StatusKind::Info,
            );
        }
    }

    fn sort_options(&self) -> Vec<&'static str> {
        match self.tab {
            Tab::Medicines => MedicineSortField::ALL.iter().map(|f| f.label()).collect(),
            Tab::Equipment => EquipmentSortField::ALL.iter().map(|f| f.label()).collect(),
        }
    }

    fn filter_kind_labels(&self) -> Vec<&'static str> {
        match self.tab {
            Tab::Medicines => MedicineFilterKind::ALL.iter().map(|k| k.label()).collect(),
            Tab::Equipment => EquipmentFilterKind::ALL.iter().map(|k| k.label()).collect(),
        }
    }

    fn refresh_tables(&mut self) {
        self.medicines.refresh(self.inventory.medicines());
        self.equipment.refresh(self.inventory.equipment());
    }

    fn clear_filter(&mut self) -> bool {
        match self.tab {
            Tab::Medicines => self.medicines.clear_filter(self.inventory.medicines()),
            Tab::Equipment => self.equipment.clear_filter(self.inventory.equipment()),
        }
    }

    fn restore_filter(&mut self) -> bool {
        match self.tab {
            Tab::Medicines => self.medicines.restore_filter(self.inventory.medicines()),
            Tab::Equipment => self.equipment.restore_filter(self.inventory.equipment()),
        }
    }

    fn move_selection(&mut self, offset: isize) {
        match self.tab {
            Tab::Medicines => self.medicines.move_selection(offset),
            Tab::Equipment => self.equipment.move_selection(offset),
        }
    }

    /// Store position and id of the highlighted row.
    fn selected_position(&self) -> Option<(usize, RecordId)> {
        match self.tab {
            Tab::Medicines => self
                .medicines
                .current_with_position()
                .map(|(position, m)| (position, m.id)),
            Tab::Equipment => self
                .equipment
                .current_with_position()
                .map(|(position, e)| (position, e.id)),
        }
    }

    fn active_is_empty(&self) -> bool {
        match self.tab {
            Tab::Medicines => self.inventory.medicines().is_empty(),
            Tab::Equipment => self.inventory.equipment().is_empty(),
        }
    }

    fn active_row_count(&self) -> usize {
        match self.tab {
            Tab::Medicines => self.medicines.rows.len(),
            Tab::Equipment => self.equipment.rows.len(),
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(ACTIVITY_HEIGHT),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);
        let stats = self.inventory.statistics(Local::now().date_naive());
        frame.render_widget(Paragraph::new(statistics_line(&stats)), chunks[1]);
        match self.tab {
            Tab::Medicines => self.draw_medicine_table(frame, chunks[2]),
            Tab::Equipment => self.draw_equipment_table(frame, chunks[2]),
        }
        self.draw_activity(frame, chunks[3]);
        self.draw_footer(frame, chunks[4]);

        match &self.mode {
            Mode::EditingMedicine { purpose, form } => {
                self.draw_medicine_form(frame, area, &purpose.title("Medicine"), form)
            }
            Mode::EditingEquipment { purpose, form } => {
                self.draw_equipment_form(frame, area, &purpose.title("Equipment"), form)
            }
            Mode::RemovingById(prompt) => self.draw_id_prompt(frame, area, prompt),
            Mode::ConfirmRemoveLast => self.draw_confirm_remove_last(frame, area),
            Mode::Sorting(picker) => self.draw_sort_picker(frame, area, picker),
            Mode::Filtering(form) => self.draw_filter_form(frame, area, form),
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::Viewing(popup) => self.draw_info_popup(frame, area, popup),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(16)])
            .split(area);

        let tabs = Tabs::new(vec!["Medicines", "Equipment"])
            .select(self.tab.index())
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, chunks[0]);

        let clock = Paragraph::new(clock_label(Local::now().time())).alignment(Alignment::Right);
        frame.render_widget(clock, chunks[1]);
    }

    fn draw_medicine_table(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(table_title("Medicines", self.medicines.filter_label()));

        if self.medicines.rows.is_empty() {
            let text = if self.medicines.filter.is_some() {
                "No medicines match. Press 'c' to clear the filter."
            } else {
                "No medicines yet. Press '+' to add one."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let rows: Vec<_> = self.medicines.rows.iter().map(medicine_row).collect();
        let widths = [
            Constraint::Length(4),
            Constraint::Min(20),
            Constraint::Length(7),
            Constraint::Length(11),
            Constraint::Length(10),
            Constraint::Length(11),
        ];
        let table = Table::new(rows, widths)
            .header(header_row(&MEDICINE_HEADERS))
            .block(block)
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = TableState::default().with_selected(Some(self.medicines.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_equipment_table(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(table_title("Equipment", self.equipment.filter_label()));

        if self.equipment.rows.is_empty() {
            let text = if self.equipment.filter.is_some() {
                "No equipment matches. Press 'c' to clear the filter."
            } else {
                "No equipment yet. Press '+' to add some."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let rows: Vec<_> = self.equipment.rows.iter().map(equipment_row).collect();
        let widths = [
            Constraint::Length(4),
            Constraint::Percentage(40),
            Constraint::Length(10),
            Constraint::Min(20),
        ];
        let table = Table::new(rows, widths)
            .header(header_row(&EQUIPMENT_HEADERS))
            .block(block)
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = TableState::default().with_selected(Some(self.equipment.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_activity(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .inventory
            .activity()
            .snapshot()
            .into_iter()
            .map(ListItem::new)
            .collect();
        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Recent Activity Log"),
        );
        frame.render_widget(list, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match &self.mode {
            Mode::EditingMedicine { .. } | Mode::EditingEquipment { .. } => &[
                ("[Tab/↑↓]", "Field"),
                ("[Enter]", "Save"),
                ("[Esc]", "Cancel"),
            ],
            Mode::Sorting(_) => &[
                ("[↑↓]", "Column"),
                ("[←→]", "Order"),
                ("[Enter]", "Sort"),
                ("[Esc]", "Cancel"),
            ],
            Mode::Filtering(_) => &[
                ("[↑↓]", "Kind"),
                ("[Enter]", "Apply"),
                ("[Esc]", "Cancel"),
            ],
            Mode::Searching(_) => &[("[Enter]", "Keep"), ("[Esc]", "Cancel")],
            Mode::RemovingById(_) => &[("[Enter]", "Remove"), ("[Esc]", "Cancel")],
            Mode::ConfirmRemoveLast => &[("[y]", "Remove"), ("[n]", "Keep")],
            Mode::Viewing(_) => &[("[any key]", "Close")],
            Mode::Normal => &[
                ("[Tab]", "Switch"),
                ("[+]", "Add"),
                ("[i]", "Insert First"),
                ("[e]", "Update"),
                ("[d]", "Remove ID"),
                ("[x]", "Remove Last"),
                ("[v]", "Last"),
                ("[3]", "First 3"),
                ("[o]", "Sort"),
                ("[f]", "Filter"),
                ("[/]", "Search"),
                ("[l]", "Low Stock"),
                ("[w]", "Expiring"),
                ("[c]", "Clear"),
                ("[q]", "Quit"),
            ],
        };

        let mut spans = Vec::with_capacity(keys.len() * 2);
        for (index, (key, action)) in keys.iter().enumerate() {
            spans.push(Span::styled(key.to_string(), key_style));
            if index + 1 == keys.len() {
                spans.push(Span::raw(format!(" {action}")));
            } else {
                spans.push(Span::raw(format!(" {action}   ")));
            }
        }
        Line::from(spans)
    }

    fn draw_medicine_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &MedicineForm) {
        let popup_area = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = MedicineField::ORDER
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(vec![
            Span::raw("Total Quantity: "),
            Span::styled(
                form.total_preview().to_string(),
                Style::default().fg(Color::Cyan),
            ),
        ]));
        lines.push(Line::from(""));
        lines.push(form_hint(form.error.as_deref()));

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (column, row) = form.cursor();
        frame.set_cursor_position((inner.x + column, inner.y + row));
    }

    fn draw_equipment_form(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        form: &EquipmentForm,
    ) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            form.build_line(EquipmentField::Name),
            form.build_line(EquipmentField::Quantity),
            form.build_line(EquipmentField::Description),
            Line::from(""),
            form_hint(form.error.as_deref()),
        ];

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (column, row) = form.cursor();
        frame.set_cursor_position((inner.x + column, inner.y + row));
    }

    fn draw_id_prompt(&self, frame: &mut Frame, area: Rect, prompt: &IdPrompt) {
        let popup_area = centered_rect(50, 25, area);
        frame.render_widget(Clear, popup_area);

        let title = format!("Remove {} by ID", self.tab.title());
        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(vec![
                Span::raw("ID: "),
                Span::styled(prompt.value.clone(), Style::default().fg(Color::Yellow)),
            ]),
            Line::from(""),
            form_hint(prompt.error.as_deref()),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
        frame.set_cursor_position((
            inner.x + "ID: ".len() as u16 + prompt.value.chars().count() as u16,
            inner.y,
        ));
    }

    fn draw_confirm_remove_last(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(50, 25, area);
        frame.render_widget(Clear, popup_area);

        let name = match self.tab {
            Tab::Medicines => self.inventory.medicines().last().map(|m| m.name),
            Tab::Equipment => self.inventory.equipment().last().map(|e| e.name),
        }
        .unwrap_or_default();

        let block = Block::default()
            .title(format!("Remove Last {}", self.tab.title()))
            .borders(Borders::ALL);
        let lines = vec![
            Line::from(format!("Remove '{name}' from the end of the list?")),
            Line::from(""),
            Line::from(Span::styled(
                "y to remove • n to keep",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }

    fn draw_sort_picker(&self, frame: &mut Frame, area: Rect, picker: &SortPicker) {
        let popup_area = centered_rect(40, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(format!("Sort {}", title_plural(self.tab)))
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = self
            .sort_options()
            .into_iter()
            .enumerate()
            .map(|(index, label)| option_line(label, index == picker.index))
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::raw("Order: "),
            Span::styled(
                if picker.ascending { "asc" } else { "desc" },
                Style::default().fg(Color::Yellow),
            ),
        ]));
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn draw_filter_form(&self, frame: &mut Frame, area: Rect, form: &FilterForm) {
        let popup_area = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(format!("Filter {}", title_plural(self.tab)))
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let hint = match self.tab {
            Tab::Medicines => form.medicine_kind().hint(),
            Tab::Equipment => form.equipment_kind().hint(),
        };
        let kinds = self.filter_kind_labels();
        let value_row = kinds.len() as u16 + 1;

        let mut lines: Vec<Line> = kinds
            .into_iter()
            .enumerate()
            .map(|(index, label)| option_line(label, index == form.kind))
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::raw("Value: "),
            Span::styled(form.value.clone(), Style::default().fg(Color::Yellow)),
        ]));
        lines.push(Line::from(Span::styled(
            format!("Format: {hint}"),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(""));
        lines.push(form_hint(form.error.as_deref()));

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
        frame.set_cursor_position((
            inner.x + "Value: ".len() as u16 + form.value.chars().count() as u16,
            inner.y + value_row,
        ));
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let title = match self.tab {
            Tab::Medicines => "Search medicines by name",
            Tab::Equipment => "Search equipment by name or description",
        };
        let block = Block::default().borders(Borders::ALL).title(title);
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_info_popup(&self, frame: &mut Frame, area: Rect, popup: &InfoPopup) {
        let popup_area = centered_rect(80, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(popup.title.clone())
            .borders(Borders::ALL);
        let lines: Vec<Line> = popup
            .lines
            .iter()
            .map(|line| Line::from(line.clone()))
            .collect();
        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }
}

fn medicine_details(medicine: &Medicine) -> Vec<String> {
    vec![
        format!("ID: {}", medicine.id),
        format!("Name: {}", medicine.name),
        format!("Packs: {}", medicine.packs),
        format!("Items per Pack: {}", medicine.items_per_pack),
        format!("Total Qty: {}", medicine.total_quantity),
        format!("Expiry: {}", medicine.expiry.format(DATE_FORMAT)),
    ]
}

fn equipment_details(equipment: &Equipment) -> Vec<String> {
    vec![
        format!("ID: {}", equipment.id),
        format!("Name: {}", equipment.name),
        format!("Stock: {}", equipment.stock),
        format!("Status: {}", equipment.status),
    ]
}

fn title_plural(tab: Tab) -> &'static str {
    match tab {
        Tab::Medicines => "Medicines",
        Tab::Equipment => "Equipment",
    }
}

fn table_title(base: &str, filter: Option<&str>) -> String {
    match filter {
        Some(label) => format!("{base} [{label}]"),
        None => base.to_string(),
    }
}

fn option_line(label: &'static str, selected: bool) -> Line<'static> {
    if selected {
        Line::from(Span::styled(
            format!("> {label}"),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(format!("  {label}"))
    }
}

fn form_hint(error: Option<&str>) -> Line<'static> {
    match error {
        Some(error) => Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled(
            "Enter to save • Tab to switch • Esc to cancel",
            Style::default().fg(Color::Gray),
        )),
    }
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use chrono::NaiveDate;

    use super::*;
    use crate::inventory::InventorySettings;
    use crate::models::{EquipmentFields, MedicineFields};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn app() -> App {
        App::new(Inventory::started(InventorySettings::default()))
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch));
        }
    }

    fn status(app: &App) -> &str {
        app.status.as_ref().map_or("", |status| status.text.as_str())
    }

    fn seeded() -> App {
        let mut inventory = Inventory::new(InventorySettings::default());
        inventory.add_medicine(MedicineFields::new("Paracetamol", 5, 10, date(2026, 1, 1)));
        inventory.add_medicine(MedicineFields::new("Amoxicillin", 1, 2, date(2025, 6, 1)));
        inventory.add_equipment(EquipmentFields::new("Gloves", 0, "reorder"));
        inventory.add_equipment(EquipmentFields::new("Thermometer", 5, "cabinet"));
        inventory.add_equipment(EquipmentFields::new("Bandage", 15, "cabinet"));
        App::new(inventory)
    }

    #[test]
    fn add_medicine_through_form() {
        let mut app = app();
        app.handle_key(KeyCode::Char('+'));
        type_text(&mut app, "Paracetamol");
        app.handle_key(KeyCode::Tab);
        type_text(&mut app, "5");
        app.handle_key(KeyCode::Tab);
        type_text(&mut app, "10");
        app.handle_key(KeyCode::Tab);
        type_text(&mut app, "2026-01-01");
        app.handle_key(KeyCode::Enter);

        assert!(matches!(app.mode, Mode::Normal));
        let medicine = app.inventory().medicines().find_by_id(1).unwrap();
        assert_eq!(medicine.total_quantity, 50);
        assert_eq!(status(&app), "Added medicine: Paracetamol.");
        assert_eq!(
            app.inventory().activity().snapshot().len(),
            2,
            "start-up line plus the add"
        );
    }

    #[test]
    fn invalid_form_stays_open_with_error() {
        let mut app = app();
        app.handle_key(KeyCode::Char('+'));
        type_text(&mut app, "Saline");
        app.handle_key(KeyCode::Enter);

        match &app.mode {
            Mode::EditingMedicine { form, .. } => {
                assert_eq!(form.error.as_deref(), Some("Please fill all medicine fields."));
            }
            _ => panic!("form should stay open"),
        }
        assert!(app.inventory().medicines().is_empty());
    }

    #[test]
    fn insert_first_renumbers_rows() {
        let mut app = seeded();
        app.handle_key(KeyCode::Char('i'));
        type_text(&mut app, "Z");
        app.handle_key(KeyCode::Tab);
        type_text(&mut app, "1");
        app.handle_key(KeyCode::Tab);
        type_text(&mut app, "1");
        app.handle_key(KeyCode::Tab);
        type_text(&mut app, "2027-01-01");
        app.handle_key(KeyCode::Enter);

        let names: Vec<(RecordId, &str)> = app
            .inventory()
            .medicines()
            .records()
            .iter()
            .map(|m| (m.id, m.name.as_str()))
            .collect();
        assert_eq!(names, [(1, "Z"), (2, "Paracetamol"), (3, "Amoxicillin")]);
        assert_eq!(app.medicines.selected, 0);
    }

    #[test]
    fn update_selected_equipment() {
        let mut app = seeded();
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Char('e'));
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Backspace);
        type_text(&mut app, "7");
        app.handle_key(KeyCode::Enter);

        let updated = app.inventory().equipment().find_by_id(2).unwrap();
        assert_eq!(updated.stock, 7);
        assert_eq!(updated.name, "Thermometer");
        assert_eq!(status(&app), "Equipment ID 2 updated successfully.");
    }

    #[test]
    fn remove_by_id_reports_missing_rows() {
        let mut app = seeded();
        app.handle_key(KeyCode::Char('d'));
        app.handle_key(KeyCode::Backspace);
        type_text(&mut app, "9");
        app.handle_key(KeyCode::Enter);
        assert_eq!(status(&app), "No medicine found with ID 9.");
        assert!(matches!(app.mode, Mode::RemovingById(_)));

        app.handle_key(KeyCode::Backspace);
        type_text(&mut app, "2");
        app.handle_key(KeyCode::Enter);
        assert_eq!(status(&app), "Medicine with ID 2 removed.");
        assert!(app.inventory().medicines().find_by_id(2).is_none());
    }

    #[test]
    fn remove_last_shows_removed_row() {
        let mut app = seeded();
        app.handle_key(KeyCode::Char('x'));
        assert!(matches!(app.mode, Mode::ConfirmRemoveLast));
        app.handle_key(KeyCode::Char('y'));

        match &app.mode {
            Mode::Viewing(popup) => assert_eq!(popup.lines[1], "Name: Amoxicillin"),
            _ => panic!("expected a details popup"),
        }
        app.handle_key(KeyCode::Char('z'));
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.inventory().medicines().count(), 1);
    }

    #[test]
    fn sort_picker_sorts_descending() {
        let mut app = seeded();
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Char('o'));
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Right);
        app.handle_key(KeyCode::Enter);

        let stocks: Vec<u32> = app.equipment.rows.iter().map(|e| e.stock).collect();
        assert_eq!(stocks, [15, 5, 0]);
        assert_eq!(status(&app), "Equipment sorted by stock (descending)");
    }

    #[test]
    fn stock_range_filter() {
        let mut app = seeded();
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Char('f'));
        for _ in 0..3 {
            app.handle_key(KeyCode::Down);
        }
        type_text(&mut app, "1,10");
        app.handle_key(KeyCode::Enter);

        let names: Vec<&str> = app.equipment.rows.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Thermometer"]);
        assert_eq!(status(&app), "Found 1 equipment matching the filter.");

        app.handle_key(KeyCode::Char('c'));
        assert_eq!(app.equipment.rows.len(), 3);
    }

    #[test]
    fn bad_filter_value_keeps_popup_open() {
        let mut app = seeded();
        app.handle_key(KeyCode::Char('f'));
        app.handle_key(KeyCode::Down);
        type_text(&mut app, "few");
        app.handle_key(KeyCode::Enter);
        assert_eq!(status(&app), "Low stock threshold must be a number!");
        assert!(matches!(app.mode, Mode::Filtering(_)));
    }

    #[test]
    fn search_filters_as_you_type() {
        let mut app = seeded();
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Char('/'));
        type_text(&mut app, "cab");
        assert_eq!(app.equipment.rows.len(), 2);
        app.handle_key(KeyCode::Enter);
        assert_eq!(status(&app), "2 equipment match 'cab'.");

        app.handle_key(KeyCode::Esc);
        assert_eq!(app.equipment.rows.len(), 3);
        assert_eq!(status(&app), "Filter cleared.");
    }

    #[test]
    fn low_stock_shortcut_uses_configured_threshold() {
        let mut app = seeded();
        app.handle_key(KeyCode::Char('l'));
        let names: Vec<&str> = app.medicines.rows.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Amoxicillin"]);
    }

    #[test]
    fn view_first_three_on_empty_store() {
        let mut app = app();
        app.handle_key(KeyCode::Char('3'));
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(status(&app), "No medicines in inventory.");
    }

    /// Equipment ids [2, 3, 3]: removing id 1 and appending reuses id 3.
    fn repeated_ids() -> App {
        let mut inventory = Inventory::new(InventorySettings::default());
        for name in ["A", "B", "C"] {
            inventory.add_equipment(EquipmentFields::new(name, 1, ""));
        }
        inventory.remove_equipment_by_id(1);
        inventory.add_equipment(EquipmentFields::new("D", 1, ""));
        let mut app = App::new(inventory);
        app.handle_key(KeyCode::Tab);
        app
    }

    fn equipment_rows(app: &App) -> Vec<(RecordId, String, u32)> {
        app.inventory()
            .equipment()
            .records()
            .iter()
            .map(|e| (e.id, e.name.clone(), e.stock))
            .collect()
    }

    #[test]
    fn edit_changes_the_highlighted_row_when_ids_repeat() {
        let mut app = repeated_ids();
        app.handle_key(KeyCode::End);
        app.handle_key(KeyCode::Char('e'));
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Backspace);
        type_text(&mut app, "9");
        app.handle_key(KeyCode::Enter);

        assert_eq!(
            equipment_rows(&app),
            [
                (2, "B".to_string(), 1),
                (3, "C".to_string(), 1),
                (3, "D".to_string(), 9),
            ]
        );
        assert_eq!(app.equipment.current().unwrap().name, "D");
    }

    #[test]
    fn remove_takes_the_highlighted_row_when_ids_repeat() {
        let mut app = repeated_ids();
        app.handle_key(KeyCode::End);
        app.handle_key(KeyCode::Char('d'));
        app.handle_key(KeyCode::Enter);

        let names: Vec<String> = equipment_rows(&app).into_iter().map(|row| row.1).collect();
        assert_eq!(names, ["B", "C"]);
        assert_eq!(status(&app), "Equipment with ID 3 removed.");
    }

    #[test]
    fn typed_shared_id_is_refused() {
        let mut app = repeated_ids();
        app.handle_key(KeyCode::Char('d'));
        app.handle_key(KeyCode::Backspace);
        type_text(&mut app, "3");
        app.handle_key(KeyCode::Enter);

        assert!(matches!(app.mode, Mode::RemovingById(_)));
        assert_eq!(
            status(&app),
            "ID 3 is shared by 2 equipment. Highlight the row to remove and press d."
        );
        assert_eq!(app.inventory().equipment().count(), 3);
    }

    #[test]
    fn cancelled_search_restores_the_previous_filter() {
        let mut app = seeded();
        app.handle_key(KeyCode::Char('l'));
        assert_eq!(app.medicines.rows.len(), 1);

        app.handle_key(KeyCode::Char('/'));
        type_text(&mut app, "para");
        let names: Vec<&str> = app.medicines.rows.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Paracetamol"]);

        app.handle_key(KeyCode::Esc);
        let names: Vec<&str> = app.medicines.rows.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Amoxicillin"]);
        assert_eq!(app.medicines.filter_label(), Some("low stock: total <= 5"));
        assert_eq!(status(&app), "Search cancelled. Previous filter restored.");
    }

    #[test]
    fn quit_keys() {
        let mut app = app();
        assert!(!app.handle_key(KeyCode::Char('v')));
        assert!(app.handle_key(KeyCode::Char('q')));
        assert!(app.handle_key(KeyCode::Esc));
    }

    #[test]
    fn draws_tables_log_and_clock() {
        let app = seeded();
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("Paracetamol"));
        assert!(screen.contains("Recent Activity Log"));
        assert!(screen.contains("Time: "));
        assert!(screen.contains("Added medicine: Amoxicillin"));
    }
}
