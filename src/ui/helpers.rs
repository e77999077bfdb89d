use anyhow::Error;
use chrono::NaiveTime;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Row};
use tracing::debug;

use crate::inventory::Statistics;
use crate::models::{Equipment, Medicine};

use super::forms::DATE_FORMAT;

/// Column headers for the medicine table.
pub(crate) const MEDICINE_HEADERS: [&str; 6] =
    ["ID", "Name", "Packs", "Items/Pack", "Total Qty", "Expiry"];
/// Column headers for the equipment table.
pub(crate) const EQUIPMENT_HEADERS: [&str; 4] = ["ID", "Name", "Quantity", "Description"];

/// Background used for medicine rows that need attention.
const MEDICINE_ATTENTION: Color = Color::Rgb(0x5f, 0x1e, 0x1e);
/// Background used for equipment rows that need attention.
const EQUIPMENT_ATTENTION: Color = Color::Rgb(0x5f, 0x4b, 0x12);

/// Build a table row for a medicine, tinted when stock runs low.
pub(crate) fn medicine_row(medicine: &Medicine) -> Row<'static> {
    let row = Row::new(vec![
        Cell::from(medicine.id.to_string()),
        Cell::from(medicine.name.clone()),
        Cell::from(medicine.packs.to_string()),
        Cell::from(medicine.items_per_pack.to_string()),
        Cell::from(medicine.total_quantity.to_string()),
        Cell::from(medicine.expiry.format(DATE_FORMAT).to_string()),
    ]);
    if medicine.needs_attention() {
        row.style(Style::default().bg(MEDICINE_ATTENTION))
    } else {
        row
    }
}

pub(crate) fn equipment_row(equipment: &Equipment) -> Row<'static> {
    let row = Row::new(vec![
        Cell::from(equipment.id.to_string()),
        Cell::from(equipment.name.clone()),
        Cell::from(equipment.stock.to_string()),
        Cell::from(equipment.status.clone()),
    ]);
    if equipment.needs_attention() {
        row.style(Style::default().bg(EQUIPMENT_ATTENTION))
    } else {
        row
    }
}

/// Bold header row for either table.
pub(crate) fn header_row(headers: &[&'static str]) -> Row<'static> {
    Row::new(headers.iter().map(|header| Cell::from(*header)))
        .style(Style::default().add_modifier(Modifier::BOLD))
}

/// One-line summary of the derived counts. Counts above zero in the warning
/// columns are highlighted.
pub(crate) fn statistics_line(stats: &Statistics) -> Line<'static> {
    let warn = |count: usize| {
        if count > 0 {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Green)
        }
    };
    Line::from(vec![
        Span::raw(format!(
            "Medicines: {}   Equipment: {}   ",
            stats.medicines, stats.equipment
        )),
        Span::raw("Low stock (med/eq): "),
        Span::styled(
            stats.low_stock_medicines.to_string(),
            warn(stats.low_stock_medicines),
        ),
        Span::raw("/"),
        Span::styled(
            stats.low_stock_equipment.to_string(),
            warn(stats.low_stock_equipment),
        ),
        Span::raw("   Expiring soon: "),
        Span::styled(
            stats.expiring_medicines.to_string(),
            warn(stats.expiring_medicines),
        ),
    ])
}

pub(crate) fn clock_label(time: NaiveTime) -> String {
    format!("Time: {}", time.format("%H:%M:%S"))
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// The message shown to the user is the outermost context; the full chain
/// only goes to the log.
pub(crate) fn surface_error(err: &Error) -> String {
    debug!(error = %format!("{err:#}"), "surfacing error to footer");
    err.to_string()
}
