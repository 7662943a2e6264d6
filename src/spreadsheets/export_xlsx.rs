use crate::domain::campaign::{Business, Campaign, CampaignKind, Room};
use crate::domain::stats::CampaignStats;
use crate::errors::ServerError;
use crate::spreadsheets::export_csv::iso_time;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

fn xlsx_err(what: &str) -> impl Fn(rust_xlsxwriter::XlsxError) -> ServerError + '_ {
    move |e| ServerError::XlsxError(format!("Failed to write {what}: {e}"))
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str], bold: &Format) -> Result<(), ServerError> {
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, bold)
            .map_err(xlsx_err("header"))?;
    }
    Ok(())
}

fn write_rooms(sheet: &mut Worksheet, rooms: &[Room], bold: &Format) -> Result<(), ServerError> {
    write_headers(sheet, &["Floor", "Unit", "Status", "Donation", "Note", "Callback", "Updated"], bold)?;
    for (i, room) in rooms.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_number(r, 0, room.floor as f64).map_err(xlsx_err("floor"))?;
        sheet.write_string(r, 1, &room.label).map_err(xlsx_err("unit"))?;
        sheet.write_string(r, 2, room.status.label()).map_err(xlsx_err("status"))?;
        sheet
            .write_number(r, 3, room.donation_cents as f64 / 100.0)
            .map_err(xlsx_err("donation"))?;
        sheet
            .write_string(r, 4, room.note.as_deref().unwrap_or(""))
            .map_err(xlsx_err("note"))?;
        sheet
            .write_string(r, 5, &iso_time(room.callback_at))
            .map_err(xlsx_err("callback"))?;
        sheet
            .write_string(r, 6, &iso_time(room.updated_at))
            .map_err(xlsx_err("updated"))?;
    }
    Ok(())
}

fn write_businesses(sheet: &mut Worksheet, businesses: &[Business], bold: &Format) -> Result<(), ServerError> {
    write_headers(sheet, &["Business", "Contact", "Status", "Supports", "Note", "Updated"], bold)?;
    for (i, b) in businesses.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_string(r, 0, &b.name).map_err(xlsx_err("business"))?;
        sheet
            .write_string(r, 1, b.contact_name.as_deref().unwrap_or(""))
            .map_err(xlsx_err("contact"))?;
        sheet.write_string(r, 2, b.status.corporate_label()).map_err(xlsx_err("status"))?;
        sheet.write_number(r, 3, b.supports as f64).map_err(xlsx_err("supports"))?;
        sheet
            .write_string(r, 4, b.note.as_deref().unwrap_or(""))
            .map_err(xlsx_err("note"))?;
        sheet
            .write_string(r, 5, &iso_time(b.updated_at))
            .map_err(xlsx_err("updated"))?;
    }
    Ok(())
}

fn write_summary(sheet: &mut Worksheet, stats: &CampaignStats, bold: &Format) -> Result<(), ServerError> {
    let target = stats.target_cents.map(|t| t as f64 / 100.0);
    let rows: [(&str, Option<f64>); 8] = [
        ("Units", Some(stats.units as f64)),
        ("Visited", Some(stats.visited as f64)),
        ("Donated", Some(stats.donated as f64)),
        ("Not interested", Some(stats.refused as f64)),
        ("Callbacks", Some(stats.callbacks as f64)),
        ("Not home", Some(stats.not_home as f64)),
        ("Raised", Some(stats.raised_cents as f64 / 100.0)),
        ("Target", target),
    ];
    for (i, (label, value)) in rows.iter().enumerate() {
        let r = i as u32;
        sheet
            .write_string_with_format(r, 0, *label, bold)
            .map_err(xlsx_err("summary label"))?;
        if let Some(v) = value {
            sheet.write_number(r, 1, *v).map_err(xlsx_err("summary value"))?;
        }
    }
    Ok(())
}

/// Two sheets: the door-by-door list and a summary.
pub fn export_campaign_xlsx(
    campaign: &Campaign,
    stats: &CampaignStats,
    rooms: &[Room],
    businesses: &[Business],
) -> Result<Vec<u8>, ServerError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    match campaign.kind {
        CampaignKind::Residential => {
            sheet.set_name("Rooms").map_err(xlsx_err("sheet name"))?;
            write_rooms(sheet, rooms, &bold)?;
        }
        CampaignKind::Corporate => {
            sheet.set_name("Businesses").map_err(xlsx_err("sheet name"))?;
            write_businesses(sheet, businesses, &bold)?;
        }
    }

    let summary = workbook.add_worksheet();
    summary.set_name("Summary").map_err(xlsx_err("sheet name"))?;
    write_summary(summary, stats, &bold)?;

    workbook
        .save_to_buffer()
        .map_err(|e| ServerError::XlsxError(format!("Failed to save workbook: {e}")))
}
