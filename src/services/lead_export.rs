// src/services/lead_export.rs

use chrono::NaiveDate;

use crate::models::lead::LeadView;

pub const EXPORT_FILENAME: &str = "leads_export.csv";

pub const CSV_HEADERS: [&str; 14] = [
    "Name",
    "Email",
    "Mobile",
    "City",
    "Status",
    "Quality",
    "What to Buy",
    "Budget",
    "Professional Background",
    "Notes",
    "Follow-up Date",
    "Buying Date",
    "Assigned To",
    "Created At",
];

// Toda célula entre aspas; aspas internas dobradas (RFC 4180)
fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

fn date_cell(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

fn row_cells(view: &LeadView) -> [String; 14] {
    let lead = &view.lead;
    [
        lead.name.clone(),
        lead.email.clone().unwrap_or_default(),
        lead.mobile.clone(),
        lead.city.clone(),
        lead.status.as_str().to_string(),
        lead.quality.map(|q| q.as_str().to_string()).unwrap_or_default(),
        lead.what_to_buy.clone().unwrap_or_default(),
        lead.budget.clone().unwrap_or_default(),
        lead.professional_background.clone().unwrap_or_default(),
        lead.notes.clone().unwrap_or_default(),
        date_cell(lead.followup_date),
        date_cell(lead.buying_date),
        view.assignee_name.clone().unwrap_or_else(|| "Unassigned".to_string()),
        lead.created_at.format("%Y-%m-%d").to_string(),
    ]
}

/// Cabeçalho fixo + uma linha por lead, separadas por '\n'.
pub fn to_csv(leads: &[LeadView]) -> String {
    let header = CSV_HEADERS.iter().map(|h| quote(h)).collect::<Vec<_>>().join(",");

    std::iter::once(header)
        .chain(leads.iter().map(|view| {
            row_cells(view)
                .iter()
                .map(|cell| quote(cell))
                .collect::<Vec<_>>()
                .join(",")
        }))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        lead::{LeadQuality, LeadStatus},
        lead_filter::tests::sample_lead,
    };

    fn view(name: &str) -> LeadView {
        LeadView {
            lead: sample_lead(name, LeadStatus::InProgress, "Pune"),
            assignee_name: None,
        }
    }

    #[test]
    fn header_has_fourteen_quoted_columns() {
        let csv = to_csv(&[]);
        assert_eq!(csv.split(',').count(), 14);
        assert!(csv.starts_with("\"Name\",\"Email\",\"Mobile\""));
        assert!(csv.ends_with("\"Assigned To\",\"Created At\""));
    }

    #[test]
    fn null_fields_render_as_empty_cells() {
        let csv = to_csv(&[view("Rohan")]);
        let row = csv.lines().nth(1).unwrap();

        assert_eq!(
            row,
            "\"Rohan\",\"\",\"9876543210\",\"Pune\",\"in_progress\",\"\",\"\",\"\",\"\",\"\",\"\",\"\",\"Unassigned\",\"2025-01-15\""
        );
        assert!(!row.contains("null"));
        assert!(!row.contains("None"));
    }

    #[test]
    fn assignee_quality_and_dates_are_rendered() {
        let mut v = view("Sana");
        v.assignee_name = Some("Priya Sharma".into());
        v.lead.quality = Some(LeadQuality::Hot);
        v.lead.followup_date = NaiveDate::from_ymd_opt(2025, 2, 3);

        let csv = to_csv(&[v]);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains("\"hot\""));
        assert!(row.contains("\"2025-02-03\""));
        assert!(row.contains("\"Priya Sharma\""));
    }

    #[test]
    fn embedded_quotes_are_escaped() {
        let mut v = view("Dev");
        v.lead.notes = Some("wants a \"sea view\", east facing".into());

        let csv = to_csv(&[v]);
        assert!(csv.contains("\"wants a \"\"sea view\"\", east facing\""));
    }

    #[test]
    fn rows_are_newline_separated() {
        let csv = to_csv(&[view("A"), view("B")]);
        assert_eq!(csv.lines().count(), 3);
    }
}
