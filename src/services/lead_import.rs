// src/services/lead_import.rs
//
// Planilha -> leads. Layout fixo: cabeçalho descartado, depois
// colunas Nome | E-mail | Celular | Cidade.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::common::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub name: String,
    pub email: Option<String>,
    pub mobile: String,
    pub city: String,
}

#[derive(Debug, Default, PartialEq)]
pub struct ParsedSheet {
    pub rows: Vec<ImportRow>,
    pub skipped: usize,
}

/// Lê a primeira aba do arquivo (.xlsx, .xls, .xlsb, .ods) como linhas de texto.
pub fn read_workbook(bytes: &[u8]) -> Result<Vec<Vec<String>>, AppError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::InvalidInput("The workbook has no worksheets".to_string()))??;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // Celulares costumam vir como número: 9876543210.0 -> "9876543210"
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

/// Aplica as regras de aceite. Linhas sem nome, celular ou cidade são descartadas em silêncio.
/// Linhas totalmente vazias (células formatadas no fim da aba) nem entram na contagem.
pub fn parse_rows(rows: Vec<Vec<String>>) -> ParsedSheet {
    let mut parsed = ParsedSheet::default();

    for row in rows.into_iter().skip(1) {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let column = |i: usize| row.get(i).map(|c| c.trim().to_string()).unwrap_or_default();

        let name = column(0);
        let email = column(1);
        let mobile = column(2);
        let city = column(3);

        if name.is_empty() || mobile.is_empty() || city.is_empty() {
            parsed.skipped += 1;
            continue;
        }

        parsed.rows.push(ImportRow {
            name,
            email: (!email.is_empty()).then_some(email),
            mobile,
            city,
        });
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn header_is_dropped_and_incomplete_rows_are_skipped() {
        let sheet = vec![
            row(&["Name", "Email", "Mobile", "City"]),
            row(&["Anita Rao", "anita@mail.example", "9000000001", "Pune"]),
            row(&["Vikram", "vikram@mail.example", "", "Mumbai"]),
        ];

        let parsed = parse_rows(sheet);
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.skipped, 1);
        assert_eq!(parsed.rows[0].name, "Anita Rao");
    }

    #[test]
    fn cells_are_trimmed_and_blank_email_is_null() {
        let sheet = vec![
            row(&["h", "h", "h", "h"]),
            row(&["  Meera ", "   ", " 9000000002 ", " Nagpur"]),
        ];

        let parsed = parse_rows(sheet);
        assert_eq!(
            parsed.rows,
            vec![ImportRow {
                name: "Meera".into(),
                email: None,
                mobile: "9000000002".into(),
                city: "Nagpur".into(),
            }]
        );
    }

    #[test]
    fn city_is_required_and_short_rows_are_tolerated() {
        let sheet = vec![
            row(&["Name", "Email", "Mobile", "City"]),
            row(&["No City", "", "9000000003"]),
        ];

        let parsed = parse_rows(sheet);
        assert!(parsed.rows.is_empty());
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn blank_rows_are_ignored_without_counting_as_skipped() {
        let sheet = vec![
            row(&["Name", "Email", "Mobile", "City"]),
            row(&["Anita Rao", "", "9000000001", "Pune"]),
            row(&[]),
            row(&["", "", "", ""]),
            row(&["  ", " ", "", "   "]),
            row(&["", "lost@mail.example", "", ""]),
        ];

        let parsed = parse_rows(sheet);
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn numeric_cells_keep_phone_numbers_intact() {
        assert_eq!(cell_text(&Data::Float(9876543210.0)), "9876543210");
        assert_eq!(cell_text(&Data::Int(42)), "42");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn garbage_bytes_are_not_a_workbook() {
        assert!(read_workbook(b"definitely not a spreadsheet").is_err());
    }
}
