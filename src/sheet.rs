use anyhow::{anyhow, Context};
use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;
use std::path::Path;

use crate::model::{Schedule, Transaction};

#[derive(Debug, Clone)]
pub struct StudentRow {
    pub name: String,
    pub class: String,
}

/// Parse a bulk student upload: first sheet only, row 1 is a header, column A
/// is the name and column B the class. Rows with either cell blank are
/// skipped silently.
pub fn read_student_rows(path: &Path) -> anyhow::Result<Vec<StudentRow>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("failed to open workbook {}", path.to_string_lossy()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("workbook has no sheets"))?
        .context("failed to read first sheet")?;

    let mut rows = Vec::new();
    for row in range.rows().skip(1) {
        let name = cell_text(row.first());
        let class = cell_text(row.get(1));
        if name.is_empty() || class.is_empty() {
            continue;
        }
        rows.push(StudentRow { name, class });
    }
    Ok(rows)
}

fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty) => String::new(),
        Some(d) => d.to_string().trim().to_string(),
    }
}

const REPORT_HEADER: [&str; 6] = ["Tanggal", "Jam", "Siswa", "Kelas", "Kegiatan", "Alasan"];

/// Write the filtered attendance report the way the report table renders it.
pub fn write_report_sheet(path: &Path, rows: &[&Transaction]) -> anyhow::Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Laporan")?;

    for (col, title) in REPORT_HEADER.iter().enumerate() {
        sheet.write_string(0, col as u16, *title)?;
    }
    for (i, t) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_string(r, 0, &t.date)?;
        sheet.write_string(r, 1, &t.time)?;
        sheet.write_string(r, 2, &t.student_name)?;
        sheet.write_string(r, 3, &t.class)?;
        sheet.write_string(r, 4, &t.program)?;
        sheet.write_string(r, 5, &t.reason)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed to save report {}", path.to_string_lossy()))?;
    Ok(())
}

const SCHEDULE_HEADER: [&str; 7] = [
    "Kegiatan",
    "Hari",
    "Minggu Ke",
    "Bulan",
    "Tahun",
    "Kelas",
    "Keterangan",
];

/// Write the full schedule list with each column sized to its longest cell.
pub fn write_schedule_sheet(path: &Path, schedules: &[Schedule]) -> anyhow::Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Jadwal Kegiatan")?;

    for (col, title) in SCHEDULE_HEADER.iter().enumerate() {
        sheet.write_string(0, col as u16, *title)?;
    }
    for (i, s) in schedules.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, value) in schedule_cells(s).iter().enumerate() {
            sheet.write_string(r, col as u16, *value)?;
        }
    }

    for (col, title) in SCHEDULE_HEADER.iter().enumerate() {
        let longest = schedules
            .iter()
            .map(|s| schedule_cells(s)[col].chars().count())
            .max()
            .unwrap_or(0)
            .max(title.chars().count());
        sheet.set_column_width(col as u16, (longest + 2) as f64)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed to save schedule sheet {}", path.to_string_lossy()))?;
    Ok(())
}

fn schedule_cells(s: &Schedule) -> [&str; 7] {
    [
        &s.activity,
        &s.day,
        &s.week,
        &s.month,
        &s.year,
        &s.class,
        &s.notes,
    ]
}
