//! Column-aligned plain-text tables.

use std::io::{self, Write};

use console::{measure_text_width, pad_str, Alignment};

use crate::types::{Employee, HierarchyRow};

/// A small row-oriented table. Cells are pre-rendered strings.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<&'static str>,
    align: Vec<Alignment>,
    rows: Vec<Vec<String>>,
}

fn nullable(id: Option<i64>) -> String {
    id.map_or_else(|| "NULL".to_string(), |m| m.to_string())
}

impl Table {
    pub fn new(columns: &[(&'static str, Alignment)]) -> Self {
        Self {
            headers: columns.iter().map(|(h, _)| *h).collect(),
            align: columns.iter().map(|(_, a)| *a).collect(),
            rows: Vec::new(),
        }
    }

    /// `employee_id | name | manager_id`
    pub fn employees(employees: &[Employee]) -> Self {
        let mut table = Self::new(&[
            ("employee_id", Alignment::Right),
            ("name", Alignment::Left),
            ("manager_id", Alignment::Right),
        ]);
        for e in employees {
            table.push(vec![e.id.to_string(), e.name.clone(), nullable(e.manager_id)]);
        }
        table
    }

    /// `employee_id | manager_id | level`
    pub fn hierarchy(rows: &[HierarchyRow]) -> Self {
        let mut table = Self::new(&[
            ("employee_id", Alignment::Right),
            ("manager_id", Alignment::Right),
            ("level", Alignment::Right),
        ]);
        for r in rows {
            table.push(vec![
                r.employee_id.to_string(),
                nullable(r.manager_id),
                r.level.to_string(),
            ]);
        }
        table
    }

    pub fn push(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                self.rows
                    .iter()
                    .map(|r| measure_text_width(&r[i]))
                    .chain(std::iter::once(measure_text_width(h)))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    fn write_line(
        &self,
        out: &mut dyn Write,
        cells: &[&str],
        widths: &[usize],
    ) -> io::Result<()> {
        let line = cells
            .iter()
            .zip(widths)
            .zip(&self.align)
            .map(|((cell, w), a)| pad_str(cell, *w, *a, None).into_owned())
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(out, "{}", line.trim_end())
    }

    /// Write the header, then one line per row, or `(no rows)`.
    pub fn write_to(&self, out: &mut dyn Write) -> io::Result<()> {
        let widths = self.widths();
        self.write_line(out, &self.headers, &widths)?;
        if self.rows.is_empty() {
            return writeln!(out, "(no rows)");
        }
        for row in &self.rows {
            let cells: Vec<&str> = row.iter().map(String::as_str).collect();
            self.write_line(out, &cells, &widths)?;
        }
        Ok(())
    }
}
