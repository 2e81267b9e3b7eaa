//! The walkthrough report.
//!
//! Sections, in order: the original data, the anchor step, one section per
//! recursion step, the empty step that ends the recursion, the combined
//! hierarchy as returned by `WITH RECURSIVE`, and a short summary.

pub mod table;

use std::collections::HashMap;
use std::io::{self, Write};

use console::Style;

use crate::config::{BreakdownConfig, IntegrityPolicy};
use crate::error::Result;
use crate::graph::integrity;
use crate::graph::store::RelationStore;
use crate::graph::traversal::{
    FixedPointTraversal, Step, Traversal, RECURSIVE_HIERARCHY_SQL,
};
use crate::types::{Employee, HierarchyRow};

pub use table::Table;

const HOW_IT_WORKS: &[&str] = &[
    "1. Start with the anchor query (employees with no manager)",
    "2. Join the employees table with the rows found by the previous step",
    "3. Add the new matches to the result set",
    "4. Repeat steps 2-3 until a step finds no new rows",
    "5. Return all accumulated rows",
];

/// Rendering switches.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub show_sql: bool,
    /// Bold section headings. Off when writing to a file or a test buffer.
    pub color: bool,
}

/// Everything the report needs, gathered up front.
#[derive(Debug, Clone)]
pub struct Walkthrough {
    pub employees: Vec<Employee>,
    pub traversal: Traversal,
    pub declarative: Vec<HierarchyRow>,
}

impl Walkthrough {
    /// Run both evaluations against `store`.
    pub fn collect(store: &RelationStore) -> Result<Self> {
        if store.is_empty()? {
            tracing::warn!("employee table is empty; the anchor step is already the fixed point");
        }
        let traversal = FixedPointTraversal::new(store);
        let unrolled = traversal.run()?;
        let declarative = traversal.recursive_query()?;
        if declarative != unrolled.rows() {
            tracing::warn!(
                unrolled = unrolled.rows().len(),
                declarative = declarative.len(),
                "unrolled steps and WITH RECURSIVE disagree"
            );
        }
        Ok(Self {
            employees: store.employees()?,
            traversal: unrolled,
            declarative,
        })
    }

    /// True when the hand-unrolled steps produced exactly the CTE's rows.
    pub fn agrees(&self) -> bool {
        self.traversal.rows() == self.declarative.as_slice()
    }
}

/// Load the configured rows, apply the integrity policy, evaluate, and
/// write the report to `out`.
pub fn run(config: &BreakdownConfig, out: &mut dyn Write, color: bool) -> Result<Walkthrough> {
    let store = RelationStore::with_employees(&config.employees())?;
    if config.policy == IntegrityPolicy::Strict {
        integrity::check_store(&store)?;
    }
    let walkthrough = Walkthrough::collect(&store)?;
    let options = ReportOptions {
        show_sql: config.show_sql,
        color,
    };
    render(out, &walkthrough, options)?;
    Ok(walkthrough)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

struct Renderer<'a, 'w> {
    out: &'w mut dyn Write,
    options: ReportOptions,
    names: HashMap<i64, &'a str>,
    heading: Style,
}

impl Renderer<'_, '_> {
    fn section(&mut self, title: &str, first: bool) -> io::Result<()> {
        if !first {
            writeln!(self.out)?;
        }
        let heading = format!("=== {title} ===");
        writeln!(self.out, "{}", self.heading.apply_to(heading))
    }

    fn sql(&mut self, sql: &str) -> io::Result<()> {
        if !self.options.show_sql {
            return Ok(());
        }
        writeln!(self.out, "SQL:")?;
        for line in sql.lines() {
            writeln!(self.out, "    {line}")?;
        }
        Ok(())
    }

    /// `2, 3 (Bob, Charlie)`
    fn describe_ids(&self, ids: &[i64]) -> String {
        let numbers = ids.iter().map(i64::to_string).collect::<Vec<_>>().join(", ");
        let names = ids
            .iter()
            .map(|id| self.names.get(id).copied().unwrap_or("?"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{numbers} ({names})")
    }

    fn original(&mut self, employees: &[Employee]) -> io::Result<()> {
        self.section("ORIGINAL DATA", true)?;
        writeln!(self.out, "The complete table the recursive CTE will traverse:")?;
        Table::employees(employees).write_to(self.out)
    }

    fn step(&mut self, step: &Step) -> io::Result<()> {
        let title = if step.is_anchor() {
            "STEP 1: Base Case (Anchor)".to_string()
        } else if step.is_fixed_point() {
            format!("STEP {}: Fixed Point", step.level)
        } else {
            format!("STEP {}: Recursion {}", step.level, step.level - 1)
        };
        self.section(&title, false)?;

        if step.is_anchor() {
            writeln!(
                self.out,
                "The non-recursive anchor: employees with no manager (manager_id IS NULL)."
            )?;
        } else {
            let frontier = self.describe_ids(&step.manager_ids);
            writeln!(
                self.out,
                "Employees whose manager_id is one of the ids found in step {}: {frontier}",
                step.level - 1,
            )?;
        }
        self.sql(&step.sql())?;
        Table::hierarchy(&step.rows).write_to(self.out)?;

        if step.is_fixed_point() {
            writeln!(
                self.out,
                "-> No new rows: the fixed point is reached and the recursion stops."
            )
        } else {
            let ids: Vec<i64> = step.rows.iter().map(|r| r.employee_id).collect();
            let found = self.describe_ids(&ids);
            writeln!(self.out, "-> Level {} holds {found}", step.level)
        }
    }

    fn final_result(&mut self, walkthrough: &Walkthrough) -> io::Result<()> {
        self.section("FINAL RESULT: Complete Hierarchy", false)?;
        writeln!(
            self.out,
            "One WITH RECURSIVE query does the anchor plus every recursion step (UNION ALL):"
        )?;
        self.sql(RECURSIVE_HIERARCHY_SQL)?;
        Table::hierarchy(&walkthrough.declarative).write_to(self.out)?;

        let stop = walkthrough.traversal.terminal_step().map_or(1, |s| s.level);
        writeln!(
            self.out,
            "-> The CTE stops recursing once a step finds nothing (step {stop} was empty)."
        )?;
        if walkthrough.agrees() {
            writeln!(self.out, "-> Identical to the combined steps above.")
        } else {
            writeln!(
                self.out,
                "-> WARNING: differs from the combined steps above ({} vs {} rows).",
                walkthrough.declarative.len(),
                walkthrough.traversal.rows().len()
            )
        }
    }

    fn summary(&mut self) -> io::Result<()> {
        self.section("HOW THE RECURSIVE CTE WORKS", false)?;
        for line in HOW_IT_WORKS {
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }
}

/// Write every section of the report for an already collected walkthrough.
pub fn render(
    out: &mut dyn Write,
    walkthrough: &Walkthrough,
    options: ReportOptions,
) -> io::Result<()> {
    let names = walkthrough
        .employees
        .iter()
        .map(|e| (e.id, e.name.as_str()))
        .collect();
    let mut renderer = Renderer {
        out,
        options,
        names,
        heading: Style::new().bold().force_styling(options.color),
    };

    renderer.original(&walkthrough.employees)?;
    for step in walkthrough.traversal.steps() {
        renderer.step(step)?;
    }
    renderer.final_result(walkthrough)?;
    renderer.summary()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
