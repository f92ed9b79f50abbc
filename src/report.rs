//! Console results table.
//!
//! Renders one row per extracted record with its previous and current
//! revision. The revision cell is colored green when a notification will be
//! sent and yellow when the record is already seen.

use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use crate::extract::ReleaseInfo;

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Prev revision")]
    prev_revision: String,
    #[tabled(rename = "Revision")]
    revision: String,
}

impl From<&ReleaseInfo> for ResultRow {
    fn from(row: &ReleaseInfo) -> Self {
        let revision = if row.notify {
            row.revision.green()
        } else {
            row.revision.yellow()
        };

        Self {
            id: row.id.clone(),
            title: row.title.clone(),
            prev_revision: row.prev_revision.clone(),
            revision: revision.to_string(),
        }
    }
}

/// Render the results table.
pub fn render_results(rows: &[ReleaseInfo]) -> String {
    let rows: Vec<ResultRow> = rows.iter().map(ResultRow::from).collect();
    Table::new(rows).with(Style::modern()).to_string()
}
