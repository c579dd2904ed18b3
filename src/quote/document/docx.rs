//! Programmatic DOCX fallback.
//!
//! Used when no pre-authored template can be filled: the document is built
//! from primitives - title, summary line, items table, total-price paragraph.

use std::io::Cursor;

use docx_rs::{Docx, Paragraph, Run, Table, TableCell, TableRow};
use thiserror::Error;

use crate::project::models::Project;
use crate::quote::models::LineItem;

use super::{format_amount, vessel_spec, QuoteContext};

#[derive(Debug, Error)]
pub enum DocxBuildError {
    #[error("failed to pack document archive: {0}")]
    Pack(String),
}

pub fn build(
    project: &Project,
    items: &[LineItem],
    ctx: &QuoteContext,
) -> Result<Vec<u8>, DocxBuildError> {
    let title = if project.is_anti_heeling() {
        "Quotation - Anti-Heeling System"
    } else {
        "Quotation"
    };

    let mut summary = format!("Project: {}", project.name);
    if let Some(opp) = project
        .opportunity_number
        .as_deref()
        .filter(|s| !s.is_empty())
    {
        summary.push_str(&format!(" ({opp})"));
    }
    let spec = vessel_spec(project);
    if !spec.is_empty() {
        summary.push_str(&format!(" - {spec}"));
    }
    summary.push_str(&format!(" - {}", ctx.date().format("%Y-%m-%d")));

    let mut rows = vec![header_row()];
    for (index, item) in items.iter().enumerate() {
        rows.push(TableRow::new(vec![
            cell(&(index + 1).to_string()),
            cell(&item.qty.to_string()),
            cell(&item.unit),
            cell(&item.description),
        ]));
    }

    let total = format!(
        "Total price: {} {}",
        project.currency.as_deref().unwrap_or(""),
        format_amount(project.total_price())
    );

    let mut buffer = Cursor::new(Vec::new());
    Docx::new()
        .add_paragraph(
            Paragraph::new().add_run(Run::new().add_text(title).bold().size(32)),
        )
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text(summary)))
        .add_table(Table::new(rows))
        .add_paragraph(
            Paragraph::new().add_run(Run::new().add_text(total).bold()),
        )
        .build()
        .pack(&mut buffer)
        .map_err(|e| DocxBuildError::Pack(e.to_string()))?;
    Ok(buffer.into_inner())
}

fn header_row() -> TableRow {
    TableRow::new(vec![
        cell("Pos"),
        cell("Qty"),
        cell("Unit"),
        cell("Description"),
    ])
}

fn cell(text: &str) -> TableCell {
    TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text(text)))
}
