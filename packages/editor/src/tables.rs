//! Embedded tables: insertion and the per-table context menu

use crate::errors::{EditError, EditResult};
use crate::selection::Selection;
use crate::text_ops::{insert_inlines, insertion_point_or_end};
use quillpad_model::{
    Block, BlockKind, Document, EmbeddedObject, IdGenerator, Inline, NodeId, Table, TableCell,
    TableRow,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Largest row or column count a table may have
pub const MAX_TABLE_DIMENSION: usize = 100;

/// Validated row and column counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDimensions {
    pub rows: usize,
    pub columns: usize,
}

impl TableDimensions {
    /// Parse dialog input; both values must be positive integers no
    /// larger than [`MAX_TABLE_DIMENSION`]
    pub fn parse(rows: &str, columns: &str) -> EditResult<Self> {
        let parse_one = |value: &str| -> Option<usize> {
            value.trim().parse::<usize>().ok().filter(|n| *n > 0)
        };

        match (parse_one(rows), parse_one(columns)) {
            (Some(rows), Some(columns)) if rows.max(columns) > MAX_TABLE_DIMENSION => {
                Err(too_large())
            }
            (Some(rows), Some(columns)) => Ok(Self { rows, columns }),
            _ => Err(EditError::validation(
                "Please enter valid numbers for rows and columns",
            )),
        }
    }
}

fn too_large() -> EditError {
    EditError::validation(format!(
        "Tables are limited to {} rows and {} columns",
        MAX_TABLE_DIMENSION, MAX_TABLE_DIMENSION
    ))
}

/// Context-menu commands scoped to one table instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TableCommand {
    AddRow,
    AddColumn,
    RemoveRow,
    RemoveColumn,
    Delete,
}

fn blank_cell(ids: &mut IdGenerator) -> TableCell {
    TableCell {
        id: ids.new_id(),
        blocks: vec![Block::new(ids.new_id(), BlockKind::Paragraph)],
    }
}

fn blank_row(columns: usize, ids: &mut IdGenerator) -> TableRow {
    TableRow {
        id: ids.new_id(),
        cells: (0..columns).map(|_| blank_cell(ids)).collect(),
    }
}

/// Build a table where every cell holds a single blank paragraph
pub fn build_table(dimensions: TableDimensions, ids: &mut IdGenerator) -> Table {
    let id = ids.new_id();
    let rows = (0..dimensions.rows)
        .map(|_| blank_row(dimensions.columns, ids))
        .collect();

    Table {
        id,
        rows,
        placement: None,
    }
}

/// Insert a new table at the caret (or at the end of the document) and
/// move the caret after it
pub fn insert_table(
    doc: &mut Document,
    selection: Option<&Selection>,
    dimensions: TableDimensions,
    ids: &mut IdGenerator,
) -> EditResult<(NodeId, Selection)> {
    let point = insertion_point_or_end(doc, selection, ids)?;
    let table = build_table(dimensions, ids);
    let table_id = table.id.clone();

    let caret = insert_inlines(
        doc,
        &point,
        vec![Inline::Embed {
            object: EmbeddedObject::Table(table),
        }],
        ids,
    )?;

    debug!(
        table = %table_id,
        rows = dimensions.rows,
        columns = dimensions.columns,
        "Inserted table"
    );
    Ok((table_id, Selection::collapsed(caret)))
}

/// Apply a context-menu command to the table with the given id
pub fn apply_table_command(
    doc: &mut Document,
    table_id: &str,
    command: TableCommand,
    ids: &mut IdGenerator,
) -> EditResult<()> {
    let table = match command {
        TableCommand::Delete => return delete_table(doc, table_id),
        _ => doc
            .table_mut(table_id)
            .ok_or_else(|| EditError::not_found(table_id))?,
    };

    match command {
        TableCommand::AddRow => add_row(table, ids),
        TableCommand::AddColumn => add_column(table, ids),
        TableCommand::RemoveRow => remove_row(table),
        TableCommand::RemoveColumn => remove_column(table),
        TableCommand::Delete => Ok(()),
    }
}

/// Append a row matching the existing column count
pub fn add_row(table: &mut Table, ids: &mut IdGenerator) -> EditResult<()> {
    if table.row_count() >= MAX_TABLE_DIMENSION {
        return Err(too_large());
    }
    let columns = table.column_count().max(1);
    table.rows.push(blank_row(columns, ids));
    Ok(())
}

/// Append a cell to every existing row
pub fn add_column(table: &mut Table, ids: &mut IdGenerator) -> EditResult<()> {
    if table.rows.is_empty() {
        table.rows.push(blank_row(1, ids));
        return Ok(());
    }
    if table.column_count() >= MAX_TABLE_DIMENSION {
        return Err(too_large());
    }
    for row in &mut table.rows {
        row.cells.push(blank_cell(ids));
    }
    Ok(())
}

pub fn remove_row(table: &mut Table) -> EditResult<()> {
    if table.row_count() <= 1 {
        return Err(EditError::no_op("Cannot remove the last row"));
    }
    table.rows.pop();
    Ok(())
}

pub fn remove_column(table: &mut Table) -> EditResult<()> {
    if table.column_count() <= 1 {
        return Err(EditError::no_op("Cannot remove the last column"));
    }
    for row in &mut table.rows {
        row.cells.pop();
    }
    Ok(())
}

/// Remove the table with all its rows and cells
pub fn delete_table(doc: &mut Document, table_id: &str) -> EditResult<()> {
    if doc.find_table(table_id).is_none() {
        return Err(EditError::not_found(table_id));
    }
    doc.remove(table_id);
    Ok(())
}
