//! Multi-statement execution against one `rusqlite` connection.
//!
//! Statements run in text order, each through its own prepare/step/finalize cycle. The first
//! failure aborts the rest of the batch and discards any rows gathered so far; side effects of
//! statements that already completed stay in the database.

use std::sync::Arc;

use rusqlite::fallible_iterator::FallibleIterator;
use rusqlite::{Batch, Connection, Statement};

use crate::error::SqliteBridgeError;
use crate::marshal::marshal_value_ref;
use crate::results::{Column, Columns, ResultSet};
use crate::types::{CellValue, ColumnPolicy, ColumnType};

/// Run every statement in `sql` and collect the rows they produce.
///
/// # Errors
/// Returns [`SqliteBridgeError::NotInitialized`] when `conn` is `None` (no engine call is made),
/// or [`SqliteBridgeError::Statement`] carrying the engine's message for the first statement that
/// fails to prepare, step or finalize.
pub fn execute_batch(
    conn: Option<&Connection>,
    sql: &str,
    policy: ColumnPolicy,
) -> Result<ResultSet, SqliteBridgeError> {
    let Some(conn) = conn else {
        return Err(SqliteBridgeError::NotInitialized);
    };

    let mut collector = RowCollector::new(policy);
    let mut batch = Batch::new(conn, sql);
    let mut index = 0usize;

    loop {
        let stmt = match batch.next() {
            Ok(Some(stmt)) => stmt,
            Ok(None) => break,
            Err(source) => {
                return Err(SqliteBridgeError::Statement {
                    index,
                    sql: None,
                    source,
                });
            }
        };
        let text = stmt
            .expanded_sql()
            .map(|sql| sql.trim().trim_end_matches(';').trim_end().to_string());
        let fail = |source| SqliteBridgeError::Statement {
            index,
            sql: text.clone(),
            source,
        };

        let produced = run_statement(stmt, &mut collector).map_err(fail)?;
        tracing::debug!(statement = index, rows = produced, "sqlite statement finished");
        index += 1;
    }

    tracing::trace!(statements = index, "sqlite batch complete");
    Ok(collector.finish())
}

/// Step one statement to completion, then finalize it. Returns the number of rows appended.
fn run_statement(
    mut stmt: Statement<'_>,
    collector: &mut RowCollector,
) -> Result<usize, rusqlite::Error> {
    let column_count = stmt.column_count();
    if column_count > 0 {
        let names = stmt
            .column_names()
            .into_iter()
            .map(Column::new)
            .collect();
        collector.begin_statement(names);
    }

    let mut produced = 0;
    {
        // Unbound parameters step as NULL, the same as the engine's own exec loop.
        let mut rows = stmt.raw_query();
        while let Some(row) = rows.next()? {
            if column_count == 0 {
                continue;
            }
            let mut kinds = Vec::with_capacity(column_count);
            let mut values = Vec::with_capacity(column_count);
            for idx in 0..column_count {
                let value = row.get_ref(idx)?;
                kinds.push(ColumnType::from(value.data_type()));
                values.push(marshal_value_ref(value));
            }
            collector.push(&kinds, values);
            produced += 1;
        }
    }

    stmt.finalize()?;
    Ok(produced)
}

/// Accumulates rows and assigns column descriptors according to the [`ColumnPolicy`].
///
/// Names come from the statement; types are only known once a row has been stepped, so a
/// statement's descriptors stay pending until its first row arrives.
struct RowCollector {
    policy: ColumnPolicy,
    result: ResultSet,
    pending: Option<Vec<Column>>,
    current: Option<Arc<Columns>>,
}

impl RowCollector {
    fn new(policy: ColumnPolicy) -> Self {
        Self {
            policy,
            result: ResultSet::with_capacity(16),
            pending: None,
            current: None,
        }
    }

    fn begin_statement(&mut self, names: Vec<Column>) {
        match self.policy {
            ColumnPolicy::FirstStatement => {
                if self.pending.is_none() && self.current.is_none() {
                    self.pending = Some(names);
                }
            }
            ColumnPolicy::PerStatement => {
                self.settle_untyped();
                self.current = None;
                self.pending = Some(names);
            }
        }
    }

    fn push(&mut self, kinds: &[ColumnType], values: Vec<CellValue>) {
        let columns = match &self.current {
            Some(columns) => Arc::clone(columns),
            None => {
                let mut columns = self.pending.take().unwrap_or_default();
                for (column, kind) in columns.iter_mut().zip(kinds) {
                    column.kind = Some(*kind);
                }
                let columns = Columns::new(columns);
                self.result.set_columns(Arc::clone(&columns));
                self.current = Some(Arc::clone(&columns));
                columns
            }
        };
        self.result.add_row_values(&columns, values);
    }

    /// A row-producing statement that stepped no rows still reports its column names.
    fn settle_untyped(&mut self) {
        if let Some(columns) = self.pending.take() {
            self.result.set_columns(Columns::new(columns));
        }
    }

    fn finish(mut self) -> ResultSet {
        self.settle_untyped();
        self.result
    }
}
