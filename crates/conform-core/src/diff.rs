//! Desired-vs-live comparison.
//!
//! Matching is by name, case sensitive, and the produced actions are
//! additive only: columns or indexes that exist live but not in the
//! model are left untouched.

use tracing::debug;

use crate::model::{Column, Table};
use crate::operations::SyncAction;
use crate::provider::{LiveColumn, LiveIndex};

/// Compares a desired table against its live columns.
///
/// Missing columns become add actions, drifted columns become modify
/// actions, in the model's declaration order.
#[must_use]
pub fn diff_columns(desired: &Table, live: &[LiveColumn]) -> Vec<SyncAction> {
    let mut actions = Vec::new();
    for column in &desired.columns {
        match live.iter().find(|lc| lc.name == column.name) {
            None => {
                debug!(table = %desired.name, column = %column.name, "column missing from live table");
                actions.push(SyncAction::add_column(
                    desired.schema.clone(),
                    desired.name.clone(),
                    column.clone(),
                ));
            }
            Some(lc) if column_matches(column, lc) => {}
            Some(_) => {
                debug!(table = %desired.name, column = %column.name, "column definition drifted");
                actions.push(SyncAction::modify_column(
                    desired.schema.clone(),
                    desired.name.clone(),
                    column.clone(),
                ));
            }
        }
    }
    actions
}

/// Compares a desired table's indexes against the live index list.
///
/// Existence is judged by (schema, table, name) alone. A live index
/// whose columns or uniqueness drifted is still treated as present.
#[must_use]
pub fn diff_indexes(desired: &Table, live: &[LiveIndex]) -> Vec<SyncAction> {
    desired
        .indexes
        .iter()
        .filter(|ix| {
            !live.iter().any(|li| {
                li.schema == ix.schema && li.table == ix.table && li.name == ix.name
            })
        })
        .map(|ix| SyncAction::create_index(ix.clone()))
        .collect()
}

fn column_matches(desired: &Column, live: &LiveColumn) -> bool {
    desired.db_type == live.db_type
        && desired.length == live.length
        && desired.identity == live.identity
        && desired.key == live.key
        && desired.nullable == live.nullable
}
