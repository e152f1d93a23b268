//! Reconciliation of submitted option rows against persisted options.
//!
//! A list field's options arrive as an ordered collection of rows, each
//! targeting either an existing option (by id) or a new one (blank id).
//! Positions are reassigned densely from submission order on every pass.

use worktrack_core::error::WorktrackResult;

use crate::model::{CustomField, CustomOption};
use crate::params::SubmittedOption;
use crate::store::CustomFieldStore;

/// Reconciles the submitted option rows into the field.
///
/// Skipped entirely for non-list fields. For each row at 0-based index `i`:
///
/// - If the field itself is unsaved, or the row carries no id, or no
///   persisted option with that id exists anywhere in the store, a new
///   option `{value, position: i+1, default_value}` is built on the field
///   in memory, to be persisted when the parent saves.
/// - Otherwise the row targets options already loaded on this field: each
///   loaded option with the exact id gets its value overwritten only when
///   changed, its default flag taken from the row's checkbox presence, its
///   position set to `i+1`, and is persisted immediately. An id that exists
///   in the store but is not among the field's loaded options is a silent
///   no-op.
pub async fn reconcile_options(
    field: &mut CustomField,
    submitted: &[SubmittedOption],
    store: &dyn CustomFieldStore,
) -> WorktrackResult<()> {
    if !field.is_list() {
        return Ok(());
    }

    for (i, row) in submitted.iter().enumerate() {
        let position = u32::try_from(i).unwrap_or(u32::MAX).saturating_add(1);
        match row.id {
            Some(id) if !field.new_record() && store.option_exists(id).await => {
                update_option(field, id, row, position, store).await?;
            }
            _ => build_option(field, row, position),
        }
    }

    Ok(())
}

/// Builds a new in-memory option on the field.
fn build_option(field: &mut CustomField, row: &SubmittedOption, position: u32) {
    field
        .custom_options
        .push(CustomOption::new(row.value.clone(), position, row.is_default()));
}

/// Updates every loaded option of the field matching the id and persists
/// each immediately.
async fn update_option(
    field: &mut CustomField,
    id: u64,
    row: &SubmittedOption,
    position: u32,
    store: &dyn CustomFieldStore,
) -> WorktrackResult<()> {
    let mut changed = Vec::new();
    for option in field.custom_options.iter_mut().filter(|o| o.id == id) {
        if option.value != row.value {
            option.value.clone_from(&row.value);
        }
        option.default_value = row.is_default();
        option.position = position;
        changed.push(option.clone());
    }
    for option in changed {
        store.save_option(&option).await?;
    }
    Ok(())
}
