use crate::category::{CategoryTable, EffortType};
use crate::entry::{DATE_FORMAT, EntryInput, Hours, TimesheetEntry, new_id};
use crate::error::{TimesheetError, TimesheetResult, ValidationError};
use crate::persistence::EntryStore;
use chrono::{NaiveDate, Utc};
use tracing::debug;

/// Form input that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInput {
    pub date: NaiveDate,
    pub task: String,
    pub description: String,
    pub category: String,
    pub effort_type: EffortType,
    pub hours: Hours,
}

/// Effort type implied by a category, applied whenever the category changes.
pub fn effort_for_category(table: &CategoryTable, category: &str) -> EffortType {
    table.effort_for(category)
}

pub fn validate(
    table: &CategoryTable,
    input: &EntryInput,
) -> Result<ValidatedInput, ValidationError> {
    let task = input.task.trim();
    let date_raw = input.date.trim();
    let hours_raw = input.hours.trim();

    if task.is_empty() {
        return Err(ValidationError::MissingField("task"));
    }
    if date_raw.is_empty() {
        return Err(ValidationError::MissingField("date"));
    }
    if hours_raw.is_empty() {
        return Err(ValidationError::MissingField("hours"));
    }

    let date = NaiveDate::parse_from_str(date_raw, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(date_raw.to_string()))?;

    let hours = Hours::new(hours_raw);
    let value = hours
        .parse()
        .ok_or_else(|| ValidationError::InvalidHours(hours_raw.to_string()))?;
    if value < 0.0 {
        return Err(ValidationError::NegativeHours(hours_raw.to_string()));
    }

    let category = if input.category.trim().is_empty() {
        table.default_category().to_string()
    } else {
        table.canonical_name(&input.category)
    };

    let inferred = effort_for_category(table, &category);
    let effort_type = match input.effort_type {
        Some(chosen) if table.allow_effort_override => chosen,
        _ => inferred,
    };

    Ok(ValidatedInput {
        date,
        task: task.to_string(),
        description: input.description.trim().to_string(),
        category,
        effort_type,
        hours,
    })
}

/// Creates a new entry, or replaces the entry with `editing_id` in place.
///
/// When editing, `id` and `created_at` are carried over from the stored record.
/// The whole collection is written back; on a write failure nothing is
/// returned and the caller's view should stay as it was.
pub fn create_or_update<S: EntryStore + ?Sized>(
    store: &S,
    table: &CategoryTable,
    input: &EntryInput,
    editing_id: Option<&str>,
) -> TimesheetResult<TimesheetEntry> {
    let valid = validate(table, input)?;
    let mut entries = store.load();

    let entry = match editing_id {
        Some(id) => {
            let slot = entries
                .iter_mut()
                .find(|entry| entry.id == id)
                .ok_or_else(|| TimesheetError::NotFound(id.to_string()))?;
            let updated = TimesheetEntry {
                id: slot.id.clone(),
                created_at: slot.created_at,
                date: valid.date,
                task: valid.task,
                description: valid.description,
                category: valid.category,
                effort_type: valid.effort_type,
                hours: valid.hours,
            };
            *slot = updated.clone();
            debug!(id, "entry updated");
            updated
        }
        None => {
            let created = TimesheetEntry {
                id: new_id(),
                created_at: Utc::now(),
                date: valid.date,
                task: valid.task,
                description: valid.description,
                category: valid.category,
                effort_type: valid.effort_type,
                hours: valid.hours,
            };
            entries.push(created.clone());
            debug!(id = %created.id, "entry created");
            created
        }
    };

    store.replace_all(&entries)?;
    Ok(entry)
}

/// Removes the entry with `id`. Returns `false` when no entry matched, in
/// which case nothing is written.
pub fn delete_entry<S: EntryStore + ?Sized>(store: &S, id: &str) -> TimesheetResult<bool> {
    let entries = store.load();
    let before = entries.len();
    let remaining: Vec<_> = entries.into_iter().filter(|entry| entry.id != id).collect();
    if remaining.len() == before {
        return Ok(false);
    }
    store.replace_all(&remaining)?;
    debug!(id, "entry deleted");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CategoryTable {
        CategoryTable::standard()
    }

    #[test]
    fn missing_fields_are_reported_in_form_order() {
        let err = validate(&table(), &EntryInput::new("2024-01-02", "  ", "2")).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("task"));
        let err = validate(&table(), &EntryInput::new("", "Task", "2")).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("date"));
        let err = validate(&table(), &EntryInput::new("2024-01-02", "Task", "")).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("hours"));
    }

    #[test]
    fn non_numeric_and_negative_hours_are_rejected() {
        let err = validate(&table(), &EntryInput::new("2024-01-02", "Task", "two")).unwrap_err();
        assert_eq!(err, ValidationError::InvalidHours("two".into()));
        let err = validate(&table(), &EntryInput::new("2024-01-02", "Task", "-1")).unwrap_err();
        assert_eq!(err, ValidationError::NegativeHours("-1".into()));
    }

    #[test]
    fn bad_date_is_rejected() {
        let err = validate(&table(), &EntryInput::new("02/01/2024", "Task", "1")).unwrap_err();
        assert_eq!(err, ValidationError::InvalidDate("02/01/2024".into()));
    }

    #[test]
    fn locked_table_ignores_chosen_effort() {
        let input = EntryInput::new("2024-01-02", "Course", "3")
            .with_category("Training")
            .with_effort(EffortType::Billable);
        let valid = validate(&table(), &input).unwrap();
        assert_eq!(valid.effort_type, EffortType::NonBillable);

        let open = table().with_effort_override(true);
        let valid = validate(&open, &input).unwrap();
        assert_eq!(valid.effort_type, EffortType::Billable);
    }

    #[test]
    fn empty_category_falls_back_to_first_rule() {
        let valid = validate(&table(), &EntryInput::new("2024-01-02", "Task", "1")).unwrap();
        assert_eq!(valid.category, "project");
        assert_eq!(valid.effort_type, EffortType::Billable);
    }
}
