//! Entry store
//!
//! Holds an ordered collection of entries and the editing cursor. All
//! operations are synchronous in-memory mutations; a rejected operation never
//! changes the collection, and its error is also recorded in the store's
//! [`ErrorSet`] for the presentation layer to read.

use listform_model::{Entry, ResponseValue, Schema};
use listform_serialize::{rehydrate, EngineConfig, SubmitOutput};
use listform_validate::Validator;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::error::{EntryError, ErrorSet};
use crate::state::{validate_transition, EditState, Transition};

/// Collection of entries with at most one open for editing
#[derive(Debug, Clone)]
pub struct EntryStore {
    schema: Schema,
    validator: Validator,
    config: EngineConfig,
    entries: Vec<Entry>,
    active: Option<usize>,
    /// Pre-edit copy of a previously saved entry
    snapshot: Option<Entry>,
    errors: ErrorSet,
}

impl EntryStore {
    /// Fresh store
    ///
    /// When the schema requires at least one entry, a blank entry is seeded
    /// and opened.
    #[must_use]
    pub fn new(schema: Schema, config: EngineConfig) -> Self {
        let validator = Validator::generate(&schema);
        let mut store = Self {
            schema,
            validator,
            config,
            entries: Vec::new(),
            active: None,
            snapshot: None,
            errors: ErrorSet::default(),
        };
        store.seed();
        store
    }

    /// Store initialised from previously submitted data
    ///
    /// Restored entries start saved. If nothing is restored the store is
    /// seeded as by [`EntryStore::new`].
    ///
    /// # Errors
    /// Returns [`EntryError::Rehydrate`] if the data cannot be rebuilt
    pub fn from_previous(
        schema: Schema,
        config: EngineConfig,
        data: &JsonValue,
    ) -> Result<Self, EntryError> {
        let entries = rehydrate(&schema, data, &config)?;
        let mut store = Self::new(schema, config);
        if !entries.is_empty() {
            info!(count = entries.len(), "restored previous entries");
            store.entries = entries;
            store.active = None;
        }
        Ok(store)
    }

    fn seed(&mut self) {
        if self.schema.min() >= 1 {
            self.entries.push(Entry::blank(&self.schema));
            self.active = Some(0);
        }
    }

    /// Schema of the collection
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Validator generated for the schema
    #[inline]
    #[must_use]
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Serialization settings
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Entries in order
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Entry at an index
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the collection is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the open entry
    #[inline]
    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// The open entry
    #[must_use]
    pub fn active_entry(&self) -> Option<&Entry> {
        self.active.and_then(|index| self.entries.get(index))
    }

    /// Current editing state
    #[inline]
    #[must_use]
    pub fn state(&self) -> EditState {
        EditState::of(self.entries.len(), self.active)
    }

    /// Errors from the most recent operation
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &ErrorSet {
        &self.errors
    }

    /// Check if another entry may be added now
    #[must_use]
    pub fn can_add(&self) -> bool {
        self.active.is_none() && self.schema.has_capacity_for(self.entries.len())
    }

    /// Record the outcome of an operation in the error set
    fn record<T>(
        &mut self,
        transition: Transition,
        result: Result<T, EntryError>,
    ) -> Result<T, EntryError> {
        match &result {
            Ok(_) => {
                self.errors = ErrorSet::default();
                debug!(?transition, state = %self.state(), len = self.entries.len(), "transition applied");
            }
            Err(error) => {
                self.errors = ErrorSet::from_error(error);
                warn!(?transition, state = %self.state(), %error, "transition rejected");
            }
        }
        result
    }

    fn check_index(&self, index: usize) -> Result<(), EntryError> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(EntryError::OutOfRange {
                index,
                len: self.entries.len(),
            })
        }
    }

    fn open_index(&self, transition: Transition) -> Result<usize, EntryError> {
        validate_transition(self.state(), transition)?;
        self.active.ok_or(EntryError::NotEditing)
    }

    /// Append a blank entry and open it
    ///
    /// # Errors
    /// - [`EntryError::UnsavedEntry`] if another entry is open
    /// - [`EntryError::MaxReached`] if the collection is at capacity
    pub fn add_entry(&mut self) -> Result<usize, EntryError> {
        let result = self.try_add_entry();
        self.record(Transition::AddEntry, result)
    }

    fn try_add_entry(&mut self) -> Result<usize, EntryError> {
        validate_transition(self.state(), Transition::AddEntry)?;
        if !self.schema.has_capacity_for(self.entries.len()) {
            return Err(EntryError::MaxReached {
                max: self.schema.max().unwrap_or(self.entries.len()),
            });
        }

        self.entries.push(Entry::blank(&self.schema));
        let index = self.entries.len() - 1;
        self.active = Some(index);
        self.snapshot = None;
        Ok(index)
    }

    /// Open a saved entry for editing
    ///
    /// The entry's current value is kept so cancel can restore it.
    ///
    /// # Errors
    /// - [`EntryError::UnsavedEntry`] if another entry is open
    /// - [`EntryError::OutOfRange`] if `index` is past the end
    pub fn edit_entry(&mut self, index: usize) -> Result<(), EntryError> {
        let result = self.try_edit_entry(index);
        self.record(Transition::EditEntry, result)
    }

    fn try_edit_entry(&mut self, index: usize) -> Result<(), EntryError> {
        if self.active == Some(index) {
            return Ok(());
        }
        validate_transition(self.state(), Transition::EditEntry)?;
        self.check_index(index)?;

        self.snapshot = Some(self.entries[index].clone());
        self.active = Some(index);
        Ok(())
    }

    /// Validate and close the open entry
    ///
    /// # Errors
    /// - [`EntryError::NotEditing`] if no entry is open
    /// - [`EntryError::InvalidEntry`] with every failing field; the entry stays open
    pub fn save_entry(&mut self) -> Result<usize, EntryError> {
        let result = self.try_save_entry();
        self.record(Transition::SaveEntry, result)
    }

    fn try_save_entry(&mut self) -> Result<usize, EntryError> {
        let index = self.open_index(Transition::SaveEntry)?;
        self.validator
            .validate(&self.entries[index])
            .map_err(EntryError::InvalidEntry)?;

        self.active = None;
        self.snapshot = None;
        Ok(index)
    }

    /// Close the open entry without saving
    ///
    /// A previously saved entry is restored to its pre-edit value; a new entry
    /// is removed.
    ///
    /// # Errors
    /// Returns [`EntryError::NotEditing`] if no entry is open
    pub fn cancel_edit_entry(&mut self) -> Result<(), EntryError> {
        let result = self.try_cancel_edit_entry();
        self.record(Transition::CancelEditEntry, result)
    }

    fn try_cancel_edit_entry(&mut self) -> Result<(), EntryError> {
        let index = self.open_index(Transition::CancelEditEntry)?;
        match self.snapshot.take() {
            Some(snapshot) => self.entries[index] = snapshot,
            None => {
                self.entries.remove(index);
            }
        }
        self.active = None;
        Ok(())
    }

    /// Delete an entry
    ///
    /// An open entry after `index` stays open; removing the open entry closes it.
    ///
    /// # Errors
    /// Returns [`EntryError::OutOfRange`] if `index` is past the end
    pub fn remove_entry(&mut self, index: usize) -> Result<Entry, EntryError> {
        let result = self.try_remove_entry(index);
        self.record(Transition::RemoveEntry, result)
    }

    fn try_remove_entry(&mut self, index: usize) -> Result<Entry, EntryError> {
        validate_transition(self.state(), Transition::RemoveEntry)?;
        self.check_index(index)?;

        let removed = self.entries.remove(index);
        self.active = match self.active {
            Some(active) if index < active => Some(active - 1),
            Some(active) if index == active => {
                self.snapshot = None;
                None
            }
            other => other,
        };
        Ok(removed)
    }

    /// Reset the open entry to blank, keeping its position
    ///
    /// # Errors
    /// Returns [`EntryError::NotEditing`] if no entry is open
    pub fn clear_entry(&mut self) -> Result<(), EntryError> {
        let result = self
            .open_index(Transition::ClearEntry)
            .map(|index| self.entries[index] = Entry::blank(&self.schema));
        self.record(Transition::ClearEntry, result)
    }

    /// Copy every response of another entry into the open entry
    ///
    /// # Errors
    /// - [`EntryError::NotEditing`] if no entry is open
    /// - [`EntryError::OutOfRange`] if `source` is past the end
    pub fn copy_from(&mut self, source: usize) -> Result<(), EntryError> {
        let result = self.try_copy_from(source);
        self.record(Transition::CopyFrom, result)
    }

    fn try_copy_from(&mut self, source: usize) -> Result<(), EntryError> {
        let index = self.open_index(Transition::CopyFrom)?;
        self.check_index(source)?;
        if source != index {
            self.entries[index] = self.entries[source].clone();
        }
        Ok(())
    }

    /// Set one response of the open entry
    ///
    /// # Errors
    /// - [`EntryError::NotEditing`] if no entry is open
    /// - [`EntryError::UnknownField`] if `key` is not a field of the schema
    pub fn set_value(&mut self, key: &str, value: ResponseValue) -> Result<(), EntryError> {
        let result = self.try_set_value(key, value);
        self.record(Transition::SetValue, result)
    }

    fn try_set_value(&mut self, key: &str, value: ResponseValue) -> Result<(), EntryError> {
        let index = self.open_index(Transition::SetValue)?;
        self.entries[index]
            .set(key, value)
            .map(|_| ())
            .ok_or_else(|| EntryError::UnknownField(key.to_string()))
    }

    /// Check cardinality and validity, then serialize the collection
    ///
    /// # Errors
    /// - [`EntryError::UnsavedOnSubmit`] if an entry is open
    /// - [`EntryError::TooFewEntries`] / [`EntryError::TooManyEntries`] on cardinality
    /// - [`EntryError::InvalidEntries`] for the first entry failing validation
    pub fn submit_all(&mut self) -> Result<SubmitOutput, EntryError> {
        let result = self.try_submit_all();
        self.record(Transition::SubmitAll, result)
    }

    fn try_submit_all(&self) -> Result<SubmitOutput, EntryError> {
        validate_transition(self.state(), Transition::SubmitAll)?;

        let len = self.entries.len();
        if len < self.schema.min() {
            return Err(EntryError::TooFewEntries {
                min: self.schema.min(),
                len,
            });
        }
        if let Some(max) = self.schema.max().filter(|max| len > *max) {
            return Err(EntryError::TooManyEntries { max, len });
        }

        for (index, entry) in self.entries.iter().enumerate() {
            self.validator
                .validate(entry)
                .map_err(|errors| EntryError::InvalidEntries {
                    position: index + 1,
                    errors,
                })?;
        }

        let output = SubmitOutput::build(&self.schema, &self.entries, &self.config);
        info!(
            entries = len,
            root = %self.config.root_key,
            paths = output.flattened.len(),
            "submitted collection"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listform_model::{DataKey, Field, NumberInput, TextInput};
    use pretty_assertions::assert_eq;

    fn schema(min: usize, max: Option<usize>) -> Schema {
        Schema::new(
            "Item",
            vec![
                Field::text(TextInput::new("name".parse().unwrap(), "Name")),
                Field::number(NumberInput::new("count".parse().unwrap(), "Count")),
            ],
            min,
            max,
        )
        .unwrap()
    }

    fn root() -> DataKey {
        "items".parse().unwrap()
    }

    fn fill(store: &mut EntryStore, name: &str, count: f64) {
        store.set_value("name", ResponseValue::text(name)).unwrap();
        store.set_value("count", ResponseValue::Number(count)).unwrap();
    }

    #[test]
    fn new_seeds_when_min_positive() {
        let store = EntryStore::new(schema(1, Some(10)), EngineConfig::new(root()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.active_index(), Some(0));
        assert!(store.entries()[0].is_blank());

        let empty = EntryStore::new(schema(0, None), EngineConfig::new(root()));
        assert_eq!(empty.state(), EditState::Idle);
    }

    #[test]
    fn save_rejects_invalid_and_stays_open() {
        let mut store = EntryStore::new(schema(1, None), EngineConfig::new(root()));
        let err = store.save_entry().unwrap_err();
        assert!(matches!(err, EntryError::InvalidEntry(ref e) if e.len() == 2));
        assert_eq!(store.active_index(), Some(0));
        assert_eq!(store.errors().field_errors.len(), 2);

        fill(&mut store, "a", 1.0);
        assert_eq!(store.save_entry(), Ok(0));
        assert_eq!(store.state(), EditState::AllSaved);
        assert!(store.errors().is_empty());
    }

    #[test]
    fn add_while_open_sets_add_item() {
        let mut store = EntryStore::new(schema(1, None), EngineConfig::new(root()));
        assert!(matches!(store.add_entry(), Err(EntryError::UnsavedEntry { active: 0 })));
        assert!(store.errors().add_item);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn add_at_capacity_sets_max() {
        let mut store = EntryStore::new(schema(1, Some(1)), EngineConfig::new(root()));
        fill(&mut store, "a", 1.0);
        store.save_entry().unwrap();
        assert_eq!(store.add_entry(), Err(EntryError::MaxReached { max: 1 }));
        assert!(store.errors().max);
        assert!(!store.can_add());
    }

    #[test]
    fn remove_before_active_keeps_same_entry_open() {
        let mut store = EntryStore::new(schema(0, None), EngineConfig::new(root()));
        for name in ["a", "b", "c"] {
            store.add_entry().unwrap();
            fill(&mut store, name, 1.0);
            store.save_entry().unwrap();
        }
        store.edit_entry(2).unwrap();
        store.remove_entry(0).unwrap();

        assert_eq!(store.active_index(), Some(1));
        assert_eq!(
            store.active_entry().unwrap().get("name"),
            Some(&ResponseValue::text("c"))
        );
    }

    #[test]
    fn remove_active_closes_it() {
        let mut store = EntryStore::new(schema(1, None), EngineConfig::new(root()));
        store.remove_entry(0).unwrap();
        assert_eq!(store.state(), EditState::Idle);
    }

    #[test]
    fn clear_and_copy() {
        let mut store = EntryStore::new(schema(0, None), EngineConfig::new(root()));
        store.add_entry().unwrap();
        fill(&mut store, "source", 3.0);
        store.save_entry().unwrap();

        store.add_entry().unwrap();
        store.copy_from(0).unwrap();
        assert_eq!(store.entries()[1], store.entries()[0]);

        store.clear_entry().unwrap();
        assert!(store.entries()[1].is_blank());
        assert_eq!(store.active_index(), Some(1));
    }

    #[test]
    fn set_value_rejects_unknown_field_and_closed_store() {
        let mut store = EntryStore::new(schema(1, None), EngineConfig::new(root()));
        assert_eq!(
            store.set_value("colour", ResponseValue::text("red")),
            Err(EntryError::UnknownField("colour".into()))
        );

        fill(&mut store, "a", 1.0);
        store.save_entry().unwrap();
        assert_eq!(
            store.set_value("name", ResponseValue::text("b")),
            Err(EntryError::NotEditing)
        );
    }

    #[test]
    fn blank_text_is_stored_as_blank() {
        let mut store = EntryStore::new(schema(1, None), EngineConfig::new(root()));
        store.set_value("count", ResponseValue::text("")).unwrap();
        assert_eq!(store.entries()[0].get("count"), Some(&ResponseValue::Blank));
    }

    #[test]
    fn submit_requires_closed_and_enough_entries() {
        let mut store = EntryStore::new(schema(2, None), EngineConfig::new(root()));
        assert!(matches!(store.submit_all(), Err(EntryError::UnsavedOnSubmit { .. })));
        assert!(store.errors().unsaved_item);

        fill(&mut store, "a", 1.0);
        store.save_entry().unwrap();
        assert_eq!(
            store.submit_all().unwrap_err(),
            EntryError::TooFewEntries { min: 2, len: 1 }
        );
        assert!(store.errors().min);

        store.add_entry().unwrap();
        fill(&mut store, "b", 2.0);
        store.save_entry().unwrap();
        let output = store.submit_all().unwrap();
        assert_eq!(output.flattened.get("items.two.name"), Some(&serde_json::json!("b")));
    }
}
