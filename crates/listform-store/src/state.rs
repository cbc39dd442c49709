//! Editing states and allowed transitions
//!
//! At most one entry is open at a time. Which operations are legal depends
//! only on whether an entry is open and whether the collection is empty.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::EntryError;

/// Editing state of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditState {
    /// No entries and none open
    Idle,
    /// Entry at this index is open
    Editing(usize),
    /// No entry open
    AllSaved,
}

impl EditState {
    /// Derive the state from collection length and active index
    #[inline]
    #[must_use]
    pub fn of(len: usize, active: Option<usize>) -> Self {
        match active {
            Some(index) => Self::Editing(index),
            None if len == 0 => Self::Idle,
            None => Self::AllSaved,
        }
    }

    /// Index of the open entry
    #[inline]
    #[must_use]
    pub fn active(self) -> Option<usize> {
        match self {
            Self::Editing(index) => Some(index),
            Self::Idle | Self::AllSaved => None,
        }
    }
}

impl Display for EditState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Editing(index) => write!(f, "editing({index})"),
            Self::AllSaved => write!(f, "all saved"),
        }
    }
}

/// Store operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transition {
    /// Append and open a blank entry
    AddEntry,
    /// Open a saved entry
    EditEntry,
    /// Validate and close the open entry
    SaveEntry,
    /// Discard changes to the open entry
    CancelEditEntry,
    /// Delete an entry
    RemoveEntry,
    /// Blank the open entry
    ClearEntry,
    /// Copy another entry into the open one
    CopyFrom,
    /// Set one response of the open entry
    SetValue,
    /// Serialize the whole collection
    SubmitAll,
}

impl Transition {
    /// All operations
    pub const ALL: [Self; 9] = [
        Self::AddEntry,
        Self::EditEntry,
        Self::SaveEntry,
        Self::CancelEditEntry,
        Self::RemoveEntry,
        Self::ClearEntry,
        Self::CopyFrom,
        Self::SetValue,
        Self::SubmitAll,
    ];
}

/// Operations legal in a state
///
/// Removing another entry stays legal while one is open; the open entry keeps
/// its identity.
#[must_use]
pub fn allowed_transitions(state: EditState) -> &'static [Transition] {
    use Transition::{
        AddEntry, CancelEditEntry, ClearEntry, CopyFrom, EditEntry, RemoveEntry, SaveEntry,
        SetValue, SubmitAll,
    };
    match state {
        EditState::Idle => &[AddEntry, SubmitAll],
        EditState::Editing(_) => &[
            SaveEntry,
            CancelEditEntry,
            RemoveEntry,
            ClearEntry,
            CopyFrom,
            SetValue,
        ],
        EditState::AllSaved => &[AddEntry, EditEntry, RemoveEntry, SubmitAll],
    }
}

/// Check an operation against the current state
///
/// # Errors
/// Returns the workflow error matching the rejected operation
pub fn validate_transition(state: EditState, transition: Transition) -> Result<(), EntryError> {
    if allowed_transitions(state).contains(&transition) {
        return Ok(());
    }

    Err(match (state, transition) {
        (EditState::Editing(active), Transition::SubmitAll) => EntryError::UnsavedOnSubmit { active },
        (EditState::Editing(active), _) => EntryError::UnsavedEntry { active },
        (EditState::Idle, Transition::EditEntry | Transition::RemoveEntry) => {
            EntryError::OutOfRange { index: 0, len: 0 }
        }
        _ => EntryError::NotEditing,
    })
}
