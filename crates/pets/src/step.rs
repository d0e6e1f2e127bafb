use thiserror::Error;

use checkout_core::DomainError;
use checkout_drafts::{DraftStorage, DraftStore, StorageError};

use crate::record::{PetInformation, PetRecord, PetSelection};

/// Storage key the draft is persisted under.
pub const PET_INFORMATION_KEY: &str = "petInformation";

#[derive(Debug, Error)]
pub enum PetStepError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Which form variant is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PetStepMode {
    /// Exactly one record.
    Single,
    /// One or more records; "Add New" appends a default record.
    Multiple,
}

impl PetStepMode {
    fn default_information(self) -> PetInformation {
        match self {
            PetStepMode::Single => PetInformation::Single(PetRecord::default()),
            PetStepMode::Multiple => PetInformation::Multiple(vec![PetRecord::default()]),
        }
    }

    /// Coerce a stored draft into this mode's shape.
    ///
    /// A single record becomes a one-element list; a list edited in single
    /// mode keeps its first record.
    fn conform(self, info: PetInformation) -> PetInformation {
        match (self, info) {
            (PetStepMode::Single, PetInformation::Multiple(records)) => {
                PetInformation::Single(records.into_iter().next().unwrap_or_default())
            }
            (PetStepMode::Multiple, PetInformation::Single(record)) => {
                PetInformation::Multiple(vec![record])
            }
            (PetStepMode::Multiple, PetInformation::Multiple(records)) if records.is_empty() => {
                PetInformation::Multiple(vec![PetRecord::default()])
            }
            (_, info) => info,
        }
    }
}

/// Editing state of the pet step.
///
/// Every change writes the whole payload to the draft store, so reopening
/// the step over the same storage restores the last edit.
#[derive(Debug)]
pub struct PetStep<S> {
    mode: PetStepMode,
    draft: DraftStore<PetInformation, S>,
    info: PetInformation,
}

impl<S: DraftStorage> PetStep<S> {
    /// Open the step, restoring any saved draft.
    ///
    /// The restored (or default) payload is written back straight away, so the
    /// stored draft always has the shape of the mode being edited.
    pub fn open(mode: PetStepMode, storage: S) -> Result<Self, PetStepError> {
        let draft = DraftStore::new(storage, PET_INFORMATION_KEY, mode.default_information());
        let info = mode.conform(draft.load()?);
        draft.save(&info)?;
        tracing::debug!(?mode, records = info.records().len(), "pet step opened");
        Ok(Self { mode, draft, info })
    }

    pub fn single(storage: S) -> Result<Self, PetStepError> {
        Self::open(PetStepMode::Single, storage)
    }

    pub fn multiple(storage: S) -> Result<Self, PetStepError> {
        Self::open(PetStepMode::Multiple, storage)
    }

    pub fn mode(&self) -> PetStepMode {
        self.mode
    }

    pub fn records(&self) -> &[PetRecord] {
        self.info.records()
    }

    pub fn information(&self) -> &PetInformation {
        &self.info
    }

    /// Release the underlying storage handle.
    pub fn into_storage(self) -> S {
        self.draft.into_storage()
    }

    pub fn set_animal_name(
        &mut self,
        index: usize,
        animal_name: impl Into<String>,
    ) -> Result<(), PetStepError> {
        let animal_name = animal_name.into();
        self.replace_record(index, |r| r.with_animal_name(animal_name))
    }

    pub fn set_pet_selection(
        &mut self,
        index: usize,
        selection: PetSelection,
    ) -> Result<(), PetStepError> {
        self.replace_record(index, |r| r.with_pet_selection(selection))
    }

    /// Append a default record ("Add New"). Multi-record variant only.
    pub fn add_new(&mut self) -> Result<(), PetStepError> {
        let PetInformation::Multiple(records) = &self.info else {
            return Err(DomainError::conflict("single pet form cannot add records").into());
        };

        let next: Vec<PetRecord> = records
            .iter()
            .cloned()
            .chain(std::iter::once(PetRecord::default()))
            .collect();
        self.commit(PetInformation::Multiple(next))
    }

    /// Remove a record. The last remaining record cannot be removed.
    pub fn remove_record(&mut self, index: usize) -> Result<(), PetStepError> {
        let PetInformation::Multiple(records) = &self.info else {
            return Err(DomainError::conflict("single pet form cannot remove records").into());
        };
        if index >= records.len() {
            return Err(DomainError::index_out_of_range("pet record", index, records.len()).into());
        }
        if records.len() == 1 {
            return Err(DomainError::invariant("at least one pet record is required").into());
        }

        let next: Vec<PetRecord> = records
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, r)| r.clone())
            .collect();
        self.commit(PetInformation::Multiple(next))
    }

    /// Forward the current payload, verbatim, to `on_submit`.
    pub fn submit<F>(&self, on_submit: F)
    where
        F: FnOnce(PetInformation),
    {
        tracing::info!(records = self.info.records().len(), "pet step submitted");
        on_submit(self.info.clone());
    }

    fn replace_record<F>(&mut self, index: usize, f: F) -> Result<(), PetStepError>
    where
        F: FnOnce(PetRecord) -> PetRecord,
    {
        let next = match &self.info {
            PetInformation::Single(record) => {
                if index != 0 {
                    return Err(DomainError::index_out_of_range("pet record", index, 1).into());
                }
                PetInformation::Single(f(record.clone()))
            }
            PetInformation::Multiple(records) => {
                let len = records.len();
                let Some(current) = records.get(index) else {
                    return Err(DomainError::index_out_of_range("pet record", index, len).into());
                };
                let replacement = f(current.clone());
                let next: Vec<PetRecord> = records
                    .iter()
                    .enumerate()
                    .map(|(i, r)| if i == index { replacement.clone() } else { r.clone() })
                    .collect();
                PetInformation::Multiple(next)
            }
        };
        self.commit(next)
    }

    fn commit(&mut self, next: PetInformation) -> Result<(), PetStepError> {
        self.draft.save(&next)?;
        self.info = next;
        Ok(())
    }
}
