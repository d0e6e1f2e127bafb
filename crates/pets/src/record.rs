use serde::{Deserialize, Serialize};

use checkout_core::{DomainError, ValueObject};

/// Option picked in the pet selector; persisted as `"Test1"`..`"Test4"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PetSelection {
    #[default]
    Test1,
    Test2,
    Test3,
    Test4,
}

impl PetSelection {
    /// Options in the order the form lists them.
    pub const ALL: [PetSelection; 4] = [
        PetSelection::Test1,
        PetSelection::Test2,
        PetSelection::Test3,
        PetSelection::Test4,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PetSelection::Test1 => "Test1",
            PetSelection::Test2 => "Test2",
            PetSelection::Test3 => "Test3",
            PetSelection::Test4 => "Test4",
        }
    }
}

impl core::str::FromStr for PetSelection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PetSelection::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::validation(format!("unknown pet selection {s:?}")))
    }
}

/// One pet entry: `{"animalName": "...", "petSelection": "Test1"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetRecord {
    pub animal_name: String,
    pub pet_selection: PetSelection,
}

impl ValueObject for PetRecord {}

impl PetRecord {
    pub fn new(animal_name: impl Into<String>, pet_selection: PetSelection) -> Self {
        Self {
            animal_name: animal_name.into(),
            pet_selection,
        }
    }

    pub fn with_animal_name(self, animal_name: impl Into<String>) -> Self {
        Self {
            animal_name: animal_name.into(),
            ..self
        }
    }

    pub fn with_pet_selection(self, pet_selection: PetSelection) -> Self {
        Self {
            pet_selection,
            ..self
        }
    }
}

/// Payload stored under `petInformation` and handed to the submit handler.
///
/// On the wire this is either a bare record or an array of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PetInformation {
    Single(PetRecord),
    Multiple(Vec<PetRecord>),
}

impl PetInformation {
    pub fn records(&self) -> &[PetRecord] {
        match self {
            PetInformation::Single(record) => std::slice::from_ref(record),
            PetInformation::Multiple(records) => records,
        }
    }
}
