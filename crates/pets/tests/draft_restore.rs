use checkout_drafts::{DraftStorage, FileStorage, InMemoryStorage};
use checkout_pets::{PET_INFORMATION_KEY, PetInformation, PetRecord, PetSelection, PetStep};
use proptest::prelude::*;
use tempfile::TempDir;

#[test]
fn reopening_over_same_storage_restores_record_sequence() {
    let storage = InMemoryStorage::new();

    let mut step = PetStep::multiple(storage.clone()).unwrap();
    step.set_animal_name(0, "Rex").unwrap();
    step.add_new().unwrap();
    step.set_animal_name(1, "Tom").unwrap();
    step.set_pet_selection(1, PetSelection::Test2).unwrap();
    let written = step.records().to_vec();
    drop(step);

    let reopened = PetStep::multiple(storage).unwrap();
    assert_eq!(reopened.records(), written.as_slice());
}

#[test]
fn file_backed_draft_survives_reopen() {
    let tmp = TempDir::new().unwrap();

    let mut step = PetStep::single(FileStorage::new(tmp.path())).unwrap();
    step.set_animal_name(0, "Nemo").unwrap();
    step.set_pet_selection(0, PetSelection::Test4).unwrap();
    drop(step);

    let reopened = PetStep::single(FileStorage::new(tmp.path())).unwrap();
    assert_eq!(
        reopened.information(),
        &PetInformation::Single(PetRecord::new("Nemo", PetSelection::Test4))
    );
}

#[test]
fn draft_written_externally_is_loaded() {
    let storage = InMemoryStorage::new();
    storage
        .set(
            PET_INFORMATION_KEY,
            r#"[{"animalName":"Rex","petSelection":"Test2"},{"animalName":"Tom","petSelection":"Test1"}]"#,
        )
        .unwrap();

    let step = PetStep::multiple(storage).unwrap();
    assert_eq!(
        step.records(),
        &[
            PetRecord::new("Rex", PetSelection::Test2),
            PetRecord::new("Tom", PetSelection::Test1),
        ]
    );
}

fn selection() -> impl Strategy<Value = PetSelection> {
    proptest::sample::select(PetSelection::ALL.to_vec())
}

proptest! {
    /// Property: any record sequence written through the step reloads unchanged.
    #[test]
    fn record_sequence_round_trips(
        records in proptest::collection::vec(("[A-Za-z ]{0,16}", selection()), 1..6)
    ) {
        let storage = InMemoryStorage::new();
        let mut step = PetStep::multiple(storage.clone()).unwrap();

        for (i, (name, sel)) in records.iter().enumerate() {
            if i > 0 {
                step.add_new().unwrap();
            }
            step.set_animal_name(i, name.clone()).unwrap();
            step.set_pet_selection(i, *sel).unwrap();
        }
        let expected = step.records().to_vec();

        let reopened = PetStep::multiple(storage).unwrap();
        prop_assert_eq!(reopened.records(), expected.as_slice());
    }
}
