//! Pet information checkout step.
//!
//! Collects one pet record (single variant) or a list of them (multi variant),
//! mirrors every edit to the draft store under [`PET_INFORMATION_KEY`], and
//! hands the final value to the caller on submit. No validation happens here.

pub mod record;
pub mod step;

pub use record::{PetInformation, PetRecord, PetSelection};
pub use step::{PET_INFORMATION_KEY, PetStep, PetStepError, PetStepMode};
