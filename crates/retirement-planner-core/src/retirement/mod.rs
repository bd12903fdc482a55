//! Retirement savings gap analysis: how much must be saved each year so that
//! existing assets plus pensions fund a target income over the retirement
//! horizon.

pub mod assumptions;
pub mod projection;

pub use assumptions::{Assumptions, PublicPensionEntry, RetirementAssetEntry};
pub use projection::{
    glide_path, project, project_with_metadata, AllocationSuggestion, AssetFutureValue,
    CalculationResult,
};
