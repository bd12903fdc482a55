//! Acquisition tax on property transfers: a tiered rate table resolved into
//! acquisition, rural-surtax and education-surtax components.

pub mod rates;
pub mod report;

pub use rates::{
    is_sub_classification_applicable, resolve, resolve_rates, AcquisitionClassification,
    AcquisitionDerived, AcquisitionInput, RateTriple, SubClassification,
};
pub use report::{
    calculate_report, AcquisitionItem, AcquisitionReport, AcquisitionReportInput,
    AcquisitionTotals,
};
