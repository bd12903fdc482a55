pub mod acquisition_tax;
pub mod retirement;
