pub mod repositories;
pub mod revocations;
