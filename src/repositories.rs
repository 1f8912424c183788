pub mod batches;
pub mod beneficiaries;
pub mod documents;
pub mod payment;
