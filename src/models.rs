pub mod beneficiaries;
pub mod credits;
pub mod payment;
