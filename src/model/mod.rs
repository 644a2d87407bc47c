pub mod employee;
pub mod punch;
pub mod regularization;
pub mod role;
