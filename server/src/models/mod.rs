//! Request and report models

pub mod container;
pub mod deployment;
pub mod report;
