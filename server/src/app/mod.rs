//! Application wiring

pub mod context;
pub mod options;
pub mod run;
