//! Deployment module

pub mod command;
pub mod compose;
pub mod docker;
pub mod executor;
pub mod fsm;
pub mod orchestrator;
pub mod trace;
