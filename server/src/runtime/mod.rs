//! Container runtime SDK binding

pub mod client;
pub mod docker;
pub mod inspect;
