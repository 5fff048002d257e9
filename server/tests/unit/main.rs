//! Integration tests for docker-mcp

mod fakes;
mod test_container;
mod test_fsm;
mod test_inspect;
