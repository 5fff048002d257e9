//! Deployment state machine tests

use docker_mcp::deploy::executor::ExecutionResult;
use docker_mcp::deploy::fsm::{
    DeploymentFsm, DeploymentState, PullPolicy, Step, StepOutcome, StepPolicy, Tolerance,
};
use docker_mcp::errors::ServerError;

use crate::fakes::exited;

fn ok() -> Result<ExecutionResult, ServerError> {
    Ok(exited(0, "", ""))
}

#[test]
fn test_fsm_initial_state() {
    let fsm = DeploymentFsm::new();
    assert_eq!(fsm.state(), &DeploymentState::Pending);
    assert_eq!(fsm.next_step(), Some(Step::Teardown));
    assert_eq!(fsm.warnings(), 0);
}

#[test]
fn test_fsm_success_flow() {
    let policy = StepPolicy::default();
    let mut fsm = DeploymentFsm::new();

    for step in Step::SEQUENCE {
        fsm.begin(step).unwrap();
        assert_eq!(fsm.state(), &DeploymentState::Running(step));
        fsm.finish(&policy.classify(step, ok())).unwrap();
    }

    assert_eq!(fsm.state(), &DeploymentState::Deployed);
    assert_eq!(fsm.next_step(), None);
}

#[test]
fn test_fsm_rejects_out_of_order_steps() {
    let mut fsm = DeploymentFsm::new();
    assert!(fsm.begin(Step::BringUp).is_err());
    assert!(fsm.finish(&StepOutcome::Completed(exited(0, "", ""))).is_err());

    fsm.begin(Step::Teardown).unwrap();
    assert!(fsm.begin(Step::Pull).is_err());
}

#[test]
fn test_fsm_teardown_failure_is_a_warning() {
    let policy = StepPolicy::default();
    let mut fsm = DeploymentFsm::new();

    fsm.begin(Step::Teardown).unwrap();
    let outcome = policy.classify(Step::Teardown, Ok(exited(1, "", "no such project")));
    assert!(matches!(outcome, StepOutcome::Warning { .. }));
    fsm.finish(&outcome).unwrap();

    assert_eq!(fsm.state(), &DeploymentState::Running(Step::Pull));
    assert_eq!(fsm.warnings(), 1);
}

#[test]
fn test_fsm_bring_up_failure_is_fatal() {
    let policy = StepPolicy::new(PullPolicy::Permissive);
    let mut fsm = DeploymentFsm::new();

    for step in [Step::Teardown, Step::Pull] {
        fsm.begin(step).unwrap();
        fsm.finish(&policy.classify(step, ok())).unwrap();
    }

    fsm.begin(Step::BringUp).unwrap();
    let outcome = policy.classify(Step::BringUp, Ok(exited(3, "", "port in use\n")));
    let StepOutcome::Fatal { error, result } = &outcome else {
        panic!("expected fatal outcome");
    };
    assert_eq!(error.to_string(), "Deploy failed with code 3: port in use");
    assert_eq!(result.as_ref().map(|r| r.exit_code), Some(3));

    fsm.finish(&outcome).unwrap();
    assert_eq!(fsm.state(), &DeploymentState::Failed);
    assert_eq!(fsm.next_step(), None);
}

#[test]
fn test_pull_tolerance_follows_policy() {
    assert_eq!(
        StepPolicy::new(PullPolicy::Permissive).tolerance(Step::Pull),
        Tolerance::BestEffort
    );
    assert_eq!(
        StepPolicy::new(PullPolicy::Strict).tolerance(Step::Pull),
        Tolerance::Fatal
    );
    assert_eq!(StepPolicy::default().tolerance(Step::Status), Tolerance::Degrade);
}
