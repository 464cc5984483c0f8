//! Command-line workflows, independent of argument parsing

pub mod orchestration;

pub use orchestration::{
    run_version_workflow, run_version_workflow_on, VersionWorkflowArgs, WorkflowResult,
};
