//! Workflow pipelines orchestrating stateless services.

pub mod sign;

pub use sign::{parse_request, SignPhase, SignWorkflow, SignatureOutput, SigningOutcome};
