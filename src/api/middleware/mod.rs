//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Actor extraction: reject requests without an acting user
//! 2. Request logger: logs after the actor is known

pub mod actor;
pub mod audit;
