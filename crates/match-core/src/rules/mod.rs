//! Pure decision rules
//!
//! Nothing in here touches storage. The service layer reads state, asks these
//! modules what is allowed, and then persists the result.

pub mod gate;
pub mod transition;

pub use gate::{GateDenial, History, IcebreakerGate, MessageGate};
pub use transition::{Compensation, Transition};
