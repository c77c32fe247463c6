//! What-if document model and resource identifier parsing.

pub mod resource_id;
mod whatif;

pub use resource_id::{ResourceDescriptor, ResourceGroupRef, ResourceScope};
pub use whatif::{
    Change, ChangeType, DeltaKind, OperationResult, PropertyChange, PropertyChangeType,
};
