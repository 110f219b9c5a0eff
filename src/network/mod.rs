mod graph;
mod layout;

pub use graph::{NetworkGraph, NodeKey};
pub use layout::{Canvas, NodeRole};

pub type TransferEvent = crate::api::TransferRecord;
