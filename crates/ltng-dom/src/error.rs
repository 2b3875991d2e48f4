//! Mock DOM errors

use crate::node::NodeId;

/// Result alias for DOM operations.
pub type DomResult<T> = Result<T, DomError>;

/// Errors raised by tree mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
	/// The id does not belong to this document
	#[error("Unknown node: {0}")]
	UnknownNode(NodeId),

	/// Appending would create a cycle or attach a node under a leaf
	#[error("Hierarchy request error: cannot append {child} to {parent}")]
	Hierarchy { parent: NodeId, child: NodeId },

	/// The operation requires an element node
	#[error("Node {0} is not an element")]
	NotAnElement(NodeId),
}
