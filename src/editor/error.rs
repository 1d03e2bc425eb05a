//! Errors raised by graph mutations.

use thiserror::Error;

use super::types::NodeId;

/// A rejected graph mutation. The graph is left unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
	#[error("No se puede crear un enlace al mismo nodo ({id})")]
	SelfLoop { id: NodeId },

	#[error("Tipo de nodo desconocido: {kind:?}")]
	UnknownType { kind: String },

	#[error("El nodo {id} no existe")]
	UnknownNode { id: NodeId },
}

pub type GraphResult<T> = std::result::Result<T, GraphError>;
