//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Edit-time
//! variants ([`Error::IncompatibleType`], [`Error::ArityViolation`], ...) are returned
//! synchronously by graph edits. [`Error::CompileFailure`] and
//! [`Error::UnsatisfiableDependency`] are produced by the traversal engine and only ever
//! reported, never raised to the caller of a recalculation.
use thiserror::Error;

use crate::graph::{NodeId, PortRef, PortType};

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("incompatible type at port {port}: expected {expected}, found {found}")]
    IncompatibleType {
        port: PortRef,
        expected: PortType,
        found: PortType,
    },

    #[error("literal does not match the type of port {port}")]
    IncompatibleLiteral { port: PortRef },

    #[error("node {node} must keep at least {min} dynamic ports")]
    ArityViolation { node: NodeId, min: usize },

    #[error("node {node} failed to compile: {reason}")]
    CompileFailure { node: NodeId, reason: String },

    #[error("unsatisfiable dependencies for nodes {nodes:?}")]
    UnsatisfiableDependency { nodes: Vec<NodeId> },

    #[error("node {0} has no dynamic ports")]
    NotDynamic(NodeId),

    #[error("edit would change the port signature of node {0}")]
    SignatureChange(NodeId),

    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("unknown port {0}")]
    UnknownPort(PortRef),

    #[error("invalid connection {from} -> {to}: {reason}")]
    InvalidConnection {
        from: PortRef,
        to: PortRef,
        reason: String,
    },

    #[error("cannot remove the last {role} node of bound graph '{graph}'")]
    SingletonViolation { role: String, graph: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a node-local compile failure.
    pub fn compile(node: NodeId, reason: impl Into<String>) -> Self {
        Error::CompileFailure {
            node,
            reason: reason.into(),
        }
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
