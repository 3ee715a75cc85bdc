//! Typed connection points.
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::value::{Literal, TokenKind};

/// Identifier of a node within its graph.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a port within its node. Stable across dynamic port edits.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortId(pub u32);

/// Fully qualified port address.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortRef {
    pub node: NodeId,
    pub port: PortId,
}

impl PortRef {
    pub fn new(node: NodeId, port: PortId) -> Self {
        Self { node, port }
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node, self.port.0)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
}

/// Type tag of a port. Connections require an exact match.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortType {
    Value,
    Token(TokenKind),
    ValueGrid,
    TokenGrid(TokenKind),
}

impl PortType {
    pub fn is_grid(self) -> bool {
        matches!(self, PortType::ValueGrid | PortType::TokenGrid(_))
    }

    /// Grid counterpart of this type; grids map to themselves.
    pub fn as_grid(self) -> PortType {
        match self {
            PortType::Value | PortType::ValueGrid => PortType::ValueGrid,
            PortType::Token(k) | PortType::TokenGrid(k) => PortType::TokenGrid(k),
        }
    }

    /// Literal a fresh input port of this type falls back to.
    pub fn default_literal(self) -> Literal {
        match self {
            PortType::Value | PortType::ValueGrid => Literal::Number(0.0),
            PortType::Token(_) | PortType::TokenGrid(_) => Literal::Token(None),
        }
    }

    /// Whether `literal` can stand in for a connection of this type.
    pub fn accepts(self, literal: &Literal) -> bool {
        matches!(
            (self, literal),
            (PortType::Value | PortType::ValueGrid, Literal::Number(_))
                | (PortType::Token(_) | PortType::TokenGrid(_), Literal::Token(_))
        )
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortType::Value => f.write_str("Value"),
            PortType::ValueGrid => f.write_str("ValueGrid"),
            PortType::Token(k) => write!(f, "Token<{k}>"),
            PortType::TokenGrid(k) => write!(f, "TokenGrid<{k}>"),
        }
    }
}

/// A port instance on a node.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Port {
    pub id: PortId,
    pub name: String,
    pub ty: PortType,
    pub direction: Direction,
    /// A disconnected required input fails compilation.
    pub required: bool,
    /// Member of the node's dynamic-arity list.
    pub dynamic: bool,
    /// Fallback for a disconnected optional input.
    pub literal: Option<Literal>,
}

/// Static declaration of a port, as reported by a node kind's layout.
#[derive(Clone, Debug, PartialEq)]
pub struct PortDecl {
    pub name: &'static str,
    pub ty: PortType,
    pub required: bool,
    pub literal: Option<Literal>,
}

impl PortDecl {
    pub fn output(name: &'static str, ty: PortType) -> Self {
        Self {
            name,
            ty,
            required: false,
            literal: None,
        }
    }

    /// Optional input falling back to `literal` when disconnected.
    pub fn optional(name: &'static str, ty: PortType, literal: Literal) -> Self {
        Self {
            name,
            ty,
            required: false,
            literal: Some(literal),
        }
    }

    pub fn required(name: &'static str, ty: PortType) -> Self {
        Self {
            name,
            ty,
            required: true,
            literal: None,
        }
    }
}

/// Declaration of a node's dynamic-arity input list.
#[derive(Clone, Debug, PartialEq)]
pub struct DynamicDecl {
    pub prefix: &'static str,
    pub ty: PortType,
    pub min: usize,
}
