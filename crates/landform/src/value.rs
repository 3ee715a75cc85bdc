//! Values flowing through the graph: opaque host tokens, node-local literals and the
//! compiled port values that downstream compile steps consume.
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::grid::{Const as ConstGrid, GridFunction};
use crate::supplier::{Const as ConstSupplier, Supplier};

/// Opaque identifier of a host catalog entry (a terrain material, a biome, a roof).
///
/// The engine never interprets tokens; it only routes and selects them.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(Arc<str>);

impl Token {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", self.0)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Token::new(value)
    }
}

/// Host catalog a [`Token`] belongs to.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Terrain,
    Biome,
    Roof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenKind::Terrain => "terrain",
            TokenKind::Biome => "biome",
            TokenKind::Roof => "roof",
        })
    }
}

/// Scalar supplier as produced by a `Value` output port.
pub type ValueSupplier = Arc<dyn Supplier<f32>>;
/// Token supplier; `None` means "no contribution".
pub type TokenSupplier = Arc<dyn Supplier<Option<Token>>>;
/// Numeric grid function.
pub type ValueGrid = Arc<dyn GridFunction<f32>>;
/// Token grid function; `None` cells leave the host default in place.
pub type TokenGrid = Arc<dyn GridFunction<Option<Token>>>;

/// Node-local fallback used when an input port is not connected.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Number(f32),
    Token(Option<Token>),
}

impl Literal {
    pub fn as_number(&self) -> f32 {
        match self {
            Literal::Number(v) => *v,
            Literal::Token(_) => 0.0,
        }
    }

    pub fn as_token(&self) -> Option<Token> {
        match self {
            Literal::Token(t) => t.clone(),
            Literal::Number(_) => None,
        }
    }
}

/// Compiled value owned by an output port.
#[derive(Clone)]
pub enum PortValue {
    Value(ValueSupplier),
    Token(TokenSupplier),
    ValueGrid(ValueGrid),
    TokenGrid(TokenGrid),
}

impl PortValue {
    pub fn constant(value: f32) -> Self {
        PortValue::Value(Arc::new(ConstSupplier(value)))
    }

    pub fn constant_grid(value: f32) -> Self {
        PortValue::ValueGrid(Arc::new(ConstGrid(value)))
    }

    pub fn as_value(&self) -> Option<&ValueSupplier> {
        match self {
            PortValue::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_token(&self) -> Option<&TokenSupplier> {
        match self {
            PortValue::Token(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_value_grid(&self) -> Option<&ValueGrid> {
        match self {
            PortValue::ValueGrid(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_token_grid(&self) -> Option<&TokenGrid> {
        match self {
            PortValue::TokenGrid(v) => Some(v),
            _ => None,
        }
    }

    fn shape(&self) -> &'static str {
        match self {
            PortValue::Value(_) => "Value",
            PortValue::Token(_) => "Token",
            PortValue::ValueGrid(_) => "ValueGrid",
            PortValue::TokenGrid(_) => "TokenGrid",
        }
    }
}

impl fmt::Debug for PortValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PortValue::{}", self.shape())
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;

    #[test]
    fn token_compares_by_name() {
        assert_eq!(Token::new("Soil"), Token::from("Soil"));
        assert_ne!(Token::new("Soil"), Token::new("Sand"));
        assert_eq!(Token::new("Gravel").to_string(), "Gravel");
    }

    #[test]
    fn literal_accessors_fall_back() {
        assert_eq!(Literal::Number(2.5).as_number(), 2.5);
        assert_eq!(Literal::Token(Some("Mud".into())).as_number(), 0.0);
        assert_eq!(Literal::Number(1.0).as_token(), None);
    }

    #[test]
    fn constant_port_values_expose_their_shape() {
        let v = PortValue::constant(3.0);
        assert_eq!(v.as_value().map(|s| s.get()), Some(3.0));
        assert!(v.as_value_grid().is_none());

        let g = PortValue::constant_grid(1.5);
        let grid = g.as_value_grid().expect("grid");
        assert_eq!(grid.value_at(Vec2::new(12.0, -4.0)), 1.5);
        assert_eq!(format!("{g:?}"), "PortValue::ValueGrid");
    }
}
