use std::sync::Arc;

use crate::error::Result;
use crate::graph::{RandomValueParams, TokenToValueParams};
use crate::nodes::{Inputs, Shape};
use crate::supplier::{Cached, MapValue, RandomRange};
use crate::value::{PortValue, Token};

/// Seeded draw, held for the whole pass so every consumer sees one value.
pub(crate) fn random(params: &RandomValueParams, seed: i32) -> PortValue {
    let draw = Arc::new(RandomRange::new(params.min, params.max, seed));
    PortValue::Value(Arc::new(Cached::new(draw)))
}

pub(crate) fn token_to_value(inputs: &Inputs<'_>, params: &TokenToValueParams) -> Result<PortValue> {
    let port = inputs.named("token")?;
    let token = <Option<Token>>::input_supplier(inputs.resolve(port));
    let entries = params.entries.clone();
    let fallback = params.fallback;
    let lookup = MapValue::new(token, move |t: Option<Token>| {
        t.and_then(|t| entries.iter().find(|(k, _)| *k == t).map(|(_, v)| *v))
            .unwrap_or(fallback)
    });
    Ok(PortValue::Value(Arc::new(lookup)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::WorldTileInfo;
    use crate::graph::{Graph, NodeKind};
    use crate::nodes::{compile, CompileContext};
    use crate::value::TokenKind;

    fn lookup_graph(token: Option<&str>) -> (Graph, crate::graph::NodeId) {
        let mut g = Graph::new(0);
        let lookup = g.add_node(NodeKind::TokenToValue {
            params: TokenToValueParams {
                kind: TokenKind::Biome,
                entries: vec![(Token::new("Desert"), 0.1), (Token::new("Tundra"), 0.8)],
                fallback: 0.5,
            },
        });
        if let Some(name) = token {
            let t = g.add_node(NodeKind::token(TokenKind::Biome, name));
            g.connect_named(t, "token", lookup, "token").unwrap();
            let tile = WorldTileInfo::default();
            let ctx = CompileContext {
                tile: &tile,
                graph_seed: 0,
            };
            let compiled = compile(&g, g.node(t).unwrap(), &ctx).unwrap();
            g.node_mut(t).unwrap().values = compiled.outputs;
        }
        (g, lookup)
    }

    fn evaluate(token: Option<&str>) -> f32 {
        let (g, lookup) = lookup_graph(token);
        let tile = WorldTileInfo::default();
        let ctx = CompileContext {
            tile: &tile,
            graph_seed: 0,
        };
        let compiled = compile(&g, g.node(lookup).unwrap(), &ctx).unwrap();
        compiled.outputs[0].as_ref().unwrap().as_value().unwrap().get()
    }

    #[test]
    fn token_lookup_and_fallback() {
        assert_eq!(evaluate(Some("Tundra")), 0.8);
        assert_eq!(evaluate(Some("Jungle")), 0.5);
        assert_eq!(evaluate(None), 0.5);
    }

    #[test]
    fn random_value_is_stable_within_a_pass() {
        let params = RandomValueParams { min: 2.0, max: 4.0 };
        let v = random(&params, 99);
        let s = v.as_value().unwrap();
        let first = s.get();
        assert!((2.0..=4.0).contains(&first));
        assert_eq!(s.get(), first);
        s.reset_state();
        assert_eq!(s.get(), first);
    }
}
