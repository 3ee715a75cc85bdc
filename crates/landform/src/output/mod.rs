//! Consumption of a finished graph by the host.
//!
//! [`GraphOutputs::collect`] gathers the compiled result of every output node by
//! channel. Channels without a calculated output node are simply missing, so the host
//! keeps its own defaults for them.
use std::collections::BTreeMap;

use tracing::warn;

use crate::error::Result;
use crate::graph::{Graph, NodeKind, OutputChannel};
use crate::value::{PortValue, Token, TokenGrid, ValueGrid};

pub mod map;
pub mod raster;

pub use map::{MapGrid, DEFAULT_FULL_SIZE};
pub use raster::Raster;

/// Compiled grids of a graph, keyed by output channel.
#[derive(Clone, Debug, Default)]
pub struct GraphOutputs {
    channels: BTreeMap<OutputChannel, PortValue>,
}

impl GraphOutputs {
    pub fn collect(graph: &Graph) -> Self {
        let mut channels = BTreeMap::new();
        for node in graph.nodes() {
            let NodeKind::Output { channel } = node.kind() else {
                continue;
            };
            let Some(result) = node.result().filter(|_| node.is_calculated()) else {
                continue;
            };
            if channels.insert(*channel, result.clone()).is_some() {
                warn!(
                    "Several output nodes feed channel {:?}; using node {}.",
                    channel,
                    node.id()
                );
            }
        }
        Self { channels }
    }

    pub fn get(&self, channel: OutputChannel) -> Option<&PortValue> {
        self.channels.get(&channel)
    }

    pub fn value_grid(&self, channel: OutputChannel) -> Option<&ValueGrid> {
        self.get(channel)?.as_value_grid()
    }

    pub fn token_grid(&self, channel: OutputChannel) -> Option<&TokenGrid> {
        self.get(channel)?.as_token_grid()
    }

    pub fn channels(&self) -> impl Iterator<Item = OutputChannel> + '_ {
        self.channels.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Bakes a numeric channel over `map`.
    pub fn bake_values(&self, channel: OutputChannel, map: &MapGrid) -> Result<Option<Raster<f32>>> {
        map.validate()?;
        Ok(self
            .value_grid(channel)
            .map(|grid| Raster::bake(map.clone(), &**grid)))
    }

    /// Bakes a token channel over `map`.
    pub fn bake_tokens(
        &self,
        channel: OutputChannel,
        map: &MapGrid,
    ) -> Result<Option<Raster<Option<Token>>>> {
        map.validate()?;
        Ok(self
            .token_grid(channel)
            .map(|grid| Raster::bake(map.clone(), &**grid)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::graph::NodeKind;
    use crate::value::{Literal, TokenKind};

    #[test]
    fn collects_calculated_outputs_only() {
        let mut g = Graph::new(0);
        let value = g.add_node(NodeKind::constant(2.0));
        let lift = g.add_node(NodeKind::GridFromValue);
        let elevation = g.add_node(NodeKind::output(OutputChannel::Elevation));
        g.add_node(NodeKind::output(OutputChannel::Fertility));
        g.connect_named(value, "value", lift, "value").unwrap();
        g.connect_named(lift, "grid", elevation, "input").unwrap();
        Engine::default().traverse_all(&mut g);

        let outputs = GraphOutputs::collect(&g);
        assert_eq!(outputs.channels().collect::<Vec<_>>(), [OutputChannel::Elevation]);
        let raster = outputs
            .bake_values(OutputChannel::Elevation, &MapGrid::new(3, 3))
            .unwrap()
            .unwrap();
        assert!(raster.data.iter().all(|v| *v == 2.0));
        assert!(outputs
            .bake_values(OutputChannel::Fertility, &MapGrid::new(3, 3))
            .unwrap()
            .is_none());
    }

    #[test]
    fn token_channels_bake_tokens() {
        let mut g = Graph::new(0);
        let select = g.add_node(NodeKind::select(
            crate::graph::PortType::ValueGrid,
            crate::graph::PortType::Token(TokenKind::Roof),
            vec![0.5],
        ));
        let port = g.port_named(select, "option0").unwrap();
        g.set_literal(port, Literal::Token(Some(Token::new("Rock"))))
            .unwrap();
        let roof = g.add_node(NodeKind::output(OutputChannel::Roof));
        g.connect_named(select, "result", roof, "input").unwrap();
        Engine::default().traverse_all(&mut g);

        let outputs = GraphOutputs::collect(&g);
        let raster = outputs
            .bake_tokens(OutputChannel::Roof, &MapGrid::new(2, 2))
            .unwrap()
            .unwrap();
        assert!(raster.data.iter().all(|t| *t == Some(Token::new("Rock"))));
        assert!(outputs.bake_tokens(OutputChannel::Roof, &MapGrid::new(0, 2)).is_err());
    }
}
