use crate::analysis::report::{ChainPair, ChainUnit};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;
use std::collections::HashMap;

// ============================================================================
// INTERACTION GRAPH
// ============================================================================

/// Chains as nodes, contacting chain pairs as edges weighted by atom count.
/// Used to list which chains form one connected assembly interface.
pub struct InteractionNetwork {
    pub graph: UnGraph<ChainUnit, usize>,
}

impl InteractionNetwork {
    pub fn from_pairs(pairs: &[ChainPair]) -> Self {
        let mut graph = UnGraph::<ChainUnit, usize>::with_capacity(pairs.len() * 2, pairs.len());
        let mut nodes: HashMap<ChainUnit, NodeIndex> = HashMap::new();

        let mut node_of = |graph: &mut UnGraph<ChainUnit, usize>, unit: &ChainUnit| {
            *nodes
                .entry(unit.clone())
                .or_insert_with(|| graph.add_node(unit.clone()))
        };

        for pair in pairs {
            let a = node_of(&mut graph, &pair.first);
            let b = node_of(&mut graph, &pair.second);
            graph.add_edge(a, b, pair.atoms);
        }
        Self { graph }
    }

    /// Connected groups of chains, each sorted, largest group first.
    pub fn clusters(&self) -> Vec<Vec<ChainUnit>> {
        let mut visited = vec![false; self.graph.node_count()];
        let mut clusters = Vec::new();

        for start in self.graph.node_indices() {
            if visited[start.index()] {
                continue;
            }
            let mut members = Vec::new();
            let mut bfs = Bfs::new(&self.graph, start);
            while let Some(nx) = bfs.next(&self.graph) {
                if !visited[nx.index()] {
                    visited[nx.index()] = true;
                    members.push(self.graph[nx].clone());
                }
            }
            members.sort();
            clusters.push(members);
        }

        clusters.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        clusters
    }

    /// Total contact atoms between `unit` and all its partners.
    pub fn contact_load(&self, unit: &ChainUnit) -> usize {
        self.graph
            .node_indices()
            .find(|&n| &self.graph[n] == unit)
            .map(|n| self.graph.edges(n).map(|e| *e.weight()).sum())
            .unwrap_or(0)
    }
}
