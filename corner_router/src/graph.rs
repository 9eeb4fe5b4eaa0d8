// Waypoint graph: the anchor-centered navigation graph the search runs over.
//
// Nodes are world positions that passed a clearance probe, identified by
// dense `NodeId`s assigned in insertion order. Edges are undirected and
// stored as symmetric adjacency lists of node indices (`SmallVec`, since
// most nodes stay under eight neighbors). An edge is only inserted when
// neither endpoint is at the degree limit, and never twice.
//
// The graph is disposable: `GraphBuilder` produces a fresh one on every
// rebuild and the router swaps it in whole. Nothing outside this module keeps
// a `NodeId` across a rebuild.
//
// See also: `builder.rs` which fills it, `links.rs` and `search.rs` which
// read it.
//
// **Critical constraint: determinism.** Node ids and adjacency order follow
// insertion order only. No hashing.

use crate::types::{NodeId, Vec3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub type Adjacency = SmallVec<[u32; 8]>;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WaypointGraph {
    nodes: Vec<Vec3>,
    adjacency: Vec<Adjacency>,
    /// Where the graph was centered when built.
    pub anchor: Vec3,
}

impl WaypointGraph {
    pub fn new(anchor: Vec3) -> Self {
        Self {
            nodes: Vec::new(),
            adjacency: Vec::new(),
            anchor,
        }
    }

    pub fn add_node(&mut self, position: Vec3) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(position);
        self.adjacency.push(Adjacency::new());
        id
    }

    /// Insert the undirected edge `a`-`b` if it is new, not a self loop, and
    /// both endpoints have fewer than `degree_limit` neighbors. Returns whether
    /// the edge was added.
    pub fn try_add_edge(&mut self, a: NodeId, b: NodeId, degree_limit: usize) -> bool {
        if a == b || !self.can_link(a, b, degree_limit) {
            return false;
        }
        self.adjacency[a.index()].push(b.0);
        self.adjacency[b.index()].push(a.0);
        true
    }

    /// Whether `try_add_edge(a, b, ..)` would succeed. Lets builders skip the
    /// visibility test for edges that could not be inserted anyway.
    pub fn can_link(&self, a: NodeId, b: NodeId, degree_limit: usize) -> bool {
        let (Some(adj_a), Some(adj_b)) = (self.adjacency.get(a.index()), self.adjacency.get(b.index()))
        else {
            return false;
        };
        adj_a.len() < degree_limit && adj_b.len() < degree_limit && !adj_a.contains(&b.0)
    }

    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.adjacency
            .get(a.index())
            .is_some_and(|adj| adj.contains(&b.0))
    }

    pub fn position(&self, node: NodeId) -> Vec3 {
        self.nodes[node.index()]
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.nodes
    }

    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency[node.index()].iter().map(|&n| NodeId(n))
    }

    pub fn degree(&self, node: NodeId) -> usize {
        self.adjacency[node.index()].len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(|adj| adj.len()).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids in insertion order. Does not borrow the graph, so edges can be
    /// added while iterating.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + use<> {
        (0..self.nodes.len() as u32).map(NodeId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> WaypointGraph {
        let mut g = WaypointGraph::new(Vec3::ZERO);
        for i in 0..n {
            g.add_node(Vec3::new(i as f32, 0.0, 0.0));
        }
        g
    }

    #[test]
    fn edges_are_symmetric() {
        let mut g = line(3);
        assert!(g.try_add_edge(NodeId(0), NodeId(1), 8));
        assert!(g.has_edge(NodeId(0), NodeId(1)));
        assert!(g.has_edge(NodeId(1), NodeId(0)));
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn duplicate_and_self_edges_rejected() {
        let mut g = line(2);
        assert!(g.try_add_edge(NodeId(0), NodeId(1), 8));
        assert!(!g.try_add_edge(NodeId(1), NodeId(0), 8));
        assert!(!g.try_add_edge(NodeId(1), NodeId(1), 8));
        assert_eq!(g.degree(NodeId(0)), 1);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn degree_limit_is_enforced_on_both_endpoints() {
        let mut g = line(5);
        assert!(g.try_add_edge(NodeId(0), NodeId(1), 2));
        assert!(g.try_add_edge(NodeId(0), NodeId(2), 2));
        // Node 0 is full.
        assert!(!g.try_add_edge(NodeId(0), NodeId(3), 2));
        assert!(!g.try_add_edge(NodeId(3), NodeId(0), 2));
        assert!(g.try_add_edge(NodeId(3), NodeId(4), 2));
        for id in g.node_ids() {
            assert!(g.degree(id) <= 2);
        }
    }

    #[test]
    fn unknown_nodes_cannot_link() {
        let mut g = line(2);
        assert!(!g.try_add_edge(NodeId(0), NodeId(9), 8));
        assert!(!g.has_edge(NodeId(9), NodeId(0)));
    }

    #[test]
    fn neighbors_follow_insertion_order() {
        let mut g = line(4);
        g.try_add_edge(NodeId(0), NodeId(3), 8);
        g.try_add_edge(NodeId(0), NodeId(1), 8);
        g.try_add_edge(NodeId(0), NodeId(2), 8);
        let order: Vec<_> = g.neighbors(NodeId(0)).collect();
        assert_eq!(order, vec![NodeId(3), NodeId(1), NodeId(2)]);
    }

    #[test]
    fn edges_can_be_added_while_walking_node_ids() {
        let mut g = line(4);
        for a in g.node_ids() {
            let b = NodeId((a.0 + 1) % 4);
            g.try_add_edge(a, b, 8);
        }
        assert_eq!(g.edge_count(), 4);
        assert!(g.has_edge(NodeId(3), NodeId(0)));
    }
}
