//! # Network Topology
//!
//! Undirected graph of sensors and gateways. Paths are computed for logging
//! only; delivery itself is direct.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

/// Undirected graph keyed by node name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkTopology {
    adjacency: BTreeMap<String, BTreeSet<String>>,
}

impl NetworkTopology {
    pub fn new() -> Self {
        Self::default()
    }

    /// A hub with every leaf attached directly to it.
    pub fn star<I, S>(hub: &str, leaves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut topology = Self::new();
        topology.add_node(hub);
        for leaf in leaves {
            topology.add_edge(leaf.as_ref(), hub);
        }
        topology
    }

    pub fn add_node(&mut self, node: &str) {
        self.adjacency.entry(node.to_string()).or_default();
    }

    /// Link two nodes, adding either if missing.
    pub fn add_edge(&mut self, a: &str, b: &str) {
        self.adjacency
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string());
        self.adjacency
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string());
    }

    pub fn contains(&self, node: &str) -> bool {
        self.adjacency.contains_key(node)
    }

    /// Neighbours in name order.
    pub fn neighbors(&self, node: &str) -> impl Iterator<Item = &str> {
        self.adjacency
            .get(node)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum::<usize>() / 2
    }
}

/// Shortest-path queries over a `NetworkTopology`.
pub struct Router;

impl Router {
    /// Fewest-hop path from `source` to `dest`, both ends included.
    ///
    /// Breadth-first; neighbours are visited in name order, so the result is
    /// deterministic. `None` if either node is missing or unreachable.
    pub fn shortest_path(topology: &NetworkTopology, source: &str, dest: &str) -> Option<Vec<String>> {
        if !topology.contains(source) || !topology.contains(dest) {
            return None;
        }
        if source == dest {
            return Some(vec![source.to_string()]);
        }

        let mut parent: HashMap<&str, &str> = HashMap::new();
        let mut queue = VecDeque::from([source]);
        parent.insert(source, source);

        while let Some(node) = queue.pop_front() {
            for next in topology.neighbors(node) {
                if parent.contains_key(next) {
                    continue;
                }
                parent.insert(next, node);
                if next == dest {
                    let mut path = vec![dest.to_string()];
                    let mut cursor = dest;
                    while cursor != source {
                        cursor = parent[cursor];
                        path.push(cursor.to_string());
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(next);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_paths_are_direct() {
        let topology = NetworkTopology::star("gateway_1", ["soil_01", "soil_02"]);
        assert_eq!(topology.node_count(), 3);
        assert_eq!(topology.edge_count(), 2);
        assert_eq!(
            Router::shortest_path(&topology, "soil_01", "gateway_1"),
            Some(vec!["soil_01".to_string(), "gateway_1".to_string()])
        );
        assert_eq!(
            Router::shortest_path(&topology, "soil_01", "soil_02").map(|p| p.len()),
            Some(3)
        );
    }

    #[test]
    fn test_multi_hop_prefers_fewest_hops() {
        let mut topology = NetworkTopology::new();
        topology.add_edge("a", "b");
        topology.add_edge("b", "c");
        topology.add_edge("c", "gw");
        topology.add_edge("a", "relay");
        topology.add_edge("relay", "gw");
        assert_eq!(
            Router::shortest_path(&topology, "a", "gw"),
            Some(vec!["a".into(), "relay".into(), "gw".into()])
        );
    }

    #[test]
    fn test_unreachable_and_unknown() {
        let mut topology = NetworkTopology::star("gateway_1", ["soil_01"]);
        topology.add_node("island");
        assert_eq!(Router::shortest_path(&topology, "island", "gateway_1"), None);
        assert_eq!(Router::shortest_path(&topology, "ghost", "gateway_1"), None);
        assert_eq!(
            Router::shortest_path(&topology, "soil_01", "soil_01"),
            Some(vec!["soil_01".to_string()])
        );
    }
}
