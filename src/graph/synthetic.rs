use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value};

use super::model::{Edge, NodeKind, NodeRecord, SocialGraph};

pub const SYNTHETIC_NODE_COUNT: usize = 20;
pub const SYNTHETIC_EDGE_PROBABILITY: f64 = 0.2;

const USER_NAMES: [&str; 10] = [
    "Alice", "Boris", "Clara", "Dmitri", "Elena", "Farid", "Greta", "Henrik", "Irina", "Jonas",
];
const GROUP_NAMES: [&str; 6] = [
    "Chess Club",
    "Hiking Crew",
    "Film Society",
    "Book Circle",
    "Runners",
    "Makers",
];
const CITIES: [&str; 6] = ["Riga", "Tartu", "Vilnius", "Kaunas", "Helsinki", "Oslo"];

/// Offline sample data: 20 nodes of mixed kind, every unordered pair wired
/// with probability 0.2. Deterministic per seed so a layout can be
/// reproduced from the controls panel.
pub fn synthetic_graph(seed: u64) -> SocialGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = SocialGraph::default();

    for index in 0..SYNTHETIC_NODE_COUNT {
        let id = format!("synthetic-{index}");
        let kind = if rng.gen_bool(0.7) {
            NodeKind::User
        } else {
            NodeKind::Group
        };

        let mut attributes = Map::new();
        let name = match kind {
            NodeKind::User => {
                let name = USER_NAMES[index % USER_NAMES.len()].to_string();
                attributes.insert("login".into(), Value::from(format!("user{index:02}")));
                attributes.insert(
                    "city".into(),
                    Value::from(CITIES[rng.gen_range(0..CITIES.len())]),
                );
                attributes.insert(
                    "sex".into(),
                    Value::from(if rng.gen_bool(0.5) { "f" } else { "m" }),
                );
                attributes.insert("followers".into(), Value::from(rng.gen_range(0..5000u64)));
                attributes.insert("subscriptions".into(), Value::from(rng.gen_range(0..400u64)));
                name
            }
            NodeKind::Group => {
                let name = GROUP_NAMES[index % GROUP_NAMES.len()].to_string();
                attributes.insert("login".into(), Value::from(format!("group{index:02}")));
                name
            }
        };
        attributes.insert("name".into(), Value::from(name.clone()));

        graph.index_by_id.insert(id.clone(), index);
        graph.nodes.push(NodeRecord {
            id,
            name,
            kind,
            attributes,
        });
    }

    for source in 0..SYNTHETIC_NODE_COUNT {
        for target in (source + 1)..SYNTHETIC_NODE_COUNT {
            if !rng.gen_bool(SYNTHETIC_EDGE_PROBABILITY) {
                continue;
            }

            let kind = match graph.nodes[target].kind {
                NodeKind::Group => "member_of",
                NodeKind::User => "follows",
            };
            graph.edges.push(Edge {
                source,
                target,
                kind: kind.to_string(),
            });
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_fixed_node_count() {
        let graph = synthetic_graph(7);
        assert_eq!(graph.node_count(), SYNTHETIC_NODE_COUNT);
        assert_eq!(graph.index_by_id.len(), SYNTHETIC_NODE_COUNT);
    }

    #[test]
    fn is_deterministic_per_seed() {
        let first = synthetic_graph(11);
        let second = synthetic_graph(11);

        assert_eq!(first.edge_count(), second.edge_count());
        for (a, b) in first.nodes.iter().zip(second.nodes.iter()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.kind, b.kind);
        }
    }

    // Expectation is 0.2 * C(20, 2) = 38 edges; averaging over many seeds
    // keeps the band wide enough to never flake.
    #[test]
    fn edge_count_matches_probability_statistically() {
        let total: usize = (0..64).map(|seed| synthetic_graph(seed).edge_count()).sum();
        let mean = total as f64 / 64.0;
        assert!((30.0..=46.0).contains(&mean), "mean edge count {mean} out of band");
    }

    #[test]
    fn users_carry_inspectable_attributes() {
        let graph = synthetic_graph(3);
        let user = graph
            .nodes
            .iter()
            .find(|node| node.kind == NodeKind::User)
            .expect("at least one user");

        for key in ["login", "city", "sex", "followers", "subscriptions"] {
            assert!(user.attributes.contains_key(key), "missing {key}");
        }
    }

    #[test]
    fn edges_reference_valid_nodes() {
        let graph = synthetic_graph(5);
        for edge in &graph.edges {
            assert!(edge.source < graph.node_count());
            assert!(edge.target < graph.node_count());
            assert_ne!(edge.source, edge.target);
        }
    }
}
