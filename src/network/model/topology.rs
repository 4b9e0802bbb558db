use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::error::{NetworkError, NetworkResult};

/// Index of a node in the topology's declaration order.
pub type NodeId = usize;

/// Largest parent set a symptom may have.
pub const MAX_PARENTS: usize = 3;

/// Largest number of roots the exact query will enumerate over.
pub const MAX_ROOTS: usize = 16;

pub const FUSE: &str = "Fuse";
pub const DRUM: &str = "Drum";
pub const TONER: &str = "Toner";
pub const PAPER: &str = "Paper";
pub const ROLLER: &str = "Roller";
pub const BURNING: &str = "Burning";
pub const QUALITY: &str = "Quality";
pub const WRINKLED: &str = "Wrinkled";
pub const MULT_PAGES: &str = "MultPages";
pub const PAPER_JAM: &str = "PaperJam";

/// One binary variable and the ordered list of its parents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    pub parents: Vec<NodeId>,
}

impl NodeSpec {
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Number of CPT rows: one per parent assignment, one for a root.
    pub fn row_count(&self) -> usize {
        1 << self.parents.len()
    }
}

/// Two-level DAG of root causes and the symptoms they drive.
///
/// Immutable once built. Rows of a symptom's CPT are addressed by packing the
/// parent values big-endian in declared parent order with `true = 1`, so for
/// parents `[A, B]` row 2 is `A ∧ ¬B`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    nodes: Vec<NodeSpec>,
    index: HashMap<String, NodeId>,
    roots: Vec<NodeId>,
    symptoms: Vec<NodeId>,
}

impl Topology {
    /// Builds a topology from `(name, parent names)` pairs.
    pub fn new<S: AsRef<str>>(definitions: Vec<(S, Vec<S>)>) -> NetworkResult<Topology> {
        let mut index = HashMap::new();
        for (id, (name, _)) in definitions.iter().enumerate() {
            let name = name.as_ref();
            if name.is_empty() {
                return Err(NetworkError::InvalidTopology(format!(
                    "node {} has an empty name",
                    id
                )));
            }
            if index.insert(name.to_string(), id).is_some() {
                return Err(NetworkError::InvalidTopology(format!(
                    "node name '{}' is declared twice",
                    name
                )));
            }
        }

        let mut nodes = Vec::with_capacity(definitions.len());
        for (name, parent_names) in &definitions {
            let name = name.as_ref();
            if parent_names.len() > MAX_PARENTS {
                return Err(NetworkError::InvalidTopology(format!(
                    "'{}' has {} parents, at most {} are supported",
                    name,
                    parent_names.len(),
                    MAX_PARENTS
                )));
            }
            let mut parents = Vec::with_capacity(parent_names.len());
            let mut seen = HashSet::new();
            for parent in parent_names {
                let parent = parent.as_ref();
                let parent_id = *index.get(parent).ok_or_else(|| {
                    NetworkError::InvalidTopology(format!(
                        "'{}' names unknown parent '{}'",
                        name, parent
                    ))
                })?;
                if !seen.insert(parent_id) {
                    return Err(NetworkError::InvalidTopology(format!(
                        "'{}' lists parent '{}' more than once",
                        name, parent
                    )));
                }
                // a parent must itself be parentless
                if !definitions[parent_id].1.is_empty() {
                    return Err(NetworkError::InvalidTopology(format!(
                        "'{}' depends on '{}', which is not a root cause",
                        name, parent
                    )));
                }
                parents.push(parent_id);
            }
            nodes.push(NodeSpec {
                name: name.to_string(),
                parents,
            });
        }

        let roots: Vec<NodeId> = (0..nodes.len()).filter(|&id| nodes[id].is_root()).collect();
        let symptoms: Vec<NodeId> = (0..nodes.len()).filter(|&id| !nodes[id].is_root()).collect();
        if roots.is_empty() {
            return Err(NetworkError::InvalidTopology(
                "network has no root causes".to_string(),
            ));
        }
        if roots.len() > MAX_ROOTS {
            return Err(NetworkError::InvalidTopology(format!(
                "{} root causes exceed the enumeration limit of {}",
                roots.len(),
                MAX_ROOTS
            )));
        }

        Ok(Topology {
            nodes,
            index,
            roots,
            symptoms,
        })
    }

    /// The ten-node printer troubleshooting network.
    pub fn printer() -> Topology {
        let definitions = vec![
            (FUSE, vec![]),
            (DRUM, vec![]),
            (TONER, vec![]),
            (PAPER, vec![]),
            (ROLLER, vec![]),
            (BURNING, vec![FUSE]),
            (QUALITY, vec![DRUM, TONER, PAPER]),
            (WRINKLED, vec![FUSE, PAPER]),
            (MULT_PAGES, vec![PAPER, ROLLER]),
            (PAPER_JAM, vec![FUSE, ROLLER]),
        ];
        match Topology::new(definitions) {
            Ok(topology) => topology,
            Err(e) => unreachable!("printer topology is well formed: {}", e),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[NodeSpec] {
        &self.nodes
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id].name
    }

    pub fn id_of(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn symptoms(&self) -> &[NodeId] {
        &self.symptoms
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        self.nodes[id].is_root()
    }

    pub fn row_count(&self, id: NodeId) -> usize {
        self.nodes[id].row_count()
    }

    /// CPT row of `node` for the parent values reported by `value_of`.
    pub fn row_index<F>(&self, node: NodeId, value_of: F) -> usize
    where
        F: Fn(NodeId) -> bool,
    {
        self.nodes[node]
            .parents
            .iter()
            .fold(0, |row, &parent| (row << 1) | value_of(parent) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printer_layout() {
        let topology = Topology::printer();
        assert_eq!(topology.len(), 10);
        assert_eq!(topology.roots().len(), 5);
        assert_eq!(topology.symptoms().len(), 5);

        let quality = topology.id_of(QUALITY).unwrap();
        assert_eq!(topology.row_count(quality), 8);
        assert_eq!(topology.row_count(topology.id_of(BURNING).unwrap()), 2);
        assert_eq!(topology.row_count(topology.id_of(FUSE).unwrap()), 1);
        for &root in topology.roots() {
            assert!(topology.is_root(root));
        }
    }

    #[test]
    fn test_row_index_is_big_endian() {
        let topology = Topology::printer();
        let quality = topology.id_of(QUALITY).unwrap();
        let drum = topology.id_of(DRUM).unwrap();
        let toner = topology.id_of(TONER).unwrap();

        // Drum ∧ Toner ∧ ¬Paper -> 0b110
        let row = topology.row_index(quality, |id| id == drum || id == toner);
        assert_eq!(row, 6);
        assert_eq!(topology.row_index(quality, |_| false), 0);
        assert_eq!(topology.row_index(quality, |_| true), 7);

        let fuse = topology.id_of(FUSE).unwrap();
        assert_eq!(topology.row_index(fuse, |_| true), 0);
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let result = Topology::new(vec![("A", vec![]), ("A", vec![])]);
        assert!(matches!(result, Err(NetworkError::InvalidTopology(_))));
    }

    #[test]
    fn test_rejects_symptom_parent() {
        let result = Topology::new(vec![("A", vec![]), ("B", vec!["A"]), ("C", vec!["B"])]);
        assert!(matches!(result, Err(NetworkError::InvalidTopology(_))));
    }

    #[test]
    fn test_rejects_unknown_and_repeated_parents() {
        assert!(matches!(
            Topology::new(vec![("A", vec![]), ("B", vec!["Z"])]),
            Err(NetworkError::InvalidTopology(_))
        ));
        assert!(matches!(
            Topology::new(vec![("A", vec![]), ("B", vec!["A", "A"])]),
            Err(NetworkError::InvalidTopology(_))
        ));
    }

    #[test]
    fn test_rejects_too_many_parents_and_no_roots() {
        let wide = Topology::new(vec![
            ("A", vec![]),
            ("B", vec![]),
            ("C", vec![]),
            ("D", vec![]),
            ("E", vec!["A", "B", "C", "D"]),
        ]);
        assert!(matches!(wide, Err(NetworkError::InvalidTopology(_))));

        let empty: Vec<(&str, Vec<&str>)> = vec![];
        assert!(matches!(
            Topology::new(empty),
            Err(NetworkError::InvalidTopology(_))
        ));
    }
}
