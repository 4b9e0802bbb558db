use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;

use super::error::{NetworkError, NetworkResult};
use super::topology::Topology;

/// Fully observed cases, stored as one boolean column per node name.
///
/// Element `i` of every column describes the same incident. Columns are only
/// checked against a topology when the dataset is aligned for learning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    columns: BTreeMap<String, Vec<bool>>,
}

impl Dataset {
    pub fn new() -> Self {
        Dataset::default()
    }

    pub fn with_column(mut self, name: &str, values: Vec<bool>) -> Self {
        self.insert(name, values);
        self
    }

    pub fn insert(&mut self, name: &str, values: Vec<bool>) {
        self.columns.insert(name.to_string(), values);
    }

    pub fn column(&self, name: &str) -> Option<&[bool]> {
        self.columns.get(name).map(|values| values.as_slice())
    }

    /// Appends the cases of `other` after the cases of this dataset.
    pub fn concat(&self, other: &Dataset) -> Dataset {
        let mut columns = self.columns.clone();
        for (name, values) in &other.columns {
            columns
                .entry(name.clone())
                .or_default()
                .extend(values.iter().copied());
        }
        Dataset { columns }
    }

    /// Reads a JSON object mapping node names to boolean arrays.
    pub fn load_from_file(
        path: &str,
    ) -> Result<Dataset, Box<dyn std::error::Error + Send + Sync>> {
        let json = fs::read_to_string(path)?;
        let dataset: Dataset = serde_json::from_str(&json)?;
        Ok(dataset)
    }

    /// Orders the columns by node id and checks that they all have the same
    /// non-zero length.
    pub fn aligned<'a>(&'a self, topology: &Topology) -> NetworkResult<Vec<&'a [bool]>> {
        for name in self.columns.keys() {
            if topology.id_of(name).is_none() {
                return Err(NetworkError::ShapeMismatch(format!(
                    "dataset column '{}' is not a node of the network",
                    name
                )));
            }
        }

        let mut aligned = Vec::with_capacity(topology.len());
        for node in topology.nodes() {
            let column = self.column(&node.name).ok_or_else(|| {
                NetworkError::ShapeMismatch(format!("dataset has no column for '{}'", node.name))
            })?;
            aligned.push(column);
        }

        let case_count = aligned.first().map(|column| column.len()).unwrap_or(0);
        if case_count == 0 {
            return Err(NetworkError::ShapeMismatch(
                "dataset contains no cases".to_string(),
            ));
        }
        for (id, column) in aligned.iter().enumerate() {
            if column.len() != case_count {
                return Err(NetworkError::ShapeMismatch(format!(
                    "column '{}' has {} cases, expected {}",
                    topology.name(id),
                    column.len(),
                    case_count
                )));
            }
        }
        Ok(aligned)
    }

    /// Number of cases, once the dataset is known to be aligned with `topology`.
    pub fn case_count(&self, topology: &Topology) -> NetworkResult<usize> {
        Ok(self.aligned(topology)?[0].len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_node_topology() -> Topology {
        Topology::new(vec![("A", vec![]), ("B", vec!["A"])]).unwrap()
    }

    #[test]
    fn test_aligned_orders_by_node() {
        let topology = two_node_topology();
        let dataset = Dataset::new()
            .with_column("B", vec![true, false])
            .with_column("A", vec![false, false]);
        let aligned = dataset.aligned(&topology).unwrap();
        assert_eq!(aligned[0], &[false, false]);
        assert_eq!(aligned[1], &[true, false]);
        assert_eq!(dataset.case_count(&topology).unwrap(), 2);
    }

    #[test]
    fn test_shape_errors() {
        let topology = two_node_topology();

        let missing = Dataset::new().with_column("A", vec![true]);
        assert!(matches!(missing.aligned(&topology), Err(NetworkError::ShapeMismatch(_))));

        let ragged = Dataset::new()
            .with_column("A", vec![true, false])
            .with_column("B", vec![true]);
        assert!(matches!(ragged.aligned(&topology), Err(NetworkError::ShapeMismatch(_))));

        let empty = Dataset::new().with_column("A", vec![]).with_column("B", vec![]);
        assert!(matches!(empty.aligned(&topology), Err(NetworkError::ShapeMismatch(_))));

        let extra = Dataset::new()
            .with_column("A", vec![true])
            .with_column("B", vec![true])
            .with_column("C", vec![true]);
        assert!(matches!(extra.aligned(&topology), Err(NetworkError::ShapeMismatch(_))));
    }

    #[test]
    fn test_json_shape() {
        let dataset: Dataset = serde_json::from_str(r#"{"A": [true, false], "B": [false, false]}"#).unwrap();
        assert_eq!(dataset.column("A"), Some(&[true, false][..]));

        let joined = dataset.concat(&dataset);
        assert_eq!(joined.column("B").unwrap().len(), 4);
    }
}
