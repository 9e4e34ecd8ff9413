use serde::{Deserialize, Serialize};

/// One step of a location path: a local element name and which occurrence
/// of it (1-based) is meant within the enclosing element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSegment {
    pub element_name: String,
    pub occurrence_index: usize,
}

impl LocationSegment {
    pub fn new(element_name: impl Into<String>, occurrence_index: usize) -> Self {
        Self {
            element_name: element_name.into(),
            occurrence_index: occurrence_index.max(1),
        }
    }

    /// A segment with the default occurrence index of 1.
    pub fn first(element_name: impl Into<String>) -> Self {
        Self::new(element_name, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occurrence_index_is_at_least_one() {
        assert_eq!(LocationSegment::new("Name", 0).occurrence_index, 1);
        assert_eq!(LocationSegment::first("Name").occurrence_index, 1);
        assert_eq!(LocationSegment::new("Name", 3).occurrence_index, 3);
    }
}
