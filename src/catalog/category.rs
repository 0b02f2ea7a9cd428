use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const BUNDLED_CATEGORIES: &str = include_str!("../../data/categories.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryNode {
    pub name: String,
    pub shard: String,
    /// Backend query fragment, passed through as-is.
    pub query: String,
    /// Set on top-level nodes; used by whole-catalog parsing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "childs", default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Index path from the root, e.g. `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CategoryPath(Vec<usize>);

impl CategoryPath {
    pub fn new(indices: Vec<usize>) -> Self {
        CategoryPath(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<usize>> for CategoryPath {
    fn from(indices: Vec<usize>) -> Self {
        CategoryPath(indices)
    }
}

impl FromStr for CategoryPath {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(CategoryPath::default());
        }
        s.split([',', '/', '.'])
            .map(|part| {
                part.trim()
                    .parse::<usize>()
                    .map_err(|_| AppError::Validation(format!("invalid category path: {}", s)))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(CategoryPath)
    }
}

impl fmt::Display for CategoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}

/// Static category tree, loaded once.
#[derive(Debug, Clone)]
pub struct Catalog {
    roots: Vec<CategoryNode>,
}

impl Catalog {
    pub fn bundled() -> AppResult<Self> {
        Catalog::from_json(BUNDLED_CATEGORIES)
    }

    pub fn from_json(raw: &str) -> AppResult<Self> {
        let roots: Vec<CategoryNode> = serde_json::from_str(raw)?;
        Ok(Catalog { roots })
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Catalog::from_json(&raw)
    }

    pub fn roots(&self) -> &[CategoryNode] {
        &self.roots
    }

    pub fn root(&self, index: usize) -> Option<&CategoryNode> {
        self.roots.get(index)
    }

    /// Node at exactly `path`.
    pub fn node(&self, path: &CategoryPath) -> Option<&CategoryNode> {
        let (first, rest) = path.indices().split_first()?;
        let mut node = self.roots.get(*first)?;
        for index in rest {
            node = node.children.get(*index)?;
        }
        Some(node)
    }

    /// Deepest node reachable along `path`. Indices past a missing level
    /// are ignored, so a partial selection resolves to its last valid node.
    pub fn deepest(&self, path: &CategoryPath) -> Option<&CategoryNode> {
        let (first, rest) = path.indices().split_first()?;
        let mut node = self.roots.get(*first)?;
        for index in rest {
            match node.children.get(*index) {
                Some(child) => node = child,
                None => break,
            }
        }
        Some(node)
    }

    /// Choices one level below `path`; the roots for an empty path.
    pub fn children(&self, path: &CategoryPath) -> &[CategoryNode] {
        if path.is_empty() {
            return &self.roots;
        }
        self.node(path).map(|n| n.children.as_slice()).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: &str = r#"[
        {"name": "A", "id": 1, "shard": "a", "query": "cat=1", "childs": [
            {"name": "A0", "shard": "a0", "query": "cat=10"},
            {"name": "A1", "shard": "a1", "query": "cat=11", "childs": [
                {"name": "A1x", "shard": "a1x", "query": "cat=11&subject=5"}
            ]}
        ]},
        {"name": "B", "id": 2, "shard": "b", "query": "cat=2"}
    ]"#;

    #[test]
    fn resolves_nodes_by_path() {
        let catalog = Catalog::from_json(TREE).unwrap();
        let path = CategoryPath::new(vec![0, 1, 0]);
        assert_eq!(catalog.node(&path).unwrap().name, "A1x");
        assert!(catalog.node(&CategoryPath::new(vec![0, 7])).is_none());
        assert!(catalog.node(&CategoryPath::default()).is_none());
    }

    #[test]
    fn deepest_stops_at_last_valid_level() {
        let catalog = Catalog::from_json(TREE).unwrap();
        assert_eq!(
            catalog.deepest(&CategoryPath::new(vec![0, 1])).unwrap().shard,
            "a1"
        );
        assert_eq!(
            catalog.deepest(&CategoryPath::new(vec![0, 9, 9])).unwrap().name,
            "A"
        );
        assert!(catalog.deepest(&CategoryPath::new(vec![5])).is_none());
    }

    #[test]
    fn children_listing() {
        let catalog = Catalog::from_json(TREE).unwrap();
        assert_eq!(catalog.children(&CategoryPath::default()).len(), 2);
        assert_eq!(catalog.children(&CategoryPath::new(vec![0])).len(), 2);
        assert!(catalog.children(&CategoryPath::new(vec![1])).is_empty());
    }

    #[test]
    fn parses_paths() {
        assert_eq!(
            "0,1".parse::<CategoryPath>().unwrap(),
            CategoryPath::new(vec![0, 1])
        );
        assert_eq!(
            "2/0/3".parse::<CategoryPath>().unwrap().to_string(),
            "2,0,3"
        );
        assert!("x,1".parse::<CategoryPath>().is_err());
    }

    #[test]
    fn bundled_tree_loads() {
        let catalog = Catalog::bundled().unwrap();
        assert!(!catalog.roots().is_empty());
        assert!(catalog.roots().iter().all(|root| root.id.is_some()));
    }
}
