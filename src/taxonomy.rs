//! Read-only snapshot of the reporting taxonomy with per-level indexes

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use crate::types::*;

/// Four-level reporting taxonomy, immutable for the duration of a run
///
/// Nodes keep the order they were supplied in, so "first child" lookups
/// follow taxonomy order.
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    levels: [Vec<TaxonomyNode>; 4],
    index: [HashMap<String, usize>; 4],
}

impl Taxonomy {
    /// Build a taxonomy from the four flat lists supplied by the taxonomy source
    pub fn new(
        major_heads: Vec<TaxonomyNode>,
        minor_heads: Vec<TaxonomyNode>,
        groupings: Vec<TaxonomyNode>,
        line_items: Vec<TaxonomyNode>,
    ) -> ClassifierResult<Self> {
        let lists = [
            (TaxonomyLevel::MajorHead, &major_heads),
            (TaxonomyLevel::MinorHead, &minor_heads),
            (TaxonomyLevel::Grouping, &groupings),
            (TaxonomyLevel::LineItem, &line_items),
        ];
        for (level, nodes) in lists {
            if let Some(node) = nodes.iter().find(|n| n.level != level) {
                return Err(ClassifierError::Taxonomy(format!(
                    "Node '{}' is a {} but was supplied in the {} list",
                    node.code, node.level, level
                )));
            }
        }

        Self::from_nodes(
            major_heads
                .into_iter()
                .chain(minor_heads)
                .chain(groupings)
                .chain(line_items),
        )
    }

    /// Build a taxonomy from nodes of any level, sorted into levels by `node.level`
    pub fn from_nodes(nodes: impl IntoIterator<Item = TaxonomyNode>) -> ClassifierResult<Self> {
        let mut taxonomy = Self::default();

        for node in nodes {
            if node.code.trim().is_empty() {
                return Err(ClassifierError::Taxonomy(format!(
                    "A {} named '{}' has an empty code",
                    node.level, node.name
                )));
            }

            match (node.level, &node.parent_code) {
                (TaxonomyLevel::MajorHead, Some(parent)) => {
                    return Err(ClassifierError::Taxonomy(format!(
                        "Major head '{}' cannot have a parent (got '{}')",
                        node.code, parent
                    )));
                }
                (level, None) if level != TaxonomyLevel::MajorHead => {
                    return Err(ClassifierError::Taxonomy(format!(
                        "{} '{}' is missing its parent code",
                        level, node.code
                    )));
                }
                _ => {}
            }

            let slot = node.level.index();
            if taxonomy.index[slot].contains_key(&node.code) {
                return Err(ClassifierError::Taxonomy(format!(
                    "Duplicate {} code '{}'",
                    node.level, node.code
                )));
            }
            taxonomy.index[slot].insert(node.code.clone(), taxonomy.levels[slot].len());
            taxonomy.levels[slot].push(node);
        }

        Ok(taxonomy)
    }

    /// Parse the JSON "masters" snapshot (`majorHeads`, `minorHeads`, `groupings`, `lineItems`)
    pub fn from_json(json: &str) -> ClassifierResult<Self> {
        let snapshot: TaxonomySnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }

    /// Build a taxonomy from its wire snapshot
    pub fn from_snapshot(snapshot: TaxonomySnapshot) -> ClassifierResult<Self> {
        Self::new(
            snapshot
                .major_heads
                .into_iter()
                .map(|m| TaxonomyNode::major_head(m.code, m.name))
                .collect(),
            snapshot
                .minor_heads
                .into_iter()
                .map(|m| TaxonomyNode::minor_head(m.code, m.name, m.major_head_code))
                .collect(),
            snapshot
                .groupings
                .into_iter()
                .map(|g| TaxonomyNode::grouping(g.code, g.name, g.minor_head_code))
                .collect(),
            snapshot
                .line_items
                .into_iter()
                .map(|l| TaxonomyNode::line_item(l.code, l.name, l.grouping_code))
                .collect(),
        )
    }

    /// Wire snapshot of this taxonomy, as sent to external suggestion providers
    pub fn snapshot(&self) -> TaxonomySnapshot {
        let parent = |n: &TaxonomyNode| n.parent_code.clone().unwrap_or_default();
        TaxonomySnapshot {
            major_heads: self
                .nodes(TaxonomyLevel::MajorHead)
                .iter()
                .map(|n| MajorHeadEntry {
                    code: n.code.clone(),
                    name: n.name.clone(),
                })
                .collect(),
            minor_heads: self
                .nodes(TaxonomyLevel::MinorHead)
                .iter()
                .map(|n| MinorHeadEntry {
                    code: n.code.clone(),
                    name: n.name.clone(),
                    major_head_code: parent(n),
                })
                .collect(),
            groupings: self
                .nodes(TaxonomyLevel::Grouping)
                .iter()
                .map(|n| GroupingEntry {
                    code: n.code.clone(),
                    name: n.name.clone(),
                    minor_head_code: parent(n),
                })
                .collect(),
            line_items: self
                .nodes(TaxonomyLevel::LineItem)
                .iter()
                .map(|n| LineItemEntry {
                    code: n.code.clone(),
                    name: n.name.clone(),
                    grouping_code: parent(n),
                })
                .collect(),
        }
    }

    /// All nodes at a level, in taxonomy order
    pub fn nodes(&self, level: TaxonomyLevel) -> &[TaxonomyNode] {
        &self.levels[level.index()]
    }

    /// Look up a node by level and code
    pub fn node(&self, level: TaxonomyLevel, code: &str) -> Option<&TaxonomyNode> {
        self.index[level.index()]
            .get(code)
            .map(|&i| &self.levels[level.index()][i])
    }

    /// Direct children of a node, in taxonomy order
    pub fn children_of<'a>(&'a self, node: &'a TaxonomyNode) -> Vec<&'a TaxonomyNode> {
        let child_level = match node.level {
            TaxonomyLevel::MajorHead => TaxonomyLevel::MinorHead,
            TaxonomyLevel::MinorHead => TaxonomyLevel::Grouping,
            TaxonomyLevel::Grouping => TaxonomyLevel::LineItem,
            TaxonomyLevel::LineItem => return Vec::new(),
        };
        self.nodes(child_level)
            .iter()
            .filter(|child| child.parent_code.as_deref() == Some(node.code.as_str()))
            .collect()
    }

    /// Parent of a node, or `None` for Major Heads and dangling references
    pub fn parent_of(&self, node: &TaxonomyNode) -> Option<&TaxonomyNode> {
        let level = node.level.parent()?;
        let code = node.parent_code.as_deref()?;
        self.node(level, code)
    }

    /// Resolve the Minor Head and Major Head above a Grouping
    ///
    /// Returns `None` when either ancestor is missing from the taxonomy.
    pub fn ancestry<'a>(
        &'a self,
        grouping: &'a TaxonomyNode,
    ) -> Option<(&'a TaxonomyNode, &'a TaxonomyNode)> {
        let Some(minor_head) = self.parent_of(grouping) else {
            warn!(
                grouping = %grouping.code,
                parent = ?grouping.parent_code,
                "grouping points at a missing minor head; discarding match"
            );
            return None;
        };
        let Some(major_head) = self.parent_of(minor_head) else {
            warn!(
                minor_head = %minor_head.code,
                parent = ?minor_head.parent_code,
                "minor head points at a missing major head; discarding match"
            );
            return None;
        };
        Some((minor_head, major_head))
    }

    /// Nodes whose declared parent does not exist, as (level, code, missing parent code)
    pub fn dangling_references(&self) -> Vec<(TaxonomyLevel, String, String)> {
        TaxonomyLevel::ALL
            .iter()
            .flat_map(|&level| self.nodes(level))
            .filter_map(|node| {
                let parent_code = node.parent_code.as_ref()?;
                match self.parent_of(node) {
                    Some(_) => None,
                    None => Some((node.level, node.code.clone(), parent_code.clone())),
                }
            })
            .collect()
    }

    /// Total number of nodes across all levels
    pub fn len(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Wire shape of the taxonomy exchanged with the taxonomy source and providers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomySnapshot {
    #[serde(default)]
    pub major_heads: Vec<MajorHeadEntry>,
    #[serde(default)]
    pub minor_heads: Vec<MinorHeadEntry>,
    #[serde(default)]
    pub groupings: Vec<GroupingEntry>,
    #[serde(default)]
    pub line_items: Vec<LineItemEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MajorHeadEntry {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinorHeadEntry {
    pub code: String,
    pub name: String,
    pub major_head_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupingEntry {
    pub code: String,
    pub name: String,
    pub minor_head_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemEntry {
    pub code: String,
    pub name: String,
    pub grouping_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Taxonomy {
        Taxonomy::new(
            vec![TaxonomyNode::major_head("MAJ1", "Expenses")],
            vec![TaxonomyNode::minor_head("M1", "Other Expenses", "MAJ1")],
            vec![
                TaxonomyNode::grouping("G1", "Rent Expense", "M1"),
                TaxonomyNode::grouping("G2", "Travelling Expense", "M1"),
            ],
            vec![TaxonomyNode::line_item("L1", "Office Rent", "G1")],
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_and_children() {
        let taxonomy = sample();
        let minor = taxonomy.node(TaxonomyLevel::MinorHead, "M1").unwrap();
        let children: Vec<_> = taxonomy
            .children_of(minor)
            .iter()
            .map(|n| n.code.as_str())
            .collect();
        assert_eq!(children, vec!["G1", "G2"]);
        assert!(taxonomy.node(TaxonomyLevel::Grouping, "M1").is_none());
        assert_eq!(taxonomy.len(), 5);
    }

    #[test]
    fn test_ancestry_resolves_both_levels() {
        let taxonomy = sample();
        let grouping = taxonomy.node(TaxonomyLevel::Grouping, "G2").unwrap();
        let (minor, major) = taxonomy.ancestry(grouping).unwrap();
        assert_eq!(minor.code, "M1");
        assert_eq!(major.code, "MAJ1");
    }

    #[test]
    fn test_dangling_parent_is_reported_and_unresolvable() {
        let taxonomy = Taxonomy::new(
            vec![TaxonomyNode::major_head("MAJ1", "Expenses")],
            vec![TaxonomyNode::minor_head("M1", "Other Expenses", "MAJ1")],
            vec![TaxonomyNode::grouping("G9", "Orphaned Grouping", "M404")],
            vec![],
        )
        .unwrap();

        let grouping = taxonomy.node(TaxonomyLevel::Grouping, "G9").unwrap();
        assert!(taxonomy.ancestry(grouping).is_none());
        assert_eq!(
            taxonomy.dangling_references(),
            vec![(
                TaxonomyLevel::Grouping,
                "G9".to_string(),
                "M404".to_string()
            )]
        );
    }

    #[test]
    fn test_rejects_duplicates_and_missing_parents() {
        let duplicate = Taxonomy::new(
            vec![
                TaxonomyNode::major_head("MAJ1", "Expenses"),
                TaxonomyNode::major_head("MAJ1", "Income"),
            ],
            vec![],
            vec![],
            vec![],
        );
        assert!(matches!(duplicate, Err(ClassifierError::Taxonomy(_))));

        let orphan = Taxonomy::from_nodes(vec![TaxonomyNode::new(
            "G1",
            "Rent",
            TaxonomyLevel::Grouping,
            None,
        )]);
        assert!(matches!(orphan, Err(ClassifierError::Taxonomy(_))));

        let misplaced = Taxonomy::new(
            vec![TaxonomyNode::grouping("G1", "Rent", "M1")],
            vec![],
            vec![],
            vec![],
        );
        assert!(misplaced.is_err());
    }

    #[test]
    fn test_json_snapshot_parsing() {
        let json = r#"{
            "majorHeads": [{"code": "MAJ1", "name": "Expenses"}],
            "minorHeads": [{"code": "M1", "name": "Other Expenses", "majorHeadCode": "MAJ1"}],
            "groupings": [{"code": "G1", "name": "Rent Expense", "minorHeadCode": "M1"}],
            "lineItems": []
        }"#;
        let taxonomy = Taxonomy::from_json(json).unwrap();
        let grouping = taxonomy.node(TaxonomyLevel::Grouping, "G1").unwrap();
        assert_eq!(grouping.parent_code.as_deref(), Some("M1"));

        let snapshot = taxonomy.snapshot();
        assert_eq!(snapshot.minor_heads[0].major_head_code, "MAJ1");
        assert!(Taxonomy::from_json("{not json").is_err());
    }
}
