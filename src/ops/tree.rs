//! Encoding trees read from JSON files and querying the result.
//!
//! Input trees use the [`NaryTree`] JSON shape:
//!
//! ```json
//! { "value": 0, "children": [ { "value": 1 }, { "value": 2 } ] }
//! ```
//!
//! The marker layout reserves [`FLAT_MARKER_FOR_EMPTY`] and
//! [`FLAT_MARKER_FOR_CHILD`]; trees holding those values cannot use it.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::tree::{
    ApiError, FlatSlot, FlatTree, NaryTree, SmallMemoryTree, SmallMemoryTreeLotsOfChildren,
    SmallMemoryTreeLotsOfChildrenData,
};
use crate::util::fs::read_to_string;

/// A node value in a JSON tree: an integer or a string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeValue {
    Int(i64),
    Str(String),
}

/// Empty slot marker used when encoding with [`Layout::Flat`].
pub const FLAT_MARKER_FOR_EMPTY: TreeValue = TreeValue::Int(-1);

/// Child slot marker used when encoding with [`Layout::Flat`].
pub const FLAT_MARKER_FOR_CHILD: TreeValue = TreeValue::Int(-2);

impl FlatSlot for TreeValue {
    fn with_index(&self, index: usize) -> Option<Self> {
        i64::try_from(index).ok().map(TreeValue::Int)
    }

    fn index(&self) -> Option<usize> {
        match self {
            TreeValue::Int(i) => usize::try_from(*i).ok(),
            TreeValue::Str(_) => None,
        }
    }
}

impl FromStr for TreeValue {
    type Err = std::convert::Infallible;

    /// Integers parse as `Int`, everything else as `Str`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse()
            .map(TreeValue::Int)
            .unwrap_or_else(|_| TreeValue::Str(s.to_string())))
    }
}

impl fmt::Display for TreeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeValue::Int(i) => write!(f, "{}", i),
            TreeValue::Str(s) => f.write_str(s),
        }
    }
}

/// Integer width of the offset column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetWidth {
    U8,
    U16,
    U32,
    #[default]
    U64,
}

impl FromStr for OffsetWidth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "8" => Ok(OffsetWidth::U8),
            "16" => Ok(OffsetWidth::U16),
            "32" => Ok(OffsetWidth::U32),
            "64" => Ok(OffsetWidth::U64),
            other => Err(format!("offset width must be 8, 16, 32 or 64, not `{}`", other)),
        }
    }
}

/// Which encoding to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Values plus cumulative child counts
    #[default]
    Compact,
    /// Presence bitmap with `max_children` slots per node
    Bitmap,
    /// One vector of values, child offsets and empty markers
    Flat,
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compact" => Ok(Layout::Compact),
            "bitmap" => Ok(Layout::Bitmap),
            "flat" => Ok(Layout::Flat),
            other => Err(format!(
                "layout must be `compact`, `bitmap` or `flat`, not `{}`",
                other
            )),
        }
    }
}

/// An encoded tree as stored on disk; the layout is recognised by shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EncodedTree {
    Compact(SmallMemoryTree<TreeValue>),
    Bitmap(SmallMemoryTreeLotsOfChildrenData<TreeValue>),
    Flat(FlatTree<TreeValue>),
}

impl EncodedTree {
    /// Children of the node at the end of `path`.
    ///
    /// `sorted` switches the compact layout to binary search; it requires
    /// the siblings along the path to be sorted. The other layouts always
    /// search linearly.
    pub fn children_for_path(&self, path: &[TreeValue], sorted: bool) -> Result<Vec<TreeValue>> {
        if sorted && !matches!(self, EncodedTree::Compact(_)) {
            tracing::warn!(
                "sorted lookup is only available for the compact layout; searching linearly"
            );
        }

        match self {
            EncodedTree::Compact(tree) => {
                let children = if sorted {
                    tree.calc_children_for_path_sorted(path)
                } else {
                    tree.calc_children_for_path(path)
                };
                Ok(children?)
            }
            EncodedTree::Bitmap(data) => {
                let tree = SmallMemoryTreeLotsOfChildren::new(data.clone())?;
                if path.is_empty() {
                    return Err(ApiError::EmptyPath.into());
                }
                tree.children_by_path(path)
                    .ok_or_else(|| ApiError::PathDoesNotMatch.into())
            }
            EncodedTree::Flat(tree) => {
                let (root, rest) = path.split_first().ok_or(ApiError::EmptyPath)?;
                if tree.value(0) != Some(root) {
                    return Err(ApiError::PathDoesNotMatch.into());
                }
                tree.children_by_path(rest)
                    .ok_or_else(|| ApiError::PathDoesNotMatch.into())
            }
        }
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        match self {
            EncodedTree::Compact(tree) => tree.len(),
            EncodedTree::Bitmap(data) => data.data.len(),
            EncodedTree::Flat(tree) => tree.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parse a JSON tree.
pub fn parse_tree(json: &str) -> Result<NaryTree<TreeValue>> {
    serde_json::from_str(json).context("invalid tree JSON")
}

/// Encode `tree` and return the pretty-printed JSON of the encoding.
pub fn encode(tree: &NaryTree<TreeValue>, layout: Layout, width: OffsetWidth) -> Result<String> {
    let encoded = match (layout, width) {
        (Layout::Bitmap, _) => {
            serde_json::to_value(SmallMemoryTreeLotsOfChildrenData::from_adapter(tree))?
        }
        (Layout::Flat, _) => serde_json::to_value(FlatTree::from_adapter(
            tree,
            FLAT_MARKER_FOR_EMPTY,
            FLAT_MARKER_FOR_CHILD,
        )?)?,
        (Layout::Compact, OffsetWidth::U8) => {
            serde_json::to_value(SmallMemoryTree::<TreeValue, u8>::from_adapter(tree)?)?
        }
        (Layout::Compact, OffsetWidth::U16) => {
            serde_json::to_value(SmallMemoryTree::<TreeValue, u16>::from_adapter(tree)?)?
        }
        (Layout::Compact, OffsetWidth::U32) => {
            serde_json::to_value(SmallMemoryTree::<TreeValue, u32>::from_adapter(tree)?)?
        }
        (Layout::Compact, OffsetWidth::U64) => {
            serde_json::to_value(SmallMemoryTree::<TreeValue, u64>::from_adapter(tree)?)?
        }
    };
    tracing::debug!("encoded {} nodes as {:?}", tree.len(), layout);

    let mut json = serde_json::to_string_pretty(&encoded)?;
    json.push('\n');
    Ok(json)
}

/// Read and encode a JSON tree file.
pub fn encode_file(path: &Path, layout: Layout, width: OffsetWidth) -> Result<String> {
    let tree = parse_tree(&read_to_string(path)?)
        .with_context(|| format!("failed to load tree from {}", path.display()))?;
    encode(&tree, layout, width)
        .with_context(|| format!("failed to encode {}", path.display()))
}

/// Read an encoded tree file in either layout.
pub fn load_encoded(path: &Path) -> Result<EncodedTree> {
    serde_json::from_str(&read_to_string(path)?)
        .with_context(|| format!("{} is not an encoded tree", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
        "value": 0,
        "children": [
            { "value": 1, "children": [ { "value": 3 }, { "value": 4 } ] },
            { "value": 2, "children": [ { "value": 5 }, { "value": 6, "children": [ { "value": 7 } ] } ] }
        ]
    }"#;

    fn path(values: &[i64]) -> Vec<TreeValue> {
        values.iter().copied().map(TreeValue::Int).collect()
    }

    #[test]
    fn test_encode_compact() {
        let tree = parse_tree(SAMPLE).unwrap();
        let json = encode(&tree, Layout::Compact, OffsetWidth::U8).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["values"], serde_json::json!([0, 1, 2, 3, 4, 5, 6, 7]));
        assert_eq!(
            value["children_offset_ends"],
            serde_json::json!([2, 4, 6, 6, 6, 6, 7, 7])
        );
    }

    #[test]
    fn test_encoded_round_trip_and_lookup() {
        let tree = parse_tree(SAMPLE).unwrap();
        for layout in [Layout::Compact, Layout::Bitmap, Layout::Flat] {
            let json = encode(&tree, layout, OffsetWidth::default()).unwrap();
            let encoded: EncodedTree = serde_json::from_str(&json).unwrap();
            assert_eq!(encoded.len(), 8);

            assert_eq!(
                encoded.children_for_path(&path(&[0, 2]), false).unwrap(),
                path(&[5, 6])
            );
            assert!(encoded.children_for_path(&path(&[0, 9]), false).is_err());
            assert!(encoded.children_for_path(&[], false).is_err());
        }
    }

    #[test]
    fn test_layout_detected_by_shape() {
        let tree = parse_tree(SAMPLE).unwrap();
        let bitmap = encode(&tree, Layout::Bitmap, OffsetWidth::U64).unwrap();
        assert!(matches!(
            serde_json::from_str::<EncodedTree>(&bitmap).unwrap(),
            EncodedTree::Bitmap(_)
        ));
    }

    #[test]
    fn test_flat_layout() {
        let tree = parse_tree(SAMPLE).unwrap();
        let json = encode(&tree, Layout::Flat, OffsetWidth::U8).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["marker_for_empty"], serde_json::json!(-1));
        assert_eq!(value["slots"].as_array().unwrap().len(), 24);

        let encoded: EncodedTree = serde_json::from_str(&json).unwrap();
        assert!(matches!(encoded, EncodedTree::Flat(_)));
        assert_eq!(encoded.children_for_path(&path(&[0]), false).unwrap(), path(&[1, 2]));
        assert_eq!(encoded.children_for_path(&path(&[0, 1, 3]), false).unwrap(), path(&[]));
        assert!(encoded.children_for_path(&path(&[1]), false).is_err());

        let reserved = parse_tree(r#"{ "value": 0, "children": [ { "value": -1 } ] }"#).unwrap();
        let err = encode(&reserved, Layout::Flat, OffsetWidth::U64).unwrap_err();
        assert_eq!(err.downcast_ref::<ApiError>(), Some(&ApiError::ValueIsMarker));
    }

    #[test]
    fn test_sorted_flag_on_other_layouts() {
        let tree = parse_tree(SAMPLE).unwrap();
        for layout in [Layout::Bitmap, Layout::Flat] {
            let json = encode(&tree, layout, OffsetWidth::U64).unwrap();
            let encoded: EncodedTree = serde_json::from_str(&json).unwrap();
            assert_eq!(
                encoded.children_for_path(&path(&[0, 2]), true).unwrap(),
                path(&[5, 6])
            );
        }
    }

    #[test]
    fn test_sorted_lookup() {
        let tree = parse_tree(SAMPLE).unwrap();
        let json = encode(&tree, Layout::Compact, OffsetWidth::U16).unwrap();
        let encoded: EncodedTree = serde_json::from_str(&json).unwrap();
        assert_eq!(
            encoded.children_for_path(&path(&[0, 2, 6]), true).unwrap(),
            path(&[7])
        );
    }

    #[test]
    fn test_offset_overflow() {
        let mut root = crate::tree::Node::new(TreeValue::Int(0));
        for i in 0..300 {
            root.push(TreeValue::Int(i));
        }
        let tree = NaryTree::from_root(root);

        let err = encode(&tree, Layout::Compact, OffsetWidth::U8).unwrap_err();
        assert_eq!(err.downcast_ref::<ApiError>(), Some(&ApiError::OffsetOverflow));
        assert!(encode(&tree, Layout::Compact, OffsetWidth::U16).is_ok());
    }

    #[test]
    fn test_string_values() {
        let tree = parse_tree(r#"{ "value": "usr", "children": [ { "value": "bin" }, { "value": "lib" } ] }"#)
            .unwrap();
        let encoded: EncodedTree =
            serde_json::from_str(&encode(&tree, Layout::Compact, OffsetWidth::U8).unwrap()).unwrap();
        let children = encoded
            .children_for_path(&["usr".parse().unwrap()], false)
            .unwrap();
        assert_eq!(
            children,
            vec![TreeValue::Str("bin".into()), TreeValue::Str("lib".into())]
        );
    }

    #[test]
    fn test_files() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("tree.json");
        std::fs::write(&input, SAMPLE).unwrap();

        let json = encode_file(&input, Layout::Compact, OffsetWidth::U32).unwrap();
        let output = tmp.path().join("encoded.json");
        std::fs::write(&output, json).unwrap();

        let encoded = load_encoded(&output).unwrap();
        assert!(matches!(encoded, EncodedTree::Compact(_)));
        assert!(load_encoded(&input).is_err());
    }

    #[test]
    fn test_parse_widths_and_values() {
        assert_eq!("16".parse::<OffsetWidth>().unwrap(), OffsetWidth::U16);
        assert!("12".parse::<OffsetWidth>().is_err());
        assert_eq!("bitmap".parse::<Layout>().unwrap(), Layout::Bitmap);
        assert_eq!("flat".parse::<Layout>().unwrap(), Layout::Flat);
        assert_eq!("42".parse::<TreeValue>().unwrap(), TreeValue::Int(42));
        assert_eq!("x".parse::<TreeValue>().unwrap(), TreeValue::Str("x".into()));
    }
}
