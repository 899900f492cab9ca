//! Errors returned by the tree lookup API.

use thiserror::Error;

/// Error from building or querying a compact tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// A node index past the end of the tree.
    #[error("Out of Range")]
    OutOfRange,

    /// Lookups need at least the root value.
    #[error("Empty Path is not allowed")]
    EmptyPath,

    /// The path continues below a leaf.
    #[error("Path is too long")]
    PathTooLong,

    /// A path value was not found among the candidate nodes.
    #[error("Path does not match")]
    PathDoesNotMatch,

    /// A children offset sum does not fit in the chosen offset type.
    #[error("children offset does not fit in the offset type")]
    OffsetOverflow,

    /// A node value equals one of the markers of the marker layout.
    #[error("node value equals a marker")]
    ValueIsMarker,

    /// Parts handed to `from_parts` do not describe a tree.
    #[error("malformed tree: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(ApiError::OutOfRange.to_string(), "Out of Range");
        assert_eq!(ApiError::EmptyPath.to_string(), "Empty Path is not allowed");
        assert_eq!(ApiError::PathTooLong.to_string(), "Path is too long");
        assert_eq!(ApiError::PathDoesNotMatch.to_string(), "Path does not match");
    }
}
