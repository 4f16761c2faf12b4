//! Error types for WLD container decoding and encoding

use std::io;

/// Crate result alias
pub type Result<T, E = WldError> = std::result::Result<T, E>;

/// Errors that can occur when reading, writing, or resolving a WLD container
#[derive(Debug, thiserror::Error)]
pub enum WldError {
    /// File does not start with `02 3D 50 54`
    #[error("invalid magic bytes (expected 02 3D 50 54)")]
    InvalidMagic,

    #[error("unsupported wld version 0x{0:08X}")]
    UnsupportedVersion(u32),

    /// The cursor ran out of bytes before a declared field completed
    #[error("truncated record: needed {needed} bytes, {remaining} remaining")]
    TruncatedRecord { needed: usize, remaining: usize },

    /// A declared element count implies more bytes than the record holds
    #[error(
        "inconsistent length: {count} elements of {element_size} bytes exceed the {remaining} bytes left in the record"
    )]
    InconsistentLength {
        count: usize,
        element_size: usize,
        remaining: usize,
    },

    #[error("unknown fragment code 0x{0:02X}")]
    UnknownFragmentCode(u32),

    /// A symbolic reference names an entity that does not exist in the graph
    #[error("{from} references unknown {kind} '{tag}'")]
    UnresolvedReference {
        from: String,
        kind: &'static str,
        tag: String,
    },

    /// An entity was reached again while it was still being encoded
    #[error("cyclic reference through '{0}'")]
    CyclicReference(String),

    /// A tag does not follow the naming convention its kind requires
    #[error("tag '{tag}' does not match the expected pattern {expected}")]
    NameConventionMismatch { tag: String, expected: &'static str },

    #[error("name reference {0} is outside the string pool")]
    InvalidNameRef(i32),

    #[error("header declares {header} regions, container holds {found}")]
    RegionCountMismatch { header: u32, found: u32 },

    /// A resolved reference points at a record of the wrong kind
    #[error("position {position} is a {found}, expected {expected}")]
    UnexpectedFragment {
        position: u32,
        expected: &'static str,
        found: &'static str,
    },

    /// Stored bytes are not a NUL-terminated UTF-8 string
    #[error("{field} is not a NUL-terminated UTF-8 string")]
    InvalidText { field: &'static str },

    /// A raw container position cannot be carried into a rebuilt container
    #[error("{field} holds position {position} of a record outside the graph")]
    UntranslatedReference { field: &'static str, position: i64 },

    /// A reference points past the end of the container
    #[error("position {position} is out of range ({count} fragments)")]
    PositionOutOfRange { position: u32, count: u32 },

    /// A value does not fit the on-disk field it is written to
    #[error("{field} value {value} does not fit its on-disk field")]
    ValueOutOfRange { field: &'static str, value: i64 },

    /// A low-level error wrapped with the position and kind of the record that raised it
    #[error("fragment {position} ({kind}): {source}")]
    Fragment {
        position: u32,
        kind: &'static str,
        #[source]
        source: Box<WldError>,
    },

    /// A low-level error wrapped with the entity whose encoding raised it
    #[error("encoding {entity}: {source}")]
    Entity {
        entity: String,
        #[source]
        source: Box<WldError>,
    },

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl WldError {
    /// Wrap this error with the record position and kind name that produced it.
    ///
    /// Errors that already carry a position are returned unchanged, so the
    /// innermost record is the one reported.
    pub fn at_fragment(self, position: u32, kind: &'static str) -> Self {
        match self {
            Self::Fragment { .. } => self,
            other => Self::Fragment {
                position,
                kind,
                source: Box::new(other),
            },
        }
    }

    /// Wrap this error with a description of the entity being encoded
    pub fn in_entity(self, entity: impl Into<String>) -> Self {
        match self {
            Self::Entity { .. } | Self::CyclicReference(_) => self,
            other => Self::Entity {
                entity: entity.into(),
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, with position/entity wrapping removed
    pub fn root(&self) -> &WldError {
        match self {
            Self::Fragment { source, .. } | Self::Entity { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_wrapping_keeps_innermost_position() {
        let err = WldError::TruncatedRecord {
            needed: 4,
            remaining: 1,
        }
        .at_fragment(7, "MaterialDef")
        .at_fragment(9, "MaterialPalette");

        let message = err.to_string();
        assert!(message.starts_with("fragment 7 (MaterialDef)"), "{message}");
        assert!(matches!(err.root(), WldError::TruncatedRecord { .. }));
    }

    #[test]
    fn test_cyclic_reference_is_not_rewrapped() {
        let err = WldError::CyclicReference("A_MDF".into()).in_entity("palette B_MP");
        assert!(matches!(err, WldError::CyclicReference(_)));
    }
}
