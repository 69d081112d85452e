// ---------------------------------------------------------------------------
// CatalogError: failures while loading the static building tables
// ---------------------------------------------------------------------------

use std::fmt;

use crate::building_data::BuildingType;

/// Errors raised by [`crate::building_data::BuildingCatalog::from_json`].
#[derive(Debug)]
pub enum CatalogError {
    /// The JSON could not be parsed into the expected shape.
    Parse(serde_json::Error),
    /// A building type has levels but no level 1 to place it at.
    MissingFirstLevel { building: BuildingType },
    /// A level's `nextLevel` names a level that does not exist.
    BrokenNextLevel {
        building: BuildingType,
        level: u8,
        next: u8,
    },
    /// Interaction config was given for a type with no level table.
    UnknownInteractionTarget { building: BuildingType },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Parse(e) => write!(f, "Catalog parse error: {e}"),
            CatalogError::MissingFirstLevel { building } => {
                write!(f, "{building:?} has no level 1 entry")
            }
            CatalogError::BrokenNextLevel {
                building,
                level,
                next,
            } => write!(
                f,
                "{building:?} level {level} points at missing next level {next}"
            ),
            CatalogError::UnknownInteractionTarget { building } => {
                write!(f, "Interactions configured for {building:?}, which has no levels")
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Parse(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_has_source() {
        let err: CatalogError = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("Catalog parse error"));
    }

    #[test]
    fn test_broken_next_level_display() {
        let err = CatalogError::BrokenNextLevel {
            building: BuildingType::House,
            level: 2,
            next: 9,
        };
        assert_eq!(
            err.to_string(),
            "House level 2 points at missing next level 9"
        );
        assert!(std::error::Error::source(&err).is_none());
    }
}
