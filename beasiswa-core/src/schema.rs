//! Node and edge kinds of the recommendation graph.
//!
//! Wire names are the SCREAMING_SNAKE forms (`STUDENT`, `RECOMMENDED_TO`, ...)
//! used by snapshots and the HTTP API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a node in the recommendation graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    /// A student (one per input record index)
    Student,
    /// A scholarship, keyed by its normalized title
    Scholarship,
    /// Funding category: Full, Partial, Tuition only, Other
    FundType,
    /// Study level: Undergraduate, Postgraduate, Doctoral, Other
    StudyLevel,
    /// Country or region
    Location,
    /// Sentiment bucket of the scholarship title
    Sentiment,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Student,
        EntityKind::Scholarship,
        EntityKind::FundType,
        EntityKind::StudyLevel,
        EntityKind::Location,
        EntityKind::Sentiment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Student => "STUDENT",
            EntityKind::Scholarship => "SCHOLARSHIP",
            EntityKind::FundType => "FUND_TYPE",
            EntityKind::StudyLevel => "STUDY_LEVEL",
            EntityKind::Location => "LOCATION",
            EntityKind::Sentiment => "SENTIMENT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "STUDENT" => Some(EntityKind::Student),
            "SCHOLARSHIP" => Some(EntityKind::Scholarship),
            "FUND_TYPE" => Some(EntityKind::FundType),
            "STUDY_LEVEL" => Some(EntityKind::StudyLevel),
            "LOCATION" => Some(EntityKind::Location),
            "SENTIMENT" => Some(EntityKind::Sentiment),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Types of relationships between nodes.
///
/// The derived ordering follows declaration order and fixes the key order of
/// scholarship descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationKind {
    /// Student→Scholarship
    RecommendedTo,
    /// Scholarship→FundType
    HasFundType,
    /// Scholarship→StudyLevel
    ForLevel,
    /// Scholarship→Location
    InCountry,
    /// Scholarship→Sentiment
    HasSentiment,
}

impl RelationKind {
    pub const ALL: [RelationKind; 5] = [
        RelationKind::RecommendedTo,
        RelationKind::HasFundType,
        RelationKind::ForLevel,
        RelationKind::InCountry,
        RelationKind::HasSentiment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::RecommendedTo => "RECOMMENDED_TO",
            RelationKind::HasFundType => "HAS_FUND_TYPE",
            RelationKind::ForLevel => "FOR_LEVEL",
            RelationKind::InCountry => "IN_COUNTRY",
            RelationKind::HasSentiment => "HAS_SENTIMENT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "RECOMMENDED_TO" => Some(RelationKind::RecommendedTo),
            "HAS_FUND_TYPE" => Some(RelationKind::HasFundType),
            "FOR_LEVEL" => Some(RelationKind::ForLevel),
            "IN_COUNTRY" => Some(RelationKind::InCountry),
            "HAS_SENTIMENT" => Some(RelationKind::HasSentiment),
            _ => None,
        }
    }

    /// Kind of node this relation points at.
    pub fn target_kind(&self) -> EntityKind {
        match self {
            RelationKind::RecommendedTo => EntityKind::Scholarship,
            RelationKind::HasFundType => EntityKind::FundType,
            RelationKind::ForLevel => EntityKind::StudyLevel,
            RelationKind::InCountry => EntityKind::Location,
            RelationKind::HasSentiment => EntityKind::Sentiment,
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_roundtrip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(EntityKind::parse("student"), Some(EntityKind::Student));
        assert_eq!(EntityKind::parse("lecturer"), None);
    }

    #[test]
    fn test_relation_kind_roundtrip() {
        for rel in RelationKind::ALL {
            assert_eq!(RelationKind::parse(rel.as_str()), Some(rel));
        }
        assert_eq!(RelationKind::parse("in_country"), Some(RelationKind::InCountry));
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&RelationKind::HasFundType).unwrap();
        assert_eq!(json, "\"HAS_FUND_TYPE\"");
        let kind: EntityKind = serde_json::from_str("\"STUDY_LEVEL\"").unwrap();
        assert_eq!(kind, EntityKind::StudyLevel);
    }

    #[test]
    fn test_relation_target_kinds() {
        assert_eq!(RelationKind::RecommendedTo.target_kind(), EntityKind::Scholarship);
        assert_eq!(RelationKind::InCountry.target_kind(), EntityKind::Location);
    }
}
