use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle state of a task, stored as `varchar(20)`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum TaskStatus {
    #[default]
    #[sea_orm(string_value = "new")]
    #[serde(rename = "new")]
    New,
    #[sea_orm(string_value = "in progress")]
    #[serde(rename = "in progress")]
    InProgress,
    #[sea_orm(string_value = "done")]
    #[serde(rename = "done")]
    Done,
}

impl TaskStatus {
    /// Returns the stored and wire representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::New => "new",
            TaskStatus::InProgress => "in progress",
            TaskStatus::Done => "done",
        }
    }

    /// Parses a status from its wire representation. Matching is exact.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new" => Some(TaskStatus::New),
            "in progress" => Some(TaskStatus::InProgress),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn can_parse_every_known_status() {
        for status in TaskStatus::iter() {
            assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn can_reject_unknown_status() {
        assert_eq!(TaskStatus::parse("archived"), None);
        assert_eq!(TaskStatus::parse("Done"), None);
        assert_eq!(TaskStatus::parse("in_progress"), None);
        assert_eq!(TaskStatus::parse(""), None);
    }

    #[test]
    fn can_default_to_new() {
        assert_eq!(TaskStatus::default(), TaskStatus::New);
    }

    #[test]
    fn can_serialize_with_wire_names() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in progress\"");
    }
}
