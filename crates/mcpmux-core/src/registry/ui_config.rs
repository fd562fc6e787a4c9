//! Registry UI configuration types (API-driven)

use serde::{Deserialize, Serialize};

/// Filter and sort configuration delivered with the registry bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub filters: Vec<FilterDefinition>,
    #[serde(default)]
    pub sort_options: Vec<SortOption>,
    #[serde(default = "default_sort_id")]
    pub default_sort: String,
    #[serde(default = "default_items_per_page")]
    pub items_per_page: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            filters: vec![],
            sort_options: vec![],
            default_sort: default_sort_id(),
            items_per_page: default_items_per_page(),
        }
    }
}

impl UiConfig {
    pub fn filter(&self, filter_id: &str) -> Option<&FilterDefinition> {
        self.filters.iter().find(|f| f.id == filter_id)
    }

    pub fn sort_option(&self, sort_id: &str) -> Option<&SortOption> {
        self.sort_options.iter().find(|s| s.id == sort_id)
    }
}

fn default_sort_id() -> String {
    "name_asc".to_string()
}

fn default_items_per_page() -> u32 {
    24
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDefinition {
    pub id: String,
    pub label: String,
    /// "single" or "multi"
    #[serde(rename = "type", default = "default_filter_type")]
    pub filter_type: String,
    #[serde(default)]
    pub options: Vec<FilterOption>,
}

fn default_filter_type() -> String {
    "single".to_string()
}

impl FilterDefinition {
    pub fn option(&self, option_id: &str) -> Option<&FilterOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOption {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(rename = "match", default)]
    pub match_rule: Option<FilterMatch>,
}

/// Field/operator/value predicate attached to a filter option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterMatch {
    /// Dot-notation path into the view model (e.g. "auth.type")
    pub field: String,
    pub operator: FilterOperator,
    pub value: serde_json::Value,
}

/// Filter operator; operators this client does not know are preserved
/// verbatim so they can be treated permissively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterOperator {
    /// Strict equality
    Eq,
    /// Field value is one of the match values
    In,
    /// Array field contains the match value
    Contains,
    Unknown(String),
}

impl From<String> for FilterOperator {
    fn from(value: String) -> Self {
        match value.as_str() {
            "eq" => Self::Eq,
            "in" => Self::In,
            "contains" => Self::Contains,
            _ => Self::Unknown(value),
        }
    }
}

impl From<FilterOperator> for String {
    fn from(value: FilterOperator) -> Self {
        match value {
            FilterOperator::Eq => "eq".to_string(),
            FilterOperator::In => "in".to_string(),
            FilterOperator::Contains => "contains".to_string(),
            FilterOperator::Unknown(other) => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortOption {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub rules: Vec<SortRule>,
}

/// One tie-break rule; rules are evaluated in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortRule {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
    #[serde(default)]
    pub nulls: Option<NullsPlacement>,
}

impl SortRule {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
            nulls: None,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
            nulls: None,
        }
    }

    pub fn nulls(mut self, placement: NullsPlacement) -> Self {
        self.nulls = Some(placement);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Desc,
    /// Ascending; also used for unrecognized directions
    #[default]
    #[serde(other)]
    Asc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NullsPlacement {
    First,
    #[default]
    Last,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomeConfig {
    #[serde(default)]
    pub featured_server_ids: Vec<String>,
}
