//! Search query models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::attendee::AttendeeRole;
use super::event::MemberEventView;
use super::task::TaskView;

/// Which collections a search covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchType {
    Events,
    Tasks,
    #[default]
    All,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Events => "events",
            SearchType::Tasks => "tasks",
            SearchType::All => "all",
        }
    }

    pub fn includes_events(&self) -> bool {
        matches!(self, SearchType::Events | SearchType::All)
    }

    pub fn includes_tasks(&self) -> bool {
        matches!(self, SearchType::Tasks | SearchType::All)
    }
}

impl FromStr for SearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(SearchType::All),
            "events" => Ok(SearchType::Events),
            "tasks" => Ok(SearchType::Tasks),
            _ => Err(format!("Invalid search type: {}", s)),
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw query-string parameters for search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub keyword: Option<String>,
    pub role: Option<String>,
    #[serde(rename = "type")]
    pub search_type: Option<String>,
}

/// Normalized search criteria. Scope is always the caller's own memberships.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    /// Case-insensitive substring; `None` matches everything.
    pub keyword: Option<String>,
    /// Restricts matches to events where the caller holds this role.
    pub role: Option<AttendeeRole>,
}

impl SearchQuery {
    /// Normalizes the raw parameters.
    ///
    /// A blank keyword matches everything. Role values other than
    /// `organizer`/`attendee` are ignored, which keeps older clients that send
    /// `assignee` or `creator` working. An unknown search type is an error.
    pub fn normalize(&self) -> Result<(SearchFilter, SearchType), String> {
        let search_type = match self.search_type.as_deref() {
            Some(raw) => raw.parse::<SearchType>()?,
            None => SearchType::All,
        };

        let keyword = self
            .keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);

        let role = self
            .role
            .as_deref()
            .and_then(|r| r.parse::<AttendeeRole>().ok());

        Ok((SearchFilter { keyword, role }, search_type))
    }
}

/// Search response; only the requested collections are present.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<MemberEventView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<TaskView>>,
}

/// Case-insensitive literal substring match.
pub fn keyword_matches(haystack: &str, keyword: &str) -> bool {
    haystack.to_lowercase().contains(&keyword.to_lowercase())
}
