use std::fmt;

use serde_json::Value;

use crate::error::Result;

/// Output shape of an analysis query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// One row per IP.
    SumIp,
    /// Full plugin detail per finding.
    VulnDetails,
}

impl Tool {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::SumIp => "sumip",
            Tool::VulnDetails => "vulndetails",
        }
    }
}

/// One `(field, operator, value)` analysis filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub op: String,
    pub value: String,
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<String>) -> Filter {
        Filter {
            field: field.to_string(),
            op: "=".to_string(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.field, self.op, self.value)
    }
}

/// Filters are AND-ed together by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisQuery {
    pub tool: Tool,
    pub filters: Vec<Filter>,
}

impl AnalysisQuery {
    pub fn new(tool: Tool) -> Self {
        AnalysisQuery {
            tool,
            filters: Vec::new(),
        }
    }

    pub fn filter(mut self, field: &str, value: impl Into<String>) -> Self {
        self.filters.push(Filter::eq(field, value));
        self
    }

    pub fn filter_opt(self, field: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.filter(field, value),
            None => self,
        }
    }

    pub fn has_filter(&self, field: &str) -> bool {
        self.filters.iter().any(|f| f.field == field)
    }
}

impl fmt::Display for AnalysisQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filters: Vec<String> = self.filters.iter().map(|f| f.to_string()).collect();
        write!(f, "{} [{}]", self.tool.as_str(), filters.join(", "))
    }
}

/// The server calls the reports depend on. Every call is one synchronous
/// round-trip; any error is fatal to the run.
pub trait QueryClient {
    /// Lists every object of `object_type`, projected to `fields`.
    fn fetch_all(&self, object_type: &str, fields: &[&str]) -> Result<Vec<Value>>;

    /// Fetches a single object by id, projected to `fields`.
    fn fetch_by_id(&self, object_type: &str, id: &str, fields: &[&str]) -> Result<Value>;

    /// Runs a filtered analysis query. No matches is an empty vec.
    fn analysis(&self, query: &AnalysisQuery) -> Result<Vec<Value>>;
}
