//! Scripted `QueryClient` for unit tests.

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::{json, Value};

use crate::client::{AnalysisQuery, QueryClient};
use crate::error::{Result, ScError};

type Responder = Box<dyn Fn(&AnalysisQuery) -> Result<Vec<Value>>>;

pub struct MockClient {
    objects: HashMap<String, Vec<Value>>,
    by_id: HashMap<(String, String), Value>,
    responder: Responder,
    pub queries: RefCell<Vec<AnalysisQuery>>,
    pub fetches: RefCell<Vec<String>>,
}

impl MockClient {
    pub fn new() -> Self {
        MockClient {
            objects: HashMap::new(),
            by_id: HashMap::new(),
            responder: Box::new(|_| Ok(Vec::new())),
            queries: RefCell::new(Vec::new()),
            fetches: RefCell::new(Vec::new()),
        }
    }

    pub fn with_objects(mut self, object_type: &str, rows: Vec<Value>) -> Self {
        self.objects.insert(object_type.to_string(), rows);
        self
    }

    pub fn with_severity(mut self, plugin_id: &str, risk_factor: &str) -> Self {
        self.by_id.insert(
            ("plugin".to_string(), plugin_id.to_string()),
            json!({"id": plugin_id, "riskFactor": risk_factor}),
        );
        self
    }

    pub fn on_analysis<F>(mut self, responder: F) -> Self
    where
        F: Fn(&AnalysisQuery) -> Result<Vec<Value>> + 'static,
    {
        self.responder = Box::new(responder);
        self
    }

    pub fn verifications(&self) -> Vec<AnalysisQuery> {
        self.queries
            .borrow()
            .iter()
            .filter(|q| q.has_filter("acceptRiskStatus"))
            .cloned()
            .collect()
    }
}

pub fn hosts(ips: &[&str]) -> Vec<Value> {
    ips.iter().map(|ip| json!({"ip": ip, "score": "10"})).collect()
}

pub fn filter_value<'a>(query: &'a AnalysisQuery, field: &str) -> Option<&'a str> {
    query
        .filters
        .iter()
        .find(|f| f.field == field)
        .map(|f| f.value.as_str())
}

impl QueryClient for MockClient {
    fn fetch_all(&self, object_type: &str, _fields: &[&str]) -> Result<Vec<Value>> {
        self.fetches.borrow_mut().push(object_type.to_string());
        Ok(self.objects.get(object_type).cloned().unwrap_or_default())
    }

    fn fetch_by_id(&self, object_type: &str, id: &str, _fields: &[&str]) -> Result<Value> {
        self.fetches.borrow_mut().push(format!("{object_type}/{id}"));
        self.by_id
            .get(&(object_type.to_string(), id.to_string()))
            .cloned()
            .ok_or_else(|| ScError::MalformedQuery(format!("no {object_type} with id {id}")))
    }

    fn analysis(&self, query: &AnalysisQuery) -> Result<Vec<Value>> {
        self.queries.borrow_mut().push(query.clone());
        (self.responder)(query)
    }
}
