//! Blocking SecurityCenter 5 REST client.

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::{AnalysisQuery, QueryClient};
use crate::error::{Result, ScError};

const PAGE_SIZE: usize = 1000;

#[derive(Deserialize, Debug)]
struct Envelope {
    #[serde(default)]
    response: Value,
    #[serde(default)]
    error_code: i64,
    #[serde(default)]
    error_msg: String,
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn rows(value: Value) -> Vec<Value> {
    match value {
        Value::Array(rows) => rows,
        _ => Vec::new(),
    }
}

pub fn base_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

pub fn analysis_payload(query: &AnalysisQuery, start: usize, end: usize) -> Value {
    let filters: Vec<Value> = query
        .filters
        .iter()
        .map(|f| {
            json!({
                "filterName": f.field,
                "operator": f.op,
                "value": f.value,
                "type": "vuln",
            })
        })
        .collect();
    json!({
        "type": "vuln",
        "sourceType": "cumulative",
        "query": {
            "type": "vuln",
            "tool": query.tool.as_str(),
            "startOffset": start,
            "endOffset": end,
            "filters": filters,
        },
    })
}

pub struct SecurityCenter {
    base: String,
    http: Client,
    token: String,
}

impl SecurityCenter {
    pub fn login(host: &str, username: &str, password: &str, verify_tls: bool) -> Result<Self> {
        let base = base_url(host);
        let http = Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(!verify_tls)
            .build()?;
        log::info!("logging in to {base} as {username}");
        let rsp = http
            .post(format!("{base}/rest/token"))
            .json(&json!({"username": username, "password": password}))
            .send()?;
        let response = match Self::response_of(rsp) {
            Err(ScError::MalformedQuery(msg)) => return Err(ScError::Connectivity(msg)),
            other => other?,
        };
        let token = as_string(&response["token"])
            .ok_or_else(|| ScError::Connectivity("login response carried no token".into()))?;
        Ok(SecurityCenter { base, http, token })
    }

    pub fn logout(&self) {
        let result = self
            .authed(self.http.delete(format!("{}/rest/token", self.base)))
            .send();
        match result {
            Ok(rsp) if rsp.status().is_success() => log::debug!("logged out"),
            Ok(rsp) => log::warn!("logout returned {}", rsp.status()),
            Err(e) => log::warn!("logout failed: {e}"),
        }
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("X-SecurityCenter", &self.token)
    }

    fn response_of(rsp: reqwest::blocking::Response) -> Result<Value> {
        let status = rsp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ScError::Connectivity(format!("server answered {status}")));
        }
        let text = rsp.text()?;
        let envelope: Envelope = serde_json::from_str(&text)
            .map_err(|_| ScError::MalformedQuery(format!("{status}: {text}")))?;
        if !status.is_success() || envelope.error_code != 0 {
            return Err(ScError::MalformedQuery(format!(
                "{status} (error {}): {}",
                envelope.error_code, envelope.error_msg
            )));
        }
        Ok(envelope.response)
    }

    fn get(&self, path: &str, fields: &[&str]) -> Result<Value> {
        let url = format!("{}/rest/{path}", self.base);
        log::debug!("GET {url}");
        let rsp = self
            .authed(self.http.get(url))
            .query(&[("fields", fields.join(","))])
            .send()?;
        Self::response_of(rsp)
    }
}

impl QueryClient for SecurityCenter {
    fn fetch_all(&self, object_type: &str, fields: &[&str]) -> Result<Vec<Value>> {
        Ok(rows(self.get(object_type, fields)?))
    }

    fn fetch_by_id(&self, object_type: &str, id: &str, fields: &[&str]) -> Result<Value> {
        self.get(&format!("{object_type}/{id}"), fields)
    }

    fn analysis(&self, query: &AnalysisQuery) -> Result<Vec<Value>> {
        log::debug!("analysis {query}");
        let url = format!("{}/rest/analysis", self.base);
        let mut results = Vec::new();
        let mut start = 0;
        loop {
            let payload = analysis_payload(query, start, start + PAGE_SIZE);
            let rsp = self.authed(self.http.post(&url)).json(&payload).send()?;
            let mut page = Self::response_of(rsp)?;
            let total = as_string(&page["totalRecords"])
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(0);
            let batch = rows(page.get_mut("results").map(Value::take).unwrap_or_default());
            let fetched = batch.len();
            results.extend(batch);
            start += PAGE_SIZE;
            if fetched == 0 || start >= total {
                break;
            }
        }
        Ok(results)
    }
}
