//! Expands accept-risk rules into per-host rows and re-checks each host
//! against live vulnerability data.

use serde::{Serialize, Serializer};

use crate::client::{AnalysisQuery, QueryClient, Tool};
use crate::epoch::{format_epoch, format_expiry};
use crate::error::Result;
use crate::model::{decode, ExceptionRule, HostRow, HostScope, PluginSeverity};

pub const RULE_OBJECT: &str = "acceptRiskRule";
pub const RULE_FIELDS: &[&str] = &[
    "plugin",
    "hostValue",
    "hostType",
    "port",
    "protocol",
    "repository",
    "user",
    "comments",
    "expires",
    "createdTime",
    "modifiedTime",
    "status",
    "organization",
];
pub const ALL_HOSTS: &str = "All Hosts";

/// Which optional columns a rule report carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub include_severity: bool,
    pub include_repository_name: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            include_severity: true,
            include_repository_name: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleStatus {
    Active,
    Inactive,
}

impl RuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleStatus::Active => "Active",
            RuleStatus::Inactive => "Inactive",
        }
    }
}

impl Serialize for RuleStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostTarget {
    pub ip: String,
    pub label: String,
}

fn title_bool<S: Serializer>(value: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "True" } else { "False" })
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ReconciliationRecord {
    #[serde(rename = "IP")]
    pub ip: String,
    #[serde(rename = "RepoName", skip_serializing_if = "Option::is_none")]
    pub repository_name: Option<String>,
    #[serde(rename = "RuleApplies", serialize_with = "title_bool")]
    pub currently_applies: bool,
    #[serde(rename = "RuleStatus")]
    pub rule_status: RuleStatus,
    #[serde(rename = "RuleTarget")]
    pub rule_target: String,
    #[serde(rename = "Protocol")]
    pub protocol: String,
    #[serde(rename = "Port")]
    pub port: String,
    #[serde(rename = "Expires")]
    pub expires_display: String,
    #[serde(rename = "PluginID")]
    pub plugin_id: String,
    #[serde(rename = "Severity", skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(rename = "PluginName")]
    pub plugin_name: String,
    #[serde(rename = "Comments")]
    pub comments: String,
    #[serde(rename = "CreatedTime")]
    pub created_display: String,
    #[serde(rename = "CreatedBy")]
    pub created_by: String,
}

pub fn fetch_rules<C: QueryClient + ?Sized>(client: &C) -> Result<Vec<ExceptionRule>> {
    log::info!("getting accept risk rules");
    client
        .fetch_all(RULE_OBJECT, RULE_FIELDS)?
        .into_iter()
        .map(|value| decode(RULE_OBJECT, value))
        .collect()
}

pub fn fetch_severity<C: QueryClient + ?Sized>(client: &C, plugin_id: &str) -> Result<String> {
    let value = client.fetch_by_id("plugin", plugin_id, &["riskFactor"])?;
    let severity: PluginSeverity = decode("plugin", value)?;
    Ok(severity.risk_factor)
}

fn live_hosts<C: QueryClient + ?Sized>(
    client: &C,
    query: &AnalysisQuery,
    label: &str,
) -> Result<Vec<HostTarget>> {
    client
        .analysis(query)?
        .into_iter()
        .map(|value| {
            let row: HostRow = decode("sumip", value)?;
            Ok(HostTarget {
                ip: row.ip,
                label: label.to_string(),
            })
        })
        .collect()
}

/// Hosts the rule governs right now, in the order the server lists them.
pub fn resolve_hosts<C: QueryClient + ?Sized>(
    client: &C,
    rule: &ExceptionRule,
) -> Result<Vec<HostTarget>> {
    match &rule.scope {
        HostScope::Ip(ip) => Ok(vec![HostTarget {
            ip: ip.clone(),
            label: ip.clone(),
        }]),
        HostScope::All => {
            let query =
                AnalysisQuery::new(Tool::SumIp).filter("repositoryIDs", &rule.repository.id);
            live_hosts(client, &query, ALL_HOSTS)
        }
        HostScope::Asset(asset) => {
            // Assets are not repository scoped, yet this is still narrowed to the
            // rule's repository. Kept until product confirms it is intended.
            let query = AnalysisQuery::new(Tool::SumIp)
                .filter("assetID", &asset.id)
                .filter("repositoryIDs", &rule.repository.id);
            live_hosts(client, &query, &format!("Asset: {}", asset.name))
        }
    }
}

pub fn verification_query(rule: &ExceptionRule, ip: &str) -> AnalysisQuery {
    let asset_id = match &rule.scope {
        HostScope::Asset(asset) => Some(asset.id.as_str()),
        _ => None,
    };
    AnalysisQuery::new(Tool::SumIp)
        .filter("acceptRiskStatus", "accepted")
        .filter("pluginID", &rule.plugin.id)
        .filter_opt("port", rule.port_filter())
        .filter_opt("assetID", asset_id)
        .filter("ip", ip)
}

/// True when an accepted finding for the rule's plugin still exists on `ip`.
pub fn still_applies<C: QueryClient + ?Sized>(
    client: &C,
    rule: &ExceptionRule,
    ip: &str,
) -> Result<bool> {
    Ok(!client.analysis(&verification_query(rule, ip))?.is_empty())
}

pub fn reconcile<C: QueryClient + ?Sized>(
    rules: &[ExceptionRule],
    client: &C,
    options: &ReportOptions,
) -> Result<Vec<ReconciliationRecord>> {
    let mut records = Vec::new();
    for rule in rules {
        let expires_display = format_expiry(&rule.expires)?;
        let created_display = format_epoch(&rule.created_time)?;
        let rule_status = if rule.is_active() {
            RuleStatus::Active
        } else {
            RuleStatus::Inactive
        };
        let severity = if options.include_severity {
            Some(fetch_severity(client, &rule.plugin.id)?)
        } else {
            None
        };
        let repository_name = options
            .include_repository_name
            .then(|| rule.repository.name.clone());

        let hosts = resolve_hosts(client, rule)?;
        log::debug!(
            "plugin {} rule resolved to {} host(s)",
            rule.plugin.id,
            hosts.len()
        );
        for host in hosts {
            let currently_applies = still_applies(client, rule, &host.ip)?;
            records.push(ReconciliationRecord {
                ip: host.ip,
                repository_name: repository_name.clone(),
                currently_applies,
                rule_status,
                rule_target: host.label,
                protocol: rule.protocol.clone(),
                port: rule.port.clone(),
                expires_display: expires_display.clone(),
                plugin_id: rule.plugin.id.clone(),
                severity: severity.clone(),
                plugin_name: rule.plugin.name.clone(),
                comments: rule.comments.clone(),
                created_display: created_display.clone(),
                created_by: rule.created_by.clone(),
            });
        }
    }
    log::info!(
        "{} rule(s) reconciled into {} row(s)",
        rules.len(),
        records.len()
    );
    Ok(records)
}
