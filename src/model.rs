use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Result, ScError};

// SC returns ids and epochs as strings, but older builds send bare numbers.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Decodes one server record, faulting on missing or mistyped fields.
pub fn decode<T: serde::de::DeserializeOwned>(object: &'static str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|source| ScError::MissingField { object, source })
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PluginRef {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RepositoryRef {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AssetRef {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
struct UserRef {
    username: String,
}

/// Which hosts an exception rule governs.
#[derive(Debug, Clone, PartialEq)]
pub enum HostScope {
    Ip(String),
    All,
    Asset(AssetRef),
}

/// acceptRiskRule as returned by `GET /rest/acceptRiskRule`.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct RuleRecord {
    plugin: PluginRef,
    host_type: String,
    #[serde(default)]
    host_value: Value,
    repository: RepositoryRef,
    #[serde(deserialize_with = "string_or_number")]
    port: String,
    #[serde(deserialize_with = "string_or_number")]
    protocol: String,
    #[serde(deserialize_with = "string_or_number")]
    expires: String,
    #[serde(deserialize_with = "string_or_number")]
    status: String,
    comments: String,
    #[serde(deserialize_with = "string_or_number")]
    created_time: String,
    user: UserRef,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(try_from = "RuleRecord")]
pub struct ExceptionRule {
    pub plugin: PluginRef,
    pub scope: HostScope,
    pub repository: RepositoryRef,
    pub port: String,
    pub protocol: String,
    pub expires: String,
    pub status: String,
    pub comments: String,
    pub created_time: String,
    pub created_by: String,
}

impl TryFrom<RuleRecord> for ExceptionRule {
    type Error = String;

    fn try_from(raw: RuleRecord) -> std::result::Result<Self, Self::Error> {
        let scope = match raw.host_type.as_str() {
            "ip" => match raw.host_value {
                Value::String(ip) if !ip.is_empty() => HostScope::Ip(ip),
                other => return Err(format!("ip rule without hostValue ip: {other}")),
            },
            "all" => HostScope::All,
            "asset" => HostScope::Asset(
                serde_json::from_value(raw.host_value)
                    .map_err(|e| format!("asset rule hostValue: {e}"))?,
            ),
            other => return Err(format!("unknown hostType {other:?}")),
        };
        Ok(ExceptionRule {
            plugin: raw.plugin,
            scope,
            repository: raw.repository,
            port: raw.port,
            protocol: raw.protocol,
            expires: raw.expires,
            status: raw.status,
            comments: raw.comments,
            created_time: raw.created_time,
            created_by: raw.user.username,
        })
    }
}

impl ExceptionRule {
    pub fn is_active(&self) -> bool {
        self.status == "0"
    }

    /// Port to filter verification queries on; `any` and `0` mean no filter.
    pub fn port_filter(&self) -> Option<&str> {
        match self.port.as_str() {
            "any" | "0" => None,
            port => Some(port),
        }
    }
}

/// One row of a `sumip` analysis.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct HostRow {
    pub ip: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PluginSeverity {
    pub risk_factor: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(host_type: &str, host_value: Value) -> Value {
        json!({
            "id": "7",
            "plugin": {"id": "34252", "name": "Remote Listeners", "description": ""},
            "hostType": host_type,
            "hostValue": host_value,
            "repository": {"id": "1", "name": "Servers"},
            "port": "22",
            "protocol": "6",
            "expires": "-1",
            "status": "0",
            "comments": "vendor patch pending",
            "createdTime": 1500000000,
            "modifiedTime": "1500000100",
            "user": {"id": "3", "username": "auditor"},
        })
    }

    #[test]
    fn decodes_each_host_type() {
        let rule: ExceptionRule = decode("acceptRiskRule", raw("ip", json!("10.1.1.5"))).unwrap();
        assert_eq!(rule.scope, HostScope::Ip("10.1.1.5".into()));
        assert_eq!(rule.created_time, "1500000000");
        assert_eq!(rule.created_by, "auditor");

        let rule: ExceptionRule = decode("acceptRiskRule", raw("all", json!(""))).unwrap();
        assert_eq!(rule.scope, HostScope::All);

        let rule: ExceptionRule = decode(
            "acceptRiskRule",
            raw("asset", json!({"id": 12, "name": "DMZ", "description": ""})),
        )
        .unwrap();
        assert_eq!(
            rule.scope,
            HostScope::Asset(AssetRef {
                id: "12".into(),
                name: "DMZ".into()
            })
        );
    }

    #[test]
    fn missing_field_is_a_fault() {
        let mut value = raw("ip", json!("10.1.1.5"));
        value.as_object_mut().unwrap().remove("user");
        let err = decode::<ExceptionRule>("acceptRiskRule", value).unwrap_err();
        assert!(matches!(
            err,
            ScError::MissingField {
                object: "acceptRiskRule",
                ..
            }
        ));
    }

    #[test]
    fn bad_host_type_is_a_fault() {
        assert!(decode::<ExceptionRule>("acceptRiskRule", raw("subnet", json!("x"))).is_err());
        assert!(decode::<ExceptionRule>("acceptRiskRule", raw("asset", json!("DMZ"))).is_err());
        assert!(decode::<ExceptionRule>("acceptRiskRule", raw("ip", json!(""))).is_err());
    }

    #[test]
    fn port_filter_is_binary() {
        let mut rule: ExceptionRule =
            decode("acceptRiskRule", raw("ip", json!("10.1.1.5"))).unwrap();
        assert_eq!(rule.port_filter(), Some("22"));
        rule.port = "any".into();
        assert_eq!(rule.port_filter(), None);
        rule.port = "0".into();
        assert_eq!(rule.port_filter(), None);
    }

    #[test]
    fn status_zero_is_active() {
        let mut rule: ExceptionRule =
            decode("acceptRiskRule", raw("all", Value::Null)).unwrap();
        assert!(rule.is_active());
        rule.status = "1".into();
        assert!(!rule.is_active());
    }
}
