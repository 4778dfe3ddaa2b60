use serde::{Deserialize, Serialize};

use crate::client::QueryClient;
use crate::error::Result;
use crate::model::decode;

pub const USER_OBJECT: &str = "user";
pub const USER_FIELDS: &[&str] = &["id", "username", "firstname", "lastname", "status", "role", "group"];

#[derive(Deserialize, Debug)]
struct NamedRef {
    name: String,
}

#[derive(Deserialize, Debug)]
struct UserObject {
    id: serde_json::Value,
    username: String,
    firstname: String,
    lastname: String,
    role: NamedRef,
    group: NamedRef,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UserRecord {
    #[serde(rename = "userID")]
    pub user_id: String,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub role: String,
    pub group: String,
}

impl UserObject {
    fn into_record(self) -> UserRecord {
        let user_id = match self.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        UserRecord {
            user_id,
            username: self.username,
            firstname: self.firstname,
            lastname: self.lastname,
            role: self.role.name,
            group: self.group.name,
        }
    }
}

pub fn fetch_users<C: QueryClient + ?Sized>(client: &C) -> Result<Vec<UserRecord>> {
    log::info!("getting list of users");
    client
        .fetch_all(USER_OBJECT, USER_FIELDS)?
        .into_iter()
        .map(|value| decode::<UserObject>(USER_OBJECT, value).map(UserObject::into_record))
        .collect()
}
