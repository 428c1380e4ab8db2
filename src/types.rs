use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Permission level of a user within an organization.
///
/// Role names this crate does not know are kept verbatim in [`Role::Other`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum Role {
    /// No role assigned: an empty string, `null`, or a missing field.
    #[default]
    None,
    Admin,
    Partner,
    User,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "",
            Self::Admin => "admin",
            Self::Partner => "partner",
            Self::User => "user",
            Self::Other(name) => name,
        }
    }
}

impl From<Option<String>> for Role {
    fn from(value: Option<String>) -> Self {
        match value.as_deref() {
            None | Some("") => Self::None,
            Some("admin") => Self::Admin,
            Some("partner") => Self::Partner,
            Some("user") => Self::User,
            Some(_) => Self::Other(value.unwrap_or_default()),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

/// Node of the organization tree.
///
/// Children are owned by value; a child refers to its parent by id only.
///
/// In every record a missing or `null` field decodes to the field's default.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Organization {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    pub parent_id: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(deserialize_with = "null_as_default")]
    pub realm: String,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: DateTime<Utc>,
    #[serde(deserialize_with = "null_as_default")]
    pub organizations: Vec<Organization>,
}

impl Organization {
    /// Depth-first iterator over this organization and all its descendants.
    pub fn descendants(&self) -> impl Iterator<Item = &Organization> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.organizations.iter().rev());
            Some(next)
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Application {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub write_access: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub organization: Option<Organization>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: DateTime<Utc>,
    #[serde(deserialize_with = "null_as_default")]
    pub identity_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub admin: bool,
}

/// Association of a user to an organization with a role.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Membership {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    pub role: Role,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: DateTime<Utc>,
    #[serde(deserialize_with = "null_as_default")]
    pub organization_id: i64,
    pub user: Option<User>,
    pub organization: Option<Organization>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
