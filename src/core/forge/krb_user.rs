use crate::error::{Error, Result};
use std::fmt;

/// Struct to package the user identity with name and realm. The name may
/// have several components, as in `hdfs/node1.example.com`.
#[derive(Clone, Debug, PartialEq)]
pub struct KrbUser {
    pub realm: String,
    pub name: String,
}

impl KrbUser {
    pub fn new(name: String, realm: String) -> Self {
        return Self { name, realm };
    }

    /// Parses a principal in the form `name@REALM`. When the realm is
    /// missing the default realm is used, if any.
    pub fn from_principal(
        principal: &str,
        default_realm: Option<&str>,
    ) -> Result<Self> {
        let principal = principal.trim();
        let (name, realm) = match principal.rfind('@') {
            Some(pos) => (&principal[..pos], Some(&principal[pos + 1..])),
            None => (principal, None),
        };

        if name.is_empty() || name.split('/').any(|c| c.is_empty()) {
            return Err(Error::ArgumentError(format!(
                "Invalid principal '{}'",
                principal
            )));
        }

        let realm = match realm.or(default_realm) {
            Some(realm) if !realm.is_empty() => realm,
            _ => {
                return Err(Error::ArgumentError(format!(
                    "Unable to find the realm of principal '{}'",
                    principal
                )));
            }
        };

        return Ok(Self::new(name.to_string(), realm.to_string()));
    }

    /// First component of the name, `hdfs` for `hdfs/node1@EXAMPLE.COM`.
    pub fn short_name(&self) -> &str {
        return self.name.split('/').next().unwrap_or(&self.name);
    }
}

impl fmt::Display for KrbUser {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.realm)
    }
}
