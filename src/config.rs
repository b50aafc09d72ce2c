//! Configuration of the credential source: where the keytab and krb5 files
//! live and how to reach the SFTP server that holds them.
//!
//! The configuration is usually shipped as a JSON object inside the job
//! description, for example:
//!
//! ```json
//! {
//!     "principalFile": "keytab.keytab",
//!     "remoteDir": "/home/admin",
//!     "sftpConf": {
//!         "host": "127.0.0.1",
//!         "port": "22",
//!         "auth": "1",
//!         "username": "admin",
//!         "password": "******",
//!         "path": "/home/admin"
//!     }
//! }
//! ```

use crate::communication::TransportProtocol;
use crate::error::{Error, Result};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

pub const KEY_PRINCIPAL: &str = "principal";
pub const KEY_PRINCIPAL_FILE: &str = "principalFile";
pub const KEY_REMOTE_DIR: &str = "remoteDir";
pub const KEY_USE_LOCAL_FILE: &str = "useLocalFile";
pub const KEY_SFTP_CONF: &str = "sftpConf";
pub const KEY_KRB5_CONF: &str = "java.security.krb5.conf";

pub const DEFAULT_SFTP_PORT: u16 = 22;
pub const DEFAULT_SFTP_TIMEOUT_MS: u64 = 10000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KerberosConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_dir: Option<String>,

    #[serde(default, deserialize_with = "bool_from_any")]
    pub use_local_file: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sftp_conf: Option<SftpConfig>,

    #[serde(
        default,
        rename = "java.security.krb5.conf",
        alias = "krb5Conf",
        skip_serializing_if = "Option::is_none"
    )]
    pub krb5_conf: Option<String>,

    /// Principal of the service identity used to create proxy users.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_principal: Option<String>,

    /// KDC address (host[:port]) of the login realm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kdc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kdc_transport: Option<String>,

    /// File where the obtained tickets are stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cred_cache: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl KerberosConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|err| {
            let message =
                format!("Unable to read the file '{}'", path.display());
            (message, err)
        })?;

        return serde_json::from_slice(&data).map_err(|err| {
            Error::DataError(format!(
                "Error parsing configuration file '{}': {}",
                path.display(),
                err
            ))
        });
    }

    pub fn from_json_str(data: &str) -> Result<Self> {
        return serde_json::from_str(data).map_err(|err| {
            Error::DataError(format!("Error parsing configuration: {}", err))
        });
    }

    pub fn from_map(map: Map<String, Value>) -> Result<Self> {
        return serde_json::from_value(Value::Object(map)).map_err(|err| {
            Error::DataError(format!("Error parsing configuration: {}", err))
        });
    }

    pub fn principal(&self) -> Option<&str> {
        return non_empty(&self.principal);
    }

    pub fn principal_file(&self) -> Option<&str> {
        return non_empty(&self.principal_file);
    }

    pub fn remote_dir(&self) -> Option<&str> {
        return non_empty(&self.remote_dir);
    }

    pub fn krb5_conf(&self) -> Option<&str> {
        return non_empty(&self.krb5_conf);
    }

    pub fn server_principal(&self) -> Option<&str> {
        return non_empty(&self.server_principal);
    }

    pub fn kdc(&self) -> Option<&str> {
        return non_empty(&self.kdc);
    }

    pub fn cred_cache(&self) -> Option<&str> {
        return non_empty(&self.cred_cache);
    }

    pub fn kdc_transport(&self) -> Result<TransportProtocol> {
        match non_empty(&self.kdc_transport) {
            None => return Ok(TransportProtocol::TCP),
            Some(protocol) => match protocol.to_lowercase().as_str() {
                "tcp" => return Ok(TransportProtocol::TCP),
                "udp" => return Ok(TransportProtocol::UDP),
                _ => {
                    return Err(Error::ArgumentError(format!(
                        "Unknown KDC transport '{}', must be tcp or udp",
                        protocol
                    )))
                }
            },
        }
    }

    pub fn sftp_conf(&self) -> Result<&SftpConfig> {
        return self.sftp_conf.as_ref().ok_or_else(|| {
            Error::ArgumentError(format!("[{}] must be specified", KEY_SFTP_CONF))
        });
    }
}

/// Way of authenticating against the SFTP server.
#[derive(Debug, Clone, PartialEq)]
pub enum SftpAuth<'a> {
    Password(&'a str),
    PublicKey {
        key_path: &'a str,
        passphrase: Option<&'a str>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SftpConfig {
    pub host: String,

    #[serde(default = "default_sftp_port", deserialize_with = "port_from_any")]
    pub port: u16,

    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// "1" for password, "2" for private key.
    #[serde(
        default,
        deserialize_with = "string_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub auth: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsa_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Connection timeout in milliseconds.
    #[serde(
        default = "default_sftp_timeout",
        deserialize_with = "u64_from_any"
    )]
    pub timeout: u64,
}

impl SftpConfig {
    pub fn new(host: String, port: u16, username: String) -> Self {
        return Self {
            host,
            port,
            username,
            password: None,
            auth: None,
            rsa_path: None,
            passphrase: None,
            path: None,
            timeout: DEFAULT_SFTP_TIMEOUT_MS,
        };
    }

    pub fn auth_method(&self) -> Result<SftpAuth> {
        match non_empty(&self.auth).unwrap_or("1") {
            "1" => {
                let password = non_empty(&self.password).ok_or_else(|| {
                    Error::ArgumentError(format!(
                        "SFTP password required for {}@{}",
                        self.username, self.host
                    ))
                })?;
                return Ok(SftpAuth::Password(password));
            }
            "2" => {
                let key_path = non_empty(&self.rsa_path).ok_or_else(|| {
                    Error::ArgumentError(format!(
                        "SFTP rsaPath required for {}@{}",
                        self.username, self.host
                    ))
                })?;
                return Ok(SftpAuth::PublicKey {
                    key_path,
                    passphrase: non_empty(&self.passphrase),
                });
            }
            auth => {
                return Err(Error::ArgumentError(format!(
                    "Unknown SFTP auth type '{}'",
                    auth
                )));
            }
        }
    }
}

pub fn non_empty(value: &Option<String>) -> Option<&str> {
    return value.as_deref().filter(|s| !s.is_empty());
}

fn default_sftp_port() -> u16 {
    DEFAULT_SFTP_PORT
}

fn default_sftp_timeout() -> u64 {
    DEFAULT_SFTP_TIMEOUT_MS
}

/// Accepts `true`, `"true"` or a non-zero number, as map-style configs do.
fn bool_from_any<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(b),
        Value::String(s) => Ok(s.trim().eq_ignore_ascii_case("true")),
        Value::Number(n) => Ok(n.as_f64().map(|n| n != 0.0).unwrap_or(false)),
        other => Err(de::Error::custom(format!(
            "invalid boolean value: {}",
            other
        ))),
    }
}

fn u64_from_any<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| de::Error::custom(format!("invalid number: {}", n))),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| de::Error::custom(format!("invalid number: {}", s))),
        other => {
            Err(de::Error::custom(format!("invalid number: {}", other)))
        }
    }
}

fn port_from_any<'de, D>(deserializer: D) -> std::result::Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    let port = u64_from_any(deserializer)?;
    if port > u16::MAX as u64 {
        return Err(de::Error::custom(format!("invalid port: {}", port)));
    }
    return Ok(port as u16);
}

fn string_from_any<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(de::Error::custom(format!("invalid string: {}", other))),
    }
}
