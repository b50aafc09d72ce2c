//! Minimal reader of the MIT krb5.conf format, limited to what the login
//! needs: the default realm and the KDCs of each realm.

use crate::error::{Error, Result};
use lazy_static::lazy_static;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::sync::RwLock;

pub const KRB5_CONFIG_ENVVAR: &str = "KRB5_CONFIG";
pub const DEFAULT_KRB5_CONF: &str = "/etc/krb5.conf";

lazy_static! {
    static ref CURRENT_KRB5_CONF: RwLock<Option<Krb5Conf>> = RwLock::new(None);
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Krb5Conf {
    pub default_realm: Option<String>,
    realms: HashMap<String, Vec<String>>,
}

impl Krb5Conf {
    pub fn load(path: &str) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|err| {
            let message = format!("Unable to read the file '{}'", path);
            (message, err)
        })?;

        return Self::parse(&data).map_err(|err| {
            Error::DataError(format!("Error parsing '{}': {}", path, err))
        });
    }

    pub fn parse(data: &str) -> Result<Self> {
        let mut conf = Self::default();
        let mut section = String::new();
        let mut current_realm: Option<String> = None;
        let mut depth = 0;

        for (i, raw_line) in data.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';')
            {
                continue;
            }

            if depth == 0 && line.starts_with('[') {
                let end = line.find(']').ok_or_else(|| {
                    Error::DataError(format!(
                        "line {}: unclosed section header",
                        i + 1
                    ))
                })?;
                section = line[1..end].trim().to_lowercase();
                continue;
            }

            if line == "}" {
                if depth == 0 {
                    return Err(Error::DataError(format!(
                        "line {}: unexpected '}}'",
                        i + 1
                    )));
                }
                depth -= 1;
                if depth == 0 {
                    current_realm = None;
                }
                continue;
            }

            let (key, value) = match split_relation(line) {
                Some(relation) => relation,
                None if depth == 0 && is_directive(line) => {
                    debug!("Ignoring krb5 directive '{}'", line);
                    continue;
                }
                None if section != "realms" => {
                    debug!("Ignoring line {} of [{}]: {}", i + 1, section, line);
                    continue;
                }
                None => {
                    return Err(Error::DataError(format!(
                        "line {}: expected 'key = value'",
                        i + 1
                    )));
                }
            };

            if value == "{" {
                if depth == 0 && section == "realms" {
                    current_realm = Some(key.to_uppercase());
                }
                depth += 1;
                continue;
            }

            match (section.as_str(), depth, &current_realm) {
                ("libdefaults", 0, _) if key == "default_realm" => {
                    conf.default_realm = Some(value.to_string());
                }
                ("realms", 1, Some(realm)) if key == "kdc" => {
                    conf.realms
                        .entry(realm.clone())
                        .or_insert_with(Vec::new)
                        .push(value.to_string());
                }
                _ => {}
            }
        }

        if depth != 0 {
            return Err(Error::DataError("unbalanced braces".into()));
        }

        return Ok(conf);
    }

    pub fn kdcs(&self, realm: &str) -> &[String] {
        return self
            .realms
            .get(&realm.to_uppercase())
            .map(|kdcs| kdcs.as_slice())
            .unwrap_or(&[]);
    }
}

/// Top-level include and plugin directives. Included files are not
/// followed.
fn is_directive(line: &str) -> bool {
    let directive = line.split_whitespace().next().unwrap_or("");
    return directive == "include"
        || directive == "includedir"
        || directive == "module";
}

fn split_relation(line: &str) -> Option<(&str, &str)> {
    let mut parts = line.splitn(2, '=');
    let key = parts.next()?.trim();
    let value = parts.next()?.trim();
    if key.is_empty() {
        return None;
    }
    return Some((key, value));
}

/// Points the process to a new krb5 file and refreshes the parsed realm
/// configuration. A file that cannot be loaded keeps the previous one.
pub fn reload_krb5_conf(path: &str) {
    info!("Set krb5 file {}", path);
    env::set_var(KRB5_CONFIG_ENVVAR, path);

    match Krb5Conf::load(path) {
        Ok(conf) => store_krb5_conf(conf),
        Err(err) => warn!("Reload krb5 file {} error: {}", path, err),
    }
}

/// Realm configuration currently in use by the process. Loaded lazily from
/// KRB5_CONFIG or the system default file.
pub fn current_krb5_conf() -> Option<Krb5Conf> {
    if let Ok(current) = CURRENT_KRB5_CONF.read() {
        if current.is_some() {
            return current.clone();
        }
    }

    let path = env::var(KRB5_CONFIG_ENVVAR)
        .unwrap_or_else(|_| DEFAULT_KRB5_CONF.to_string());

    match Krb5Conf::load(&path) {
        Ok(conf) => {
            store_krb5_conf(conf.clone());
            return Some(conf);
        }
        Err(err) => {
            debug!("No krb5 configuration available: {}", err);
            return None;
        }
    }
}

fn store_krb5_conf(conf: Krb5Conf) {
    if let Ok(mut current) = CURRENT_KRB5_CONF.write() {
        *current = Some(conf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const KRB5_CONF: &str = "
# sample
[libdefaults]
  default_realm = OTOCYON.COM
  dns_lookup_kdc = false

[realms]
  OTOCYON.COM = {
    kdc = kdc1.otocyon.com:88
    kdc = kdc2.otocyon.com
    admin_server = kdc1.otocyon.com
  }
  example.org = {
    kdc = 10.0.0.1
    v4_name_convert = {
      host = {
        rcmd = host
      }
    }
  }

[domain_realm]
  .otocyon.com = OTOCYON.COM
";

    #[test]
    fn test_parse_krb5_conf() {
        let conf = Krb5Conf::parse(KRB5_CONF).unwrap();
        assert_eq!(Some("OTOCYON.COM".to_string()), conf.default_realm);
        assert_eq!(
            &["kdc1.otocyon.com:88".to_string(), "kdc2.otocyon.com".to_string()],
            conf.kdcs("otocyon.com")
        );
        assert_eq!(&["10.0.0.1".to_string()], conf.kdcs("EXAMPLE.ORG"));
        assert!(conf.kdcs("OTHER.COM").is_empty());
    }

    #[test]
    fn test_parse_unbalanced() {
        assert!(Krb5Conf::parse("[realms]\n A = {\n kdc = x\n").is_err());
        assert!(Krb5Conf::parse("[realms]\n }\n").is_err());
        assert!(Krb5Conf::parse("[realms]\n garbage\n").is_err());
    }

    #[test]
    fn test_parse_include_directives() {
        let conf = Krb5Conf::parse(
            "includedir /etc/krb5.conf.d/
include /etc/krb5.extra.conf
module /usr/lib/krb5/plugin.so:residual

[logging]
  default = FILE:/var/log/krb5libs.log

[libdefaults]
  default_realm = OTOCYON.COM
  bare_flag

[realms]
  OTOCYON.COM = {
    kdc = kdc1.otocyon.com
  }
",
        )
        .unwrap();
        assert_eq!(Some("OTOCYON.COM".to_string()), conf.default_realm);
        assert_eq!(&["kdc1.otocyon.com".to_string()], conf.kdcs("OTOCYON.COM"));
    }

    #[test]
    fn test_reload_krb5_conf() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(KRB5_CONF.as_bytes()).unwrap();
        let path = file.path().to_str().unwrap().to_string();

        reload_krb5_conf(&path);

        assert_eq!(path, env::var(KRB5_CONFIG_ENVVAR).unwrap());
        let current = current_krb5_conf().unwrap();
        assert_eq!(Some("OTOCYON.COM".to_string()), current.default_realm);

        // a file that cannot be read or parsed keeps the previous realms
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.conf");
        let missing = missing.to_str().unwrap();
        reload_krb5_conf(missing);
        assert_eq!(missing, env::var(KRB5_CONFIG_ENVVAR).unwrap());
        let current = current_krb5_conf().unwrap();
        assert_eq!(Some("OTOCYON.COM".to_string()), current.default_realm);

        let broken = dir.path().join("broken.conf");
        fs::write(&broken, "[realms]\n  OTHER.COM = {\n    kdc = x\n").unwrap();
        reload_krb5_conf(broken.to_str().unwrap());
        let current = current_krb5_conf().unwrap();
        assert_eq!(Some("OTOCYON.COM".to_string()), current.default_realm);
        assert_eq!(2, current.kdcs("OTOCYON.COM").len());
    }
}
