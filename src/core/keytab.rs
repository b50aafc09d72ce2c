//! Reading of keytab files: the principals they hold and the long-term keys
//! used to log in without a password.

use crate::core::KrbUser;
use crate::error::Error;
use crate::Result;
use kerberos_constants::etypes;
use kerberos_crypto::Key;
pub use kerberos_keytab::Keytab;
use std::convert::TryFrom;
use std::env;
use std::fs;
use std::path::Path;

pub const KEYTAB_ENVVAR: &'static str = "KRB5_KTNAME";

/// Keytab file named by KRB5_KTNAME, without its FILE: prefix.
pub fn env_keytab_file() -> Option<String> {
    let keytab = env::var(KEYTAB_ENVVAR).ok()?;
    let keytab = keytab.trim_start_matches("FILE:");
    if keytab.is_empty() {
        return None;
    }
    return Some(keytab.to_string());
}

/// A single keytab entry, with the principal already decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct KeytabKey {
    pub user: KrbUser,
    pub name_type: i32,
    pub vno: u32,
    pub keytype: i32,
    pub keyvalue: Vec<u8>,
}

impl KeytabKey {
    pub fn principal(&self) -> String {
        return self.user.to_string();
    }

    /// Kerberos key for the entry, if its encryption type is supported.
    pub fn to_key(&self) -> Option<Key> {
        let value = self.keyvalue.as_slice();
        match self.keytype {
            etypes::RC4_HMAC => Some(Key::RC4Key(<[u8; 16]>::try_from(value).ok()?)),
            etypes::AES128_CTS_HMAC_SHA1_96 => {
                Some(Key::AES128Key(<[u8; 16]>::try_from(value).ok()?))
            }
            etypes::AES256_CTS_HMAC_SHA1_96 => {
                Some(Key::AES256Key(<[u8; 32]>::try_from(value).ok()?))
            }
            _ => None,
        }
    }
}

pub fn load_file_keytab(filepath: &Path) -> Result<Keytab> {
    let data = fs::read(filepath).map_err(|err| {
        let message =
            format!("Unable to read the file '{}'", filepath.display());
        (message, err)
    })?;

    match Keytab::parse(&data) {
        Ok((rest, keytab)) if rest.is_empty() && is_known_format(&keytab) => {
            return Ok(keytab);
        }
        _ => {
            return Err(Error::DataError(format!(
                "Error parsing keytab file '{}'",
                filepath.display()
            )));
        }
    }
}

/// Keytab files start with 0x05 followed by format version 1 or 2.
fn is_known_format(keytab: &Keytab) -> bool {
    return keytab.kversion == 5 && (keytab.version == 1 || keytab.version == 2);
}

pub fn load_keytab_keys(filepath: &Path) -> Result<Vec<KeytabKey>> {
    return keytab_keys(load_file_keytab(filepath)?);
}

pub fn keytab_keys(keytab: Keytab) -> Result<Vec<KeytabKey>> {
    let mut keys = Vec::with_capacity(keytab.entries.len());

    for entry in keytab.entries {
        let realm = String::from_utf8(entry.realm.data).map_err(|_| {
            Error::DataError(format!("Invalid realm in keytab entry"))
        })?;

        let mut components = Vec::with_capacity(entry.components.len());
        for component in entry.components {
            components.push(String::from_utf8(component.data).map_err(|_| {
                Error::DataError(format!("Invalid principal in keytab entry"))
            })?);
        }

        keys.push(KeytabKey {
            user: KrbUser::new(components.join("/"), realm),
            name_type: entry.name_type as i32,
            vno: entry.vno.unwrap_or(entry.vno8 as u32),
            keytype: entry.key.keytype as i32,
            keyvalue: entry.key.keyvalue,
        });
    }

    return Ok(keys);
}

/// Principal of the first entry of the keytab, if any.
pub fn find_principal_from_keytab(filepath: &Path) -> Result<Option<String>> {
    let keys = load_keytab_keys(filepath)?;
    return Ok(keys.first().map(|k| k.principal()));
}

/// Chooses the key of the user: the newest key version and, among those,
/// the strongest encryption type.
pub fn select_key(keys: &[KeytabKey], user: &KrbUser) -> Result<Key> {
    return keys
        .iter()
        .filter(|k| {
            k.user.name == user.name
                && k.user.realm.eq_ignore_ascii_case(&user.realm)
        })
        .filter_map(|k| Some((k.vno, etype_strength(k.keytype), k.to_key()?)))
        .max_by_key(|(vno, strength, _)| (*vno, *strength))
        .map(|(_, _, key)| key)
        .ok_or_else(|| {
            Error::DataError(format!(
                "No supported key found for principal {} in keytab",
                user
            ))
        });
}

fn etype_strength(etype: i32) -> u8 {
    match etype {
        etypes::AES256_CTS_HMAC_SHA1_96 => 3,
        etypes::AES128_CTS_HMAC_SHA1_96 => 2,
        etypes::RC4_HMAC => 1,
        _ => 0,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    pub struct RawEntry<'a> {
        pub components: &'a [&'a str],
        pub realm: &'a str,
        pub vno: u32,
        pub keytype: u16,
        pub key: Vec<u8>,
    }

    fn push_counted(raw: &mut Vec<u8>, data: &[u8]) {
        raw.extend_from_slice(&(data.len() as u16).to_be_bytes());
        raw.extend_from_slice(data);
    }

    /// Raw keytab in the 0x502 file format.
    pub fn raw_keytab(entries: &[RawEntry]) -> Vec<u8> {
        let mut raw = vec![0x05, 0x02];
        for entry in entries {
            let mut body = Vec::new();
            body.extend_from_slice(&(entry.components.len() as u16).to_be_bytes());
            push_counted(&mut body, entry.realm.as_bytes());
            for component in entry.components {
                push_counted(&mut body, component.as_bytes());
            }
            body.extend_from_slice(&1u32.to_be_bytes());
            body.extend_from_slice(&1566000000u32.to_be_bytes());
            body.push(entry.vno as u8);
            body.extend_from_slice(&entry.keytype.to_be_bytes());
            push_counted(&mut body, &entry.key);
            body.extend_from_slice(&entry.vno.to_be_bytes());

            raw.extend_from_slice(&(body.len() as i32).to_be_bytes());
            raw.extend_from_slice(&body);
        }
        return raw;
    }

    pub fn write_keytab(path: &Path, entries: &[RawEntry]) {
        let mut file = fs::File::create(path).unwrap();
        file.write_all(&raw_keytab(entries)).unwrap();
    }

    pub fn hue_entries() -> Vec<RawEntry<'static>> {
        return vec![
            RawEntry {
                components: &["hue", "10.11.159.156"],
                realm: "OTOCYON.COM",
                vno: 1,
                keytype: 23,
                key: vec![1; 16],
            },
            RawEntry {
                components: &["hue", "10.11.159.156"],
                realm: "OTOCYON.COM",
                vno: 2,
                keytype: 17,
                key: vec![2; 16],
            },
            RawEntry {
                components: &["hue", "10.11.159.156"],
                realm: "OTOCYON.COM",
                vno: 2,
                keytype: 18,
                key: vec![3; 32],
            },
            RawEntry {
                components: &["hdfs"],
                realm: "OTOCYON.COM",
                vno: 5,
                keytype: 23,
                key: vec![4; 16],
            },
        ];
    }

    #[test]
    fn test_find_principal_from_keytab() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hue.keytab");
        write_keytab(&path, &hue_entries());

        assert_eq!(
            Some("hue/10.11.159.156@OTOCYON.COM".to_string()),
            find_principal_from_keytab(&path).unwrap()
        );
    }

    #[test]
    fn test_empty_keytab_has_no_principal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.keytab");
        write_keytab(&path, &[]);

        assert_eq!(None, find_principal_from_keytab(&path).unwrap());
    }

    #[test]
    fn test_select_newest_and_strongest_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hue.keytab");
        write_keytab(&path, &hue_entries());
        let keys = load_keytab_keys(&path).unwrap();
        assert_eq!(4, keys.len());

        let hue = KrbUser::new("hue/10.11.159.156".into(), "OTOCYON.COM".into());
        match select_key(&keys, &hue).unwrap() {
            Key::AES256Key(key) => assert_eq!([3; 32], key),
            other => panic!("unexpected key {:?}", other),
        }

        let hdfs = KrbUser::new("hdfs".into(), "otocyon.com".into());
        match select_key(&keys, &hdfs).unwrap() {
            Key::RC4Key(key) => assert_eq!([4; 16], key),
            other => panic!("unexpected key {:?}", other),
        }

        let hive = KrbUser::new("hive".into(), "OTOCYON.COM".into());
        assert!(select_key(&keys, &hive).unwrap_err().is_data_error());
    }

    #[test]
    fn test_unsupported_or_malformed_keys_are_skipped() {
        let key = KeytabKey {
            user: KrbUser::new("hdfs".into(), "EXAMPLE.COM".into()),
            name_type: 1,
            vno: 1,
            keytype: 18,
            keyvalue: vec![0; 16],
        };
        assert!(key.to_key().is_none());

        let des = KeytabKey {
            keytype: 3,
            keyvalue: vec![0; 8],
            ..key
        };
        assert!(des.to_key().is_none());
    }

    #[test]
    fn test_garbage_keytab() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.keytab");
        fs::write(&path, b"not a keytab").unwrap();
        assert!(load_file_keytab(&path).unwrap_err().is_data_error());

        fs::write(&path, b"").unwrap();
        assert!(load_file_keytab(&path).unwrap_err().is_data_error());
    }

    #[test]
    fn test_truncated_keytab() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("truncated.keytab");
        let raw = raw_keytab(&hue_entries());
        fs::write(&path, &raw[..raw.len() - 10]).unwrap();

        assert!(load_file_keytab(&path).unwrap_err().is_data_error());
        assert!(find_principal_from_keytab(&path).is_err());
    }

    #[test]
    fn test_unknown_keytab_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v9.keytab");
        let mut raw = raw_keytab(&hue_entries());
        raw[1] = 0x09;
        fs::write(&path, &raw).unwrap();

        assert!(load_file_keytab(&path).unwrap_err().is_data_error());
    }
}
