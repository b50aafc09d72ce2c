use super::Vault;
use crate::core::CredFormat;
use crate::core::TicketCreds;
use crate::error::Error;
use crate::Result;
use kerberos_asn1::{Asn1Object, KrbCred};
use kerberos_ccache::CCache;
use std::convert::{TryFrom, TryInto};
use std::fs;

/// Credentials stored in a ccache or krb file.
pub struct FileVault {
    file_path: String,
}

impl FileVault {
    pub fn new(file_path: String) -> Self {
        return Self { file_path };
    }

    fn get_cred_format(&self) -> Result<CredFormat> {
        return get_file_cred_format(&self.file_path);
    }
}

impl Vault for FileVault {
    fn id(&self) -> &str {
        return &self.file_path;
    }

    fn dump(&self) -> Result<TicketCreds> {
        return load_file_creds(&self.file_path);
    }

    fn save(&self, creds: TicketCreds) -> Result<()> {
        return self.save_as(creds, self.get_cred_format()?);
    }

    fn save_as(
        &self,
        creds: TicketCreds,
        cred_format: CredFormat,
    ) -> Result<()> {
        return save_file_creds(&self.file_path, creds, cred_format);
    }
}

/// Loads the credentials of a file. A missing or unparseable file counts
/// as empty.
pub fn load_file_creds(creds_file: &str) -> Result<TicketCreds> {
    match load_file_ticket_creds(creds_file) {
        Ok((ticket_creds, _)) => return Ok(ticket_creds),
        Err(err) => {
            if err.is_not_found_error() || err.is_data_error() {
                return Ok(TicketCreds::empty());
            }
            return Err(err);
        }
    }
}

/// Deduce the credentials format based on the file content and file
/// extension, ccache by default.
pub fn get_file_cred_format(creds_file: &str) -> Result<CredFormat> {
    match load_file_krb_cred(creds_file) {
        Ok((_, cred_format)) => return Ok(cred_format),
        Err(err) => {
            if err.is_not_found_error() || err.is_data_error() {
                return Ok(CredFormat::from_file_extension(creds_file)
                    .unwrap_or(CredFormat::Ccache));
            }

            return Err(err);
        }
    }
}

/// Load the Ticket credentials from a file
pub fn load_file_ticket_creds(
    creds_file: &str,
) -> Result<(TicketCreds, CredFormat)> {
    let (krb_cred, format) = load_file_krb_cred(creds_file)?;

    // Kerberos credentials are usually stored in plain text so this
    // should work.
    let ticket_creds = TicketCreds::try_from(krb_cred)?;
    return Ok((ticket_creds, format));
}

/// Load the Kerberos credentials from a file.
pub fn load_file_krb_cred(creds_file: &str) -> Result<(KrbCred, CredFormat)> {
    let data = fs::read(creds_file).map_err(|err| {
        let message = format!("Unable to read the file '{}'", creds_file);
        (message, err)
    })?;

    match CCache::parse(&data) {
        Ok((_, ccache)) => {
            let krb_cred = ccache.try_into().map_err(|_| {
                Error::DataError(format!(
                    "Error parsing ccache data content of file '{}'",
                    creds_file
                ))
            })?;

            return Ok((krb_cred, CredFormat::Ccache));
        }
        Err(_) => {
            let (_, krb_cred) = KrbCred::parse(&data).map_err(|_| {
                Error::DataError(format!(
                    "Error parsing content of ccache/krb file '{}'",
                    creds_file
                ))
            })?;
            return Ok((krb_cred, CredFormat::Krb));
        }
    }
}

pub fn save_file_creds(
    creds_file: &str,
    creds: TicketCreds,
    cred_format: CredFormat,
) -> Result<()> {
    let krb_cred = creds.into();
    return save_file_krb_cred(creds_file, krb_cred, cred_format);
}

/// Save the Kerberos credentials in the file with the specified format.
pub fn save_file_krb_cred(
    creds_file: &str,
    krb_cred: KrbCred,
    cred_format: CredFormat,
) -> Result<()> {
    let raw_cred = match cred_format {
        CredFormat::Krb => krb_cred.build(),
        CredFormat::Ccache => {
            let ccache: CCache = krb_cred.try_into().map_err(|_| {
                Error::DataError(format!("Error converting KrbCred to CCache"))
            })?;
            ccache.build()
        }
    };

    fs::write(creds_file, raw_cred).map_err(|err| {
        let message =
            format!("Unable to write credentials in file {}", creds_file);
        (message, err)
    })?;

    return Ok(());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.ccache");
        let path = path.to_str().unwrap();

        assert!(load_file_creds(path).unwrap().is_empty());
        assert_eq!(CredFormat::Ccache, get_file_cred_format(path).unwrap());
    }

    #[test]
    fn test_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.kirbi");
        assert_eq!(
            CredFormat::Krb,
            get_file_cred_format(path.to_str().unwrap()).unwrap()
        );
    }

    #[test]
    fn test_save_and_dump_empty_krb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.krb");
        let vault = FileVault::new(path.to_str().unwrap().to_string());

        vault.save(TicketCreds::empty()).unwrap();
        assert!(path.exists());
        assert!(vault.dump().unwrap().is_empty());
    }
}
