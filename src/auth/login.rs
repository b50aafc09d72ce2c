//! Login of the job identity from a keytab.

use super::keytab_cache::KeytabCache;
use super::ugi::Ugi;
use crate::communication::KdcLocator;
use crate::config::KerberosConfig;
use crate::core::keytab::find_principal_from_keytab;
use crate::core::{
    current_krb5_conf, reload_krb5_conf, FileVault, KrbUser, DEFAULT_KRB5_CONF,
};
use crate::error::{Error, Result};
use log::info;
use std::path::Path;

const KEY_SERVER_PRINCIPAL: &str = "serverPrincipal";

/// Logs in the principal with the keys of the keytab. The krb5 file and KDC
/// of the configuration are used if given, and the TGT is stored in the
/// credential cache of the configuration, if any.
pub fn login_and_return_ugi(
    config: &KerberosConfig,
    principal: &str,
    keytab: &str,
) -> Result<Ugi> {
    if principal.trim().is_empty() {
        return Err(Error::ArgumentError(
            "Can not login with empty principal".into(),
        ));
    }
    if keytab.trim().is_empty() {
        return Err(Error::ArgumentError("Can not login with empty keytab".into()));
    }
    let transport = config.kdc_transport()?;

    if let Some(krb5_conf) = config.krb5_conf() {
        reload_krb5_conf(krb5_conf);
    }

    info!("login user {} with keytab {}", principal, keytab);

    let krb5_conf = current_krb5_conf();
    let default_realm = krb5_conf.as_ref().and_then(|c| c.default_realm.clone());
    let user = KrbUser::from_principal(principal, default_realm.as_deref())?;

    let mut locator = KdcLocator::new(transport).krb5_conf(krb5_conf);
    if let Some(kdc) = config.kdc() {
        locator.insert(&user.realm, kdc.to_string());
    }

    let ugi = Ugi::login_from_keytab(user, Path::new(keytab), locator)?;

    if let Some(cred_cache) = config.cred_cache() {
        ugi.save_credentials(&FileVault::new(cred_cache.to_string()))?;
    }

    return Ok(ugi);
}

/// Principal of the configuration or, if not given, the first one of the
/// keytab.
pub fn get_principal(config: &KerberosConfig, keytab: &Path) -> Result<String> {
    if let Some(principal) = config.principal() {
        return Ok(principal.to_string());
    }

    let principal = find_principal_from_keytab(keytab)?.ok_or_else(|| {
        Error::DataError(format!(
            "No principal found in keytab file {}",
            keytab.display()
        ))
    })?;
    info!("get principal:{} from keytab file:{}", principal, keytab.display());

    return Ok(principal);
}

/// Logs in with the keytab, principal and krb5 file of the configuration,
/// fetching the files that are remote.
pub fn login_from_config(
    cache: &KeytabCache,
    config: &KerberosConfig,
) -> Result<Ugi> {
    let mut config = config.clone();
    let keytab = cache.load_keytab(&config)?;
    let principal = get_principal(&config, &keytab)?;
    cache.load_krb5_conf(&mut config)?;

    return login_and_return_ugi(&config, &principal, &keytab.to_string_lossy());
}

/// Logs in as the service principal used to create proxy users.
pub fn get_server_ugi(config: &KerberosConfig, key_path: &str) -> Result<Ugi> {
    let principal = config
        .server_principal()
        .ok_or_else(|| {
            Error::ArgumentError(format!(
                "[{}] must be specified",
                KEY_SERVER_PRINCIPAL
            ))
        })?
        .to_string();

    let mut config = config.clone();
    if config.krb5_conf().is_none() {
        config.krb5_conf = Some(DEFAULT_KRB5_CONF.to_string());
    }

    return login_and_return_ugi(&config, &principal, key_path);
}

/// Identity of `proxy_user` acting through the server principal.
pub fn create_proxy_user(
    config: &KerberosConfig,
    proxy_user: &str,
    key_path: &str,
) -> Result<Ugi> {
    if proxy_user.trim().is_empty() {
        return Err(Error::ArgumentError("Proxy user can not be empty".into()));
    }

    let mut server_ugi = get_server_ugi(config, key_path)?;
    server_ugi.check_tgt_and_relogin_from_keytab()?;

    return Ok(Ugi::create_proxy_user(proxy_user, server_ugi));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::keytab_cache::remote_dir_hash;
    use crate::auth::keytab_cache::tests::{remote_config, FakeConnector, FakeServer};
    use crate::core::keytab::tests::{hue_entries, raw_keytab, write_keytab};
    use crate::sftp::RetryPolicy;
    use kerberos_asn1::{AsReq, Asn1Object, KrbError};
    use kerberos_constants::error_codes;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::rc::Rc;
    use std::thread;

    /// KDC that answers a single request with an error and returns the
    /// request received.
    fn spawn_failing_kdc() -> (String, thread::JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let kdc = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut len = [0u8; 4];
            stream.read_exact(&mut len).unwrap();
            let mut request = vec![0; u32::from_be_bytes(len) as usize];
            stream.read_exact(&mut request).unwrap();

            let mut krb_error = KrbError::default();
            krb_error.error_code = error_codes::KDC_ERR_PREAUTH_FAILED;
            let response = krb_error.build();
            stream
                .write_all(&(response.len() as u32).to_be_bytes())
                .unwrap();
            stream.write_all(&response).unwrap();
            return request;
        });

        return (addr, kdc);
    }

    #[test]
    fn test_login_requires_principal_and_keytab() {
        let config = KerberosConfig::default();

        let err = login_and_return_ugi(&config, "", "/tmp/hue.keytab").unwrap_err();
        assert!(err.is_argument_error());

        let err = login_and_return_ugi(&config, "hue@OTOCYON.COM", " ").unwrap_err();
        assert!(err.is_argument_error());

        let mut config = KerberosConfig::default();
        config.kdc_transport = Some("sctp".into());
        let err = login_and_return_ugi(&config, "hue@OTOCYON.COM", "/tmp/hue.keytab")
            .unwrap_err();
        assert!(err.is_argument_error());
    }

    #[test]
    fn test_get_principal() {
        let dir = tempfile::tempdir().unwrap();
        let keytab = dir.path().join("hue.keytab");
        write_keytab(&keytab, &hue_entries());

        let mut config = KerberosConfig::default();
        assert_eq!(
            "hue/10.11.159.156@OTOCYON.COM",
            get_principal(&config, &keytab).unwrap()
        );

        config.principal = Some("hdfs@OTOCYON.COM".into());
        assert_eq!("hdfs@OTOCYON.COM", get_principal(&config, &keytab).unwrap());

        let empty = dir.path().join("empty.keytab");
        write_keytab(&empty, &[]);
        config.principal = Some("".into());
        assert!(get_principal(&config, &empty).unwrap_err().is_data_error());
    }

    #[test]
    fn test_login_with_keytab_key() {
        let dir = tempfile::tempdir().unwrap();
        let keytab = dir.path().join("hue.keytab");
        write_keytab(&keytab, &hue_entries());

        let (kdc_addr, kdc) = spawn_failing_kdc();
        let mut config = KerberosConfig::default();
        config.kdc = Some(kdc_addr);

        let err = login_and_return_ugi(
            &config,
            "hdfs@OTOCYON.COM",
            keytab.to_str().unwrap(),
        )
        .unwrap_err();
        match err {
            Error::KrbError(krb_error) => assert_eq!(
                error_codes::KDC_ERR_PREAUTH_FAILED,
                krb_error.error_code
            ),
            other => panic!("unexpected error {}", other),
        }

        let (_, as_req) = AsReq::parse(&kdc.join().unwrap()).unwrap();
        assert_eq!(
            vec!["hdfs".to_string()],
            as_req.req_body.cname.as_ref().unwrap().name_string
        );
        assert_eq!("OTOCYON.COM", as_req.req_body.realm);
        assert_eq!(
            vec![kerberos_constants::etypes::RC4_HMAC],
            as_req.req_body.etypes
        );
    }

    #[test]
    fn test_login_from_config_derives_principal() {
        let dir = tempfile::tempdir().unwrap();
        let server = Rc::new(
            FakeServer::default()
                .with_file("/home/admin/hue.keytab", &raw_keytab(&hue_entries())),
        );
        let cache = KeytabCache::new(
            dir.path().to_path_buf(),
            Box::new(FakeConnector(server.clone())),
        )
        .with_retry_policy(RetryPolicy::immediate(1));

        let (kdc_addr, kdc) = spawn_failing_kdc();
        let mut config = remote_config();
        config.kdc = Some(kdc_addr);

        assert!(login_from_config(&cache, &config).is_err());
        assert_eq!(1, server.connects.get());
        assert!(dir
            .path()
            .join(remote_dir_hash("/home/admin"))
            .join("hue.keytab")
            .is_file());

        let (_, as_req) = AsReq::parse(&kdc.join().unwrap()).unwrap();
        assert_eq!(
            vec!["hue".to_string(), "10.11.159.156".to_string()],
            as_req.req_body.cname.as_ref().unwrap().name_string
        );
        assert_eq!(
            vec![kerberos_constants::etypes::AES256_CTS_HMAC_SHA1_96],
            as_req.req_body.etypes
        );
        assert_eq!(None, config.krb5_conf);
    }

    #[test]
    fn test_server_ugi_requires_server_principal() {
        let config = KerberosConfig::default();
        let err = get_server_ugi(&config, "/tmp/hue.keytab").unwrap_err();
        assert!(err.is_argument_error());
        assert_eq!("[serverPrincipal] must be specified", err.to_string());

        let err = create_proxy_user(&config, "", "/tmp/hue.keytab").unwrap_err();
        assert!(err.is_argument_error());
    }
}
