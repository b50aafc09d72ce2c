use log::info;
use syncauth::auth::{create_proxy_user, KeytabCache};
use syncauth::core::{FileVault, Vault};
use syncauth::{KerberosConfig, Result};

/// Logs in as the server principal and shows the identity of the proxy
/// user. Optionally saves a ticket obtained on behalf of the proxy user.
pub fn proxy(
    config: &KerberosConfig,
    cache: &KeytabCache,
    proxy_user: &str,
    keytab: Option<String>,
    out_file: Option<String>,
) -> Result<()> {
    let keytab = match keytab {
        Some(keytab) => keytab,
        None => cache.load_keytab(config)?.to_string_lossy().into_owned(),
    };

    let mut config = config.clone();
    cache.load_krb5_conf(&mut config)?;

    let ugi = create_proxy_user(&config, proxy_user, &keytab)?;
    println!("{}", ugi);

    if let Some(out_file) = out_file {
        let ticket = ugi.impersonation_ticket()?;
        let vault = FileVault::new(out_file);
        info!("Save {} S4U2Self TGS in {}", proxy_user, vault.id());
        vault.add(ticket)?;
    }

    return Ok(());
}
