use crate::utils;
use log::info;
use syncauth::auth::{login_from_config, KeytabCache};
use syncauth::core::{CredFormat, FileVault, TicketCreds, Vault};
use syncauth::{KerberosConfig, Result};

/// Logs in with the configuration and saves the TGT, unless the login
/// already stored it in the configured credentials cache.
pub fn login(
    config: &KerberosConfig,
    cache: &KeytabCache,
    out_file: Option<String>,
    cred_format: CredFormat,
) -> Result<()> {
    let ugi = login_from_config(cache, config)?;
    println!("{}", ugi);

    let cred_file = match utils::get_login_ticket_file(
        out_file,
        config.cred_cache(),
        &ugi.short_user_name(),
        &cred_format,
    ) {
        Some(cred_file) => cred_file,
        None => return Ok(()),
    };
    let vault = FileVault::new(cred_file);

    let tgt: TicketCreds = ugi.tgt().clone().into();
    let mut creds = vault.dump()?.without(&tgt);
    for ticket in tgt.ticket_creds {
        creds.push(ticket);
    }

    info!("Save {} TGT in {}", ugi.user_name(), vault.id());
    return vault.save_as(creds, cred_format);
}
