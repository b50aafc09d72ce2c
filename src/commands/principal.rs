use syncauth::auth::{get_principal, KeytabCache};
use syncauth::{KerberosConfig, Result};

pub fn principal(config: &KerberosConfig, cache: &KeytabCache) -> Result<()> {
    let principal = match config.principal() {
        Some(principal) => principal.to_string(),
        None => get_principal(config, &cache.load_keytab(config)?)?,
    };

    println!("{}", principal);
    return Ok(());
}
