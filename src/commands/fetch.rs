use log::warn;
use syncauth::auth::KeytabCache;
use syncauth::{KerberosConfig, Result};

/// Shows the local paths of the files of the configuration, downloading
/// them if needed.
pub fn fetch(
    config: &KerberosConfig,
    cache: &KeytabCache,
    with_krb5: bool,
) -> Result<()> {
    let keytab = cache.load_keytab(config)?;
    println!("keytab: {}", keytab.display());

    if with_krb5 {
        let mut config = config.clone();
        cache.load_krb5_conf(&mut config)?;
        match config.krb5_conf() {
            Some(krb5_conf) => println!("krb5: {}", krb5_conf),
            None => warn!("No krb5 file in the configuration"),
        }
    }

    return Ok(());
}
