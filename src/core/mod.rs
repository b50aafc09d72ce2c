mod cipher;
pub use cipher::Cipher;

pub mod forge;
pub use forge::KrbUser;

mod cred_format;
pub use cred_format::CredFormat;

mod ticket_cred;
pub use ticket_cred::{TicketCred, TicketCreds};

mod requesters;
pub use requesters::{request_s4u2self, request_tgt};

mod vault;
pub use vault::{load_file_creds, save_file_creds, FileVault, Vault};

pub mod keytab;
pub use keytab::{KeytabKey, KEYTAB_ENVVAR};

mod krb5_conf;
pub use krb5_conf::{
    current_krb5_conf, reload_krb5_conf, Krb5Conf, DEFAULT_KRB5_CONF,
    KRB5_CONFIG_ENVVAR,
};
