//! Login of the job identity: keytab resolution, principal resolution and
//! the Kerberos login itself.

mod keytab_cache;
pub use keytab_cache::{
    check_file_exists, get_principal_file_name, remote_dir_hash, KeytabCache,
    CACHE_DIR_ENVVAR, LOCAL_CACHE_DIR,
};

mod login;
pub use login::{
    create_proxy_user, get_principal, get_server_ugi, login_and_return_ugi,
    login_from_config,
};

mod ugi;
pub use ugi::{should_relogin, KeytabIdentity, Ugi};

pub use crate::core::reload_krb5_conf;
