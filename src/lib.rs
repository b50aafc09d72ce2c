//! Kerberos login for data-sync jobs.
//!
//! A job describes where its keytab lives with a [`KerberosConfig`]. The
//! keytab may be a local file or a file of a remote directory served over
//! SFTP, in which case it is downloaded once into a local cache. The
//! principal is taken from the configuration or from the first entry of the
//! keytab, and the login performs an AS exchange with the KDC of the realm.
//!
//! ```no_run
//! use syncauth::auth::{login_from_config, KeytabCache};
//! use syncauth::KerberosConfig;
//!
//! let config = KerberosConfig::from_file("kerberos.json")?;
//! let ugi = login_from_config(&KeytabCache::default(), &config)?;
//! println!("{}", ugi);
//! # Ok::<(), syncauth::Error>(())
//! ```

pub mod auth;
pub mod communication;
pub mod config;
pub mod core;
pub mod error;
pub mod sftp;

pub use auth::{KeytabCache, Ugi};
pub use config::{KerberosConfig, SftpConfig};
pub use error::{Error, Result};
