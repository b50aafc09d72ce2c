//! Resolution of the keytab and krb5 files referenced by a configuration.
//! Remote files are downloaded once from SFTP into a local cache, in a
//! directory named after the md5 of their remote directory.

use crate::config::{KerberosConfig, KEY_PRINCIPAL_FILE, KEY_REMOTE_DIR};
use crate::core::keytab::{env_keytab_file, KEYTAB_ENVVAR};
use crate::error::{Error, Result};
use crate::sftp::{
    download_file_with_retry, get_instance_with_retry, RetryPolicy,
    RusshConnector, SftpConnector, SftpHandler,
};
use lazy_static::lazy_static;
use log::{debug, info, warn};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CACHE_DIR_ENVVAR: &str = "SYNCAUTH_KEYTAB_CACHE";

#[cfg(not(windows))]
const DEFAULT_CACHE_DIR: &str = "/tmp/syncauth/keytab";

lazy_static! {
    /// Directory where downloaded files are cached, shared by the process.
    pub static ref LOCAL_CACHE_DIR: PathBuf = default_cache_dir();
}

fn default_cache_dir() -> PathBuf {
    return cache_dir_from(env::var(CACHE_DIR_ENVVAR).ok());
}

fn cache_dir_from(env_dir: Option<String>) -> PathBuf {
    match env_dir {
        Some(dir) if !dir.is_empty() => return PathBuf::from(dir),
        _ => return platform_cache_dir(),
    }
}

#[cfg(windows)]
fn platform_cache_dir() -> PathBuf {
    return env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
}

#[cfg(not(windows))]
fn platform_cache_dir() -> PathBuf {
    return PathBuf::from(DEFAULT_CACHE_DIR);
}

/// Local cache of files fetched from SFTP.
pub struct KeytabCache {
    cache_dir: PathBuf,
    connector: Box<dyn SftpConnector>,
    policy: RetryPolicy,
}

impl Default for KeytabCache {
    fn default() -> Self {
        return Self::with_default_dir(Box::new(RusshConnector::new()));
    }
}

impl KeytabCache {
    pub fn new(cache_dir: PathBuf, connector: Box<dyn SftpConnector>) -> Self {
        return Self {
            cache_dir,
            connector,
            policy: RetryPolicy::default(),
        };
    }

    /// Cache in the process-wide directory, which is created if missing.
    pub fn with_default_dir(connector: Box<dyn SftpConnector>) -> Self {
        create_dir(&LOCAL_CACHE_DIR);
        return Self::new(LOCAL_CACHE_DIR.clone(), connector);
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn cache_dir(&self) -> &Path {
        return &self.cache_dir;
    }

    /// Local directory that holds the files of a remote directory.
    pub fn local_dir_for(&self, remote_dir: &str) -> PathBuf {
        return self.cache_dir.join(remote_dir_hash(remote_dir));
    }

    /// Local path of a file named by the configuration. Local files are
    /// only checked, remote ones are fetched from SFTP by their base name.
    pub fn load_file(
        &self,
        config: &KerberosConfig,
        file_path: &str,
    ) -> Result<PathBuf> {
        if config.use_local_file {
            return check_file_exists(file_path);
        }

        return self.load_from_sftp(config, base_name(file_path));
    }

    /// Local path of the keytab named by `principalFile`. Without it, the
    /// local keytab named by KRB5_KTNAME is used.
    pub fn load_keytab(&self, config: &KerberosConfig) -> Result<PathBuf> {
        return self.resolve_keytab(config, env_keytab_file());
    }

    fn resolve_keytab(
        &self,
        config: &KerberosConfig,
        env_keytab: Option<String>,
    ) -> Result<PathBuf> {
        if config.principal_file().is_none() {
            if let Some(env_keytab) = env_keytab {
                info!("Using keytab {} from {}", env_keytab, KEYTAB_ENVVAR);
                return check_file_exists(&env_keytab);
            }
        }

        let file_name = get_principal_file_name(config)?;
        return self.load_file(config, &file_name);
    }

    /// Resolves the krb5 file of the configuration, if any, and replaces it
    /// with its local path. Without krb5 file the configuration is kept
    /// unchanged.
    pub fn load_krb5_conf(&self, config: &mut KerberosConfig) -> Result<()> {
        let krb5_conf = match config.krb5_conf() {
            Some(krb5_conf) => krb5_conf.to_string(),
            None => {
                info!("krb5 file is empty, will use default file");
                return Ok(());
            }
        };

        let local_path = self.load_file(config, &krb5_conf)?;
        config.krb5_conf = Some(local_path.to_string_lossy().into_owned());
        return Ok(());
    }

    /// Local path of a file of the remote directory, downloading it if it
    /// is not in the cache yet.
    pub fn load_from_sftp(
        &self,
        config: &KerberosConfig,
        file_name: &str,
    ) -> Result<PathBuf> {
        let remote_dir = config.remote_dir().ok_or_else(|| {
            Error::ArgumentError(format!("[{}] must be specified", KEY_REMOTE_DIR))
        })?;
        let remote_path = format!("{}/{}", remote_dir, file_name);

        let local_dir = self.local_dir_for(remote_dir);
        create_dir(&local_dir);
        let local_path = local_dir.join(file_name);

        if local_path.is_file() {
            debug!("File {} found in local cache", local_path.display());
            return Ok(local_path);
        }

        let mut handler = get_instance_with_retry(
            &*self.connector,
            config.sftp_conf()?,
            &self.policy,
        )?;
        let result = self.download(&mut *handler, &remote_path, &local_path);
        handler.close();
        result?;

        info!("download file {} to local {}", remote_path, local_path.display());
        return Ok(local_path);
    }

    fn download(
        &self,
        handler: &mut dyn SftpHandler,
        remote_path: &str,
        local_path: &Path,
    ) -> Result<()> {
        if !handler.is_file_exist(remote_path)? {
            return Err(Error::SftpError(format!(
                "File[{}] not exist on sftp",
                remote_path
            )));
        }

        let part_path = part_file_path(local_path);
        let result =
            download_file_with_retry(handler, remote_path, &part_path, &self.policy)
                .and_then(|_| {
                    fs::rename(&part_path, local_path).map_err(|err| {
                        let message = format!(
                            "Unable to move the file '{}'",
                            part_path.display()
                        );
                        Error::from((message, err))
                    })
                });

        if result.is_err() && part_path.exists() {
            if let Err(err) = fs::remove_file(&part_path) {
                warn!("Unable to remove {}: {}", part_path.display(), err);
            }
        }
        return result;
    }
}

fn part_file_path(local_path: &Path) -> PathBuf {
    let mut name = local_path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    return local_path.with_file_name(name);
}

/// Name of the keytab file, as a local path when `useLocalFile` is set or
/// as a base name to look up in the remote directory otherwise.
pub fn get_principal_file_name(config: &KerberosConfig) -> Result<String> {
    let principal_file = config.principal_file().ok_or_else(|| {
        Error::ArgumentError(format!("[{}] must be specified", KEY_PRINCIPAL_FILE))
    })?;

    if config.use_local_file {
        return Ok(principal_file.to_string());
    }
    return Ok(base_name(principal_file).to_string());
}

/// Name of the cache subdirectory of a remote directory.
pub fn remote_dir_hash(remote_dir: &str) -> String {
    return format!("{:x}", md5::compute(remote_dir.as_bytes()));
}

fn base_name(path: &str) -> &str {
    return match path.rfind('/') {
        Some(pos) => &path[pos + 1..],
        None => path,
    };
}

/// Checks that a local file exists and is not a directory.
pub fn check_file_exists(file_path: &str) -> Result<PathBuf> {
    let path = PathBuf::from(file_path);
    if !path.exists() {
        return Err(Error::String(format!("keytab file not exists:{}", file_path)));
    }
    if path.is_dir() {
        return Err(Error::String(format!("keytab is a directory:{}", file_path)));
    }
    return Ok(path);
}

fn create_dir(dir: &Path) {
    if dir.is_dir() {
        return;
    }
    match fs::create_dir_all(dir) {
        Ok(_) => debug!("Created directory {}", dir.display()),
        Err(err) => warn!("Unable to create directory {}: {}", dir.display(), err),
    }
}
