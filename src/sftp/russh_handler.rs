use super::{SftpConnector, SftpHandler};
use crate::config::{SftpAuth, SftpConfig};
use crate::error::{Error, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use russh::client;
use russh::Disconnect;
use russh_keys::key;
use russh_sftp::client::SftpSession;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::runtime::{Builder, Runtime};

/// Accepts any host key, the same as a client configured without strict
/// host key checking.
struct ClientHandler;

#[async_trait]
impl client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        Ok(true)
    }
}

/// Opens SFTP sessions over SSH with russh.
#[derive(Debug, Default)]
pub struct RusshConnector;

impl RusshConnector {
    pub fn new() -> Self {
        return Self;
    }
}

impl SftpConnector for RusshConnector {
    fn connect(&self, conf: &SftpConfig) -> Result<Box<dyn SftpHandler>> {
        return Ok(Box::new(RusshSftpHandler::connect(conf)?));
    }
}

/// Blocking SFTP session. The async client runs on a runtime owned by the
/// handler.
pub struct RusshSftpHandler {
    id: String,
    runtime: Runtime,
    ssh: Option<client::Handle<ClientHandler>>,
    sftp: Option<SftpSession>,
}

impl RusshSftpHandler {
    pub fn connect(conf: &SftpConfig) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| ("Unable to start the SFTP runtime", err))?;

        let id = format!("{}@{}:{}", conf.username, conf.host, conf.port);
        debug!("Connecting to sftp {}", id);

        let (ssh, sftp) = runtime.block_on(open_session(conf))?;
        info!("Connected to sftp {}", id);

        return Ok(Self {
            id,
            runtime,
            ssh: Some(ssh),
            sftp: Some(sftp),
        });
    }

    fn session(&self) -> Result<&SftpSession> {
        return self.sftp.as_ref().ok_or_else(|| {
            Error::SftpError(format!("Session with {} is closed", self.id))
        });
    }
}

impl SftpHandler for RusshSftpHandler {
    fn id(&self) -> &str {
        return &self.id;
    }

    fn is_file_exist(&mut self, remote_path: &str) -> Result<bool> {
        let sftp = self.session()?;
        return self
            .runtime
            .block_on(sftp.try_exists(remote_path))
            .map_err(|err| {
                Error::SftpError(format!(
                    "Unable to check {} on {}: {}",
                    remote_path, self.id, err
                ))
            });
    }

    fn download_file(
        &mut self,
        remote_path: &str,
        local_path: &Path,
    ) -> Result<()> {
        let sftp = self.session()?;
        let data = self
            .runtime
            .block_on(read_remote_file(sftp, remote_path))
            .map_err(|err| {
                Error::SftpError(format!(
                    "Unable to download {} from {}: {}",
                    remote_path, self.id, err
                ))
            })?;

        fs::write(local_path, data).map_err(|err| {
            let message =
                format!("Unable to write the file '{}'", local_path.display());
            (message, err)
        })?;

        return Ok(());
    }

    fn close(&mut self) {
        drop(self.sftp.take());

        if let Some(ssh) = self.ssh.take() {
            let result = self.runtime.block_on(ssh.disconnect(
                Disconnect::ByApplication,
                "",
                "English",
            ));
            if let Err(err) = result {
                warn!("Error closing sftp session {}: {}", self.id, err);
            }
            debug!("Closed sftp session {}", self.id);
        }
    }
}

impl Drop for RusshSftpHandler {
    fn drop(&mut self) {
        self.close();
    }
}

async fn open_session(
    conf: &SftpConfig,
) -> Result<(client::Handle<ClientHandler>, SftpSession)> {
    let config = Arc::new(client::Config::default());
    let timeout = Duration::from_millis(conf.timeout);

    let mut ssh = tokio::time::timeout(
        timeout,
        client::connect(config, (conf.host.as_str(), conf.port), ClientHandler),
    )
    .await
    .map_err(|_| {
        Error::SftpError(format!(
            "Timeout connecting to {}:{} after {:?}",
            conf.host, conf.port, timeout
        ))
    })?
    .map_err(|err| {
        Error::SftpError(format!(
            "Unable to connect to {}:{}: {}",
            conf.host, conf.port, err
        ))
    })?;

    let authenticated = match conf.auth_method()? {
        SftpAuth::Password(password) => {
            ssh.authenticate_password(conf.username.as_str(), password)
                .await
        }
        SftpAuth::PublicKey {
            key_path,
            passphrase,
        } => {
            let key_pair = russh_keys::load_secret_key(key_path, passphrase)
                .map_err(|err| {
                    Error::SftpError(format!(
                        "Unable to load private key '{}': {}",
                        key_path, err
                    ))
                })?;
            ssh.authenticate_publickey(conf.username.as_str(), Arc::new(key_pair))
                .await
        }
    }
    .map_err(|err| {
        Error::SftpError(format!(
            "Error authenticating {} on {}: {}",
            conf.username, conf.host, err
        ))
    })?;

    if !authenticated {
        return Err(Error::SftpError(format!(
            "Authentication failed for {}@{}",
            conf.username, conf.host
        )));
    }

    let channel = ssh.channel_open_session().await.map_err(|err| {
        Error::SftpError(format!("Unable to open ssh channel: {}", err))
    })?;
    channel
        .request_subsystem(true, "sftp")
        .await
        .map_err(|err| {
            Error::SftpError(format!("Unable to request sftp subsystem: {}", err))
        })?;

    let sftp = SftpSession::new(channel.into_stream()).await.map_err(|err| {
        Error::SftpError(format!("Unable to start sftp session: {}", err))
    })?;

    return Ok((ssh, sftp));
}

async fn read_remote_file(sftp: &SftpSession, remote_path: &str) -> Result<Vec<u8>> {
    let mut file = sftp
        .open(remote_path)
        .await
        .map_err(|err| Error::SftpError(err.to_string()))?;

    let mut data = Vec::new();
    file.read_to_end(&mut data)
        .await
        .map_err(|err| ("Error reading remote file", err))?;

    return Ok(data);
}
