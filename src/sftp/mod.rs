//! Module to fetch files from SFTP servers
//!

mod handler_trait;
pub use handler_trait::{SftpConnector, SftpHandler};

mod retry;
pub use retry::RetryPolicy;

mod russh_handler;
pub use russh_handler::{RusshConnector, RusshSftpHandler};

use crate::config::SftpConfig;
use crate::error::Result;
use log::info;
use std::path::Path;

/// Opens a session, retrying the connection following the policy.
pub fn get_instance_with_retry(
    connector: &dyn SftpConnector,
    conf: &SftpConfig,
    policy: &RetryPolicy,
) -> Result<Box<dyn SftpHandler>> {
    let action = format!("connect to {}@{}:{}", conf.username, conf.host, conf.port);
    return policy.run(&action, || connector.connect(conf));
}

/// Downloads a remote file, retrying failed transfers following the policy.
pub fn download_file_with_retry(
    handler: &mut dyn SftpHandler,
    remote_path: &str,
    local_path: &Path,
    policy: &RetryPolicy,
) -> Result<()> {
    let action = format!("download {} from {}", remote_path, handler.id());
    policy.run(&action, || handler.download_file(remote_path, local_path))?;
    info!("Downloaded {} to {}", remote_path, local_path.display());
    return Ok(());
}
