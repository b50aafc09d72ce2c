use crate::config::SftpConfig;
use crate::error::Result;
use std::path::Path;

/// An open session with a file server.
pub trait SftpHandler {
    /// Identifies the remote end in log messages.
    fn id(&self) -> &str;

    fn is_file_exist(&mut self, remote_path: &str) -> Result<bool>;

    /// Copies the remote file into the local path, overwriting it.
    fn download_file(&mut self, remote_path: &str, local_path: &Path)
        -> Result<()>;

    /// Releases the session. Calling it more than once is harmless.
    fn close(&mut self);
}

/// Creates sessions with file servers.
pub trait SftpConnector {
    fn connect(&self, conf: &SftpConfig) -> Result<Box<dyn SftpHandler>>;
}
