//! Token protectors
//!
//! [`KeyFileProtector`] seals tokens with AES-256-GCM under a key kept in a
//! hex file beside the state file, generating the key on first use.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use skysync_common::SymmetricEncryptionService;
use skysync_core::TokenProtector;
use skysync_domain::{Result, SkySyncError};
use tracing::info;

use crate::errors::to_domain;

/// Protector backed by a key file on disk.
#[derive(Debug)]
pub struct KeyFileProtector {
    service: SymmetricEncryptionService,
    path: PathBuf,
}

impl KeyFileProtector {
    /// Load the key at `path`, or generate and write one if the file does
    /// not exist.
    ///
    /// # Errors
    /// Returns `SkySyncError::Security` for a malformed key file and
    /// `SkySyncError::Storage` if the file cannot be read or written.
    pub fn open_or_create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let service = match fs::read_to_string(&path) {
            Ok(contents) => SymmetricEncryptionService::from_hex(&contents).map_err(to_domain)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let service = SymmetricEncryptionService::new(
                    SymmetricEncryptionService::generate_key(),
                )
                .map_err(to_domain)?;
                write_key_file(&path, &service.key_hex())?;
                info!(
                    path = %path.display(),
                    fingerprint = %service.key_fingerprint(),
                    "Generated new token encryption key"
                );
                service
            }
            Err(err) => {
                return Err(SkySyncError::Storage(format!(
                    "Failed to read key file {}: {err}",
                    path.display()
                )))
            }
        };

        Ok(Self { service, path })
    }

    /// Location of the key file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loggable fingerprint of the key in use.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        self.service.key_fingerprint()
    }
}

fn write_key_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_domain)?;
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(to_domain)?;
    file.write_all(contents.as_bytes()).map_err(to_domain)?;
    file.sync_all().map_err(to_domain)
}

impl TokenProtector for KeyFileProtector {
    fn protect(&self, plaintext: &str) -> Result<String> {
        self.service.seal_str(plaintext).map_err(to_domain)
    }

    fn unprotect(&self, protected: &str) -> Result<String> {
        self.service.open_str(protected).map_err(to_domain)
    }
}

/// Identity protector for tests and debugging.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextProtector;

impl TokenProtector for PlaintextProtector {
    fn protect(&self, plaintext: &str) -> Result<String> {
        Ok(plaintext.to_string())
    }

    fn unprotect(&self, protected: &str) -> Result<String> {
        Ok(protected.to_string())
    }
}
