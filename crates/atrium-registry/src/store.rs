//! Remote repository feed ("store") client
//!
//! Downloads the repository's feed file with a cache TTL and falls back
//! to a stale cache when the network is unavailable. Also handles package
//! downloads, checksum verification and archive extraction.

use atrium_core::types::{FeedEntry, FeedFile};
use atrium_core::{Error, Result};
use flate2::read::GzDecoder;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Feed cache time-to-live
const CACHE_TTL: Duration = Duration::from_secs(3600); // 1 hour

/// HTTP timeout for feed and package requests
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of installing a package into the modules root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Fresh install, no previous files at the destination
    Installed,
    /// Previous files were replaced
    Updated,
}

/// Remote feed client for one repository
pub struct Store {
    feed_url: String,
    cache_dir: PathBuf,
    client: reqwest::Client,
}

impl Store {
    pub fn new(feed_url: impl Into<String>, cache_dir: impl Into<PathBuf>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::feed(format!("HTTP client setup failed: {e}")))?;
        Ok(Self {
            feed_url: feed_url.into(),
            cache_dir: cache_dir.into(),
            client,
        })
    }

    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }

    fn feed_cache_path(&self) -> PathBuf {
        // One cache file per feed URL
        let mut hasher = Sha256::new();
        hasher.update(self.feed_url.as_bytes());
        let digest = hasher.finalize();
        self.cache_dir.join(format!("feed-{:x}.yaml", digest))
    }

    /// Fetch the feed, using the cache within its TTL
    ///
    /// With `force` the cache is bypassed; on network failure an expired
    /// cache is still accepted as a fallback. Every returned entry is
    /// stamped with this store's repository URL.
    pub async fn get(&self, force: bool) -> Result<HashMap<String, FeedEntry>> {
        fs::create_dir_all(&self.cache_dir)?;
        let cache = self.feed_cache_path();

        let content = if !force && is_cache_valid(&cache) {
            debug!("Using cached feed for {}", self.feed_url);
            fs::read_to_string(&cache)?
        } else {
            debug!("Fetching fresh feed from {}", self.feed_url);
            match self.fetch_feed().await {
                Ok(body) => {
                    fs::write(&cache, &body)?;
                    info!("Cached feed for {}", self.feed_url);
                    body
                }
                Err(e) => {
                    warn!("Feed fetch failed: {}. Trying cache...", e);
                    if cache.exists() {
                        warn!("Using expired feed cache as fallback");
                        fs::read_to_string(&cache)?
                    } else {
                        return Err(e);
                    }
                }
            }
        };

        let feed: FeedFile = serde_yaml::from_str(&content)?;
        let mut entries = feed.modules;
        for entry in entries.values_mut() {
            entry.repository_url = Some(self.feed_url.clone());
        }
        info!("Loaded {} feed entries from {}", entries.len(), self.feed_url);
        Ok(entries)
    }

    async fn fetch_feed(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.feed_url)
            .send()
            .await
            .map_err(|e| Error::feed(format!("request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::feed(format!(
                "HTTP {} fetching {}",
                response.status(),
                self.feed_url
            )));
        }
        response
            .text()
            .await
            .map_err(|e| Error::feed(format!("reading body failed: {e}")))
    }

    /// Download a package archive into the cache, returning its path
    pub async fn download(&self, url: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.cache_dir)?;
        let filename = url.rsplit('/').next().unwrap_or("package.tar.gz");
        let dest = self.cache_dir.join(filename);

        debug!("Downloading package from {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::package(format!("download failed: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::package(format!("HTTP {} fetching {url}", response.status())));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::package(format!("reading package failed: {e}")))?;
        fs::write(&dest, &bytes)?;
        info!("Downloaded {} ({} bytes)", filename, bytes.len());
        Ok(dest)
    }

    /// Verify a package against its feed checksum (SHA-256, hex)
    ///
    /// An empty expected checksum skips verification (feeds may omit it).
    pub fn verify_checksum(archive: &Path, expected: &str) -> Result<()> {
        if expected.is_empty() {
            return Ok(());
        }
        let mut file = fs::File::open(archive)?;
        let mut hasher = Sha256::new();
        std::io::copy(&mut file, &mut hasher)?;
        let actual = format!("{:x}", hasher.finalize());
        if actual != expected.to_lowercase() {
            return Err(Error::package(format!(
                "checksum mismatch for {:?}: expected {expected}, got {actual}",
                archive.file_name().unwrap_or_default()
            )));
        }
        Ok(())
    }

    /// Extract a tar.gz package into the destination directory
    ///
    /// The archive's own top-level directory is stripped so the files land
    /// directly in `dest`.
    pub fn process(archive: &Path, dest: &Path) -> Result<()> {
        let file = fs::File::open(archive)?;
        let mut tar = tar::Archive::new(GzDecoder::new(file));
        fs::create_dir_all(dest)?;

        for entry in tar
            .entries()
            .map_err(|e| Error::package(format!("unreadable archive: {e}")))?
        {
            let mut entry = entry.map_err(|e| Error::package(format!("corrupt entry: {e}")))?;
            let path = entry
                .path()
                .map_err(|e| Error::package(format!("bad entry path: {e}")))?
                .into_owned();

            // Strip the leading component; refuse absolute or traversal paths.
            let stripped: PathBuf = path.components().skip(1).collect();
            if stripped.as_os_str().is_empty() {
                continue;
            }
            if stripped
                .components()
                .any(|c| !matches!(c, std::path::Component::Normal(_)))
            {
                return Err(Error::package(format!("unsafe path in archive: {path:?}")));
            }

            let target = dest.join(&stripped);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            entry
                .unpack(&target)
                .map_err(|e| Error::package(format!("extraction failed: {e}")))?;
        }
        Ok(())
    }

    /// Read the module id out of a package's bundled manifest
    ///
    /// Manual uploads carry no feed entry, so the destination directory
    /// name has to come from the archive itself.
    pub fn package_id(archive: &Path) -> Result<String> {
        let file = fs::File::open(archive)?;
        let mut tar = tar::Archive::new(GzDecoder::new(file));
        for entry in tar
            .entries()
            .map_err(|e| Error::package(format!("unreadable archive: {e}")))?
        {
            let mut entry = entry.map_err(|e| Error::package(format!("corrupt entry: {e}")))?;
            let path = entry
                .path()
                .map_err(|e| Error::package(format!("bad entry path: {e}")))?
                .into_owned();
            if path.file_name().and_then(|n| n.to_str()) != Some(crate::source::MANIFEST_FILE) {
                continue;
            }
            let mut content = String::new();
            use std::io::Read as _;
            entry
                .read_to_string(&mut content)
                .map_err(|e| Error::package(format!("unreadable manifest: {e}")))?;
            let manifest: atrium_core::types::ModuleManifest = serde_yaml::from_str(&content)?;
            return Ok(manifest.id);
        }
        Err(Error::package("archive carries no module manifest"))
    }

    /// Install a verified package into its destination directory
    ///
    /// Replaces any previous files in place; reports whether this was a
    /// fresh install or an update.
    pub fn install(archive: &Path, dest: &Path) -> Result<InstallOutcome> {
        let outcome = if dest.exists() {
            fs::remove_dir_all(dest)?;
            InstallOutcome::Updated
        } else {
            InstallOutcome::Installed
        };
        Self::process(archive, dest)?;
        info!("Package extracted to {:?} ({:?})", dest, outcome);
        Ok(outcome)
    }
}

/// Whether a cached file is still within its TTL
fn is_cache_valid(path: &Path) -> bool {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.elapsed().ok())
        .map(|elapsed| elapsed < CACHE_TTL)
        .unwrap_or(false)
}
