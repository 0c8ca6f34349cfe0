//! `AssetLoader`: the out-of-scope collaborator that fetches a URL to a
//! local path (spec §1, §6). The trait is the contract; the `http` feature
//! ships a `reqwest`-backed default implementation so the preload planner
//! is runnable without the caller supplying their own loader.
use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Image,
    Video,
    Svg,
    Waveform,
    Font,
}

#[async_trait]
pub trait AssetLoader: Send + Sync {
    async fn fetch(&self, url: &str, kind: AssetKind) -> Result<PathBuf, String>;
}

/// In-memory fake for tests: pre-seeded `url -> path` map, with an optional
/// artificial latency to exercise the preload planner's parallelism.
#[derive(Default)]
pub struct FakeAssetLoader {
    pub seeded: HashMap<String, PathBuf>,
    pub latency: Option<std::time::Duration>,
}

#[async_trait]
impl AssetLoader for FakeAssetLoader {
    async fn fetch(&self, url: &str, _kind: AssetKind) -> Result<PathBuf, String> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.seeded.get(url).cloned().ok_or_else(|| format!("no fake asset seeded for {url}"))
    }
}

#[cfg(feature = "http")]
pub struct ReqwestAssetLoader {
    client: reqwest::Client,
    cache_dir: PathBuf,
}

#[cfg(feature = "http")]
impl ReqwestAssetLoader {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self { client: reqwest::Client::new(), cache_dir: cache_dir.into() }
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl AssetLoader for ReqwestAssetLoader {
    async fn fetch(&self, url: &str, kind: AssetKind) -> Result<PathBuf, String> {
        let ext = match kind {
            AssetKind::Image => "img",
            AssetKind::Video => "mp4",
            AssetKind::Svg => "svg",
            AssetKind::Waveform => "audio",
            AssetKind::Font => "ttf",
        };
        let fname = format!("{:x}.{ext}", md5_like_hash(url));
        let dest = self.cache_dir.join(fname);
        if dest.exists() {
            return Ok(dest);
        }
        let resp = self.client.get(url).send().await.map_err(|e| e.to_string())?;
        let bytes = resp.bytes().await.map_err(|e| e.to_string())?;
        tokio::fs::create_dir_all(&self.cache_dir).await.map_err(|e| e.to_string())?;
        tokio::fs::write(&dest, &bytes).await.map_err(|e| e.to_string())?;
        Ok(dest)
    }
}

/// Cheap, dependency-free fingerprint used only for cache filenames; not a
/// cryptographic hash.
#[cfg(feature = "http")]
fn md5_like_hash(s: &str) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    s.hash(&mut hasher);
    hasher.finish()
}
