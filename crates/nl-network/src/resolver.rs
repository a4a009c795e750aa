//! Short-link resolution with a durable cache.
//!
//! Shortened maps links hide their destination behind a redirect. The
//! resolver consults the cache first, then probes with HEAD (redirects
//! followed) and falls back to a full GET when HEAD is inconclusive.
//! Resolution never blocks delivery: after three failed attempts the
//! original URL is returned and callers must tolerate it.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, warn};
use tokio::time::sleep;

use nl_core::link::is_short_link;
use nl_core::ports::ResolveCachePort;

/// Total attempts per resolution, including the first.
const RESOLVE_ATTEMPTS: usize = 3;

/// Fixed delay between attempts.
const RESOLVE_RETRY_DELAY: Duration = Duration::from_millis(200);

/// Timeout for each probe request.
const RESOLVE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct ShortLinkResolver {
    client: reqwest::Client,
    cache: Arc<dyn ResolveCachePort>,
    retry_delay: Duration,
    is_short: fn(&str) -> bool,
}

impl ShortLinkResolver {
    pub fn new(cache: Arc<dyn ResolveCachePort>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(RESOLVE_TIMEOUT)
            .connect_timeout(RESOLVE_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build resolver client failed")?;
        Ok(Self {
            client,
            cache,
            retry_delay: RESOLVE_RETRY_DELAY,
            is_short: is_short_link,
        })
    }

    #[cfg(test)]
    fn treating_every_url_as_short(mut self) -> Self {
        self.is_short = |_| true;
        self.retry_delay = Duration::from_millis(1);
        self
    }

    /// Resolve `url` if it is a known short link; otherwise return it
    /// unchanged. Cache hits return without any network call.
    pub async fn resolve_if_needed(&self, url: &str) -> String {
        if !(self.is_short)(url) {
            return url.to_string();
        }

        match self.cache.get(url).await {
            Ok(Some(cached)) => {
                debug!("short link cache hit: {} -> {}", url, cached);
                return cached;
            }
            Ok(None) => {}
            Err(e) => warn!("resolve cache read failed: {:#}", e),
        }

        for attempt in 0..RESOLVE_ATTEMPTS {
            if attempt > 0 {
                sleep(self.retry_delay).await;
            }
            match self.try_resolve(url).await {
                Ok(Some(resolved)) => {
                    if let Err(e) = self.cache.put(url, &resolved).await {
                        warn!("resolve cache write failed: {:#}", e);
                    }
                    debug!("short link resolved: {} -> {}", url, resolved);
                    return resolved;
                }
                Ok(None) => {
                    debug!(
                        "short link resolve attempt {} inconclusive: {}",
                        attempt + 1,
                        url
                    );
                }
                Err(e) => {
                    debug!("short link resolve attempt {} failed: {:#}", attempt + 1, e);
                }
            }
        }

        // Unresolved after all attempts; hand back the original.
        url.to_string()
    }

    /// One resolution attempt. `Ok(None)` means the probe answered but no
    /// redirect was observed.
    async fn try_resolve(&self, url: &str) -> Result<Option<String>> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .context("HEAD probe failed")?;
        let final_url = response.url().to_string();
        if final_url != url {
            return Ok(Some(final_url));
        }

        // HEAD was inconclusive (e.g. 405 or a server that only redirects
        // GET); issue the full request and compare again.
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("GET probe failed")?;
        let final_url = response.url().to_string();
        if final_url != url {
            Ok(Some(final_url))
        } else {
            Ok(None)
        }
    }
}
