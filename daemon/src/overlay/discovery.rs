//! ディスカバリサービスを使うオーバーレイクライアント
//!
//! 接続手順:
//! 1. `GET {discovery}/dmsg-discovery/entry/{pk}` でピアのエントリを取得
//! 2. エントリの委譲サーバーを順に引き、`server.address` へTCP接続
//! 3. 最初に接続できたサーバーでセッション確立とみなす
//!
//! Noiseハンドシェイクとストリーム多重化は行わない。

use super::{ephemeral_identity, OverlayClient, OverlayProvider, Session};
use crate::error::{ClientInitError, CloseError, DialError};
use async_trait::async_trait;
use dmsg_daemon_common::protocol::{DiscoveryEntry, ENTRY_PATH};
use dmsg_daemon_common::types::{PeerTarget, PubKey};
use reqwest::{StatusCode, Url};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::debug;

/// ディスカバリベースのクライアントを供給する
#[derive(Debug, Clone)]
pub struct DiscoveryProvider {
    discovery_url: String,
    request_timeout: Duration,
}

impl DiscoveryProvider {
    /// 新しいプロバイダーを作成
    pub fn new(discovery_url: impl Into<String>, request_timeout: Duration) -> Self {
        Self {
            discovery_url: discovery_url.into(),
            request_timeout,
        }
    }
}

#[async_trait]
impl OverlayProvider for DiscoveryProvider {
    async fn new_client(&self) -> Result<Arc<dyn OverlayClient>, ClientInitError> {
        let base = parse_discovery_url(&self.discovery_url)?;
        let http = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()?;
        let identity = ephemeral_identity();

        debug!(client = %identity, discovery = %base, "Created overlay client");

        Ok(Arc::new(DiscoveryClient {
            identity,
            base,
            http,
            closed: AtomicBool::new(false),
        }))
    }
}

fn parse_discovery_url(raw: &str) -> Result<Url, ClientInitError> {
    let invalid = |reason: String| ClientInitError::InvalidDiscoveryUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme {other:?}"))),
    }
}

/// ディスカバリベースのクライアント
pub struct DiscoveryClient {
    identity: PubKey,
    base: Url,
    http: reqwest::Client,
    closed: AtomicBool,
}

impl DiscoveryClient {
    fn entry_url(&self, pk: &PubKey) -> String {
        format!(
            "{}{}/{}",
            self.base.as_str().trim_end_matches('/'),
            ENTRY_PATH,
            pk
        )
    }

    /// エントリを取得する（未登録ならNone）
    async fn fetch_entry(&self, pk: &PubKey) -> Result<Option<DiscoveryEntry>, DialError> {
        let response = self
            .http
            .get(self.entry_url(pk))
            .send()
            .await
            .map_err(|e| DialError::Discovery(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(DialError::Discovery(format!("HTTP {}", response.status())));
        }

        let entry = response
            .json::<DiscoveryEntry>()
            .await
            .map_err(|e| DialError::Discovery(e.to_string()))?;
        Ok(Some(entry))
    }

    /// 委譲サーバーのTCPアドレスを解決する
    async fn server_address(&self, server: &PubKey) -> Result<String, String> {
        match self.fetch_entry(server).await {
            Ok(Some(entry)) => entry
                .server_address()
                .map(str::to_string)
                .ok_or_else(|| format!("server {server} has no address")),
            Ok(None) => Err(format!("server {server} is not registered")),
            Err(e) => Err(e.to_string()),
        }
    }
}

#[async_trait]
impl OverlayClient for DiscoveryClient {
    fn identity(&self) -> PubKey {
        self.identity
    }

    async fn connect(&self, target: &PeerTarget) -> Result<Box<dyn Session>, DialError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DialError::ClientClosed);
        }

        let entry = self
            .fetch_entry(&target.identity)
            .await?
            .ok_or(DialError::NotRegistered)?;

        let servers = entry.delegated_servers();
        if servers.is_empty() {
            return Err(DialError::NoDelegatedServers);
        }

        let mut last_error = String::new();
        for server in servers {
            let address = match self.server_address(server).await {
                Ok(address) => address,
                Err(e) => {
                    last_error = e;
                    continue;
                }
            };

            match TcpStream::connect(&address).await {
                Ok(stream) => {
                    debug!(peer = %target, server = %server, address = %address, "Connected via delegated server");
                    return Ok(Box::new(DiscoverySession {
                        target: *target,
                        stream,
                    }));
                }
                Err(e) => {
                    last_error = format!("{address}: {e}");
                }
            }
        }

        Err(DialError::Unreachable(last_error))
    }

    async fn close(&self) -> Result<(), CloseError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(CloseError::AlreadyClosed);
        }
        debug!(client = %self.identity, "Closed overlay client");
        Ok(())
    }
}

/// 委譲サーバーへのTCP接続
struct DiscoverySession {
    target: PeerTarget,
    stream: TcpStream,
}

#[async_trait]
impl Session for DiscoverySession {
    fn target(&self) -> &PeerTarget {
        &self.target
    }

    async fn close(mut self: Box<Self>) -> Result<(), CloseError> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
