//! Link endpoints and wire framing.
//!
//! The tx/rx loops are generic over `AsyncRead`/`AsyncWrite`; this
//! module turns a CLI endpoint into a concrete handle. Supported
//! endpoints: a TCP bridge (either direction) and a serial device node
//! that the OS has already configured for the line rate.

pub mod frame;

use crate::error::{LinkError, Result};
use anyhow::Context;
use std::path::PathBuf;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};

pub type LinkReader = Box<dyn AsyncRead + Unpin + Send>;
pub type LinkWriter = Box<dyn AsyncWrite + Unpin + Send>;

#[derive(Debug, Clone)]
pub enum Endpoint {
    /// Connect to a TCP bridge.
    Connect(String),
    /// Accept one TCP bridge connection.
    Listen(String),
    /// Serial device node, e.g. /dev/ttyUSB0.
    Device(PathBuf),
}

impl Endpoint {
    /// Exactly one endpoint flavor must be given.
    pub fn resolve(
        connect: Option<String>,
        listen: Option<String>,
        device: Option<PathBuf>,
    ) -> Result<Self> {
        match (connect, listen, device) {
            (Some(addr), None, None) => Ok(Self::Connect(addr)),
            (None, Some(addr), None) => Ok(Self::Listen(addr)),
            (None, None, Some(path)) => Ok(Self::Device(path)),
            (None, None, None) => Err(LinkError::Config(
                "no link endpoint: pass --connect, --listen or --device".to_string(),
            )),
            _ => Err(LinkError::Config(
                "conflicting link endpoints: pass exactly one of --connect, --listen, --device"
                    .to_string(),
            )),
        }
    }
}

pub async fn open_reader(endpoint: &Endpoint) -> anyhow::Result<LinkReader> {
    Ok(match endpoint {
        Endpoint::Connect(addr) => Box::new(connect(addr).await?),
        Endpoint::Listen(addr) => Box::new(accept(addr).await?),
        Endpoint::Device(path) => Box::new(
            tokio::fs::OpenOptions::new()
                .read(true)
                .open(path)
                .await
                .with_context(|| format!("failed to open device {}", path.display()))?,
        ),
    })
}

pub async fn open_writer(endpoint: &Endpoint) -> anyhow::Result<LinkWriter> {
    Ok(match endpoint {
        Endpoint::Connect(addr) => Box::new(connect(addr).await?),
        Endpoint::Listen(addr) => Box::new(accept(addr).await?),
        Endpoint::Device(path) => Box::new(
            tokio::fs::OpenOptions::new()
                .write(true)
                .open(path)
                .await
                .with_context(|| format!("failed to open device {}", path.display()))?,
        ),
    })
}

async fn connect(addr: &str) -> anyhow::Result<TcpStream> {
    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("failed to connect to link bridge at {addr}"))?;
    tracing::info!(%addr, "link connected");
    Ok(stream)
}

async fn accept(addr: &str) -> anyhow::Result<TcpStream> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to listen on {addr}"))?;
    tracing::info!(%addr, "waiting for link bridge");
    let (stream, peer) = listener.accept().await.context("accept failed")?;
    tracing::info!(%peer, "link connected");
    Ok(stream)
}
