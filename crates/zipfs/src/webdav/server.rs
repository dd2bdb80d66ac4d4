//! WebDAV server implementation using hyper.
//!
//! This module provides the HTTP server that hosts the WebDAV filesystem,
//! allowing clients to connect and mount the archive.

use super::ZipDavFs;
use crate::fs::ZipFs;
use dav_server::{fakels::FakeLs, DavHandler};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use log::{debug, error, info};
use std::convert::Infallible;
use std::io;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use zipfs_archive::ArchiveReader;

/// Handle to a WebDAV server running in the background.
pub struct ZipWebDavServer {
    /// Server address.
    addr: SocketAddr,
    /// Shutdown signal sender.
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ZipWebDavServer {
    /// Get the server's listen address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get the URL to mount this server.
    pub fn mount_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Shutdown the server.
    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn build_handler<R: ArchiveReader + 'static>(fs: ZipFs<R>) -> DavHandler {
    DavHandler::builder()
        .filesystem(Box::new(ZipDavFs::new(fs)))
        .locksystem(FakeLs::new()) // Fake locks for macOS/Windows clients
        .build_handler()
}

fn spawn_connection(dav_server: DavHandler, stream: TcpStream, remote_addr: SocketAddr) {
    debug!("Connection from {}", remote_addr);
    let io = TokioIo::new(stream);

    tokio::spawn(async move {
        if let Err(err) = http1::Builder::new()
            .serve_connection(
                io,
                service_fn(move |req| {
                    let dav_server = dav_server.clone();
                    async move { Ok::<_, Infallible>(dav_server.handle(req).await) }
                }),
            )
            .await
        {
            error!("Connection error: {:?}", err);
        }
    });
}

/// Serve a [`ZipFs`] over WebDAV on localhost and block until shutdown.
///
/// `port` 0 picks a free port.
pub async fn serve<R: ArchiveReader + 'static>(fs: ZipFs<R>, port: u16) -> io::Result<()> {
    let addr: SocketAddr = ([127, 0, 0, 1], port).into();
    let dav_server = build_handler(fs);

    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    info!("WebDAV server listening on http://{}", local_addr);
    info!("To mount from terminal:");
    info!("  mkdir -p /tmp/zipfs");
    info!("  mount_webdav http://{} /tmp/zipfs", local_addr);
    info!("Press Ctrl+C to stop the server");

    loop {
        let (stream, remote_addr) = listener.accept().await?;
        spawn_connection(dav_server.clone(), stream, remote_addr);
    }
}

/// Serve a [`ZipFs`] over WebDAV in the background.
///
/// Returns a handle that can be used to get the server address and shut it down.
pub async fn serve_background<R: ArchiveReader + 'static>(
    fs: ZipFs<R>,
    port: u16,
) -> io::Result<ZipWebDavServer> {
    let addr: SocketAddr = ([127, 0, 0, 1], port).into();
    let dav_server = build_handler(fs);

    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    info!("WebDAV server started on http://{}", local_addr);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            spawn_connection(dav_server.clone(), stream, remote_addr);
                        }
                        Err(e) => {
                            error!("Accept error: {:?}", e);
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    info!("WebDAV server shutting down");
                    break;
                }
            }
        }
    });

    Ok(ZipWebDavServer {
        addr: local_addr,
        shutdown_tx: Some(shutdown_tx),
    })
}
