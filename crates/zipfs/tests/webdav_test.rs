#![cfg(feature = "webdav")]

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use zipfs::webdav::serve_background;
use zipfs::{ZipFs, ZipFsConfig};
use zipfs_archive::ArchiveBuilder;

async fn request(addr: std::net::SocketAddr, method: &str, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let req = format!(
        "{} {} HTTP/1.1\r\nHost: {}\r\nDepth: 1\r\nConnection: close\r\n\r\n",
        method, path, addr
    );
    stream.write_all(req.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response).into_owned()
}

#[tokio::test]
async fn webdav_serves_files_and_synthetic_directories() {
    let temp = TempDir::new().unwrap();
    let path = ArchiveBuilder::new()
        .with_file("a.txt", b"hello")
        .with_file("dir/b.txt", b"world")
        .write_to(temp.path().join("sample.zip"))
        .unwrap();

    let fs = ZipFs::open_archive(&path, ZipFsConfig::default()).unwrap();
    let server = serve_background(fs, 0).await.unwrap();
    let addr = server.addr();

    let get = request(addr, "GET", "/dir/b.txt").await;
    assert!(get.starts_with("HTTP/1.1 200"), "{}", get);
    assert!(get.ends_with("world"), "{}", get);

    let missing = request(addr, "GET", "/missing.txt").await;
    assert!(missing.starts_with("HTTP/1.1 404"), "{}", missing);

    let listing = request(addr, "PROPFIND", "/dir/").await;
    assert!(listing.starts_with("HTTP/1.1 207"), "{}", listing);
    assert!(listing.contains("b.txt"), "{}", listing);

    server.shutdown();
}
