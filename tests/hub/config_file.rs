//! Config File Tests
//!
//! Opening a hub from `hub.toml`.

use crate::common::*;
use channelhub::CONFIG_FILE_NAME;
use tempfile::TempDir;

#[test]
fn open_writes_default_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);

    let hub = Hub::open_with_config_file(&path).unwrap();
    assert!(path.exists());
    assert_eq!(hub.config(), &HubConfig::default());
}

#[test]
fn open_uses_existing_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        "base_uri = \"https://hub.example.com/\"\ndefault_ttl_days = 3\n",
    )
    .unwrap();

    let hub = Hub::open_with_config_file(&path).unwrap();
    let doc = hub.create_channel(&ChannelOptions::new("c")).unwrap();
    assert_eq!(doc.location(), "https://hub.example.com/channel/c");
    assert_eq!(doc.links.ws.href, "wss://hub.example.com/channel/c/ws");
    assert_eq!(doc.ttl_days, Some(3));
}

#[test]
fn invalid_config_refuses_to_open() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "max_payload_bytes = 0\n").unwrap();

    assert!(matches!(
        Hub::open_with_config_file(&path),
        Err(Error::InvalidArgument(_))
    ));
}
