//! Mock repository helpers for feed and package download testing

#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Build a module package archive (tar.gz) in memory
pub fn package_bytes(id: &str, version: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let enc = GzEncoder::new(&mut buf, Compression::default());
        let mut tar = tar::Builder::new(enc);
        let files = [
            (
                "module.yaml".to_string(),
                format!("id: {id}\nname: {id}\nversion: \"{version}\"\n"),
            ),
            ("index.html".to_string(), "<p>module</p>".to_string()),
        ];
        for (name, body) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(body.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            tar.append_data(&mut header, format!("{id}/{name}"), body.as_bytes())
                .unwrap();
        }
        tar.into_inner().unwrap().finish().unwrap();
    }
    buf
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// One feed entry block for `feed_yaml`
pub struct FeedSpec<'a> {
    pub id: &'a str,
    pub version: &'a str,
    pub file: String,
    pub checksum: String,
}

/// Render a repository feed file
pub fn feed_yaml(entries: &[FeedSpec<'_>]) -> String {
    let mut yaml = String::from("version: \"1.0\"\nmodules:\n");
    for entry in entries {
        yaml.push_str(&format!(
            "  {}:\n    name: {}\n    version: \"{}\"\n    file: {}\n    checksum: {}\n",
            entry.id, entry.id, entry.version, entry.file, entry.checksum
        ));
    }
    yaml
}

/// Serve a feed file at `/feed.yaml`
pub async fn mock_feed(server: &MockServer, yaml: &str) {
    Mock::given(method("GET"))
        .and(path("/feed.yaml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(yaml.to_string()))
        .mount(server)
        .await;
}

/// Serve a package archive at `/packages/{name}`
pub async fn mock_package(server: &MockServer, name: &str, bytes: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/packages/{name}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
        .mount(server)
        .await;
}
