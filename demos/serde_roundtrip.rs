//! Round-trip a Rust struct through TOML with serde.
//!
//! Run with: cargo run --example serde_roundtrip

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use tidy_toml::{from_str, to_string, to_string_with_options, EncodeOptions};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Database {
    url: String,
    pool_size: u32,
    replicas: Vec<String>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Service {
    name: String,
    port: u16,
    timeout: Option<f64>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Config {
    name: String,
    debug: bool,
    database: Database,
    services: Vec<Service>,
    limits: BTreeMap<String, u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut limits = BTreeMap::new();
    limits.insert("requests".to_string(), 1_000);
    limits.insert("bytes".to_string(), u64::MAX);

    let config = Config {
        name: "gateway".to_string(),
        debug: false,
        database: Database {
            url: "postgres://localhost/app".to_string(),
            pool_size: 8,
            replicas: vec!["db-1".to_string(), "db-2".to_string()],
        },
        services: vec![
            Service {
                name: "auth".to_string(),
                port: 8081,
                timeout: Some(2.5),
            },
            Service {
                name: "search".to_string(),
                port: 8082,
                timeout: None,
            },
        ],
        limits,
    };

    let text = to_string(&config)?;
    println!("{}", text);

    let back: Config = from_str(&text)?;
    assert_eq!(back, config);
    println!("Round-trip OK");
    println!();

    let options = EncodeOptions::sorted().with_newline("\r\n");
    let crlf = to_string_with_options(&config, &options)?;
    println!("Sorted with CRLF: {} bytes", crlf.len());
    let back: Config = from_str(&crlf)?;
    assert_eq!(back, config);

    Ok(())
}
