//! Decode a TOML file and print it in canonical form.
//!
//! Run with: cargo run --example pretty_print -- path/to/file.toml
//! Without a path, a built-in document is used.

use std::env;
use std::error::Error;
use std::fs;
use tidy_toml::{decode, encode_with_options, EncodeOptions, Value};

const SAMPLE: &str = r#"
title='TOML Example'
[owner]
name="Tom Preston-Werner"
dob=1979-05-27T07:32:00-08:00
[servers.alpha]
ip="10.0.0.1"
[servers.beta]
ip="10.0.0.2"
[[fruit]]
name='apple'
[[fruit]]
name='banana'
"#;

fn main() -> Result<(), Box<dyn Error>> {
    let text = match env::args().nth(1) {
        Some(path) => fs::read_to_string(path)?,
        None => SAMPLE.to_string(),
    };

    let doc = decode(&text)?;
    for (key, value) in &doc {
        println!("# {} is {}", key, value.type_name());
    }
    if let Some(Value::Array(fruit)) = doc.get("fruit") {
        println!("# {} fruit entries", fruit.len());
    }
    println!();

    println!("Insertion order:");
    print!("{}", encode_with_options(&doc, &EncodeOptions::default())?);
    println!();

    println!("Sorted keys, four-space indent:");
    let options = EncodeOptions::sorted().with_indent(4);
    print!("{}", encode_with_options(&doc, &options)?);

    Ok(())
}
