//! Version command

use anyhow::Result;
use serde_json::json;

use crate::cli::VersionArgs;
use crate::output;

pub fn run(args: VersionArgs) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");

    if args.json {
        let payload = json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": version,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        output::info(&format!("atrium {version}"));
    }

    Ok(())
}
