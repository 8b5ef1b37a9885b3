//! services/api/src/bin/openapi.rs
//!
//! Dumps the catalog API's OpenAPI document.
//!
//! Usage: `openapi [PATH]`. PATH defaults to `openapi.json`; `-` prints to stdout.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let target = std::env::args().nth(1).unwrap_or_else(|| "openapi.json".to_string());
    let doc = ApiDoc::openapi();
    let operations = doc.paths.paths.len();
    let json = doc.to_pretty_json()?;

    if target == "-" {
        println!("{}", json);
    } else {
        std::fs::write(&target, json)?;
        eprintln!("Wrote {} paths to {}", operations, target);
    }
    Ok(())
}
