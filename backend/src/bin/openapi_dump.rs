//! Print the OpenAPI document as JSON.

use std::io::Write;

use color_eyre::eyre::{Result, WrapErr};
use mindtrack::doc::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<()> {
    color_eyre::install()?;
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .wrap_err("serialising OpenAPI document")?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}").wrap_err("writing OpenAPI document")?;
    Ok(())
}
