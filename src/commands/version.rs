use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("healthmon version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
