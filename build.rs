//! Build script rendering the `larva(1)` manual page from the clap
//! definitions in `src/cli.rs`.

use clap::CommandFactory;
use clap_mangen::Man;
use std::{env, fs, path::PathBuf};

#[path = "src/cli.rs"]
#[expect(
    dead_code,
    reason = "Only type definitions are needed for man page generation"
)]
mod cli;

const MAN_DIR: &str = "target/generated-man";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=src/cli.rs");
    for key in ["CARGO_PKG_VERSION", "CARGO_PKG_NAME", "CARGO_PKG_DESCRIPTION"] {
        println!("cargo:rerun-if-env-changed={key}");
    }

    let out_dir = PathBuf::from(MAN_DIR);
    if out_dir.exists() {
        fs::remove_dir_all(&out_dir)?;
    }
    fs::create_dir_all(&out_dir)?;

    let cmd = cli::Cli::command();
    let name = cmd.get_name().to_owned();
    let package = env::var("CARGO_PKG_NAME").unwrap_or_else(|_| name.clone());
    if name != package {
        return Err(format!(
            "CLI name '{name}' differs from package name '{package}'; the page must be {package}.1"
        )
        .into());
    }
    let mut page = Vec::new();
    Man::new(cmd).render(&mut page)?;
    fs::write(out_dir.join(format!("{package}.1")), page)?;
    Ok(())
}
