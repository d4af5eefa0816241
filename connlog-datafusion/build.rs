//! Build script for generating shell completions and man page.
//!
//! Generates assets at build time for packaging.

use std::env;
use std::fs;
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::{generate_to, Shell};
use clap_mangen::Man;

// Wrap the included file in a module to avoid import conflicts
#[allow(dead_code)]
mod cli {
    include!("src/cli/args.rs");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=src/cli/args.rs");
    println!("cargo:rerun-if-env-changed=CONNLOG_GENERATE_ASSETS");

    // Only generate during release builds or when explicitly requested
    let profile = env::var("PROFILE").unwrap_or_default();
    let force_generate = env::var("CONNLOG_GENERATE_ASSETS").is_ok();

    if profile != "release" && !force_generate {
        return Ok(());
    }

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let out_dir = manifest_dir
        .parent()
        .ok_or("manifest directory has no parent")?
        .join("target")
        .join("assets");
    fs::create_dir_all(&out_dir)?;

    let mut cmd = cli::Args::command().name("connlog");

    for shell in [Shell::Bash, Shell::Zsh, Shell::Fish] {
        let path = generate_to(shell, &mut cmd, "connlog", &out_dir)?;
        println!("cargo:warning=Generated completion: {}", path.display());
    }

    // Rename zsh completion to expected name
    let zsh_src = out_dir.join("_connlog");
    if zsh_src.exists() {
        fs::rename(&zsh_src, out_dir.join("connlog.zsh"))?;
    }

    let man_path = out_dir.join("connlog.1");
    let mut man_file = fs::File::create(&man_path)?;
    Man::new(cmd).render(&mut man_file)?;
    println!("cargo:warning=Generated man page: {}", man_path.display());

    Ok(())
}
