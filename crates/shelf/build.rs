use std::fs;
use std::path::Path;

use clap::CommandFactory;

// The command tree only needs clap and clap_complete, both of which are
// build-dependencies, so the module compiles here on its own.
#[path = "src/cli.rs"]
#[allow(dead_code)]
mod cli;

fn main() {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let Some(out_dir) = std::env::var_os("OUT_DIR") else {
        panic!("cargo did not set OUT_DIR");
    };
    let man_dir = Path::new(&out_dir).join("man");
    fs::create_dir_all(&man_dir).unwrap_or_else(|e| panic!("creating {}: {e}", man_dir.display()));

    // One page per visible command; `shelf config show` becomes
    // `shelf-config-show.1`.
    let mut pending = vec![cli::Cli::command()];
    while let Some(cmd) = pending.pop() {
        write_page(&cmd, &man_dir);

        let prefix = cmd.get_name().to_owned();
        pending.extend(
            cmd.get_subcommands()
                .filter(|sub| !sub.is_hide_set())
                .map(|sub| sub.clone().name(format!("{prefix}-{}", sub.get_name()))),
        );
    }
}

fn write_page(cmd: &clap::Command, dir: &Path) {
    let page = dir.join(format!("{}.1", cmd.get_name()));
    let mut roff = Vec::new();
    clap_mangen::Man::new(cmd.clone())
        .render(&mut roff)
        .unwrap_or_else(|e| panic!("rendering {}: {e}", page.display()));
    fs::write(&page, roff).unwrap_or_else(|e| panic!("writing {}: {e}", page.display()));
}
