//! Shared helpers for CLI tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// A temporary working directory with an isolated config file.
pub struct Sandbox {
    pub dir: TempDir,
    pub config: PathBuf,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("pypeline.toml");
        fs::write(
            &config,
            "[defaults]\ngit = false\n\n[dependencies]\ndefaults = [\"pandas>=2.3.3\", \"numpy>=2.3.4\"]\n",
        )
        .unwrap();
        Self { dir, config }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// `pypeline` run from `cwd` with `--config` set and user config isolated.
    pub fn cmd_in(&self, cwd: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("pypeline");
        cmd.current_dir(cwd)
            .env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path().join(".config"))
            .env_remove("RUST_LOG")
            .env_remove("NO_COLOR")
            .arg("--config")
            .arg(&self.config);
        for (key, _) in std::env::vars() {
            if key.starts_with("PYPELINE_") {
                cmd.env_remove(key);
            }
        }
        cmd
    }

    pub fn cmd(&self) -> Command {
        self.cmd_in(self.path())
    }

    /// Run `init` for `name` with every field on the command line.
    pub fn init(&self, name: &str) -> PathBuf {
        self.cmd()
            .args([
                "init",
                "--name",
                name,
                "--author-name",
                "Jane Doe",
                "--author-email",
                "jane@example.com",
                "--description",
                "Daily sales loads",
                "--license",
                "MIT",
                "--no-git",
            ])
            .assert()
            .success();
        self.path().join(name.replace('-', "_"))
    }
}

pub fn read(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    fs::read_to_string(path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}
