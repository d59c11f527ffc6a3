#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// Isolated data directory and config file for one test.
pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    pub fn new() -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        fs::create_dir_all(dir.path().join("data"))?;
        fs::write(dir.path().join("config.toml"), "")?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join("config.toml");
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn write_file(&self, name: &str, contents: &[u8]) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// `tt` with the data dir and config pinned to this environment.
    pub fn tt(&self) -> Command {
        let mut cmd = tt_cmd();
        cmd.env("TT_DATA_DIR", self.data_dir())
            .env("TT_CONFIG", self.dir.path().join("config.toml"))
            .env_remove("TT_USER")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run `tt --json <args>` and return the `data` field of the envelope.
    pub fn json(&self, args: &[&str]) -> Result<Value, Box<dyn std::error::Error>> {
        let output = self.tt().arg("--json").args(args).output()?;
        if !output.status.success() {
            return Err(format!(
                "tt {:?} failed: {}",
                args,
                String::from_utf8_lossy(&output.stdout)
            )
            .into());
        }
        let value: Value = serde_json::from_slice(&output.stdout)?;
        Ok(value["data"].clone())
    }

    /// Add a task and return its id.
    pub fn add(&self, args: &[&str]) -> Result<String, Box<dyn std::error::Error>> {
        let mut full = vec!["add"];
        full.extend_from_slice(args);
        let data = self.json(&full)?;
        data["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| "add returned no id".into())
    }
}

pub fn tt_cmd() -> Command {
    Command::cargo_bin("tt").expect("binary")
}

pub fn texts(tasks: &Value) -> Vec<String> {
    tasks
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["todo"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
