//! Builds the `proc-fixture-native` cdylib once per test run and
//! installs copies of it under whatever package name a test needs.
//!
//! Grounded in the same "compile an artifact at test-run time, not at
//! authoring time" pattern the c-api test runner uses for its own
//! fixtures, adapted to ask cargo itself for the resulting path
//! (`--message-format=json`) instead of guessing target-dir naming.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;
use std::time::Duration;

use proc_func::{AccessBitmap, Credentials, PrivilegeStore, UserDirectory, UserId};
use proc_path::DYLIB_EXTENSION;

/// Grants every user full access to every function — these tests are
/// about load/symbol/dispatch plumbing, not access control.
pub struct AllowAll;

impl PrivilegeStore for AllowAll {
    fn class_grant(&self, _user: UserId) -> AccessBitmap {
        AccessBitmap::EXECUTE | AccessBitmap::USE
    }

    fn function_grant(&self, _user: UserId, _function: &str) -> AccessBitmap {
        AccessBitmap::EXECUTE | AccessBitmap::USE
    }
}

/// A user directory with no entries; fine whenever a test never takes
/// the setuid path.
pub struct NoUsers;

impl UserDirectory for NoUsers {
    fn lookup(&self, _id: UserId) -> Option<Credentials> {
        None
    }
}

pub fn full_access(user: u32) -> Credentials {
    Credentials {
        user: UserId(user),
        universal_access: AccessBitmap::EXECUTE | AccessBitmap::USE,
    }
}

pub fn fixture_artifact() -> &'static Path {
    static ARTIFACT: OnceLock<PathBuf> = OnceLock::new();
    ARTIFACT.get_or_init(build_fixture)
}

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(Path::parent)
        .expect("proc-runtime lives two directories below the workspace root")
        .to_path_buf()
}

fn build_fixture() -> PathBuf {
    let root = workspace_root();
    let output = Command::new(env!("CARGO"))
        .args([
            "build",
            "-p",
            "proc-fixture-native",
            "--message-format=json",
        ])
        .current_dir(&root)
        .output()
        .expect("failed to invoke cargo to build the native test fixture");

    assert!(
        output.status.success(),
        "building proc-fixture-native failed:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines() {
        let Ok(msg) = serde_json::from_str::<serde_json::Value>(line) else {
            continue;
        };
        if msg.get("reason").and_then(|v| v.as_str()) != Some("compiler-artifact") {
            continue;
        }
        let is_fixture = msg
            .get("target")
            .and_then(|t| t.get("name"))
            .and_then(|n| n.as_str())
            == Some("proc_fixture_native");
        if !is_fixture {
            continue;
        }
        if let Some(filenames) = msg.get("filenames").and_then(|f| f.as_array()) {
            for name in filenames {
                if let Some(path) = name.as_str() {
                    if path.ends_with(".so") || path.ends_with(".dylib") || path.ends_with(".dll")
                    {
                        return PathBuf::from(path);
                    }
                }
            }
        }
    }
    panic!("cargo build did not report a cdylib artifact for proc-fixture-native");
}

/// Copy the compiled fixture into `dir` under the name a `DirectorySearch`
/// expects for `package` (`<dir>/<package>.<ext>`). Returns the path.
pub fn install_fixture(dir: &Path, package: &str) -> PathBuf {
    let dest = dir.join(format!("{package}.{DYLIB_EXTENSION}"));
    std::fs::copy(fixture_artifact(), &dest).expect("failed to copy native test fixture");
    dest
}

/// Force `path`'s mtime forward by a couple of seconds so a subsequent
/// `load_or_get` sees a different [`proc_module::FileStamp`] regardless
/// of filesystem mtime-resolution granularity.
pub fn bump_mtime(path: &Path) {
    let current = std::fs::metadata(path)
        .expect("stat fixture for mtime bump")
        .modified()
        .expect("filesystem doesn't support mtime");
    let file = std::fs::File::open(path).expect("reopen fixture for mtime bump");
    file.set_modified(current + Duration::from_secs(2))
        .expect("failed to bump fixture mtime");
}
