// SPDX-License-Identifier: Apache-2.0

//! Startup command materialization
//!
//! After all layers are applied, the image's effective startup argv is
//! written as an executable script at a fixed path under the rootfs,
//! and its environment as a sibling file of `export` lines. An image
//! with neither is left as-is; that is a valid outcome, not an error.

use crate::error::{Error, Result};

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Path of the generated startup script under the rootfs.
pub const RUNSCRIPT: &str = ".runscript";

/// Path of the materialized image environment under the rootfs.
pub const ENVIRONMENT: &str = ".environment";

/// Writes the startup script, mode 0755.
///
/// The script execs `argv` verbatim; each argument is single-quoted so
/// the shell performs no re-interpretation beyond the invocation
/// itself. Extra arguments at run time are passed through.
pub fn write_runscript(rootfs: &Path, argv: &[String]) -> Result<PathBuf> {
    let mut script = String::from("#!/bin/sh\nexec");
    for arg in argv {
        script.push(' ');
        script.push_str(&quote(arg));
    }
    script.push_str(" \"$@\"\n");

    write_executable(rootfs.join(RUNSCRIPT), &script)
}

/// Writes the image environment as `export KEY='VALUE'` lines.
///
/// `env` holds the wire encoding, one `KEY=VALUE` string per entry;
/// entries without a separator are skipped.
pub fn write_environment(rootfs: &Path, env: &[String]) -> Result<PathBuf> {
    let mut body = String::from("#!/bin/sh\n");
    for entry in env {
        if let Some((key, value)) = entry.split_once('=') {
            body.push_str(&format!("export {}={}\n", key, quote(value)));
        } else {
            log::warn!("skipping malformed environment entry: {:?}", entry);
        }
    }

    write_executable(rootfs.join(ENVIRONMENT), &body)
}

fn write_executable(path: PathBuf, body: &str) -> Result<PathBuf> {
    let failed = |err| Error::Runscript {
        path: path.clone(),
        source: err,
    };

    std::fs::write(&path, body).map_err(failed)?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).map_err(failed)?;

    Ok(path)
}

// POSIX single-quoting: close, escaped quote, reopen.
fn quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}
