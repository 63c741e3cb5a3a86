//! Embedded PowerShell scripts and the runner that executes them
//!
//! Scripts are passed with `-EncodedCommand` so nothing needs to be written
//! to disk. Every value the script consumes travels on stdin, one base64
//! field per line, after a first line naming the action.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use zeroize::Zeroizing;

use crate::error::PlatformResult;

/// Helpers shared by every script: UTF-8 console output and stdin field readers
#[cfg(any(windows, test))]
const PRELUDE: &str = r"$ErrorActionPreference = 'Stop'
[Console]::OutputEncoding = [System.Text.Encoding]::UTF8
function Read-FieldBytes {
    $line = [Console]::In.ReadLine()
    if ([string]::IsNullOrEmpty($line)) { return [byte[]]@() }
    return [Convert]::FromBase64String($line)
}
function Read-Field {
    return [System.Text.Encoding]::UTF8.GetString((Read-FieldBytes))
}
$action = [Console]::In.ReadLine()
";

/// Scripts bundled with the library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// DPAPI protect/unprotect in the current-user scope
    ProtectedData,
    /// Credential Manager write/delete
    CredentialManager,
    /// Top-level window enumeration and activation
    Windows,
}

impl Script {
    /// Script body, without the shared prelude
    #[must_use]
    pub const fn source(self) -> &'static str {
        match self {
            Self::ProtectedData => include_str!("../../scripts/dpapi.ps1"),
            Self::CredentialManager => include_str!("../../scripts/credman.ps1"),
            Self::Windows => include_str!("../../scripts/windows.ps1"),
        }
    }

    /// Human-readable name of the OS facility behind the script
    #[must_use]
    pub const fn facility(self) -> &'static str {
        match self {
            Self::ProtectedData => "DPAPI",
            Self::CredentialManager => "Windows Credential Manager",
            Self::Windows => "Window enumeration",
        }
    }
}

/// Captured result of a script run
#[derive(Debug, Clone)]
pub struct ScriptOutput {
    /// Process exit code, `None` if the process was terminated
    pub code: Option<i32>,
    /// Standard output, lossily decoded as UTF-8
    pub stdout: String,
    /// Standard error, lossily decoded as UTF-8
    pub stderr: String,
}

impl ScriptOutput {
    /// Returns true when the script exited with code 0
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }

    /// Trimmed stderr, or a generic message naming the exit code
    #[must_use]
    pub fn error_message(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            match self.code {
                Some(code) => format!("script exited with code {code}"),
                None => "script was terminated".to_string(),
            }
        } else {
            stderr.to_string()
        }
    }
}

/// Encodes a script for `-EncodedCommand` (base64 of UTF-16LE)
#[must_use]
pub fn encode_command(source: &str) -> String {
    let bytes: Vec<u8> = source.encode_utf16().flat_map(u16::to_le_bytes).collect();
    STANDARD.encode(bytes)
}

/// Builds the stdin payload: the action line followed by one base64 line per field
#[must_use]
pub fn encode_input(action: &str, fields: &[&[u8]]) -> Zeroizing<String> {
    let mut input = Zeroizing::new(String::with_capacity(
        action.len() + 1 + fields.iter().map(|f| f.len() * 4 / 3 + 4).sum::<usize>(),
    ));
    input.push_str(action);
    input.push('\n');
    for field in fields {
        STANDARD.encode_string(*field, &mut *input);
        input.push('\n');
    }
    input
}

/// Runs a bundled script with the given action and stdin fields
///
/// # Errors
///
/// Returns `PlatformError::Spawn` if PowerShell cannot be started or its
/// output cannot be collected.
#[cfg(windows)]
pub fn run_script(script: Script, action: &str, fields: &[&[u8]]) -> PlatformResult<ScriptOutput> {
    use std::io::Write;
    use std::os::windows::process::CommandExt;
    use std::process::{Command, Stdio};

    const CREATE_NO_WINDOW: u32 = 0x0800_0000;

    let source = format!("{PRELUDE}{}", script.source());
    let mut child = Command::new("powershell.exe")
        .args([
            "-NoLogo",
            "-NoProfile",
            "-NonInteractive",
            "-ExecutionPolicy",
            "Bypass",
            "-EncodedCommand",
            &encode_command(&source),
        ])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .creation_flags(CREATE_NO_WINDOW)
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        let input = encode_input(action, fields);
        if let Err(e) = stdin.write_all(input.as_bytes()) {
            drop(stdin);
            reap(&mut child);
            return Err(e.into());
        }
    }

    let output = child.wait_with_output()?;
    let result = ScriptOutput {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    tracing::trace!(
        facility = script.facility(),
        action,
        code = ?result.code,
        "PowerShell script finished"
    );
    Ok(result)
}

/// Kills a child whose input could not be delivered and waits for it to exit
#[cfg(any(windows, test))]
fn reap(child: &mut std::process::Child) {
    if let Err(e) = child.kill() {
        tracing::debug!(error = %e, "PowerShell already exited");
    }
    if let Err(e) = child.wait() {
        tracing::warn!(error = %e, "Failed to wait for PowerShell");
    }
}

/// Runs a bundled script with the given action and stdin fields
///
/// # Errors
///
/// Always returns `PlatformError::Unsupported` on this platform.
#[cfg(not(windows))]
pub fn run_script(
    script: Script,
    _action: &str,
    _fields: &[&[u8]],
) -> PlatformResult<ScriptOutput> {
    Err(crate::error::PlatformError::Unsupported(script.facility()))
}
