#![allow(dead_code)]

use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use numsed::codegen::Expander;
use numsed::{compile, format_error, Config};
use tempfile::NamedTempFile;

/// Whether a `sed` supporting `-E` can be spawned here.
pub fn sed_available() -> bool {
    static AVAILABLE: OnceLock<bool> = OnceLock::new();
    *AVAILABLE.get_or_init(|| {
        Command::new("sed")
            .args(["-n", "-E", "p"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    })
}

/// Run a generated script the way it is meant to be run: `sed -n -E -f`
/// over a single input line.
pub fn run_sed(script: &str) -> Result<String, String> {
    let mut file = NamedTempFile::new().map_err(|e| e.to_string())?;
    file.write_all(script.as_bytes()).map_err(|e| e.to_string())?;
    file.flush().map_err(|e| e.to_string())?;

    let mut child = Command::new("sed")
        .arg("-n")
        .arg("-E")
        .arg("-f")
        .arg(file.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| e.to_string())?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(b"0\n").map_err(|e| e.to_string())?;
    }
    let out = child.wait_with_output().map_err(|e| e.to_string())?;
    if !out.status.success() {
        return Err(format!(
            "sed exited with {:?}: {}",
            out.status.code(),
            String::from_utf8_lossy(&out.stderr)
        ));
    }
    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}

/// Compile `source` and run it, returning the printed lines.
pub fn run_program(source: &str) -> Result<Vec<String>, String> {
    let script = compile(source, &Config::default()).map_err(|e| format_error(source, &e))?;
    let stdout = run_sed(&script)?;
    Ok(stdout.lines().map(str::to_string).collect())
}

/// Expand `body` and run it with the registers seeded to `ps` and `hs`,
/// returning both registers afterwards. Seeds must not contain `/` or `&`.
pub fn run_template(body: &str, ps: &str, hs: &str) -> Result<(String, String), String> {
    let expanded = Expander::new(Config::default())
        .expand(body)
        .map_err(|e| e.to_string())?;
    let script = format!("s/.*/{hs}/\nx\ns/.*/{ps}/\n{expanded}p\nx\np\n");
    let stdout = run_sed(&script)?;
    let mut lines = stdout.lines();
    match (lines.next(), lines.next()) {
        (Some(ps), Some(hs)) => Ok((ps.to_string(), hs.to_string())),
        _ => Err(format!("expected two registers, got {stdout:?}")),
    }
}
