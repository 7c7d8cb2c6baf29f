// Minimal integration test that drives the compiled binary through a PTY.
// This exercises the real event loop and crossterm input handling across
// the main boundaries without relying on internal modules.
//
// Notes:
// - Requires a TTY; uses expectrl which allocates a pseudo terminal.
// - Marked Unix-only and ignored by default to avoid CI/platform issues.
// - Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn minimal_session_starts_expires_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("speedtyper");
    let cmd = format!("{} --no-save -w 5 -s 2", bin.display());

    let mut p = spawn(cmd)?;

    // Give the app a moment to initialize the terminal/alternate screen
    std::thread::sleep(Duration::from_millis(200));

    // Enter starts the clock; type something while it runs
    p.send("\r")?;
    p.send("abc")?;

    // Let the two second session run out
    std::thread::sleep(Duration::from_millis(2500));

    // Send ESC to exit (handled in every phase)
    p.send("\x1b")?;

    p.expect(Eof)?;
    Ok(())
}
