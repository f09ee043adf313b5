//! Fuzz target: `parse_command`
//!
//! Feeds arbitrary UTF-8 lines to the operator console parser.
//!
//! Invariants checked:
//! - No panics under any input
//! - Accepted mode and fan commands re-parse identically from their
//!   canonical spelling
//!
//! cargo fuzz run fuzz_console_command

#![no_main]

use greenhouse::app::commands::{AppCommand, parse_command};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };
    match parse_command(line) {
        Ok(AppCommand::SetMode(mode)) => {
            let again = parse_command(&format!("mode {mode}"));
            assert!(matches!(again, Ok(AppCommand::SetMode(m)) if m == mode));
        }
        Ok(AppCommand::SetFanSpeed(p)) => {
            let again = parse_command(&format!("fan {p}"));
            assert!(matches!(again, Ok(AppCommand::SetFanSpeed(q)) if q == p));
        }
        Ok(_) | Err(_) => {}
    }
});
