//! Terminal I/O utilities for CLI.

use std::io::{self, IsTerminal};

pub fn is_stdin_tty() -> bool {
    io::stdin().is_terminal()
}

// log_status! macro is defined in lib.rs (#[macro_export]) and available crate-wide.
