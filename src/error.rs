/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Driver-level errors: wraps the engine's recoverable errors with the
//! file-and-location context the engine itself doesn't know about, plus the
//! I/O and CLI-parsing failures that only exist at this layer.

use std::path::PathBuf;
use thiserror::Error;

/// A failure processing one input, or the whole invocation.
#[derive(Debug, Error)]
pub enum Error {
    /// Could not read an input file.
    #[error("{path}: {source}")]
    Io {
        /// The file that failed to open or read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The HOA parser rejected the input text.
    #[error("{path}: failed to parse HOA automaton: {reason}")]
    HoaParse {
        /// The file (or `<stdin>`) the text came from.
        path: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The input parsed, but is not shaped the way the engine requires.
    #[error("{path}: {source}")]
    Engine {
        /// The file (or `<stdin>`) the automaton came from.
        path: String,
        /// Underlying engine error.
        #[source]
        source: seminize_automata::Error,
    },
}

impl Error {
    /// The exit code this error should map to: every
    /// variant here is a user/input error, never a CLI-parsing error (those
    /// are reported directly by `clap` with exit code 2).
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        1
    }
}
