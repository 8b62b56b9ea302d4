/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Driver crate: command-line parsing, the HOA text adapter, and job-variant
//! selection on top of the `seminize-automata` engine. See `automata/` for
//! the construction itself; this crate is everything outside
//! of scope" for the core.

#![allow(unknown_lints)]
#![warn(clippy::all, clippy::perf, elided_lifetimes_in_paths)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

pub mod cli;
pub mod driver;
pub mod error;
pub mod hoa;
