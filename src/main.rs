/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! `seminize`: transform a TGBA into an equivalent semi-deterministic or
//! cut-deterministic Buchi automaton.

use clap::Parser;
use seminize::cli::Cli;
use seminize::driver;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    std::process::exit(driver::run(&cli));
}
