// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Build automation and scripting tasks for the Ember engine
// Run with: cargo xtask <command>

mod commands;
mod helpers;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::ci;

#[derive(Parser)]
#[command(name = "xtask", version, about = "Ember engine build automation")]
struct Cli {
    #[command(subcommand)]
    command: Option<Task>,
}

#[derive(Subcommand)]
enum Task {
    /// Build all crates in the workspace.
    Build {
        /// Build with the release profile.
        #[arg(long)]
        release: bool,
    },
    /// Run all tests, or those of one package.
    Test {
        /// Only test this package.
        #[arg(short, long)]
        package: Option<String>,
    },
    /// Run `cargo check` on all crates and targets.
    Check,
    /// Format all code in the workspace.
    Fmt {
        /// Only verify formatting.
        #[arg(long)]
        check: bool,
    },
    /// Run clippy on all crates with warnings as errors.
    Clippy,
    /// Run the criterion benchmarks.
    Bench {
        /// Only run this bench target.
        name: Option<String>,
    },
    /// Run every CI task (build, test, check, format, clippy).
    Ci,
}

fn main() -> Result<()> {
    let Some(task) = Cli::parse().command else {
        helpers::print_banner();
        println!("Run `cargo xtask help` for the list of commands.");
        return Ok(());
    };

    match task {
        Task::Build { release } => ci::build(release).run(),
        Task::Test { package } => ci::test(package.as_deref()).run(),
        Task::Check => ci::check().run(),
        Task::Fmt { check } => ci::format(check).run(),
        Task::Clippy => ci::clippy().run(),
        Task::Bench { name } => ci::bench(name.as_deref()).run(),
        Task::Ci => ci::ci(),
    }
}
