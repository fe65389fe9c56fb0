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

use crate::helpers::*;
use anyhow::Result;
use std::time::Instant;

/// One cargo invocation with its console presentation.
pub struct Task {
    pub title: &'static str,
    pub label: &'static str,
    pub emoji: &'static str,
    pub color: &'static str,
    pub info: &'static str,
    pub args: Vec<String>,
}

impl Task {
    pub fn run(&self) -> Result<()> {
        print_task_start(self.title, self.emoji, self.color);
        print_info(self.info);
        execute_command("cargo", &self.args, self.label)
    }
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

pub fn build(release: bool) -> Task {
    let mut cargo_args = args(&["build", "--workspace", "--exclude", "xtask"]);
    if release {
        cargo_args.push("--release".into());
    }
    Task {
        title: "Building All Crates",
        label: "Build",
        emoji: HAMMER,
        color: BLUE,
        info: if release {
            "Compiling all workspace crates in release mode"
        } else {
            "Compiling all workspace crates in debug mode"
        },
        args: cargo_args,
    }
}

pub fn test(package: Option<&str>) -> Task {
    let cargo_args = match package {
        Some(package) => args(&["test", "-p", package]),
        None => args(&["test", "--workspace"]),
    };
    Task {
        title: "Running Tests",
        label: "Tests",
        emoji: TEST_TUBE,
        color: GREEN,
        info: "Running unit tests, integration tests and doc tests",
        args: cargo_args,
    }
}

pub fn check() -> Task {
    Task {
        title: "Checking All Crates",
        label: "Check",
        emoji: MAGNIFIER,
        color: CYAN,
        info: "Checking code for errors without building executables",
        args: args(&["check", "--workspace", "--all-targets"]),
    }
}

pub fn format(check_only: bool) -> Task {
    // `fmt` takes `--all`, not `--workspace`.
    let mut cargo_args = args(&["fmt", "--all"]);
    if check_only {
        cargo_args.extend(args(&["--", "--check"]));
    }
    Task {
        title: "Formatting Code",
        label: "Format",
        emoji: BRUSH,
        color: MAGENTA,
        info: "Formatting code using rustfmt with default settings",
        args: cargo_args,
    }
}

pub fn clippy() -> Task {
    Task {
        title: "Running Clippy",
        label: "Clippy",
        emoji: CLIPPY,
        color: YELLOW,
        info: "Running Clippy linter with warnings as errors",
        args: args(&["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"]),
    }
}

pub fn bench(name: Option<&str>) -> Task {
    let mut cargo_args = args(&["bench", "--workspace"]);
    if let Some(name) = name {
        cargo_args.extend(args(&["--bench", name]));
    }
    Task {
        title: "Running Benchmarks",
        label: "Bench",
        emoji: STOPWATCH,
        color: RED,
        info: "Running criterion benchmarks (filter scans, scene graph passes)",
        args: cargo_args,
    }
}

/// Runs build, test, check, format check and clippy, then prints a summary.
/// Every phase runs even if an earlier one failed.
pub fn ci() -> Result<()> {
    print_banner();
    println!("{BOLD}{CYAN}Starting full build pipeline...{RESET}");
    println!("{BOLD}💡 Pipeline:{RESET} build → test → check → format → clippy");

    let start_time = Instant::now();
    let tasks = [build(false), test(None), check(), format(true), clippy()];
    let total_tasks = tasks.len();
    let mut failed = Vec::new();

    for (i, task) in tasks.iter().enumerate() {
        println!("\n{BOLD}{BLUE}[{}/{total_tasks}] {} Phase{RESET}", i + 1, task.label);
        if task.run().is_err() {
            failed.push(task.label);
        }
    }

    println!("\n{BOLD}{CYAN}╔═══════════════════════════════════════╗{RESET}");
    println!("{BOLD}{CYAN}║            PIPELINE SUMMARY           ║{RESET}");
    println!("{BOLD}{CYAN}╚═══════════════════════════════════════╝{RESET}");

    if failed.is_empty() {
        println!("{BOLD}{GREEN} {CHECK} All {total_tasks} tasks completed successfully! {FLAME}{RESET}");
    } else {
        println!(
            "{BOLD}{YELLOW} ⚠ {}/{total_tasks} tasks completed, failed: {}{RESET}",
            total_tasks - failed.len(),
            failed.join(", ")
        );
    }
    println!(
        "{BOLD}{BLUE}Total time: {:.2}s{RESET}",
        start_time.elapsed().as_secs_f64()
    );

    if !failed.is_empty() {
        anyhow::bail!("Pipeline failed: {}", failed.join(", "));
    }
    Ok(())
}
