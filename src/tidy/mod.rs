//! clang-tidy runner.
//!
//! Resolves the analysis build's compile database, narrows it to the files
//! of interest, runs clang-tidy over them in batches and prints a per-file
//! summary of everything it reported.

pub mod aggregate;
pub mod compile_db;
pub mod dispatch;
pub mod filter;
pub mod locate;
pub mod tool;

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::output::{self, JsonReport};
use crate::config::Config;
use crate::error::Result;

use dispatch::{ClangTidyRunner, DispatchOutcome, Dispatcher};

/// Exit code returned when the operator interrupts a run.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Per-run analyzer options.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Arguments passed through to clang-tidy.
    pub extra_args: Vec<String>,
    pub fix: bool,
    pub jobs: usize,
    pub verbose: bool,
    /// Auto-load the project plugin when one is built.
    pub load_plugin: bool,
    /// Print the final report as JSON.
    pub json: bool,
}

/// A full analysis request as given on the command line.
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub build_dir: Option<PathBuf>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Trailing positionals: explicit files and/or analyzer arguments.
    pub positionals: Vec<String>,
    pub options: RunOptions,
}

/// Resolve inputs, select files and run the analyzer. Returns the exit code.
pub fn analyze(
    config: &Config,
    request: &AnalyzeRequest,
    interrupt: Arc<AtomicBool>,
) -> Result<i32> {
    let json = request.options.json;
    let compile_commands = locate::find_compile_commands(config, request.build_dir.as_deref())?;
    output::notice(
        json,
        &format!("Using compile commands: {}\n", compile_commands.display()),
    );

    let positionals = filter::classify_positionals(&request.positionals, &config.project_root);
    let mut options = request.options.clone();
    options.extra_args = positionals.passthrough;

    if !positionals.files.is_empty() {
        if options.verbose {
            output::notice(
                json,
                &format!("Analyzing {} specified file(s)\n", positionals.files.len()),
            );
        }
        return run_clang_tidy(config, &positionals.files, &compile_commands, &options, interrupt);
    }

    let entries = compile_db::load_compile_commands(&compile_commands)?;
    let mut exclude = config.settings.filter.exclude_patterns.clone();
    exclude.extend(request.exclude.iter().cloned());

    let files =
        filter::filter_source_files(&entries, &config.project_root, &request.include, &exclude);
    tracing::info!(
        entries = entries.len(),
        selected = files.len(),
        "filtered compile database"
    );

    if files.is_empty() {
        output::notice(json, "No source files found matching the criteria.");
        return Ok(1);
    }
    if options.verbose {
        output::notice(
            json,
            &format!("Found {} source file(s) to analyze\n", files.len()),
        );
    }

    run_clang_tidy(config, &files, &compile_commands, &options, interrupt)
}

/// Run clang-tidy over `files` in batches and print the aggregated report.
pub fn run_clang_tidy(
    config: &Config,
    files: &[String],
    compile_commands: &Path,
    options: &RunOptions,
    interrupt: Arc<AtomicBool>,
) -> Result<i32> {
    if files.is_empty() {
        output::notice(options.json, "No source files to analyze.");
        return Ok(0);
    }

    let exe = tool::find_clang_tidy(config)?;

    let mut extra_args = options.extra_args.clone();
    if options.load_plugin {
        if let Some(plugin) = locate::find_plugin(config) {
            report_plugin(config, &exe, &plugin, options);
            extra_args = with_plugin(&plugin, extra_args);
        }
    }

    let runner = ClangTidyRunner {
        exe,
        compile_dir: compile_commands
            .parent()
            .map_or_else(|| config.project_root.clone(), Path::to_path_buf),
        fix: options.fix,
        extra_args,
        project_root: config.project_root.clone(),
    };

    let outcome = Dispatcher::new(&runner, &config.project_root)
        .batch_size(config.settings.analysis.effective_batch_size())
        .jobs(options.jobs)
        .verbose(options.verbose)
        .progress(!options.json)
        .interrupt(interrupt)
        .run(files)?;

    match outcome {
        DispatchOutcome::NoFiles => {
            output::notice(options.json, "No source files to analyze.");
            Ok(0)
        }
        DispatchOutcome::Interrupted => {
            output::notice(options.json, "\nInterrupted by user.");
            Ok(INTERRUPTED_EXIT_CODE)
        }
        DispatchOutcome::Completed { exit_code, report } => {
            if options.json {
                println!("{}", output::format_json(&JsonReport::new(exit_code, &report)));
            } else {
                print!("{}", report.render());
            }
            Ok(exit_code)
        }
    }
}

/// Prepend `-load <plugin>` unless the analyzer arguments already load one.
#[must_use]
pub fn with_plugin(plugin: &Path, extra_args: Vec<String>) -> Vec<String> {
    if extra_args.join(" ").contains("-load") {
        return extra_args;
    }
    let mut args = vec!["-load".to_string(), plugin.to_string_lossy().into_owned()];
    args.extend(extra_args);
    args
}

/// Notes reminding the operator that the plugin must match the analyzer's LLVM.
#[must_use]
pub fn plugin_notes(plugin: &Path, llvm_version: Option<&str>, verbose: bool) -> Vec<String> {
    match (llvm_version, verbose) {
        (Some(version), true) => vec![
            format!("Found clang-tidy plugin: {}", plugin.display()),
            format!("Using clang-tidy LLVM version: {version}"),
            "Note: Ensure the plugin was built with the same LLVM version \
             (check CMake build output).\n"
                .to_string(),
        ],
        (Some(version), false) => vec![format!(
            "Note: Verify plugin was built with LLVM {version} (check CMake build output)"
        )],
        (None, true) => vec![format!("Found clang-tidy plugin: {}\n", plugin.display())],
        (None, false) => Vec::new(),
    }
}

fn report_plugin(config: &Config, exe: &str, plugin: &Path, options: &RunOptions) {
    let timeout = Duration::from_secs(config.settings.analysis.probe_timeout_secs);
    let version = tool::probe_version(exe, timeout)
        .as_deref()
        .and_then(tool::extract_llvm_version);

    for note in plugin_notes(plugin, version.as_deref(), options.verbose) {
        output::notice(options.json, &note);
    }
}
