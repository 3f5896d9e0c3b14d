use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::tidy::{AnalyzeRequest, RunOptions};
use crate::unify::Tree;

fn default_jobs() -> usize {
    std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

#[derive(Parser, Debug)]
#[command(
    name = "run-clang-tidy",
    version,
    about = "Run clang-tidy over the GeneralsGameCode compile database",
    after_help = "EXAMPLES:\n  \
                  run-clang-tidy --include Core/GameEngine/\n  \
                  run-clang-tidy -j 8 --exclude Dependencies/ -- --checks=-*,modernize-*\n  \
                  run-clang-tidy Core/GameEngine/Source/Common/crc.cpp\n\n\
                  Generate the compile database first:\n  \
                  cmake -B build/clang-tidy -DCMAKE_DISABLE_PRECOMPILE_HEADERS=ON -G Ninja"
)]
pub struct TidyCli {
    /// Build directory holding compile_commands.json (auto-detected if omitted)
    #[arg(short, long)]
    pub build_dir: Option<PathBuf>,

    /// Only analyze files whose path contains this text (repeatable)
    #[arg(short, long)]
    pub include: Vec<String>,

    /// Skip files whose path contains this text (repeatable)
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Apply suggested fixes
    #[arg(long)]
    pub fix: bool,

    /// Parallel clang-tidy processes (1 runs batches sequentially)
    #[arg(short, long, default_value_t = default_jobs())]
    pub jobs: usize,

    /// Print commands and progress details
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not load the project clang-tidy plugin
    #[arg(long)]
    pub no_plugin: bool,

    /// Print the final report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Project root (default: nearest ancestor with CMakeLists.txt)
    #[arg(long)]
    pub project_root: Option<PathBuf>,

    /// Files to analyze and/or extra clang-tidy arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl TidyCli {
    #[must_use]
    pub fn request(&self) -> AnalyzeRequest {
        AnalyzeRequest {
            build_dir: self.build_dir.clone(),
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            positionals: self.args.clone(),
            options: RunOptions {
                extra_args: Vec::new(),
                fix: self.fix,
                jobs: self.jobs.max(1),
                verbose: self.verbose,
                load_plugin: !self.no_plugin,
                json: self.json,
            },
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "unify-files",
    version,
    about = "Move source files from a game variant tree into Core",
    after_help = "Paths are relative to the tree root and start with the build list group, \
                  e.g. GameEngine/Source/Common/crc.cpp edits GameEngine/CMakeLists.txt."
)]
pub struct UnifyCli {
    /// Project root (default: nearest ancestor with CMakeLists.txt)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Log each step
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: UnifyCommand,
}

#[derive(Subcommand, Debug)]
pub enum UnifyCommand {
    /// Unify a file present in both Generals and Zero Hour.
    ///
    /// Comments it out of both variants' build lists, enables it in Core,
    /// deletes the other variant's copy and moves this variant's copy.
    File {
        /// Variant whose copy is kept
        #[arg(value_enum)]
        from: Tree,
        /// Tree-relative path, e.g. GameEngine/Include/Common/crc.h
        file: String,
        /// Destination path in Core (default: same as FILE)
        to_file: Option<String>,
    },

    /// Move a file that only exists in one variant into Core
    Move {
        #[arg(value_enum)]
        from: Tree,
        file: String,
        to_file: Option<String>,
    },

    /// Apply every operation listed in a TOML plan file
    Plan {
        path: PathBuf,
    },
}
