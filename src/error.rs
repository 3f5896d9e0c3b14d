use thiserror::Error;

#[derive(Error, Debug)]
pub enum DevtoolsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "clang-tidy not found in PATH. Please install clang-tidy:\n  \
         macOS: brew install llvm\n  \
         Windows: Install LLVM from https://llvm.org/builds/"
    )]
    ToolNotFound,

    #[error("could not find project root (no {marker} found above {start})")]
    ProjectRootNotFound { start: String, marker: String },

    #[error("compile_commands.json not found in {dir}")]
    CompileCommandsNotFound { dir: String },

    #[error(
        "compile_commands.json not found!\n\n\
         Create the analysis build first:\n  \
         cmake -B {build_dir} -DCMAKE_DISABLE_PRECOMPILE_HEADERS=ON -DCMAKE_EXPORT_COMPILE_COMMANDS=ON -G Ninja\n\n\
         Or specify a different build with --build-dir"
    )]
    CompileCommandsMissing { build_dir: String },

    #[error("failed to load compile_commands.json ({path}): {detail}")]
    CompileCommandsLoad { path: String, detail: String },

    #[error("invalid path '{path}': expected <group>/<entry>")]
    PathShape { path: String },

    #[error("unify destination must be the core tree, got {tree}")]
    DestinationNotCore { tree: String },

    #[error("the {tree} tree has no opposite variant")]
    NoOppositeTree { tree: String },

    #[error("worker pool error: {0}")]
    Pool(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DevtoolsError>;
