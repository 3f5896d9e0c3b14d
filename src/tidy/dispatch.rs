//! Batched analyzer execution, sequential or on a fixed-size worker pool.
//!
//! Files are cut into contiguous batches so a single invocation never
//! exceeds platform command-line limits. A failing batch never stops the
//! remaining ones; the first non-zero exit code is reported at the end.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::config::MAX_BATCH_SIZE;
use crate::error::{DevtoolsError, Result};
use crate::tidy::aggregate::{parse_output, IssueMap, IssueReport};

/// Raw result of one analyzer invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutput {
    pub exit_code: i32,
    /// stdout followed by stderr.
    pub text: String,
}

/// Something that can analyze one batch of files.
pub trait BatchRunner: Sync {
    fn run_batch(&self, batch: &[String]) -> BatchOutput;
}

/// Runs the real clang-tidy executable.
#[derive(Debug, Clone)]
pub struct ClangTidyRunner {
    pub exe: String,
    /// Directory containing `compile_commands.json`.
    pub compile_dir: PathBuf,
    pub fix: bool,
    pub extra_args: Vec<String>,
    pub project_root: PathBuf,
}

impl ClangTidyRunner {
    /// Arguments for one invocation; the batch's files always come last.
    #[must_use]
    pub fn command_args(&self, batch: &[String]) -> Vec<String> {
        let mut args = vec![format!("-p={}", self.compile_dir.display())];
        if self.fix {
            args.push("--fix".into());
        }
        args.extend(self.extra_args.iter().cloned());
        args.extend(batch.iter().cloned());
        args
    }
}

impl BatchRunner for ClangTidyRunner {
    fn run_batch(&self, batch: &[String]) -> BatchOutput {
        let args = self.command_args(batch);
        tracing::debug!(exe = %self.exe, files = batch.len(), "spawning analyzer");

        match Command::new(&self.exe)
            .args(&args)
            .current_dir(&self.project_root)
            .output()
        {
            Ok(output) => {
                let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
                text.push_str(&String::from_utf8_lossy(&output.stderr));
                let exit_code = output.status.code().unwrap_or(1);
                tracing::debug!(exit_code, "analyzer finished");
                BatchOutput { exit_code, text }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::error!("clang-tidy not found. Please install LLVM/Clang.");
                BatchOutput {
                    exit_code: 1,
                    text: String::new(),
                }
            }
            Err(e) => {
                tracing::error!("failed to run {}: {e}", self.exe);
                BatchOutput {
                    exit_code: 1,
                    text: String::new(),
                }
            }
        }
    }
}

/// Split `files` into contiguous batches of at most `size` entries.
#[must_use]
pub fn make_batches(files: &[String], size: usize) -> Vec<&[String]> {
    files.chunks(size.clamp(1, MAX_BATCH_SIZE)).collect()
}

/// Per-batch result after parsing.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub exit_code: i32,
    pub issues: IssueMap,
}

/// How a dispatch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Nothing to analyze; no process was started.
    NoFiles,
    /// Every batch ran. `exit_code` is the first non-zero batch code, or 0.
    Completed { exit_code: i32, report: IssueReport },
    /// The interrupt flag was raised before all batches finished.
    Interrupted,
}

pub struct Dispatcher<'a, R: BatchRunner> {
    runner: &'a R,
    project_root: &'a Path,
    batch_size: usize,
    jobs: usize,
    verbose: bool,
    progress: bool,
    interrupt: Arc<AtomicBool>,
}

impl<'a, R: BatchRunner> Dispatcher<'a, R> {
    pub fn new(runner: &'a R, project_root: &'a Path) -> Self {
        Self {
            runner,
            project_root,
            batch_size: MAX_BATCH_SIZE,
            jobs: 1,
            verbose: false,
            progress: true,
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    #[must_use]
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Enable or disable progress output on stdout.
    #[must_use]
    pub fn progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Share an interrupt flag (set from a signal handler).
    #[must_use]
    pub fn interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = flag;
        self
    }

    fn interrupted(&self) -> bool {
        self.interrupt.load(Ordering::SeqCst)
    }

    fn run_one(&self, batch: &[String]) -> BatchResult {
        let output = self.runner.run_batch(batch);
        BatchResult {
            exit_code: output.exit_code,
            issues: parse_output(&output.text, self.project_root, self.verbose),
        }
    }

    /// Analyze every file, batch by batch.
    pub fn run(&self, files: &[String]) -> Result<DispatchOutcome> {
        if files.is_empty() {
            return Ok(DispatchOutcome::NoFiles);
        }
        let batches = make_batches(files, self.batch_size);

        if self.jobs > 1 {
            self.run_parallel(files.len(), &batches)
        } else {
            Ok(self.run_sequential(files.len(), &batches))
        }
    }

    fn run_parallel(&self, total: usize, batches: &[&[String]]) -> Result<DispatchOutcome> {
        if self.progress {
            if self.verbose {
                println!(
                    "Running clang-tidy on {total} file(s) in {} batch(es) with {} workers...\n",
                    batches.len(),
                    self.jobs
                );
            } else {
                print!("Analyzing {total} file(s) with {} workers...", self.jobs);
                let _ = std::io::stdout().flush();
            }
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| DevtoolsError::Pool(e.to_string()))?;

        // Workers that see the flag skip their batch; running ones finish.
        let results: Vec<Option<BatchResult>> = pool.install(|| {
            batches
                .par_iter()
                .map(|batch| (!self.interrupted()).then(|| self.run_one(batch)))
                .collect()
        });

        if self.interrupted() || results.iter().any(Option::is_none) {
            return Ok(DispatchOutcome::Interrupted);
        }

        let mut exit_code = 0;
        let mut report = IssueReport::default();
        for result in results.into_iter().flatten() {
            if exit_code == 0 && result.exit_code != 0 {
                exit_code = result.exit_code;
            }
            report.merge(result.issues);
        }

        if self.progress && !self.verbose {
            println!(" done.");
        }
        Ok(DispatchOutcome::Completed { exit_code, report })
    }

    fn run_sequential(&self, total: usize, batches: &[&[String]]) -> DispatchOutcome {
        let count = batches.len();
        if self.progress {
            if self.verbose {
                println!("Running clang-tidy on {total} file(s) in {count} batch(es)...\n");
            } else {
                print!("Analyzing {total} file(s)...");
                let _ = std::io::stdout().flush();
            }
        }

        let mut exit_code = 0;
        let mut report = IssueReport::default();
        for (idx, batch) in batches.iter().enumerate() {
            let batch_num = idx + 1;
            if self.interrupted() {
                return DispatchOutcome::Interrupted;
            }
            if self.progress && self.verbose {
                println!("Batch {batch_num}/{count}: {} file(s)...", batch.len());
            }

            let result = self.run_one(batch);
            if self.interrupted() {
                return DispatchOutcome::Interrupted;
            }
            if result.exit_code != 0 {
                tracing::debug!(batch = batch_num, exit_code = result.exit_code, "batch failed");
                if exit_code == 0 {
                    exit_code = result.exit_code;
                }
            }
            report.merge(result.issues);

            if self.progress && !self.verbose && batch_num < count {
                print!(".");
                let _ = std::io::stdout().flush();
            }
        }

        if self.progress && !self.verbose {
            println!(" done.");
        }
        DispatchOutcome::Completed { exit_code, report }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    /// Emits one warning per file; files listed in `fail` make their batch exit non-zero.
    struct MockRunner {
        calls: AtomicUsize,
        seen: Mutex<Vec<Vec<String>>>,
        fail: HashMap<String, i32>,
        interrupt_after: Option<(usize, Arc<AtomicBool>)>,
    }

    impl MockRunner {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
                fail: HashMap::new(),
                interrupt_after: None,
            }
        }
    }

    impl BatchRunner for MockRunner {
        fn run_batch(&self, batch: &[String]) -> BatchOutput {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.seen.lock().unwrap().push(batch.to_vec());
            if let Some((after, flag)) = &self.interrupt_after {
                if n >= *after {
                    flag.store(true, Ordering::SeqCst);
                }
            }
            let mut text = String::new();
            let mut exit_code = 0;
            for f in batch {
                text.push_str(&format!("{f}:1:1: warning: first [misc]\n"));
                text.push_str(&format!("{f}:1:1: note: context\n"));
                text.push_str(&format!("{f}:9:2: error: second [misc]\n"));
                if let Some(code) = self.fail.get(f) {
                    exit_code = *code;
                }
            }
            BatchOutput { exit_code, text }
        }
    }

    fn files(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("/proj/Core/File{i:03}.cpp")).collect()
    }

    #[test]
    fn batches_partition_input_in_order() {
        for n in [1, 49, 50, 51, 100, 137] {
            let input = files(n);
            let batches = make_batches(&input, 50);
            assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= 50));
            let rejoined: Vec<String> = batches.concat();
            assert_eq!(rejoined, input);
            assert_eq!(batches.len(), n.div_ceil(50));
        }
    }

    #[test]
    fn oversized_batch_request_is_capped() {
        let input = files(120);
        let batches = make_batches(&input, 1000);
        assert_eq!(batches.len(), 3);
    }

    #[test]
    fn empty_input_starts_no_process() {
        let runner = MockRunner::new();
        let outcome = Dispatcher::new(&runner, Path::new("/proj"))
            .progress(false)
            .run(&[])
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::NoFiles);
        assert_eq!(runner.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn sequential_runs_every_batch_in_order() {
        let runner = MockRunner::new();
        let input = files(120);
        let outcome = Dispatcher::new(&runner, Path::new("/proj"))
            .progress(false)
            .run(&input)
            .unwrap();

        let DispatchOutcome::Completed { exit_code, report } = outcome else {
            panic!("expected completion");
        };
        assert_eq!(exit_code, 0);
        assert_eq!(report.total_issues, 240);
        assert_eq!(report.files_with_issues.len(), 120);
        let seen = runner.seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0][0], input[0]);
        assert_eq!(seen[2].last(), input.last());
        let lines = &report.issues["Core/File000.cpp"];
        assert!(lines[0].contains("warning: first"));
        assert!(lines[1].contains("error: second"));
    }

    #[test]
    fn failures_do_not_stop_later_batches() {
        let mut runner = MockRunner::new();
        runner.fail.insert("/proj/Core/File010.cpp".into(), 3);
        runner.fail.insert("/proj/Core/File070.cpp".into(), 7);
        let input = files(120);

        let outcome = Dispatcher::new(&runner, Path::new("/proj"))
            .progress(false)
            .run(&input)
            .unwrap();

        assert_eq!(runner.calls.load(Ordering::SeqCst), 3);
        match outcome {
            DispatchOutcome::Completed { exit_code, report } => {
                assert_eq!(exit_code, 3);
                assert_eq!(report.files_with_issues.len(), 120);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let mut runner = MockRunner::new();
        runner.fail.insert("/proj/Core/File130.cpp".into(), 2);
        let input = files(175);

        let seq = Dispatcher::new(&runner, Path::new("/proj"))
            .progress(false)
            .run(&input)
            .unwrap();
        let par = Dispatcher::new(&runner, Path::new("/proj"))
            .progress(false)
            .jobs(4)
            .run(&input)
            .unwrap();

        assert_eq!(seq, par);
        match par {
            DispatchOutcome::Completed { exit_code, report } => {
                assert_eq!(exit_code, 2);
                assert_eq!(report.total_issues, 350);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn parallel_reports_first_failing_batch_code() {
        let mut runner = MockRunner::new();
        runner.fail.insert("/proj/Core/File005.cpp".into(), 4);
        runner.fail.insert("/proj/Core/File105.cpp".into(), 9);

        let outcome = Dispatcher::new(&runner, Path::new("/proj"))
            .progress(false)
            .jobs(3)
            .run(&files(150))
            .unwrap();
        assert!(matches!(outcome, DispatchOutcome::Completed { exit_code: 4, .. }));
    }

    #[test]
    fn interrupt_stops_sequential_run() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut runner = MockRunner::new();
        runner.interrupt_after = Some((1, Arc::clone(&flag)));

        let outcome = Dispatcher::new(&runner, Path::new("/proj"))
            .progress(false)
            .interrupt(Arc::clone(&flag))
            .run(&files(200))
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::Interrupted);
        assert_eq!(runner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn preset_interrupt_skips_parallel_work() {
        let flag = Arc::new(AtomicBool::new(true));
        let runner = MockRunner::new();

        let outcome = Dispatcher::new(&runner, Path::new("/proj"))
            .progress(false)
            .jobs(2)
            .interrupt(flag)
            .run(&files(100))
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::Interrupted);
        assert_eq!(runner.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn command_args_put_files_last() {
        let runner = ClangTidyRunner {
            exe: "clang-tidy".into(),
            compile_dir: PathBuf::from("/proj/build/clang-tidy"),
            fix: true,
            extra_args: vec!["-load".into(), "/p/plugin.so".into(), "-checks=-*".into()],
            project_root: PathBuf::from("/proj"),
        };
        let args = runner.command_args(&["a.cpp".to_string(), "b.cpp".to_string()]);
        assert_eq!(
            args,
            vec![
                "-p=/proj/build/clang-tidy",
                "--fix",
                "-load",
                "/p/plugin.so",
                "-checks=-*",
                "a.cpp",
                "b.cpp"
            ]
        );
    }

    #[test]
    fn missing_executable_reports_failure_code() {
        let runner = ClangTidyRunner {
            exe: "definitely-not-a-real-clang-tidy".into(),
            compile_dir: PathBuf::from("/tmp"),
            fix: false,
            extra_args: vec![],
            project_root: std::env::temp_dir(),
        };
        let out = runner.run_batch(&["x.cpp".to_string()]);
        assert_eq!(out.exit_code, 1);
        assert!(out.text.is_empty());
    }
}
