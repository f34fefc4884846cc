use super::WORKER_SLOT_ENV;
use std::ffi::OsString;
use std::io;
use std::process::Stdio;
use tokio::process::{Child, Command};

/// Starts one worker process.
///
/// The returned child must have piped stdin and stdout; they become the worker's relay
/// channel. Anything the worker writes to stderr is left to the implementation.
pub trait WorkerLauncher: Send + Sync + 'static {
    fn launch(&self, slot: usize) -> io::Result<Child>;
}

/// Launches workers as child processes of a fixed command line.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: OsString,
    args: Vec<OsString>,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// A launcher that re-executes the running binary.
    pub fn current_exe() -> io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?))
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl WorkerLauncher for ProcessLauncher {
    fn launch(&self, slot: usize) -> io::Result<Child> {
        Command::new(&self.program)
            .args(&self.args)
            .env(WORKER_SLOT_ENV, slot.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
    }
}
