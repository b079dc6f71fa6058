use nix::errno::Errno;
use nix::fcntl::{open, OFlag};
use nix::libc;
use nix::sys::signal::{self, SigHandler, Signal};
use nix::sys::stat::Mode;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{close, dup2, execvp, fork, pipe, ForkResult, Pid};
use std::ffi::CString;
use std::os::unix::io::{AsRawFd, IntoRawFd, OwnedFd, RawFd};
use std::path::{Path, PathBuf};
use std::process;

use super::super::error::{Error, Result};
use super::super::syntax::ast::{OutputSink, Pipeline, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    NotStarted,
    Running(Pid),
    Done(i32),
}

/// A stage with everything exec needs converted up front, so nothing but
/// descriptor shuffling happens between fork and exec.
#[derive(Debug)]
struct Command {
    program: CString,
    args: Vec<CString>,
    stdin: Option<PathBuf>,
    stdout: Option<OutputSink>,
}

/// Both ends of an anonymous pipe. Each end is closed when its handle drops.
struct PipeEnds {
    read: OwnedFd,
    write: OwnedFd,
}

#[derive(Debug)]
pub struct Job {
    commands: Vec<Command>,
    status: Status,
}

fn to_cstring(s: &str) -> Result<CString> {
    CString::new(s).map_err(|_| Error::StringEncoding(String::from(s)))
}

impl Command {
    fn from_stage(stage: &Stage) -> Result<Command> {
        let mut args = Vec::with_capacity(stage.argv.len().max(1));
        for arg in &stage.argv {
            args.push(to_cstring(arg)?);
        }
        // A stray pipe leaves no program name; exec of "" fails like any
        // unknown command.
        if args.is_empty() {
            args.push(CString::default());
        }
        Ok(Command {
            program: args[0].clone(),
            args: args,
            stdin: stage.stdin.clone(),
            stdout: stage.stdout.clone(),
        })
    }

    fn name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    fn apply_redirections(&self) -> std::result::Result<(), (PathBuf, Errno)> {
        if let Some(ref path) = self.stdin {
            redirect(path, OFlag::O_RDONLY, libc::STDIN_FILENO).map_err(|e| (path.clone(), e))?;
        }
        if let Some(ref sink) = self.stdout {
            let mode = if sink.append {
                OFlag::O_APPEND
            } else {
                OFlag::O_TRUNC
            };
            redirect(&sink.path, OFlag::O_WRONLY | OFlag::O_CREAT | mode, libc::STDOUT_FILENO)
                .map_err(|e| (sink.path.clone(), e))?;
        }
        Ok(())
    }

    /// Replaces the current process image. Only returns by exiting.
    fn exec(&self) -> ! {
        if let Err((path, errno)) = self.apply_redirections() {
            eprintln!("{}: {}", path.display(), errno.desc());
            process::exit(1);
        }
        debug!("exec {:?} in {}", self.args, nix::unistd::getpid());
        let errno = match execvp(&self.program, &self.args) {
            Ok(never) => match never {},
            Err(errno) => errno,
        };
        let name = self.name();
        if name.is_empty() {
            eprintln!("bad command: empty pipeline stage");
        } else {
            eprintln!("bad command: {}: {}", name, errno.desc());
        }
        process::exit(match errno {
            Errno::ENOENT => 127,
            _ => 126,
        });
    }
}

fn redirect(path: &Path, flags: OFlag, target: RawFd) -> nix::Result<()> {
    let fd = open(path, flags, Mode::from_bits_truncate(0o666))?;
    trace!("redirect {} ({}) onto {}", path.display(), fd, target);
    if fd != target {
        dup2(fd, target)?;
        close(fd)?;
    }
    Ok(())
}

/// Makes `fd` the process's `target` descriptor, closing the original.
fn install(fd: OwnedFd, target: RawFd) -> nix::Result<()> {
    if fd.as_raw_fd() == target {
        let _ = fd.into_raw_fd();
        return Ok(());
    }
    dup2(fd.as_raw_fd(), target)?;
    trace!("dup {} onto {}", fd.as_raw_fd(), target);
    Ok(())
}

impl PipeEnds {
    fn new() -> nix::Result<PipeEnds> {
        let (read, write) = pipe()?;
        Ok(PipeEnds {
            read: read,
            write: write,
        })
    }

    /// Producer side: stdout becomes the write end, the read end is closed.
    fn into_writer(self) -> nix::Result<()> {
        drop(self.read);
        install(self.write, libc::STDOUT_FILENO)
    }

    /// Consumer side: stdin becomes the read end, the write end is closed.
    fn into_reader(self) -> nix::Result<()> {
        drop(self.write);
        install(self.read, libc::STDIN_FILENO)
    }
}

fn reset_signals() {
    // The interactive shell ignores these; an ignored disposition would
    // survive exec and make the foreground pipeline uninterruptible.
    for sig in &[Signal::SIGINT, Signal::SIGQUIT] {
        unsafe {
            let _ = signal::signal(*sig, SigHandler::SigDfl);
        }
    }
}

fn die(context: &str, err: Errno) -> ! {
    eprintln!("{}: {}", context, err.desc());
    process::exit(1);
}

/// Runs every stage from the current process. Each stage but the last is
/// forked off with its stdout on a fresh pipe; the current process then reads
/// that pipe and carries on, finally becoming the last stage itself.
fn exec_chain(commands: &[Command]) -> ! {
    reset_signals();
    let (last, front) = match commands.split_last() {
        Some(split) => split,
        None => process::exit(0),
    };
    for command in front {
        let pipe = match PipeEnds::new() {
            Ok(pipe) => pipe,
            Err(e) => die("pipe", e),
        };
        match unsafe { fork() } {
            Ok(ForkResult::Child) => {
                if let Err(e) = pipe.into_writer() {
                    die("pipe", e);
                }
                command.exec();
            }
            Ok(ForkResult::Parent { child }) => {
                debug!("forked {} for {}", child, command.name());
                if let Err(e) = pipe.into_reader() {
                    die("pipe", e);
                }
            }
            Err(e) => die("fork", e),
        }
    }
    last.exec()
}

impl Job {
    pub fn from_pipeline(pipeline: &Pipeline) -> Result<Job> {
        let mut commands = Vec::with_capacity(pipeline.stages.len());
        for stage in &pipeline.stages {
            commands.push(Command::from_stage(stage)?);
        }
        Ok(Job {
            commands: commands,
            status: Status::NotStarted,
        })
    }

    /// Forks the process that will carry the whole pipeline.
    pub fn run(&mut self) -> Result<Status> {
        match unsafe { fork() } {
            Ok(ForkResult::Parent { child }) => {
                debug!("pipeline of {} stage(s) running as {}", self.commands.len(), child);
                self.status = Status::Running(child);
                Ok(self.status)
            }
            Ok(ForkResult::Child) => exec_chain(&self.commands),
            Err(e) => Err(Error::Fork(e)),
        }
    }

    /// Blocks until the pipeline's last stage exits and returns its status.
    /// Earlier stages are not waited for by the shell.
    pub fn wait_until_complete(&mut self) -> Result<i32> {
        let pid = match self.status {
            Status::Done(code) => return Ok(code),
            Status::NotStarted => return Err(Error::NotStarted),
            Status::Running(pid) => pid,
        };
        loop {
            match waitpid(pid, None) {
                Ok(WaitStatus::Exited(_, code)) => {
                    self.status = Status::Done(code);
                    return Ok(code);
                }
                Ok(WaitStatus::Signaled(_, sig, _)) => {
                    let code = 128 + sig as i32;
                    self.status = Status::Done(code);
                    return Ok(code);
                }
                Ok(other) => trace!("ignoring wait status {:?}", other),
                Err(Errno::EINTR) => {}
                Err(e) => return Err(Error::Wait(e)),
            }
        }
    }
}
