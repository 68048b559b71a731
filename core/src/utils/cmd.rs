use anyhow::{anyhow, Context};
use console::strip_ansi_codes;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::utils::logger;
use crate::utils::progress::{Progress, RepoInfo};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Build a git command that never waits on a credential prompt.
pub fn git_command(path: impl AsRef<Path>) -> Command {
    let mut command = Command::new("git");
    command.current_dir(path).env("GIT_TERMINAL_PROMPT", "0");

    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x08000000;
        command.creation_flags(CREATE_NO_WINDOW);
    }
    command
}

/// Run a short git query and return its stdout.
pub fn exec_git(path: impl AsRef<Path>, args: &[&str]) -> anyhow::Result<String> {
    let mut command = git_command(path);
    let full_command = command.args(args);

    let output = full_command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .with_context(|| format!("Error starting command: {:?}", full_command))?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    match output.status.success() {
        true => Ok(stdout),
        false => Err(anyhow!(stderr.trim().to_string())),
    }
}

/// Run a long git operation, streaming its `--progress` output into `progress`.
///
/// The child is killed once `timeout` elapses. On failure the error carries
/// the last line git wrote to stderr.
pub fn exec_cmd_with_progress(
    repo_info: &RepoInfo,
    command: &mut Command,
    timeout: Duration,
    progress: &impl Progress,
) -> anyhow::Result<()> {
    logger::debug(format!("{}: {:?}", repo_info.name(), command));

    // own process group, so a timeout also reaches the helpers git starts
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let mut spawned = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Error starting command {:?}", command))?;

    progress.repo_info(repo_info, "running...".into());

    let stderr = spawned.stderr.take();
    let (status, last_line) = thread::scope(|scope| {
        let reader = scope.spawn(move || {
            let mut last_line = String::new();
            let Some(stderr) = stderr else {
                return last_line;
            };
            // git rewrites progress lines in place with '\r'
            for output in BufReader::new(stderr).split(b'\r').map_while(Result::ok) {
                let line = String::from_utf8_lossy(&output);
                let plain_line = strip_ansi_codes(&line).replace('\n', " ");
                let plain_line = plain_line.trim();
                if plain_line.is_empty() {
                    continue;
                }
                progress.repo_info(repo_info, plain_line.into());
                last_line = plain_line.to_string();
            }
            last_line
        });

        let status = wait_with_deadline(&mut spawned, Instant::now() + timeout);
        let last_line = reader.join().unwrap_or_default();
        (status, last_line)
    });

    match status? {
        Some(exit_code) if exit_code.success() => Ok(()),
        Some(exit_code) => Err(anyhow!(
            "git exited with {}: {}. With command: {:?}",
            describe_exit(exit_code),
            last_line,
            command
        )),
        None => Err(anyhow!(
            "timed out after {:?}: {}. With command: {:?}",
            timeout,
            last_line,
            command
        )),
    }
}

/// Returns `None` when the child had to be killed at the deadline.
fn wait_with_deadline(child: &mut Child, deadline: Instant) -> anyhow::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child
            .try_wait()
            .context("Error waiting for process to finish")?
        {
            return Ok(Some(status));
        }

        if Instant::now() >= deadline {
            kill_process_tree(child);
            child
                .wait()
                .context("Error waiting for killed process to finish")?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Kill the child and everything in its process group. Helpers such as
/// `git-remote-https` hold the stderr pipe open until they are gone.
#[cfg(unix)]
fn kill_process_tree(child: &mut Child) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Ok(pgid) = i32::try_from(child.id()) {
        let _ = killpg(Pid::from_raw(pgid), Signal::SIGKILL);
    }
    // the child may exit on its own between try_wait and kill
    let _ = child.kill();
}

#[cfg(not(unix))]
fn kill_process_tree(child: &mut Child) {
    let _ = child.kill();
}

fn describe_exit(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("code {}", code),
        None => String::from("a signal"),
    }
}
