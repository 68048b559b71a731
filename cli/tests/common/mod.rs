#![allow(dead_code)]

use assert_cmd::prelude::*;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub fn exec_cmd(path: impl AsRef<Path>, cmd: &str, args: &[&str]) -> Result<String, anyhow::Error> {
    let output = std::process::Command::new(cmd)
        .current_dir(path)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;
    let stderr = String::from_utf8(output.stderr)?;

    match output.status.success() {
        false => Err(anyhow::anyhow!(stderr)),
        true => Ok(stdout),
    }
}

/// `ghsync` run from `current_dir` with no token and no proxy in its environment.
pub fn ghsync(current_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ghsync").unwrap();
    cmd.current_dir(current_dir);
    for name in [
        "GITHUB_API_TOKEN",
        "GITHUB_TOKEN",
        "HTTP_PROXY",
        "http_proxy",
        "HTTPS_PROXY",
        "https_proxy",
        "ALL_PROXY",
        "all_proxy",
    ] {
        cmd.env_remove(name);
    }
    cmd
}

/// Bare repository `<base>/<name>.git` with one commit on `main`.
pub fn create_bare_remote(base: &Path, name: &str) -> PathBuf {
    let work = base.join(format!("{}-work", name));
    std::fs::create_dir_all(&work).unwrap();
    exec_cmd(&work, "git", &["init"]).expect("git init failed");
    exec_cmd(&work, "git", &["symbolic-ref", "HEAD", "refs/heads/main"]).unwrap();
    std::fs::write(work.join("README.md"), format!("# {}\n", name)).unwrap();
    exec_cmd(&work, "git", &["add", "-A"]).unwrap();
    exec_cmd(
        &work,
        "git",
        &[
            "-c",
            "user.name=ghsync",
            "-c",
            "user.email=ghsync@example.com",
            "-c",
            "commit.gpgsign=false",
            "commit",
            "-m",
            "init",
        ],
    )
    .expect("git commit failed");

    let bare = base.join(format!("{}.git", name));
    exec_cmd(
        base,
        "git",
        &["clone", "--bare", work.to_str().unwrap(), bare.to_str().unwrap()],
    )
    .expect("git clone failed");
    bare
}

/// A single, last listing page holding one repository cloned from `url`.
pub fn single_repo_page(name: &str, url: &str) -> String {
    serde_json::json!({
        "data": {
            "viewer": {
                "repositories": {
                    "totalCount": 1,
                    "pageInfo": { "endCursor": "c1", "hasNextPage": false },
                    "nodes": [{
                        "name": name,
                        "url": url,
                        "sshUrl": null,
                        "isFork": false,
                        "isArchived": false,
                        "defaultBranchRef": { "name": "main" }
                    }]
                }
            }
        }
    })
    .to_string()
}

/// Serve `body` as the answer to every request on a local port and return
/// the endpoint url. The server thread lives as long as the test process.
pub fn serve_graphql(body: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind failed");
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let _ = respond(stream, &body);
        }
    });
    format!("http://{}/graphql", addr)
}

fn respond(stream: TcpStream, body: &str) -> std::io::Result<()> {
    let mut reader = BufReader::new(&stream);
    let mut content_length = 0;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 || line == "\r\n" {
            break;
        }
        if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
            content_length = value.trim().parse().unwrap_or(0);
        }
    }
    let mut request_body = vec![0; content_length];
    reader.read_exact(&mut request_body)?;

    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    (&stream).write_all(response.as_bytes())?;
    (&stream).flush()
}
