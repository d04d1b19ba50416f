// pgvault/src/backup/dump.rs
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;

use flate2::Compression;
use flate2::write::GzEncoder;
use which::which;

use crate::config::DatabaseConfig;
use crate::errors::{BackupError, Result};

fn dump_error(detail: String) -> BackupError {
    BackupError::Dump {
        detail,
        stderr: String::new(),
    }
}

fn find_pg_dumpall() -> Result<PathBuf> {
    which("pg_dumpall").map_err(|e| {
        dump_error(format!(
            "pg_dumpall executable not found in PATH ({e}). Ensure PostgreSQL client tools are installed."
        ))
    })
}

/// Connection flags for pg_dumpall. The password is deliberately absent from
/// the argument list: it travels via the child's PGPASSWORD environment, so
/// it never shows up in process listings.
fn dump_args(db: &DatabaseConfig) -> Vec<String> {
    vec![
        "-h".to_string(),
        db.host.clone(),
        "-p".to_string(),
        db.port.to_string(),
        "-U".to_string(),
        db.user.clone(),
    ]
}

/// Produces a gzip-compressed full-cluster dump at `target_path`.
///
/// pg_dumpall covers every database and role on the server, which sidesteps
/// per-database version mismatches between dump and restore. Its stdout is
/// streamed through gzip into the target file; stderr is captured for error
/// reporting. On failure the partially written file is left in place.
pub fn dump_cluster(db: &DatabaseConfig, target_path: &Path) -> Result<()> {
    let pg_dumpall = find_pg_dumpall()?;
    run_dump(&pg_dumpall, db, target_path)
}

fn run_dump(pg_dumpall: &Path, db: &DatabaseConfig, target_path: &Path) -> Result<()> {
    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            dump_error(format!(
                "failed to create dump directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    let mut child = Command::new(pg_dumpall)
        .args(dump_args(db))
        .env("PGPASSWORD", &db.password)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| dump_error(format!("failed to spawn {}: {e}", pg_dumpall.display())))?;

    // Drain stderr on its own thread. Both pipes are held open while stdout
    // is copied below; without a concurrent reader a chatty pg_dumpall can
    // fill the stderr pipe buffer and deadlock against the stdout copy.
    let stderr_pipe = child.stderr.take();
    let stderr_reader = thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut stderr) = stderr_pipe {
            let _ = stderr.read_to_end(&mut buf);
        }
        buf
    });

    if let Err(e) = compress_stdout_to_file(&mut child, target_path) {
        // Reap the child before bailing so it does not linger as a zombie.
        let _ = child.kill();
        let _ = child.wait();
        let _ = stderr_reader.join();
        return Err(e);
    }

    let status = child
        .wait()
        .map_err(|e| dump_error(format!("failed to wait for pg_dumpall: {e}")))?;
    let stderr_bytes = stderr_reader.join().unwrap_or_default();

    if !status.success() {
        return Err(BackupError::Dump {
            detail: format!("pg_dumpall exited with status {status}"),
            stderr: String::from_utf8_lossy(&stderr_bytes).into_owned(),
        });
    }

    Ok(())
}

fn compress_stdout_to_file(child: &mut Child, target_path: &Path) -> Result<()> {
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| dump_error("pg_dumpall stdout was not captured".to_string()))?;

    let out_file = File::create(target_path).map_err(|e| {
        dump_error(format!(
            "failed to create dump file {}: {e}",
            target_path.display()
        ))
    })?;
    let mut encoder = GzEncoder::new(out_file, Compression::default());

    io::copy(&mut stdout, &mut encoder)
        .map_err(|e| dump_error(format!("failed while compressing dump output: {e}")))?;
    encoder
        .finish()
        .map_err(|e| dump_error(format!("failed to finish gzip stream: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db_config() -> DatabaseConfig {
        DatabaseConfig {
            host: "db.example.net".to_string(),
            port: 57886,
            user: "postgres".to_string(),
            password: "s3cret-hunter2".to_string(),
        }
    }

    #[cfg(unix)]
    fn write_script(dir: &Path, body: &str) -> anyhow::Result<PathBuf> {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake_pg_dumpall");
        fs::write(&path, format!("#!/bin/sh\n{body}"))?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        Ok(path)
    }

    #[test]
    fn test_dump_args_carry_connection_flags() {
        let args = dump_args(&test_db_config());

        assert_eq!(
            args,
            vec!["-h", "db.example.net", "-p", "57886", "-U", "postgres"]
        );
    }

    #[test]
    fn test_password_never_appears_in_args() {
        let db = test_db_config();
        let args = dump_args(&db);

        assert!(args.iter().all(|arg| !arg.contains(&db.password)));
    }

    #[test]
    #[cfg(unix)]
    fn test_noisy_stderr_does_not_block_dump() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        // Floods stderr well past the pipe buffer size before emitting any
        // stdout, the pattern of a warning-heavy cluster.
        let script = write_script(
            dir.path(),
            concat!(
                "i=0\n",
                "while [ $i -lt 1024 ]; do\n",
                "  printf '%0200d\\n' \"$i\" >&2\n",
                "  i=$((i+1))\n",
                "done\n",
                "echo '-- fake cluster dump'\n",
            ),
        )?;
        let target = dir.path().join("spool/backup.sql.gz");

        run_dump(&script, &test_db_config(), &target)?;

        assert!(target.exists());
        Ok(())
    }

    #[test]
    #[cfg(unix)]
    fn test_failed_dump_captures_stderr() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let script = write_script(
            dir.path(),
            "echo 'connection to server failed' >&2\nexit 3\n",
        )?;
        let target = dir.path().join("spool/backup.sql.gz");

        let err = run_dump(&script, &test_db_config(), &target).unwrap_err();

        match err {
            BackupError::Dump { detail, stderr } => {
                assert!(detail.contains("exited with status"));
                assert!(stderr.contains("connection to server failed"));
            }
            other => panic!("expected Dump error, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    #[cfg(unix)]
    fn test_unwritable_target_reaps_the_child() -> anyhow::Result<()> {
        use std::time::{Duration, Instant};

        let dir = tempfile::tempdir()?;
        let script = write_script(dir.path(), "sleep 30\n")?;
        // A directory squatting on the target path makes File::create fail
        // while the child is still running.
        let target = dir.path().join("occupied");
        fs::create_dir_all(&target)?;

        let start = Instant::now();
        let err = run_dump(&script, &test_db_config(), &target).unwrap_err();

        assert!(matches!(err, BackupError::Dump { .. }));
        assert!(start.elapsed() < Duration::from_secs(10));
        Ok(())
    }
}
