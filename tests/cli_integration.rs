use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, SystemTime};

use flate2::read::GzDecoder;
use serde_json::Value;

const ENV_FILE: &str = "POSTGRES_HOST=vegan_db\nPOSTGRES_USER=vegan\nPOSTGRES_DB=vegan\n";

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(path, content).expect("write test file");
}

/// Create an empty backup whose mtime is `age_mins` minutes in the past
fn old_backup(dir: &Path, name: &str, age_mins: u64) -> PathBuf {
    fs::create_dir_all(dir).expect("create backup dir");
    let path = dir.join(name);
    let file = File::create(&path).expect("create backup");
    file.set_modified(SystemTime::now() - Duration::from_secs(age_mins * 60))
        .expect("set mtime");
    path
}

fn gz_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read backup dir")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".sql.gz"))
        .collect();
    names.sort();
    names
}

/// Stand-in for docker: logs its arguments, fakes pg_dump output and exits
/// with $FAKE_DOCKER_EXIT
#[cfg(unix)]
fn fake_docker(root: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = root.join("fake-docker");
    write_file(
        &path,
        r#"#!/bin/sh
echo "$@" >> "$FAKE_DOCKER_LOG"
if [ "$1" = "exec" ] && [ "$3" = "pg_dump" ]; then
  echo "-- PostgreSQL database dump of $6"
fi
exit "${FAKE_DOCKER_EXIT:-0}"
"#,
    );
    let mut perms = fs::metadata(&path).expect("stat script").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod script");
    path
}

fn run_vegops(root: &Path, args: &[&str], envs: &[(&str, &str)]) -> (bool, String, String) {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_vegops"));
    cmd.arg("-C").arg(root).arg("--timezone").arg("UTC").args(args);
    // Isolate from the developer's config and database environment
    cmd.env("HOME", root)
        .env("XDG_CONFIG_HOME", root.join(".config"))
        .env_remove("POSTGRES_HOST")
        .env_remove("POSTGRES_USER")
        .env_remove("POSTGRES_DB")
        .env_remove("VEGOPS_DOCKER")
        .env_remove("VEGOPS_LOG");
    for (k, v) in envs {
        cmd.env(k, v);
    }
    let output = cmd.output().expect("run vegops");
    (
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

fn is_backup_name(name: &str) -> bool {
    let Some(stamp) = name
        .strip_prefix("vegan_backup_")
        .and_then(|rest| rest.strip_suffix(".sql.gz"))
    else {
        return false;
    };
    chrono::NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d_%H-%M").is_ok() && stamp.len() == 16
}

#[cfg(unix)]
#[test]
fn backup_writes_gzip_and_prints_one_line() {
    let root = tempfile::tempdir().expect("tempdir");
    let docker = fake_docker(root.path());
    let log = root.path().join("docker.log");
    write_file(&root.path().join(".env"), ENV_FILE);

    let (ok, stdout, stderr) = run_vegops(
        root.path(),
        &["backup"],
        &[
            ("VEGOPS_DOCKER", docker.to_str().unwrap()),
            ("FAKE_DOCKER_LOG", log.to_str().unwrap()),
        ],
    );
    assert!(ok, "stderr: {stderr}");

    let backup_dir = root.path().join("db_backups");
    let names = gz_names(&backup_dir);
    assert_eq!(names.len(), 1);
    assert!(is_backup_name(&names[0]), "bad name {}", names[0]);

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        [format!("Backup saved to {}", backup_dir.join(&names[0]).display())]
    );

    let mut body = String::new();
    GzDecoder::new(File::open(backup_dir.join(&names[0])).unwrap())
        .read_to_string(&mut body)
        .unwrap();
    assert_eq!(body, "-- PostgreSQL database dump of vegan\n");

    let calls = fs::read_to_string(&log).unwrap();
    assert_eq!(calls, "exec vegan_db pg_dump -U vegan vegan\n");
}

#[cfg(unix)]
#[test]
fn backup_keeps_seven_most_recent() {
    let root = tempfile::tempdir().expect("tempdir");
    let docker = fake_docker(root.path());
    let log = root.path().join("docker.log");
    write_file(&root.path().join(".env"), ENV_FILE);
    let backup_dir = root.path().join("db_backups");
    for i in 0..9 {
        old_backup(&backup_dir, &format!("vegan_backup_old_{i}.sql.gz"), 60 * (i + 1));
    }

    let (ok, _, stderr) = run_vegops(
        root.path(),
        &["backup"],
        &[
            ("VEGOPS_DOCKER", docker.to_str().unwrap()),
            ("FAKE_DOCKER_LOG", log.to_str().unwrap()),
        ],
    );
    assert!(ok, "stderr: {stderr}");

    let names = gz_names(&backup_dir);
    assert_eq!(names.len(), 7);
    // Newest six of the old ones survive alongside the fresh backup
    for i in 0..6 {
        assert!(names.contains(&format!("vegan_backup_old_{i}.sql.gz")));
    }
    for i in 6..9 {
        assert!(!names.contains(&format!("vegan_backup_old_{i}.sql.gz")));
    }
}

#[cfg(unix)]
#[test]
fn failed_dump_exits_nonzero_and_keeps_backups() {
    let root = tempfile::tempdir().expect("tempdir");
    let docker = fake_docker(root.path());
    let log = root.path().join("docker.log");
    write_file(&root.path().join(".env"), ENV_FILE);
    let backup_dir = root.path().join("db_backups");
    for i in 0..7 {
        old_backup(&backup_dir, &format!("vegan_backup_old_{i}.sql.gz"), 60 * (i + 1));
    }

    let (ok, stdout, stderr) = run_vegops(
        root.path(),
        &["backup"],
        &[
            ("VEGOPS_DOCKER", docker.to_str().unwrap()),
            ("FAKE_DOCKER_LOG", log.to_str().unwrap()),
            ("FAKE_DOCKER_EXIT", "1"),
        ],
    );
    assert!(!ok);
    assert!(stdout.is_empty());
    assert!(stderr.contains("Command failed (exit code 1)"), "stderr: {stderr}");
    assert_eq!(gz_names(&backup_dir).len(), 7);
    let leftovers: Vec<_> = fs::read_dir(&backup_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".sql"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn backup_without_env_file_fails() {
    let root = tempfile::tempdir().expect("tempdir");
    let (ok, _, stderr) = run_vegops(root.path(), &["backup"], &[]);
    assert!(!ok);
    assert!(stderr.contains("Environment file not found"), "stderr: {stderr}");
    assert!(!root.path().join("db_backups").exists());
}

#[test]
fn backup_with_incomplete_env_names_missing_key() {
    let root = tempfile::tempdir().expect("tempdir");
    write_file(&root.path().join(".env"), "POSTGRES_HOST=vegan_db\nPOSTGRES_USER=vegan\n");
    let (ok, _, stderr) = run_vegops(root.path(), &["backup"], &[]);
    assert!(!ok);
    assert!(stderr.contains("POSTGRES_DB"), "stderr: {stderr}");
}

#[test]
fn env_file_wins_over_shell_environment() {
    let root = tempfile::tempdir().expect("tempdir");
    write_file(&root.path().join(".env"), ENV_FILE);
    let (ok, stdout, stderr) = run_vegops(
        root.path(),
        &["backup", "--dry-run"],
        &[("POSTGRES_DB", "stale_shell_db")],
    );
    assert!(ok, "stderr: {stderr}");
    assert!(
        stdout.starts_with("docker exec vegan_db pg_dump -U vegan vegan > "),
        "stdout: {stdout}"
    );
    assert!(!stdout.contains("stale_shell_db"), "stdout: {stdout}");
}

#[test]
fn initdb_dry_run_prints_sequence() {
    let root = tempfile::tempdir().expect("tempdir");
    let (ok, stdout, stderr) = run_vegops(
        root.path(),
        &["initdb", "--dry-run", "--api-container", "vegan_api"],
        &[],
    );
    assert!(ok, "stderr: {stderr}");
    assert_eq!(
        stdout,
        "docker exec vegan_api alembic downgrade base\ndocker exec vegan_api alembic upgrade head\n"
    );
}

#[cfg(unix)]
#[test]
fn initdb_stops_after_failed_downgrade() {
    let root = tempfile::tempdir().expect("tempdir");
    let docker = fake_docker(root.path());
    let log = root.path().join("docker.log");

    let (ok, _, _) = run_vegops(
        root.path(),
        &["initdb"],
        &[
            ("VEGOPS_DOCKER", docker.to_str().unwrap()),
            ("FAKE_DOCKER_LOG", log.to_str().unwrap()),
            ("FAKE_DOCKER_EXIT", "2"),
        ],
    );
    assert!(!ok);
    assert_eq!(
        fs::read_to_string(&log).unwrap(),
        "exec api alembic downgrade base\n"
    );
}

#[cfg(unix)]
#[test]
fn compose_targets_call_docker_compose() {
    let root = tempfile::tempdir().expect("tempdir");
    let docker = fake_docker(root.path());
    let log = root.path().join("docker.log");
    let envs = [
        ("VEGOPS_DOCKER", docker.to_str().unwrap()),
        ("FAKE_DOCKER_LOG", log.to_str().unwrap()),
    ];

    for target in ["install", "up", "stop", "down", "create-admin"] {
        let (ok, _, stderr) = run_vegops(root.path(), &[target], &envs);
        assert!(ok, "{target} failed: {stderr}");
    }
    assert_eq!(
        fs::read_to_string(&log).unwrap(),
        "compose build\n\
         compose up -d --build --force-recreate\n\
         compose stop\n\
         compose down\n\
         exec api python scripts/create_admin_user.py\n"
    );
}

#[test]
fn image_dev_variant_enables_reload() {
    let root = tempfile::tempdir().expect("tempdir");
    let (ok, prod, _) = run_vegops(root.path(), &["image"], &[]);
    assert!(ok);
    let (ok, dev, _) = run_vegops(root.path(), &["image", "--dev"], &[]);
    assert!(ok);

    assert!(prod.contains("EXPOSE 8000"));
    assert!(!prod.contains("--reload"));
    assert!(dev.contains("\"--reload\""));
    assert!(dev.contains("pip install --no-cache-dir -r requirements-dev.txt"));
}

#[test]
fn image_respects_project_config() {
    let root = tempfile::tempdir().expect("tempdir");
    write_file(
        &root.path().join("vegops.toml"),
        "[image]\nbase_image = \"python:3.12-slim\"\n",
    );
    let out = root.path().join("Dockerfile");
    let (ok, _, stderr) = run_vegops(
        root.path(),
        &["image", "--output", out.to_str().unwrap()],
        &[],
    );
    assert!(ok, "stderr: {stderr}");
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("FROM python:3.12-slim\n"));
}

#[test]
fn backups_json_lists_newest_first() {
    let root = tempfile::tempdir().expect("tempdir");
    let backup_dir = root.path().join("db_backups");
    old_backup(&backup_dir, "vegan_backup_a.sql.gz", 30);
    old_backup(&backup_dir, "vegan_backup_b.sql.gz", 10);
    old_backup(&backup_dir, "vegan_backup_c.sql.gz", 20);

    let (ok, stdout, stderr) = run_vegops(root.path(), &["backups", "--json", "--keep", "2"], &[]);
    assert!(ok, "stderr: {stderr}");

    let json: Value = serde_json::from_str(&stdout).expect("json");
    let arr = json.as_array().expect("array output");
    let names: Vec<&str> = arr.iter().map(|e| e["name"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        ["vegan_backup_b.sql.gz", "vegan_backup_c.sql.gz", "vegan_backup_a.sql.gz"]
    );
    assert_eq!(arr[2]["expired"].as_bool(), Some(true));
}

#[test]
fn prune_dry_run_then_prune() {
    let root = tempfile::tempdir().expect("tempdir");
    let backup_dir = root.path().join("db_backups");
    for i in 0..4 {
        old_backup(&backup_dir, &format!("b{i}.sql.gz"), i + 1);
    }

    let (ok, stdout, _) = run_vegops(root.path(), &["prune", "--keep", "2", "--dry-run"], &[]);
    assert!(ok);
    assert_eq!(stdout.lines().count(), 2);
    assert!(stdout.lines().all(|l| l.starts_with("Would remove ")));
    assert_eq!(gz_names(&backup_dir).len(), 4);

    let (ok, _, _) = run_vegops(root.path(), &["prune", "--keep", "2"], &[]);
    assert!(ok);
    assert_eq!(gz_names(&backup_dir), ["b0.sql.gz", "b1.sql.gz"]);
}
