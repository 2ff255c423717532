use std::path::PathBuf;
use std::process::Command;

fn launcher() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_correlator-launcher"));
    // keep settings of the calling environment out of the tests
    for (key, _) in std::env::vars_os() {
        if key.to_string_lossy().starts_with("LAUNCHER_") {
            cmd.env_remove(key);
        }
    }
    cmd
}

fn work_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "correlator_launcher_launch_{}_{}",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_macro_mode_becomes_the_interpreter() {
    let dir = work_dir("macro");
    let output = launcher()
        .current_dir(&dir)
        .env("LAUNCHER_ROOT_CMD", "sh")
        .env("LAUNCHER_ROOT_ARGS", "-c 'exit 7' --")
        .arg("run")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(7));
    assert!(output.stdout.is_empty(), "stdout: {:?}", output.stdout);
    assert!(output.stderr.is_empty(), "stderr: {:?}", output.stderr);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_condor_mode_becomes_the_submitter() {
    let dir = work_dir("condor");
    let job = dir.join("response.job");
    std::fs::write(&job, "echo submitted\nexit 3\n").unwrap();

    let output = launcher()
        .current_dir(&dir)
        .env("LAUNCHER_CONDOR_CMD", "sh")
        .env("LAUNCHER_JOB_FILE", &job)
        .arg("condor")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    assert_eq!(output.stdout, b"submitted\n");
    assert!(output.stderr.is_empty(), "stderr: {:?}", output.stderr);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_interpreter_exits_127() {
    let dir = work_dir("missing");
    let output = launcher()
        .current_dir(&dir)
        .env("LAUNCHER_ROOT_CMD", "correlator-launcher-test-no-such-command")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(127));
    assert!(output.stdout.is_empty());

    std::fs::remove_dir_all(&dir).unwrap();
}
