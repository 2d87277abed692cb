// CLI integration tests for the interactive session.
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use serde_json::Value;

fn run_shell(dir: &Path, input: &str) -> Output {
    let exe = env!("CARGO_BIN_EXE_rollcall");
    let mut child = Command::new(exe)
        .args(["--dir", dir.to_str().unwrap(), "shell"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn");
    {
        let mut stdin = child.stdin.take().expect("stdin");
        stdin.write_all(input.as_bytes()).expect("write stdin");
    }
    child.wait_with_output().expect("wait")
}

fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

// Prompts share lines with piped output, so locate the record by its
// opening brace rather than by line.
fn first_json_record(stdout: &str) -> Value {
    let start = stdout.find("{\"roll\"").expect("json record in stdout");
    let end = stdout[start..].find('}').expect("closing brace") + start + 1;
    serde_json::from_str(&stdout[start..end]).expect("valid json")
}

#[test]
fn bootstrap_login_and_logout() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = run_shell(temp.path(), "admin\nadmin\n9\n");

    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout_text(&output);
    assert!(stdout.contains("Logged in as admin (admin)."));
    assert!(stdout.contains("Goodbye."));

    let credentials =
        std::fs::read_to_string(temp.path().join("credentials.txt")).expect("credentials");
    assert_eq!(credentials, "admin admin admin\nstudent student student\n");
}

#[test]
fn login_failure_exits_zero() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = run_shell(temp.path(), "ghost\nnope\n");

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_text(&output).contains("Invalid login."));
}

#[test]
fn admin_add_then_search_emits_jsonl_when_piped() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = run_shell(
        temp.path(),
        "admin\nadmin\n1\n10\nBob\n75.5\n3\n10\n9\n",
    );

    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout_text(&output);
    assert!(stdout.contains("Student added."));

    let record = first_json_record(&stdout);
    assert_eq!(record["roll"], 10);
    assert_eq!(record["name"], "Bob");
    assert_eq!(record["mark"], 75.5);

    let students = std::fs::read_to_string(temp.path().join("students.txt")).expect("students");
    assert_eq!(students, "10|Bob|75.50\n");
}

#[test]
fn admin_update_rewrites_the_store_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    std::fs::write(temp.path().join("students.txt"), "10|Bob|75.50\n2|Ada|90.00\n")
        .expect("seed");

    let output = run_shell(temp.path(), "admin\nadmin\n4\n10\nBobby\n80\n9\n");

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_text(&output).contains("Record updated."));
    let students = std::fs::read_to_string(temp.path().join("students.txt")).expect("students");
    assert_eq!(students, "10|Bobby|80.00\n2|Ada|90.00\n");
}

#[test]
fn self_delete_is_refused_at_the_menu() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = run_shell(temp.path(), "admin\nadmin\n7\nadmin\n9\n");

    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout_text(&output);
    assert!(stdout.contains("You cannot delete your own account while logged in."));

    let credentials =
        std::fs::read_to_string(temp.path().join("credentials.txt")).expect("credentials");
    assert!(credentials.contains("admin admin admin"));
}

#[test]
fn student_menu_has_no_admin_operations() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = run_shell(temp.path(), "student\nstudent\n4\n");

    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout_text(&output);
    assert!(stdout.contains("Logged in as student (student)."));
    assert!(stdout.contains("STUDENT MENU"));
    assert!(!stdout.contains("Create user"));
    assert!(stdout.contains("Goodbye."));
}

#[test]
fn unrecognized_stored_role_is_denied() {
    let temp = tempfile::tempdir().expect("tempdir");
    std::fs::write(temp.path().join("credentials.txt"), "eve pw superuser\n").expect("seed");

    let output = run_shell(temp.path(), "eve\npw\n");

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_text(&output).contains("Access denied: unrecognized role 'superuser'."));
}

#[test]
fn password_change_requires_relogin_to_show() {
    let temp = tempfile::tempdir().expect("tempdir");

    let output = run_shell(temp.path(), "student\nstudent\n3\nnewpw\n4\n");
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_text(&output).contains("Password updated for 'student'."));

    let old = run_shell(temp.path(), "student\nstudent\n");
    assert!(stdout_text(&old).contains("Invalid login."));

    let new = run_shell(temp.path(), "student\nnewpw\n4\n");
    assert!(stdout_text(&new).contains("Logged in as student (student)."));
}
