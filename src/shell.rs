//! Purpose: Interactive console session: login prompt, role menus, field prompts.
//! Role: Binary-side glue; collects trimmed input, calls the core stores, prints results.
//! Invariants: Login failure and unrecognized roles end the session with exit code 0.
//! Invariants: Per-operation failures are reported and the menu continues; nothing retries.
//! Invariants: Record output is human text on a terminal, JSON Lines when piped.

use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;

use rollcall::core::codec::{lenient_float, lenient_int, Credential, Student};
use rollcall::core::credentials::CredentialStore;
use rollcall::core::error::{Error, ErrorKind};
use rollcall::core::session::{self, LoginOutcome, Principal, Role};
use rollcall::core::students::StudentStore;

use crate::store_paths::{CREDENTIALS_FILE, STUDENTS_FILE};

/// Run one login session to completion. The returned code is the process
/// exit code; login failure is a normal outcome, not an error.
pub(crate) fn run(dir: &Path) -> Result<i32, Error> {
    fs::create_dir_all(dir)
        .map_err(|err| Error::new(ErrorKind::Io).with_path(dir).with_source(err))?;
    let credentials = CredentialStore::new(dir.join(CREDENTIALS_FILE));
    let students = StudentStore::new(dir.join(STUDENTS_FILE));

    let stdin = io::stdin();
    let mut input = stdin.lock();

    let username = prompt(&mut input, "USERNAME: ")?.unwrap_or_default();
    let password = prompt(&mut input, "PASSWORD: ")?.unwrap_or_default();

    match session::login(&credentials, &username, &password)? {
        LoginOutcome::BadCredentials => {
            println!("Invalid login.");
            Ok(0)
        }
        LoginOutcome::UnknownRole(role) => {
            println!("Access denied: unrecognized role '{role}'.");
            Ok(0)
        }
        LoginOutcome::LoggedIn(principal) => {
            println!("Logged in as {} ({}).", principal.username, principal.role);
            match principal.role {
                Role::Admin => admin_menu(&mut input, &principal, &credentials, &students)?,
                Role::Student => student_menu(&mut input, &principal, &credentials, &students)?,
            }
            println!("Goodbye.");
            Ok(0)
        }
    }
}

fn admin_menu(
    input: &mut impl BufRead,
    principal: &Principal,
    credentials: &CredentialStore,
    students: &StudentStore,
) -> Result<(), Error> {
    loop {
        println!();
        println!("ADMIN MENU");
        println!("1. Add student");
        println!("2. List students");
        println!("3. Search student");
        println!("4. Update student");
        println!("5. Delete student");
        println!("6. Create user");
        println!("7. Delete user");
        println!("8. Change my password");
        println!("9. Logout");
        let Some(choice) = prompt(input, "Choice: ")? else {
            return Ok(());
        };
        let outcome = match lenient_int(&choice) {
            1 => add_student(input, students),
            2 => list_students(students),
            3 => search_student(input, students),
            4 => update_student(input, students),
            5 => delete_student(input, students),
            6 => create_user(input, credentials),
            7 => delete_user(input, principal, credentials),
            8 => change_password(input, principal, credentials),
            9 => return Ok(()),
            _ => {
                println!("Invalid choice.");
                Ok(())
            }
        };
        report(outcome);
    }
}

fn student_menu(
    input: &mut impl BufRead,
    principal: &Principal,
    credentials: &CredentialStore,
    students: &StudentStore,
) -> Result<(), Error> {
    loop {
        println!();
        println!("STUDENT MENU");
        println!("1. List students");
        println!("2. Search student");
        println!("3. Change my password");
        println!("4. Logout");
        let Some(choice) = prompt(input, "Choice: ")? else {
            return Ok(());
        };
        let outcome = match lenient_int(&choice) {
            1 => list_students(students),
            2 => search_student(input, students),
            3 => change_password(input, principal, credentials),
            4 => return Ok(()),
            _ => {
                println!("Invalid choice.");
                Ok(())
            }
        };
        report(outcome);
    }
}

fn add_student(input: &mut impl BufRead, students: &StudentStore) -> Result<(), Error> {
    let roll = lenient_int(&prompt(input, "Roll: ")?.unwrap_or_default());
    let name = prompt(input, "Name: ")?.unwrap_or_default();
    let mark = lenient_float(&prompt(input, "Mark: ")?.unwrap_or_default());
    match students.append(&Student { roll, name, mark }) {
        Ok(()) => {
            println!("Student added.");
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::Usage => {
            println!("Invalid name: must not contain '|'.");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

fn list_students(students: &StudentStore) -> Result<(), Error> {
    let records = students.list()?;
    if records.is_empty() {
        println!("No students recorded.");
        return Ok(());
    }
    if io::stdout().is_terminal() {
        println!("{:<8} {:<24} {:>8}", "ROLL", "NAME", "MARK");
        for record in &records {
            println!("{:<8} {:<24} {:>8.2}", record.roll, record.name, record.mark);
        }
    } else {
        for record in &records {
            emit_record_json(record)?;
        }
    }
    Ok(())
}

fn search_student(input: &mut impl BufRead, students: &StudentStore) -> Result<(), Error> {
    let roll = lenient_int(&prompt(input, "Enter roll: ")?.unwrap_or_default());
    match students.find(roll)? {
        Some(record) => {
            if io::stdout().is_terminal() {
                println!("Found: {} | {} | {:.2}", record.roll, record.name, record.mark);
            } else {
                emit_record_json(&record)?;
            }
        }
        None => println!("Student not found."),
    }
    Ok(())
}

fn update_student(input: &mut impl BufRead, students: &StudentStore) -> Result<(), Error> {
    let roll = lenient_int(&prompt(input, "Roll to update: ")?.unwrap_or_default());
    let name = prompt(input, "New name: ")?.unwrap_or_default();
    let mark = lenient_float(&prompt(input, "New mark: ")?.unwrap_or_default());
    match students.update(roll, &name, mark) {
        Ok(()) => println!("Record updated."),
        Err(err) if err.kind() == ErrorKind::NotFound => println!("Roll not found."),
        Err(err) if err.kind() == ErrorKind::Usage => {
            println!("Invalid name: must not contain '|'.");
        }
        Err(err) => return Err(err),
    }
    Ok(())
}

fn delete_student(input: &mut impl BufRead, students: &StudentStore) -> Result<(), Error> {
    let roll = lenient_int(&prompt(input, "Roll to delete: ")?.unwrap_or_default());
    match students.remove(roll) {
        Ok(()) => println!("Student deleted."),
        Err(err) if err.kind() == ErrorKind::NotFound => println!("Roll not found."),
        Err(err) => return Err(err),
    }
    Ok(())
}

fn create_user(input: &mut impl BufRead, credentials: &CredentialStore) -> Result<(), Error> {
    let username = prompt(input, "New username: ")?.unwrap_or_default();
    if username.is_empty() || username.contains(char::is_whitespace) {
        println!("Invalid username.");
        return Ok(());
    }
    let password = prompt(input, "New password: ")?.unwrap_or_default();
    if password.is_empty() || password.contains(char::is_whitespace) {
        println!("Invalid password.");
        return Ok(());
    }
    let role = prompt(input, "Role (admin/student): ")?.unwrap_or_default();
    let Some(role) = Role::parse(&role) else {
        println!("Invalid role. Must be 'admin' or 'student'.");
        return Ok(());
    };
    let record = Credential {
        username,
        password,
        role: role.as_str().to_string(),
    };
    match credentials.create(&record) {
        Ok(()) => {
            println!("User '{}' created with role '{role}'.", record.username);
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            println!("Username already exists.");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

fn delete_user(
    input: &mut impl BufRead,
    principal: &Principal,
    credentials: &CredentialStore,
) -> Result<(), Error> {
    let username = prompt(input, "Username to delete: ")?.unwrap_or_default();
    if username.is_empty() {
        println!("Invalid username.");
        return Ok(());
    }
    match session::remove_user(principal, credentials, &username) {
        Ok(()) => println!("User '{username}' removed."),
        Err(err) if err.kind() == ErrorKind::Permission => {
            println!("You cannot delete your own account while logged in.");
        }
        Err(err) if err.kind() == ErrorKind::NotFound => println!("User does not exist."),
        Err(err) => return Err(err),
    }
    Ok(())
}

fn change_password(
    input: &mut impl BufRead,
    principal: &Principal,
    credentials: &CredentialStore,
) -> Result<(), Error> {
    let new_password = prompt(input, "Enter new password: ")?.unwrap_or_default();
    if new_password.is_empty() || new_password.contains(char::is_whitespace) {
        println!("Invalid password.");
        return Ok(());
    }
    session::change_password(principal, credentials, &new_password)?;
    println!(
        "Password updated for '{}'. Re-login to confirm; this session continues.",
        principal.username
    );
    Ok(())
}

/// Print `text` as a prompt and read one trimmed line. `None` means the
/// input stream is closed (treated as logout by the menus).
fn prompt(input: &mut impl BufRead, text: &str) -> Result<Option<String>, Error> {
    print!("{text}");
    io::stdout()
        .flush()
        .map_err(|err| Error::new(ErrorKind::Io).with_source(err))?;
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|err| Error::new(ErrorKind::Io).with_source(err))?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn emit_record_json(record: &Student) -> Result<(), Error> {
    let line = serde_json::to_string(record)
        .map_err(|err| Error::new(ErrorKind::Internal).with_source(err))?;
    println!("{line}");
    Ok(())
}

// Unexpected failures (I/O and the like): report and keep the menu alive;
// the operator decides whether to retry.
fn report(outcome: Result<(), Error>) {
    if let Err(err) = outcome {
        eprintln!("rollcall: {err}");
    }
}
