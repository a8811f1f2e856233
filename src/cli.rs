// src/cli.rs
use std::env;
use std::path::Path;
use std::process;

use color_eyre::eyre::{Result, bail};
use dialoguer::Password;

use crate::config::settings::Settings;
use crate::core::entity::Entity;
use crate::core::error::DidelError;
use crate::core::session::Session;
use crate::scrape::{Course, Student};

pub fn run() -> Result<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!(include_str!("cli_help.txt"));
        return Ok(());
    }
    let action = args.remove(0);
    match action.as_str() {
        "-h" | "-help" | "--help" => {
            print_version();
            eprintln!(include_str!("cli_help.txt"));
            Ok(())
        }
        "-v" | "-version" | "--version" => {
            print_version();
            Ok(())
        }
        _ => dispatch(&action, &args),
    }
}

fn print_version() {
    println!("didel v{}", env!("CARGO_PKG_VERSION"));
}

fn dispatch(action: &str, args: &[String]) -> Result<()> {
    let mut settings = Settings::open(Settings::default_path())?;

    match action {
        "login:init" => {
            let [username] = exact(args, "login:init <username>")?;
            let password = Password::new().with_prompt("Password").interact()?;
            settings.set_secret("username", username);
            settings.set_secret("password", &password);
            settings.save()?;
        }
        "config:set" => {
            let [key, value] = exact(args, "config:set <key> <value>")?;
            settings.set(key, value);
            settings.save()?;
        }
        "config:get" => {
            let [key] = exact(args, "config:get <key>")?;
            match settings.get(key) {
                Some(value) => println!("{value}"),
                None => process::exit(1),
            }
        }
        "config:list" => {
            no_args(args, "config:list")?;
            for (key, value) in settings.items() {
                println!("{key}={value}");
            }
        }
        "profile:show" => {
            no_args(args, "profile:show")?;
            let mut student = get_student(&settings)?;
            student.load_profile()?;
            println!(
                "{} {} ({})",
                student.firstname.as_deref().unwrap_or("?"),
                student.lastname.as_deref().unwrap_or("?"),
                student.username,
            );
            if let Some(code) = &student.code {
                println!("Student number: {code}");
            }
            for (label, value) in [
                ("Email", &student.email),
                ("Phone", &student.phone),
                ("Skype", &student.skype),
            ] {
                if let Some(value) = value {
                    println!("{label}: {value}");
                }
            }
        }
        "courses:list" => {
            no_args(args, "courses:list")?;
            let mut student = get_student(&settings)?;
            for course in student.get_all_courses()? {
                println!("{}\t{}", course.code, course.title);
            }
        }
        "courses:show" => {
            let [code] = exact(args, "courses:show <code>")?;
            let mut student = get_student(&settings)?;
            let course = student.get_course(code)?;
            if !course.is_populated() {
                bail!("no such course: {code}");
            }
            println!(
                "{} ({})\n",
                course.title.as_deref().unwrap_or(code),
                course.teacher.as_deref().unwrap_or("unknown teacher"),
            );
            if let Some(about) = &course.about {
                println!("{about}");
            }
        }
        "courses:enroll" => {
            let (code, key) = one_plus_optional(args, "courses:enroll <code> [key]")?;
            let student = get_student(&settings)?;
            let course = Course::new(code);
            if course.enroll(student.session(), key)? {
                println!("Enrolled in {code}.");
            } else {
                bail!("the portal did not confirm the enrollment");
            }
        }
        "courses:unenroll" => {
            let [code] = exact(args, "courses:unenroll <code>")?;
            let student = get_student(&settings)?;
            let course = Course::new(code);
            if course.unenroll(student.session())? {
                println!("Unenrolled from {code}.");
            } else {
                bail!("the portal did not confirm the unenrollment");
            }
        }
        "assignments:list" => {
            let [code] = exact(args, "assignments:list <code>")?;
            let student = get_student(&settings)?;
            let mut course = fetch_course(&student, code)?;
            let assignments = course.assignments()?;
            for idx in 0..assignments.len() {
                let a = assignments.get(idx)?;
                println!(
                    "{idx}\t{}\t{} .. {}",
                    a.title.as_deref().unwrap_or("(untitled)"),
                    a.begin.as_deref().unwrap_or("?"),
                    a.end.as_deref().unwrap_or("?"),
                );
            }
        }
        "assignments:show" => {
            let [code, idx] = exact(args, "assignments:show <code> <n>")?;
            let idx: usize = idx.parse()?;
            let student = get_student(&settings)?;
            let mut course = fetch_course(&student, code)?;
            let a = course.assignments()?.get(idx)?;
            for (label, value) in [
                ("Title", &a.title),
                ("Begin", &a.begin),
                ("End", &a.end),
                ("Submission type", &a.submission_type),
                ("Work type", &a.work_type),
                ("Visibility", &a.visibility),
                ("Id", &a.assignment_id),
            ] {
                println!("{label}: {}", value.as_deref().unwrap_or("-"));
            }
        }
        "assignments:submit" => {
            let (fixed, description) = four_plus_optional(
                args,
                "assignments:submit <code> <n> <file> <title> [description]",
            )?;
            let [code, idx, file, title] = fixed;
            let idx: usize = idx.parse()?;
            let mut student = get_student(&settings)?;
            student.load_profile()?;
            let mut course = fetch_course(&student, code)?;
            let assignment = course.assignments()?.get(idx)?;
            if assignment.submit(&student, title, Path::new(file), description)? {
                println!("Submitted {title:?}.");
            } else {
                bail!("the portal did not confirm the submission");
            }
        }
        "docs:sync" => {
            let [code, dir] = exact(args, "docs:sync <code> <dir>")?;
            let student = get_student(&settings)?;
            let mut course = fetch_course(&student, code)?;
            let documents = course.documents()?;
            let count = documents.synchronize(Path::new(dir), student.session())?;
            println!("{count} file(s) downloaded into {dir}");
        }
        _ => {
            eprintln!("Unrecognized action '{action}'");
            eprintln!(include_str!("cli_help.txt"));
            process::exit(1);
        }
    }

    Ok(())
}

/* ---------- helpers ---------- */

fn get_student(settings: &Settings) -> Result<Student> {
    let (Some(username), Some(password)) = (
        settings.get_secret("username"),
        settings.get_secret("password"),
    ) else {
        bail!("configure your login credentials with 'didel login:init <username>'");
    };
    let mut student = Student::new(Session::new()?, username);
    if !student.login(password)? {
        return Err(DidelError::LoginRequired.into());
    }
    Ok(student)
}

/// Fetch a course page outside the student's cache; the write and list
/// actions want a fresh object they can borrow independently.
fn fetch_course(student: &Student, code: &str) -> Result<Course> {
    let mut course = Course::new(code);
    course.fetch(student.session())?;
    if !course.is_populated() {
        bail!("no such course: {code}");
    }
    Ok(course)
}

fn no_args(args: &[String], usage: &str) -> Result<()> {
    if args.is_empty() {
        Ok(())
    } else {
        bail!("usage: didel {usage}")
    }
}

fn exact<'a, const N: usize>(args: &'a [String], usage: &str) -> Result<[&'a str; N]> {
    let got: Vec<&str> = args.iter().map(String::as_str).collect();
    match <[&str; N]>::try_from(got) {
        Ok(fixed) => Ok(fixed),
        Err(_) => bail!("usage: didel {usage}"),
    }
}

fn one_plus_optional<'a>(args: &'a [String], usage: &str) -> Result<(&'a str, Option<&'a str>)> {
    match args {
        [one] => Ok((one.as_str(), None)),
        [one, two] => Ok((one.as_str(), Some(two.as_str()))),
        _ => bail!("usage: didel {usage}"),
    }
}

fn four_plus_optional<'a>(
    args: &'a [String],
    usage: &str,
) -> Result<([&'a str; 4], Option<&'a str>)> {
    match args {
        [a, b, c, d] => Ok(([a.as_str(), b.as_str(), c.as_str(), d.as_str()], None)),
        [a, b, c, d, e] => Ok((
            [a.as_str(), b.as_str(), c.as_str(), d.as_str()],
            Some(e.as_str()),
        )),
        _ => bail!("usage: didel {usage}"),
    }
}
