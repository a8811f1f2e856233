// src/scrape/student.rs

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use scraper::Html;

use crate::config::consts::{COURSES_PATH, PROFILE_PATH};
use crate::core::entity::{Entity, PageMeta};
use crate::core::error::{DidelError, Result};
use crate::core::html::{sel, text_of};
use crate::core::session::{Session, query_param};
use crate::scrape::course::Course;

/// A signed-in student, the root of the entity graph.
///
/// Owns the authenticated session. Profile fields come off the profile
/// page on fetch; courses are cached by code, write-once, and never
/// refreshed once populated.
pub struct Student {
    meta: PageMeta,
    session: Session,
    logged_in: bool,
    pub username: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    /// The university's official student number.
    pub code: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skype: Option<String>,
    /// Internal id the work-submission form is keyed by.
    pub auth_id: Option<String>,
    courses: HashMap<String, Course>,
}

/// One row of the course-references page.
pub struct CourseRef {
    pub code: String,
    pub title: String,
}

impl Student {
    /// A student handle bound to `session`. Call [`Student::login`]
    /// before anything authenticated.
    pub fn new(session: Session, username: &str) -> Self {
        Self {
            meta: PageMeta::at(PROFILE_PATH),
            session,
            logged_in: false,
            username: s!(username),
            firstname: None,
            lastname: None,
            code: None,
            email: None,
            phone: None,
            skype: None,
            auth_id: None,
            courses: HashMap::new(),
        }
    }

    /// Run the CAS login and remember the outcome. Authenticated
    /// operations refuse to run while this has not succeeded.
    pub fn login(&mut self, password: &str) -> Result<bool> {
        let username = self.username.clone();
        self.logged_in = self.session.login(&username, password)?;
        Ok(self.logged_in)
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn ensure_logged_in(&self) -> Result<()> {
        if self.logged_in {
            Ok(())
        } else {
            Err(DidelError::LoginRequired)
        }
    }

    /// Fetch the profile page into this student's fields.
    pub fn load_profile(&mut self) -> Result<bool> {
        self.ensure_logged_in()?;
        let session = self.session.clone();
        self.fetch(&session)
    }

    /// "lastname firstname", the shape the portal wants authors in.
    pub fn author_name(&self) -> String {
        match (&self.lastname, &self.firstname) {
            (Some(last), Some(first)) => format!("{last} {first}"),
            (Some(last), None) => last.clone(),
            (None, Some(first)) => first.clone(),
            (None, None) => self.username.clone(),
        }
    }

    /// The course registered under `code`, fetched the first time it is
    /// asked for. Later calls return the cached instance, no request.
    pub fn get_course(&mut self, code: &str) -> Result<&mut Course> {
        self.ensure_logged_in()?;
        match self.courses.entry(s!(code)) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let mut course = Course::new(code);
                course.fetch(&self.session)?;
                Ok(entry.insert(course))
            }
        }
    }

    /// Every course the references page lists for this account. Read
    /// fresh on each call; only `get_course` caches.
    pub fn get_all_courses(&mut self) -> Result<Vec<CourseRef>> {
        self.ensure_logged_in()?;
        let resp = self.session.get(COURSES_PATH)?;
        if !resp.ok() {
            return Err(resp.error());
        }
        let doc = Html::parse_document(&resp.text);
        Ok(parse_course_refs(&doc))
    }
}

/// Course links on the references page carry the code in their `cid`
/// query parameter; the link text is the display title.
fn parse_course_refs(doc: &Html) -> Vec<CourseRef> {
    let link = sel(r#"a[href*="cid="]"#);
    let mut seen = Vec::new();
    let mut out = Vec::new();
    for a in doc.select(&link) {
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        let Some(code) = query_param(href, "cid") else {
            continue;
        };
        if seen.contains(&code) {
            continue;
        }
        seen.push(code.clone());
        out.push(CourseRef {
            code,
            title: text_of(a),
        });
    }
    out
}

impl Entity for Student {
    fn meta(&self) -> &PageMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut PageMeta {
        &mut self.meta
    }

    fn kind(&self) -> &'static str {
        "student"
    }

    fn populate(&mut self, doc: &Html, _session: &Session) -> Result<()> {
        self.ensure_logged_in()?;
        // The profile is a form; every field of interest is a named
        // input with its current value.
        let inputs = sel("input");
        let mut fields: HashMap<&str, &str> = HashMap::new();
        for input in doc.select(&inputs) {
            let el = input.value();
            if let (Some(name), Some(value)) = (el.attr("name"), el.attr("value")) {
                fields.insert(name, value);
            }
        }
        let grab = |key: &str| {
            fields
                .get(key)
                .filter(|v| !v.is_empty())
                .map(|v| s!(*v))
        };
        self.firstname = grab("firstname");
        self.lastname = grab("lastname");
        self.code = grab("officialCode");
        self.email = grab("email");
        self.phone = grab("phone");
        self.skype = grab("skype");
        self.auth_id = grab("authId");
        Ok(())
    }
}
