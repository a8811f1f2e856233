// src/scrape/assignments.rs

use std::path::Path;

use log::info;
use reqwest::blocking::multipart;
use scraper::Html;

use crate::config::consts::{
    FIELD_AUTHOR, FIELD_FILE, FIELD_FORM_ID, FIELD_TEXT, FIELD_TITLE, SUBMIT_FORM_ID,
};
use crate::core::entity::{Entity, PageMeta, subresource};
use crate::core::error::{DidelError, Result};
use crate::core::html::{first, sel};
use crate::core::session::{Session, query_param};
use crate::scrape::student::Student;

const SUBMIT_PATH: &str = "/claroline/work/user_work.php";

fn list_path(code: &str) -> String {
    format!("/claroline/work/work.php?cidReset=true&cidReq={code}")
}

/// The assignment list page of one course: a page entity owning the
/// ordered assignments discovered on it.
pub struct Assignments {
    meta: PageMeta,
    code: String,
    items: Vec<Assignment>,
}

impl Assignments {
    pub fn new(code: &str) -> Self {
        Self {
            meta: PageMeta::at(list_path(code)),
            code: s!(code),
            items: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Indexed access with the fetch-once contract: the assignment's own
    /// page is fetched the first time this index is asked for, and comes
    /// from the cache afterwards.
    pub fn get(&mut self, idx: usize) -> Result<&mut Assignment> {
        if !self.is_populated() {
            return Err(DidelError::NotPopulated("assignment list"));
        }
        let child = self
            .items
            .get_mut(idx)
            .ok_or_else(|| DidelError::Scrape(format!("no assignment at index {idx}")))?;
        subresource("assignment list", &self.meta, child)
    }
}

impl Entity for Assignments {
    fn meta(&self) -> &PageMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut PageMeta {
        &mut self.meta
    }

    fn kind(&self) -> &'static str {
        "assignment list"
    }

    fn populate(&mut self, doc: &Html, _session: &Session) -> Result<()> {
        let rows = sel("#courseRightContent table tbody tr");
        let link = sel("a");
        for tr in doc.select(&rows) {
            let Some(a) = tr.select(&link).next() else {
                continue;
            };
            let Some(href) = a.value().attr("href") else {
                continue;
            };
            self.items.push(Assignment::discovered(
                &format!("/claroline/work/{href}"),
                &self.code,
            ));
        }
        Ok(())
    }
}

/// One assignment's detail page.
pub struct Assignment {
    meta: PageMeta,
    pub course_code: String,
    pub title: Option<String>,
    pub begin: Option<String>,
    pub end: Option<String>,
    pub submission_type: Option<String>,
    pub work_type: Option<String>,
    pub visibility: Option<String>,
    /// Parsed out of this page's own URL, not out of the page.
    pub assignment_id: Option<String>,
}

impl Assignment {
    /// Built from the raw href found on the course's list page.
    pub fn discovered(path: &str, course_code: &str) -> Self {
        Self {
            meta: PageMeta::at(path),
            course_code: s!(course_code),
            title: None,
            begin: None,
            end: None,
            submission_type: None,
            work_type: None,
            visibility: None,
            assignment_id: None,
        }
    }

    /// Upload a piece of work.
    ///
    /// The portal gives no structured receipt; the submitted title
    /// showing up in the reply is the only success signal there is, so
    /// that is what gets checked. The student must be populated (author
    /// names and authId come from the profile), and this assignment too.
    pub fn submit(
        &self,
        student: &Student,
        title: &str,
        file: &Path,
        description: Option<&str>,
    ) -> Result<bool> {
        if !self.is_populated() {
            return Err(DidelError::NotPopulated("assignment"));
        }
        if !student.is_populated() {
            return Err(DidelError::NotPopulated("student"));
        }
        let assig_id = self
            .assignment_id
            .clone()
            .ok_or_else(|| DidelError::Scrape(s!("assignment URL carries no assigId")))?;
        let auth_id = student
            .auth_id
            .clone()
            .ok_or_else(|| DidelError::Scrape(s!("student profile carries no authId")))?;

        let form = multipart::Form::new()
            .text(FIELD_FORM_ID, SUBMIT_FORM_ID)
            .text(FIELD_TITLE, s!(title))
            .text(FIELD_AUTHOR, student.author_name())
            .text(FIELD_TEXT, s!(description.unwrap_or("")))
            .file(FIELD_FILE, file)?;
        let params = [
            ("assigId", assig_id.as_str()),
            ("authId", auth_id.as_str()),
            ("cidReq", self.course_code.as_str()),
        ];
        let resp = student.session().post_multipart(SUBMIT_PATH, &params, form)?;
        let done = resp.ok() && resp.text.contains(title);
        if done {
            info!("submitted {title:?} to assignment {assig_id}");
        }
        Ok(done)
    }
}

impl Entity for Assignment {
    fn meta(&self) -> &PageMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut PageMeta {
        &mut self.meta
    }

    fn kind(&self) -> &'static str {
        "assignment"
    }

    fn populate(&mut self, doc: &Html, _session: &Session) -> Result<()> {
        let content = first(doc.root_element(), "#courseRightContent")
            .ok_or_else(|| DidelError::Scrape(s!("assignment page has no content pane")))?;
        let block = first(content, "p small")
            .ok_or_else(|| DidelError::Scrape(s!("assignment page has no details block")))?;
        let attrs = crate::core::defs::parse_defs(block);
        let grab = |key: &str| attrs.get(key).cloned();

        self.title = grab("titre");
        self.begin = grab("du");
        self.end = grab("au");
        self.submission_type = grab("type de soumission");
        self.work_type = grab("type de travail");
        self.visibility = grab("visibilité de la soumission");

        let id = self.meta.path().and_then(|p| query_param(p, "assigId"));
        self.assignment_id = id;
        Ok(())
    }
}
