// src/scrape/course.rs

use log::info;
use scraper::Html;

use crate::config::consts::{CMD_ENROLL, CMD_UNENROLL, COURSES_PATH, ENROLL_OK, UNENROLL_OK};
use crate::core::entity::{Entity, PageMeta, subresource};
use crate::core::error::{DidelError, Result};
use crate::core::html::{first, text_of};
use crate::core::session::Session;
use crate::scrape::assignments::Assignments;
use crate::scrape::documents::DocumentFolder;

fn course_path(code: &str) -> String {
    format!("/claroline/course/index.php?cid={code}&cidReset=true&cidReq={code}")
}

/// One course page.
///
/// A reference starting with '/' (or a full URL) is used as the page
/// location verbatim; anything else is treated as a course code and
/// templated into the portal's course page path.
pub struct Course {
    meta: PageMeta,
    pub code: String,
    pub title: Option<String>,
    pub teacher: Option<String>,
    pub about: Option<String>,
    assignments: Assignments,
    documents: DocumentFolder,
}

impl Course {
    pub fn new(reference: &str) -> Self {
        let path = if reference.starts_with('/') || reference.starts_with("http") {
            s!(reference)
        } else {
            course_path(reference)
        };
        Self {
            meta: PageMeta::at(path),
            code: s!(reference),
            title: None,
            teacher: None,
            about: None,
            assignments: Assignments::new(reference),
            documents: DocumentFolder::for_course(reference),
        }
    }

    /// The course's assignment list; fetched on first access, cached
    /// afterwards. The course itself must be populated first.
    pub fn assignments(&mut self) -> Result<&mut Assignments> {
        subresource("course", &self.meta, &mut self.assignments)
    }

    /// Root of the course's document tree, same contract.
    pub fn documents(&mut self) -> Result<&mut DocumentFolder> {
        subresource("course", &self.meta, &mut self.documents)
    }

    /// Sign up for this course.
    ///
    /// Without a key the portal accepts a plain GET carrying the
    /// enrollment command; with one, the key rides along in a POST.
    /// Ok(true) iff the portal confirms. Non-ok responses are hard
    /// failures.
    pub fn enroll(&self, session: &Session, key: Option<&str>) -> Result<bool> {
        let params = [("cmd", CMD_ENROLL), ("course", self.code.as_str())];
        let resp = match key {
            None => session.get_with(COURSES_PATH, &params)?,
            Some(k) => session.post(COURSES_PATH, &params, &[("registrationKey", k)])?,
        };
        if !resp.ok() {
            return Err(resp.error());
        }
        let done = resp.text.contains(ENROLL_OK);
        if done {
            info!("enrolled in {}", self.code);
        }
        Ok(done)
    }

    pub fn unenroll(&self, session: &Session) -> Result<bool> {
        let params = [("cmd", CMD_UNENROLL), ("course", self.code.as_str())];
        let resp = session.get_with(COURSES_PATH, &params)?;
        if !resp.ok() {
            return Err(resp.error());
        }
        let done = resp.text.contains(UNENROLL_OK);
        if done {
            info!("unenrolled from {}", self.code);
        }
        Ok(done)
    }
}

impl Entity for Course {
    fn meta(&self) -> &PageMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut PageMeta {
        &mut self.meta
    }

    fn kind(&self) -> &'static str {
        "course"
    }

    fn populate(&mut self, doc: &Html, _session: &Session) -> Result<()> {
        let header = first(doc.root_element(), ".courseInfos")
            .ok_or_else(|| DidelError::Scrape(s!("course page has no .courseInfos header")))?;
        self.title = first(header, "h2 a").map(text_of);
        // The header paragraph stacks the course category over the
        // teacher's name; the name is the last line.
        self.teacher = first(header, "p")
            .map(|p| p.text().collect::<String>())
            .and_then(|t| t.lines().last().map(|l| s!(l.trim())));
        self.about = first(doc.root_element(), "#portletAbout").map(text_of);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const COURSE_PAGE: &str = r##"
        <html><body>
        <div class="courseInfos">
          <h2><a href="#">Compilation avancée</a></h2>
          <p>INFO-M1
Jean Dupont</p>
        </div>
        <div id="portletAbout">  Cours de compilation,
          projet en binôme.  </div>
        </body></html>
    "##;

    #[test]
    fn populate_reads_title_teacher_and_about() {
        let mut course = Course::new("44PC2compile");
        let doc = Html::parse_document(COURSE_PAGE);
        let session = Session::new().unwrap();

        course.populate(&doc, &session).unwrap();

        assert_eq!(course.title.as_deref(), Some("Compilation avancée"));
        assert_eq!(course.teacher.as_deref(), Some("Jean Dupont"));
        assert_eq!(
            course.about.as_deref(),
            Some("Cours de compilation, projet en binôme.")
        );
    }

    #[test]
    fn about_is_optional() {
        let mut course = Course::new("X");
        let doc = Html::parse_document(
            r#"<div class="courseInfos"><h2><a>T</a></h2><p>Y</p></div>"#,
        );
        let session = Session::new().unwrap();
        course.populate(&doc, &session).unwrap();
        assert_eq!(course.about, None);
    }

    #[test]
    fn populate_without_header_is_a_layout_error() {
        let mut course = Course::new("X");
        let doc = Html::parse_document("<p>not a course page</p>");
        let session = Session::new().unwrap();
        assert!(matches!(
            course.populate(&doc, &session),
            Err(DidelError::Scrape(_))
        ));
    }

    #[test]
    fn code_reference_is_templated() {
        let c = Course::new("ABC123");
        let path = c.meta().path().unwrap().to_string();
        assert!(path.contains("cid=ABC123"));
        assert!(path.contains("cidReq=ABC123"));
    }

    #[test]
    fn slash_reference_is_used_verbatim() {
        let c = Course::new("/claroline/course/index.php?cid=X");
        assert_eq!(c.meta().path(), Some("/claroline/course/index.php?cid=X"));
    }
}
