// tests/entity_graph.rs
//
// Lifecycle of the lazy fetch-and-populate contract, driven over a real
// (local) HTTP server.
//
mod common;

use common::TestServer;
use didel::core::entity::{Entity, PageMeta, subresource};
use didel::core::error::DidelError;
use didel::core::session::Session;
use didel::scrape::Course;
use scraper::Html;

fn session_for(server: &TestServer) -> Session {
    Session::with_portal(
        &server.url(""),
        &server.url("/cas/login"),
        &server.url("/cas/logout"),
    )
    .unwrap()
}

/// Minimal page entity: remembers the page's text.
struct Page {
    meta: PageMeta,
    body: Option<String>,
}

impl Page {
    fn at(path: &str) -> Self {
        Self {
            meta: PageMeta::at(path),
            body: None,
        }
    }
}

impl Entity for Page {
    fn meta(&self) -> &PageMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut PageMeta {
        &mut self.meta
    }
    fn kind(&self) -> &'static str {
        "page"
    }
    fn populate(&mut self, doc: &Html, _session: &Session) -> didel::Result<()> {
        self.body = Some(doc.root_element().text().collect::<String>().trim().to_string());
        Ok(())
    }
}

/// A parent with one named child, accessed the explicit-accessor way.
struct Parent {
    meta: PageMeta,
    child: Page,
}

impl Parent {
    fn child(&mut self) -> didel::Result<&mut Page> {
        subresource("parent", &self.meta, &mut self.child)
    }
}

impl Entity for Parent {
    fn meta(&self) -> &PageMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut PageMeta {
        &mut self.meta
    }
    fn kind(&self) -> &'static str {
        "parent"
    }
    fn populate(&mut self, _doc: &Html, _session: &Session) -> didel::Result<()> {
        Ok(())
    }
}

#[test]
fn fetch_populates_exactly_once() {
    let server = TestServer::start();
    server.route("GET", "/page", 200, "x42");
    let session = session_for(&server);

    let mut page = Page::at("/page");
    assert!(!page.is_populated());

    assert!(page.fetch(&session).unwrap());
    assert!(page.is_populated());
    assert_eq!(page.body.as_deref(), Some("x42"));

    // Repeat fetch: "nothing to do", no second request.
    assert!(!page.fetch(&session).unwrap());
    assert!(page.is_populated());
    assert_eq!(server.hits("GET", "/page"), 1);
}

#[test]
fn missing_page_is_a_soft_failure() {
    let server = TestServer::start();
    server.route("GET", "/gone", 404, "xozers12deA=41.");
    let session = session_for(&server);

    let mut page = Page::at("/gone");
    assert!(!page.fetch(&session).unwrap());
    assert!(!page.is_populated());
    assert_eq!(server.hits("GET", "/gone"), 1);
}

#[test]
fn broken_page_is_a_soft_failure() {
    let server = TestServer::start();
    server.route("GET", "/broken", 500, "oops");
    let session = session_for(&server);

    let mut page = Page::at("/broken");
    assert!(!page.fetch(&session).unwrap());
    assert!(!page.is_populated());
    assert_eq!(server.hits("GET", "/broken"), 1);
}

#[test]
fn subresource_before_parent_population_refuses() {
    let mut parent = Parent {
        meta: PageMeta::at("/parent"),
        child: Page::at("/child"),
    };
    assert!(matches!(
        parent.child(),
        Err(DidelError::NotPopulated("parent"))
    ));
}

#[test]
fn subresource_is_fetched_once_then_cached() {
    let server = TestServer::start();
    server.route("GET", "/parent", 200, "p");
    server.route("GET", "/child", 200, "c");
    let session = session_for(&server);

    let mut parent = Parent {
        meta: PageMeta::at("/parent"),
        child: Page::at("/child"),
    };
    assert!(parent.fetch(&session).unwrap());
    assert!(!parent.child.is_populated());

    let child = parent.child().unwrap();
    assert!(child.is_populated());
    assert_eq!(child.body.as_deref(), Some("c"));

    // Second access comes from the cache.
    let _ = parent.child().unwrap();
    assert_eq!(server.hits("GET", "/child"), 1);
}

#[test]
fn course_assignments_chain_fetches_lazily() {
    let server = TestServer::start();
    server.route(
        "GET",
        "/claroline/course/index.php?cid=X&cidReset=true&cidReq=X",
        200,
        r#"<div class="courseInfos"><h2><a>Systems</a></h2><p>Dr. Who</p></div>"#,
    );
    server.route(
        "GET",
        "/claroline/work/work.php?cidReset=true&cidReq=X",
        200,
        r#"<div id="courseRightContent"><table><tbody>
            <tr><td><a href="work.php?cidReq=X&assigId=3">TP 1</a></td></tr>
        </tbody></table></div>"#,
    );
    server.route(
        "GET",
        "/claroline/work/work.php?cidReq=X&assigId=3",
        200,
        r#"<div id="courseRightContent"><p><small>
            <b>Titre</b> : TP 1<br/><b>Du</b> 01.02.2015
        </small></p></div>"#,
    );
    let session = session_for(&server);

    let mut course = Course::new("X");

    // Nothing requested yet, and the list is out of reach until the
    // course page itself is populated.
    assert!(course.assignments().is_err());
    assert!(course.fetch(&session).unwrap());
    assert_eq!(course.title.as_deref(), Some("Systems"));
    assert_eq!(course.teacher.as_deref(), Some("Dr. Who"));

    // The list page is fetched on first access only.
    let n = course.assignments().unwrap().len();
    assert_eq!(n, 1);
    let _ = course.assignments().unwrap();
    assert_eq!(
        server.hits("GET", "/claroline/work/work.php?cidReset=true&cidReq=X"),
        1
    );

    // Same per-index contract for the detail pages.
    {
        let assignments = course.assignments().unwrap();
        let a = assignments.get(0).unwrap();
        assert_eq!(a.title.as_deref(), Some("TP 1"));
        assert_eq!(a.assignment_id.as_deref(), Some("3"));
    }
    let _ = course.assignments().unwrap().get(0).unwrap();
    assert_eq!(
        server.hits("GET", "/claroline/work/work.php?cidReq=X&assigId=3"),
        1
    );
}
