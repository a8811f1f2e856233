// src/core/entity.rs

use log::debug;
use scraper::Html;

use crate::core::error::{DidelError, Result};
use crate::core::session::{Session, resolve_url};

/// Book-keeping embedded in every page-backed object.
#[derive(Clone, Default)]
pub struct PageMeta {
    path: Option<String>,
    populated: bool,
    session: Option<Session>,
}

impl PageMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = Some(path.into());
    }

    /// The session that populated this entity, once there is one.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }
}

/// A lazily-fetched, HTML-backed object.
///
/// A concrete type declares its page path, reads its fields out of the
/// parsed page in `populate`, and inherits the fetch-once lifecycle:
/// nothing is requested until `fetch` runs, and it runs at most once per
/// instance. Fields other than the path are meaningless until
/// `is_populated()` reports true.
pub trait Entity {
    fn meta(&self) -> &PageMeta;
    fn meta_mut(&mut self) -> &mut PageMeta;

    /// Short name used in error messages.
    fn kind(&self) -> &'static str;

    /// Whether this type has a population routine at all. Plain file
    /// references (downloaded, never parsed) say no, and `fetch` backs
    /// off before any request is made.
    fn can_populate(&self) -> bool {
        true
    }

    /// Read fields out of the fetched page. May register children
    /// discovered there.
    fn populate(&mut self, doc: &Html, session: &Session) -> Result<()>;

    fn is_populated(&self) -> bool {
        self.meta().populated
    }

    /// Absolute location of this entity's page, when a path is set.
    fn url(&self) -> Option<String> {
        self.meta().path().map(resolve_url)
    }

    /// Fetch the page and populate, once.
    ///
    /// The raw path goes to the session, which resolves root-relative
    /// locations against its portal root. Soft failures return Ok(false)
    /// with the entity untouched: no population routine, no path, or a
    /// non-ok response. A repeat call on a populated entity is also
    /// Ok(false), the "nothing to do" signal. Transport and population
    /// errors propagate.
    fn fetch(&mut self, session: &Session) -> Result<bool> {
        if !self.can_populate() || self.is_populated() {
            return Ok(false);
        }
        let Some(path) = self.meta().path().map(String::from) else {
            return Ok(false);
        };
        let resp = session.get(&path)?;
        if !resp.ok() {
            debug!("{} fetch got {} on {}", self.kind(), resp.status, resp.url);
            return Ok(false);
        }
        let doc = Html::parse_document(&resp.text);
        self.meta_mut().session = Some(session.clone());
        self.populate(&doc, session)?;
        self.meta_mut().populated = true;
        Ok(true)
    }
}

/// Backend for the explicit sub-resource accessors.
///
/// `parent` is the meta of the owning entity, `child` one of its
/// registered resources. The parent must already be populated; the child
/// is fetched with the parent's stored session on first access and comes
/// straight from the cache afterwards.
pub fn subresource<'a, C: Entity>(
    parent_kind: &'static str,
    parent: &PageMeta,
    child: &'a mut C,
) -> Result<&'a mut C> {
    if !parent.populated {
        return Err(DidelError::NotPopulated(parent_kind));
    }
    let session = parent
        .session
        .as_ref()
        .ok_or(DidelError::NotPopulated(parent_kind))?;
    if !child.is_populated() {
        child.fetch(session)?;
    }
    Ok(child)
}
