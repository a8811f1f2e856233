// src/scrape/documents.rs

use std::path::Path;

use indexmap::IndexMap;
use log::{debug, info};
use scraper::Html;

use crate::core::entity::{Entity, PageMeta};
use crate::core::error::{DidelError, Result};
use crate::core::html::{sel, text_of};
use crate::core::session::Session;
use crate::file::{ensure_directory, is_local_fresh, portal_date};

fn docs_path(code: &str) -> String {
    format!("/claroline/document/document.php?cidReset=true&cidReq={code}")
}

/// A folder in a course's document area.
///
/// Children are discovered during population: file rows become
/// [`Document`] leaves, folder rows are fetched right away, so the whole
/// tree under a populated folder is complete. The name map keeps the
/// listing order.
pub struct DocumentFolder {
    meta: PageMeta,
    pub name: String,
    children: IndexMap<String, DocEntry>,
}

/// A row of the document listing.
pub enum DocEntry {
    File(Document),
    Folder(DocumentFolder),
}

/// A downloadable file: a name, a location and the portal's idea of when
/// it last changed. There is no page behind it, only bytes, so it has no
/// population routine.
pub struct Document {
    meta: PageMeta,
    pub name: String,
    pub url: String,
    pub date: String,
}

impl DocumentFolder {
    /// Root folder of a course's document area.
    pub fn for_course(code: &str) -> Self {
        Self::at_path(docs_path(code), code)
    }

    /// A folder reached through a listing link.
    pub fn at_path(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            meta: PageMeta::at(path),
            name: name.into(),
            children: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Children in listing order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &DocEntry)> {
        self.children.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn get(&self, name: &str) -> Option<&DocEntry> {
        self.children.get(name)
    }

    /// Mirror this folder into `local`.
    ///
    /// Ensures the directory tree exists, recurses into sub-folders
    /// (named after their portal name), and downloads every file whose
    /// local copy is missing or older than the portal-reported date.
    /// Returns how many files were downloaded.
    pub fn synchronize(&self, local: &Path, session: &Session) -> Result<usize> {
        if !self.is_populated() {
            return Err(DidelError::NotPopulated("document folder"));
        }
        ensure_directory(local)?;
        let mut downloaded = 0;
        for (name, entry) in &self.children {
            match entry {
                DocEntry::Folder(folder) => {
                    downloaded += folder.synchronize(&local.join(name), session)?;
                }
                DocEntry::File(doc) => {
                    let dest = local.join(name);
                    let stamp = portal_date(&doc.date)?;
                    if is_local_fresh(&dest, stamp) {
                        debug!("fresh: {}", dest.display());
                        continue;
                    }
                    session.download(&doc.url, &dest)?;
                    downloaded += 1;
                }
            }
        }
        if downloaded > 0 {
            info!("{}: {downloaded} file(s) downloaded", self.name);
        }
        Ok(downloaded)
    }
}

impl Entity for DocumentFolder {
    fn meta(&self) -> &PageMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut PageMeta {
        &mut self.meta
    }

    fn kind(&self) -> &'static str {
        "document folder"
    }

    fn populate(&mut self, doc: &Html, session: &Session) -> Result<()> {
        let rows = sel("#courseRightContent table tbody tr");
        let link = sel("a");
        let cell = sel("td");
        let icon = sel("img");
        for tr in doc.select(&rows) {
            let Some(a) = tr.select(&link).next() else {
                continue;
            };
            let Some(href) = a.value().attr("href") else {
                continue;
            };
            let name = text_of(a);
            if name.is_empty() {
                continue;
            }
            // The row's icon tells folders and files apart.
            let is_folder = tr
                .select(&icon)
                .next()
                .and_then(|img| img.value().attr("src"))
                .is_some_and(|src| src.contains("folder"));
            if is_folder {
                let mut sub = Self::at_path(href, name.clone());
                sub.fetch(session)?;
                self.children.insert(name, DocEntry::Folder(sub));
            } else {
                let date = tr.select(&cell).nth(2).map(text_of).unwrap_or_default();
                self.children
                    .insert(name.clone(), DocEntry::File(Document::new(name, href, date)));
            }
        }
        Ok(())
    }
}

impl Document {
    pub fn new(name: impl Into<String>, url: impl Into<String>, date: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            meta: PageMeta::at(url.clone()),
            name: name.into(),
            url,
            date: date.into(),
        }
    }
}

impl Entity for Document {
    fn meta(&self) -> &PageMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut PageMeta {
        &mut self.meta
    }

    fn kind(&self) -> &'static str {
        "document"
    }

    fn can_populate(&self) -> bool {
        false
    }

    fn populate(&mut self, _doc: &Html, _session: &Session) -> Result<()> {
        Err(DidelError::Scrape(s!(
            "file documents have no page to parse"
        )))
    }
}
