// src/file.rs

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{NaiveDate, NaiveTime};

use crate::config::consts::PORTAL_DATE_FMT;
use crate::core::error::{DidelError, Result};

/// Parse a portal-formatted date ("02.10.2014") into a timestamp at
/// midnight, UTC, of that day.
pub fn portal_date(date: &str) -> Result<SystemTime> {
    let day = NaiveDate::parse_from_str(date.trim(), PORTAL_DATE_FMT)
        .map_err(|e| DidelError::Scrape(format!("bad portal date {date:?}: {e}")))?;
    let secs = day.and_time(NaiveTime::MIN).and_utc().timestamp();
    Ok(UNIX_EPOCH + Duration::from_secs(secs.max(0) as u64))
}

pub fn file_mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).ok().and_then(|m| m.modified().ok())
}

/// A local copy is fresh when it exists and is at least as new as the
/// portal-reported date. Missing or strictly older means download.
pub fn is_local_fresh(path: &Path, portal: SystemTime) -> bool {
    match file_mtime(path) {
        Some(local) => local >= portal,
        None => false,
    }
}

pub fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(std::io::Error::other(format!(
            "path exists but is not a directory: {}",
            dir.display()
        ))
        .into());
    }
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}
