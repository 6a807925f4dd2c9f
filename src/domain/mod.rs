//! Ranked domain list loading.
//!
//! Reads Majestic Million style CSV (`GlobalRank,TldRank,Domain,TLD,...`),
//! validates domain names, deduplicates by name and truncates to a limit.
//!
//! Key functions:
//! - `DomainLoader::load_rows()` - the validation/dedup pipeline over raw rows
//! - `DomainLoader::load_from_path()` - open a CSV file and load from it
//! - `DomainLoader::load_sampled_from_path()` - uniform random sample of a file

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use rand::seq::index;
use regex::Regex;

use crate::error_handling::LoadError;
use crate::models::DomainEntry;

const RANK_COLUMN: usize = 0;
const DOMAIN_COLUMN: usize = 2;
const TLD_COLUMN: usize = 3;
const MIN_FIELDS: usize = 4;

static DOMAIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,}$")
        .unwrap_or_else(|e| panic!("domain pattern is a valid regex: {e}"))
});

/// Returns true if `name` follows the DNS label grammar.
///
/// One or more dot-separated labels of 1-63 alphanumeric or hyphen characters
/// (no leading or trailing hyphen), ending in an alphabetic label of at least
/// two characters.
pub fn is_valid_domain(name: &str) -> bool {
    DOMAIN_PATTERN.is_match(name)
}

/// Loads ranked domain lists into `DomainEntry` batches.
pub struct DomainLoader;

impl DomainLoader {
    /// Runs the loading pipeline over raw rows.
    ///
    /// Rows with fewer than four fields or a non-integer rank are skipped and
    /// logged. Invalid domain names are dropped silently. At most `limit` valid
    /// rows are read (counted before dedup); the first occurrence of a name wins.
    pub fn load_rows<I, R>(rows: I, limit: Option<usize>) -> Vec<DomainEntry>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[String]>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        let mut valid_rows = 0usize;

        for (line, row) in rows.into_iter().enumerate() {
            if limit.is_some_and(|max| valid_rows >= max) {
                break;
            }

            let Some(entry) = parse_row(row.as_ref(), line) else {
                continue;
            };
            valid_rows += 1;

            if seen.insert(entry.name.clone()) {
                entries.push(entry);
            } else {
                log::debug!("Skipping duplicate domain {}", entry.name);
            }
        }

        entries
    }

    /// Loads from a CSV reader. The first record is treated as a header.
    pub fn load_csv<R: Read>(reader: R, limit: Option<usize>) -> Vec<DomainEntry> {
        Self::load_rows(read_records(reader), limit)
    }

    /// Opens `path` and loads it.
    ///
    /// # Errors
    ///
    /// `LoadError::NotFound` if the file does not exist, `LoadError::Io` if it
    /// cannot be opened.
    pub fn load_from_path(path: &Path, limit: Option<usize>) -> Result<Vec<DomainEntry>, LoadError> {
        let file = open(path)?;
        let entries = Self::load_csv(file, limit);
        log::info!(
            "Loaded {} unique domains from {}",
            entries.len(),
            path.display()
        );
        Ok(entries)
    }

    /// Picks `sample_size` data rows uniformly at random and loads them.
    ///
    /// Selected rows keep their file order and then go through the same
    /// validation and dedup as `load_rows`, so the result may be shorter than
    /// `sample_size` when sampled rows are invalid or duplicated.
    pub fn load_sampled_from_path(
        path: &Path,
        sample_size: usize,
    ) -> Result<Vec<DomainEntry>, LoadError> {
        let file = open(path)?;
        let rows = read_records(file);
        let sampled = sample_rows(rows, sample_size, &mut rand::rng());
        let entries = Self::load_rows(sampled, None);
        log::info!(
            "Sampled {} unique domains from {}",
            entries.len(),
            path.display()
        );
        Ok(entries)
    }
}

fn open(path: &Path) -> Result<File, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads data records as trimmed strings. Undecodable records are logged and
/// skipped.
fn read_records<R: Read>(reader: R) -> Vec<Vec<String>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        match result {
            Ok(record) => rows.push(record.iter().map(str::to_string).collect()),
            Err(e) => log::warn!("Skipping unreadable CSV row: {}", e),
        }
    }
    rows
}

fn sample_rows<R: rand::Rng + ?Sized>(
    rows: Vec<Vec<String>>,
    sample_size: usize,
    rng: &mut R,
) -> Vec<Vec<String>> {
    if sample_size >= rows.len() {
        return rows;
    }
    let mut picked = index::sample(rng, rows.len(), sample_size).into_vec();
    picked.sort_unstable();

    let mut rows: Vec<Option<Vec<String>>> = rows.into_iter().map(Some).collect();
    picked
        .into_iter()
        .filter_map(|i| rows[i].take())
        .collect()
}

fn parse_row(row: &[String], line: usize) -> Option<DomainEntry> {
    if row.len() < MIN_FIELDS {
        log::debug!("Skipping row {}: expected at least {} fields", line + 1, MIN_FIELDS);
        return None;
    }

    let rank = match row[RANK_COLUMN].trim().parse::<u64>() {
        Ok(rank) => rank,
        Err(_) => {
            log::warn!(
                "Skipping row {}: invalid rank '{}'",
                line + 1,
                row[RANK_COLUMN]
            );
            return None;
        }
    };

    let name = row[DOMAIN_COLUMN].trim();
    if !is_valid_domain(name) {
        return None;
    }

    Some(DomainEntry::new(rank, name, row[TLD_COLUMN].trim()))
}
