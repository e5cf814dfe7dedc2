use crate::error::Error;
use crate::tree::css_tree::{NodeId, Stylesheet};
use crate::usage::{files, report, tokens};
use log::{debug, info};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::str::FromStr;

/// Pseudo-class keywords that are CSS syntax, never project identifiers.
pub const DEFAULT_TOKENS: &[&str] = &[
    "after",
    "before",
    "hover",
    "focus",
    "active",
    "link",
    "visited",
    "lang",
    "first-child",
    "nth-child",
    "nth-last-child",
    "nth-of-type",
    "nth-last-of-type",
    "last-child",
    "first-of-type",
    "last-of-type",
    "only-child",
    "only-of-type",
    "root",
    "empty",
    "target",
    "enabled",
    "disabled",
    "checked",
    "not",
];

pub const DEFAULT_EXTENSIONS: &[&str] =
    &["php", "twig", "tpl", "htm", "html", "js", "rb", "py", "djt"];

/// Which words of a project file count as used identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanStrategy {
    /// Every word in the file.
    #[default]
    Safe,
    /// Words inside string literals and HTML tag names only.
    BestEffort,
}

impl FromStr for ScanStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "safe" => Ok(ScanStrategy::Safe),
            "best" | "best-effort" => Ok(ScanStrategy::BestEffort),
            _ => Err(Error::InvalidScanStrategy(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CleanerOptions {
    pub project_paths: Vec<PathBuf>,
    pub extensions: Vec<String>,
    pub strategy: ScanStrategy,
    /// Where to write the usage report, if anywhere.
    pub report: Option<PathBuf>,
}

impl Default for CleanerOptions {
    fn default() -> Self {
        CleanerOptions {
            project_paths: Vec::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            strategy: ScanStrategy::default(),
            report: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanSummary {
    pub files_scanned: usize,
    /// Distinct tokens known, the pseudo-class keywords included.
    pub tokens_found: usize,
    pub removed_selectors: Vec<String>,
    /// Reference count per surviving selector, ordered by count.
    pub usage: Vec<(String, usize)>,
}

/// Removes selectors whose identifiers appear nowhere in the project sources.
pub struct Cleaner {
    options: CleanerOptions,
}

impl Cleaner {
    pub fn new(options: CleanerOptions) -> Self {
        Cleaner { options }
    }

    pub fn options(&self) -> &CleanerOptions {
        &self.options
    }

    pub fn clean(&self, sheet: &mut Stylesheet) -> Result<CleanSummary, Error> {
        let paths = files::collect(&self.options.project_paths, &self.options.extensions);
        info!("Found {} input files", paths.len());
        let (table, files_scanned) = self.scan(&paths);
        info!("Found {} tokens", table.len());

        let mut summary = CleanSummary {
            files_scanned,
            tokens_found: table.len(),
            ..Default::default()
        };
        let mut usage: BTreeMap<String, usize> = BTreeMap::new();

        let root = sheet.root();
        for group in sheet.groups(root) {
            if !sheet.is_attached(group) || is_special(sheet, group) {
                continue;
            }

            let mut kept = Vec::new();
            for part in sheet.selectors(group) {
                let stripped = strip_pseudo(&part);
                let words: Vec<&str> = tokens::words(stripped).collect();
                if words.iter().all(|w| table.contains_key(*w)) {
                    let count: usize = words.iter().map(|w| table[*w]).sum();
                    *usage.entry(stripped.trim().to_string()).or_default() += count;
                    kept.push(part);
                } else {
                    debug!("Removed {}", part);
                    summary.removed_selectors.push(part);
                }
            }

            if kept.is_empty() {
                sheet.remove(group);
            } else {
                sheet.set_selectors(group, &kept);
            }
        }
        info!(
            "Clean done, removed {} unused selectors",
            summary.removed_selectors.len()
        );

        summary.usage = usage.into_iter().collect();
        report::sort_usage(&mut summary.usage);
        if let Some(path) = &self.options.report {
            report::write_report(path, &summary.usage)?;
        }
        Ok(summary)
    }

    /// Token frequencies and the number of files actually read.
    fn scan(&self, paths: &[PathBuf]) -> (HashMap<String, usize>, usize) {
        let mut table: HashMap<String, usize> =
            DEFAULT_TOKENS.iter().map(|t| (t.to_string(), 0)).collect();
        let mut scanned = 0;
        for path in paths {
            let Some(content) = files::read(path) else {
                continue;
            };
            scanned += 1;
            let found: Vec<String> = match self.options.strategy {
                ScanStrategy::Safe => tokens::words(&content).map(str::to_string).collect(),
                ScanStrategy::BestEffort => tokens::best_effort(&content),
            };
            for token in found {
                *table.entry(token).or_default() += 1;
            }
        }
        (table, scanned)
    }
}

/// At-rules and the frames inside keyframes blocks are never cleaned.
fn is_special(sheet: &Stylesheet, group: NodeId) -> bool {
    let Some(selector) = sheet.selector(group) else {
        return true;
    };
    selector.trim_start().starts_with('@')
        || sheet.ancestors(group).into_iter().any(|a| {
            sheet
                .selector(a)
                .is_some_and(|s| s.starts_with('@') && s.to_ascii_lowercase().contains("keyframes"))
        })
}

fn strip_pseudo(part: &str) -> &str {
    part.split(':').next().unwrap_or(part)
}
