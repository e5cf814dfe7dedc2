//! Usage report listing how often each surviving selector is referenced.

use crate::error::Error;
use chrono::{DateTime, SecondsFormat, Utc};
use log::info;
use std::fs;
use std::path::Path;

/// Orders usage entries by count, then by selector text.
pub fn sort_usage(usage: &mut [(String, usize)]) {
    usage.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
}

pub fn render_report(usage: &[(String, usize)], generated: DateTime<Utc>) -> String {
    let mut sorted = usage.to_vec();
    sort_usage(&mut sorted);

    let mut report = format!(
        "Usage report generated {}\n\n",
        generated.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    for (selector, count) in sorted {
        report.push_str(&format!("{} found {} references\n", selector, count));
    }
    report
}

pub fn write_report(path: &Path, usage: &[(String, usize)]) -> Result<(), Error> {
    fs::write(path, render_report(usage, Utc::now())).map_err(|source| Error::Report {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Usage report written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_report() {
        let generated = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let usage = vec![
            (".menu".to_string(), 4),
            (".b".to_string(), 1),
            (".a".to_string(), 1),
        ];

        assert_eq!(
            render_report(&usage, generated),
            "Usage report generated 2024-05-01T12:30:00Z\n\n\
             .a found 1 references\n\
             .b found 1 references\n\
             .menu found 4 references\n"
        );
    }

    #[test]
    fn test_write_report_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.txt");

        let err = write_report(&path, &[]).unwrap_err();

        assert!(matches!(err, Error::Report { .. }));
        assert!(err.to_string().contains("report.txt"));
    }
}
