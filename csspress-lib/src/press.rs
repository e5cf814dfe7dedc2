use crate::error::Error;
use crate::parser::css;
use crate::style::optimizer::{Optimizer, OptimizerOptions};
use crate::usage::cleaner::{CleanSummary, Cleaner, CleanerOptions};
use log::debug;

pub mod css_press {
    use super::*;

    #[derive(Debug, Clone, Default)]
    pub struct PressOptions {
        pub optimizer: OptimizerOptions,
        /// Remove unused selectors before optimizing.
        pub cleaner: Option<CleanerOptions>,
    }

    #[derive(Debug, Clone)]
    pub struct Pressed {
        pub css: String,
        /// Present when the cleaner ran.
        pub clean: Option<CleanSummary>,
    }

    /// Parse, clean, optimize and prefix, then render.
    pub fn generate(css: &str, options: &PressOptions) -> Result<Pressed, Error> {
        let mut sheet = css::parse(css);
        debug!("Parsed {} nodes", sheet.find_all(sheet.root()).len());

        let clean = match &options.cleaner {
            Some(cleaner) => Some(Cleaner::new(cleaner.clone()).clean(&mut sheet)?),
            None => None,
        };

        Optimizer::new(options.optimizer.clone()).process_tree(&mut sheet)?;

        Ok(Pressed {
            css: sheet.to_css(options.optimizer.compress),
            clean,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::css_press::*;
    use super::*;
    use crate::usage::cleaner::ScanStrategy;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_generate_defaults() {
        let pressed =
            generate("a { color: #FFFFFF; transition: all 1s }", &PressOptions::default()).unwrap();

        assert_eq!(
            pressed.css,
            "a{color:#fff;transition:all 1s;-o-transition:all 1s;-webkit-transition:all 1s;-moz-transition:all 1s}"
        );
        assert!(pressed.clean.is_none());
    }

    #[test]
    fn test_generate_cleans_before_optimizing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page.html"), "<b class='keep'>").unwrap();
        let options = PressOptions {
            optimizer: OptimizerOptions {
                prefixes: String::new(),
                ..Default::default()
            },
            cleaner: Some(CleanerOptions {
                project_paths: vec![dir.path().to_path_buf()],
                strategy: ScanStrategy::BestEffort,
                ..Default::default()
            }),
        };

        let pressed = generate(".keep{color:white}.drop{color:red}", &options).unwrap();

        assert_eq!(pressed.css, ".keep{color:#fff}");
        assert_eq!(pressed.clean.unwrap().removed_selectors, vec![".drop"]);
    }
}
