//! Definition of command line interface.

use crate::{cli::exit_status::ExitStatus, config::Config};
use getopts::Options;
use std::{path::Path, str::FromStr};

/// Command line arguments.
#[derive(Debug)]
pub(crate) struct Args {
    pub(crate) list_tests: bool,
    pub(crate) filter_pattern: Option<String>,
    pub(crate) filter_exact: bool,
    pub(crate) color: ColorConfig,
    pub(crate) skip_patterns: Vec<String>,
    pub(crate) config: Config,
}

impl Args {
    /// Parse command line arguments.
    pub(crate) fn from_env() -> Result<Self, ExitStatus> {
        let args: Vec<_> = std::env::args().collect();
        let parser = Parser::new(&args[..]);
        match parser.parse() {
            Ok(Some(args)) => Ok(args),
            Ok(None) => {
                parser.print_usage();
                Err(ExitStatus::OK)
            }
            Err(err) => {
                eprintln!("CLI argument error: {:#}", err);
                Err(ExitStatus::FAILED)
            }
        }
    }

    pub(crate) fn is_filtered_out(&self, test_name: &str) -> bool {
        let matches_filter = |pat: &str| {
            if self.filter_exact {
                test_name == pat
            } else {
                test_name.contains(pat)
            }
        };

        if self
            .filter_pattern
            .as_ref()
            .map_or(false, |pat| !matches_filter(pat))
        {
            return true;
        }

        if self.skip_patterns.iter().any(|pat| matches_filter(pat)) {
            return true;
        }

        false
    }
}

/// The color configuration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum ColorConfig {
    Auto,
    Always,
    Never,
}

impl FromStr for ColorConfig {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ColorConfig::Auto),
            "always" => Ok(ColorConfig::Always),
            "never" => Ok(ColorConfig::Never),
            v => Err(anyhow::anyhow!(
                "argument for --color must be auto, always, or never (was {})",
                v
            )),
        }
    }
}

pub(crate) struct Parser<'a> {
    args: &'a [String],
    opts: Options,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(args: &'a [String]) -> Self {
        let mut opts = Options::new();
        opts.optflag("h", "help", "Display this message");
        opts.optflag("", "list", "List all tests");
        opts.optflag(
            "",
            "exact",
            "Exactly match filters rather than by substring",
        );
        opts.optopt(
            "",
            "color",
            "Configure coloring of output:
                auto   = colorize if stdout is a tty (default);
                always = always colorize output;
                never  = never colorize output;",
            "auto|always|never",
        );
        opts.optmulti(
            "",
            "skip",
            "Skip tests whose names contain FILTER (this flag can be used multiple times)",
            "FILTER",
        );
        opts.optopt(
            "",
            "max-sections",
            "Maximum number of sections declared in a single scope (default: 128)",
            "N",
        );
        opts.optopt(
            "",
            "max-assertions",
            "Maximum number of assertions evaluated by a single replay (default: 256)",
            "N",
        );

        // The following options and flags are reserved for keeping the compatibility with
        // the built-in test harness.
        opts.optflag("", "ignored", "");
        opts.optflag("", "test", "");
        opts.optflag("", "bench", "");
        opts.optflag("", "nocapture", "");
        opts.optflag("q", "quiet", "");
        opts.optopt("", "logfile", "", "PATH");
        opts.optopt("", "test-threads", "", "n_threads");
        opts.optopt("", "format", "", "");
        opts.optopt("Z", "", "", "unstable-options");

        Self { args, opts }
    }

    fn print_usage(&self) {
        let binary = self.args.get(0).map_or("test", |s| s.as_str());
        let progname = Path::new(binary)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(binary);

        let message = format!("Usage: {} [OPTIONS] [FILTER]", progname);
        eprintln!(
            r#"{usage}
The FILTER string is tested against the name of all tests, and only those
tests whose names contain the filter are run."#,
            usage = self.opts.usage(&message)
        );
    }

    pub(crate) fn parse(&self) -> anyhow::Result<Option<Args>> {
        let args = &self.args[..];

        let matches = self.opts.parse(args.get(1..).unwrap_or(args))?;
        if matches.opt_present("h") {
            return Ok(None);
        }

        let list_tests = matches.opt_present("list");
        let filter_exact = matches.opt_present("exact");
        let color = matches.opt_get("color")?.unwrap_or(ColorConfig::Auto);
        let skip_patterns = matches.opt_strs("skip");
        let filter_pattern = matches.free.get(0).cloned();

        let mut config = Config::default();
        if let Some(max_sections) = matches.opt_get::<usize>("max-sections")? {
            anyhow::ensure!(max_sections > 0, "--max-sections must be positive");
            config.max_sections = max_sections;
        }
        if let Some(max_assertions) = matches.opt_get::<usize>("max-assertions")? {
            anyhow::ensure!(max_assertions > 0, "--max-assertions must be positive");
            config.max_assertions = max_assertions;
        }

        Ok(Some(Args {
            list_tests,
            filter_pattern,
            filter_exact,
            color,
            skip_patterns,
            config,
        }))
    }
}
