//! Command line front end of test binaries.

mod args;
mod exit_status;

pub use self::exit_status::ExitStatus;

use self::args::{Args, ColorConfig};
use crate::{reporter::ConsoleReporter, session::Session, test::Test};
use std::{
    collections::HashSet,
    io::{self, Write},
    sync::Once,
};
use termcolor::ColorChoice;

/// Run the given tests according to the command line arguments.
///
/// This is the entry point of the `main` function generated by
/// [`test_main!`](crate::test_main). Tests are run in name order after
/// applying the filters given on the command line.
pub fn run_tests(tests: &[Test]) -> ExitStatus {
    let args = match Args::from_env() {
        Ok(args) => args,
        Err(status) => return status,
    };

    let (selected, filtered_out) = match select_tests(&args, tests) {
        Ok(selected) => selected,
        Err(err) => {
            eprintln!("registry error: {}", err);
            return ExitStatus::FAILED;
        }
    };

    if args.list_tests {
        let stdout = io::stdout();
        let _ = print_list(&mut stdout.lock(), &selected);
        return ExitStatus::OK;
    }

    let color = match args.color {
        ColorConfig::Auto => ColorChoice::Auto,
        ColorConfig::Always => ColorChoice::Always,
        ColorConfig::Never => ColorChoice::Never,
    };
    static SET_HOOK: Once = Once::new();
    SET_HOOK.call_once(|| {
        maybe_unwind::set_hook();
    });

    let mut session = Session::with_reporter(ConsoleReporter::stdout(color));
    session.set_config(args.config.clone());
    session.set_filtered_out(filtered_out);
    session.run(&selected).status()
}

/// Apply the name filters, returning the tests to run sorted by name and
/// the number of tests filtered out.
fn select_tests<'t>(args: &Args, tests: &'t [Test]) -> anyhow::Result<(Vec<&'t Test>, usize)> {
    let mut selected = vec![];
    let mut filtered_out = 0;
    let mut unique_test_names = HashSet::new();
    for test in tests {
        anyhow::ensure!(
            unique_test_names.insert(test.name()),
            "the test name '{}' is conflicted",
            test.name()
        );

        if args.is_filtered_out(test.name()) {
            filtered_out += 1;
        } else {
            selected.push(test);
        }
    }

    // sort test cases by name.
    selected.sort_by(|t1, t2| t1.name().cmp(t2.name()));

    Ok((selected, filtered_out))
}

fn print_list<W: ?Sized>(w: &mut W, tests: &[&Test]) -> io::Result<()>
where
    W: Write,
{
    for test in tests {
        writeln!(w, "{}: test", test.name())?;
    }

    let suffix = match tests.len() {
        1 => "",
        _ => "s",
    };
    if !tests.is_empty() {
        writeln!(w)?;
    }
    writeln!(w, "{} test{}", tests.len(), suffix)?;
    w.flush()
}
