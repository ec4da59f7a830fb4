use super::{Reporter, SectionInfo};
use crate::{
    assertion::AssertionOutcome,
    report::{Summary, TestSummary},
    test::{Test, TestDesc},
};
use std::{
    fmt,
    io::{self, Write},
    mem,
};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

const GUIDE: &str = "|  ";

struct Colored<T> {
    val: T,
    spec: Option<ColorSpec>,
}

impl<T> Colored<T> {
    fn fg(mut self, color: Color) -> Self {
        self.spec
            .get_or_insert_with(ColorSpec::new)
            .set_fg(Some(color));
        self
    }

    fn fmt_colored<W: ?Sized>(&self, w: &mut W) -> io::Result<()>
    where
        T: fmt::Display,
        W: WriteColor,
    {
        if let Some(ref spec) = self.spec {
            w.set_color(spec)?;
        }
        write!(w, "{}", &self.val)?;
        if let Some(..) = self.spec {
            w.reset()?;
        }
        Ok(())
    }
}

fn colored<T>(val: T) -> Colored<T> {
    Colored { val, spec: None }
}

fn indent<W: ?Sized>(w: &mut W, depth: usize) -> io::Result<()>
where
    W: Write,
{
    for _ in 0..depth {
        w.write_all(GUIDE.as_bytes())?;
    }
    Ok(())
}

/// Assertion counts of a section entered by at least one replay.
#[derive(Debug, Default)]
struct ResultNode {
    index: usize,
    successful: usize,
    total: usize,
    children: Vec<ResultNode>,
    finalized: bool,
}

/// Results of the running test, mirroring the sections entered so far.
#[derive(Debug, Default)]
struct ResultTree {
    root: ResultNode,
    path: Vec<usize>,
}

impl ResultTree {
    fn depth(&self) -> usize {
        self.path.len()
    }

    fn current(&mut self) -> &mut ResultNode {
        let mut node = &mut self.root;
        for &pos in &self.path {
            node = &mut node.children[pos];
        }
        node
    }

    fn enter(&mut self, index: usize) {
        let node = self.current();
        let pos = match node.children.iter().position(|child| child.index == index) {
            Some(pos) => pos,
            None => {
                node.children.push(ResultNode {
                    index,
                    ..ResultNode::default()
                });
                node.children.len() - 1
            }
        };
        debug_assert!(!node.children[pos].finalized);
        self.path.push(pos);
    }

    /// Leave the current node, folding its counts into the parent and
    /// returning them if the section will not be entered again.
    fn exit(&mut self, completed: bool) -> Option<(usize, usize)> {
        let pos = self.path.pop()?;
        if !completed {
            return None;
        }

        let parent = self.current();
        let child = &mut parent.children[pos];
        child.finalized = true;
        child.children.clear();
        let counts = (child.successful, child.total);

        parent.successful += counts.0;
        parent.total += counts.1;
        Some(counts)
    }

    fn record(&mut self, passed: bool) {
        let node = self.current();
        node.total += 1;
        if passed {
            node.successful += 1;
        }
    }

    fn finish(&mut self) -> (usize, usize) {
        let root = mem::take(&mut self.root);
        self.path.clear();
        (root.successful, root.total)
    }
}

/// A reporter printing a tree of sections with their assertion counts.
///
/// ```text
/// Running test: "<test description>"
/// |  Running section: "<section description>"
/// |  |  Failed assertion: <condition> (<file>:<line>)
/// |  +- 0/1 assertions succeeded.
/// +- 0/1 assertions succeeded.
/// ```
pub struct ConsoleReporter<W = StandardStream> {
    writer: W,
    results: ResultTree,
}

impl ConsoleReporter {
    /// Create a reporter writing to the standard output.
    pub fn stdout(color: ColorChoice) -> Self {
        Self::new(StandardStream::stdout(color))
    }
}

impl<W> ConsoleReporter<W>
where
    W: WriteColor,
{
    /// Create a reporter writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            results: ResultTree::default(),
        }
    }

    /// Return a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Consume the reporter, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn print_test_header(&mut self, desc: &TestDesc) -> io::Result<()> {
        writeln!(self.writer, "Running test: \"{}\"", desc.description())
    }

    fn print_section_header(&mut self, section: &SectionInfo<'_>) -> io::Result<()> {
        let w = &mut self.writer;
        indent(w, section.depth)?;
        writeln!(w, "Running section: \"{}\"", section.description)
    }

    fn print_counts(&mut self, depth: usize, (successful, total): (usize, usize)) -> io::Result<()> {
        let w = &mut self.writer;
        indent(w, depth)?;
        write!(w, "+- ")?;
        let counts = colored(format!("{}/{}", successful, total));
        if successful == total {
            counts.fg(Color::Green).fmt_colored(w)?;
        } else {
            counts.fg(Color::Red).fmt_colored(w)?;
        }
        writeln!(w, " assertions succeeded.")
    }

    fn print_failure(&mut self, assertion: &AssertionOutcome<'_>) -> io::Result<()> {
        let depth = self.results.depth() + 1;
        let w = &mut self.writer;
        indent(w, depth)?;
        colored("Failed assertion:").fg(Color::Red).fmt_colored(w)?;
        writeln!(
            w,
            " {} ({}:{})",
            assertion.expr, assertion.location.file, assertion.location.line
        )
    }

    fn print_error(&mut self, error: &anyhow::Error) -> io::Result<()> {
        let depth = self.results.depth() + 1;
        let w = &mut self.writer;
        indent(w, depth)?;
        colored("Error raised:").fg(Color::Red).fmt_colored(w)?;
        writeln!(w, " {:#}", error)
    }

    fn print_summary(&mut self, summary: &Summary) -> io::Result<()> {
        let w = &mut self.writer;

        if !summary.failed().is_empty() {
            writeln!(w)?;
            writeln!(w, "failures:")?;
            for result in summary.failed() {
                writeln!(w, "    {}", result.desc().name())?;
            }
        }

        let status = if summary.is_passed() {
            colored("ok").fg(Color::Green)
        } else {
            colored("FAILED").fg(Color::Red)
        };
        writeln!(w)?;
        write!(w, "test result: ")?;
        status.fmt_colored(w)?;
        write!(w, ".")?;
        writeln!(
            w,
            " {passed} passed; {failed} failed; {filtered_out} filtered out",
            passed = summary.passed().len(),
            failed = summary.failed().len(),
            filtered_out = summary.filtered_out(),
        )?;
        w.flush()
    }
}

impl<W> Reporter for ConsoleReporter<W>
where
    W: WriteColor,
{
    fn run_starting(&mut self, tests: &[&Test]) {
        let suffix = match tests.len() {
            1 => "",
            _ => "s",
        };
        let _ = writeln!(self.writer, "running {} test{}", tests.len(), suffix);
    }

    fn run_ended(&mut self, summary: &Summary) {
        let _ = self.print_summary(summary);
    }

    fn test_starting(&mut self, desc: &TestDesc) {
        self.results = ResultTree::default();
        let _ = self.print_test_header(desc);
    }

    fn section_entered(&mut self, section: &SectionInfo<'_>) {
        self.results.enter(section.index);
        if section.first_entry {
            let _ = self.print_section_header(section);
        }
    }

    fn section_skipped(&mut self, _: &SectionInfo<'_>) {}

    fn section_exited(&mut self, section: &SectionInfo<'_>, completed: bool) {
        if let Some(counts) = self.results.exit(completed) {
            let _ = self.print_counts(section.depth, counts);
        }
    }

    fn assertion_attempted(&mut self, _: &AssertionOutcome<'_>) {}

    fn assertion_passed(&mut self, assertion: &AssertionOutcome<'_>) {
        if !assertion.recount {
            self.results.record(true);
        }
    }

    fn assertion_failed(&mut self, assertion: &AssertionOutcome<'_>) {
        if !assertion.recount {
            self.results.record(false);
            let _ = self.print_failure(assertion);
        }
    }

    fn error_raised(&mut self, error: &anyhow::Error) {
        self.results.record(false);
        let _ = self.print_error(error);
    }

    fn test_ended(&mut self, _: &TestSummary) {
        let counts = self.results.finish();
        let _ = self.print_counts(0, counts);
        let _ = self.writer.flush();
    }
}
