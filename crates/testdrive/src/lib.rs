/*!
A unit testing library with nested test sections, inspired by the section
mechanism of [`Catch2`](https://github.com/catchorg/Catch2).

A test body may declare sections, which may declare further sections.
Instead of running every section in one pass, the body is replayed from
the beginning once per leaf section, entering exactly one path of the
section tree each time. The code around the sections acts as setup and
teardown shared by the sections beneath it.

```
use testdrive::{require, section, Test};

let test = Test::new("vec_resize", "resizing a vector", |ctx| {
    let mut vec = vec![0usize; 5];
    require!(ctx, vec.len() == 5);

    section!(ctx, "resizing bigger changes size", {
        vec.resize(10, 0);
        require!(ctx, vec.len() == 10);
    });

    section!(ctx, "resizing smaller changes size", {
        vec.resize(0, 0);
        require!(ctx, vec.is_empty());
    });

    Ok(())
});

// the body runs twice, once for each section.
assert!(testdrive::run_test(&test));
```
!*/

#![doc(html_root_url = "https://docs.rs/testdrive/0.1.0-dev")]
#![deny(missing_docs)]
#![forbid(clippy::unimplemented, clippy::todo)]

#[macro_use]
mod macros;
mod assertion;
mod cli;
mod config;
mod context;
mod report;
pub mod reporter;
mod scheduler;
mod section;
mod session;

pub use crate::{
    assertion::{Abort, AssertionOutcome},
    cli::{run_tests, ExitStatus},
    config::Config,
    context::Context,
    report::{Summary, TestSummary},
    session::{run_test, Session},
    test::{Location, Test, TestDesc},
};

hidden_item! {
    /// Re-exported items for the declarative macros.
    pub mod _macro_reexports {
        pub use crate::{cli::run_tests, test::Location};
        pub use std::{column, file, format_args, line, result::Result::Ok, stringify};
    }
}
