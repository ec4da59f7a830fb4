macro_rules! hidden_item {
    ( $( $item:item )* ) => {
        $(
            #[doc(hidden)]
            $item
        )*
    };
}

/// Return the [`Location`](crate::Location) of the macro call site.
#[macro_export]
macro_rules! location {
    () => {{
        use $crate::_macro_reexports as __td;
        __td::Location {
            file: __td::file!(),
            line: __td::line!(),
            column: __td::column!(),
        }
    }};
}

/// Assert that a condition holds.
///
/// On failure the enclosing section or test body stops, and the code
/// following the enclosing section keeps running.
///
/// ```
/// # use testdrive::{require, Test};
/// let test = Test::new("arith", "arithmetic", |ctx| {
///     require!(ctx, 1 + 1 == 2);
///     Ok(())
/// });
/// assert!(testdrive::run_test(&test));
/// ```
#[macro_export]
macro_rules! require {
    ($ctx:ident, $cond:expr $(,)?) => {
        $ctx.require(
            $cond,
            $crate::_macro_reexports::stringify!($cond),
            $crate::location!(),
        )?
    };
}

/// Assert that a condition does *not* hold, then stop the enclosing section
/// or test body whatever the outcome.
#[macro_export]
macro_rules! require_fail {
    ($ctx:ident, $cond:expr $(,)?) => {
        $ctx.require_fail(
            $cond,
            $crate::_macro_reexports::stringify!($cond),
            $crate::location!(),
        )?
    };
}

/// Mark the current test as failed and then stop the enclosing section or
/// test body.
#[macro_export]
macro_rules! fail {
    ($ctx:ident) => {
        $crate::fail!($ctx, "explicitly failed")
    };
    ($ctx:ident, $($arg:tt)+) => {{
        use $crate::_macro_reexports as __td;
        return $ctx.fail(__td::format_args!($($arg)+), $crate::location!());
    }};
}

/// Declare a section.
///
/// The block is run with `$ctx` rebound to the context of the section.
/// Assertion macros used inside of it stop the section only.
///
/// ```
/// # use testdrive::{require, section, Test};
/// let test = Test::new("vec", "vectors", |ctx| {
///     let mut vec = vec![1, 2, 3];
///
///     section!(ctx, "push", {
///         vec.push(4);
///         require!(ctx, vec.len() == 4);
///     });
///
///     section!(ctx, "pop", {
///         vec.pop();
///         require!(ctx, vec.len() == 2);
///     });
///
///     Ok(())
/// });
/// assert!(testdrive::run_test(&test));
/// ```
#[macro_export]
macro_rules! section {
    ($ctx:ident, $desc:expr, $block:block) => {{
        #[allow(unreachable_code)]
        $ctx.section($desc, |$ctx| {
            $block;
            $crate::_macro_reexports::Ok(())
        });
    }};
}

/// Define the `main` function of a test binary built with `harness = false`.
///
/// Each argument is the path of a function returning a [`Test`](crate::Test).
///
/// ```no_run
/// use testdrive::{require, test_main, Test};
///
/// fn addition() -> Test {
///     Test::new("addition", "adding numbers", |ctx| {
///         require!(ctx, 1 + 1 == 2);
///         Ok(())
///     })
/// }
///
/// test_main!(addition);
/// ```
#[macro_export]
macro_rules! test_main {
    ($($test:path),* $(,)?) => {
        fn main() {
            $crate::_macro_reexports::run_tests(&[$($test()),*]).exit();
        }
    };
}
