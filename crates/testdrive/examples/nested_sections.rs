//! Runs a test whose sections are visited over four replays, one of them
//! reporting a failed assertion. The process exits successfully whatever
//! the outcome.

use testdrive::{require, section, Test};

#[allow(unreachable_code)]
fn nested_sections() -> Test {
    Test::new(
        "nested_sections",
        "Nested sections are visited in order",
        |ctx| {
            require!(ctx, true);

            let foo = true;
            let bar = false;

            section!(ctx, "Top level section A", {
                require!(ctx, foo);
            });

            section!(ctx, "Top level section B", {
                require!(ctx, !bar);
                let baz = true;

                section!(ctx, "Nested section B.A", {
                    section!(ctx, "Nested section B.A.A", {
                        require!(ctx, true);
                    });

                    loop {
                        require!(ctx, true);
                        require!(ctx, bar);
                    }

                    section!(ctx, "Nested section B.A.B", {
                        panic!("should never be tested");
                    });
                });

                section!(ctx, "Nested section B.B", {
                    require!(ctx, baz);
                });
            });

            section!(ctx, "Top level section C", {
                require!(ctx, foo != bar);
            });

            Ok(())
        },
    )
}

fn main() {
    testdrive::run_test(&nested_sections());
}
