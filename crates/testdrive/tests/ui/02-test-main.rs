use testdrive::{require, test_main, Test};

fn addition() -> Test {
    Test::new("addition", "adding numbers", |ctx| {
        require!(ctx, 1 + 1 == 2);
        Ok(())
    })
}

fn empty() -> Test {
    Test::new("empty", "a test without assertions", |_| Ok(()))
}

test_main!(addition, empty);
