use testdrive::{require, section, Context, Test};

fn check_vec(ctx: &mut Context<'_>) -> Result<(), testdrive::Abort> {
    let mut vec = vec![0usize; 5];
    require!(ctx, vec.len() == 5);

    section!(ctx, "resizing bigger changes size and capacity", {
        vec.resize(10, 0);
        require!(ctx, vec.len() == 10);

        section!(ctx, "shrinking smaller does not changes capacity", {
            vec.resize(0, 0);
            require!(ctx, vec.capacity() >= 10);
        });
    });

    Ok(())
}

fn main() {
    let test = Test::new("check_vec", "named function as a test body", check_vec);
    assert!(testdrive::run_test(&test));
}
