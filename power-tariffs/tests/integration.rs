mod common;

#[test]
fn test_json_cases() {
    let mut should_panic = false;

    for case in common::collect_json_cases().unwrap() {
        eprint!("testing case {:?}: ", case.path);

        let result = std::panic::catch_unwind(|| {
            common::validate_case(&case).unwrap();
        });

        if result.is_err() {
            should_panic = true;
        } else {
            eprintln!("success");
        }
    }

    if should_panic {
        panic!("not all json cases succeeded")
    }
}
