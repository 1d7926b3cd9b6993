//! UI tests for the Reflect derive using trybuild
//!
//! Valid derive usage must compile and run.

#[test]
fn ui_pass_tests() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/pass/*.rs");
}
