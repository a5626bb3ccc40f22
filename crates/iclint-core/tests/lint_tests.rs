//! End-to-end tests for the `lint` entry point: full files in, ordered
//! diagnostics out.

use iclint_core::{lint, ConfigFile};
use rstest::rstest;

fn lint_one(source: &str) -> Vec<iclint_core::Diagnostic> {
    lint(&[ConfigFile::new("test.conf", source)])
}

// ============================================================================
// Clean configurations
// ============================================================================

#[rstest]
#[case::single_line_host("object Host \"h\" { address = \"1.2.3.4\" }\n")]
#[case::multi_line_host("object Host \"web-1\" {\n  import \"generic-host\"\n  address = \"10.0.0.1\"\n}\n")]
#[case::timeperiod("object TimePeriod \"9to5\" {\n  ranges.monday = \"09:00-17:00\"\n}\n")]
#[case::apply_service("apply Service \"ping\" {\n  check_command = \"ping4\"\n  assign where host.address\n}\n")]
#[case::apply_notification_with_target(
    "apply Notification \"mail\" to Host {\n  import \"mail-host-notification\"\n  assign where host.address\n}\n"
)]
#[case::nested_vars(
    "object Host \"h\" {\n  vars.disks[\"disk /\"] = {\n    disk_partitions = \"/\"\n  }\n}\n"
)]
#[case::comments_everywhere("// header\n# alt style\nobject Host \"h\" { /* inline */ address = \"1.2.3.4\" }\n")]
#[case::empty_file("")]
#[case::only_comments("// nothing here\n")]
fn clean_configs_produce_no_diagnostics(#[case] source: &str) {
    let diags = lint_one(source);
    assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
}

// ============================================================================
// Spec scenarios
// ============================================================================

#[test]
fn unmatched_brace_at_line_12_is_reported_there() {
    let mut source = String::new();
    for i in 1..=11 {
        source.push_str(&format!("// filler line {i}\n"));
    }
    source.push_str("object Host \"h\" {\n  address = \"1.2.3.4\"\n");

    let diags = lint_one(&source);
    assert_eq!(diags.len(), 1);
    assert_eq!(
        diags[0].to_string(),
        "test.conf:12: ERROR unclosed bracket '{'"
    );
}

#[test]
fn misspelled_object_type() {
    let diags = lint_one("object Ost \"h\" {}\n");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, "'Ost' is not a valid object type.");
}

#[test]
fn duplicate_timeperiod_across_two_files() {
    let files = [
        ConfigFile::new("conf.d/b.conf", "object TimePeriod \"9to5\" {\n}\n"),
        ConfigFile::new("conf.d/a.conf", "\nobject TimePeriod \"9to5\" {\n}\n"),
    ];
    let diags = lint(&files);
    assert_eq!(diags.len(), 1);
    assert_eq!(
        diags[0].to_string(),
        "conf.d/b.conf:1: ERROR Duplicate TimePeriod name '\"9to5\"' (previously defined at conf.d/a.conf:2)"
    );
}

#[test]
fn distinct_timeperiod_names_do_not_collide() {
    let files = [
        ConfigFile::new("a.conf", "object TimePeriod \"9to5\" {\n}\n"),
        ConfigFile::new("b.conf", "object TimePeriod \"24x7\" {\n}\n"),
    ];
    assert!(lint(&files).is_empty());
}

#[rstest]
#[case::dependency("Dependency")]
#[case::notification("Notification")]
fn apply_without_target_clause_is_reported_once(#[case] ty: &str) {
    let source = format!("apply {ty} \"x\" {{\n  assign where host.address\n}}\n");
    let diags = lint_one(&source);
    assert_eq!(diags.len(), 1);
    assert_eq!(
        diags[0].message,
        format!("'apply {ty} \"x\"' must be followed by 'to Service' or 'to Host'")
    );
}

#[rstest]
#[case::to_host("to Host")]
#[case::to_service("to Service")]
fn adding_a_target_clause_eliminates_the_diagnostic(#[case] clause: &str) {
    let source = format!("apply Dependency \"x\" {clause} {{\n  assign where host.address\n}}\n");
    assert!(lint_one(&source).is_empty());
}

// ============================================================================
// Recovery and isolation
// ============================================================================

#[test]
fn many_local_errors_are_all_reported() {
    let source = concat!(
        "object Ost \"a\" {}\n",
        "object Host \"b\" {\n",
        "  address \"1.2.3.4\"\n",
        "  check_command = \"hostalive\"\n",
        "  import\n",
        "}\n",
    );
    let diags = lint_one(source);
    let messages: Vec<&str> = diags.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "'Ost' is not a valid object type.",
            "invalid attribute syntax: '\"1.2.3.4\"'",
            "invalid attribute syntax: 'import'",
        ]
    );
}

#[test]
fn truncated_file_still_reports_earlier_findings() {
    let source = concat!(
        "object Ost \"a\" {}\n",
        "object Host \"b\" {\n",
        "  notes = {{{\n",
    );
    let diags = lint_one(source);
    assert_eq!(diags.len(), 2);
    assert_eq!(diags[0].message, "'Ost' is not a valid object type.");
    assert_eq!(diags[1].line, 3);
    assert_eq!(diags[1].message, "unbalanced quotes in multiline structure");
}

#[test]
fn rendered_output_is_stable() {
    let files = [
        ConfigFile::new(
            "a.conf",
            concat!(
                "object Host \"web\" {\n",
                "  address = \"10.0.0.1\"\n",
                "  check_command \"hostalive\"\n",
                "}\n",
                "object TimePeriod \"9to5\" {\n",
                "}\n",
            ),
        ),
        ConfigFile::new(
            "b.conf",
            concat!(
                "apply Dependency \"link\" {\n",
                "  parent_host_name = \"gw\"\n",
                "}\n",
                "object TimePeriod \"9to5\" {\n",
                "}\n",
            ),
        ),
    ];
    let rendered = lint(&files)
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    insta::assert_snapshot!(rendered, @r#"
    a.conf:3: ERROR invalid attribute syntax: '"hostalive"'
    b.conf:1: ERROR 'apply Dependency "link"' must be followed by 'to Service' or 'to Host'
    b.conf:4: ERROR Duplicate TimePeriod name '"9to5"' (previously defined at a.conf:5)
    "#);
}

#[test]
fn lint_is_idempotent_on_a_fixed_tree() {
    let files = [
        ConfigFile::new("a.conf", "object Host \"h\" {\n  address \"x\"\n"),
        ConfigFile::new("b.conf", "apply Notification \"n\" {}\n"),
    ];
    assert_eq!(lint(&files), lint(&files));
}
