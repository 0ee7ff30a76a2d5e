//! Snapshot tests for rendered C#.
//!
//! These tests use insta to capture the exact text of generated files.
//! Run `cargo insta review` to review and accept snapshot changes.

use dtogen::{compile_source, CompileOptions, GeneratedFile};

fn render(schema: &str) -> Vec<GeneratedFile> {
    compile_source(schema, &CompileOptions::new())
        .expect("schema should compile")
        .files
}

fn file<'a>(files: &'a [GeneratedFile], name: &str) -> &'a str {
    &files
        .iter()
        .find(|f| f.file_name == name)
        .unwrap_or_else(|| panic!("{} was not generated", name))
        .contents
}

const MATRIX: &str = r#"{
    "title": "Matrix",
    "type": "object",
    "required": ["rows"],
    "properties": {
        "rows": { "type": "array", "items": { "type": "array", "items": { "type": "integer" } } },
        "label": { "type": "string", "default": "none" }
    }
}"#;

const SHAPES: &str = r#"{
    "type": "object",
    "properties": {
        "point": {
            "type": "object",
            "required": ["x"],
            "properties": {
                "x": { "type": "integer" },
                "y": { "type": ["integer", "null"] }
            }
        },
        "status": { "enum": ["open", "closed"] }
    }
}"#;

#[test]
fn snapshot_nested_array_class() {
    let files = render(MATRIX);
    insta::assert_snapshot!("matrix_class", file(&files, "Matrix.cs"));
}

#[test]
fn snapshot_nested_array_comparer() {
    let files = render(MATRIX);
    insta::assert_snapshot!("matrix_comparer", file(&files, "MatrixEqualityComparer.cs"));
}

#[test]
fn snapshot_comparer_with_inline_class_helpers() {
    let files = render(SHAPES);
    insta::assert_snapshot!("shapes_root_comparer", file(&files, "RootEqualityComparer.cs"));
}

#[test]
fn snapshot_string_enum() {
    let files = render(SHAPES);
    insta::assert_snapshot!("shapes_status_enum", file(&files, "Status.cs"));
}
