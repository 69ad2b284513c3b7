//! Diesel.

use dblineage_core::types::Language;

use super::*;

pub(super) static DESCRIPTORS: &[DescriptorDef] = &[DescriptorDef {
    name: "Diesel",
    language: Language::Rust,
    file_indicators: &[
        r"use\s+diesel",
        r"diesel::table!",
        r"diesel::prelude",
        r"#\[derive\(.*Queryable",
    ],
    usage: &[
        usage(r"^\s*\w+\s*->\s*\w+", DEFINITION, "Diesel table! column"),
        usage(r"diesel::insert_into|\.values\s*\(", WRITE, "Diesel insert"),
        usage(r"diesel::update|\.set\s*\(", UPDATE, "Diesel update"),
        usage(r"diesel::delete", DELETE, "Diesel delete"),
        usage(r"\.inner_join\s*\(|\.left_join\s*\(", JOIN, "Diesel join"),
        usage(r"\.filter\s*\(|\.find\s*\(", FILTER, "Diesel filter"),
        usage(r"\.select\s*\(|\.column\s*\(", PROJECTION, "Diesel select"),
        usage(
            r"\.load\s*[:<(]|\.first\s*[:<(]|\.get_result\s*[:<(]",
            READ,
            "Diesel load/query",
        ),
    ],
    models: &[
        model(r"table!\s*\{\s*(\w+)", 1, "Diesel table! macro"),
        model(
            r#"#\[diesel\(table_name\s*=\s*"?(?:\w+::)*(\w+)"?\)\]"#,
            1,
            "Diesel table_name attribute",
        ),
    ],
    fields: &[field(
        r#"#\[diesel\(column_name\s*=\s*"?(\w+)"?\)\]\s*(?:pub\s+)?(\w+)"#,
        2,
        1,
        "Diesel column_name",
    )],
}];
