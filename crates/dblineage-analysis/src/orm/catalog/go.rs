//! GORM.

use dblineage_core::types::Language;

use super::*;

pub(super) static DESCRIPTORS: &[DescriptorDef] = &[DescriptorDef {
    name: "GORM",
    language: Language::Go,
    file_indicators: &[
        r#""gorm\.io/gorm""#,
        r#""gorm\.io/driver/"#,
        r"gorm\.Model",
        r"\.Preload\s*\(",
    ],
    usage: &[
        usage(r"`[^`]*gorm:", DEFINITION, "GORM struct tag"),
        usage(r"\.Create\s*\(|\.Save\s*\(", WRITE, "GORM create"),
        usage(r"\.Update\s*\(|\.Updates\s*\(|\.Save\s*\(", UPDATE, "GORM update"),
        usage(r"\.Delete\s*\(", DELETE, "GORM delete"),
        usage(
            r"\.Joins\s*\(|\.Preload\s*\(|\.Association\s*\(",
            JOIN,
            "GORM join/preload",
        ),
        usage(r"\.Where\s*\(|\.Or\s*\(|\.Not\s*\(", FILTER, "GORM where"),
        usage(r"\.Select\s*\(", PROJECTION, "GORM select"),
        usage(
            r"\.Find\s*\(|\.First\s*\(|\.Last\s*\(|\.Take\s*\(|\.Scan\s*\(",
            READ,
            "GORM find",
        ),
    ],
    models: &[model(
        r#"func\s*\(\s*\w+\s+\*?(\w+)\s*\)\s*TableName\s*\(\s*\)\s*string\s*\{[^}]*return\s+["'](\w+)["']"#,
        2,
        "GORM TableName method",
    )],
    fields: &[
        field(
            r#"(\w+)\s+\w+\s+`[^`]*gorm:"column:(\w+)"#,
            1,
            2,
            "GORM struct tag column",
        ),
        field(
            r#"(\w+)\s+\w+\s+`[^`]*json:"(\w+)"#,
            1,
            2,
            "Go JSON tag (inferred column)",
        ),
    ],
}];
