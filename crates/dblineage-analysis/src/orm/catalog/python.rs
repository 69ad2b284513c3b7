//! SQLAlchemy and Django.

use dblineage_core::types::Language;

use super::*;

pub(super) static DESCRIPTORS: &[DescriptorDef] = &[
    DescriptorDef {
        name: "SQLAlchemy",
        language: Language::Python,
        file_indicators: &[
            r"from\s+sqlalchemy",
            r"import\s+sqlalchemy",
            r"Base\.metadata",
            r"declarative_base\s*\(",
            r"mapped_column\s*\(",
        ],
        usage: &[
            usage(
                r"=\s*(?:Column|mapped_column)\s*\(",
                DEFINITION,
                "SQLAlchemy column declaration",
            ),
            usage(
                r"session\.add\s*\(|session\.add_all\s*\(|\.insert\s*\(",
                WRITE,
                "SQLAlchemy add/insert",
            ),
            usage(r"session\.merge\s*\(|\.update\s*\(", UPDATE, "SQLAlchemy merge/update"),
            usage(r"session\.delete\s*\(|\.delete\s*\(", DELETE, "SQLAlchemy delete"),
            usage(
                r"\.join\s*\(|\.outerjoin\s*\(|relationship\s*\(",
                JOIN,
                "SQLAlchemy join",
            ),
            usage(r"\.filter\s*\(|\.filter_by\s*\(|\.where\s*\(", FILTER, "SQLAlchemy filter"),
            usage(
                r"\.with_entities\s*\(|\.options\s*\(.*load_only",
                PROJECTION,
                "SQLAlchemy projection",
            ),
            usage(
                r"session\.query\s*\(|\.all\s*\(|\.first\s*\(|\.one\s*\(|\.scalars\s*\(|\.execute\s*\(.*select",
                READ,
                "SQLAlchemy read",
            ),
        ],
        models: &[model(
            r#"__tablename__\s*=\s*['"](\w+)['"]"#,
            1,
            "SQLAlchemy tablename",
        )],
        fields: &[
            field(
                r"(\w+)\s*=\s*(?:Column|mapped_column)\s*\(",
                1,
                1,
                "SQLAlchemy column definition",
            ),
            field(
                r#"(\w+)\s*=\s*Column\s*\(\s*['"](\w+)['"]"#,
                1,
                2,
                "SQLAlchemy explicit column name",
            ),
        ],
    },
    DescriptorDef {
        name: "Django",
        language: Language::Python,
        file_indicators: &[
            r"from\s+django\.db\s+import\s+models",
            r"models\.Model\b",
            r"\.objects\.",
        ],
        usage: &[
            usage(r"=\s*models\.\w+Field\s*\(", DEFINITION, "Django field declaration"),
            usage(
                r"\.objects\.create\s*\(|\.objects\.bulk_create\s*\(|\.objects\.get_or_create\s*\(",
                WRITE,
                "Django create",
            ),
            usage(
                r"\.update\s*\(|\.update_or_create\s*\(|\.save\s*\(",
                UPDATE,
                "Django update/save",
            ),
            usage(r"\.delete\s*\(", DELETE, "Django delete"),
            usage(
                r"\.select_related\s*\(|\.prefetch_related\s*\(",
                JOIN,
                "Django related loading",
            ),
            usage(
                r"\.filter\s*\(|\.exclude\s*\(|\.get\s*\(",
                FILTER,
                "Django filter",
            ),
            usage(
                r"\.values\s*\(|\.values_list\s*\(|\.only\s*\(",
                PROJECTION,
                "Django values/only",
            ),
            usage(r"\.objects\.", READ, "Django manager query"),
        ],
        models: &[model(r#"db_table\s*=\s*['"](\w+)['"]"#, 1, "Django Meta.db_table")],
        fields: &[field(
            r#"(\w+)\s*=\s*models\.\w+\([^)]*db_column\s*=\s*['"](\w+)['"]"#,
            1,
            2,
            "Django db_column",
        )],
    },
];
