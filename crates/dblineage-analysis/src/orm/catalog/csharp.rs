//! Entity Framework.

use dblineage_core::types::Language;

use super::*;

pub(super) static DESCRIPTORS: &[DescriptorDef] = &[DescriptorDef {
    name: "EntityFramework",
    language: Language::CSharp,
    file_indicators: &[
        r"using\s+Microsoft\.EntityFrameworkCore",
        r"using\s+System\.Data\.Entity",
        r"DbContext",
        r"DbSet\s*<",
    ],
    usage: &[
        usage(r"\.Add\s*\(|\.AddRange\s*\(|\.AddAsync\s*\(", WRITE, "EF add"),
        usage(
            r"\.Update\s*\(|\.Entry\s*\(.*\.State\s*=\s*EntityState\.Modified",
            UPDATE,
            "EF update",
        ),
        usage(r"\.Remove\s*\(|\.RemoveRange\s*\(", DELETE, "EF remove"),
        usage(r"\.Include\s*\(|\.ThenInclude\s*\(|\.Join\s*\(", JOIN, "EF include/join"),
        usage(r"\.Where\s*\(|\.Any\s*\(|\.All\s*\(", FILTER, "EF where"),
        usage(r"\.Select\s*\(", PROJECTION, "EF select"),
        usage(
            r"\.ToList\s*\(|\.FirstOrDefault\s*\(|\.SingleOrDefault\s*\(|\.Find\s*\(|\.AsNoTracking\s*\(",
            READ,
            "EF read",
        ),
    ],
    models: &[
        model(
            r#"\[Table\s*\(\s*["'](\w+)["']\s*\)\]"#,
            1,
            "EF Table attribute",
        ),
        model(
            r#"modelBuilder\.Entity<\w+>\s*\(\s*\)\s*\.ToTable\s*\(\s*["'](\w+)["']"#,
            1,
            "EF ToTable fluent",
        ),
    ],
    fields: &[field(
        r#"\[Column\s*\(\s*["'](\w+)["']\s*\)\]\s*public\s+\w+\s+(\w+)"#,
        2,
        1,
        "EF Column attribute",
    )],
}];
