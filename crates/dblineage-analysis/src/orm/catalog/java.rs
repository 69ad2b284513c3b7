//! Hibernate / JPA.

use dblineage_core::types::Language;

use super::*;

pub(super) static DESCRIPTORS: &[DescriptorDef] = &[DescriptorDef {
    name: "Hibernate",
    language: Language::Java,
    file_indicators: &[
        r"import\s+javax\.persistence\.",
        r"import\s+jakarta\.persistence\.",
        r"import\s+org\.hibernate\.",
        r"@Entity",
        r"@Table",
    ],
    usage: &[
        usage(r"@Column\s*\(", DEFINITION, "JPA column declaration"),
        usage(r"\.persist\s*\(|\.save\s*\(|\.saveAndFlush\s*\(", WRITE, "JPA persist"),
        usage(
            r"\.merge\s*\(|\.update\s*\(|\.saveAndFlush\s*\(",
            UPDATE,
            "JPA merge/update",
        ),
        usage(r"\.remove\s*\(|\.delete\s*\(|\.deleteById\s*\(", DELETE, "JPA delete"),
        usage(
            r"JOIN\s+FETCH|@ManyToOne|@OneToMany|@ManyToMany|@OneToOne",
            JOIN,
            "JPA relation/join",
        ),
        usage(
            r#"\.createQuery\s*\(\s*["'].*WHERE|\.setParameter\s*\("#,
            FILTER,
            "JPQL where",
        ),
        usage(
            r#"\.createQuery\s*\(\s*["']SELECT\s+\w+\.\w+"#,
            PROJECTION,
            "JPQL projection",
        ),
        usage(
            r"\.find\s*\(|\.get\s*\(|\.load\s*\(|\.createQuery\s*\(.*SELECT|entityManager\.find",
            READ,
            "JPA/Hibernate read",
        ),
        usage(r"CriteriaBuilder|CriteriaQuery|Specification", READ, "JPA Criteria API"),
    ],
    models: &[model(
        r#"@Table\s*\(\s*name\s*=\s*["'](\w+)["']"#,
        1,
        "JPA @Table name",
    )],
    fields: &[
        field(
            r#"@Column\s*\(\s*name\s*=\s*["'](\w+)["']\s*\)[\s\S]*?private\s+\w+\s+(\w+)"#,
            2,
            1,
            "JPA @Column name",
        ),
        field(
            r"private\s+\w+\s+(\w+)\s*;",
            1,
            1,
            "JPA field (inferred column)",
        ),
    ],
}];
