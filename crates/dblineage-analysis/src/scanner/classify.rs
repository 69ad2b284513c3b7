//! Path-based file classification.
//!
//! Paths are matched as given; Windows separators are normalized first so
//! the directory exclusions apply to both styles.

const CODE_EXTENSIONS: &[&str] = &[
    ".go", ".js", ".mjs", ".cjs", ".ts", ".tsx", ".jsx", ".java", ".py", ".rb", ".rs", ".cs",
    ".sql", ".graphql", ".gql", ".proto", ".prisma",
];

const EXCLUDED_SEGMENTS: &[&str] = &[
    "node_modules/",
    "vendor/",
    ".git/",
    "__pycache__/",
    "/dist/",
    "/build/",
    "/target/",
];

const SCHEMA_MARKERS: &[&str] = &[
    "schema.sql",
    "migration",
    "migrate",
    "create_table",
    "schema.prisma",
    "schema.graphql",
];

const ORM_SCHEMA_MARKERS: &[&str] = &[
    "schema.prisma",
    "models.py",
    "entities",
    "entity",
    "model",
    "schema.ts",
    "schema.js",
    "tables.ts",
    "tables.js",
];

fn normalize(path: &str) -> String {
    path.replace('\\', "/").to_lowercase()
}

/// Whether a file should be stored and traced.
pub fn is_code_file(path: &str) -> bool {
    let path = normalize(path);
    if path.contains(".class") {
        return false;
    }
    // Leading slash so top-level `dist/` matches `/dist/` too.
    let rooted = format!("/{path}");
    if EXCLUDED_SEGMENTS.iter().any(|seg| rooted.contains(seg)) {
        return false;
    }
    CODE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Whether a file is a SQL DDL candidate.
pub fn is_schema_file(path: &str) -> bool {
    let path = normalize(path);
    path.ends_with(".sql") || SCHEMA_MARKERS.iter().any(|m| path.contains(m))
}

/// Whether a file likely holds ORM model definitions.
pub fn is_orm_schema_file(path: &str) -> bool {
    let path = normalize(path);
    path.ends_with(".prisma") || ORM_SCHEMA_MARKERS.iter().any(|m| path.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_files_by_extension() {
        assert!(is_code_file("src/app/orders.ts"));
        assert!(is_code_file("api/handlers.go"));
        assert!(is_code_file("db/schema.prisma"));
        assert!(!is_code_file("README.md"));
        assert!(!is_code_file("build/Main.class"));
    }

    #[test]
    fn excluded_directories() {
        assert!(!is_code_file("node_modules/lodash/index.js"));
        assert!(!is_code_file("web/node_modules/x.ts"));
        assert!(!is_code_file("dist/bundle.js"));
        assert!(!is_code_file("app/target/debug/build.rs"));
        assert!(!is_code_file("C:\\repo\\vendor\\lib.go"));
        assert!(is_code_file("src/distribution.ts"));
    }

    #[test]
    fn schema_candidates() {
        assert!(is_schema_file("db/init.sql"));
        assert!(is_schema_file("db/migrations/0001_init.rb"));
        assert!(!is_schema_file("src/index.ts"));
        assert!(is_orm_schema_file("prisma/schema.prisma"));
        assert!(is_orm_schema_file("app/models.py"));
        assert!(is_orm_schema_file("src/entities/User.java"));
        assert!(is_orm_schema_file("internal/model/user.go"));
        assert!(!is_orm_schema_file("src/routes.ts"));
    }
}
