//! End-to-end ingestion: files in, schema and usages out, then lineage.

use std::sync::Arc;

use dblineage_analysis::lineage::{LineageRequest, LineageService, LineageTree};
use dblineage_analysis::orm::OrmRegistry;
use dblineage_analysis::pipeline::IngestPipeline;
use dblineage_core::config::TraceConfig;
use dblineage_core::errors::PipelineError;
use dblineage_core::traits::{Cancellable, CancellationToken, SourceStore};
use dblineage_core::types::{ComponentType, NewSourceFile};
use dblineage_core::DbLineageConfig;
use dblineage_storage::queries::{schema, usages};
use dblineage_storage::DatabaseManager;

fn setup_db() -> DatabaseManager {
    DatabaseManager::open_in_memory().unwrap()
}

fn batch() -> Vec<NewSourceFile> {
    vec![
        NewSourceFile::detect(
            "db/schema.sql",
            "CREATE TABLE customers (\n  id INT PRIMARY KEY,\n  email VARCHAR(255),\n  country_code CHAR(2)\n);\n",
        ),
        NewSourceFile::detect(
            "prisma/schema.prisma",
            "model Customer {\n  id Int @id\n  nickname String\n}\n\nmodel Invoice {\n  id Int @id\n  amount Decimal\n  customerId Int\n}\n",
        ),
        NewSourceFile::detect(
            "src/customers.ts",
            "export function byEmail(email: string) {\n  return db.query(\"SELECT id FROM customers WHERE email = $1\", [email]);\n}\n\nexport const invoiceTotal = (inv) => inv.amount * 2;\n",
        ),
        NewSourceFile::detect("README.md", "email everyone"),
        NewSourceFile::detect("node_modules/lib/index.js", "const email = 1;"),
    ]
}

#[test]
fn ingest_extracts_schema_and_traces_usages() {
    let db = setup_db();
    let registry = OrmRegistry::builtin();
    let config = TraceConfig::default();
    let pipeline = IngestPipeline::new(&db, &registry, &config);

    let result = pipeline.ingest("p1", &batch());
    assert!(result.is_clean(), "{:?}", result.errors);
    let summary = &result.data;
    assert_eq!(summary.files_stored, 3);
    assert_eq!(summary.files_ignored, 2);
    assert_eq!(summary.schema_files, 2);
    assert_eq!(summary.model_files, 1);
    // SQL wins for customers; the Prisma file adds invoices only.
    assert_eq!(summary.tables_created, 2);
    assert_eq!(summary.tables_skipped, 1);
    assert_eq!(db.with_reader(|c| schema::count_tables(c, "p1")).unwrap(), 2);

    let columns = db.project_columns("p1").unwrap();
    assert!(columns.iter().any(|c| c.table == "invoices" && c.name == "customer_id"));
    assert!(columns.iter().all(|c| c.name != "nickname"));

    assert_eq!(summary.trace.files_traced, 3);
    assert!(summary.trace.usages_recorded > 0);
    assert!(db.project_files("p1").unwrap().iter().all(|f| f.parsed));

    let code = db
        .project_files("p1")
        .unwrap()
        .into_iter()
        .find(|f| f.path == "src/customers.ts")
        .unwrap();
    let found = db.with_reader(|c| usages::usages_for_file(c, code.id)).unwrap();
    let email = columns.iter().find(|c| c.name == "email").unwrap();
    assert!(found.iter().any(|u| u.column_id == email.id && u.line_number == 2));
    let amount = columns.iter().find(|c| c.name == "amount").unwrap();
    assert!(found.iter().any(|u| u.column_id == amount.id && u.line_number == 5));
}

#[test]
fn retrace_is_idempotent_and_force_rebuilds() {
    let db = setup_db();
    let registry = OrmRegistry::builtin();
    let config = TraceConfig {
        parallel: Some(false),
        ..TraceConfig::default()
    };
    let pipeline = IngestPipeline::new(&db, &registry, &config);
    pipeline.ingest("p1", &batch());
    let stored = db.with_reader(|c| usages::count_project_usages(c, "p1")).unwrap();
    assert!(stored > 0);

    let again = pipeline.retrace("p1", false);
    assert!(again.is_clean());
    assert_eq!(again.data.trace.files_traced, 0);
    assert_eq!(again.data.trace.files_skipped, 3);

    let forced = pipeline.retrace("p1", true);
    assert!(forced.is_clean());
    assert_eq!(forced.data.trace.files_traced, 3);
    assert_eq!(forced.data.trace.usages_recorded as i64, stored);
    assert_eq!(db.with_reader(|c| usages::count_project_usages(c, "p1")).unwrap(), stored);
}

#[test]
fn no_columns_leaves_files_untraced() {
    let db = setup_db();
    let registry = OrmRegistry::builtin();
    let config = TraceConfig::default();
    let pipeline = IngestPipeline::new(&db, &registry, &config);

    let result = pipeline.ingest(
        "p1",
        &[NewSourceFile::detect("src/app.ts", "export const email = 1;\n")],
    );
    assert!(result.is_clean());
    assert_eq!(result.data.files_stored, 1);
    assert_eq!(result.data.trace.files_traced, 0);
    assert!(db.project_files("p1").unwrap().iter().all(|f| !f.parsed));
}

#[test]
fn cancelled_ingest_stops_early() {
    let db = setup_db();
    let registry = OrmRegistry::builtin();
    let config = TraceConfig::default();
    let token = CancellationToken::new();
    token.cancel();
    let pipeline = IngestPipeline::new(&db, &registry, &config).with_cancellation(&token);

    let result = pipeline.ingest("p1", &batch());
    assert!(matches!(result.errors.as_slice(), [PipelineError::Cancelled]));
    assert!(db.project_files("p1").unwrap().is_empty());
}

#[test]
fn ingested_usages_feed_flat_lineage() {
    let db = Arc::new(setup_db());
    let registry = OrmRegistry::builtin();
    let config = TraceConfig::default();
    IngestPipeline::new(db.as_ref(), &registry, &config).ingest("p1", &batch());

    let service = LineageService::from_config(Arc::clone(&db), &DbLineageConfig::default());
    let response = service
        .build_lineage(&LineageRequest::column(vec!["p1".into()], "customers", "email"))
        .unwrap();
    let files: Vec<_> = response
        .tree
        .children(LineageTree::ROOT)
        .map(|(_, n)| (n.name.clone(), n.component_type))
        .collect();
    assert!(files.contains(&("src/customers.ts".to_string(), ComponentType::File)));
    assert!(response.tree.nodes().skip(1).all(|(id, _)| response.tree.depth(id) == 1));

    let tables = service.tables(&["p1".to_string()], false).unwrap();
    let names: Vec<_> = tables.iter().map(|t| t.table_name.as_str()).collect();
    assert_eq!(names, vec!["customers", "invoices"]);
}
