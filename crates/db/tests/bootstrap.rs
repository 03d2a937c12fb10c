use sqlx::PgPool;

/// Full bootstrap test: connect, migrate, verify schema.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    uswds_pt_db::health_check(&pool).await.unwrap();

    for table in ["prototypes", "prototype_versions"] {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}

/// Checksums that are not 64 lowercase hex characters are rejected by the schema.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_checksum_format_enforced(pool: PgPool) {
    let result = sqlx::query(
        "INSERT INTO prototypes (name, content_checksum) VALUES ('bad', 'NOT-A-CHECKSUM')",
    )
    .execute(&pool)
    .await;

    let err = result.expect_err("malformed checksum must be rejected");
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.code().as_deref(), Some("23514"));
}
