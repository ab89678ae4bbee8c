//! # PostgreSQL Store
//!
//! Runs `PgSegmentStore` against a live database named by `DATABASE_URL`.
//! Every test is `#[ignore]`d; run them with `-- --ignored`.
//!
//! Tests share the database, so each one works on its own segment names
//! and user ids and removes them afterwards.

#[cfg(test)]
mod tests {
    use segment_service::{
        PgSegmentStore, SegmentApi, SegmentChange, SegmentName, SegmentService, SegmentStore,
        StoreError, UserId,
    };
    use segments_node::{connect_pool, prepare_store, DatabaseConfig};
    use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
    use sqlx::PgPool;
    use std::sync::Arc;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct Fixture {
        pool: PgPool,
        store: PgSegmentStore,
        prefix: String,
        user: UserId,
    }

    impl Fixture {
        async fn new() -> Self {
            let config = DatabaseConfig {
                url: std::env::var("DATABASE_URL").ok(),
                max_connections: 2,
                ..Default::default()
            };
            let pool = connect_pool(&config).await.unwrap();
            let store = PgSegmentStore::new(pool.clone());
            prepare_store(&store).await.unwrap();

            let id = uuid::Uuid::new_v4();
            let user = UserId(id.as_u128() as i64 & i64::MAX);
            Self {
                pool,
                store,
                prefix: format!("TEST_{}", id.simple()),
                user,
            }
        }

        fn name(&self, suffix: &str) -> SegmentName {
            SegmentName::new(format!("{}_{suffix}", self.prefix)).unwrap()
        }

        async fn segment_rows(&self, name: &SegmentName) -> i64 {
            sqlx::query_scalar("SELECT COUNT(*) FROM segment WHERE name = $1")
                .bind(name.as_str())
                .fetch_one(&self.pool)
                .await
                .unwrap()
        }

        async fn membership_rows(&self, name: &SegmentName) -> i64 {
            sqlx::query_scalar(
                "SELECT COUNT(*) FROM users_in_segment WHERE user_id = $1 AND segment = $2",
            )
            .bind(self.user.get())
            .bind(name.as_str())
            .fetch_one(&self.pool)
            .await
            .unwrap()
        }

        async fn cleanup(self) {
            let pattern = format!("{}_%", self.prefix);
            sqlx::query("DELETE FROM segment WHERE name LIKE $1")
                .bind(pattern)
                .execute(&self.pool)
                .await
                .unwrap();
            self.pool.close().await;
        }
    }

    // =============================================================================
    // SCHEMA
    // =============================================================================

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_schema_initialisation_is_idempotent() {
        let fx = Fixture::new().await;
        fx.store.init_schema().await.unwrap();
        fx.store.init_schema().await.unwrap();
        fx.store.verify_schema().await.unwrap();

        let constraints: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pg_constraint WHERE conname::TEXT = ANY($1)",
        )
        .bind(vec![
            "segment_pkey",
            "users_in_segment_segment_fkey",
            "users_in_segment_user_id_segment_key",
        ])
        .fetch_one(&fx.pool)
        .await
        .unwrap();
        assert_eq!(constraints, 3);

        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pg_tables WHERE tablename IN ('segment', 'users_in_segment')",
        )
        .fetch_one(&fx.pool)
        .await
        .unwrap();
        assert_eq!(tables, 2);

        fx.cleanup().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ignore = "requires DATABASE_URL"]
    async fn test_concurrent_schema_initialisation_on_empty_schema() {
        let url = std::env::var("DATABASE_URL").unwrap();
        let schema = format!("init_{}", uuid::Uuid::new_v4().simple());
        let admin = PgPool::connect(&url).await.unwrap();
        sqlx::query(&format!("CREATE SCHEMA {schema}"))
            .execute(&admin)
            .await
            .unwrap();

        let options = url
            .parse::<PgConnectOptions>()
            .unwrap()
            .options([("search_path", schema.as_str())]);
        let mut handles = Vec::new();
        for _ in 0..4 {
            let options = options.clone();
            handles.push(tokio::spawn(async move {
                let pool = PgPoolOptions::new()
                    .max_connections(1)
                    .connect_with(options)
                    .await
                    .unwrap();
                let result = PgSegmentStore::new(pool.clone()).init_schema().await;
                pool.close().await;
                result
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let tables: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM pg_tables WHERE schemaname = $1")
                .bind(&schema)
                .fetch_one(&admin)
                .await
                .unwrap();
        assert_eq!(tables, 2);

        sqlx::query(&format!("DROP SCHEMA {schema} CASCADE"))
            .execute(&admin)
            .await
            .unwrap();
        admin.close().await;
    }

    // =============================================================================
    // SEGMENTS
    // =============================================================================

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_duplicate_segment_is_classified() {
        let fx = Fixture::new().await;
        let a = fx.name("A");

        fx.store.create_segment(&a).await.unwrap();
        assert_eq!(
            fx.store.create_segment(&a).await,
            Err(StoreError::SegmentAlreadyExists)
        );
        assert_eq!(fx.segment_rows(&a).await, 1);

        fx.cleanup().await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_deleting_missing_segment_keeps_others() {
        let fx = Fixture::new().await;
        let a = fx.name("A");
        let b = fx.name("B");
        fx.store.create_segment(&b).await.unwrap();

        assert_eq!(
            fx.store.delete_segment(&a).await,
            Err(StoreError::SegmentNotFound)
        );
        assert_eq!(fx.segment_rows(&b).await, 1);

        fx.cleanup().await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_segment_delete_cascades() {
        let fx = Fixture::new().await;
        let a = fx.name("A");
        fx.store.create_segment(&a).await.unwrap();
        fx.store
            .add_user_to_segments(fx.user, std::slice::from_ref(&a))
            .await
            .unwrap();

        fx.store.delete_segment(&a).await.unwrap();
        assert_eq!(fx.membership_rows(&a).await, 0);
        assert!(fx.store.get_user_segments(fx.user).await.unwrap().is_empty());

        fx.cleanup().await;
    }

    // =============================================================================
    // MEMBERSHIPS
    // =============================================================================

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_membership_roundtrip() {
        let fx = Fixture::new().await;
        let a = fx.name("A");
        let b = fx.name("B");
        fx.store.create_segment(&a).await.unwrap();
        fx.store.create_segment(&b).await.unwrap();

        fx.store
            .add_user_to_segments(fx.user, &[b.clone(), a.clone()])
            .await
            .unwrap();
        assert_eq!(
            fx.store.get_user_segments(fx.user).await.unwrap(),
            vec![a.clone(), b.clone()]
        );

        fx.store
            .delete_user_from_segments(fx.user, std::slice::from_ref(&b))
            .await
            .unwrap();
        assert_eq!(fx.store.get_user_segments(fx.user).await.unwrap(), vec![a]);

        fx.cleanup().await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_add_to_missing_segment_rolls_back() {
        let fx = Fixture::new().await;
        let a = fx.name("A");
        let z = fx.name("Z");
        fx.store.create_segment(&a).await.unwrap();

        assert_eq!(
            fx.store
                .add_user_to_segments(fx.user, &[a.clone(), z.clone()])
                .await,
            Err(StoreError::SegmentNotFound)
        );
        assert_eq!(fx.membership_rows(&a).await, 0);
        assert_eq!(fx.membership_rows(&z).await, 0);

        fx.cleanup().await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_duplicate_membership_is_classified() {
        let fx = Fixture::new().await;
        let a = fx.name("A");
        fx.store.create_segment(&a).await.unwrap();
        fx.store
            .add_user_to_segments(fx.user, std::slice::from_ref(&a))
            .await
            .unwrap();

        assert_eq!(
            fx.store
                .add_user_to_segments(fx.user, std::slice::from_ref(&a))
                .await,
            Err(StoreError::UserAlreadyInSegment)
        );
        assert_eq!(fx.membership_rows(&a).await, 1);

        fx.cleanup().await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_removing_absent_membership() {
        let fx = Fixture::new().await;
        let a = fx.name("A");
        let b = fx.name("B");
        fx.store.create_segment(&a).await.unwrap();
        fx.store.create_segment(&b).await.unwrap();
        fx.store
            .add_user_to_segments(fx.user, std::slice::from_ref(&a))
            .await
            .unwrap();

        assert_eq!(
            fx.store
                .delete_user_from_segments(fx.user, std::slice::from_ref(&b))
                .await,
            Err(StoreError::UserNotInSegment)
        );
        assert_eq!(fx.membership_rows(&a).await, 1);

        fx.cleanup().await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_user_without_memberships() {
        let fx = Fixture::new().await;
        assert!(fx.store.get_user_segments(fx.user).await.unwrap().is_empty());
        fx.cleanup().await;
    }

    // =============================================================================
    // SERVICE OVER POSTGRES
    // =============================================================================

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_change_applies_delete_when_add_fails() {
        let fx = Fixture::new().await;
        let a = fx.name("A");
        let z = fx.name("Z");
        fx.store.create_segment(&a).await.unwrap();
        fx.store
            .add_user_to_segments(fx.user, std::slice::from_ref(&a))
            .await
            .unwrap();

        let service = SegmentService::new(Arc::new(fx.store.clone()));
        let err = service
            .change_user_segments(&SegmentChange::new(
                fx.user,
                vec![z.into_inner()],
                vec![a.as_str().to_string()],
            ))
            .await
            .unwrap_err();

        assert_eq!(err.failures().len(), 1);
        assert_eq!(err.failures()[0].error, StoreError::SegmentNotFound);
        assert_eq!(fx.membership_rows(&a).await, 0);

        fx.cleanup().await;
    }
}
