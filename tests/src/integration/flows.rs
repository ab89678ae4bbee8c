//! # HTTP Flows
//!
//! Drives the full router (middleware included) over a shared in-memory
//! store, then inspects the store directly to check what was persisted.

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
        response::Response,
        Router,
    };
    use segment_api::{build_router, routes, ApiConfig};
    use segment_service::{InMemorySegmentStore, Membership, SegmentName, SegmentService, UserId};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct TestApp {
        router: Router,
        store: Arc<InMemorySegmentStore>,
    }

    impl TestApp {
        fn new() -> Self {
            let store = Arc::new(InMemorySegmentStore::new());
            let service = Arc::new(SegmentService::new(Arc::clone(&store)));
            let router = build_router(service, &ApiConfig::default());
            Self { router, store }
        }

        async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
            let body = body.map_or_else(Body::empty, |v| Body::from(v.to_string()));
            let req = Request::builder()
                .method(method)
                .uri(uri)
                .body(body)
                .unwrap();
            self.router.clone().oneshot(req).await.unwrap()
        }

        async fn post(&self, uri: &str, body: Value) -> Response {
            self.request(Method::POST, uri, Some(body)).await
        }

        async fn create(&self, segment: &str) -> StatusCode {
            self.post(routes::CREATE_SEGMENT, json!({ "segment": segment }))
                .await
                .status()
        }

        async fn change(&self, user_id: i64, add: &[&str], delete: &[&str]) -> Response {
            self.post(
                routes::CHANGE_USER_SEGMENTS,
                json!({
                    "user_id": user_id,
                    "segments_to_add": add,
                    "segments_to_delete": delete,
                }),
            )
            .await
        }

        async fn user_segments(&self, user_id: i64) -> Value {
            let uri = format!("{}?user_id={user_id}", routes::GET_USER_SEGMENTS);
            let response = self.request(Method::GET, &uri, None).await;
            assert_eq!(response.status(), StatusCode::OK);
            body_json(response).await
        }

        fn segment_names(&self) -> Vec<String> {
            self.store
                .segments()
                .into_iter()
                .map(SegmentName::into_inner)
                .collect()
        }

        fn memberships_of(&self, user_id: i64) -> Vec<Membership> {
            self.store
                .memberships()
                .into_iter()
                .filter(|m| m.user_id == UserId(user_id))
                .collect()
        }
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // =============================================================================
    // SEGMENT LIFECYCLE
    // =============================================================================

    #[tokio::test]
    async fn test_creating_a_segment_twice_keeps_one_row() {
        let app = TestApp::new();

        assert_eq!(app.create("AVITO_VOICE_MESSAGES").await, StatusCode::CREATED);

        let response = app
            .post(
                routes::CREATE_SEGMENT,
                json!({ "segment": "AVITO_VOICE_MESSAGES" }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "segment with this name is already exists" })
        );

        assert_eq!(app.segment_names(), vec!["AVITO_VOICE_MESSAGES"]);
    }

    #[tokio::test]
    async fn test_deleting_missing_segment_leaves_data_unchanged() {
        let app = TestApp::new();
        app.create("B").await;
        app.change(1000, &["B"], &[]).await;

        let response = app
            .post(routes::DELETE_SEGMENT, json!({ "segment": "A" }))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "can't find the segment" })
        );

        assert_eq!(app.segment_names(), vec!["B"]);
        assert_eq!(app.memberships_of(1000).len(), 1);
    }

    #[tokio::test]
    async fn test_deleting_segment_removes_its_memberships() {
        let app = TestApp::new();
        app.create("A").await;
        app.create("B").await;
        app.change(1000, &["A", "B"], &[]).await;
        app.change(1001, &["A"], &[]).await;

        let response = app
            .post(routes::DELETE_SEGMENT, json!({ "segment": "A" }))
            .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        assert_eq!(app.segment_names(), vec!["B"]);
        assert_eq!(
            app.user_segments(1000).await,
            json!({ "user_id": 1000, "user_segments": ["B"] })
        );
        assert!(app.memberships_of(1001).is_empty());
    }

    // =============================================================================
    // MEMBERSHIP CHANGES
    // =============================================================================

    #[tokio::test]
    async fn test_added_segment_is_listed() {
        let app = TestApp::new();
        app.create("A").await;

        let response = app.change(1000, &["A"], &[]).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        assert_eq!(
            app.user_segments(1000).await,
            json!({ "user_id": 1000, "user_segments": ["A"] })
        );
    }

    #[tokio::test]
    async fn test_adding_to_missing_segment_creates_nothing() {
        let app = TestApp::new();
        app.create("A").await;

        let response = app.change(1000, &["A", "Z"], &[]).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "errors": ["can't find the segment"] })
        );

        assert!(app.memberships_of(1000).is_empty());
    }

    #[tokio::test]
    async fn test_adding_twice_keeps_one_membership() {
        let app = TestApp::new();
        app.create("A").await;
        app.change(1000, &["A"], &[]).await;

        let response = app.change(1000, &["A"], &[]).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "errors": ["user is already has this segment"] })
        );

        assert_eq!(app.memberships_of(1000).len(), 1);
    }

    #[tokio::test]
    async fn test_removing_absent_membership_keeps_others() {
        let app = TestApp::new();
        app.create("A").await;
        app.create("B").await;
        app.change(1000, &["A"], &[]).await;

        let response = app.change(1000, &[], &["B"]).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "errors": ["user doesn't have this segment"] })
        );

        assert_eq!(
            app.user_segments(1000).await,
            json!({ "user_id": 1000, "user_segments": ["A"] })
        );
    }

    #[tokio::test]
    async fn test_failed_add_does_not_block_delete() {
        let app = TestApp::new();
        app.create("A").await;
        app.change(1000, &["A"], &[]).await;

        let response = app.change(1000, &["Z"], &["A"]).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "errors": ["can't find the segment"] })
        );

        assert!(app.memberships_of(1000).is_empty());
    }

    #[tokio::test]
    async fn test_unusable_add_name_does_not_block_delete() {
        let app = TestApp::new();
        app.create("A").await;
        app.change(1000, &["A"], &[]).await;

        let response = app.change(1000, &[""], &["A"]).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "errors": ["can't find the segment"] })
        );

        assert!(app.memberships_of(1000).is_empty());
    }

    #[tokio::test]
    async fn test_unusable_delete_name_is_not_a_membership() {
        let app = TestApp::new();
        app.create("A").await;
        app.change(1000, &["A"], &[]).await;

        let response = app.change(1000, &[], &[""]).await;
        assert_eq!(
            body_json(response).await,
            json!({ "errors": ["user doesn't have this segment"] })
        );
        assert_eq!(app.memberships_of(1000).len(), 1);
    }

    #[tokio::test]
    async fn test_both_halves_failing_reports_both() {
        let app = TestApp::new();
        app.create("A").await;
        app.change(1000, &["A"], &[]).await;

        let response = app.change(1000, &["A"], &["B"]).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "errors": [
                "user doesn't have this segment",
                "user is already has this segment"
            ] })
        );
    }

    #[tokio::test]
    async fn test_null_lists_are_a_no_op() {
        let app = TestApp::new();

        let response = app
            .post(
                routes::CHANGE_USER_SEGMENTS,
                json!({ "user_id": 5, "segments_to_add": null }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(app.store.memberships().is_empty());
    }

    // =============================================================================
    // QUERIES
    // =============================================================================

    #[tokio::test]
    async fn test_user_without_memberships_gets_empty_list() {
        let app = TestApp::new();
        app.create("A").await;

        assert_eq!(
            app.user_segments(7).await,
            json!({ "user_id": 7, "user_segments": [] })
        );
    }

    #[tokio::test]
    async fn test_user_id_in_body_is_accepted() {
        let app = TestApp::new();
        app.create("A").await;
        app.change(42, &["A"], &[]).await;

        let response = app
            .request(
                Method::GET,
                routes::GET_USER_SEGMENTS,
                Some(json!({ "user_id": 42 })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "user_id": 42, "user_segments": ["A"] })
        );
    }

    #[tokio::test]
    async fn test_memberships_are_per_user() {
        let app = TestApp::new();
        app.create("A").await;
        app.create("B").await;
        app.change(1, &["A"], &[]).await;
        app.change(2, &["B"], &[]).await;

        assert_eq!(
            app.user_segments(1).await,
            json!({ "user_id": 1, "user_segments": ["A"] })
        );
        assert_eq!(
            app.user_segments(2).await,
            json!({ "user_id": 2, "user_segments": ["B"] })
        );
    }
}
