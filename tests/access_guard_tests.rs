//! End-to-end Access Guard behaviour through the real router


use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use lexguard::application::ports::SecurityEventType;
use lexguard::domain::authorization::{Permission, Role};
use test_fixtures::{assert_error, TestApp};

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new();
    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_missing_credential() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/admin/session", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, "AUTH_REQUIRED");
    assert_eq!(body["error"], "Unauthorized");
    assert_eq!(body["message"], "Authentication required");

    let events = app.recorder.recent(10);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, SecurityEventType::AuthenticationFailure);
}

#[tokio::test]
async fn test_garbage_and_expired_tokens() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/admin/session", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, "INVALID_TOKEN");

    let expired = app.token_expiring(
        Role::FirmAdmin,
        Some("org-a"),
        &[],
        chrono::Duration::minutes(-5),
    );
    let (status, body) = app.get("/api/admin/session", Some(&expired)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, "INVALID_TOKEN");
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_session_for_firm_admin() {
    let app = TestApp::new();
    let token = app.token(Role::FirmAdmin, Some("org-a"), &[]);

    let (status, body) = app.get("/api/admin/session", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "FIRM_ADMIN");
    assert_eq!(body["organization_id"], "org-a");
    assert!(body["permissions"]
        .as_array()
        .unwrap()
        .contains(&json!("admin:access")));

    let types: Vec<SecurityEventType> =
        app.recorder.recent(10).iter().map(|e| e.event_type).collect();
    assert_eq!(
        types,
        vec![
            SecurityEventType::AuthenticationSuccess,
            SecurityEventType::AuthorizationGranted
        ]
    );
}

#[tokio::test]
async fn test_cookie_credential() {
    let app = TestApp::new();
    let token = app.token(Role::FirmAdmin, Some("org-a"), &[]);

    let request = Request::builder()
        .uri("/api/admin/users")
        .header("Cookie", format!("theme=dark; auth-token={}", token))
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scope"], "organization");
}

#[tokio::test]
async fn test_attorney_cannot_reach_admin_console() {
    let app = TestApp::new();
    let token = app.token(Role::Attorney, Some("org-a"), &[]);

    let (status, body) = app.get("/api/admin/users", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error(&body, "INSUFFICIENT_PRIVILEGES");
}

#[tokio::test]
async fn test_explicit_permissions_replace_role_defaults() {
    let app = TestApp::new();
    let token = app.token(
        Role::FirmAdmin,
        Some("org-a"),
        &[Permission::AdminAccess, Permission::UsersRead],
    );

    let (status, _) = app.get("/api/admin/users", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/api/admin/audit-logs", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error(&body, "PERMISSION_DENIED");
}

#[tokio::test]
async fn test_nested_path_resolves_to_longest_prefix() {
    let app = TestApp::new();
    let token = app.token(Role::FirmAdmin, Some("org-a"), &[Permission::BillingRead]);

    let (status, body) = app.get("/api/admin/billing/invoices/2024", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["section"], "invoices/2024");
}

#[tokio::test]
async fn test_cross_organization_access_denied() {
    let app = TestApp::new();
    let token = app.token(Role::FirmAdmin, Some("org-a"), &[]);

    let (status, body) = app
        .get("/api/admin/organizations/org-b", Some(&token))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error(&body, "ORGANIZATION_ACCESS_DENIED");
    assert_eq!(
        body["message"],
        "Access denied to resource of other organization"
    );

    let last = app.recorder.recent(1);
    assert_eq!(last[0].event_type, SecurityEventType::TenantViolation);
    assert_eq!(last[0].resource_organization_id.as_deref(), Some("org-b"));

    let (status, body) = app
        .get("/api/admin/organizations/org-a", Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cross_organization"], false);
}

#[tokio::test]
async fn test_super_admin_crosses_organizations() {
    let app = TestApp::new();
    let token = app.token(Role::SuperAdmin, None, &[]);

    let (status, body) = app
        .get("/api/admin/organizations/org-b", Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cross_organization"], true);
}

#[tokio::test]
async fn test_intake_sanitizes_submission() {
    let app = TestApp::new();
    let token = app.token(Role::Paralegal, Some("org-a"), &[]);

    let (status, body) = app
        .post_json(
            "/api/organizations/org-a/intake",
            &token,
            json!({
                "client_name": "Jane <img src=x onerror=alert(1)>Roe",
                "email": "Jane.Roe+intake@GMAIL.com",
                "phone": "+1 (555) 123-4567",
                "website": "roe-family.example",
                "notes": "<p>Estate plan</p><script>alert(1)</script>",
                "attachment_name": "../../etc/passwd",
                "details": { "matter": "<b>Estate</b>" }
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "body: {}", body);
    assert_eq!(body["organization_id"], "org-a");
    assert_eq!(body["email"], "janeroe@gmail.com");
    assert_eq!(body["website"], "https://roe-family.example/");
    assert!(body["notes"].as_str().unwrap().contains("Estate plan"));
    assert!(!body["notes"].as_str().unwrap().contains("script"));
    assert!(!body["client_name"].as_str().unwrap().contains('<'));
    assert!(!body["attachment_name"].as_str().unwrap().contains('/'));
    assert_eq!(body["details"]["matter"], "Estate");
}

#[tokio::test]
async fn test_intake_rejects_header_injection() {
    let app = TestApp::new();
    let token = app.token(Role::Attorney, Some("org-a"), &[]);

    let (status, body) = app
        .post_json(
            "/api/organizations/org-a/intake",
            &token,
            json!({
                "client_name": "Jane Roe",
                "email": "jane@example.com%0d%0aBcc:victim@example.com",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    let codes: Vec<&str> = body["field_errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["field"] == "email")
        .map(|e| e["code"].as_str().unwrap())
        .collect();
    assert!(codes.contains(&"HEADER_INJECTION"), "codes: {:?}", codes);
}

#[tokio::test]
async fn test_intake_attachment_needs_documents_write() {
    let app = TestApp::new();
    let token = app.token(Role::Attorney, Some("org-a"), &[Permission::CasesWrite]);

    let (status, body) = app
        .post_json(
            "/api/organizations/org-a/intake",
            &token,
            json!({
                "client_name": "Jane Roe",
                "email": "jane@example.com",
                "attachment_name": "retainer.pdf"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error(&body, "PERMISSION_DENIED");
    assert_eq!(body["error"], "Forbidden");

    let (status, body) = app
        .post_json(
            "/api/organizations/org-a/intake",
            &token,
            json!({ "client_name": "Jane Roe", "email": "jane@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "body: {}", body);
}

#[tokio::test]
async fn test_client_cannot_submit_intake() {
    let app = TestApp::new();
    let token = app.token(Role::Client, Some("org-a"), &[]);

    let (status, body) = app
        .post_json(
            "/api/organizations/org-a/intake",
            &token,
            json!({ "client_name": "Jane Roe", "email": "jane@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error(&body, "PERMISSION_DENIED");
}

#[tokio::test]
async fn test_intake_for_other_organization() {
    let app = TestApp::new();
    let token = app.token(Role::Attorney, Some("org-a"), &[]);

    let (status, body) = app
        .post_json(
            "/api/organizations/org-b/intake",
            &token,
            json!({ "client_name": "Jane Roe", "email": "jane@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error(&body, "ORGANIZATION_ACCESS_DENIED");
}

#[tokio::test]
async fn test_search_clamps_pagination() {
    let app = TestApp::new();
    let token = app.token(Role::Staff, Some("org-a"), &[]);

    let (status, body) = app
        .get(
            "/api/organizations/org-a/cases/search?q=estate%20planning&page=-5&limit=99999",
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "estate planning");
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["limit"], 100);
    assert_eq!(body["offset"], 0);
}

#[tokio::test]
async fn test_audit_log_management() {
    let app = TestApp::new();
    let firm_admin = app.token(Role::FirmAdmin, Some("org-a"), &[]);
    let super_admin = app.token(Role::SuperAdmin, None, &[]);

    let (status, body) = app.get("/api/admin/audit-logs?limit=5", Some(&firm_admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["total_recorded"].as_u64().unwrap() >= 2);

    let delete = |token: &str| {
        Request::builder()
            .method("DELETE")
            .uri("/api/admin/audit-logs")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    };

    let (status, body) = app.send(delete(&firm_admin)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error(&body, "INSUFFICIENT_PRIVILEGES");

    let (status, _) = app.send(delete(&super_admin)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(app.recorder.is_empty());
}

#[tokio::test]
async fn test_screening_rejects_hostile_targets() {
    let app = TestApp::new();
    let token = app.token(Role::FirmAdmin, Some("org-a"), &[]);

    for uri in [
        "/api/organizations/org-a/cases/search?q=%3Cscript%3Ealert(1)",
        "/api/organizations/org-a/cases/search?q=a%0d%0aSet-Cookie:x=1",
        "/api/organizations/org-a/cases/search?q=..%2F..%2Fetc%2Fpasswd",
    ] {
        let (status, body) = app.get(uri, Some(&token)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["code"], "INVALID_REQUEST_INPUT", "{}", uri);
    }

    // Screening runs before the guard, so nothing reached it
    assert!(app.recorder.is_empty());
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let app = TestApp::new();
    let token = app.token(Role::Attorney, Some("org-a"), &[]);

    let (status, _) = app
        .post_json(
            "/api/organizations/org-a/intake",
            &token,
            json!({
                "client_name": "Jane Roe",
                "email": "jane@example.com",
                "notes": "x".repeat(2 * 1024 * 1024),
            }),
        )
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}
