mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use vendor_mdm::portal::invitations::repository::InvitationRepository;
use vendor_mdm::portal::invitations::{InvitationId, InvitationStatus};
use vendor_mdm::portal::queue::INVITATION_EMAILS_QUEUE;
use vendor_mdm::portal::registration::ApplicationRepository;

use common::{portal, send};

#[tokio::test]
async fn invitation_lifecycle_create_validate_complete() {
    let portal = portal();
    let mut email_rx = portal.broker.subscribe(INVITATION_EMAILS_QUEUE);

    let (status, created) = send(
        &portal.router,
        "POST",
        "/api/v1/invitations",
        Some(json!({
            "vendor_legal_name": "Globex Industrial",
            "primary_contact_email": "purchasing@globex.example",
            "notes": "strategic packaging supplier"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let token = created["invitation_token"].as_str().expect("token present");
    assert_eq!(
        created["invitation_link"].as_str(),
        Some(format!("/invitation/register/{token}").as_str())
    );
    assert!(created["side_effects"]
        .as_array()
        .expect("effect report")
        .iter()
        .all(|outcome| outcome["status"] == "succeeded"));

    // The email worker queue received the rendered-notification payload.
    let envelope = email_rx.try_recv().expect("email message queued");
    assert_eq!(envelope.event_type, "invitation-created");
    assert_eq!(envelope.data["token"].as_str(), Some(token));

    // Token validates and pre-fill details are exposed.
    let (status, verdict) = send(
        &portal.router,
        "GET",
        &format!("/api/v1/invitations/validate/{token}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verdict["is_valid"], json!(true));
    assert_eq!(
        verdict["vendor_legal_name"].as_str(),
        Some("Globex Industrial")
    );

    let (status, details) = send(
        &portal.router,
        "GET",
        &format!("/api/v1/invitations/details/{token}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["status"].as_str(), Some("pending"));

    // Complete registration against the token.
    let (status, completed) = send(
        &portal.router,
        "POST",
        &format!("/api/v1/invitations/complete/{token}"),
        Some(json!({
            "company_name": "Globex Industrial",
            "tax_id": "98-7654321",
            "contact_name": "Sam Buyer",
            "email": "purchasing@globex.example"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["status"].as_str(), Some("submitted"));

    let application_id: Uuid =
        serde_json::from_value(completed["application_id"].clone()).expect("application id");
    let application = portal
        .applications
        .find_by_email("purchasing@globex.example")
        .expect("repository reads")
        .expect("application stored");
    assert_eq!(application.id.0, application_id);

    // The invitation is single-use: a second completion is rejected.
    let (status, body) = send(
        &portal.router,
        "POST",
        &format!("/api/v1/invitations/complete/{token}"),
        Some(json!({
            "company_name": "Globex Industrial",
            "email": "purchasing@globex.example"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"].as_str(),
        Some("This invitation has already been used.")
    );

    assert_eq!(portal.events.of_type("InvitationCreated").len(), 1);
    assert_eq!(portal.events.of_type("InvitationCompleted").len(), 1);
}

#[tokio::test]
async fn resend_rotates_the_token_over_http() {
    let portal = portal();

    let (_, created) = send(
        &portal.router,
        "POST",
        "/api/v1/invitations",
        Some(json!({
            "vendor_legal_name": "Initech Supplies",
            "primary_contact_email": "vendor@initech.example"
        })),
    )
    .await;
    let original_token = created["invitation_token"].as_str().expect("token").to_string();
    let invitation_id: Uuid =
        serde_json::from_value(created["invitation_id"].clone()).expect("invitation id");

    let (status, body) = send(
        &portal.router,
        "POST",
        &format!("/api/v1/invitations/{invitation_id}/resend"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"].as_str(),
        Some("Invitation has been resent successfully")
    );

    let stored = portal
        .invitations
        .fetch(&InvitationId(invitation_id))
        .expect("repository reads")
        .expect("invitation stored");
    assert_eq!(stored.status, InvitationStatus::Pending);
    assert_ne!(stored.token, original_token);
}

#[tokio::test]
async fn listing_filters_by_status() {
    let portal = portal();

    for name in ["Alpha Metals", "Beta Plastics"] {
        let email = format!("{}@vendors.example", name.to_lowercase().replace(' ', "."));
        let (status, _) = send(
            &portal.router,
            "POST",
            "/api/v1/invitations",
            Some(json!({
                "vendor_legal_name": name,
                "primary_contact_email": email
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, page) = send(
        &portal.router,
        "GET",
        "/api/v1/invitations?status=pending&page=1&page_size=10",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total_count"], json!(2));
    assert_eq!(page["invitations"].as_array().map(Vec::len), Some(2));

    let (status, empty) = send(
        &portal.router,
        "GET",
        "/api/v1/invitations?status=completed",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(empty["total_count"], json!(0));
}
