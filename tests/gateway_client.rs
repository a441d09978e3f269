//! Integration tests for the reqwest vendor client against a mock vendor API.

use agro_planner::{
    config::VendorSettings,
    gateway::{GatewayError, GatewayResult, JohnDeereClient, VendorGateway},
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, body_string_contains, header, method, path, query_param},
};

fn settings(server: &MockServer) -> VendorSettings {
    VendorSettings {
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        org_id: "org-1".to_string(),
        auth_url: format!("{}/oauth/token", server.uri()),
        api_base: server.uri(),
        ..VendorSettings::default()
    }
}

async fn mount_token(server: &MockServer, token: &str, times: Option<u64>) {
    let mock = Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": token, "expires_in": 3600})),
        );
    match times {
        Some(n) => mock.up_to_n_times(n).mount(server).await,
        None => mock.mount(server).await,
    }
}

#[tokio::test]
async fn token_is_cached_between_requests() -> GatewayResult<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "t1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fieldOperations/op-1"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "op-1"})))
        .expect(2)
        .mount(&server)
        .await;

    let client = JohnDeereClient::new(settings(&server))?;
    client.get_field_operation("op-1").await?;
    let second = client.get_field_operation("op-1").await?;

    assert_eq!(second, Some(json!({"id": "op-1"})));
    Ok(())
}

#[tokio::test]
async fn out_of_range_token_lifetime_is_a_decode_error() -> GatewayResult<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "t",
            "expires_in": 9_000_000_000_000_000_000_i64
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fieldOperations/op-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "op-1"})))
        .expect(0)
        .mount(&server)
        .await;

    let client = JohnDeereClient::new(settings(&server))?;
    let result = client.get_field_operation("op-1").await;

    assert!(matches!(result, Err(GatewayError::Decode(_))));
    Ok(())
}

#[tokio::test]
async fn unauthorized_response_refreshes_token_and_retries_once() -> GatewayResult<()> {
    let server = MockServer::start().await;
    mount_token(&server, "stale", Some(1)).await;
    mount_token(&server, "fresh", None).await;
    Mock::given(method("GET"))
        .and(path("/fieldOperations/op-1"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fieldOperations/op-1"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "op-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = JohnDeereClient::new(settings(&server))?;
    let operation = client.get_field_operation("op-1").await?;

    assert_eq!(operation, Some(json!({"id": "op-1"})));
    Ok(())
}

#[tokio::test]
async fn second_unauthorized_response_is_an_error() -> GatewayResult<()> {
    let server = MockServer::start().await;
    mount_token(&server, "t", None).await;
    Mock::given(method("GET"))
        .and(path("/fieldOperations/op-1"))
        .respond_with(ResponseTemplate::new(401).set_body_string("nope"))
        .expect(2)
        .mount(&server)
        .await;

    let client = JohnDeereClient::new(settings(&server))?;
    let result = client.get_field_operation("op-1").await;

    assert!(matches!(result, Err(GatewayError::Status { status: 401, .. })));
    Ok(())
}

#[tokio::test]
async fn listing_pages_until_reported_total() -> GatewayResult<()> {
    let server = MockServer::start().await;
    mount_token(&server, "t", None).await;
    Mock::given(method("GET"))
        .and(path("/equipment"))
        .and(query_param("organizationIds", "org-1"))
        .and(query_param("pageOffset", "0"))
        .and(query_param("itemLimit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [{"id": "m-1"}, {"id": "m-2"}],
            "total": 3
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/equipment"))
        .and(query_param("pageOffset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [{"id": "m-3"}],
            "total": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = JohnDeereClient::new(VendorSettings {
        page_size: 2,
        ..settings(&server)
    })?;
    let equipment = client.list_equipment().await?;

    let ids: Vec<_> = equipment.values.iter().map(|m| m["id"].clone()).collect();
    assert_eq!(ids, vec![json!("m-1"), json!("m-2"), json!("m-3")]);
    Ok(())
}

#[tokio::test]
async fn empty_page_ends_listing_despite_inflated_total() -> GatewayResult<()> {
    let server = MockServer::start().await;
    mount_token(&server, "t", None).await;
    Mock::given(method("GET"))
        .and(path("/fields"))
        .and(query_param("organizationId", "org-1"))
        .and(query_param("pageOffset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [{"id": "f-1"}],
            "total": 50
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fields"))
        .and(query_param("pageOffset", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"values": [], "total": 50})))
        .expect(1)
        .mount(&server)
        .await;

    let client = JohnDeereClient::new(settings(&server))?;
    let fields = client.list_fields().await?;

    assert_eq!(fields.values.len(), 1);
    Ok(())
}

#[tokio::test]
async fn server_error_surfaces_as_status_error() -> GatewayResult<()> {
    let server = MockServer::start().await;
    mount_token(&server, "t", None).await;
    Mock::given(method("GET"))
        .and(path("/fieldOperations"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let client = JohnDeereClient::new(settings(&server))?;
    let result = client.list_field_operations().await;

    match result {
        Err(GatewayError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("expected a status error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn fake_token_skips_token_endpoint() -> GatewayResult<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fieldOperations/op-1"))
        .and(header("authorization", "Bearer static-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "op-1"})))
        .mount(&server)
        .await;

    let client = JohnDeereClient::new(VendorSettings {
        fake_token: Some("static-token".to_string()),
        ..settings(&server)
    })?;

    assert!(client.get_field_operation("op-1").await?.is_some());
    Ok(())
}

#[tokio::test]
async fn work_plan_mutations_hit_organization_paths() -> GatewayResult<()> {
    let server = MockServer::start().await;
    mount_token(&server, "t", None).await;
    let payload = json!({
        "fieldId": "field-1",
        "workType": "HARVEST",
        "startDate": "2024-01-01",
        "endDate": "2024-01-02",
        "status": "pending"
    });
    Mock::given(method("POST"))
        .and(path("/organizations/org-1/workPlans"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "wp-1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/organizations/org-1/workPlans/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "wp-1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/organizations/org-1/workPlans/1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = JohnDeereClient::new(settings(&server))?;

    assert_eq!(client.create_work_plan(&payload).await?, Some(json!({"id": "wp-1"})));
    assert!(client.update_work_plan(1, &payload).await?.is_some());
    assert_eq!(client.delete_work_plan(1).await?, None);
    Ok(())
}

#[tokio::test]
async fn measurements_can_be_narrowed_to_one_type() -> GatewayResult<()> {
    let server = MockServer::start().await;
    mount_token(&server, "t", None).await;
    Mock::given(method("GET"))
        .and(path("/fieldOperations/op-1/measurementTypes/HarvestYieldResult"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": 9.5})))
        .expect(1)
        .mount(&server)
        .await;

    let client = JohnDeereClient::new(settings(&server))?;
    let measurement = client
        .get_field_operation_measurements("op-1", Some("HarvestYieldResult"))
        .await?;

    assert_eq!(measurement, Some(json!({"value": 9.5})));
    Ok(())
}

#[tokio::test]
async fn slow_vendor_times_out() -> GatewayResult<()> {
    let server = MockServer::start().await;
    mount_token(&server, "t", None).await;
    Mock::given(method("GET"))
        .and(path("/fieldOperations/op-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "op-1"}))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = JohnDeereClient::new(VendorSettings {
        request_timeout_seconds: 1,
        ..settings(&server)
    })?;
    let result = client.get_field_operation("op-1").await;

    assert!(result.as_ref().is_err_and(GatewayError::is_timeout));
    Ok(())
}
