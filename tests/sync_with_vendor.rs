//! End-to-end synchronization run against a mock vendor API.

use agro_planner::{
    config::{VendorSettings, database},
    core::{field, machine, scheduler_run, sync},
    errors::{Error, Result},
    gateway::JohnDeereClient,
};
use sea_orm::{Database, DatabaseConnection};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

async fn setup_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    database::create_tables(&db).await?;
    Ok(db)
}

async fn vendor(server: &MockServer) -> Result<JohnDeereClient> {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "t", "expires_in": 3600})),
        )
        .mount(server)
        .await;
    Ok(JohnDeereClient::new(VendorSettings {
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        org_id: "org-1".to_string(),
        auth_url: format!("{}/oauth/token", server.uri()),
        api_base: server.uri(),
        ..VendorSettings::default()
    })?)
}

#[tokio::test]
async fn sync_run_mirrors_vendor_collections() -> Result<()> {
    let server = MockServer::start().await;
    let client = vendor(&server).await?;
    Mock::given(method("GET"))
        .and(path("/equipment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [
                {
                    "id": "m-1",
                    "displayName": "Cosechadora S780",
                    "category": "Combine",
                    "location": {"latitude": -33.1, "longitude": -60.2},
                    "lastUpdated": "2024-05-01T08:00:00Z"
                },
                {"displayName": "no id, skipped"}
            ],
            "total": 2
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [{"id": "f-1", "name": "Lote Norte", "cropType": "soy"}],
            "total": 1
        })))
        .mount(&server)
        .await;
    let db = setup_db().await?;

    let run = sync::run_once(&db, &client).await?;

    assert_eq!(run.machines_synced, 1);
    assert_eq!(run.fields_synced, 1);
    let machines = machine::list_machines(&db).await?;
    assert_eq!(machines[0].name.as_deref(), Some("Cosechadora S780"));
    assert!(machines[0].last_update.is_some());
    assert_eq!(field::list_fields(&db).await?[0].crop_type.as_deref(), Some("soy"));
    assert_eq!(scheduler_run::list_runs(&db, 10).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn vendor_failure_aborts_run_before_writing() -> Result<()> {
    let server = MockServer::start().await;
    let client = vendor(&server).await?;
    Mock::given(method("GET"))
        .and(path("/equipment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"values": [{"id": "m-1"}]})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fields"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let db = setup_db().await?;

    let result = sync::run_once(&db, &client).await;

    assert!(matches!(result, Err(Error::Gateway(_))));
    assert!(machine::list_machines(&db).await?.is_empty());
    assert!(scheduler_run::latest_run(&db).await?.is_none());
    Ok(())
}
