use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, App};
use serde::de::DeserializeOwned;
use serde_json::json;
use tempdir::TempDir;

use org_directory::db::executor::DbExecutor;
use org_directory::db::migrations;
use org_directory::model::{Activity, Building, ErrorMessage, Organization};
use org_directory::web_scope;

async fn init_app(
    test_name: &str,
) -> (
    TempDir,
    impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
) {
    let dir = TempDir::new(test_name).unwrap();
    let db = DbExecutor::from_data_dir(dir.path(), "directory").unwrap();
    db.apply_migration(migrations::run_with_output).unwrap();
    let app = test::init_service(App::new().service(web_scope(&db))).await;
    (dir, app)
}

async fn read_json<T: DeserializeOwned>(resp: ServiceResponse) -> T {
    let body = test::read_body(resp).await;
    serde_json::from_slice(&body)
        .unwrap_or_else(|e| panic!("invalid json response: {}: {:?}", e, body))
}

async fn get<S>(app: &S, uri: &str) -> ServiceResponse
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    test::call_service(app, test::TestRequest::get().uri(uri).to_request()).await
}

async fn post_json<S>(app: &S, uri: &str, body: serde_json::Value) -> ServiceResponse
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri(uri)
        .set_json(&body)
        .to_request();
    test::call_service(app, req).await
}

async fn put_json<S>(app: &S, uri: &str, body: serde_json::Value) -> ServiceResponse
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::put()
        .uri(uri)
        .set_json(&body)
        .to_request();
    test::call_service(app, req).await
}

async fn delete<S>(app: &S, uri: &str) -> ServiceResponse
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    test::call_service(app, test::TestRequest::delete().uri(uri).to_request()).await
}

async fn create_building<S>(app: &S, address: &str, latitude: f64, longitude: f64) -> Building
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let resp = post_json(
        app,
        "/api/buildings",
        json!({ "address": address, "latitude": latitude, "longitude": longitude }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    read_json(resp).await
}

async fn create_activity<S>(app: &S, name: &str, parent_id: Option<i32>) -> Activity
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let resp = post_json(
        app,
        "/api/activities",
        json!({ "name": name, "parent_id": parent_id }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    read_json(resp).await
}

async fn create_organization<S>(
    app: &S,
    name: &str,
    building_id: i32,
    activities: &[i32],
) -> Organization
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let resp = post_json(
        app,
        "/api/organizations",
        json!({
            "name": name,
            "phone_numbers": ["2-222-222", "3-333-333"],
            "building_id": building_id,
            "activities": activities,
        }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    read_json(resp).await
}

fn names(organizations: &[Organization]) -> Vec<&str> {
    organizations.iter().map(|o| o.name.as_str()).collect()
}

#[actix_rt::test]
async fn test_building_crud() {
    let (_dir, app) = init_app("building_crud").await;

    let first = create_building(&app, "1 Main St", 55.0, 37.0).await;
    let second = create_building(&app, "2 Main St", 56.0, 38.0).await;

    // index is id-descending
    let resp = get(&app, "/api/buildings").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let list: Vec<Building> = read_json(resp).await;
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].id, second.id);
    assert_eq!(list[1].id, first.id);

    // partial update touches only the provided fields
    let resp = put_json(
        &app,
        &format!("/api/buildings/{}", first.id),
        json!({ "address": "1 Main St, floor 2" }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Building = read_json(resp).await;
    assert_eq!(updated.address, "1 Main St, floor 2");
    assert_eq!(updated.latitude, first.latitude);
    assert_eq!(updated.longitude, first.longitude);

    let resp = delete(&app, &format!("/api/buildings/{}", first.id)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = get(&app, &format!("/api/buildings/{}", first.id)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let error: ErrorMessage = read_json(resp).await;
    assert_eq!(error.message, "Building not found");
}

#[actix_rt::test]
async fn test_building_validation() {
    let (_dir, app) = init_app("building_validation").await;

    let resp = post_json(&app, "/api/buildings", json!({})).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = read_json(resp).await;
    assert_eq!(body["message"], "Validation failed");
    for field in ["address", "latitude", "longitude"].iter() {
        assert!(body["errors"][field].is_array(), "missing error for {}", field);
    }

    // out-of-range coordinates are rejected on create
    let resp = post_json(
        &app,
        "/api/buildings",
        json!({ "address": "Nowhere", "latitude": 91.0, "longitude": 181.0 }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = read_json(resp).await;
    assert!(body["errors"]["latitude"].is_array());
    assert!(body["errors"]["longitude"].is_array());

    // and on update
    let building = create_building(&app, "1 Main St", 55.0, 37.0).await;
    let resp = put_json(
        &app,
        &format!("/api/buildings/{}", building.id),
        json!({ "latitude": -90.5 }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_activity_delete_with_children_fails() {
    let (_dir, app) = init_app("activity_children").await;

    let root = create_activity(&app, "Root", None).await;
    let child = create_activity(&app, "Child", Some(root.id)).await;

    let resp = delete(&app, &format!("/api/activities/{}", root.id)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = read_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("child activities"));

    // leaf first, then the root
    let resp = delete(&app, &format!("/api/activities/{}", child.id)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = delete(&app, &format!("/api/activities/{}", root.id)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = delete(&app, &format!("/api/activities/{}", root.id)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_activity_show_includes_children() {
    let (_dir, app) = init_app("activity_children_listing").await;

    let root = create_activity(&app, "Root", None).await;
    let child_a = create_activity(&app, "Child A", Some(root.id)).await;
    let _grandchild = create_activity(&app, "Grandchild", Some(child_a.id)).await;

    let resp = get(&app, &format!("/api/activities/{}", root.id)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Activity = read_json(resp).await;
    let children = fetched.children.unwrap();
    // one level only
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id, child_a.id);
    assert!(children[0].children.is_none());

    // invalid parent reference is a validation failure
    let resp = post_json(
        &app,
        "/api/activities",
        json!({ "name": "Orphan", "parent_id": 9999 }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = read_json(resp).await;
    assert!(body["errors"]["parent_id"].is_array());
}

#[actix_rt::test]
async fn test_organization_crud_and_link_replace() {
    let (_dir, app) = init_app("organization_crud").await;

    let building = create_building(&app, "1 Main St", 55.0, 37.0).await;
    let a = create_activity(&app, "A", None).await;
    let x = create_activity(&app, "X", None).await;
    let y = create_activity(&app, "Y", None).await;

    let organization = create_organization(&app, "Acme", building.id, &[a.id]).await;
    assert_eq!(organization.phone_numbers, vec!["2-222-222", "3-333-333"]);
    assert_eq!(organization.building.as_ref().unwrap().id, building.id);
    let linked: Vec<i32> = organization
        .activities
        .as_ref()
        .unwrap()
        .iter()
        .map(|activity| activity.id)
        .collect();
    assert_eq!(linked, vec![a.id]);

    // updating the activity set replaces it wholesale
    let resp = put_json(
        &app,
        &format!("/api/organizations/{}", organization.id),
        json!({ "activities": [x.id, y.id] }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Organization = read_json(resp).await;
    let mut linked: Vec<i32> = updated
        .activities
        .unwrap()
        .iter()
        .map(|activity| activity.id)
        .collect();
    linked.sort_unstable();
    assert_eq!(linked, vec![x.id, y.id]);
    // untouched fields survive
    assert_eq!(updated.name, "Acme");

    let resp = delete(&app, &format!("/api/organizations/{}", organization.id)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = get(&app, &format!("/api/organizations/{}", organization.id)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let error: ErrorMessage = read_json(resp).await;
    assert_eq!(error.message, "Organization not found");
}

#[actix_rt::test]
async fn test_organization_validation() {
    let (_dir, app) = init_app("organization_validation").await;

    let resp = post_json(&app, "/api/organizations", json!({})).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = read_json(resp).await;
    for field in ["name", "phone_numbers", "building_id", "activities"].iter() {
        assert!(body["errors"][field].is_array(), "missing error for {}", field);
    }

    // dangling references are validation failures, not 500s
    let resp = post_json(
        &app,
        "/api/organizations",
        json!({
            "name": "Ghost",
            "phone_numbers": ["1-111-111"],
            "building_id": 9999,
            "activities": [8888],
        }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = read_json(resp).await;
    assert!(body["errors"]["building_id"].is_array());
    assert!(body["errors"]["activities"].is_array());
}

#[actix_rt::test]
async fn test_search_exact_vs_recursive() {
    let (_dir, app) = init_app("search_recursive").await;

    let building = create_building(&app, "Tverskaya 1", 55.7512, 37.6184).await;
    let root = create_activity(&app, "Root", None).await;
    let child = create_activity(&app, "Child", Some(root.id)).await;
    create_organization(&app, "Acme", building.id, &[child.id]).await;

    // recursive search finds the organization through the child link
    let resp = get(&app, &format!("/api/organizations/search/activity/{}", root.id)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let found: Vec<Organization> = read_json(resp).await;
    assert_eq!(names(&found), vec!["Acme"]);

    // exact lookup on the root does not
    let resp = get(&app, &format!("/api/organizations/activity/{}", root.id)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let found: Vec<Organization> = read_json(resp).await;
    assert!(found.is_empty());

    // exact lookup on the child does
    let resp = get(&app, &format!("/api/organizations/activity/{}", child.id)).await;
    let found: Vec<Organization> = read_json(resp).await;
    assert_eq!(names(&found), vec!["Acme"]);

    // the depth-limited variant still reaches depth 2
    let resp = get(
        &app,
        &format!("/api/organizations/search/activity/limited/{}", root.id),
    )
    .await;
    let found: Vec<Organization> = read_json(resp).await;
    assert_eq!(names(&found), vec!["Acme"]);

    // unknown activity is a 404 on every lookup flavor
    for uri in [
        "/api/organizations/activity/9999",
        "/api/organizations/search/activity/9999",
        "/api/organizations/search/activity/limited/9999",
    ]
    .iter()
    {
        let resp = get(&app, uri).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "for {}", uri);
    }
}

#[actix_rt::test]
async fn test_limited_search_depth_bound() {
    let (_dir, app) = init_app("search_limited").await;

    let building = create_building(&app, "Tverskaya 1", 55.7512, 37.6184).await;
    let root = create_activity(&app, "Depth1", None).await;
    let level2 = create_activity(&app, "Depth2", Some(root.id)).await;
    let level3 = create_activity(&app, "Depth3", Some(level2.id)).await;
    let level4 = create_activity(&app, "Depth4", Some(level3.id)).await;

    create_organization(&app, "Shallow", building.id, &[level3.id]).await;
    create_organization(&app, "Deep", building.id, &[level4.id]).await;

    // unbounded search sees the whole subtree
    let resp = get(&app, &format!("/api/organizations/search/activity/{}", root.id)).await;
    let found: Vec<Organization> = read_json(resp).await;
    let mut all = names(&found);
    all.sort_unstable();
    assert_eq!(all, vec!["Deep", "Shallow"]);

    // the limited search stops at depth 3
    let resp = get(
        &app,
        &format!("/api/organizations/search/activity/limited/{}", root.id),
    )
    .await;
    let found: Vec<Organization> = read_json(resp).await;
    assert_eq!(names(&found), vec!["Shallow"]);
}

#[actix_rt::test]
async fn test_organization_appears_once_with_two_matching_links() {
    let (_dir, app) = init_app("search_distinct").await;

    let building = create_building(&app, "Tverskaya 1", 55.7512, 37.6184).await;
    let root = create_activity(&app, "Root", None).await;
    let left = create_activity(&app, "Left", Some(root.id)).await;
    let right = create_activity(&app, "Right", Some(root.id)).await;
    create_organization(&app, "Acme", building.id, &[left.id, right.id]).await;

    let resp = get(&app, &format!("/api/organizations/search/activity/{}", root.id)).await;
    let found: Vec<Organization> = read_json(resp).await;
    assert_eq!(names(&found), vec!["Acme"]);
}

#[actix_rt::test]
async fn test_organizations_by_building() {
    let (_dir, app) = init_app("by_building").await;

    let occupied = create_building(&app, "1 Main St", 55.0, 37.0).await;
    let empty = create_building(&app, "2 Main St", 56.0, 38.0).await;
    let activity = create_activity(&app, "Any", None).await;
    create_organization(&app, "Acme", occupied.id, &[activity.id]).await;

    let resp = get(&app, &format!("/api/organizations/building/{}", occupied.id)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let found: Vec<Organization> = read_json(resp).await;
    assert_eq!(names(&found), vec!["Acme"]);

    let resp = get(&app, &format!("/api/organizations/building/{}", empty.id)).await;
    let found: Vec<Organization> = read_json(resp).await;
    assert!(found.is_empty());

    let resp = get(&app, "/api/organizations/building/9999").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let error: ErrorMessage = read_json(resp).await;
    assert_eq!(error.message, "Building not found");
}

#[actix_rt::test]
async fn test_search_by_name_substring() {
    let (_dir, app) = init_app("by_name").await;

    let building = create_building(&app, "1 Main St", 55.0, 37.0).await;
    let activity = create_activity(&app, "Any", None).await;
    create_organization(&app, "Acme Coffee", building.id, &[activity.id]).await;
    create_organization(&app, "Blue Bakery", building.id, &[activity.id]).await;

    let resp = get(&app, "/api/organizations/search/name/cme").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let found: Vec<Organization> = read_json(resp).await;
    assert_eq!(names(&found), vec!["Acme Coffee"]);
    // building comes along eagerly
    assert_eq!(found[0].building.as_ref().unwrap().id, building.id);

    // no match is an empty 200, not an error
    let resp = get(&app, "/api/organizations/search/name/zzz").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let found: Vec<Organization> = read_json(resp).await;
    assert!(found.is_empty());
}

#[actix_rt::test]
async fn test_radius_search() {
    let (_dir, app) = init_app("radius").await;

    let near = create_building(&app, "Red Square", 55.7512, 37.6184).await;
    let far = create_building(&app, "Palace Square", 59.9390, 30.3158).await;
    let activity = create_activity(&app, "Any", None).await;
    create_organization(&app, "Near Org", near.id, &[activity.id]).await;
    create_organization(&app, "Far Org", far.id, &[activity.id]).await;

    let resp = post_json(
        &app,
        "/api/organizations/radius",
        json!({ "latitude": 55.75, "longitude": 37.62, "radius": 1 }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let found: Vec<Organization> = read_json(resp).await;
    assert_eq!(names(&found), vec!["Near Org"]);
    assert!(found[0].building.is_some());

    // a big enough radius catches both
    let resp = post_json(
        &app,
        "/api/organizations/radius",
        json!({ "latitude": 55.75, "longitude": 37.62, "radius": 1000 }),
    )
    .await;
    let found: Vec<Organization> = read_json(resp).await;
    assert_eq!(found.len(), 2);

    // radius zero matches only the exact coordinates
    let resp = post_json(
        &app,
        "/api/organizations/radius",
        json!({ "latitude": 55.7512, "longitude": 37.6184, "radius": 0 }),
    )
    .await;
    let found: Vec<Organization> = read_json(resp).await;
    assert_eq!(names(&found), vec!["Near Org"]);

    // all three fields are mandatory
    let resp = post_json(
        &app,
        "/api/organizations/radius",
        json!({ "latitude": 55.75, "longitude": 37.62 }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = read_json(resp).await;
    assert!(body["errors"]["radius"].is_array());

    // out-of-range coordinates are accepted here, unlike building creation
    let resp = post_json(
        &app,
        "/api/organizations/radius",
        json!({ "latitude": 120.0, "longitude": 200.0, "radius": 5 }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_organization_index_eager_relations() {
    let (_dir, app) = init_app("org_index").await;

    let building = create_building(&app, "1 Main St", 55.0, 37.0).await;
    let activity = create_activity(&app, "Any", None).await;
    create_organization(&app, "First", building.id, &[activity.id]).await;
    create_organization(&app, "Second", building.id, &[activity.id]).await;

    let resp = get(&app, "/api/organizations").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let list: Vec<Organization> = read_json(resp).await;
    // id-descending, with building and activities loaded
    assert_eq!(names(&list), vec!["Second", "First"]);
    for organization in &list {
        assert!(organization.building.is_some());
        assert!(organization.activities.is_some());
    }
}

#[actix_rt::test]
async fn test_malformed_path_id_is_bad_request() {
    let (_dir, app) = init_app("bad_path").await;

    let resp = get(&app, "/api/buildings/not-a-number").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
