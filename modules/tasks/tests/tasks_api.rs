mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use tasks::config::TasksConfig;

use common::{app, call, call_raw, create, module_with};

#[tokio::test]
async fn create_returns_resource_and_location() {
    let app = app().await;
    let reply = call(
        &app,
        Method::POST,
        "/tasks",
        Some(json!({"title": "Buy milk", "completed": true})),
    )
    .await;

    assert_eq!(reply.status, StatusCode::CREATED);
    let id = reply.body["id"].as_i64().unwrap();
    assert_eq!(reply.header("location"), Some(format!("/tasks/{id}").as_str()));
    assert_eq!(reply.body["title"], "Buy milk");
    assert_eq!(reply.body["completed"], 1);
    let created_at = reply.body["created_at"].as_str().unwrap();
    assert_eq!(created_at.len(), "2024-01-01 00:00:00".len());
}

#[tokio::test]
async fn completed_defaults_to_false_and_reads_back_as_zero() {
    let app = app().await;
    let created = create(&app, json!({"title": "Example", "completed": false})).await;
    let id = created["id"].as_i64().unwrap();

    let reply = call(&app, Method::GET, &format!("/tasks/{id}"), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["completed"], 0);
    assert_eq!(reply.body["title"], "Example");

    let implicit = create(&app, json!({"title": "No flag"})).await;
    assert_eq!(implicit["completed"], 0);
}

#[tokio::test]
async fn repeated_get_is_stable() {
    let app = app().await;
    let id = create(&app, json!({"title": "Stable"})).await["id"].as_i64().unwrap();
    let uri = format!("/tasks/{id}");

    let first = call(&app, Method::GET, &uri, None).await;
    let second = call(&app, Method::GET, &uri, None).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body, second.body);
}

#[tokio::test]
async fn delete_removes_task_everywhere() {
    let app = app().await;
    let id = create(&app, json!({"title": "Buy milk"})).await["id"].as_i64().unwrap();
    let uri = format!("/tasks/{id}");

    let deleted = call(&app, Method::DELETE, &uri, None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert!(deleted.body.is_null());

    let gone = call(&app, Method::GET, &uri, None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body["detail"], "Task not found.");
    assert_eq!(gone.body["code"], "TASKS_NOT_FOUND");

    let again = call(&app, Method::DELETE, &uri, None).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);

    let list = call(&app, Method::GET, "/tasks", None).await;
    assert_eq!(list.body["meta"]["total"], 0);
    assert_eq!(list.body["data"], json!([]));
}

#[tokio::test]
async fn non_numeric_ids_are_not_found() {
    let app = app().await;
    for uri in ["/tasks/abc", "/tasks/0", "/tasks/-1"] {
        let reply = call(&app, Method::GET, uri, None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(reply.body["instance"], uri);
    }
}

#[tokio::test]
async fn create_validation_reports_every_field() {
    let app = app().await;
    let reply = call(
        &app,
        Method::POST,
        "/tasks",
        Some(json!({"title": "ab", "completed": "maybe"})),
    )
    .await;

    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(reply.body["code"], "TASKS_VALIDATION");
    let errors = reply.body["errors"].as_object().unwrap();
    assert_eq!(
        errors["title"],
        "The title field must be between 3 and 255 characters."
    );
    assert_eq!(errors["completed"], "invalid value for completed.");

    let list = call(&app, Method::GET, "/tasks", None).await;
    assert_eq!(list.body["meta"]["total"], 0);
}

#[tokio::test]
async fn missing_title_is_required() {
    let app = app().await;
    let reply = call(&app, Method::POST, "/tasks", Some(json!({"completed": 1}))).await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(reply.body["errors"]["title"], "The title field is required.");
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = app().await;
    let reply = call_raw(&app, Method::POST, "/tasks", "application/json", "{\"title\": ").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["code"], "TASKS_BODY_MALFORMED");

    let array = call_raw(&app, Method::POST, "/tasks", "application/json", "[1,2]").await;
    assert_eq!(array.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn form_bodies_are_accepted() {
    let app = app().await;
    let reply = call_raw(
        &app,
        Method::POST,
        "/tasks",
        "application/x-www-form-urlencoded",
        "title=Water+plants&completed=yes",
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body["title"], "Water plants");
    assert_eq!(reply.body["completed"], 1);
}

#[tokio::test]
async fn put_and_patch_update_only_sent_fields() {
    let app = app().await;
    let id = create(&app, json!({"title": "Draft"})).await["id"].as_i64().unwrap();
    let uri = format!("/tasks/{id}");

    let put = call(&app, Method::PUT, &uri, Some(json!({"completed": "on"}))).await;
    assert_eq!(put.status, StatusCode::OK);
    assert_eq!(put.body["title"], "Draft");
    assert_eq!(put.body["completed"], 1);

    let patch = call(&app, Method::PATCH, &uri, Some(json!({"title": "Final"}))).await;
    assert_eq!(patch.status, StatusCode::OK);
    assert_eq!(patch.body["title"], "Final");
    assert_eq!(patch.body["completed"], 1);
}

#[tokio::test]
async fn update_validation_errors_leave_row_untouched() {
    let app = app().await;
    let id = create(&app, json!({"title": "Keep me"})).await["id"].as_i64().unwrap();
    let uri = format!("/tasks/{id}");

    let reply = call(&app, Method::PATCH, &uri, Some(json!({"title": 42}))).await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(reply.body["errors"]["title"], "The title field must be a string.");

    let current = call(&app, Method::GET, &uri, None).await;
    assert_eq!(current.body["title"], "Keep me");
}

#[tokio::test]
async fn update_of_missing_task_is_not_found_even_with_bad_body() {
    let app = app().await;
    let reply = call(&app, Method::PUT, "/tasks/999", Some(json!({"title": "x"}))).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_update_returns_current_state() {
    let app = app().await;
    let created = create(&app, json!({"title": "Unchanged"})).await;
    let id = created["id"].as_i64().unwrap();

    let reply = call(&app, Method::PATCH, &format!("/tasks/{id}"), Some(json!({"id": 5}))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, created);
}

#[tokio::test]
async fn invalid_list_query_reports_all_keys() {
    let app = app().await;
    let reply = call(&app, Method::GET, "/tasks?per_page=1000&sort=invalid", None).await;

    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = reply.body["errors"].as_object().unwrap();
    assert!(errors.contains_key("per_page"));
    assert!(errors.contains_key("sort"));
    assert_eq!(errors.len(), 2);
}

#[tokio::test]
async fn search_and_completed_filters_combine() {
    let app = app().await;
    create(&app, json!({"title": "Alpha", "completed": false})).await;
    create(&app, json!({"title": "Alameda", "completed": true})).await;
    create(&app, json!({"title": "Beta", "completed": true})).await;

    let reply = call(&app, Method::GET, "/tasks?completed=true&search=Al", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    let titles: Vec<&str> = reply.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Alameda"]);
    assert_eq!(reply.body["meta"]["filters"]["search"], "Al");
    assert_eq!(reply.body["meta"]["filters"]["completed"], true);

    let open = call(&app, Method::GET, "/tasks?search=AL&completed=NO", None).await;
    assert_eq!(open.body["meta"]["total"], 1);
    assert_eq!(open.body["data"][0]["title"], "Alpha");
}

#[tokio::test]
async fn search_treats_wildcards_literally() {
    let app = app().await;
    create(&app, json!({"title": "50% off sale"})).await;
    create(&app, json!({"title": "500 items"})).await;

    let reply = call(&app, Method::GET, "/tasks?search=0%25", None).await;
    assert_eq!(reply.body["meta"]["total"], 1);
    assert_eq!(reply.body["data"][0]["title"], "50% off sale");
}

#[tokio::test]
async fn pagination_sets_headers_and_links() {
    let app = app().await;
    for title in ["one", "two", "three", "four", "five"] {
        create(&app, json!({ "title": title })).await;
    }

    let reply = call(&app, Method::GET, "/tasks?sort=id&per_page=2&page=2", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.header("x-total-count"), Some("5"));

    let meta = &reply.body["meta"];
    assert_eq!(meta["page"], 2);
    assert_eq!(meta["per_page"], 2);
    assert_eq!(meta["total"], 5);
    assert_eq!(meta["total_pages"], 3);
    assert_eq!(meta["sort"], "id");

    let titles: Vec<&str> = reply.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["three", "four"]);

    let links = &reply.body["links"];
    assert_eq!(links["next"], "/tasks?sort=id&page=3&per_page=2");
    assert_eq!(links["prev"], "/tasks?sort=id&page=1&per_page=2");
    assert_eq!(links["first"], "/tasks?sort=id&page=1&per_page=2");
    assert_eq!(links["last"], "/tasks?sort=id&page=3&per_page=2");

    let link = reply.header("link").unwrap();
    let next_at = link.find("rel=\"next\"").unwrap();
    let prev_at = link.find("rel=\"prev\"").unwrap();
    let first_at = link.find("rel=\"first\"").unwrap();
    let last_at = link.find("rel=\"last\"").unwrap();
    assert!(next_at < prev_at && prev_at < first_at && first_at < last_at);
}

#[tokio::test]
async fn page_past_the_end_is_empty_but_valid() {
    let app = app().await;
    create(&app, json!({"title": "only"})).await;

    let reply = call(&app, Method::GET, "/tasks?page=9", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["data"], json!([]));
    assert_eq!(reply.body["meta"]["total_pages"], 1);
    assert!(reply.body["links"]["next"].is_null());
}

#[tokio::test]
async fn huge_page_numbers_are_empty_pages() {
    let app = app().await;
    create(&app, json!({"title": "only"})).await;

    for uri in [
        "/tasks?page=18446744073709551615",
        "/tasks?page=9223372036854775807&per_page=100",
    ] {
        let reply = call(&app, Method::GET, uri, None).await;
        assert_eq!(reply.status, StatusCode::OK, "{uri}");
        assert_eq!(reply.body["data"], json!([]));
        assert_eq!(reply.body["meta"]["total"], 1);
        assert_eq!(reply.body["meta"]["total_pages"], 1);
        assert!(reply.body["links"]["next"].is_null());
        assert_eq!(reply.header("x-total-count"), Some("1"));
    }
}

#[tokio::test]
async fn search_folds_non_ascii_case() {
    let app = app().await;
    create(&app, json!({"title": "Ärger im Büro"})).await;
    create(&app, json!({"title": "Arbeit"})).await;

    for query in ["search=%C3%A4rger", "search=B%C3%9CRO", "search=%C3%84RGER"] {
        let reply = call(&app, Method::GET, &format!("/tasks?{query}"), None).await;
        assert_eq!(reply.body["meta"]["total"], 1, "{query}");
        assert_eq!(reply.body["data"][0]["title"], "Ärger im Büro");
    }

    let id = create(&app, json!({"title": "Straße"})).await["id"].as_i64().unwrap();
    call(&app, Method::PATCH, &format!("/tasks/{id}"), Some(json!({"title": "ÜBERGANG"}))).await;
    let renamed = call(&app, Method::GET, "/tasks?search=%C3%BCbergang", None).await;
    assert_eq!(renamed.body["meta"]["total"], 1);
}

#[tokio::test]
async fn empty_collection_has_one_page() {
    let app = app().await;
    let reply = call(&app, Method::GET, "/tasks", None).await;
    assert_eq!(reply.header("x-total-count"), Some("0"));
    assert_eq!(reply.body["meta"]["total_pages"], 1);
    assert_eq!(reply.body["meta"]["sort"], "-created_at");
    assert!(reply.body["links"]["prev"].is_null());
}

#[tokio::test]
async fn descending_sort_breaks_ties_by_id() {
    let app = app().await;
    let mut ids = Vec::new();
    for title in ["same second a", "same second b", "same second c"] {
        ids.push(create(&app, json!({ "title": title })).await["id"].as_i64().unwrap());
    }

    let reply = call(&app, Method::GET, "/tasks?sort=-id", None).await;
    let got: Vec<i64> = reply.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    ids.reverse();
    assert_eq!(got, ids);

    let by_title = call(&app, Method::GET, "/tasks?sort=title", None).await;
    assert_eq!(by_title.body["data"][0]["title"], "same second a");
}

#[tokio::test]
async fn public_url_prefixes_links_and_location() {
    let module = module_with(TasksConfig {
        public_url: "https://api.example.com/".to_string(),
        ..TasksConfig::default()
    })
    .await;
    let app = module.router();

    let reply = call(&app, Method::POST, "/tasks", Some(json!({"title": "Remote"}))).await;
    let id = reply.body["id"].as_i64().unwrap();
    assert_eq!(
        reply.header("location"),
        Some(format!("https://api.example.com/tasks/{id}").as_str())
    );

    let list = call(&app, Method::GET, "/tasks", None).await;
    assert_eq!(
        list.body["links"]["first"],
        "https://api.example.com/tasks?page=1&per_page=10"
    );
}

#[tokio::test]
async fn configured_page_limits_apply() {
    let module = module_with(TasksConfig {
        default_per_page: 2,
        max_per_page: 3,
        ..TasksConfig::default()
    })
    .await;
    let app = module.router();

    let defaults = call(&app, Method::GET, "/tasks", None).await;
    assert_eq!(defaults.body["meta"]["per_page"], 2);

    let too_big = call(&app, Method::GET, "/tasks?per_page=4", None).await;
    assert_eq!(too_big.status, StatusCode::UNPROCESSABLE_ENTITY);
}
