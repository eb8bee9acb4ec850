mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{terms, TestApp};

/// Glossary with six entries; only Cherry ("for") and orange contain "or"
async fn seeded_fruit(app: &TestApp, token: &str) -> Result<i64> {
    let id = app.create_glossary(token, "Fruit").await?;
    for (term, definition) in [
        ("Banana", "Yellow fruit"),
        ("apple", "A fruit"),
        ("Cherry", "Red, for pies"),
        ("blueberry", "Small and blue"),
        ("Éclair", "Pastry"),
        ("orange", "Citrus"),
    ] {
        app.create_entry(token, id, term, definition).await?;
    }
    Ok(id)
}

#[tokio::test]
async fn entry_round_trip_trims_input() -> Result<()> {
    let app = TestApp::new();
    let token = app.token_for("alice");
    let glossary = app.create_glossary(&token, "Kotlin").await?;

    let (status, created) = app
        .post(
            &format!("/api/glossaries/{}/entries", glossary),
            &token,
            json!({ "term": "  Coroutine ", "definition": "**Suspendable** computation\n", "imageUrl": " " }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "body: {}", created);
    assert_eq!(created["data"]["term"], "Coroutine");
    assert_eq!(created["data"]["definition"], "**Suspendable** computation");
    assert!(created["data"]["imageUrl"].is_null());
    assert_eq!(created["data"]["glossaryId"], glossary);

    let id = created["data"]["id"].as_i64().expect("id");
    let (status, fetched) = app.get(&format!("/api/entries/{}", id), &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"], created["data"]);
    Ok(())
}

#[tokio::test]
async fn missing_fields_report_each_field() -> Result<()> {
    let app = TestApp::new();
    let token = app.token_for("alice");
    let glossary = app.create_glossary(&token, "Kotlin").await?;

    let (status, body) = app
        .post(&format!("/api/glossaries/{}/entries", glossary), &token, json!({}))
        .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["term"].is_string());
    assert!(body["field_errors"]["definition"].is_string());

    let (_, list) = app.get(&format!("/api/glossaries/{}/entries", glossary), &token).await?;
    assert_eq!(list["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn create_in_missing_or_foreign_glossary_is_not_found() -> Result<()> {
    let app = TestApp::new();
    let alice = app.token_for("alice");
    let bob = app.token_for("bob");
    let glossary = app.create_glossary(&alice, "Private").await?;

    let body = json!({ "term": "Term", "definition": "Definition" });

    let (status, missing) = app.post("/api/glossaries/9999/entries", &alice, body.clone()).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["code"], "NOT_FOUND");

    let (status, _) = app
        .post(&format!("/api/glossaries/{}/entries", glossary), &bob, body)
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = app.get(&format!("/api/glossaries/{}/entries", glossary), &alice).await?;
    assert_eq!(list["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn update_changes_only_given_fields() -> Result<()> {
    let app = TestApp::new();
    let token = app.token_for("alice");
    let glossary = app.create_glossary(&token, "Kotlin").await?;
    let entry = app.create_entry(&token, glossary, "Flow", "Cold stream").await?;
    let id = entry["id"].as_i64().expect("id");
    let uri = format!("/api/entries/{}", id);

    let (status, updated) = app
        .patch(&uri, &token, json!({ "imageUrl": "https://cdn.test/flow.png" }))
        .await?;
    assert_eq!(status, StatusCode::OK, "body: {}", updated);
    assert_eq!(updated["data"]["term"], "Flow");
    assert_eq!(updated["data"]["definition"], "Cold stream");
    assert_eq!(updated["data"]["imageUrl"], "https://cdn.test/flow.png");

    let (_, updated) = app.patch(&uri, &token, json!({ "definition": "Cold *async* stream" })).await?;
    assert_eq!(updated["data"]["definition"], "Cold *async* stream");
    assert_eq!(updated["data"]["imageUrl"], "https://cdn.test/flow.png");

    let (_, cleared) = app.patch(&uri, &token, json!({ "imageUrl": "" })).await?;
    assert!(cleared["data"]["imageUrl"].is_null());
    assert_eq!(cleared["data"]["term"], "Flow");
    Ok(())
}

#[tokio::test]
async fn update_rejects_blank_term() -> Result<()> {
    let app = TestApp::new();
    let token = app.token_for("alice");
    let glossary = app.create_glossary(&token, "Kotlin").await?;
    let entry = app.create_entry(&token, glossary, "Flow", "Cold stream").await?;

    let (status, body) = app
        .patch(&format!("/api/entries/{}", entry["id"]), &token, json!({ "term": "  " }))
        .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["term"].is_string());

    let (_, fetched) = app.get(&format!("/api/entries/{}", entry["id"]), &token).await?;
    assert_eq!(fetched["data"]["term"], "Flow");
    Ok(())
}

#[tokio::test]
async fn delete_removes_the_entry() -> Result<()> {
    let app = TestApp::new();
    let token = app.token_for("alice");
    let glossary = app.create_glossary(&token, "Kotlin").await?;
    let entry = app.create_entry(&token, glossary, "Flow", "Cold stream").await?;
    let uri = format!("/api/entries/{}", entry["id"]);

    let (status, body) = app.delete(&uri, &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], true);

    let (status, fetched) = app.get(&uri, &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(fetched["data"].is_null());

    let (status, again) = app.delete(&uri, &token).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(again["code"], "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn writes_to_missing_entries_are_not_found() -> Result<()> {
    let app = TestApp::new();
    let token = app.token_for("alice");

    let (status, _) = app.patch("/api/entries/4242", &token, json!({ "term": "New" })).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete("/api/entries/4242", &token).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn entries_of_other_users_look_missing() -> Result<()> {
    let app = TestApp::new();
    let alice = app.token_for("alice");
    let bob = app.token_for("bob");
    let glossary = app.create_glossary(&alice, "Private").await?;
    let entry = app.create_entry(&alice, glossary, "Secret", "Hidden").await?;
    let uri = format!("/api/entries/{}", entry["id"]);

    let (_, fetched) = app.get(&uri, &bob).await?;
    assert!(fetched["data"].is_null());

    let (status, _) = app.patch(&uri, &bob, json!({ "term": "Stolen" })).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&uri, &bob).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = app.get(&format!("/api/glossaries/{}/entries", glossary), &bob).await?;
    assert_eq!(list["data"], json!([]));

    let (_, still_there) = app.get(&uri, &alice).await?;
    assert_eq!(still_there["data"]["term"], "Secret");
    Ok(())
}

#[tokio::test]
async fn search_matches_term_or_definition_case_insensitively() -> Result<()> {
    let app = TestApp::new();
    let token = app.token_for("alice");
    let glossary = seeded_fruit(&app, &token).await?;

    let (status, found) = app
        .get(&format!("/api/glossaries/{}/entries/search?q=OR", glossary), &token)
        .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(terms(&found["data"]), vec!["Cherry", "orange"]);
    Ok(())
}

#[tokio::test]
async fn blank_or_misdirected_search_is_empty() -> Result<()> {
    let app = TestApp::new();
    let token = app.token_for("alice");
    let glossary = seeded_fruit(&app, &token).await?;

    for uri in [
        format!("/api/glossaries/{}/entries/search?q=", glossary),
        format!("/api/glossaries/{}/entries/search?q=%20%20", glossary),
        format!("/api/glossaries/{}/entries/search", glossary),
        "/api/glossaries/9999/entries/search?q=or".to_string(),
    ] {
        let (status, body) = app.get(&uri, &token).await?;
        assert_eq!(status, StatusCode::OK, "{} answered {}", uri, body);
        assert_eq!(body["data"], json!([]), "{} should match nothing", uri);
    }
    Ok(())
}

#[tokio::test]
async fn search_treats_like_wildcards_literally() -> Result<()> {
    let app = TestApp::new();
    let token = app.token_for("alice");
    let glossary = app.create_glossary(&token, "Ops").await?;
    app.create_entry(&token, glossary, "Percent", "100% literal").await?;
    app.create_entry(&token, glossary, "Plain", "nothing special").await?;

    let (_, found) = app
        .get(&format!("/api/glossaries/{}/entries/search?q=%25", glossary), &token)
        .await?;

    assert_eq!(terms(&found["data"]), vec!["Percent"]);
    Ok(())
}

#[tokio::test]
async fn search_keeps_surrounding_spaces() -> Result<()> {
    let app = TestApp::new();
    let token = app.token_for("alice");
    let glossary = app.create_glossary(&token, "Kitchen").await?;
    app.create_entry(&token, glossary, "Ice cream", "Frozen dessert").await?;
    app.create_entry(&token, glossary, "Icebox", "Old fridge").await?;

    let (_, found) = app
        .get(&format!("/api/glossaries/{}/entries/search?q=e%20", glossary), &token)
        .await?;
    assert_eq!(terms(&found["data"]), vec!["Ice cream"]);

    let (_, view) = app
        .get(&format!("/api/glossaries/{}/view?search=e%20", glossary), &token)
        .await?;
    assert_eq!(terms(&view["data"]["entries"]), vec!["Ice cream"]);
    Ok(())
}

#[tokio::test]
async fn view_sorts_and_groups_all_entries() -> Result<()> {
    let app = TestApp::new();
    let token = app.token_for("alice");
    let glossary = seeded_fruit(&app, &token).await?;

    let (status, view) = app.get(&format!("/api/glossaries/{}/view", glossary), &token).await?;

    assert_eq!(status, StatusCode::OK, "body: {}", view);
    assert_eq!(
        terms(&view["data"]["entries"]),
        vec!["apple", "Banana", "blueberry", "Cherry", "Éclair", "orange"]
    );
    let groups = &view["data"]["groups"];
    assert_eq!(terms(&groups["A"]), vec!["apple"]);
    assert_eq!(terms(&groups["B"]), vec!["Banana", "blueberry"]);
    assert_eq!(terms(&groups["É"]), vec!["Éclair"]);
    assert_eq!(groups.as_object().map(|g| g.len()), Some(5));
    Ok(())
}

#[tokio::test]
async fn view_filters_by_letter() -> Result<()> {
    let app = TestApp::new();
    let token = app.token_for("alice");
    let glossary = seeded_fruit(&app, &token).await?;

    let (_, view) = app
        .get(&format!("/api/glossaries/{}/view?letter=b", glossary), &token)
        .await?;

    assert_eq!(terms(&view["data"]["entries"]), vec!["Banana", "blueberry"]);
    let groups: Vec<&String> = view["data"]["groups"]
        .as_object()
        .map(|g| g.keys().collect())
        .unwrap_or_default();
    assert_eq!(groups, vec!["B"]);

    let (_, none) = app
        .get(&format!("/api/glossaries/{}/view?letter=Z", glossary), &token)
        .await?;
    assert_eq!(none["data"]["entries"], json!([]));
    assert_eq!(none["data"]["groups"], json!({}));
    Ok(())
}

#[tokio::test]
async fn view_search_overrides_letter() -> Result<()> {
    let app = TestApp::new();
    let token = app.token_for("alice");
    let glossary = seeded_fruit(&app, &token).await?;

    let (_, view) = app
        .get(&format!("/api/glossaries/{}/view?search=or&letter=B", glossary), &token)
        .await?;

    assert_eq!(terms(&view["data"]["entries"]), vec!["Cherry", "orange"]);
    assert_eq!(terms(&view["data"]["groups"]["C"]), vec!["Cherry"]);
    assert_eq!(terms(&view["data"]["groups"]["O"]), vec!["orange"]);
    assert!(view["data"]["groups"].get("B").is_none());
    Ok(())
}

#[tokio::test]
async fn view_rejects_multi_character_letter() -> Result<()> {
    let app = TestApp::new();
    let token = app.token_for("alice");
    let glossary = seeded_fruit(&app, &token).await?;

    let (status, body): (StatusCode, Value) = app
        .get(&format!("/api/glossaries/{}/view?letter=AB", glossary), &token)
        .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["letter"].is_string());
    Ok(())
}
