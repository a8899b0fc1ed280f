mod common;

use axum::{body::to_bytes, http::StatusCode};
use common::{error_message, json, location, TestApp};
use serde_json::Value;

async fn reviews_page(app: &TestApp, id: i64, query: &str) -> Value {
    let detail = json(app.get(&format!("/book/{}/detail/{}", id, query), None).await).await;
    detail["reviews"].clone()
}

#[tokio::test]
async fn anonymous_visitors_are_sent_to_login() {
    let app = TestApp::new().await;

    let response = app.get("/book/create/?from=nav", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/accounts/login/?next=%2Fbook%2Fcreate%2F%3Ffrom%3Dnav"
    );

    let response = app
        .post_multipart("/book/create/", None, &[("title", "Dune")], None)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/accounts/login/?next="));

    // Reading stays public
    assert_eq!(app.get("/", None).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn created_shelf_is_listed_with_its_thumbnail() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;

    let response = app
        .post_multipart(
            "/book/create/",
            Some(&alice),
            &[("title", "Dune"), ("text", "spice"), ("category", "hobby")],
            Some(("thumbnail", "cover.PNG", "image/png", &b"\x89PNG fake"[..])),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let listing = json(app.get("/", None).await).await;
    let shelf = &listing["shelves"][0];
    assert_eq!(shelf["title"], "Dune");
    assert_eq!(shelf["category"], "hobby");

    let url = shelf["thumbnail_url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/media/thumbnails/"), "{}", url);
    assert!(url.ends_with(".png"), "{}", url);

    let served = app.get(&url, None).await;
    assert_eq!(served.status(), StatusCode::OK);
    let bytes = to_bytes(served.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"\x89PNG fake");
}

#[tokio::test]
async fn invalid_shelf_form_is_rejected() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let long_title = "x".repeat(101);

    let response = app
        .post_multipart(
            "/book/create/",
            Some(&alice),
            &[("title", &long_title), ("text", "t"), ("category", "fiction")],
            Some(("thumbnail", "notes.txt", "text/plain", &b"hello"[..])),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = json(response).await;
    let fields: Vec<&str> = body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|detail| detail["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["title", "category", "thumbnail"]);

    let listing = json(app.get("/", None).await).await;
    assert!(listing["shelves"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn only_the_owner_can_change_a_shelf() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;
    let id = app.create_shelf(&alice, "Dune").await;

    let response = app.get(&format!("/book/{}/update/", id), Some(&bob)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_message(response).await, "編集権限がありません。");

    let response = app
        .post_multipart(
            &format!("/book/{}/update/", id),
            Some(&bob),
            &[("title", "Stolen"), ("text", "x"), ("category", "life")],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.post_form(&format!("/book/{}/delete/", id), Some(&bob), &[]).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_message(response).await, "削除権限がありません。");

    let response = app
        .post_multipart(
            &format!("/book/{}/update/", id),
            Some(&alice),
            &[("title", "Dune Messiah"), ("text", "sequel"), ("category", "life")],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let detail = json(app.get(&format!("/book/{}/detail/", id), None).await).await;
    assert_eq!(detail["shelf"]["title"], "Dune Messiah");
    assert_eq!(detail["shelf"]["category"], "life");
}

#[tokio::test]
async fn deleting_a_shelf_removes_reviews_and_notes() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let id = app.create_shelf(&alice, "Dune").await;

    app.review(&alice, id, 4).await;
    let response = app
        .post_form(
            &format!("/book/{}/note/add/", id),
            Some(&alice),
            &[("title", "ch. 1"), ("content", "sandworms")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let notes = json(app.get("/notes/", Some(&alice)).await).await;
    let note_id = notes["notes"][0]["id"].as_i64().unwrap();

    let confirm = app.get(&format!("/book/{}/delete/", id), Some(&alice)).await;
    assert_eq!(confirm.status(), StatusCode::OK);

    let response = app.post_form(&format!("/book/{}/delete/", id), Some(&alice), &[]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let detail = app.get(&format!("/book/{}/detail/", id), None).await;
    assert_eq!(detail.status(), StatusCode::NOT_FOUND);
    let note = app.get(&format!("/note/{}/", note_id), Some(&alice)).await;
    assert_eq!(note.status(), StatusCode::NOT_FOUND);
    let notes = json(app.get("/notes/", Some(&alice)).await).await;
    assert!(notes["notes"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn reviews_are_paged_three_at_a_time() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let id = app.create_shelf(&alice, "Dune").await;

    for _ in 0..7 {
        let response = app.review(&alice, id, 3).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), format!("/book/{}/detail/", id));
    }

    let first = reviews_page(&app, id, "").await;
    assert_eq!(first["number"], 1);
    assert_eq!(first["num_pages"], 3);
    assert_eq!(first["count"], 7);
    assert_eq!(first["items"].as_array().unwrap().len(), 3);
    assert_eq!(first["has_previous"], false);

    let third = reviews_page(&app, id, "?page=3").await;
    assert_eq!(third["items"].as_array().unwrap().len(), 1);
    assert_eq!(third["has_next"], false);

    assert_eq!(reviews_page(&app, id, "?page=4").await["number"], 3);
    assert_eq!(reviews_page(&app, id, "?page=0").await["number"], 1);
    assert_eq!(reviews_page(&app, id, "?page=abc").await["number"], 1);
    assert_eq!(reviews_page(&app, id, "?page=last").await["number"], 3);
}

#[tokio::test]
async fn shelf_without_reviews_has_one_empty_page() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let id = app.create_shelf(&alice, "Dune").await;

    let detail = json(app.get(&format!("/book/{}/detail/?page=2", id), None).await).await;
    assert_eq!(detail["reviews"]["number"], 1);
    assert_eq!(detail["reviews"]["num_pages"], 1);
    assert!(detail["reviews"]["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn ranking_orders_by_average_rate() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let dune = app.create_shelf(&alice, "Dune").await;
    let emma = app.create_shelf(&alice, "Emma").await;
    let ulysses = app.create_shelf(&alice, "Ulysses").await;
    let middling = app.create_shelf(&alice, "Middling").await;

    app.review(&alice, dune, 5).await;
    app.review(&alice, emma, 4).await;
    app.review(&alice, emma, 3).await;
    app.review(&alice, ulysses, 1).await;
    app.review(&alice, middling, 2).await;

    let listing = json(app.get("/", None).await).await;
    let ranking = listing["ranking"].as_array().unwrap();
    let titles: Vec<&str> = ranking.iter().filter_map(|r| r["title"].as_str()).collect();
    assert_eq!(titles, vec!["Dune", "Emma", "Middling"]);
    assert_eq!(ranking[0]["average_rate"], 5.0);
    assert_eq!(ranking[1]["average_rate"], 3.5);
    assert_eq!(listing["shelves"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn review_validation_and_missing_shelf() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let id = app.create_shelf(&alice, "Dune").await;

    let response = app.review(&alice, id, 6).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app.review(&alice, 9999, 3).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let form = json(app.get(&format!("/book/{}/review/", id), Some(&alice)).await).await;
    assert_eq!(form["book"]["title"], "Dune");
}

#[tokio::test]
async fn malformed_ids_are_not_found() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;

    for path in [
        "/book/abc/detail/",
        "/book/-1/detail/",
        "/book/99999999999999999999/detail/",
    ] {
        let response = app.get(path, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", path);
        let body = json(response).await;
        assert_eq!(body["error"]["code"], "not_found", "{}", path);
    }

    let response = app.get("/book/abc/update/", Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn huge_page_number_lands_on_last_page() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let id = app.create_shelf(&alice, "Dune").await;
    for _ in 0..7 {
        app.review(&alice, id, 3).await;
    }

    let page = reviews_page(&app, id, "?page=99999999999999999999").await;
    assert_eq!(page["number"], 3);
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn superseded_thumbnails_are_removed() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;

    app.post_multipart(
        "/book/create/",
        Some(&alice),
        &[("title", "Dune"), ("text", "spice"), ("category", "hobby")],
        Some(("thumbnail", "first.png", "image/png", &b"first"[..])),
    )
    .await;
    let listing = json(app.get("/", None).await).await;
    let id = listing["shelves"][0]["id"].as_i64().unwrap();
    let first_url = listing["shelves"][0]["thumbnail_url"].as_str().unwrap().to_string();

    // Keeping the thumbnail keeps the file
    app.post_multipart(
        &format!("/book/{}/update/", id),
        Some(&alice),
        &[("title", "Dune"), ("text", "spice"), ("category", "hobby")],
        None,
    )
    .await;
    assert_eq!(app.get(&first_url, None).await.status(), StatusCode::OK);

    let response = app
        .post_multipart(
            &format!("/book/{}/update/", id),
            Some(&alice),
            &[("title", "Dune"), ("text", "spice"), ("category", "hobby")],
            Some(("thumbnail", "second.png", "image/png", &b"second"[..])),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let detail = json(app.get(&format!("/book/{}/detail/", id), None).await).await;
    let second_url = detail["shelf"]["thumbnail_url"].as_str().unwrap().to_string();
    assert_ne!(first_url, second_url);
    assert_eq!(app.get(&first_url, None).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.get(&second_url, None).await.status(), StatusCode::OK);

    app.post_form(&format!("/book/{}/delete/", id), Some(&alice), &[])
        .await;
    assert_eq!(app.get(&second_url, None).await.status(), StatusCode::NOT_FOUND);
}
