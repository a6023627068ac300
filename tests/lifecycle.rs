use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::web::{self, Data};
use actix_web::App;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use kolmarket::marketplace::Marketplace;
use kolmarket::notify::RecordingNotifier;
use kolmarket::store::MemoryStore;
use kolmarket::user::{UserId, ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};

fn market() -> Data<Mutex<Marketplace>> {
    Data::new(Mutex::new(Marketplace::new(
        Box::new(MemoryStore::new()),
        Box::new(RecordingNotifier::new()),
    )))
}

fn business(req: TestRequest, actor: UserId) -> TestRequest {
    req.insert_header((ACTOR_ID_HEADER, actor.to_string()))
        .insert_header((ACTOR_ROLE_HEADER, "business"))
}

fn influencer(req: TestRequest, actor: UserId) -> TestRequest {
    req.insert_header((ACTOR_ID_HEADER, actor.to_string()))
        .insert_header((ACTOR_ROLE_HEADER, "influencer"))
}

async fn read(res: ServiceResponse) -> (StatusCode, Value) {
    let status = res.status();
    let body = test::read_body(res).await;

    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn campaign_json() -> Value {
    json!({
        "title": "Summer skincare launch",
        "business_name": "Glow Co",
        "budget": { "min": 500, "max": 2000, "currency": "SGD" },
        "deliverables": [
            { "type": "Instagram Reel", "quantity": 1 },
            { "type": "Instagram Story", "quantity": 2 }
        ],
        "platforms": ["instagram"],
        "categories": ["Beauty"],
        "publish": true
    })
}

#[actix_web::test]
async fn application_to_completed_deal() {
    let app = test::init_service(
        App::new()
            .app_data(market())
            .configure(kolmarket::configure)
            .default_service(web::to(kolmarket::path_not_found)),
    )
    .await;
    let brand = UserId::new();
    let kol = UserId::new();

    let req = business(TestRequest::post().uri("/campaigns"), brand).set_json(campaign_json());
    let (status, campaign) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(campaign["status"], "live");
    let campaign_id = campaign["id"].as_str().unwrap().to_owned();

    let req = influencer(
        TestRequest::post().uri(&format!("/campaigns/{}/applications", campaign_id)),
        kol,
    )
    .set_json(json!({
        "applicant_name": "Mia",
        "proposed_rate": "SGD 1500",
        "pitch": "Skincare every day"
    }));
    let (status, application) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(application["campaign_title"], "Summer skincare launch");
    let application_id = application["id"].as_str().unwrap().to_owned();

    let req = influencer(TestRequest::get().uri("/applications/applied"), kol);
    let (_, applied) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(applied, json!([campaign_id]));

    let req = influencer(
        TestRequest::post().uri(&format!("/campaigns/{}/applications", campaign_id)),
        kol,
    )
    .set_json(json!({ "applicant_name": "Mia", "pitch": "Again" }));
    let (status, again) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(again["error_code"], "E4091000");

    let req = business(
        TestRequest::post().uri(&format!("/applications/{}/status", application_id)),
        brand,
    )
    .set_json(json!({ "status": "accepted" }));
    let (status, review) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(review["deal"]["compensation"], "SGD 1500");
    assert_eq!(
        review["deal"]["progress"],
        json!({ "completed": 0, "total": 2 })
    );
    let deal_id = review["deal"]["id"].as_str().unwrap().to_owned();

    let req = business(
        TestRequest::post().uri(&format!("/deals/{}/approve", deal_id)),
        brand,
    );
    let (status, rejected) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(rejected["error_meta"]["from"], "pending");

    let req = business(TestRequest::post().uri(&format!("/deals/{}/fund", deal_id)), brand);
    let (_, funded) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(funded["deal"]["status"], "in_progress");
    assert_eq!(funded["deal"]["escrow_status"], "funded");

    let req = influencer(
        TestRequest::post().uri(&format!("/deals/{}/deliverables/0/toggle", deal_id)),
        kol,
    );
    let (_, toggled) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(toggled["progress"], json!({ "completed": 1, "total": 2 }));

    let req = influencer(
        TestRequest::post().uri(&format!("/deals/{}/submit", deal_id)),
        kol,
    )
    .set_json(json!({ "files": ["reel.mp4"] }));
    let (_, submitted) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(submitted["deal"]["status"], "submitted");

    let req = business(
        TestRequest::post().uri(&format!("/deals/{}/request-revision", deal_id)),
        brand,
    )
    .set_json(json!({ "note": "Add the discount code" }));
    let (_, revised) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(revised["deal"]["status"], "revision_requested");

    let req = influencer(
        TestRequest::post().uri(&format!("/deals/{}/submit", deal_id)),
        kol,
    )
    .set_json(json!({}));
    let (status, _) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::OK);

    for action in &["approve", "complete"] {
        let req = business(
            TestRequest::post().uri(&format!("/deals/{}/{}", deal_id, action)),
            brand,
        );
        let (status, _) = read(test::call_service(&app, req.to_request()).await).await;
        assert_eq!(status, StatusCode::OK);
    }

    let req = influencer(TestRequest::get().uri(&format!("/deals/{}", deal_id)), kol);
    let (_, deal) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(deal["status"], "completed");
    assert_eq!(deal["files"], json!(["reel.mp4"]));
    assert_eq!(deal["revision_notes"], json!(["Add the discount code"]));

    let req = business(TestRequest::get().uri("/kpis"), brand);
    let (_, kpis) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(kpis["live_campaigns"], 1);
    assert_eq!(kpis["deals"]["completed"], 1);
}

#[actix_web::test]
async fn requests_without_identity_are_rejected() {
    let app = test::init_service(
        App::new()
            .app_data(market())
            .configure(kolmarket::configure)
            .default_service(web::to(kolmarket::path_not_found)),
    )
    .await;

    let req = TestRequest::post()
        .uri("/campaigns")
        .set_json(campaign_json());
    let (status, body) = read(test::call_service(&app, req.to_request()).await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "E4001003");
    assert_eq!(body["error_meta"]["header"], ACTOR_ID_HEADER);
}

#[actix_web::test]
async fn unknown_paths_and_filters() {
    let app = test::init_service(
        App::new()
            .app_data(market())
            .configure(kolmarket::configure)
            .default_service(web::to(kolmarket::path_not_found)),
    )
    .await;

    let req = TestRequest::get().uri("/nowhere");
    let (status, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "E4041000");

    let req = TestRequest::get().uri("/campaigns?followers=lots");
    let (status, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "E4001006");

    let req = TestRequest::get().uri("/campaigns");
    let (status, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}
