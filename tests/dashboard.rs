use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{http::header, test, web, App};
use serde_json::json;

use taskhub::auth::AuthMiddleware;
use taskhub::routes;

mod common;
use common::{cleanup_user, register_user, test_config, test_pool, unique_email};

macro_rules! init_app {
    ($pool:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .app_data(web::Data::new(test_config()))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600),
                )
                .wrap(Logger::default())
                .service(
                    web::scope("/api")
                        .wrap(AuthMiddleware)
                        .configure(routes::config),
                ),
        )
        .await
    };
}

#[actix_rt::test]
async fn test_dashboard_stats_consistency() {
    let Some(pool) = test_pool().await else { return };
    let app = init_app!(pool);

    let pm_email = unique_email("dash-pm");
    let pm = register_user(&app, "Dash PM", &pm_email, "Password123!", Some("ProjectManager")).await;

    // Seed a project with one task per status so every counter is non-zero.
    let req = test::TestRequest::post()
        .uri("/api/projects")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", pm.token)))
        .set_json(&json!({ "name": "Dashboard Project", "description": "stats fixture" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let project_id = body["project"]["id"].as_str().unwrap().to_string();

    let mut newest_task_id = String::new();
    for (title, status) in [
        ("Dash todo", "ToDo"),
        ("Dash in progress", "InProgress"),
        ("Dash completed", "Completed"),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .append_header((header::AUTHORIZATION, format!("Bearer {}", pm.token)))
            .set_json(&json!({
                "title": title,
                "description": "stats fixture",
                "projectId": project_id,
                "status": status
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        newest_task_id = body["task"]["id"].as_str().unwrap().to_string();
    }

    let req = test::TestRequest::get()
        .uri("/api/dashboard/stats")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", pm.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    let stats = &body["stats"];

    // Per-status counts sum to the task total, and the block echoes it.
    let total = stats["totalTasks"].as_i64().unwrap();
    let by_status = &stats["tasksByStatus"];
    assert_eq!(by_status["total"].as_i64().unwrap(), total);
    assert_eq!(
        by_status["todo"].as_i64().unwrap()
            + by_status["inProgress"].as_i64().unwrap()
            + by_status["completed"].as_i64().unwrap(),
        total
    );
    assert!(total >= 3);
    assert!(stats["totalProjects"].as_i64().unwrap() >= 1);
    assert!(stats["activeProjects"].as_i64().unwrap() >= 1);

    // Recent tasks: at most 5, newest first, and our latest task is present
    // with its references populated.
    let recent = stats["recentTasks"].as_array().unwrap();
    assert!(recent.len() <= 5);
    assert_eq!(recent.len() as i64, total.min(5));
    let timestamps: Vec<&str> = recent
        .iter()
        .map(|t| t["createdAt"].as_str().unwrap())
        .collect();
    let mut sorted = timestamps.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(timestamps, sorted, "recent tasks must be newest-first");

    let ours = recent
        .iter()
        .find(|t| t["id"].as_str() == Some(&newest_task_id))
        .expect("the task created last should be among the recent tasks");
    assert_eq!(ours["project"]["name"], "Dashboard Project");
    assert_eq!(ours["createdBy"]["email"], pm_email.as_str());

    cleanup_user(&pool, &pm_email).await;
}
