use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{http::header, rt, test, web, App, HttpServer};
use serde_json::json;
use std::net::TcpListener;

use taskhub::auth::AuthMiddleware;
use taskhub::routes;

mod common;
use common::{cleanup_user, register_user, test_config, test_pool, unique_email, TestUser};

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

async fn create_project(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    user: &TestUser,
    name: &str,
) -> String {
    let req = test::TestRequest::post()
        .uri("/api/projects")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .set_json(&json!({ "name": name, "description": "test project" }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    body["project"]["id"].as_str().unwrap().to_string()
}

#[actix_rt::test]
async fn test_task_crud_flow() {
    let Some(pool) = test_pool().await else { return };
    let app = init_app!(pool);

    let admin_email = unique_email("task-admin");
    let admin = register_user(&app, "Task Admin", &admin_email, "Password123!", Some("Admin")).await;
    let project_id = create_project(&app, &admin, "Task CRUD Project").await;

    // Create with defaults: status ToDo, priority Medium, no assignees.
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", admin.token)))
        .set_json(&json!({
            "title": "CRUD Task 1 Original",
            "description": "Initial description",
            "projectId": project_id
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let task = &body["task"];
    assert_eq!(task["title"], "CRUD Task 1 Original");
    assert_eq!(task["status"], "ToDo");
    assert_eq!(task["priority"], "Medium");
    assert_eq!(task["assignedTo"], json!([]));
    assert_eq!(
        task["createdBy"]["id"],
        serde_json::to_value(admin.id).unwrap()
    );
    let task_id = task["id"].as_str().unwrap().to_string();

    // Read it back.
    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", admin.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["task"]["title"], "CRUD Task 1 Original");

    // Partial update: title and priority; assignees now include the admin.
    let req = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", admin.token)))
        .set_json(&json!({
            "title": "CRUD Task 1 Updated",
            "priority": "High",
            "assignedTo": [admin.id]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let task = &body["task"];
    assert_eq!(task["title"], "CRUD Task 1 Updated");
    assert_eq!(task["priority"], "High");
    assert_eq!(task["description"], "Initial description");
    assert_eq!(task["assignedTo"][0]["email"], admin_email.as_str());

    // Delete, then the task is gone.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", admin.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", admin.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);

    cleanup_user(&pool, &admin_email).await;
}

#[actix_rt::test]
async fn test_task_status_transition_open_to_any_role() {
    let Some(pool) = test_pool().await else { return };
    let app = init_app!(pool);

    let pm_email = unique_email("status-pm");
    let dev_email = unique_email("status-dev");
    let pm = register_user(&app, "Status PM", &pm_email, "Password123!", Some("ProjectManager")).await;
    let dev = register_user(&app, "Status Dev", &dev_email, "Password123!", None).await;

    let project_id = create_project(&app, &pm, "Status Project").await;

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", pm.token)))
        .set_json(&json!({
            "title": "Status Task",
            "description": "Developer will complete this",
            "projectId": project_id
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let task_id = body["task"]["id"].as_str().unwrap().to_string();

    // A Developer may not touch the full-edit route...
    let req = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", dev.token)))
        .set_json(&json!({ "title": "Hijacked" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::FORBIDDEN);

    // ...but the status-only transition is open to any authenticated user.
    let req = test::TestRequest::patch()
        .uri(&format!("/api/tasks/{}/status", task_id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", dev.token)))
        .set_json(&json!({ "status": "Completed" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["task"]["status"], "Completed");

    // The transition is visible on a subsequent read.
    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", dev.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["task"]["status"], "Completed");

    cleanup_user(&pool, &pm_email).await;
    cleanup_user(&pool, &dev_email).await;
}

#[actix_rt::test]
async fn test_task_list_filters() {
    let Some(pool) = test_pool().await else { return };
    let app = init_app!(pool);

    let admin_email = unique_email("filter-admin");
    let admin = register_user(&app, "Filter Admin", &admin_email, "Password123!", Some("Admin")).await;

    let project_a = create_project(&app, &admin, "Filter Project A").await;
    let project_b = create_project(&app, &admin, "Filter Project B").await;

    for (title, project, status) in [
        ("A todo", &project_a, "ToDo"),
        ("A done", &project_a, "Completed"),
        ("B todo", &project_b, "ToDo"),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .append_header((header::AUTHORIZATION, format!("Bearer {}", admin.token)))
            .set_json(&json!({
                "title": title,
                "description": "filter fixture",
                "projectId": project,
                "status": status
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    }

    // Filter by project: only project A's tasks.
    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks?projectId={}", project_a))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", admin.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let tasks = body["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert!(tasks
        .iter()
        .all(|t| t["project"]["id"].as_str() == Some(project_a.as_str())));

    // Combined filter: project A and status ToDo.
    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks?projectId={}&status=ToDo", project_a))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", admin.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    let tasks = body["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "A todo");

    cleanup_user(&pool, &admin_email).await;
}

#[actix_rt::test]
async fn test_create_task_with_unknown_project() {
    let Some(pool) = test_pool().await else { return };
    let app = init_app!(pool);

    let admin_email = unique_email("ref-admin");
    let admin = register_user(&app, "Ref Admin", &admin_email, "Password123!", Some("Admin")).await;

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", admin.token)))
        .set_json(&json!({
            "title": "Dangling",
            "description": "References a project that does not exist",
            "projectId": uuid::Uuid::new_v4()
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);

    cleanup_user(&pool, &admin_email).await;
}

#[actix_rt::test]
async fn test_create_task_unauthorized_over_the_wire() {
    let Some(pool) = test_pool().await else { return };

    // Find an available port for a real server instance.
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let server_pool = pool.clone();
    let server_handle = rt::spawn(async move {
        HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(server_pool.clone()))
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
                )
        })
        .bind(("127.0.0.1", port))
        .unwrap_or_else(|_| panic!("Failed to bind to port {}", port))
        .run()
        .await
    });

    // Give the server a moment to start.
    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://127.0.0.1:{}/api/tasks", port))
        .json(&json!({
            "title": "Unauthorized Task",
            "description": "No token attached",
            "projectId": uuid::Uuid::new_v4()
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    server_handle.abort();
}
