use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use super::{handlers, middleware::auth_middleware};
use crate::AppState;

const MB: usize = 1024 * 1024;

pub fn create_router(state: AppState) -> Router<AppState> {
    // Public auth routes
    let auth_routes = Router::new()
        .route("/trainer-login", post(handlers::auth::trainer_login))
        .route("/client-login", post(handlers::auth::client_login));

    // Client roster, measurements and progress photos (protected)
    let client_routes = Router::new()
        .route("/", get(handlers::clients::list_clients))
        .route("/", post(handlers::clients::create_client))
        .route("/:id", get(handlers::clients::get_client))
        .route("/:id", put(handlers::clients::update_client))
        .route("/:id", delete(handlers::clients::delete_client))
        .route(
            "/:id/photo",
            post(handlers::clients::upload_photo).layer(DefaultBodyLimit::max(5 * MB)),
        )
        .route("/:id/access-code", post(handlers::clients::regenerate_code))
        .route(
            "/:id/measurements",
            get(handlers::measurements::list_measurements),
        )
        .route(
            "/:id/measurements",
            post(handlers::measurements::create_measurement),
        )
        .route(
            "/:id/measurements/:measurement_id",
            put(handlers::measurements::update_measurement),
        )
        .route(
            "/:id/measurements/:measurement_id",
            delete(handlers::measurements::delete_measurement),
        )
        .route(
            "/:id/progress-photos",
            get(handlers::progress_photos::list_photos),
        )
        .route(
            "/:id/progress-photos",
            post(handlers::progress_photos::upload_photo)
                .layer(DefaultBodyLimit::max(10 * MB)),
        )
        .route(
            "/:id/progress-photos/:photo_id",
            delete(handlers::progress_photos::delete_photo),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Session calendar and workout logs (protected)
    let session_routes = Router::new()
        .route("/", get(handlers::sessions::list_sessions))
        .route("/", post(handlers::sessions::create_session))
        .route("/:id", get(handlers::sessions::get_session))
        .route("/:id", put(handlers::sessions::update_session))
        .route("/:id", delete(handlers::sessions::delete_session))
        .route("/:id/logs", get(handlers::workout_logs::list_logs))
        .route("/:id/logs", post(handlers::workout_logs::create_log))
        .route(
            "/:id/logs/batch",
            post(handlers::workout_logs::create_logs_batch),
        )
        .route(
            "/:id/logs/reorder",
            put(handlers::workout_logs::reorder_logs),
        )
        .route(
            "/:id/logs/:log_id",
            put(handlers::workout_logs::update_log),
        )
        .route(
            "/:id/logs/:log_id",
            delete(handlers::workout_logs::delete_log),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Exercise library (protected)
    let exercise_routes = Router::new()
        .route("/", get(handlers::exercises::list_exercises))
        .route("/", post(handlers::exercises::create_exercise))
        .route("/search", get(handlers::exercises::search_exercises))
        .route("/:id", get(handlers::exercises::get_exercise))
        .route("/:id", put(handlers::exercises::update_exercise))
        .route("/:id", delete(handlers::exercises::delete_exercise))
        .route(
            "/:id/video",
            post(handlers::exercises::upload_video).layer(DefaultBodyLimit::max(100 * MB)),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Workout templates (protected, trainer only)
    let template_routes = Router::new()
        .route("/", get(handlers::templates::list_templates))
        .route("/", post(handlers::templates::create_template))
        .route("/:id", get(handlers::templates::get_template))
        .route("/:id", put(handlers::templates::update_template))
        .route("/:id", delete(handlers::templates::delete_template))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Messaging (protected)
    let message_routes = Router::new()
        .route("/conversations", get(handlers::messages::list_conversations))
        .route("/unread-count", get(handlers::messages::unread_count))
        .route("/:client_id", get(handlers::messages::history))
        .route("/:client_id", post(handlers::messages::send_message))
        .route("/:client_id/read", post(handlers::messages::mark_read))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Push tokens and preferences (protected)
    let notification_routes = Router::new()
        .route("/register", post(handlers::notifications::register_token))
        .route("/unregister", post(handlers::notifications::unregister_token))
        .route("/preferences", get(handlers::notifications::get_preferences))
        .route("/preferences", put(handlers::notifications::update_preferences))
        .route("/test", post(handlers::notifications::send_test))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Dashboard analytics (protected, trainer only)
    let analytics_routes = Router::new()
        .route("/dashboard", get(handlers::analytics::dashboard))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/auth", auth_routes)
        .nest("/clients", client_routes)
        .nest("/sessions", session_routes)
        .nest("/exercises", exercise_routes)
        .nest("/templates", template_routes)
        .nest("/messages", message_routes)
        .nest("/notifications", notification_routes)
        .nest("/analytics", analytics_routes)
}
