use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::web::middleware::auth as auth_middleware;
use crate::web::routes::{
    appointments, auth, chat, doctors, health, medications, predictions, preferences, profile,
    recipes, symptoms,
};

pub fn build_router(state: AppState) -> Router {
    // Everything tied to a user sits behind one auth layer.
    let protected_routes = Router::new()
        .route(
            "/api/disease-prediction",
            post(predictions::disease_prediction_handler),
        )
        .route("/api/predict", post(predictions::predict_handler))
        .route(
            "/api/symptoms",
            get(symptoms::list_symptoms_handler).post(symptoms::create_symptom_entry_handler),
        )
        .route(
            "/api/symptoms/:entry_id",
            get(symptoms::get_symptom_entry_handler).delete(symptoms::delete_symptom_entry_handler),
        )
        .route("/api/chat", post(chat::chat_handler))
        .route(
            "/api/user/preferences",
            get(preferences::get_preferences_handler).put(preferences::update_preferences_handler),
        )
        .route(
            "/api/user/profile",
            get(profile::get_profile_handler).put(profile::update_profile_handler),
        )
        .route(
            "/api/appointments",
            get(appointments::list_appointments_handler)
                .post(appointments::create_appointment_handler),
        )
        .route(
            "/api/appointments/:appointment_id",
            put(appointments::update_appointment_handler)
                .delete(appointments::delete_appointment_handler),
        )
        .route(
            "/api/medications",
            get(medications::list_medications_handler).post(medications::create_medication_handler),
        )
        .route(
            "/api/medications/:medication_id",
            put(medications::update_medication_handler)
                .delete(medications::delete_medication_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::require_auth,
        ));

    Router::new()
        // Public routes
        .route("/api/health", get(health::health_handler))
        .route("/api/free-symptoms", post(predictions::free_symptoms_handler))
        .route("/api/recipes", get(recipes::search_recipes_handler))
        .route("/api/recipes/:recipe_id", get(recipes::recipe_detail_handler))
        .route("/api/doctors/search", get(doctors::search_doctors_handler))
        .route("/api/doctors/specialties", get(doctors::specialties_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/logout", post(auth::logout_handler))
        // Protected routes
        .merge(protected_routes)
        // Layers
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
