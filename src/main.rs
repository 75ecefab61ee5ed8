use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use session_auth_api::application::auth_service::AuthService;
use session_auth_api::data::session_store::InMemorySessionStore;
use session_auth_api::data::user_repository::InMemoryUserRepository;
use session_auth_api::infrastructure::config::AppConfig;
use session_auth_api::infrastructure::logging::init_logging;
use session_auth_api::presentation::handlers::{
    AppState, current_user, index, login, logout, register,
};
use session_auth_api::presentation::middleware::RequestContextMiddleware;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    init_logging();
    info!("Logging initialized");

    let config = AppConfig::from_env();
    info!(
        host = %config.host,
        port = config.port,
        allowed_origins = ?config.allowed_origins,
        cookie_secure = config.cookie_secure,
        "Configuration loaded"
    );

    let user_repository = Arc::new(InMemoryUserRepository::new());
    let session_store = Arc::new(InMemorySessionStore::new());
    let auth_service = Arc::new(AuthService::new(user_repository, session_store));
    info!("Auth service created");

    let state = web::Data::new(AppState {
        auth_service,
        config: config.clone(),
    });

    let bind_addr = config.bind_addr();
    info!(host = %bind_addr.0, port = bind_addr.1, "Starting HTTP server");

    let allowed_origins = config.allowed_origins.clone();
    let server = HttpServer::new(move || {
        // Credentialed CORS so a browser frontend can send the session cookie
        let mut cors = Cors::default()
            .supports_credentials()
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec!["content-type"])
            .max_age(3600);
        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(RequestContextMiddleware)
            .route("/", web::get().to(index))
            .service(
                web::scope("/api")
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login))
                    .route("/@me", web::get().to(current_user))
                    .route("/logout", web::post().to(logout)),
            )
    });

    server.bind(bind_addr)?.run().await
}
