use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::http::header;
use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info, warn};

use auth_microservice::config::{AppConfig, ServerConfig, StoreBackend};
use auth_microservice::core::ServiceContainer;
use auth_microservice::db::Database;
use auth_microservice::repositories::{CredentialStore, InMemoryCredentialStore, MongoCredentialStore};
use auth_microservice::routes::configure_all_routes;
use auth_microservice::services::email::{ConsoleEmailSender, EmailSender, SmtpEmailSender};
use auth_microservice::utils::display_terminal::{
    print_boxed_title, print_startup_summary, print_step_start, print_sub_task,
};

#[actix_web::main]
async fn main() -> io::Result<()> {
    load_env_file();
    init_logging();

    print_boxed_title("AUTH SERVICE");
    info!("🚀 인증 서비스 시작중...");

    let config = AppConfig::from_env().map_err(to_io_error)?;
    info!("환경: {:?}", config.environment);

    print_step_start(1, "Connecting credential store");
    let (store, store_name) = initialize_store(&config).await?;
    print_sub_task("Store", store_name);

    print_step_start(2, "Configuring OTP delivery");
    let email_sender = initialize_email_sender(&config)?;
    print_sub_task("Sender", email_sender.name());

    print_step_start(3, "Assembling services");
    let container = ServiceContainer::new(&config, store, email_sender.clone());
    if !container.google.config().is_configured() {
        warn!("⚠️ GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET 미설정: Google 로그인이 비활성화됩니다");
    }

    if container
        .users
        .seed_default_admin(config.admin_seed.as_ref())
        .await
        .map_err(to_io_error)?
    {
        print_sub_task("Admin seed", "created");
    }

    info!("✅ 모든 서비스가 성공적으로 초기화되었습니다!");
    print_startup_summary(&config.server.bind_address(), store_name, email_sender.name());

    start_http_server(config.server, container).await
}

async fn start_http_server(server: ServerConfig, container: ServiceContainer) -> io::Result<()> {
    let bind_address = server.bind_address();

    info!("🌐 서버가 http://{} 에서 실행중입니다", bind_address);
    info!("📍 Health check: http://{}/health", bind_address);

    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_second(server.rate_limit_per_second)
        .burst_size(server.rate_limit_burst_size)
        .use_headers()
        .finish()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "잘못된 Rate Limit 설정입니다"))?;

    info!(
        "🛡️ Rate Limiting 활성화: 초당 {}요청, 버스트 {}개",
        server.rate_limit_per_second, server.rate_limit_burst_size
    );

    let container = web::Data::new(container);
    let origins = server.cors_allowed_origins.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(container.clone())
            .wrap(Governor::new(&governor_conf))
            .wrap(configure_cors(&origins))
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_all_routes)
    })
    .bind(bind_address)?
    .run()
    .await
}

async fn initialize_store(config: &AppConfig) -> io::Result<(Arc<dyn CredentialStore>, &'static str)> {
    match config.database.backend {
        StoreBackend::Memory => {
            warn!("⚠️ 메모리 저장소 사용: 재시작하면 모든 계정이 사라집니다");
            Ok((Arc::new(InMemoryCredentialStore::new()), "in-memory"))
        }
        StoreBackend::MongoDb => {
            info!("📡 데이터베이스 연결 중...");
            let database = Database::new(&config.database).await.map_err(to_io_error)?;
            info!("✅ MongoDB 연결 성공");

            let store = MongoCredentialStore::new(database);
            store.create_indexes().await.map_err(to_io_error)?;
            info!("✅ 인덱스 생성 완료");

            Ok((Arc::new(store), "MongoDB"))
        }
    }
}

fn initialize_email_sender(config: &AppConfig) -> io::Result<Arc<dyn EmailSender>> {
    match &config.smtp {
        Some(smtp) => {
            let sender = SmtpEmailSender::new(smtp).map_err(to_io_error)?;
            Ok(Arc::new(sender))
        }
        None => {
            if config.environment.is_production() {
                warn!("⚠️ SMTP_HOST 미설정: OTP가 로그로만 출력됩니다");
            }
            Ok(Arc::new(ConsoleEmailSender::new()))
        }
    }
}

fn to_io_error(e: impl std::fmt::Display) -> io::Error {
    error!("기동 실패: {}", e);
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

fn load_env_file() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());

    match profile.as_str() {
        "prod" => {
            if let Err(e) = dotenv::from_filename(".env.prod") {
                eprintln!(".env.prod 파일 로드 실패: {}", e);
            }
        }
        "dev" => {
            if let Err(e) = dotenv::from_filename(".env.dev") {
                eprintln!(".env.dev 파일 로드 실패: {}", e);
            }
        }
        _ => {
            dotenv().ok();
        }
    }
}

fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info,actix_web=info"));
}

fn configure_cors(origins: &[String]) -> Cors {
    let cors = origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin));

    cors.allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .supports_credentials()
        .max_age(3600)
}
