//! # BarberBook Reservation Server
//!
//! Servidor web del sistema de reservas de la barbería, construido con Rust,
//! Actix Web y MongoDB.
//!
//! ## Características principales
//!
//! - **Reclamo atómico de horas**: dos clientes no pueden quedarse con la misma hora
//! - **Vista del día en vivo**: stream SSE con horas libres, pendientes e historial
//! - **Panel de administración**: altas manuales, correcciones y cierre de días
//! - **API REST**: autenticación por token para el panel
//!
//! ## Configuración
//!
//! El servidor se configura mediante variables de entorno (archivo `.env`):
//!
//! ```env
//! # Base de datos MongoDB
//! MONGODB_URI=mongodb://localhost:27017
//! MONGODB_DATABASE=barberbook
//!
//! # Servidor
//! BIND_ADDRESS=0.0.0.0:8080
//!
//! # Panel de administración
//! ADMIN_EMAIL=admin@bigboss.local
//! ADMIN_PASSWORD=changeme
//! ADMIN_SESSION_HOURS=12
//!
//! # Negocio (defaults = el local actual)
//! SLOT_HOURS=08:00,09:00,10:00,...
//! OVERTIME_SLOTS=08:00,09:00,20:00,21:00
//! BASE_PRICE=10000
//! OVERTIME_FEE=3000
//! BARBER_NAME=Daniel
//! BARBER_PHONE=56988280660
//! SHOP_TIMEZONE=America/Santiago
//!
//! # Logging
//! RUST_LOG=debug,mongodb=info
//! ```
//!
//! ## Ejecución
//!
//! ```bash
//! # 1. Instalar y ejecutar MongoDB
//! # Local: mongod
//! # Docker: docker run -d --name mongo -p 27017:27017 mongo:latest
//!
//! # 2. Configurar variables de entorno
//! cp .env.example .env
//!
//! # 3. Compilar y ejecutar
//! cargo run
//!
//! # 4. Acceder al servidor
//! # http://localhost:8080
//! ```

use actix_files::Files;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;

use barberbook_reservation::api;
use barberbook_reservation::auth::SessionStore;
use barberbook_reservation::config::AppConfig;
use barberbook_reservation::db::{MongoRepo, Registry};
use barberbook_reservation::state::AppState;

/// Arranque del servidor
///
/// 1. Carga variables de entorno desde `.env`
/// 2. Configura el sistema de logging con tracing
/// 3. Establece conexión con MongoDB (la falla aquí sí es fatal)
/// 4. Crea índices en la base de datos (la falla aquí no lo es)
/// 5. Configura el servidor HTTP con middleware de logging, rutas de la API,
///    archivos estáticos y redirección de la raíz
///
/// # Errores
///
/// Retorna `std::io::Error` si no se puede conectar a MongoDB, bindear el
/// puerto o inicializar el servidor.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("barberbook_reservation=debug".parse().unwrap())
                .add_directive("mongodb=info".parse().unwrap()),
        )
        .init();

    let config = AppConfig::from_env();
    tracing::info!("Iniciando BarberBook Reservation Server...");

    let mongo_repo = match MongoRepo::init(&config).await {
        Ok(repo) => {
            if let Err(e) = repo.create_indexes().await {
                // no es fatal, seguimos sin índices
                tracing::warn!("Advertencia creando índices: {}", e);
            }
            repo
        }
        Err(e) => {
            tracing::error!("Error conectando a MongoDB: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Error de MongoDB: {}", e),
            ));
        }
    };

    let bind_address = config.bind_address.clone();
    let state = web::Data::new(AppState {
        registry: Arc::new(mongo_repo) as Arc<dyn Registry>,
        sessions: SessionStore::new(config.session_ttl_hours),
        config,
    });

    tracing::info!("Servidor iniciando en {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(api::init_routes)
            .service(Files::new("/static", "./static"))
            .route(
                "/",
                web::get().to(|| async {
                    actix_web::HttpResponse::PermanentRedirect()
                        .append_header(("Location", "/static/index.html"))
                        .finish()
                }),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
