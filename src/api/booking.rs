//! # API pública de reservas
//!
//! Superficie que consume la vista de clientes:
//! - Vista proyectada de un día (horas libres, pendientes, historial)
//! - Stream en vivo de esa vista (SSE)
//! - Reclamo de una hora (crear reserva)
//!
//! Ninguna ruta requiere autenticación: reservar es auto-servicio.

use std::convert::Infallible;
use std::time::Duration;

use actix_web::web::Bytes;
use actix_web::{get, post, web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::ReceiverStream;

use super::{AppError, AppResult};
use crate::db::{block_id, booking_id, BookingRecord, Registry};
use crate::messaging::{confirmation_handoff, WhatsAppHandoff};
use crate::schedule::validate::{
    normalize_client_phone, validate_client_name, validate_date, validate_slot,
};
use crate::schedule::{project, BookingEntry, DayView};
use crate::state::AppState;

/// Cada cuánto se re-emite el snapshot del stream en vivo aunque nada haya
/// cambiado, para que el límite de "hora pasada" avance con el reloj.
const LIVE_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Datos para reclamar una hora.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimRequest {
    /// Fecha local del local (formato YYYY-MM-DD)
    date: String,
    /// Hora de la grilla (formato HH:MM)
    time: String,
    /// Nombre del cliente
    client_name: String,
    /// Teléfono del cliente; los separadores se limpian
    client_phone: String,
}

/// Desglose de precio de la reserva creada.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PriceBreakdown {
    base: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    overtime_fee: Option<i64>,
    total: i64,
}

/// Respuesta al reclamo exitoso de una hora.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClaimResponse {
    message: String,
    appointment: BookingEntry,
    price: PriceBreakdown,
    /// Comprobante prellenado; lo envía el cliente si quiere, nunca el
    /// servidor
    whatsapp: WhatsAppHandoff,
}

/// Proyecta la vista actual de una fecha.
async fn day_view(state: &AppState, date: NaiveDate, date_str: &str) -> AppResult<DayView> {
    let records = state.registry.records_for_date(date_str).await?;
    Ok(project(
        &records,
        date,
        state.config.local_now(),
        &state.config.schedule,
    ))
}

/// Obtiene la vista proyectada de un día
///
/// # Respuesta
/// ```json
/// {
///   "date": "2025-12-23",
///   "isBlocked": false,
///   "openSlots": [{"time": "10:00", "isOvertime": false, "price": 10000}],
///   "upcoming": [],
///   "past": []
/// }
/// ```
///
/// # Errores
/// - `400 Bad Request`: Fecha con formato inválido
/// - `500 Internal Server Error`: Error de base de datos
#[get("/schedule/{date}")]
async fn get_day_view(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<impl Responder> {
    let date = validate_date(&path.into_inner())?;
    let date_str = date.format("%Y-%m-%d").to_string();

    let view = day_view(&state, date, &date_str).await?;
    Ok(HttpResponse::Ok().json(view))
}

/// Stream SSE con la vista en vivo de un día
///
/// Emite un snapshot completo al conectar, otro con cada cambio del registro
/// que afecte a la fecha, y uno periódico para que las horas vayan quedando
/// en el pasado aunque nadie reserve. El consumidor re-dibuja con cada
/// evento; no hay parches incrementales.
///
/// # Formato
/// Eventos `data: {DayView en JSON}` separados por línea en blanco.
///
/// # Errores
/// - `400 Bad Request`: Fecha con formato inválido
#[get("/schedule/{date}/live")]
async fn live_day_view(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<impl Responder> {
    let date = validate_date(&path.into_inner())?;
    let date_str = date.format("%Y-%m-%d").to_string();

    let mut changes = state.registry.subscribe();
    let (tx, rx) = mpsc::channel::<Result<Bytes, Infallible>>(16);
    let state = state.into_inner();

    actix_web::rt::spawn(async move {
        let mut refresh = tokio::time::interval(LIVE_REFRESH_INTERVAL);
        loop {
            // el primer tick es inmediato: sirve el snapshot de conexión
            tokio::select! {
                _ = refresh.tick() => {}
                event = changes.recv() => match event {
                    Ok(event) if event.date == date_str => {}
                    Ok(_) => continue,
                    // rezagado: el snapshot completo que sigue lo repara
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }

            let view = match day_view(&state, date, &date_str).await {
                Ok(view) => view,
                Err(e) => {
                    tracing::warn!(date = %date_str, error = %e, "Stream en vivo interrumpido");
                    break;
                }
            };
            let frame = match serde_json::to_string(&view) {
                Ok(json) => Bytes::from(format!("data: {}\n\n", json)),
                Err(e) => {
                    tracing::error!(error = %e, "Error serializando snapshot");
                    break;
                }
            };
            if tx.send(Ok(frame)).await.is_err() {
                break; // el cliente cerró la conexión
            }
        }
    });

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(ReceiverStream::new(rx)))
}

/// Reclama una hora para un cliente
///
/// # Validaciones
/// - Nombre: 3 a 20 letras (tildes y eñes permitidas) y espacios
/// - Teléfono: 8 a 9 dígitos tras limpiar separadores
/// - Fecha válida (YYYY-MM-DD) y hora dentro de la grilla configurada
///
/// Todas se ejecutan antes de tocar el almacenamiento.
///
/// # Atomicidad
/// El insert con id determinístico `{fecha}-{hora}` es el chequeo de
/// existencia; dos clientes reclamando la misma hora a la vez terminan con
/// exactamente un ganador. El chequeo "la grilla la mostraba libre" del
/// cliente es solo optimización: puede estar desactualizado.
///
/// # Respuesta
/// ```json
/// {
///   "message": "¡Reserva confirmada!",
///   "appointment": { "id": "2025-12-23-20:00", "time": "20:00", "isOvertime": true },
///   "price": { "base": 10000, "overtimeFee": 3000, "total": 13000 },
///   "whatsapp": { "text": "Hola Daniel! ...", "link": "https://wa.me/..." }
/// }
/// ```
///
/// # Errores
/// - `400 Bad Request`: Validación fallida (con `field` cuando aplica)
/// - `409 Conflict`: Hora ya tomada, o agenda del día cerrada
/// - `500 Internal Server Error`: Error de base de datos
#[post("/appointments")]
async fn claim_slot(
    state: web::Data<AppState>,
    data: web::Json<ClaimRequest>,
) -> AppResult<impl Responder> {
    let date = validate_date(&data.date)?;
    let date_str = date.format("%Y-%m-%d").to_string();
    validate_slot(&state.config.schedule, &data.time)?;
    let client_name = validate_client_name(&data.client_name)?;
    let client_phone = normalize_client_phone(&data.client_phone)?;

    // puerta de día cerrado, antes de intentar el reclamo
    if state
        .registry
        .find_record(&block_id(&date_str))
        .await?
        .is_some()
    {
        return Err(AppError::DayBlocked);
    }

    let is_overtime = state.config.schedule.is_overtime(&data.time);
    let record = BookingRecord {
        id: booking_id(&date_str, &data.time),
        date: date_str,
        time: data.time.clone(),
        client_name,
        client_phone,
        is_overtime,
        is_manual: false,
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    state.registry.claim_booking(record.clone()).await?;

    tracing::info!(
        id = %record.id,
        client = %record.client_name,
        overtime = record.is_overtime,
        "Reserva creada"
    );

    let schedule = &state.config.schedule;
    let price = PriceBreakdown {
        base: schedule.base_price,
        overtime_fee: is_overtime.then_some(schedule.overtime_fee),
        total: schedule.price_for(&record.time),
    };
    let whatsapp = confirmation_handoff(&state.config, &record, date);

    Ok(HttpResponse::Created().json(ClaimResponse {
        message: "¡Reserva confirmada!".to_string(),
        appointment: BookingEntry::from(&record),
        price,
        whatsapp,
    }))
}

/// Configura las rutas públicas
///
/// - `GET /schedule/{date}` - Vista proyectada de un día
/// - `GET /schedule/{date}/live` - Stream SSE de la vista
/// - `POST /appointments` - Reclamar una hora
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_day_view);
    cfg.service(live_day_view);
    cfg.service(claim_slot);
}
