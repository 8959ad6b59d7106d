//! # Registro de citas
//!
//! Contrato de almacenamiento del sistema y sus implementaciones:
//!
//! - [`Registry`] - El contrato: consulta por fecha, reclamo atómico,
//!   mutaciones por id y suscripción a cambios
//! - [`mongodb`] - Implementación de producción sobre MongoDB
//! - [`memory`] - Implementación en memoria para la suite de tests
//! - [`models`] - Documentos del registro e ids determinísticos

pub mod memory;
pub mod models;
pub mod mongodb;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::api::AppResult;

pub use memory::MemoryRegistry;
pub use models::{
    block_id, booking_id, date_of_id, AppointmentRecord, BookingRecord, DayBlockRecord,
};
pub use mongodb::MongoRepo;

/// Notificación de cambio: la fecha cuyos documentos mutaron.
///
/// Los consumidores no reciben el documento; re-consultan la fecha completa y
/// re-proyectan. Corrección simple por sobre eficiencia.
#[derive(Debug, Clone)]
pub struct RegistryEvent {
    pub date: String,
}

/// Contrato del almacén de reservas.
///
/// El almacén no impone unicidad de esquema sobre `(fecha, hora)`; la ofrece
/// por documento vía el `_id` determinístico, y [`Registry::claim_booking`]
/// construye la unicidad de negocio sobre eso. Toda mutación exitosa publica
/// la fecha afectada en el canal de cambios.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Todos los documentos de una fecha (`YYYY-MM-DD`).
    async fn records_for_date(&self, date: &str) -> AppResult<Vec<AppointmentRecord>>;

    /// Un documento por id, si existe.
    async fn find_record(&self, id: &str) -> AppResult<Option<AppointmentRecord>>;

    /// Reclama una hora: inserta la reserva solo si su id no existe.
    ///
    /// El insert mismo es el chequeo de existencia; no hay lectura previa
    /// separada. Si el id ya existía retorna `AppError::SlotTaken` y el
    /// documento original queda intacto.
    async fn claim_booking(&self, record: BookingRecord) -> AppResult<()>;

    /// Crea el marcador de día cerrado. Retorna `false` si ya existía
    /// (perder esa carrera no es un error: el día quedó cerrado igual).
    async fn put_day_block(&self, record: DayBlockRecord) -> AppResult<bool>;

    /// Elimina el marcador de día cerrado. Retorna `false` si no existía.
    async fn remove_day_block(&self, date: &str) -> AppResult<bool>;

    /// Corrige nombre y teléfono de una reserva existente.
    ///
    /// `date`/`time`/id son inmutables; mover una reserva es borrar y crear.
    async fn update_booking_contact(&self, id: &str, name: &str, phone: &str) -> AppResult<()>;

    /// Elimina un documento por id (reserva o bloqueo).
    async fn delete_record(&self, id: &str) -> AppResult<()>;

    /// Canal de cambios del registro.
    fn subscribe(&self) -> broadcast::Receiver<RegistryEvent>;
}
