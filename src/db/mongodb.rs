//! Implementación MongoDB del registro de citas.
//!
//! Colección única `appointments`, documentos tipados con el id
//! determinístico en `_id`. La unicidad de `(fecha, hora)` descansa en el
//! índice de `_id`: un `insert_one` que choca con clave duplicada (código
//! 11000) es el "la hora ya estaba tomada".

use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::{Client, Collection, Database, IndexModel};
use tokio::sync::broadcast;

use crate::api::{AppError, AppResult};
use crate::config::AppConfig;

use super::models::{date_of_id, AppointmentRecord, BookingRecord, DayBlockRecord};
use super::{block_id, Registry, RegistryEvent};

/// Capacidad del canal de cambios; un consumidor rezagado recibe `Lagged` y
/// re-consulta el snapshot completo, así que perder eventos no corrompe nada.
const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct MongoRepo {
    database: Database,
    events: broadcast::Sender<RegistryEvent>,
}

impl MongoRepo {
    /// Conecta a MongoDB y valida la conexión con un ping.
    pub async fn init(config: &AppConfig) -> AppResult<MongoRepo> {
        let client = Client::with_uri_str(&config.mongodb_uri)
            .await
            .map_err(|e| AppError::database("connect", e))?;

        let database = client.database(&config.mongodb_database);

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| AppError::database("ping", e))?;

        tracing::info!(database = %config.mongodb_database, "Conexión a MongoDB establecida");

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(MongoRepo { database, events })
    }

    fn appointments(&self) -> Collection<AppointmentRecord> {
        self.database.collection("appointments")
    }

    /// Índice por fecha para la consulta diaria. No fatal si falla.
    pub async fn create_indexes(&self) -> AppResult<()> {
        let index = IndexModel::builder().keys(doc! { "date": 1 }).build();

        self.appointments()
            .create_index(index)
            .await
            .map_err(|e| AppError::database("create_indexes", e))?;

        tracing::info!("Índices MongoDB creados");
        Ok(())
    }

    fn publish(&self, date: &str) {
        // sin suscriptores el send falla; no hay nada que avisar
        let _ = self.events.send(RegistryEvent {
            date: date.to_string(),
        });
    }
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    matches!(
        error.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}

#[async_trait::async_trait]
impl Registry for MongoRepo {
    async fn records_for_date(&self, date: &str) -> AppResult<Vec<AppointmentRecord>> {
        let mut cursor = self
            .appointments()
            .find(doc! { "date": date })
            .await
            .map_err(|e| AppError::database("records_for_date", e))?;

        let mut results = Vec::new();
        while cursor
            .advance()
            .await
            .map_err(|e| AppError::database("records_for_date_cursor", e))?
        {
            let record = cursor
                .deserialize_current()
                .map_err(|e| AppError::database("records_for_date_deserialize", e))?;
            results.push(record);
        }

        Ok(results)
    }

    async fn find_record(&self, id: &str) -> AppResult<Option<AppointmentRecord>> {
        self.appointments()
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::database("find_record", e))
    }

    async fn claim_booking(&self, record: BookingRecord) -> AppResult<()> {
        let date = record.date.clone();
        let result = self
            .appointments()
            .insert_one(AppointmentRecord::Booking(record))
            .await;

        match result {
            Ok(_) => {
                self.publish(&date);
                Ok(())
            }
            Err(e) if is_duplicate_key(&e) => Err(AppError::SlotTaken),
            Err(e) => Err(AppError::database("claim_booking", e)),
        }
    }

    async fn put_day_block(&self, record: DayBlockRecord) -> AppResult<bool> {
        let date = record.date.clone();
        let result = self
            .appointments()
            .insert_one(AppointmentRecord::DayBlocked(record))
            .await;

        match result {
            Ok(_) => {
                self.publish(&date);
                Ok(true)
            }
            // otro admin cerró el día primero; el resultado es el mismo
            Err(e) if is_duplicate_key(&e) => Ok(false),
            Err(e) => Err(AppError::database("put_day_block", e)),
        }
    }

    async fn remove_day_block(&self, date: &str) -> AppResult<bool> {
        let result = self
            .appointments()
            .delete_one(doc! { "_id": block_id(date) })
            .await
            .map_err(|e| AppError::database("remove_day_block", e))?;

        if result.deleted_count > 0 {
            self.publish(date);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn update_booking_contact(&self, id: &str, name: &str, phone: &str) -> AppResult<()> {
        let result = self
            .appointments()
            .update_one(
                doc! { "_id": id, "type": "booking" },
                doc! { "$set": { "clientName": name, "clientPhone": phone } },
            )
            .await
            .map_err(|e| AppError::database("update_booking_contact", e))?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!("Reserva '{}' no encontrada", id)));
        }

        self.publish(date_of_id(id));
        Ok(())
    }

    async fn delete_record(&self, id: &str) -> AppResult<()> {
        let result = self
            .appointments()
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::database("delete_record", e))?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!("Documento '{}' no encontrado", id)));
        }

        self.publish(date_of_id(id));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }
}
