//! Registro en memoria con la misma semántica que la implementación MongoDB.
//!
//! Lo usa la suite de tests para ejercitar el router completo sin levantar
//! una base de datos. El reclamo verifica la clave con el lock tomado, así
//! que conserva la atomicidad por documento del índice de `_id`.

use std::collections::BTreeMap;
use std::sync::Mutex;

use tokio::sync::broadcast;

use crate::api::{AppError, AppResult};

use super::models::{date_of_id, AppointmentRecord, BookingRecord, DayBlockRecord};
use super::{block_id, Registry, RegistryEvent};

pub struct MemoryRegistry {
    records: Mutex<BTreeMap<String, AppointmentRecord>>,
    events: broadcast::Sender<RegistryEvent>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            records: Mutex::new(BTreeMap::new()),
            events,
        }
    }

    fn publish(&self, date: &str) {
        let _ = self.events.send(RegistryEvent {
            date: date.to_string(),
        });
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Registry for MemoryRegistry {
    async fn records_for_date(&self, date: &str) -> AppResult<Vec<AppointmentRecord>> {
        let records = self.records.lock().expect("lock del registro envenenado");
        Ok(records
            .values()
            .filter(|r| r.date() == date)
            .cloned()
            .collect())
    }

    async fn find_record(&self, id: &str) -> AppResult<Option<AppointmentRecord>> {
        let records = self.records.lock().expect("lock del registro envenenado");
        Ok(records.get(id).cloned())
    }

    async fn claim_booking(&self, record: BookingRecord) -> AppResult<()> {
        let date = record.date.clone();
        {
            let mut records = self.records.lock().expect("lock del registro envenenado");
            if records.contains_key(&record.id) {
                return Err(AppError::SlotTaken);
            }
            records.insert(record.id.clone(), AppointmentRecord::Booking(record));
        }
        self.publish(&date);
        Ok(())
    }

    async fn put_day_block(&self, record: DayBlockRecord) -> AppResult<bool> {
        let date = record.date.clone();
        let inserted = {
            let mut records = self.records.lock().expect("lock del registro envenenado");
            if records.contains_key(&record.id) {
                false
            } else {
                records.insert(record.id.clone(), AppointmentRecord::DayBlocked(record));
                true
            }
        };
        if inserted {
            self.publish(&date);
        }
        Ok(inserted)
    }

    async fn remove_day_block(&self, date: &str) -> AppResult<bool> {
        let removed = {
            let mut records = self.records.lock().expect("lock del registro envenenado");
            records.remove(&block_id(date)).is_some()
        };
        if removed {
            self.publish(date);
        }
        Ok(removed)
    }

    async fn update_booking_contact(&self, id: &str, name: &str, phone: &str) -> AppResult<()> {
        {
            let mut records = self.records.lock().expect("lock del registro envenenado");
            match records.get_mut(id) {
                Some(AppointmentRecord::Booking(booking)) => {
                    booking.client_name = name.to_string();
                    booking.client_phone = phone.to_string();
                }
                _ => {
                    return Err(AppError::NotFound(format!("Reserva '{}' no encontrada", id)))
                }
            }
        }
        self.publish(date_of_id(id));
        Ok(())
    }

    async fn delete_record(&self, id: &str) -> AppResult<()> {
        let removed = {
            let mut records = self.records.lock().expect("lock del registro envenenado");
            records.remove(id).is_some()
        };
        if !removed {
            return Err(AppError::NotFound(format!("Documento '{}' no encontrado", id)));
        }
        self.publish(date_of_id(id));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::super::booking_id;
    use super::*;

    fn booking(date: &str, time: &str, name: &str) -> BookingRecord {
        BookingRecord {
            id: booking_id(date, time),
            date: date.to_string(),
            time: time.to_string(),
            client_name: name.to_string(),
            client_phone: "987654321".to_string(),
            is_overtime: false,
            is_manual: false,
            created_at: "2025-12-01T12:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_claim_is_first_writer_wins() {
        let registry = MemoryRegistry::new();
        registry
            .claim_booking(booking("2025-12-23", "20:00", "Ana"))
            .await
            .unwrap();

        let second = registry
            .claim_booking(booking("2025-12-23", "20:00", "Beto"))
            .await;
        assert!(matches!(second, Err(AppError::SlotTaken)));

        // la reserva original queda intacta
        let stored = registry
            .find_record(&booking_id("2025-12-23", "20:00"))
            .await
            .unwrap()
            .unwrap();
        match stored {
            AppointmentRecord::Booking(b) => assert_eq!(b.client_name, "Ana"),
            _ => panic!("se esperaba una reserva"),
        }
    }

    #[tokio::test]
    async fn test_concurrent_claims_one_winner() {
        let registry = std::sync::Arc::new(MemoryRegistry::new());

        let first = registry.claim_booking(booking("2025-12-23", "20:00", "Ana"));
        let second = registry.claim_booking(booking("2025-12-23", "20:00", "Beto"));
        let (a, b) = tokio::join!(first, second);

        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1, "exactamente un ganador");
        assert!(
            matches!(&a, Err(AppError::SlotTaken)) || matches!(&b, Err(AppError::SlotTaken))
        );
    }

    #[tokio::test]
    async fn test_block_toggle_leaves_bookings() {
        let registry = MemoryRegistry::new();
        registry
            .claim_booking(booking("2025-12-24", "10:00", "Ana"))
            .await
            .unwrap();

        let record = DayBlockRecord {
            id: block_id("2025-12-24"),
            date: "2025-12-24".to_string(),
            created_at: "2025-12-01T12:00:00Z".to_string(),
        };
        assert!(registry.put_day_block(record.clone()).await.unwrap());
        assert!(!registry.put_day_block(record).await.unwrap());
        assert!(registry.remove_day_block("2025-12-24").await.unwrap());
        assert!(!registry.remove_day_block("2025-12-24").await.unwrap());

        let records = registry.records_for_date("2025-12-24").await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_mutations_publish_their_date() {
        let registry = MemoryRegistry::new();
        let mut events = registry.subscribe();

        registry
            .claim_booking(booking("2025-12-23", "10:00", "Ana"))
            .await
            .unwrap();
        assert_eq!(events.recv().await.unwrap().date, "2025-12-23");

        registry
            .delete_record(&booking_id("2025-12-23", "10:00"))
            .await
            .unwrap();
        assert_eq!(events.recv().await.unwrap().date, "2025-12-23");
    }
}
