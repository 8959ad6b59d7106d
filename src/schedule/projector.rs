//! Proyección de un día de agenda.
//!
//! `project` toma los documentos de una fecha tal como los entrega el
//! registro y produce la vista completa del día: si está bloqueado, qué horas
//! siguen libres, y las reservas existentes partidas en pendientes e
//! historial. Es una función pura: no lee el reloj ni el almacenamiento, por
//! lo que es seguro re-ejecutarla con cada snapshot de la suscripción.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::db::models::{AppointmentRecord, BookingRecord};

use super::{slot_hour, ScheduleConfig};

/// Vista calculada de una fecha.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DayView {
    pub date: String,
    /// Existe un marcador de día cerrado. Independiente de `open_slots`: el
    /// consumidor decide si ofrece la grilla o el aviso de agenda cerrada.
    pub is_blocked: bool,
    pub open_slots: Vec<OpenSlot>,
    /// Reservas futuras del día, ascendente por hora.
    pub upcoming: Vec<BookingEntry>,
    /// Reservas ya pasadas, descendente por hora.
    pub past: Vec<BookingEntry>,
}

/// Hora libre y reservable, decorada con su precio.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OpenSlot {
    pub time: String,
    pub is_overtime: bool,
    pub price: i64,
}

/// Reserva existente, en la forma que consumen la grilla y el panel.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingEntry {
    pub id: String,
    pub date: String,
    pub time: String,
    pub client_name: String,
    pub client_phone: String,
    pub is_overtime: bool,
    pub is_manual: bool,
}

impl From<&BookingRecord> for BookingEntry {
    fn from(record: &BookingRecord) -> Self {
        Self {
            id: record.id.clone(),
            date: record.date.clone(),
            time: record.time.clone(),
            client_name: record.client_name.clone(),
            client_phone: record.client_phone.clone(),
            is_overtime: record.is_overtime,
            is_manual: record.is_manual,
        }
    }
}

/// Regla de "hora pasada", con granularidad de hora.
///
/// Día anterior a hoy: todo pasado. Día posterior: nada pasado. Hoy: una hora
/// queda en el pasado apenas el reloj entra en ella (`hora <= hora actual`),
/// sin mirar los minutos. Una hora que no parsea nunca se considera pasada,
/// para que la reserva quede visible en pendientes y no desaparezca.
fn is_past(time: &str, selected_date: NaiveDate, now: NaiveDateTime) -> bool {
    let today = now.date();
    if selected_date < today {
        return true;
    }
    if selected_date > today {
        return false;
    }
    match slot_hour(time) {
        Some(hour) => hour <= now.hour(),
        None => false,
    }
}

/// Proyecta los documentos de `selected_date` a la vista del día.
///
/// `records` puede traer documentos de otras fechas (se ignoran); `now` es la
/// hora local del local, inyectada para que la función siga siendo pura.
pub fn project(
    records: &[AppointmentRecord],
    selected_date: NaiveDate,
    now: NaiveDateTime,
    schedule: &ScheduleConfig,
) -> DayView {
    let date_str = selected_date.format("%Y-%m-%d").to_string();

    let is_blocked = records
        .iter()
        .any(|r| matches!(r, AppointmentRecord::DayBlocked(_)) && r.date() == date_str);

    let bookings: Vec<&BookingRecord> = records
        .iter()
        .filter_map(|r| match r {
            AppointmentRecord::Booking(b) if b.date == date_str => Some(b),
            _ => None,
        })
        .collect();

    let open_slots = schedule
        .slots
        .iter()
        .filter(|slot| !bookings.iter().any(|b| &b.time == *slot))
        .filter(|slot| !is_past(slot, selected_date, now))
        .map(|slot| OpenSlot {
            time: slot.clone(),
            is_overtime: schedule.is_overtime(slot),
            price: schedule.price_for(slot),
        })
        .collect();

    let mut upcoming: Vec<BookingEntry> = bookings
        .iter()
        .filter(|b| !is_past(&b.time, selected_date, now))
        .map(|b| BookingEntry::from(*b))
        .collect();
    upcoming.sort_by(|a, b| a.time.cmp(&b.time));

    let mut past: Vec<BookingEntry> = bookings
        .iter()
        .filter(|b| is_past(&b.time, selected_date, now))
        .map(|b| BookingEntry::from(*b))
        .collect();
    past.sort_by(|a, b| b.time.cmp(&a.time));

    DayView {
        date: date_str,
        is_blocked,
        open_slots,
        upcoming,
        past,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use crate::db::models::{booking_id, block_id, DayBlockRecord};

    use super::*;

    fn booking(date: &str, time: &str, name: &str) -> AppointmentRecord {
        AppointmentRecord::Booking(BookingRecord {
            id: booking_id(date, time),
            date: date.to_string(),
            time: time.to_string(),
            client_name: name.to_string(),
            client_phone: "987654321".to_string(),
            is_overtime: false,
            is_manual: false,
            created_at: "2025-12-01T12:00:00Z".to_string(),
        })
    }

    fn block(date: &str) -> AppointmentRecord {
        AppointmentRecord::DayBlocked(DayBlockRecord {
            id: block_id(date),
            date: date.to_string(),
            created_at: "2025-12-01T12:00:00Z".to_string(),
        })
    }

    fn at(date: &str, hour: u32) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(hour, 30, 0).unwrap())
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_open_slots_exclude_taken() {
        let cfg = ScheduleConfig::default();
        let records = vec![booking("2025-12-23", "10:00", "Ana")];
        // un día antes: nada está en el pasado
        let view = project(&records, date("2025-12-23"), at("2025-12-22", 12), &cfg);

        assert!(!view.is_blocked);
        assert_eq!(view.open_slots.len(), cfg.slots.len() - 1);
        assert!(view.open_slots.iter().all(|s| s.time != "10:00"));
        assert_eq!(view.upcoming.len(), 1);
        assert!(view.past.is_empty());
    }

    #[test]
    fn test_hour_granularity_today() {
        let cfg = ScheduleConfig::default();
        // hoy a las 10:30: las 10:00 ya pasaron (hora <= hora actual), las 11:00 no
        let view = project(&[], date("2025-12-23"), at("2025-12-23", 10), &cfg);
        assert!(view.open_slots.iter().all(|s| s.time != "10:00"));
        assert!(view.open_slots.iter().any(|s| s.time == "11:00"));
    }

    #[test]
    fn test_whole_day_past_or_future() {
        let cfg = ScheduleConfig::default();

        let past_day = project(&[], date("2025-12-22"), at("2025-12-23", 10), &cfg);
        assert!(past_day.open_slots.is_empty());

        let future_day = project(&[], date("2025-12-24"), at("2025-12-23", 23), &cfg);
        assert_eq!(future_day.open_slots.len(), cfg.slots.len());
    }

    #[test]
    fn test_past_slots_grow_monotonically() {
        let cfg = ScheduleConfig::default();
        let selected = date("2025-12-23");
        let mut previous = 0;
        for hour in 0..24 {
            let view = project(&[], selected, at("2025-12-23", hour), &cfg);
            let past_count = cfg.slots.len() - view.open_slots.len();
            assert!(past_count >= previous, "el pasado se achicó a las {}", hour);
            previous = past_count;
        }
        // al final del día no queda nada reservable
        assert_eq!(previous, cfg.slots.len());
    }

    #[test]
    fn test_partition_and_ordering() {
        let cfg = ScheduleConfig::default();
        let records = vec![
            booking("2025-12-23", "20:00", "Ana"),
            booking("2025-12-23", "09:00", "Beto"),
            booking("2025-12-23", "15:00", "Carla"),
            booking("2025-12-23", "11:00", "Dino"),
        ];
        // hoy a las 11:30: 09:00 y 11:00 pasadas, 15:00 y 20:00 pendientes
        let view = project(&records, date("2025-12-23"), at("2025-12-23", 11), &cfg);

        let upcoming: Vec<&str> = view.upcoming.iter().map(|b| b.time.as_str()).collect();
        let past: Vec<&str> = view.past.iter().map(|b| b.time.as_str()).collect();
        assert_eq!(upcoming, vec!["15:00", "20:00"]);
        assert_eq!(past, vec!["11:00", "09:00"]);
    }

    #[test]
    fn test_blocked_flag_is_independent() {
        let cfg = ScheduleConfig::default();
        let records = vec![block("2025-12-24"), booking("2025-12-24", "10:00", "Ana")];
        let view = project(&records, date("2025-12-24"), at("2025-12-23", 12), &cfg);

        assert!(view.is_blocked);
        // el bloqueo no borra reservas ni vacía la grilla calculada
        assert_eq!(view.upcoming.len(), 1);
        assert!(!view.open_slots.is_empty());
    }

    #[test]
    fn test_records_of_other_dates_ignored() {
        let cfg = ScheduleConfig::default();
        let records = vec![booking("2025-12-22", "10:00", "Ana"), block("2025-12-22")];
        let view = project(&records, date("2025-12-23"), at("2025-12-21", 12), &cfg);

        assert!(!view.is_blocked);
        assert!(view.upcoming.is_empty());
        assert_eq!(view.open_slots.len(), cfg.slots.len());
    }

    #[test]
    fn test_unparseable_time_stays_visible() {
        let cfg = ScheduleConfig::default();
        let records = vec![booking("2025-12-23", "mediodía", "Ana")];
        let view = project(&records, date("2025-12-23"), at("2025-12-23", 23), &cfg);
        assert_eq!(view.upcoming.len(), 1);
        assert!(view.past.is_empty());
    }

    #[test]
    fn test_projection_is_idempotent() {
        let cfg = ScheduleConfig::default();
        let records = vec![
            booking("2025-12-23", "10:00", "Ana"),
            booking("2025-12-23", "20:00", "Beto"),
            block("2025-12-23"),
        ];
        let now = at("2025-12-23", 14);
        let first = project(&records, date("2025-12-23"), now, &cfg);
        let second = project(&records, date("2025-12-23"), now, &cfg);
        assert_eq!(first, second);
    }

    #[test]
    fn test_overtime_decoration() {
        let cfg = ScheduleConfig::default();
        let view = project(&[], date("2025-12-23"), at("2025-12-22", 12), &cfg);
        let slot = view.open_slots.iter().find(|s| s.time == "20:00").unwrap();
        assert!(slot.is_overtime);
        assert_eq!(slot.price, 13000);
        let normal = view.open_slots.iter().find(|s| s.time == "12:00").unwrap();
        assert!(!normal.is_overtime);
        assert_eq!(normal.price, 10000);
    }
}
