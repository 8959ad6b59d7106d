//! # Núcleo de agenda
//!
//! Lógica pura del sistema de reservas, sin estado global ni acceso a
//! almacenamiento:
//!
//! - [`slots`] - Grilla horaria, sobrecupo y precios
//! - [`validate`] - Validación de datos del cliente (nombre, teléfono, fecha)
//! - [`projector`] - Proyección de un día: bloqueo, horas libres, pendientes e historial
//!
//! Todo aquí es función de sus argumentos, lo que permite testearlo sin
//! levantar el servidor ni MongoDB.

pub mod projector;
pub mod slots;
pub mod validate;

pub use projector::{project, BookingEntry, DayView, OpenSlot};
pub use slots::{slot_hour, ScheduleConfig};
