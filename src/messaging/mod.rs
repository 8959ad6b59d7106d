//! Traspaso del comprobante de reserva a mensajería externa.

pub mod whatsapp;

pub use whatsapp::{confirmation_handoff, WhatsAppHandoff};
