//! # BarberBook Reservation
//!
//! Servicio de reservas para una barbería de un solo local, construido con
//! Actix Web y MongoDB. Expone la grilla de horas del día y el reclamo
//! atómico de una hora a los clientes, y las mutaciones privilegiadas
//! (altas manuales, correcciones, cierre de días) al panel de
//! administración.
//!
//! La lógica de negocio vive en [`schedule`] como funciones puras; el acceso
//! al almacenamiento pasa por el contrato [`db::Registry`], con una
//! implementación MongoDB de producción y una en memoria para tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod messaging;
pub mod schedule;
pub mod state;
