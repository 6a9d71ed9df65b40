// Domain layer: table model, station tables and ports.

pub mod model;
pub mod ports;
pub mod stations;
