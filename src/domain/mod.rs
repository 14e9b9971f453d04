// Domain layer: models and ports. Nothing here talks to storage or the terminal.

pub mod model;
pub mod ports;
