// Domain layer: REST API models and ports (interfaces). No behavior here.

pub mod model;
pub mod ports;
