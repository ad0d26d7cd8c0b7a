// Domain layer: the wire-level model of the mock service and the transport port.

pub mod model;
pub mod ports;
