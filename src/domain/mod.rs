// Domain layer: records and ports. Concrete implementations live in core/ and adapters/.

pub mod model;
pub mod ports;
