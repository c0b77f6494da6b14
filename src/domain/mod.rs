// Domain layer: flight model, row codecs and the repository ports.

pub mod codec;
pub mod model;
pub mod ports;
