// Domain layer: catalog entities, validation outcomes and the ports the core talks through.
// Nothing here performs I/O.

pub mod model;
pub mod ports;
