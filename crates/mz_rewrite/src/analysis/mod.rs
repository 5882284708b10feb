//! Safety analyses the passes consult before rewriting.

pub mod callback;
pub mod concat;
pub mod free_vars;
pub mod liveness;
pub mod provenance;
