/*!
 * Monitoring
 * Structured tracing setup
 */

pub mod tracer;

pub use tracer::{generate_session_id, init_tracing};
