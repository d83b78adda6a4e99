//! # Ports
//!
//! - `inbound`: the API the request-handling collaborator drives
//! - `outbound`: what the pipeline needs from the host

pub mod inbound;
pub mod outbound;
