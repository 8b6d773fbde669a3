//! # User Proto
//!
//! Generated protobuf messages and gRPC stubs for the `service.UserService`
//! contract consumed by `user-api`.
//!
//! The server trait is exported as well, but only so tests can stand up an
//! in-process fake of the remote service.

pub mod pb {
    include!(concat!(env!("OUT_DIR"), "/service.rs"));
}

pub use pb::user_service_client::UserServiceClient;
pub use pb::user_service_server::{UserService, UserServiceServer};
