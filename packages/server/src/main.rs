#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone binary for the hardhat housing API server.
//!
//! Configuration comes from `DATABASE_URL`, `BIND_ADDR`, `PORT`, and
//! `RUST_LOG`.

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    hardhat_server::run_server().await
}
