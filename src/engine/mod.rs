// Gateway Engine
//
//   config   — environment-derived GatewayConfig
//   whatsapp — client contract, browser client, session state, event relay
//   gateway  — axum HTTP surface

pub mod config;
pub mod gateway;
pub mod whatsapp;
