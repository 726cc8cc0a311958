//! HTML rendering for the gallery pages.
//!
//! All rendering uses [maud](https://maud.lambda.xyz/) for compile-time HTML
//! generation with automatic XSS protection (all dynamic values are escaped).
//! The home page fills itself from `/api/posts`; the detail page is rendered
//! entirely on the server.

pub mod about;
pub mod components;
pub mod detail;
pub mod home;
