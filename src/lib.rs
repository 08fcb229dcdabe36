//! Homepage - a small personal website with a queued contact form.
//!
//! Pages are rendered through a shared wrapper template. The contact form
//! hands its submission to a background queue, and the queue calls back into
//! the server to mail the owner.

pub mod config;
pub mod mail;
pub mod messages;
pub mod server;
pub mod tasks;
pub mod templates;

#[cfg(test)]
pub(crate) mod test_utils;
