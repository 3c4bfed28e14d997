mod helpers;
pub(crate) mod mocks;
mod sync;
mod webhook;
