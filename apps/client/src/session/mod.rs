// Session: the request-lifecycle state machine behind the single-page client.
// input holds the user's text, lifecycle the state object, controller drives it,
// handlers expose it to the rendering layer.

pub mod controller;
pub mod handlers;
pub mod input;
pub mod lifecycle;
