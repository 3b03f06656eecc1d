// navdesk services
// Services provide the non-lifecycle functionality: settings, identity, the public dashboard view.

pub mod dashboard;
pub mod identity;
pub mod settings_engine;
