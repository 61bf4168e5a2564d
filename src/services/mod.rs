// vidsearch services
// Stateless or configuration-level services: the search API client and the settings engine.

pub mod search_client;
pub mod settings_engine;
