// vidsearch state managers
// Managers own mutable, persisted state; the search history is the only one.

pub mod search_history;
