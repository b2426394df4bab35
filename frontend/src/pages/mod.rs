pub mod admin_guard;
pub mod columns;
pub mod not_found;
pub mod resource_page;
