pub mod admin_access;
