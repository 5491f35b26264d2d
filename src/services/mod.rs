// linkshelf stateless services
// Rule helpers used by the managers plus settings and password hashing.

pub mod password_hasher;
pub mod query_sanitizer;
pub mod settings_engine;
pub mod url_rules;
