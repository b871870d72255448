use super::Resolver;

/// Resolves properties from process environment variables.
///
/// Tries the exact name first, then the conventional mangling of dotted
/// keys: `app.database.url` is looked up as `APP_DATABASE_URL`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvResolver;

impl Resolver for EnvResolver {
    fn resolve(&self, name: &str) -> Option<String> {
        if let Ok(value) = std::env::var(name) {
            return Some(value);
        }
        let mangled = name.to_uppercase().replace(['.', '-'], "_");
        if mangled == name {
            return None;
        }
        std::env::var(&mangled).ok()
    }
}
