use crate::error::PropError;
use crate::resolver::Resolver;

/// Expands `${name}` style references in a string by resolving each
/// reference through a resolver.
///
/// A resolved value is spliced in place of its marker and is not itself
/// re-expanded, so expansion is a single left-to-right pass. Text that is
/// not a well-formed reference (an unclosed `${`, an empty `${}`) is copied
/// through verbatim.
#[derive(Debug, Clone)]
pub struct VariableExpander {
    prefix: String,
    suffix: String,
}

impl Default for VariableExpander {
    fn default() -> Self {
        Self::new("${", "}")
    }
}

impl VariableExpander {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// Expand all references in `input`.
    ///
    /// # Errors
    ///
    /// Returns [`PropError::Expansion`] naming the reference when any
    /// embedded reference cannot be resolved.
    pub fn expand(&self, input: &str, resolver: &dyn Resolver) -> Result<String, PropError> {
        if input.is_empty() || !input.contains(&self.prefix) {
            return Ok(input.to_string());
        }

        let mut output = String::with_capacity(input.len());
        let mut rest = input;
        while let Some(start) = rest.find(&self.prefix) {
            let after_prefix = &rest[start + self.prefix.len()..];
            match after_prefix.find(&self.suffix) {
                Some(end) if end > 0 => {
                    let reference = &after_prefix[..end];
                    let value = resolver.resolve(reference).ok_or_else(|| {
                        PropError::Expansion {
                            reference: reference.to_string(),
                        }
                    })?;
                    output.push_str(&rest[..start]);
                    output.push_str(&value);
                    rest = &after_prefix[end + self.suffix.len()..];
                }
                // Empty or unclosed marker: not a reference, copy the prefix
                // through and keep scanning after it.
                _ => {
                    output.push_str(&rest[..start + self.prefix.len()]);
                    rest = after_prefix;
                }
            }
        }
        output.push_str(rest);
        Ok(output)
    }
}
