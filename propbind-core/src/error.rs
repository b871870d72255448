/// Error type for property binding operations.
///
/// All four kinds are terminal for the invocation that produced them; the
/// core never retries. A resolver that wants retry semantics must implement
/// it internally before reporting absence.
#[derive(Debug, Clone)]
pub enum PropError {
    /// A `${...}` reference inside a name or value could not be resolved.
    Expansion {
        /// The reference text between the markers.
        reference: String,
    },
    /// The property resolved to absent and the accessor declares no fallback.
    Unresolved {
        /// The property name after variable expansion.
        property: String,
    },
    /// The value could not be converted to the accessor's target type.
    Conversion {
        /// The raw value that failed to convert.
        value: String,
        /// Description of the target type.
        target: String,
        detail: String,
    },
    /// A programming-contract violation. Surfaced immediately, never retried.
    Contract(String),
}

impl std::fmt::Display for PropError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropError::Expansion { reference } => {
                write!(f, "Failed to expand variable '{reference}': no resolver produced a value")
            }
            PropError::Unresolved { property } => {
                write!(f, "Property not resolved: {property}")
            }
            PropError::Conversion { value, target, detail } => {
                write!(f, "Cannot convert '{value}' to {target}: {detail}")
            }
            PropError::Contract(message) => write!(f, "Contract violation: {message}"),
        }
    }
}

impl std::error::Error for PropError {}
