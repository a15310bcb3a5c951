//! Named parameter tables with explicit "given" tracking.
//!
//! A card stores every parameter as `Option<f64>`: `Some` when the user set
//! it, `None` when the defaulting pass should fill it in.

/// Declare a parameter card: one `Option<f64>` field per named parameter,
/// plus case-insensitive `set`/`get`/`is_given` lookups by name.
macro_rules! parameter_card {
    (
        $(#[$meta:meta])*
        $card:ident {
            $( $(#[$fmeta:meta])* $field:ident => $name:literal ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(default)]
        pub struct $card {
            $(
                $(#[$fmeta])*
                #[serde(rename = $name, skip_serializing_if = "Option::is_none")]
                pub $field: Option<f64>,
            )*
        }

        impl $card {
            /// Every parameter name accepted by [`Self::set`].
            pub const NAMES: &'static [&'static str] = &[$($name),*];

            /// Set a parameter by name (case-insensitive).
            pub fn set(&mut self, name: &str, value: f64) -> $crate::error::Result<()> {
                if !value.is_finite() {
                    return Err($crate::error::Error::InvalidValue {
                        name: name.to_string(),
                        value,
                    });
                }
                let key = name.to_ascii_lowercase();
                match key.as_str() {
                    $( $name => self.$field = Some(value), )*
                    _ => return Err($crate::error::Error::UnknownParameter(name.to_string())),
                }
                Ok(())
            }

            /// Builder form of [`Self::set`].
            pub fn with_param(mut self, name: &str, value: f64) -> $crate::error::Result<Self> {
                self.set(name, value)?;
                Ok(self)
            }

            /// Value of a parameter if it was given.
            pub fn get(&self, name: &str) -> Option<f64> {
                let key = name.to_ascii_lowercase();
                match key.as_str() {
                    $( $name => self.$field, )*
                    _ => None,
                }
            }

            /// True when the parameter was explicitly set.
            pub fn is_given(&self, name: &str) -> bool {
                self.get(name).is_some()
            }
        }
    };
}

pub(crate) use parameter_card;
