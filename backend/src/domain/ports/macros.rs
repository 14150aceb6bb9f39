//! Helper macro for declaring port error enums.

/// Declares a port error enum together with snake_case constructors.
///
/// Every variant carries named fields; the macro derives the usual error
/// traits and, for each variant, emits a constructor accepting
/// `impl Into<FieldType>` so adapters can pass `&str` or `String` alike:
///
/// ```ignore
/// define_port_error! {
///     /// Errors raised by geocoding adapters.
///     pub enum GeocoderError {
///         /// The provider could not be reached.
///         #[error("geocoding transport failed: {message}")]
///         Transport { message: String },
///     }
/// }
///
/// let err = GeocoderError::transport("connection refused");
/// ```
macro_rules! define_port_error {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $field_ty:ty),* $(,)? }
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant { $($field: $field_ty),* },
            )*
        }

        paste::paste! {
            impl $name {
                $(
                    #[doc = concat!(
                        "Builds [`", stringify!($name), "::", stringify!($variant), "`]."
                    )]
                    #[must_use]
                    $vis fn [<$variant:snake>]($($field: impl Into<$field_ty>),*) -> Self {
                        Self::$variant { $($field: $field.into()),* }
                    }
                )*
            }
        }
    };
}

pub(crate) use define_port_error;
