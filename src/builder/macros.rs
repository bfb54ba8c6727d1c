//! Macros for ergonomic status definitions.

/// Generate a status enum and its `Status` implementation.
///
/// The enum derives everything `Status` requires and gains an `ALL`
/// constant listing the variants in declaration order.
///
/// # Example
///
/// ```
/// use modality::status_enum;
/// use modality::core::Status;
///
/// status_enum! {
///     pub enum OrderStatus {
///         Draft,
///         Placed,
///         Delivered,
///         Cancelled,
///     }
///     final: [Delivered, Cancelled]
/// }
///
/// assert!(OrderStatus::Cancelled.is_final());
/// assert_eq!(OrderStatus::Placed.name(), "Placed");
/// assert_eq!(OrderStatus::ALL.len(), 4);
/// ```
#[macro_export]
macro_rules! status_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        $(final: [$($final:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $name {
            /// Every status, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];
        }

        impl $crate::core::Status for $name {
            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            #[allow(unreachable_patterns)]
            fn is_final(&self) -> bool {
                match self {
                    $($(Self::$final => true,)*)?
                    _ => false,
                }
            }
        }
    };
}
