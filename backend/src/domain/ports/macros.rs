//! Helper macro for declaring port error enums.
//!
//! `define_port_error!` derives `thiserror::Error` for the enum and emits a
//! snake_case constructor per variant. Constructor parameters accept
//! `impl Into<T>` so adapters can pass `&str` or `String` interchangeably.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_fields $variant () () $( $field : $ty, )*);
    };

    (@ctor_fields $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_fields $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_fields
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use uuid::Uuid;

    define_port_error! {
        pub enum SamplePortError {
            Unreachable => "store unreachable",
            Query { message: String } => "query failed: {message}",
            Full { group_id: Uuid, capacity: i32 } => "group {group_id} is full ({capacity})",
        }
    }

    #[test]
    fn unit_variant_has_nullary_constructor() {
        assert_eq!(SamplePortError::unreachable(), SamplePortError::Unreachable);
        assert_eq!(SamplePortError::unreachable().to_string(), "store unreachable");
    }

    #[test]
    fn string_fields_accept_str() {
        let err = SamplePortError::query("timeout");
        assert_eq!(err.to_string(), "query failed: timeout");
    }

    #[test]
    fn mixed_fields_keep_their_types() {
        let id = Uuid::nil();
        let err = SamplePortError::full(id, 12);
        assert_eq!(
            err,
            SamplePortError::Full {
                group_id: id,
                capacity: 12
            }
        );
        assert_eq!(
            err.to_string(),
            "group 00000000-0000-0000-0000-000000000000 is full (12)"
        );
    }
}
