//! Static message schemas
//!
//! A message type is a compile-time table of [`FieldDescriptor`]s plus a
//! type id. The codec walks that table generically; records expose their
//! fields to it through the object-safe [`Message`] trait. The
//! [`message!`](crate::message!) macro produces both from one declaration.

use crate::array::{ArraySlot, BoundedArray, FixedString};
use crate::primitive::{Primitive, Scalar, ScalarKind, ScalarSlot};

/// What a field carries on the wire
#[derive(Debug, Clone, Copy)]
pub enum WireKind {
    /// A primitive value (or, with a capacity, a sequence of them)
    Scalar(ScalarKind),
    /// A nested message framed by its own field sequence
    Message(&'static MessageDescriptor),
}

impl PartialEq for WireKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (WireKind::Scalar(a), WireKind::Scalar(b)) => a == b,
            (WireKind::Message(a), WireKind::Message(b)) => a == b,
            _ => false,
        }
    }
}

/// One declared field of a message type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDescriptor {
    /// Tag, unique within the message type
    pub id: u32,
    /// Field name, for diagnostics
    pub name: &'static str,
    /// Wire representation
    pub kind: WireKind,
    /// Static capacity for array and string fields, `None` for single values
    pub capacity: Option<usize>,
}

impl FieldDescriptor {
    /// Whether the field is a bounded sequence
    #[inline]
    pub const fn is_array(&self) -> bool {
        self.capacity.is_some()
    }
}

/// A message type: its envelope type id and ordered field table
///
/// Descriptors compare by content. A `const` descriptor may be instantiated
/// once per crate that names it, so addresses are not a type identity.
#[derive(Debug)]
pub struct MessageDescriptor {
    /// Type name, for diagnostics
    pub name: &'static str,
    /// Envelope type id
    pub type_id: u16,
    /// Fields in encode order
    pub fields: &'static [FieldDescriptor],
}

impl MessageDescriptor {
    /// Look up a field by tag
    #[inline]
    pub fn field(&self, id: u32) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Compile-time check that no two fields share a tag
    pub const fn has_unique_field_ids(&self) -> bool {
        let mut i = 0;
        while i < self.fields.len() {
            let mut j = i + 1;
            while j < self.fields.len() {
                if self.fields[i].id == self.fields[j].id {
                    return false;
                }
                j += 1;
            }
            i += 1;
        }
        true
    }
}

impl PartialEq for MessageDescriptor {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self, other)
            || (self.type_id == other.type_id
                && self.name == other.name
                && self.fields == other.fields)
    }
}

/// Read access to one field's storage
pub enum FieldRef<'a> {
    /// Single primitive value
    Scalar(Scalar),
    /// Bounded sequence of primitives
    Array(&'a dyn ArraySlot),
    /// Nested message
    Message(&'a dyn Message),
}

/// Write access to one field's storage
pub enum FieldMut<'a> {
    /// Single primitive value
    Scalar(&'a mut dyn ScalarSlot),
    /// Bounded sequence of primitives
    Array(&'a mut dyn ArraySlot),
    /// Nested message
    Message(&'a mut dyn Message),
}

/// A fixed-layout record the codec can traverse
pub trait Message {
    /// The record's schema
    fn descriptor(&self) -> &'static MessageDescriptor;

    /// Storage of the field tagged `id`
    fn field(&self, id: u32) -> Option<FieldRef<'_>>;

    /// Mutable storage of the field tagged `id`
    fn field_mut(&mut self, id: u32) -> Option<FieldMut<'_>>;
}

/// A concrete message type with a statically known schema
pub trait MessageType: Message + Default {
    /// The type's schema
    const DESCRIPTOR: &'static MessageDescriptor;
}

/// Rust types usable as message fields
pub trait FieldType {
    /// Wire representation
    const KIND: WireKind;
    /// Static capacity for sequences
    const CAPACITY: Option<usize>;

    /// Expose storage for encoding
    fn as_field(&self) -> FieldRef<'_>;

    /// Expose storage for decoding
    fn as_field_mut(&mut self) -> FieldMut<'_>;
}

macro_rules! impl_scalar_field {
    ($($ty:ty),*) => {
        $(
            impl FieldType for $ty {
                const KIND: WireKind = WireKind::Scalar(<$ty as Primitive>::KIND);
                const CAPACITY: Option<usize> = None;

                #[inline]
                fn as_field(&self) -> FieldRef<'_> {
                    FieldRef::Scalar(self.to_scalar())
                }

                #[inline]
                fn as_field_mut(&mut self) -> FieldMut<'_> {
                    FieldMut::Scalar(self)
                }
            }
        )*
    };
}

impl_scalar_field!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64, bool);

impl<T: Primitive, const N: usize> FieldType for BoundedArray<T, N> {
    const KIND: WireKind = WireKind::Scalar(T::KIND);
    const CAPACITY: Option<usize> = Some(N);

    #[inline]
    fn as_field(&self) -> FieldRef<'_> {
        FieldRef::Array(self)
    }

    #[inline]
    fn as_field_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Array(self)
    }
}

impl<const N: usize> FieldType for FixedString<N> {
    const KIND: WireKind = WireKind::Scalar(ScalarKind::Char);
    const CAPACITY: Option<usize> = Some(N);

    #[inline]
    fn as_field(&self) -> FieldRef<'_> {
        FieldRef::Array(self)
    }

    #[inline]
    fn as_field_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Array(self)
    }
}

/// Declare a message type: the record, its schema and its codec hooks
///
/// ```rust
/// use microtlv::{message, FixedString, MessageType};
///
/// message! {
///     /// Temperature reading
///     pub struct Reading(7) {
///         0 => pub celsius: i32,
///         1 => pub label: FixedString<16>,
///     }
/// }
///
/// assert_eq!(Reading::DESCRIPTOR.type_id, 7);
/// assert_eq!(Reading::DESCRIPTOR.fields.len(), 2);
/// ```
///
/// Field ids must be unique; a duplicate fails to compile.
#[macro_export]
macro_rules! message {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident ($type_id:expr) {
            $(
                $(#[$fmeta:meta])*
                $fid:literal => $fvis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::schema::MessageType for $name {
            const DESCRIPTOR: &'static $crate::schema::MessageDescriptor =
                &$crate::schema::MessageDescriptor {
                    name: ::core::stringify!($name),
                    type_id: $type_id,
                    fields: &[
                        $(
                            $crate::schema::FieldDescriptor {
                                id: $fid,
                                name: ::core::stringify!($field),
                                kind: <$ty as $crate::schema::FieldType>::KIND,
                                capacity: <$ty as $crate::schema::FieldType>::CAPACITY,
                            },
                        )*
                    ],
                };
        }

        const _: () = ::core::assert!(
            <$name as $crate::schema::MessageType>::DESCRIPTOR.has_unique_field_ids(),
            "duplicate field id in message declaration",
        );

        impl $crate::schema::Message for $name {
            fn descriptor(&self) -> &'static $crate::schema::MessageDescriptor {
                <Self as $crate::schema::MessageType>::DESCRIPTOR
            }

            #[allow(unreachable_patterns)]
            fn field(&self, id: u32) -> ::core::option::Option<$crate::schema::FieldRef<'_>> {
                match id {
                    $( $fid => ::core::option::Option::Some(
                        $crate::schema::FieldType::as_field(&self.$field)
                    ), )*
                    _ => ::core::option::Option::None,
                }
            }

            #[allow(unreachable_patterns)]
            fn field_mut(
                &mut self,
                id: u32,
            ) -> ::core::option::Option<$crate::schema::FieldMut<'_>> {
                match id {
                    $( $fid => ::core::option::Option::Some(
                        $crate::schema::FieldType::as_field_mut(&mut self.$field)
                    ), )*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl $crate::schema::FieldType for $name {
            const KIND: $crate::schema::WireKind = $crate::schema::WireKind::Message(
                <$name as $crate::schema::MessageType>::DESCRIPTOR,
            );
            const CAPACITY: ::core::option::Option<usize> = ::core::option::Option::None;

            fn as_field(&self) -> $crate::schema::FieldRef<'_> {
                $crate::schema::FieldRef::Message(self)
            }

            fn as_field_mut(&mut self) -> $crate::schema::FieldMut<'_> {
                $crate::schema::FieldMut::Message(self)
            }
        }
    };
}
