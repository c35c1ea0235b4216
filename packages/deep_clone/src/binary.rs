use crate::{Object, ObjectKind};

/// The element type of a [`TypedArray`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ElementType {
    /// Signed 8-bit integers.
    Int8,
    /// Unsigned 8-bit integers.
    Uint8,
    /// Unsigned 8-bit integers, clamped on write.
    Uint8Clamped,
    /// Signed 16-bit integers.
    Int16,
    /// Unsigned 16-bit integers.
    Uint16,
    /// Signed 32-bit integers.
    Int32,
    /// Unsigned 32-bit integers.
    Uint32,
    /// 32-bit floating point numbers.
    Float32,
    /// 64-bit floating point numbers.
    Float64,
    /// Signed 64-bit integers.
    BigInt64,
    /// Unsigned 64-bit integers.
    BigUint64,
}

impl ElementType {
    /// The size of one element in bytes.
    #[must_use]
    pub fn size(self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 | Self::Uint8Clamped => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Float64 | Self::BigInt64 | Self::BigUint64 => 8,
        }
    }

    pub(crate) fn type_name(self) -> &'static str {
        match self {
            Self::Int8 => "Int8Array",
            Self::Uint8 => "Uint8Array",
            Self::Uint8Clamped => "Uint8ClampedArray",
            Self::Int16 => "Int16Array",
            Self::Uint16 => "Uint16Array",
            Self::Int32 => "Int32Array",
            Self::Uint32 => "Uint32Array",
            Self::Float32 => "Float32Array",
            Self::Float64 => "Float64Array",
            Self::BigInt64 => "BigInt64Array",
            Self::BigUint64 => "BigUint64Array",
        }
    }
}

/// A view of a range of a binary buffer as elements of one [`ElementType`].
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct TypedArray {
    /// The type of each element.
    pub element: ElementType,

    /// The array buffer the view reads from.
    pub buffer: Object,

    /// Where the view starts in the buffer.
    pub byte_offset: usize,

    /// The number of elements in the view.
    pub length: usize,
}

impl TypedArray {
    /// The number of bytes covered by the view, saturating at `usize::MAX`.
    #[must_use]
    pub fn byte_length(&self) -> usize {
        self.length.saturating_mul(self.element.size())
    }

    /// The bytes of the buffer covered by the view.
    ///
    /// Returns `None` if the backing object is not an array buffer or no longer holds every byte
    /// of the view.
    #[must_use]
    pub fn bytes(&self) -> Option<Vec<u8>> {
        copy_range(&self.buffer, self.byte_offset, self.byte_length())
    }
}

/// A view of a range of a binary buffer as plain bytes.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct DataView {
    /// The array buffer the view reads from.
    pub buffer: Object,

    /// Where the view starts in the buffer.
    pub byte_offset: usize,

    /// The number of bytes covered by the view.
    pub byte_length: usize,
}

impl DataView {
    /// The bytes of the buffer covered by the view.
    ///
    /// Returns `None` if the backing object is not an array buffer or no longer holds every byte
    /// of the view.
    #[must_use]
    pub fn bytes(&self) -> Option<Vec<u8>> {
        copy_range(&self.buffer, self.byte_offset, self.byte_length)
    }
}

fn copy_range(buffer: &Object, offset: usize, length: usize) -> Option<Vec<u8>> {
    let end = offset.checked_add(length)?;

    match &*buffer.borrow() {
        ObjectKind::ArrayBuffer(bytes) => bytes.get(offset..end).map(<[u8]>::to_vec),
        _ => None,
    }
}
